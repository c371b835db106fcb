// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::evidence::Evidence;
use super::icollector::IEvidenceCollector;
use super::pccs::PccsClient;
use super::ratls;
use super::signer::load_public_from_private;
use crate::launch::ApplicationArguments;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use openssl::x509::X509;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Collects evidence over RA-TLS, and collaterals from a PCCS when one is
/// configured.
#[derive(Debug, Clone)]
pub struct RatlsCollector {
    host: String,
    pccs: Option<PccsClient>,
}

impl RatlsCollector {
    pub fn new(host: impl Into<String>, pccs: Option<PccsClient>) -> Self {
        Self {
            host: host.into(),
            pccs,
        }
    }

    /// Certificate presented by the instance on `port`.  The certificate is
    /// not checked here: trust comes from the quote it carries.
    pub fn fetch_certificate(&self, port: u16) -> Result<X509, Error> {
        let unreachable = |e: String| Error::InstanceUnreachable(format!("{}:{port} ({e})", self.host));

        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|e| unreachable(e.to_string()))?;
        builder.set_verify(SslVerifyMode::NONE);
        let connector = builder.build();

        let addr = (self.host.as_str(), port)
            .to_socket_addrs()
            .map_err(|e| unreachable(e.to_string()))?
            .next()
            .ok_or_else(|| unreachable("no address".to_string()))?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|e| unreachable(e.to_string()))?;
        stream
            .set_read_timeout(Some(CONNECT_TIMEOUT))
            .map_err(|e| unreachable(e.to_string()))?;

        let tls = connector
            .configure()
            .map_err(|e| unreachable(e.to_string()))?
            .verify_hostname(false)
            .connect(&self.host, stream)
            .map_err(|e| unreachable(e.to_string()))?;

        tls.ssl()
            .peer_certificate()
            .ok_or_else(|| unreachable("no peer certificate".to_string()))
    }
}

impl IEvidenceCollector for RatlsCollector {
    fn collect(
        &self,
        port: u16,
        signer_key: &Path,
        input_args: &ApplicationArguments,
    ) -> Result<Evidence, Error> {
        info!("Collecting the evidence of {}:{port}...", self.host);

        let cert = self.fetch_certificate(port)?;
        let quote = ratls::quote_from_certificate(&cert)?;
        ratls::check_binding(&cert, &quote)?;

        let signer_pk = load_public_from_private(signer_key)?;

        let collaterals = match &self.pccs {
            Some(pccs) => Some(pccs.collaterals(&quote)?),
            None => {
                warn!("No PCCS configured: the evidence comes without collaterals");
                None
            }
        };

        Evidence::new(input_args.clone(), &cert, &signer_pk, collaterals)
    }
}
