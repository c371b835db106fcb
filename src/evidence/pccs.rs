// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::collaterals::{decode_crl, Collaterals};
use super::errors::Error;
use super::pck::{fmspc, pck_leaf};
use super::quote::Quote;
use crate::base64::Bytes;
use openssl::x509::X509;
use std::time::Duration;
use tracing::{debug, info};

const API: &str = "sgx/certification/v4";
const TCB_ISSUER_CHAIN_HEADERS: [&str; 2] = ["TCB-Info-Issuer-Chain", "SGX-TCB-Info-Issuer-Chain"];

/// Client of an Intel Provisioning Certificate Caching Service.
#[derive(Debug, Clone)]
pub struct PccsClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

/// First certificate of the URL-encoded PEM chain found in an issuer chain
/// header
pub fn issuer_chain_head(header: &str) -> Result<X509, Error> {
    let pem = urlencoding::decode(header)
        .map_err(|e| Error::Collateral(format!("issuer chain header: {e}")))?;

    X509::stack_from_pem(pem.as_bytes())
        .map_err(|e| Error::Collateral(format!("issuer chain: {e}")))?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Collateral("empty issuer chain".to_string()))
}

fn crl_pem(raw: &[u8]) -> Result<String, Error> {
    let pem = decode_crl(raw)?
        .to_pem()
        .map_err(|e| Error::Collateral(e.to_string()))?;
    Ok(String::from_utf8_lossy(&pem).into_owned())
}

impl PccsClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Collateral(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, Error> {
        let url = format!("{}/{API}/{path}", self.base_url);
        debug!("GET {url}");

        self.http
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Collateral(format!("{url}: {e}")))
    }

    fn body(r: reqwest::blocking::Response) -> Result<Vec<u8>, Error> {
        r.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| Error::Collateral(e.to_string()))
    }

    /// Root CA CRL, as PEM
    pub fn root_ca_crl(&self) -> Result<String, Error> {
        crl_pem(&Self::body(self.get("rootcacrl")?)?)
    }

    /// CRL of the `ca` ("platform" or "processor") PCK CA, as PEM
    pub fn pck_crl(&self, ca: &str) -> Result<String, Error> {
        crl_pem(&Self::body(self.get(&format!("pckcrl?ca={ca}"))?)?)
    }

    pub fn qe_identity(&self) -> Result<Vec<u8>, Error> {
        Self::body(self.get("qe/identity")?)
    }

    /// TCB info of the platform family and its signing certificate, as PEM
    pub fn tcb_info(&self, fmspc: &[u8; 6]) -> Result<(Vec<u8>, String), Error> {
        let r = self.get(&format!("tcb?fmspc={}", hex::encode_upper(fmspc)))?;

        let header = TCB_ISSUER_CHAIN_HEADERS
            .iter()
            .find_map(|h| r.headers().get(*h))
            .ok_or_else(|| Error::Collateral("TCB info comes without issuer chain".to_string()))?
            .to_str()
            .map_err(|e| Error::Collateral(e.to_string()))?
            .to_string();

        let tcb_cert = issuer_chain_head(&header)?
            .to_pem()
            .map_err(|e| Error::Collateral(e.to_string()))?;

        Ok((
            Self::body(r)?,
            String::from_utf8_lossy(&tcb_cert).into_owned(),
        ))
    }

    /// Everything needed to appraise `quote` offline.
    pub fn collaterals(&self, quote: &Quote) -> Result<Collaterals, Error> {
        info!("Fetching the collaterals from {}...", self.base_url);

        let chain = quote
            .pck_chain_pem()
            .ok_or_else(|| Error::Quote("no PCK certificate chain in the quote".to_string()))?;
        let fmspc = fmspc(&pck_leaf(chain)?)?;

        let (tcb_info, tcb_cert) = self.tcb_info(&fmspc)?;

        Ok(Collaterals {
            root_ca_crl: self.root_ca_crl()?,
            pck_platform_crl: self.pck_crl("platform")?,
            tcb_info: Bytes::from(tcb_info),
            qe_identity: Bytes::from(self.qe_identity()?),
            tcb_cert,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCB_CERT: &str = include_str!("../../testdata/tcb-cert.pem");
    const PCK_CERT: &str = include_str!("../../testdata/pck-cert.pem");

    #[test]
    fn issuer_chain_header() {
        let chain = format!("{TCB_CERT}{PCK_CERT}");
        let header = urlencoding::encode(&chain);

        let head = issuer_chain_head(&header).unwrap();
        assert_eq!(
            head.to_pem().unwrap(),
            X509::from_pem(TCB_CERT.as_bytes()).unwrap().to_pem().unwrap()
        );
    }

    #[test]
    fn empty_issuer_chain() {
        assert!(matches!(
            issuer_chain_head(""),
            Err(Error::Collateral(_))
        ));
    }

    #[test]
    fn trailing_slash() {
        let c = PccsClient::new("https://pccs.example.com:8081/").unwrap();
        assert_eq!(c.base_url(), "https://pccs.example.com:8081");
    }
}
