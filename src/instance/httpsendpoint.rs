// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::iendpoint::{HttpReply, IInstanceEndpoint};
use super::state::ProbeResponse;
use std::time::Duration;
use tracing::debug;

/// Header set by the configuration server while the instance waits for
/// its secrets
pub const TRUST_STATUS_HEADER: &str = "Mse-Status";

/// Talks to instances published on the local host.  Their certificates
/// are self-signed, so none is checked here: the trust decision belongs to
/// the evidence verification.
#[derive(Debug, Clone)]
pub struct HttpsEndpoint {
    host: String,
    http: reqwest::blocking::Client,
}

impl HttpsEndpoint {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            host: host.into(),
            http,
        })
    }

    fn url(&self, port: u16, path: &str) -> String {
        format!("https://{}:{port}{path}", self.host)
    }
}

impl IInstanceEndpoint for HttpsEndpoint {
    fn probe(&self, port: u16, path: &str) -> ProbeResponse {
        match self.http.get(self.url(port, path)).send() {
            Ok(r) => ProbeResponse::Http {
                status: r.status().as_u16(),
                trust_header: r.headers().contains_key(TRUST_STATUS_HEADER),
            },
            Err(e) => {
                debug!("probe of port {port} failed: {e}");
                ProbeResponse::Unreachable(e.to_string())
            }
        }
    }

    fn post_json(
        &self,
        port: u16,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpReply, Error> {
        let r = self
            .http
            .post(self.url(port, path))
            .json(body)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = r.status().as_u16();
        let body = r.text().map_err(|e| Error::Transport(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceState;
    use std::net::TcpListener;

    #[test]
    fn closed_port_is_initializing() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let ep = HttpsEndpoint::new("localhost", Duration::from_secs(2)).unwrap();
        let probe = ep.probe(port, "/");

        assert!(matches!(probe, ProbeResponse::Unreachable(_)));
        assert_eq!(InstanceState::classify(&probe), InstanceState::Initializing);
    }
}
