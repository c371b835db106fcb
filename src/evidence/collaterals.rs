// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::ratls::subject;
use crate::base64::Bytes;
use openssl::x509::{CrlStatus, X509Crl, X509};
use serde::{Deserialize, Serialize};

/// Intel provisioning material needed to appraise a quote offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaterals {
    /// PEM
    pub root_ca_crl: String,
    /// PEM
    pub pck_platform_crl: String,
    pub tcb_info: Bytes,
    pub qe_identity: Bytes,
    /// PEM, the signer of `tcb_info`
    pub tcb_cert: String,
}

/// Decode a CRL served as PEM, as hex-encoded DER or as raw DER.
pub fn decode_crl(raw: &[u8]) -> Result<X509Crl, Error> {
    if let Ok(crl) = X509Crl::from_pem(raw) {
        return Ok(crl);
    }

    if let Some(der) = std::str::from_utf8(raw)
        .ok()
        .and_then(|s| hex::decode(s.trim()).ok())
    {
        if let Ok(crl) = X509Crl::from_der(&der) {
            return Ok(crl);
        }
    }

    X509Crl::from_der(raw).map_err(|e| Error::Collateral(format!("unreadable CRL: {e}")))
}

fn revoked(crl: &X509Crl, cert: &X509, crl_name: &str) -> Result<(), Error> {
    match crl.get_by_cert(cert) {
        CrlStatus::Revoked(_) => Err(Error::RevokedCertificate {
            subject: subject(cert),
            crl: crl_name.to_string(),
        }),
        _ => Ok(()),
    }
}

impl Collaterals {
    pub fn root_ca_crl(&self) -> Result<X509Crl, Error> {
        decode_crl(self.root_ca_crl.as_bytes())
    }

    pub fn pck_platform_crl(&self) -> Result<X509Crl, Error> {
        decode_crl(self.pck_platform_crl.as_bytes())
    }

    pub fn tcb_cert(&self) -> Result<X509, Error> {
        X509::from_pem(self.tcb_cert.as_bytes())
            .map_err(|e| Error::Collateral(format!("TCB signing certificate: {e}")))
    }

    /// Parse every member
    pub fn validate(&self) -> Result<(), Error> {
        self.root_ca_crl()?;
        self.pck_platform_crl()?;
        self.tcb_cert()?;
        Ok(())
    }

    /// The TCB signing certificate must not be revoked by the root CA, and
    /// the platform's PCK certificate must not be revoked by the platform
    /// CA.
    pub fn check_revocations(&self, pck: &X509) -> Result<(), Error> {
        revoked(&self.root_ca_crl()?, &self.tcb_cert()?, "root CA CRL")?;
        revoked(&self.pck_platform_crl()?, pck, "PCK platform CRL")
    }
}
