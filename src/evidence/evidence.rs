// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::collaterals::Collaterals;
use super::errors::{io, Error};
use super::quote::Quote;
use super::ratls;
use crate::launch::ApplicationArguments;
use openssl::pkey::{PKey, PKeyRef, Public};
use openssl::x509::{X509Ref, X509};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a third party needs to check an instance offline: the
/// public launch arguments, the RA-TLS certificate, the signer's public
/// key and, optionally, Intel collaterals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub input_args: ApplicationArguments,
    /// PEM
    pub ratls_certificate: String,
    #[serde(default)]
    pub collaterals: Option<Collaterals>,
    /// PEM SubjectPublicKeyInfo
    pub signer_pk: String,
}

fn pem(r: Result<Vec<u8>, openssl::error::ErrorStack>) -> Result<String, Error> {
    r.map_err(|e| Error::Certificate(e.to_string()))
        .map(|v| String::from_utf8_lossy(&v).into_owned())
}

impl Evidence {
    pub fn new(
        input_args: ApplicationArguments,
        ratls_certificate: &X509Ref,
        signer_pk: &PKeyRef<Public>,
        collaterals: Option<Collaterals>,
    ) -> Result<Self, Error> {
        Ok(Self {
            input_args,
            ratls_certificate: pem(ratls_certificate.to_pem())?,
            collaterals,
            signer_pk: pem(signer_pk.public_key_to_pem())?,
        })
    }

    pub fn certificate(&self) -> Result<X509, Error> {
        X509::from_pem(self.ratls_certificate.as_bytes())
            .map_err(|e| Error::Certificate(e.to_string()))
    }

    pub fn signer_key(&self) -> Result<PKey<Public>, Error> {
        PKey::public_key_from_pem(self.signer_pk.as_bytes())
            .map_err(|e| Error::SignerKey(e.to_string()))
    }

    pub fn quote(&self) -> Result<Quote, Error> {
        let cert = self.certificate()?;
        ratls::quote_from_certificate(&cert)
    }

    /// Decode and check that every member parses
    pub fn from_json(j: &str) -> Result<Self, Error> {
        let e: Self = serde_json::from_str(j).map_err(|e| Error::Syntax(e.to_string()))?;

        e.certificate()?;
        e.signer_key()?;
        if let Some(c) = &e.collaterals {
            c.validate()?;
        }

        Ok(e)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Syntax(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let j = std::fs::read_to_string(path).map_err(|e| io(path, e))?;
        Self::from_json(&j)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        std::fs::write(path, self.to_json()?).map_err(|e| io(path, e))
    }
}
