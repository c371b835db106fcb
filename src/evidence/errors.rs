// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Can't reach {0}: is the application still running?")]
    InstanceUnreachable(String),
    #[error("Malformed quote: {0}")]
    Quote(String),
    #[error("Certificate error: {0}")]
    Certificate(String),
    #[error("The certificate public key is not bound to the quote report data")]
    CertificateBinding,
    #[error("Enclave signer is wrong (read {actual} but should be {expected})")]
    WrongSigner { expected: String, actual: String },
    #[error("Code fingerprint is wrong (read {actual} but should be {expected})")]
    WrongFingerprint { expected: String, actual: String },
    #[error("Certificate {subject} is revoked by the {crl}")]
    RevokedCertificate { subject: String, crl: String },
    #[error("Signer key error: {0}")]
    SignerKey(String),
    #[error("Collateral error: {0}")]
    Collateral(String),
    #[error("Failed to compute the fingerprint, see {} for more details", .0.display())]
    FingerprintComputationFailed(PathBuf),
    #[error("Bad fingerprint: {0}")]
    BadFingerprint(String),
    #[error("Malformed evidence: {0}")]
    Syntax(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error(transparent)]
    Runtime(#[from] crate::runtime::Error),
    #[error(transparent)]
    Package(#[from] crate::package::Error),
    #[error(transparent)]
    Launch(#[from] crate::launch::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InstanceUnreachable(e)
            | Error::Quote(e)
            | Error::Certificate(e)
            | Error::SignerKey(e)
            | Error::Collateral(e)
            | Error::BadFingerprint(e)
            | Error::Syntax(e)
            | Error::Io(e) => {
                write!(f, "{}", e)
            }
            other => write!(f, "{}", other),
        }
    }
}

pub(crate) fn io(what: &std::path::Path, e: std::io::Error) -> Error {
    Error::Io(format!("{}: {}", what.display(), e))
}
