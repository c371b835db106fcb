// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use crate::poll::Timeout;

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Instance is {0}, not waiting for its secrets")]
    NotAwaitingSecrets(String),
    #[error("Nothing to send: no secrets, sealed secrets nor code key")]
    NothingToSend,
    #[error("Bad secrets material: {0}")]
    Material(String),
    #[error("Secrets refused with status {status}: {body}")]
    SecretDeliveryRejected { status: u16, body: String },
    #[error("Sealing failed: {0}")]
    Sealing(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error(transparent)]
    Instance(#[from] crate::instance::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<Timeout> for Error {
    fn from(t: Timeout) -> Self {
        Error::Timeout(t.to_string())
    }
}
