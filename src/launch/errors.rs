// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Cannot decode launch configuration, {key}: {reason}")]
    Decode { key: String, reason: String },
    #[error("Malformed arguments: {0}")]
    Malformed(String),
    #[error("Invalid launch configuration: {0}")]
    Invalid(String),
    #[error("Application arguments: {0}")]
    AppArgs(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Malformed(e) | Error::Invalid(e) | Error::AppArgs(e) => {
                write!(f, "{}", e)
            }
            Error::Decode { key, reason } => {
                write!(f, "{}: {}", key, reason)
            }
        }
    }
}

impl Error {
    pub fn missing(key: &str) -> Self {
        Error::Decode {
            key: key.to_string(),
            reason: "missing".to_string(),
        }
    }

    pub fn bad_value(key: &str, reason: impl std::fmt::Display) -> Self {
        Error::Decode {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
