// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Missing package member: {0}")]
    MissingPackageMember(String),
    #[error("Unsafe package member: {0}")]
    UnsafeMember(String),
    #[error("Malformed application configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingPackageMember(e)
            | Error::UnsafeMember(e)
            | Error::Config(e)
            | Error::Io(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

pub(crate) fn io(what: &std::path::Path, e: std::io::Error) -> Error {
    Error::Io(format!("{}: {}", what.display(), e))
}
