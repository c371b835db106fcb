// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Container runtime unavailable: {0}")]
    Unavailable(String),
    #[error("Runtime command `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },
    #[error("Unexpected runtime output: {0}")]
    Output(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Unavailable(e) | Error::Output(e) => {
                write!(f, "{}", e)
            }
            Error::Command { command, stderr } => {
                write!(f, "{}: {}", command, stderr)
            }
        }
    }
}
