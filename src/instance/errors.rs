// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use crate::poll::Timeout;

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Instance {0} already exists")]
    InstanceAlreadyExists(String),
    #[error("Port {0} is already in use")]
    PortInUse(u16),
    #[error("Instance {0} not found")]
    InstanceNotFound(String),
    #[error("Instance creation failed: {0}")]
    InstanceCreationFailed(String),
    #[error("Instance stopped: {0}")]
    InstanceExited(String),
    #[error("Instance unreachable: {0}")]
    InstanceUnreachable(String),
    #[error("Instance {0} does not run in an enclave")]
    NotAnEnclave(String),
    #[error("Instance {name} is {state} and can't be tested right now")]
    NotTestable { name: String, state: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Application tests failed: {0}")]
    TestsFailed(String),
    #[error(transparent)]
    Runtime(#[from] crate::runtime::Error),
    #[error(transparent)]
    Package(#[from] crate::package::Error),
    #[error(transparent)]
    Launch(#[from] crate::launch::Error),
    #[error(transparent)]
    Evidence(#[from] crate::evidence::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<Timeout> for Error {
    fn from(t: Timeout) -> Self {
        Error::InstanceUnreachable(t.to_string())
    }
}
