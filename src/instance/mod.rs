// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Instance lifecycle: spawn, readiness, status, stop, restart, logs and
//! application tests.
//!
//! An instance is a container started from a package.  Its state is read
//! from its healthcheck endpoint: until it is provisioned, a configuration
//! server answers there and flags itself with the `Mse-Status` header.

pub use self::errors::Error;
pub use self::httpsendpoint::{HttpsEndpoint, TRUST_STATUS_HEADER};
pub use self::iendpoint::{HttpReply, IInstanceEndpoint};
pub use self::orchestrator::{
    Deployment, InstanceStatus, Orchestrator, SpawnOptions, ARGS_FILE_NAME, EVIDENCE_FILE_NAME,
    STOP_GRACE,
};
pub use self::state::{InstanceState, ProbeResponse};

#[cfg(test)]
pub(crate) use self::iendpoint::ScriptedEndpoint;
#[cfg(test)]
pub(crate) use self::orchestrator::tests as fixtures;

mod apptest;
mod errors;
mod httpsendpoint;
mod iendpoint;
mod orchestrator;
mod state;
