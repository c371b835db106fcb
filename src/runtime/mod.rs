// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Container runtime abstraction, and its implementation on top of the
//! `docker` command line client.

pub use self::container::{ContainerRecord, ContainerStatus};
pub use self::docker::DockerRuntime;
pub use self::errors::Error;
pub use self::icontainerruntime::IContainerRuntime;

#[cfg(test)]
pub(crate) use self::memo_runtime::MemoRuntime;

mod container;
mod docker;
mod errors;
mod icontainerruntime;
#[cfg(test)]
mod memo_runtime;
