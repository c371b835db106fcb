// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Hand the secrets over to an instance waiting for them, optionally
//! sealed beforehand for one verified enclave.

pub use self::errors::Error;
pub use self::payload::{SecretsMaterial, SecretsPayload};
pub use self::provisioner::{provision, SECRETS_PATH};
pub use self::seal::{seal, seal_file, SEALED_EXTENSION};

mod errors;
mod payload;
mod provisioner;
mod seal;
