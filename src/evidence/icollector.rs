// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::evidence::Evidence;
use crate::launch::ApplicationArguments;
use std::path::Path;

/// Interface to whatever gathers the evidence of a running enclave.
pub trait IEvidenceCollector {
    /// Gather the evidence of the instance listening on `port`, signed with
    /// the private key at `signer_key` and started with `input_args`
    fn collect(
        &self,
        port: u16,
        signer_key: &Path,
        input_args: &ApplicationArguments,
    ) -> Result<Evidence, Error>;
}
