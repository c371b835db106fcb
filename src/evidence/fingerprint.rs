// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::{io, Error};
use crate::launch::ApplicationArguments;
use crate::package::CodePackage;
use crate::runtime::IContainerRuntime;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::info;

/// Line the entrypoint prints, followed by the hex MRENCLAVE, when run with
/// `--dry-run`
static MEASUREMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Measurement:\n[ ]*([0-9a-f]{64})\b").expect("measurement regex")
});

/// An enclave measurement (MRENCLAVE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 32]);

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut v = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut v)
            .map_err(|e| Error::BadFingerprint(format!("'{s}': {e}")))?;
        Ok(Self(v))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Find the measurement in the output of a dry run.
fn parse_measurement(output: &str) -> Option<Fingerprint> {
    MEASUREMENT_REGEX
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Measure the enclave `args` would start, without starting it.
///
/// Everything the dry run prints is written to `log`, which is what the
/// error points at when no measurement shows up.
pub fn compute_fingerprint<R: IContainerRuntime + ?Sized>(
    runtime: &R,
    image: &str,
    args: &ApplicationArguments,
    code: &Path,
    log: &Path,
) -> Result<Fingerprint, Error> {
    info!("Computing the code fingerprint...");

    let output = runtime.run_to_completion(image, &args.measurement_spec(code))?;
    std::fs::write(log, &output).map_err(|e| io(log, e))?;

    parse_measurement(&String::from_utf8_lossy(&output))
        .ok_or_else(|| Error::FingerprintComputationFailed(log.to_path_buf()))
}

/// Measure the enclave `args` would start from the package at `package`.
/// The package is unpacked, and the dry run logged, under `workdir`.
pub fn fingerprint_of_package<R: IContainerRuntime + ?Sized>(
    runtime: &R,
    package: &Path,
    args: &ApplicationArguments,
    workdir: &Path,
) -> Result<Fingerprint, Error> {
    info!("Extracting the package at {}...", workdir.display());
    let p = CodePackage::extract(package, workdir)?;

    info!("Loading the docker image...");
    let image = runtime.load_image(&p.image_tar)?;

    compute_fingerprint(runtime, &image, args, &p.code_tar, &workdir.join("fingerprint.log"))
}
