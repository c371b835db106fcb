// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use crate::evidence::Quote;
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SEALED_EXTENSION: &str = "sealed";

/// Encrypt `plaintext` as an anonymous sealed box for the X25519 key
/// `enclave_key`.  Only the holder of the matching secret key can open it.
pub fn seal(plaintext: &[u8], enclave_key: &[u8; 32]) -> Result<Vec<u8>, Error> {
    PublicKey::from(*enclave_key)
        .seal(&mut OsRng, plaintext)
        .map_err(|e| Error::Sealing(e.to_string()))
}

/// Seal the file at `secrets` for the enclave whose verified quote is
/// `quote`, and write the result as `<file name>.sealed` under `output`.
pub fn seal_file(secrets: &Path, quote: &Quote, output: &Path) -> Result<PathBuf, Error> {
    let file_name = secrets
        .file_name()
        .ok_or_else(|| Error::Material(format!("{} is not a file", secrets.display())))?;
    let plaintext = std::fs::read(secrets)
        .map_err(|e| Error::Material(format!("{}: {}", secrets.display(), e)))?;

    let sealed = seal(&plaintext, &quote.sealing_public_key())?;

    let mut name = file_name.to_os_string();
    name.push(".");
    name.push(SEALED_EXTENSION);
    let path = output.join(name);
    std::fs::write(&path, sealed)
        .map_err(|e| Error::Material(format!("{}: {}", path.display(), e)))?;

    info!("Sealed secrets written to {}", path.display());
    Ok(path)
}
