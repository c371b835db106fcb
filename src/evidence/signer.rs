// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::{io, Error};
use openssl::pkey::{HasPublic, PKey, PKeyRef, Public};
use openssl::sha::sha256;
use std::path::Path;

/// SGX enclave signing keys are 3072-bit RSA keys
const MODULUS_LEN: i32 = 384;

/// MRSIGNER of enclaves signed with `pk`: the SHA-256 of the RSA modulus
/// in little-endian order.
pub fn mr_signer<T: HasPublic>(pk: &PKeyRef<T>) -> Result<[u8; 32], Error> {
    let rsa = pk
        .rsa()
        .map_err(|_| Error::SignerKey("not an RSA key".to_string()))?;

    let mut n = rsa
        .n()
        .to_vec_padded(MODULUS_LEN)
        .map_err(|e| Error::SignerKey(format!("modulus larger than 3072 bits: {e}")))?;
    n.reverse();

    Ok(sha256(&n))
}

/// Public half of the PEM private key at `path`
pub fn load_public_from_private(path: &Path) -> Result<PKey<Public>, Error> {
    let pem = std::fs::read(path).map_err(|e| io(path, e))?;
    let sk = PKey::private_key_from_pem(&pem).map_err(|e| Error::SignerKey(e.to_string()))?;
    let spki = sk
        .public_key_to_pem()
        .map_err(|e| Error::SignerKey(e.to_string()))?;
    PKey::public_key_from_pem(&spki).map_err(|e| Error::SignerKey(e.to_string()))
}
