// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::ratls::{extension, parse};
use const_oid::ObjectIdentifier;
use der::asn1::Any;
use der::{Decode, Sequence};
use openssl::x509::X509;

pub const SGX_EXTENSIONS_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113741.1.13.1");
pub const FMSPC_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113741.1.13.1.4");

#[derive(Sequence)]
struct SgxExtension {
    id: ObjectIdentifier,
    value: Any,
}

/// The PCK leaf certificate of a PEM chain
pub fn pck_leaf(chain: &[u8]) -> Result<X509, Error> {
    X509::stack_from_pem(chain)
        .map_err(|e| Error::Certificate(e.to_string()))?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Certificate("empty PCK certificate chain".to_string()))
}

/// Family-Model-Stepping-Platform-CustomSKU of the platform that issued
/// the PCK certificate.
pub fn fmspc(pck: &X509) -> Result<[u8; 6], Error> {
    let c = parse(pck)?;
    let raw = extension(&c, &SGX_EXTENSIONS_OID)
        .ok_or_else(|| Error::Certificate("PCK certificate has no SGX extensions".to_string()))?;

    let items = Vec::<SgxExtension>::from_der(raw)
        .map_err(|e| Error::Certificate(format!("SGX extensions: {e}")))?;

    let v = items
        .iter()
        .find(|i| i.id == FMSPC_OID)
        .ok_or_else(|| Error::Certificate("no FMSPC in the SGX extensions".to_string()))?;

    v.value
        .value()
        .try_into()
        .map_err(|_| Error::Certificate("FMSPC is not 6 bytes long".to_string()))
}
