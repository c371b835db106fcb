// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::quote::Quote;
use const_oid::ObjectIdentifier;
use der::Decode;
use openssl::sha::sha256;
use openssl::x509::X509Ref;
use x509_cert::Certificate;

/// X.509 extension carrying the enclave quote in RA-TLS certificates
pub const RATLS_QUOTE_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113741.1337.6");

pub(crate) fn parse(cert: &X509Ref) -> Result<Certificate, Error> {
    let der = cert
        .to_der()
        .map_err(|e| Error::Certificate(e.to_string()))?;
    Certificate::from_der(&der).map_err(|e| Error::Certificate(e.to_string()))
}

/// Value of the extension `oid`, if present
pub(crate) fn extension<'a>(cert: &'a Certificate, oid: &ObjectIdentifier) -> Option<&'a [u8]> {
    cert.tbs_certificate
        .extensions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|e| &e.extn_id == oid)
        .map(|e| e.extn_value.as_bytes())
}

/// Extract the quote embedded in an RA-TLS certificate.
pub fn quote_from_certificate(cert: &X509Ref) -> Result<Quote, Error> {
    let c = parse(cert)?;
    let raw = extension(&c, &RATLS_QUOTE_OID).ok_or_else(|| {
        Error::Certificate(format!("no quote extension ({RATLS_QUOTE_OID}) found"))
    })?;
    Quote::decode(raw)
}

/// Check that the first half of the report data is the SHA-256 of the
/// certificate's public key.
pub fn check_binding(cert: &X509Ref, quote: &Quote) -> Result<(), Error> {
    let c = parse(cert)?;
    let pk = c
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .raw_bytes();

    if sha256(pk)[..] != quote.report_data[..32] {
        return Err(Error::CertificateBinding);
    }
    Ok(())
}

/// Certificate subject as an RFC 4514 string, for messages
pub(crate) fn subject(cert: &X509Ref) -> String {
    parse(cert)
        .map(|c| c.tbs_certificate.subject.to_string())
        .unwrap_or_else(|_| "<unparsable certificate>".to_string())
}
