// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::evidence::Evidence;
use super::fingerprint::Fingerprint;
use super::pck::pck_leaf;
use super::quote::Quote;
use super::ratls;
use super::signer::mr_signer;
use tracing::{info, warn};

/// Appraise `evidence` against the fingerprint the verifier expects.
///
/// Checks run in a fixed order and stop at the first failure:
/// 1. the certificate's public key is bound to the quote's report data
/// 2. the quote's MRSIGNER matches the signer public key
/// 3. the quote's MRENCLAVE matches `fingerprint`
/// 4. when collaterals are present, neither the TCB signing certificate nor
///    the PCK certificate is revoked
///
/// On success, the verified quote is returned.
pub fn verify(evidence: &Evidence, fingerprint: &Fingerprint) -> Result<Quote, Error> {
    let cert = evidence.certificate()?;
    let quote = ratls::quote_from_certificate(&cert)?;
    ratls::check_binding(&cert, &quote)?;

    let signer_key = evidence.signer_key()?;
    let expected_signer = mr_signer(&signer_key)?;
    if quote.mr_signer != expected_signer {
        return Err(Error::WrongSigner {
            expected: hex::encode(expected_signer),
            actual: hex::encode(quote.mr_signer),
        });
    }
    info!("Enclave signer verification succeeded");

    if quote.mr_enclave != fingerprint.0 {
        return Err(Error::WrongFingerprint {
            expected: fingerprint.to_string(),
            actual: hex::encode(quote.mr_enclave),
        });
    }
    info!("Code fingerprint verification succeeded");

    match &evidence.collaterals {
        Some(c) => {
            let chain = quote
                .pck_chain_pem()
                .ok_or_else(|| Error::Quote("no PCK certificate chain in the quote".to_string()))?;
            c.check_revocations(&pck_leaf(chain)?)?;
            info!("No revoked certificate in the collaterals");
        }
        None => warn!("No collaterals in the evidence: revocation checks skipped"),
    }

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64::Bytes;
    use crate::evidence::evidence::tests::sample;
    use crate::evidence::Collaterals;

    const MR_ENCLAVE: &str = "5694d08a2e53ffcae0c3103e5ad6f6076abd960eb1f8a56577040bc1028f702b";
    const OTHER: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    fn fp(s: &str) -> Fingerprint {
        s.parse().unwrap()
    }

    fn collaterals(root: &str, platform: &str) -> Collaterals {
        Collaterals {
            root_ca_crl: root.to_string(),
            pck_platform_crl: platform.to_string(),
            tcb_info: Bytes::from(&b"{\"tcbInfo\":{}}"[..]),
            qe_identity: Bytes::from(&b"{\"enclaveIdentity\":{}}"[..]),
            tcb_cert: include_str!("../../testdata/tcb-cert.pem").to_string(),
        }
    }

    #[test]
    fn verify_ok() {
        let e = sample("testdata/signer-key.pem");

        let q = verify(&e, &fp(MR_ENCLAVE)).unwrap();
        assert_eq!(hex::encode(q.mr_enclave), MR_ENCLAVE);
    }

    #[test]
    fn wrong_fingerprint_quotes_both_values() {
        let e = sample("testdata/signer-key.pem");

        let err = verify(&e, &fp(OTHER)).unwrap_err();
        assert_eq!(
            err,
            Error::WrongFingerprint {
                expected: OTHER.to_string(),
                actual: MR_ENCLAVE.to_string(),
            }
        );

        let msg = err.to_string();
        assert!(msg.contains(OTHER) && msg.contains(MR_ENCLAVE), "{msg}");
    }

    #[test]
    fn wrong_signer() {
        let e = sample("testdata/other-signer-key.pem");

        assert_eq!(
            verify(&e, &fp(MR_ENCLAVE)),
            Err(Error::WrongSigner {
                expected: "8eab4f6a07048b65c3e865ce3f49a78541a320e410b1d43622b50dd9d24d811c"
                    .to_string(),
                actual: "6784e006a817f77ce2c06db997e2eb060d50a1e9ab1432f1d713017b815741d5"
                    .to_string(),
            })
        );
    }

    #[test]
    fn signer_is_checked_before_fingerprint() {
        let e = sample("testdata/other-signer-key.pem");

        assert!(matches!(
            verify(&e, &fp(OTHER)),
            Err(Error::WrongSigner { .. })
        ));
    }

    #[test]
    fn unbound_certificate() {
        let mut e = sample("testdata/signer-key.pem");
        e.ratls_certificate = include_str!("../../testdata/ratls-cert-unbound.pem").to_string();

        assert_eq!(
            verify(&e, &fp(MR_ENCLAVE)),
            Err(Error::CertificateBinding)
        );
    }

    #[test]
    fn clean_collaterals() {
        let mut e = sample("testdata/signer-key.pem");
        let empty = include_str!("../../testdata/crl-empty.pem");
        e.collaterals = Some(collaterals(empty, empty));

        assert!(verify(&e, &fp(MR_ENCLAVE)).is_ok());
    }

    #[test]
    fn revoked_pck_certificate() {
        let mut e = sample("testdata/signer-key.pem");
        e.collaterals = Some(collaterals(
            include_str!("../../testdata/crl-empty.pem"),
            include_str!("../../testdata/crl-revokes-pck.pem"),
        ));

        match verify(&e, &fp(MR_ENCLAVE)) {
            Err(Error::RevokedCertificate { subject, crl }) => {
                assert_eq!(subject, "CN=Intel SGX PCK Certificate");
                assert_eq!(crl, "PCK platform CRL");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fingerprint_is_checked_before_collaterals() {
        let mut e = sample("testdata/signer-key.pem");
        let revoking = include_str!("../../testdata/crl-revokes-tcb.pem");
        e.collaterals = Some(collaterals(revoking, revoking));

        assert!(matches!(
            verify(&e, &fp(OTHER)),
            Err(Error::WrongFingerprint { .. })
        ));
    }
}
