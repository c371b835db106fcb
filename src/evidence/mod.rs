// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Evidence of a running enclave and its offline appraisal.
//!
//! The evidence bundles the instance's RA-TLS certificate (which embeds an
//! SGX quote), the public key of the enclave signer, the public launch
//! arguments and, optionally, Intel collaterals fetched from a PCCS.
//!
//! A verifier recomputes the enclave fingerprint from the package and the
//! launch arguments, then calls [`verify`]:
//!
//! ```no_run
//! use sgx_deploy::evidence::{verify, Evidence, Fingerprint};
//! use std::path::Path;
//!
//! let e = Evidence::load(Path::new("evidence.json")).expect("loading evidence");
//! let expected: Fingerprint = "5694d08a2e53ffcae0c3103e5ad6f6076abd960eb1f8a56577040bc1028f702b"
//!     .parse()
//!     .expect("parsing fingerprint");
//!
//! let quote = verify(&e, &expected).expect("verifying evidence");
//! println!("sealing key: {}", hex::encode(quote.sealing_public_key()));
//! ```

pub use self::collaterals::{decode_crl, Collaterals};
pub use self::collect::RatlsCollector;
pub use self::errors::Error;
pub use self::evidence::Evidence;
pub use self::fingerprint::{compute_fingerprint, fingerprint_of_package, Fingerprint};
pub use self::icollector::IEvidenceCollector;
pub use self::pccs::PccsClient;
pub use self::pck::{fmspc, pck_leaf};
pub use self::quote::Quote;
pub use self::ratls::{check_binding, quote_from_certificate, RATLS_QUOTE_OID};
pub use self::signer::{load_public_from_private, mr_signer};
pub use self::verify::verify;

mod collaterals;
mod collect;
mod errors;
#[allow(clippy::module_inception)]
mod evidence;
mod fingerprint;
mod icollector;
mod pccs;
mod pck;
mod quote;
mod ratls;
mod signer;
mod verify;
