// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Launch configuration of an enclave instance and its two-way mapping to
//! what the container runtime receives and later reports back.
//!
//! A [`LaunchConfig`] is turned into a [`LaunchSpec`] (entrypoint
//! arguments, mounts, devices, port bindings and labels).  The runtime only
//! keeps the parts it echoes back in an [`ObservedLaunch`], from which
//! [`LaunchConfig::from_observed`] rebuilds the original configuration.
//!
//! ```
//! use sgx_deploy::launch::{Identity, Isolation, LaunchConfig, ObservedLaunch};
//! use uuid::Uuid;
//!
//! let cfg = LaunchConfig {
//!     size: 4096,
//!     host: "localhost".to_string(),
//!     app_id: Uuid::nil(),
//!     code: "/work/code.tar".into(),
//!     application: "app:app".to_string(),
//!     identity: Identity::SelfSigned { expiration: 1_800_000_000 },
//!     healthcheck: "/health".to_string(),
//!     isolation: Isolation::Sgx { signer_key: "/keys/signer.pem".into() },
//!     port: 5555,
//! };
//!
//! let observed = ObservedLaunch::from(&cfg.to_launch_spec());
//!
//! assert_eq!(LaunchConfig::from_observed(&observed).unwrap(), cfg);
//! ```

pub use self::appargs::ApplicationArguments;
pub use self::arglist::{ArgList, ArgValue};
pub use self::errors::Error;
pub use self::launchconfig::*;
pub use self::launchspec::{HostBinding, LaunchSpec, ObservedLaunch, PortBinding, VolumeMount};

mod appargs;
mod arglist;
mod errors;
mod launchconfig;
mod launchspec;
