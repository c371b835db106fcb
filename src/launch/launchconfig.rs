// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::appargs::ApplicationArguments;
use super::arglist::ArgList;
use super::errors::Error;
use super::launchspec::{LaunchSpec, ObservedLaunch, PortBinding, VolumeMount};
use std::path::PathBuf;
use uuid::Uuid;

pub const ENTRYPOINT: &str = "mse-run";
pub const CODE_MOUNTPOINT: &str = "/tmp/app.tar";
pub const CERT_MOUNTPOINT: &str = "/tmp/cert.pem";
pub const SIGNER_KEY_MOUNTPOINT: &str = "/root/.config/gramine/enclave-key.pem";
pub const AESMD_SOCKET_DIR: &str = "/var/run/aesmd";
pub const CONTAINER_PORT: &str = "443/tcp";
pub const LOOPBACK: &str = "127.0.0.1";
/// Marks the containers this tool manages
pub const INSTANCE_LABEL: &str = "sgx-deploy";
pub const HEALTHCHECK_LABEL: &str = "healthcheck_endpoint";
pub const SGX_DEVICES: [&str; 4] = [
    "/dev/sgx_enclave",
    "/dev/sgx_provision",
    "/dev/sgx/enclave",
    "/dev/sgx/provision",
];

/// How the instance proves who it is over TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Self-signed RA-TLS certificate expiring at the given UNIX time
    SelfSigned { expiration: i64 },
    /// Operator-supplied certificate on the host
    Certificate { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Isolation {
    /// Hardware enclave, signed with the key at `signer_key`
    Sgx { signer_key: PathBuf },
    /// Ordinary container, for development only
    Plain,
}

/// Everything needed to start an instance, and everything that can be
/// recovered from the runtime once it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Enclave size in megabytes
    pub size: u64,
    /// Subject alternative name of the instance certificate
    pub host: String,
    pub app_id: Uuid,
    /// Host path of the encrypted code archive
    pub code: PathBuf,
    /// `module:variable` entrypoint of the application
    pub application: String,
    pub identity: Identity,
    pub healthcheck: String,
    pub isolation: Isolation,
    /// Host port forwarded to the instance
    pub port: u16,
}

/// The entrypoint arguments every run shares, whether measuring or serving.
pub(crate) fn enclave_args(
    size: u64,
    host: &str,
    app_id: &Uuid,
    application: &str,
    expiration: Option<i64>,
) -> ArgList {
    let mut args = ArgList::new();
    args.push("size", format!("{size}M"))
        .push("code", CODE_MOUNTPOINT)
        .push("san", host)
        .push("id", app_id.to_string())
        .push("application", application);

    match expiration {
        Some(exp) => args.push("ratls", exp.to_string()),
        None => args.push("certificate", CERT_MOUNTPOINT),
    };

    args
}

fn no_dashes(key: &str, v: &str) -> Result<(), Error> {
    if v.is_empty() || v.starts_with("--") {
        return Err(Error::Invalid(format!("{key} cannot be '{v}'")));
    }
    Ok(())
}

/// Check the operator-chosen part of a launch: enclave size, host name and
/// published port.
pub fn validate_placement(size: u64, host: &str, port: u16) -> Result<(), Error> {
    if !size.is_power_of_two() {
        return Err(Error::Invalid(format!(
            "enclave size must be a power of two, got {size}"
        )));
    }

    no_dashes("host", host)?;

    if port == 0 {
        return Err(Error::Invalid("port 0 cannot be published".to_string()));
    }

    Ok(())
}

impl LaunchConfig {
    pub fn is_sgx(&self) -> bool {
        matches!(self.isolation, Isolation::Sgx { .. })
    }

    pub fn expiration(&self) -> Option<i64> {
        match self.identity {
            Identity::SelfSigned { expiration } => Some(expiration),
            Identity::Certificate { .. } => None,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_placement(self.size, &self.host, self.port)?;
        no_dashes("application", &self.application)?;

        if !self.healthcheck.starts_with('/') {
            return Err(Error::Invalid(format!(
                "healthcheck endpoint must be an absolute path, got '{}'",
                self.healthcheck
            )));
        }

        Ok(())
    }

    pub fn to_launch_spec(&self) -> LaunchSpec {
        let mut args = enclave_args(
            self.size,
            &self.host,
            &self.app_id,
            &self.application,
            self.expiration(),
        );

        let mut volumes = vec![VolumeMount {
            source: self.code.clone(),
            destination: CODE_MOUNTPOINT.to_string(),
            read_write: true,
        }];

        if let Identity::Certificate { path } = &self.identity {
            volumes.push(VolumeMount {
                source: path.clone(),
                destination: CERT_MOUNTPOINT.to_string(),
                read_write: true,
            });
        }

        let mut devices = Vec::new();

        match &self.isolation {
            Isolation::Sgx { signer_key } => {
                volumes.push(VolumeMount {
                    source: AESMD_SOCKET_DIR.into(),
                    destination: AESMD_SOCKET_DIR.to_string(),
                    read_write: true,
                });
                volumes.push(VolumeMount {
                    source: signer_key.clone(),
                    destination: SIGNER_KEY_MOUNTPOINT.to_string(),
                    read_write: true,
                });
                devices = SGX_DEVICES.iter().map(|d| d.to_string()).collect();
            }
            Isolation::Plain => {
                args.push_flag("no-sgx");
            }
        }

        LaunchSpec {
            entrypoint: ENTRYPOINT.to_string(),
            argv: args.to_argv(),
            volumes,
            devices,
            ports: vec![PortBinding {
                container_port: CONTAINER_PORT.to_string(),
                host_ip: LOOPBACK.to_string(),
                host_port: self.port,
            }],
            labels: [
                (INSTANCE_LABEL.to_string(), "1".to_string()),
                (HEALTHCHECK_LABEL.to_string(), self.healthcheck.clone()),
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Rebuild the configuration of a running instance.  Keys the
    /// entrypoint does not know are ignored.
    pub fn from_observed(o: &ObservedLaunch) -> Result<Self, Error> {
        let args = ArgList::parse(&o.argv)?;

        let size = args.require("size")?;
        let size = size
            .strip_suffix('M')
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| Error::bad_value("size", format!("expecting <n>M, got '{size}'")))?;

        let host = args.require("san")?.to_string();
        let app_id = Uuid::parse_str(args.require("id")?).map_err(|e| Error::bad_value("id", e))?;
        let application = args.require("application")?.to_string();

        let mounted = |key: &str| -> Result<PathBuf, Error> {
            let inside = args.require(key)?;
            o.mount_source(inside)
                .cloned()
                .ok_or_else(|| Error::missing(&format!("mount for {inside}")))
        };

        let code = mounted("code")?;

        let identity = match (args.value("ratls")?, args.value("certificate")?) {
            (Some(exp), None) => Identity::SelfSigned {
                expiration: exp.parse().map_err(|e| Error::bad_value("ratls", e))?,
            },
            (None, Some(_)) => Identity::Certificate {
                path: mounted("certificate")?,
            },
            (Some(_), Some(_)) => {
                return Err(Error::Malformed(
                    "both ratls and certificate are set".to_string(),
                ))
            }
            (None, None) => return Err(Error::missing("ratls")),
        };

        let isolation = if args.has_flag("no-sgx") {
            Isolation::Plain
        } else {
            Isolation::Sgx {
                signer_key: o
                    .mount_source(SIGNER_KEY_MOUNTPOINT)
                    .cloned()
                    .ok_or_else(|| Error::missing(&format!("mount for {SIGNER_KEY_MOUNTPOINT}")))?,
            }
        };

        let healthcheck = o
            .labels
            .get(HEALTHCHECK_LABEL)
            .cloned()
            .ok_or_else(|| Error::missing(&format!("label {HEALTHCHECK_LABEL}")))?;

        let binding = o
            .port_bindings
            .get(CONTAINER_PORT)
            .and_then(|b| b.first())
            .ok_or_else(|| Error::missing(&format!("port binding for {CONTAINER_PORT}")))?;
        let port = binding
            .host_port
            .parse()
            .map_err(|e| Error::bad_value("port", e))?;

        let config = Self {
            size,
            host,
            app_id,
            code,
            application,
            identity,
            healthcheck,
            isolation,
            port,
        };
        config.validate()?;

        Ok(config)
    }

    /// The public part of the configuration, needed to recompute the
    /// enclave fingerprint.
    pub fn app_args(&self) -> ApplicationArguments {
        ApplicationArguments {
            host: self.host.clone(),
            expiration_date: self.expiration(),
            size: self.size,
            app_id: self.app_id,
            application: self.application.clone(),
            certificate: match &self.identity {
                Identity::Certificate { path } => path.file_name().map(PathBuf::from),
                Identity::SelfSigned { .. } => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(identity: Identity, isolation: Isolation) -> LaunchConfig {
        LaunchConfig {
            size: 4096,
            host: "localhost".to_string(),
            app_id: Uuid::parse_str("6b5e4d0c-0d47-4b39-a0c4-3a0a6f9a4d11").unwrap(),
            code: "/work/app/code.tar".into(),
            application: "app:app".to_string(),
            identity,
            healthcheck: "/health".to_string(),
            isolation,
            port: 5555,
        }
    }

    fn sgx() -> Isolation {
        Isolation::Sgx {
            signer_key: "/keys/enclave-key.pem".into(),
        }
    }

    #[test]
    fn sgx_launch_spec() {
        let cfg = sample(Identity::SelfSigned { expiration: 1700000000 }, sgx());
        let spec = cfg.to_launch_spec();

        assert_eq!(spec.entrypoint, "mse-run");
        assert_eq!(
            spec.argv,
            [
                "--size",
                "4096M",
                "--code",
                "/tmp/app.tar",
                "--san",
                "localhost",
                "--id",
                "6b5e4d0c-0d47-4b39-a0c4-3a0a6f9a4d11",
                "--application",
                "app:app",
                "--ratls",
                "1700000000"
            ]
        );
        assert_eq!(spec.devices.len(), 4);
        assert!(spec
            .volumes
            .iter()
            .any(|v| v.destination == SIGNER_KEY_MOUNTPOINT
                && v.source == PathBuf::from("/keys/enclave-key.pem")));
        assert!(spec
            .volumes
            .iter()
            .any(|v| v.destination == AESMD_SOCKET_DIR));
        assert_eq!(spec.ports[0].host_ip, "127.0.0.1");
        assert_eq!(spec.ports[0].host_port, 5555);
        assert_eq!(spec.labels.get(INSTANCE_LABEL).unwrap(), "1");
        assert_eq!(spec.labels.get(HEALTHCHECK_LABEL).unwrap(), "/health");
    }

    #[test]
    fn plain_launch_spec() {
        let cfg = sample(
            Identity::Certificate {
                path: "/certs/app.pem".into(),
            },
            Isolation::Plain,
        );
        let spec = cfg.to_launch_spec();

        assert!(spec.devices.is_empty());
        assert_eq!(
            &spec.argv[spec.argv.len() - 3..],
            ["--certificate", "/tmp/cert.pem", "--no-sgx"]
        );
        assert!(!spec
            .volumes
            .iter()
            .any(|v| v.destination == SIGNER_KEY_MOUNTPOINT));
        assert!(spec
            .volumes
            .iter()
            .any(|v| v.destination == CERT_MOUNTPOINT));
    }

    #[test]
    fn decode_names_missing_key() {
        let cfg = sample(Identity::SelfSigned { expiration: 1 }, sgx());
        let mut observed = ObservedLaunch::from(&cfg.to_launch_spec());

        // drop `--san localhost`
        observed.argv.drain(4..6);

        assert_eq!(
            LaunchConfig::from_observed(&observed),
            Err(Error::missing("san"))
        );
    }

    #[test]
    fn decode_needs_signer_key_mount() {
        let cfg = sample(Identity::SelfSigned { expiration: 1 }, sgx());
        let mut observed = ObservedLaunch::from(&cfg.to_launch_spec());
        observed
            .mounts
            .retain(|m| m.destination != SIGNER_KEY_MOUNTPOINT);

        match LaunchConfig::from_observed(&observed) {
            Err(Error::Decode { key, .. }) => assert!(key.contains(SIGNER_KEY_MOUNTPOINT)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn decode_needs_port_binding() {
        let cfg = sample(Identity::SelfSigned { expiration: 1 }, Isolation::Plain);
        let mut observed = ObservedLaunch::from(&cfg.to_launch_spec());
        observed.port_bindings.clear();

        assert!(matches!(
            LaunchConfig::from_observed(&observed),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn decode_tolerates_unknown_keys() {
        let cfg = sample(Identity::SelfSigned { expiration: 1 }, sgx());
        let mut observed = ObservedLaunch::from(&cfg.to_launch_spec());
        observed.argv.push("--verbose".to_string());

        assert_eq!(LaunchConfig::from_observed(&observed).unwrap(), cfg);
    }

    #[test]
    fn decoded_config_is_validated() {
        let cfg = sample(Identity::SelfSigned { expiration: 1 }, sgx());
        let mut observed = ObservedLaunch::from(&cfg.to_launch_spec());
        let at = observed.argv.iter().position(|a| a == "4096M").unwrap();
        observed.argv[at] = "3000M".to_string();

        assert!(matches!(
            LaunchConfig::from_observed(&observed),
            Err(Error::Invalid(m)) if m.contains("3000")
        ));
    }

    #[test]
    fn app_args_keep_certificate_name_only() {
        let cfg = sample(
            Identity::Certificate {
                path: "/home/op/certs/app.pem".into(),
            },
            sgx(),
        );
        let a = cfg.app_args();

        assert_eq!(a.certificate, Some(PathBuf::from("app.pem")));
        assert_eq!(a.expiration_date, None);
        assert_eq!(a.app_id, cfg.app_id);
    }

    #[test]
    fn validation() {
        let mut cfg = sample(Identity::SelfSigned { expiration: 1 }, sgx());
        assert!(cfg.validate().is_ok());

        cfg.size = 3000;
        assert!(matches!(cfg.validate(), Err(Error::Invalid(_))));

        cfg.size = 2048;
        cfg.host = "--evil".to_string();
        assert!(matches!(cfg.validate(), Err(Error::Invalid(_))));

        assert!(validate_placement(4096, "localhost", 5555).is_ok());
        assert!(validate_placement(4096, "localhost", 0).is_err());
        assert!(validate_placement(4095, "localhost", 5555).is_err());
    }

    fn arb_identity() -> impl Strategy<Value = Identity> {
        prop_oneof![
            any::<i64>().prop_map(|expiration| Identity::SelfSigned { expiration }),
            "/[a-z]{1,8}/[a-z]{1,8}\\.pem".prop_map(|p| Identity::Certificate { path: p.into() }),
        ]
    }

    fn arb_isolation() -> impl Strategy<Value = Isolation> {
        prop_oneof![
            Just(Isolation::Plain),
            "/[a-z]{1,8}/key\\.pem".prop_map(|p| Isolation::Sgx {
                signer_key: p.into()
            }),
        ]
    }

    prop_compose! {
        fn arb_config()(
            shift in 0u32..20,
            host in "[a-z][a-z0-9.-]{0,20}",
            id in any::<u128>(),
            code in "/[a-z]{1,10}/code\\.tar",
            application in "[a-z_]{1,8}:[a-z_]{1,8}",
            identity in arb_identity(),
            healthcheck in "/[a-z/]{0,10}",
            isolation in arb_isolation(),
            port in 1u16..,
        ) -> LaunchConfig {
            LaunchConfig {
                size: 1 << shift,
                host,
                app_id: Uuid::from_u128(id),
                code: code.into(),
                application,
                identity,
                healthcheck,
                isolation,
                port,
            }
        }
    }

    proptest! {
        #[test]
        fn observed_launch_decodes_back(cfg in arb_config()) {
            prop_assert!(cfg.validate().is_ok());
            let observed = ObservedLaunch::from(&cfg.to_launch_spec());
            prop_assert_eq!(LaunchConfig::from_observed(&observed).unwrap(), cfg);
        }
    }
}
