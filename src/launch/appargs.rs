// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::launchconfig::{enclave_args, CERT_MOUNTPOINT, CODE_MOUNTPOINT, ENTRYPOINT};
use super::launchspec::{LaunchSpec, VolumeMount};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The public launch arguments of an instance.  Anybody holding these and
/// the package can recompute the enclave fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationArguments {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<i64>,
    pub size: u64,
    pub app_id: Uuid,
    pub application: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PathBuf>,
}

impl ApplicationArguments {
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        let a: Self = toml::from_str(s).map_err(|e| Error::AppArgs(e.to_string()))?;
        a.validate()?;
        Ok(a)
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| Error::AppArgs(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| Error::AppArgs(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&s)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| Error::AppArgs(format!("{}: {}", path.display(), e)))
    }

    fn validate(&self) -> Result<(), Error> {
        match (&self.expiration_date, &self.certificate) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(Error::AppArgs(
                "exactly one of expiration_date and certificate must be set".to_string(),
            )),
        }
    }

    /// Resolves a certificate file name against the directory the operator
    /// keeps it in.  Absolute paths are left alone.
    pub fn with_certificate_dir(mut self, dir: &Path) -> Self {
        if let Some(cert) = self.certificate.take() {
            self.certificate = Some(if cert.is_absolute() {
                cert
            } else {
                dir.join(cert)
            });
        }
        self
    }

    /// Entrypoint arguments of a measurement-only run.
    pub fn measurement_argv(&self) -> Vec<String> {
        let mut args = enclave_args(
            self.size,
            &self.host,
            &self.app_id,
            &self.application,
            self.expiration_date,
        );
        args.push_flag("dry-run");
        args.to_argv()
    }

    /// A network-less run that only prints the enclave measurement.
    pub fn measurement_spec(&self, code: &Path) -> LaunchSpec {
        let mut volumes = vec![VolumeMount {
            source: code.to_path_buf(),
            destination: CODE_MOUNTPOINT.to_string(),
            read_write: true,
        }];

        if let Some(cert) = &self.certificate {
            volumes.push(VolumeMount {
                source: cert.clone(),
                destination: CERT_MOUNTPOINT.to_string(),
                read_write: true,
            });
        }

        LaunchSpec {
            entrypoint: ENTRYPOINT.to_string(),
            argv: self.measurement_argv(),
            volumes,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGS_TOML: &str = r#"
host = "localhost"
expiration_date = 1714058115
size = 8192
app_id = "4a5f2a8a-96a5-4d8c-9cb1-7e8f1d1c3b52"
application = "app:app"
"#;

    #[test]
    fn parse_ok() {
        let a = ApplicationArguments::from_toml(ARGS_TOML).unwrap();

        assert_eq!(a.size, 8192);
        assert_eq!(a.expiration_date, Some(1714058115));
        assert_eq!(a.certificate, None);
    }

    #[test]
    fn measurement_is_a_dry_run() {
        let a = ApplicationArguments::from_toml(ARGS_TOML).unwrap();
        let spec = a.measurement_spec(Path::new("/ws/code.tar"));

        assert_eq!(
            spec.argv,
            [
                "--size",
                "8192M",
                "--code",
                "/tmp/app.tar",
                "--san",
                "localhost",
                "--id",
                "4a5f2a8a-96a5-4d8c-9cb1-7e8f1d1c3b52",
                "--application",
                "app:app",
                "--ratls",
                "1714058115",
                "--dry-run"
            ]
        );
        assert!(spec.devices.is_empty());
        assert!(spec.ports.is_empty());
        assert_eq!(spec.volumes.len(), 1);
    }

    #[test]
    fn identity_is_exclusive() {
        let both = format!("{ARGS_TOML}certificate = \"/certs/app.pem\"\n");
        assert!(ApplicationArguments::from_toml(&both).is_err());

        let none = ARGS_TOML.replace("expiration_date = 1714058115\n", "");
        assert!(ApplicationArguments::from_toml(&none).is_err());
    }

    #[test]
    fn certificate_resolution() {
        let toml = ARGS_TOML.replace(
            "expiration_date = 1714058115\n",
            "certificate = \"app.pem\"\n",
        );
        let a = ApplicationArguments::from_toml(&toml)
            .unwrap()
            .with_certificate_dir(Path::new("/home/op/certs"));
        let spec = a.measurement_spec(Path::new("/ws/code.tar"));

        assert_eq!(spec.volumes.len(), 2);
        assert_eq!(spec.volumes[1].source, PathBuf::from("/home/op/certs/app.pem"));
        assert_eq!(spec.volumes[1].destination, CERT_MOUNTPOINT);
        assert!(!spec.argv.iter().any(|a| a == "--ratls"));
    }

    #[test]
    fn toml_roundtrip() {
        let a = ApplicationArguments::from_toml(ARGS_TOML).unwrap();
        assert_eq!(
            ApplicationArguments::from_toml(&a.to_toml().unwrap()).unwrap(),
            a
        );
    }
}
