// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use crate::launch::{HostBinding, ObservedLaunch, VolumeMount};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Unknown,
}

impl ContainerStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Exited => "exited",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }

    /// The container accepted its configuration and did not stop
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Created | Self::Running | Self::Restarting)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub name: String,
    pub image: String,
    pub status: ContainerStatus,
    pub started_at: String,
    pub launch: ObservedLaunch,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Inspect {
    name: String,
    state: InspectState,
    config: InspectConfig,
    host_config: InspectHostConfig,
    #[serde(default)]
    mounts: Vec<InspectMount>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectState {
    status: String,
    #[serde(default)]
    started_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectConfig {
    image: String,
    #[serde(default)]
    cmd: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectHostConfig {
    #[serde(default)]
    port_bindings: Option<BTreeMap<String, Option<Vec<HostBinding>>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectMount {
    source: String,
    destination: String,
    #[serde(rename = "RW", default)]
    rw: bool,
}

impl From<Inspect> for ContainerRecord {
    fn from(i: Inspect) -> Self {
        let port_bindings = i
            .host_config
            .port_bindings
            .unwrap_or_default()
            .into_iter()
            .map(|(port, b)| (port, b.unwrap_or_default()))
            .collect();

        let mounts = i
            .mounts
            .into_iter()
            .map(|m| VolumeMount {
                source: m.source.into(),
                destination: m.destination,
                read_write: m.rw,
            })
            .collect();

        Self {
            name: i.name.trim_start_matches('/').to_string(),
            image: i.config.image,
            status: ContainerStatus::parse(&i.state.status),
            started_at: i.state.started_at,
            launch: ObservedLaunch {
                argv: i.config.cmd.unwrap_or_default(),
                port_bindings,
                labels: i.config.labels.unwrap_or_default(),
                mounts,
            },
        }
    }
}

impl ContainerRecord {
    /// Decode the JSON array printed by `docker inspect`
    pub fn from_inspect_json(j: &str) -> Result<Vec<Self>, Error> {
        let v: Vec<Inspect> = serde_json::from_str(j).map_err(|e| Error::Output(e.to_string()))?;
        Ok(v.into_iter().map(Self::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::{LaunchConfig, SIGNER_KEY_MOUNTPOINT};

    const INSPECT: &str = include_str!("../../testdata/docker-inspect.json");

    #[test]
    fn decode_inspect_output() {
        let r = ContainerRecord::from_inspect_json(INSPECT).unwrap();
        assert_eq!(r.len(), 1);

        let c = &r[0];
        assert_eq!(c.name, "hello");
        assert_eq!(c.status, ContainerStatus::Running);
        assert_eq!(c.image, "sha256:e1b5d0f3b5c8");
        assert_eq!(
            c.launch.mount_source(SIGNER_KEY_MOUNTPOINT).unwrap(),
            &std::path::PathBuf::from("/home/op/.config/enclave-key.pem")
        );

        let cfg = LaunchConfig::from_observed(&c.launch).unwrap();
        assert_eq!(cfg.port, 5555);
        assert_eq!(cfg.size, 4096);
        assert_eq!(cfg.healthcheck, "/health");
        assert!(cfg.is_sgx());
    }

    #[test]
    fn status_strings() {
        for s in ["created", "running", "paused", "restarting", "removing", "exited", "dead"] {
            assert_eq!(ContainerStatus::parse(s).as_str(), s);
        }
        assert_eq!(ContainerStatus::parse("???"), ContainerStatus::Unknown);
        assert!(!ContainerStatus::Exited.is_alive());
    }

    #[test]
    fn garbage() {
        assert!(matches!(
            ContainerRecord::from_inspect_json("{}"),
            Err(Error::Output(_))
        ));
    }
}
