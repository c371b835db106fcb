// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub source: PathBuf,
    pub destination: String,
    pub read_write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    /// `<port>/<proto>` inside the container
    pub container_port: String,
    pub host_ip: String,
    pub host_port: u16,
}

/// Everything the container runtime needs to start an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSpec {
    pub entrypoint: String,
    pub argv: Vec<String>,
    pub volumes: Vec<VolumeMount>,
    pub devices: Vec<String>,
    pub ports: Vec<PortBinding>,
    pub labels: BTreeMap<String, String>,
}

/// Host side of a published port, as the runtime reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostBinding {
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,
    #[serde(rename = "HostPort")]
    pub host_port: String,
}

/// What the runtime remembers of a started instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedLaunch {
    pub argv: Vec<String>,
    pub port_bindings: BTreeMap<String, Vec<HostBinding>>,
    pub labels: BTreeMap<String, String>,
    pub mounts: Vec<VolumeMount>,
}

impl ObservedLaunch {
    /// Host path mounted at `destination`
    pub fn mount_source(&self, destination: &str) -> Option<&PathBuf> {
        self.mounts
            .iter()
            .find(|m| m.destination == destination)
            .map(|m| &m.source)
    }
}

impl From<&LaunchSpec> for ObservedLaunch {
    fn from(spec: &LaunchSpec) -> Self {
        let mut port_bindings: BTreeMap<String, Vec<HostBinding>> = BTreeMap::new();
        for p in &spec.ports {
            port_bindings
                .entry(p.container_port.clone())
                .or_default()
                .push(HostBinding {
                    host_ip: p.host_ip.clone(),
                    host_port: p.host_port.to_string(),
                });
        }

        Self {
            argv: spec.argv.clone(),
            port_bindings,
            labels: spec.labels.clone(),
            mounts: spec.volumes.clone(),
        }
    }
}
