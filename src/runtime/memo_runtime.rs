// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::container::{ContainerRecord, ContainerStatus};
use super::errors::Error;
use super::icontainerruntime::IContainerRuntime;
use crate::launch::{LaunchSpec, ObservedLaunch};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;

/// In-memory runtime: containers are records in a map and every call is
/// journaled.
#[derive(Debug)]
pub(crate) struct MemoRuntime {
    containers: RwLock<BTreeMap<String, ContainerRecord>>,
    calls: RwLock<Vec<String>>,
    /// status given to newly created containers
    start_status: ContainerStatus,
    /// when set, `create` fails with this diagnostic
    reject: Option<String>,
    /// what a measurement run prints
    measurement_output: Vec<u8>,
}

impl Default for MemoRuntime {
    fn default() -> Self {
        Self {
            containers: Default::default(),
            calls: Default::default(),
            start_status: ContainerStatus::Running,
            reject: None,
            measurement_output: Vec::new(),
        }
    }
}

impl MemoRuntime {
    pub(crate) fn with_measurement_output(mut self, output: impl Into<Vec<u8>>) -> Self {
        self.measurement_output = output.into();
        self
    }

    pub(crate) fn with_start_status(mut self, status: ContainerStatus) -> Self {
        self.start_status = status;
        self
    }

    pub(crate) fn rejecting(mut self, diagnostic: &str) -> Self {
        self.reject = Some(diagnostic.to_string());
        self
    }

    pub(crate) fn insert(&self, record: ContainerRecord) {
        self.containers
            .write()
            .unwrap()
            .insert(record.name.clone(), record);
    }

    pub(crate) fn set_status(&self, name: &str, status: ContainerStatus) {
        if let Some(c) = self.containers.write().unwrap().get_mut(name) {
            c.status = status;
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<ContainerRecord> {
        self.containers.read().unwrap().get(name).cloned()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.write().unwrap().push(call);
    }

    fn with<T>(&self, name: &str, f: impl FnOnce(&mut ContainerRecord) -> T) -> Result<T, Error> {
        self.containers
            .write()
            .unwrap()
            .get_mut(name)
            .map(f)
            .ok_or_else(|| Error::Command {
                command: "memo".to_string(),
                stderr: format!("No such container: {name}"),
            })
    }
}

impl IContainerRuntime for MemoRuntime {
    fn find(&self, name: &str) -> Result<Option<ContainerRecord>, Error> {
        Ok(self.get(name))
    }

    fn list(&self, label: &str) -> Result<Vec<ContainerRecord>, Error> {
        Ok(self
            .containers
            .read()
            .unwrap()
            .values()
            .filter(|c| c.launch.labels.contains_key(label))
            .cloned()
            .collect())
    }

    fn load_image(&self, archive: &Path) -> Result<String, Error> {
        self.record(format!("load {}", archive.display()));
        Ok("memo/app:latest".to_string())
    }

    fn build_image(&self, _context: &Path, _dockerfile: &Path, tag: &str) -> Result<(), Error> {
        self.record(format!("build {tag}"));
        Ok(())
    }

    fn save_image(&self, tag: &str, output: &Path) -> Result<(), Error> {
        self.record(format!("save {tag}"));
        std::fs::write(output, tag.as_bytes()).map_err(|e| Error::Output(e.to_string()))
    }

    fn create(
        &self,
        name: &str,
        image: &str,
        spec: &LaunchSpec,
    ) -> Result<ContainerRecord, Error> {
        self.record(format!("create {name}"));

        if let Some(diag) = &self.reject {
            return Err(Error::Command {
                command: "memo run".to_string(),
                stderr: diag.clone(),
            });
        }

        if self.get(name).is_some() {
            return Err(Error::Command {
                command: "memo run".to_string(),
                stderr: format!("Conflict. The container name \"/{name}\" is already in use"),
            });
        }

        let record = ContainerRecord {
            name: name.to_string(),
            image: image.to_string(),
            status: self.start_status,
            started_at: "2026-01-01T00:00:00Z".to_string(),
            launch: ObservedLaunch::from(spec),
        };
        self.insert(record.clone());
        Ok(record)
    }

    fn run_to_completion(&self, image: &str, spec: &LaunchSpec) -> Result<Vec<u8>, Error> {
        self.record(format!("run {image} {}", spec.argv.join(" ")));
        Ok(self.measurement_output.clone())
    }

    fn stop(&self, name: &str, _grace: Duration) -> Result<(), Error> {
        self.record(format!("stop {name}"));
        self.with(name, |c| c.status = ContainerStatus::Exited)
    }

    fn remove(&self, name: &str) -> Result<(), Error> {
        self.record(format!("remove {name}"));
        self.containers
            .write()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::Output(format!("no such container {name}")))
    }

    fn restart(&self, name: &str) -> Result<(), Error> {
        self.record(format!("restart {name}"));
        self.with(name, |c| c.status = ContainerStatus::Running)
    }

    fn logs(&self, name: &str) -> Result<String, Error> {
        self.with(name, |c| format!("logs of {}", c.name))
    }

    fn follow_logs(&self, name: &str) -> Result<(), Error> {
        self.with(name, |_| ())
    }
}
