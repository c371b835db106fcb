// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::container::ContainerRecord;
use super::errors::Error;
use crate::launch::LaunchSpec;
use std::path::Path;
use std::time::Duration;

/// Interface to the container runtime hosting the instances.
pub trait IContainerRuntime {
    /// Lookup a container by name
    fn find(&self, name: &str) -> Result<Option<ContainerRecord>, Error>;

    /// All containers carrying `label`, whatever their state
    fn list(&self, label: &str) -> Result<Vec<ContainerRecord>, Error>;

    /// Load a saved image archive and return the reference of the loaded
    /// image
    fn load_image(&self, archive: &Path) -> Result<String, Error>;

    /// Build `dockerfile` within `context` and tag the result
    fn build_image(&self, context: &Path, dockerfile: &Path, tag: &str) -> Result<(), Error>;

    /// Save the image `tag` to an archive at `output`
    fn save_image(&self, tag: &str, output: &Path) -> Result<(), Error>;

    /// Create and start a detached container
    fn create(&self, name: &str, image: &str, spec: &LaunchSpec)
        -> Result<ContainerRecord, Error>;

    /// Run a throw-away container to completion and return everything it
    /// printed, whatever its exit status
    fn run_to_completion(&self, image: &str, spec: &LaunchSpec) -> Result<Vec<u8>, Error>;

    fn stop(&self, name: &str, grace: Duration) -> Result<(), Error>;

    fn remove(&self, name: &str) -> Result<(), Error>;

    fn restart(&self, name: &str) -> Result<(), Error>;

    fn logs(&self, name: &str) -> Result<String, Error>;

    /// Stream the logs to the terminal until the container stops
    fn follow_logs(&self, name: &str) -> Result<(), Error>;
}
