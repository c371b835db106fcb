// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::apptest;
use super::errors::Error;
use super::iendpoint::IInstanceEndpoint;
use super::state::InstanceState;
use crate::evidence::{Evidence, IEvidenceCollector};
use crate::launch::{
    validate_placement, Identity, Isolation, LaunchConfig, INSTANCE_LABEL, LOOPBACK,
};
use crate::package::{AppConfig, CodePackage};
use crate::poll::{ClockTick, IClock};
use crate::runtime::{ContainerRecord, ContainerStatus, IContainerRuntime};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ARGS_FILE_NAME: &str = "args.toml";
pub const EVIDENCE_FILE_NAME: &str = "evidence.json";
/// Time given to an instance to shut down before it is killed
pub const STOP_GRACE: Duration = Duration::from_secs(1);
const LOG_TAIL: usize = 20;

/// Operator choices for a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOptions {
    pub host: String,
    pub port: u16,
    /// Enclave size in megabytes
    pub size: u64,
    pub identity: Identity,
    pub isolation: Isolation,
}

/// What a successful spawn leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub config: LaunchConfig,
    pub package: CodePackage,
    pub app_config: AppConfig,
    /// Public launch arguments, to hand over to verifiers
    pub args_path: PathBuf,
    /// Present for enclave instances only
    pub evidence_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceStatus {
    pub name: String,
    pub state: InstanceState,
    pub container: ContainerStatus,
    pub image: String,
    pub started_at: String,
    pub config: LaunchConfig,
}

fn tail(s: &str, n: usize) -> String {
    let lines: Vec<&str> = s.trim_end().lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

fn is_port_free(port: u16) -> bool {
    TcpListener::bind((LOOPBACK, port)).is_ok()
}

/// Drives the lifecycle of instances: the runtime hosts them, the endpoint
/// reaches them and the clock paces every wait.
#[derive(Debug)]
pub struct Orchestrator<R, E, C> {
    runtime: R,
    endpoint: E,
    clock: C,
}

impl<R, E, C> Orchestrator<R, E, C>
where
    R: IContainerRuntime,
    E: IInstanceEndpoint,
    C: IClock,
{
    pub fn new(runtime: R, endpoint: E, clock: C) -> Self {
        Self {
            runtime,
            endpoint,
            clock,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn record(&self, name: &str) -> Result<ContainerRecord, Error> {
        self.runtime
            .find(name)?
            .ok_or_else(|| Error::InstanceNotFound(name.to_string()))
    }

    /// Launch configuration of an existing instance
    pub fn config(&self, name: &str) -> Result<LaunchConfig, Error> {
        Ok(LaunchConfig::from_observed(&self.record(name)?.launch)?)
    }

    /// Probe the healthcheck endpoint of a running instance
    pub fn probe(&self, config: &LaunchConfig) -> InstanceState {
        InstanceState::classify(&self.endpoint.probe(config.port, &config.healthcheck))
    }

    /// One check of a wait: has the instance reached `target`?  Fails as
    /// soon as the instance is gone or stopped.
    pub fn reached(
        &self,
        name: &str,
        config: &LaunchConfig,
        target: InstanceState,
    ) -> Result<bool, Error> {
        let record = self.record(name)?;

        if !record.status.is_alive() {
            let logs = self.runtime.logs(name).unwrap_or_default();
            return Err(Error::InstanceExited(format!(
                "{name} is {}\n{}",
                record.status,
                tail(&logs, LOG_TAIL)
            )));
        }

        let state = match record.status {
            ContainerStatus::Running => self.probe(config),
            other => InstanceState::from_container(other),
        };
        debug!("{name} is {state}");

        Ok(state == target)
    }

    pub fn wait_for(
        &self,
        name: &str,
        config: &LaunchConfig,
        target: InstanceState,
        tick: &ClockTick,
    ) -> Result<(), Error> {
        tick.wait(&self.clock, || {
            Ok::<_, Error>(self.reached(name, config, target)?.then_some(()))
        })
    }

    fn launch(&self, name: &str, image: &str, config: &LaunchConfig) -> Result<(), Error> {
        let spec = config.to_launch_spec();

        let record = self
            .runtime
            .create(name, image, &spec)
            .map_err(|e| match e {
                crate::runtime::Error::Command { stderr, .. } => Error::InstanceCreationFailed(stderr),
                other => Error::Runtime(other),
            })?;

        if !record.status.is_alive() {
            let logs = self.runtime.logs(name).unwrap_or_default();
            return Err(Error::InstanceCreationFailed(format!(
                "{name} is {}\n{}",
                record.status,
                tail(&logs, LOG_TAIL)
            )));
        }

        Ok(())
    }

    /// Start the package at `package` as instance `name`, wait until it
    /// asks for its secrets, then write the public launch arguments and,
    /// for enclaves, the evidence into `workspace`.
    ///
    /// The workspace must outlive the instance: the code archive is mounted
    /// from there.
    pub fn spawn<V: IEvidenceCollector + ?Sized>(
        &self,
        name: &str,
        package: &Path,
        workspace: &Path,
        options: SpawnOptions,
        tick: &ClockTick,
        collector: &V,
    ) -> Result<Deployment, Error> {
        if self.runtime.find(name)?.is_some() {
            return Err(Error::InstanceAlreadyExists(name.to_string()));
        }

        if !is_port_free(options.port) {
            return Err(Error::PortInUse(options.port));
        }

        validate_placement(options.size, &options.host, options.port)?;

        info!("Extracting the package at {}...", workspace.display());
        let package = CodePackage::extract(package, workspace)?;
        let app_config = AppConfig::load(&package.config_path)?;

        let config = LaunchConfig {
            size: options.size,
            host: options.host,
            app_id: Uuid::new_v4(),
            code: package.code_tar.clone(),
            application: app_config.application.clone(),
            identity: options.identity,
            healthcheck: app_config.healthcheck_endpoint.clone(),
            isolation: options.isolation,
            port: options.port,
        };
        config.validate()?;

        info!("Loading the docker image...");
        let image = self.runtime.load_image(&package.image_tar)?;

        info!("Starting {name}...");
        self.launch(name, &image, &config)?;

        info!("Waiting for the configuration server...");
        self.wait_for(name, &config, InstanceState::AwaitingSecrets, tick)?;
        info!("{name} is ready to receive its secrets");

        let args_path = workspace.join(ARGS_FILE_NAME);
        config.app_args().save(&args_path)?;
        info!("Public launch arguments written to {}", args_path.display());

        let evidence_path = match &config.isolation {
            Isolation::Sgx { signer_key } => {
                let e = collector.collect(config.port, signer_key, &config.app_args())?;
                let p = workspace.join(EVIDENCE_FILE_NAME);
                e.save(&p)?;
                info!("Evidence written to {}", p.display());
                Some(p)
            }
            Isolation::Plain => {
                warn!("{name} does not run in an enclave: no evidence to collect");
                None
            }
        };

        Ok(Deployment {
            config,
            package,
            app_config,
            args_path,
            evidence_path,
        })
    }

    /// Gather the evidence of an existing enclave instance
    pub fn collect_evidence<V: IEvidenceCollector + ?Sized>(
        &self,
        name: &str,
        collector: &V,
    ) -> Result<Evidence, Error> {
        let config = self.config(name)?;

        match &config.isolation {
            Isolation::Sgx { signer_key } => {
                Ok(collector.collect(config.port, signer_key, &config.app_args())?)
            }
            Isolation::Plain => Err(Error::NotAnEnclave(name.to_string())),
        }
    }

    pub fn status(&self, name: &str) -> Result<InstanceStatus, Error> {
        let record = self.record(name)?;
        self.status_of(record)
    }

    fn status_of(&self, record: ContainerRecord) -> Result<InstanceStatus, Error> {
        let config = LaunchConfig::from_observed(&record.launch)?;

        let state = match record.status {
            ContainerStatus::Running => self.probe(&config),
            other => InstanceState::from_container(other),
        };

        Ok(InstanceStatus {
            name: record.name,
            state,
            container: record.status,
            image: record.image,
            started_at: record.started_at,
            config,
        })
    }

    /// Every instance this tool manages, running or not
    pub fn list(&self) -> Result<Vec<InstanceStatus>, Error> {
        let mut v = Vec::new();

        for record in self.runtime.list(INSTANCE_LABEL)? {
            let name = record.name.clone();
            match self.status_of(record) {
                Ok(s) => v.push(s),
                Err(e) => warn!("skipping {name}: {e}"),
            }
        }

        Ok(v)
    }

    /// Stop an instance, and forget about it if `remove` is set.  The
    /// workspace is left untouched.
    pub fn stop(&self, name: &str, remove: bool) -> Result<(), Error> {
        let record = self.record(name)?;

        if record.status.is_alive() {
            info!("Stopping {name}...");
            self.runtime.stop(name, STOP_GRACE)?;
        }

        if remove {
            info!("Removing {name}...");
            self.runtime.remove(name)?;
        }

        Ok(())
    }

    pub fn restart(&self, name: &str) -> Result<(), Error> {
        self.record(name)?;
        info!("Restarting {name}...");
        self.runtime.restart(name)?;
        info!("Once up, {name} will wait for its secrets again");
        Ok(())
    }

    pub fn logs(&self, name: &str) -> Result<String, Error> {
        self.record(name)?;
        Ok(self.runtime.logs(name)?)
    }

    pub fn follow_logs(&self, name: &str) -> Result<(), Error> {
        self.record(name)?;
        Ok(self.runtime.follow_logs(name)?)
    }

    /// Run the application test suite against a serving instance
    pub fn test(&self, name: &str, app_config: &AppConfig, test_dir: &Path) -> Result<(), Error> {
        let status = self.status(name)?;

        if status.state != InstanceState::Serving {
            return Err(Error::NotTestable {
                name: name.to_string(),
                state: status.state.to_string(),
            });
        }

        apptest::run(app_config, test_dir, &status.config.host, status.config.port)
    }
}
