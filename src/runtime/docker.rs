// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::container::ContainerRecord;
use super::errors::Error;
use super::icontainerruntime::IContainerRuntime;
use crate::launch::{LaunchSpec, VolumeMount};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::debug;

/// [`IContainerRuntime`] driving the `docker` command line client.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    binary: String,
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new("docker")
    }
}

fn volume_arg(v: &VolumeMount) -> String {
    format!(
        "{}:{}:{}",
        v.source.display(),
        v.destination,
        if v.read_write { "rw" } else { "ro" }
    )
}

fn combined(out: &Output) -> Vec<u8> {
    let mut v = out.stdout.clone();
    v.extend_from_slice(&out.stderr);
    v
}

impl DockerRuntime {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn exec(&self, args: &[String]) -> Result<Output, Error> {
        debug!("{} {}", self.binary, args.join(" "));
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| Error::Unavailable(format!("{}: {}", self.binary, e)))
    }

    fn exec_ok(&self, args: &[String]) -> Result<String, Error> {
        let out = self.exec(args)?;
        if !out.status.success() {
            return Err(Error::Command {
                command: format!("{} {}", self.binary, args.first().map_or("", String::as_str)),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    /// The `run` arguments shared by detached and one-shot containers
    fn run_args(image: &str, spec: &LaunchSpec) -> Vec<String> {
        let mut args = vec!["--entrypoint".to_string(), spec.entrypoint.clone()];

        for v in &spec.volumes {
            args.push("-v".to_string());
            args.push(volume_arg(v));
        }

        // hosts expose either the in-tree or the legacy driver nodes
        for d in spec.devices.iter().filter(|d| Path::new(d).exists()) {
            args.push("--device".to_string());
            args.push(format!("{d}:{d}:rw"));
        }

        for p in &spec.ports {
            args.push("-p".to_string());
            args.push(format!("{}:{}:{}", p.host_ip, p.host_port, p.container_port));
        }

        for (k, v) in &spec.labels {
            args.push("--label".to_string());
            args.push(format!("{k}={v}"));
        }

        args.push(image.to_string());
        args.extend(spec.argv.iter().cloned());
        args
    }
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

impl IContainerRuntime for DockerRuntime {
    fn find(&self, name: &str) -> Result<Option<ContainerRecord>, Error> {
        let out = self.exec(&strings(&["container", "inspect", name]))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            if stderr.contains("No such") {
                return Ok(None);
            }
            return Err(Error::Command {
                command: format!("{} container inspect", self.binary),
                stderr: stderr.trim().to_string(),
            });
        }

        let j = String::from_utf8_lossy(&out.stdout);
        Ok(ContainerRecord::from_inspect_json(&j)?.into_iter().next())
    }

    fn list(&self, label: &str) -> Result<Vec<ContainerRecord>, Error> {
        let names = self.exec_ok(&strings(&[
            "ps",
            "--all",
            "--filter",
            &format!("label={label}"),
            "--format",
            "{{.Names}}",
        ]))?;

        let mut records = Vec::new();
        for name in names.lines().map(str::trim).filter(|n| !n.is_empty()) {
            // may have vanished in between
            if let Some(r) = self.find(name)? {
                records.push(r);
            }
        }
        Ok(records)
    }

    fn load_image(&self, archive: &Path) -> Result<String, Error> {
        let out = self.exec_ok(&[
            "load".to_string(),
            "--input".to_string(),
            archive.display().to_string(),
        ])?;

        // "Loaded image: name:tag" or "Loaded image ID: sha256:..."
        out.lines()
            .rev()
            .find_map(|l| l.split_once(": ").map(|(_, image)| image.trim().to_string()))
            .ok_or_else(|| Error::Output(format!("no image reference in '{}'", out.trim())))
    }

    fn build_image(&self, context: &Path, dockerfile: &Path, tag: &str) -> Result<(), Error> {
        self.exec_ok(&[
            "build".to_string(),
            "--tag".to_string(),
            tag.to_string(),
            "--file".to_string(),
            dockerfile.display().to_string(),
            context.display().to_string(),
        ])
        .map(|_| ())
    }

    fn save_image(&self, tag: &str, output: &Path) -> Result<(), Error> {
        self.exec_ok(&[
            "save".to_string(),
            "--output".to_string(),
            output.display().to_string(),
            tag.to_string(),
        ])
        .map(|_| ())
    }

    fn create(
        &self,
        name: &str,
        image: &str,
        spec: &LaunchSpec,
    ) -> Result<ContainerRecord, Error> {
        let mut args = strings(&["run", "--detach", "--name", name]);
        args.extend(Self::run_args(image, spec));
        self.exec_ok(&args)?;

        self.find(name)?
            .ok_or_else(|| Error::Output(format!("container {name} vanished after start")))
    }

    fn run_to_completion(&self, image: &str, spec: &LaunchSpec) -> Result<Vec<u8>, Error> {
        let mut args = strings(&["run", "--rm", "--network", "none"]);
        args.extend(Self::run_args(image, spec));
        let out = self.exec(&args)?;

        if !out.status.success() {
            debug!("measurement run exited with {}", out.status);
        }

        Ok(combined(&out))
    }

    fn stop(&self, name: &str, grace: Duration) -> Result<(), Error> {
        self.exec_ok(&strings(&[
            "stop",
            "--time",
            &grace.as_secs().to_string(),
            name,
        ]))
        .map(|_| ())
    }

    fn remove(&self, name: &str) -> Result<(), Error> {
        self.exec_ok(&strings(&["rm", name])).map(|_| ())
    }

    fn restart(&self, name: &str) -> Result<(), Error> {
        self.exec_ok(&strings(&["restart", name])).map(|_| ())
    }

    fn logs(&self, name: &str) -> Result<String, Error> {
        let out = self.exec(&strings(&["logs", name]))?;
        if !out.status.success() {
            return Err(Error::Command {
                command: format!("{} logs", self.binary),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&combined(&out)).into_owned())
    }

    fn follow_logs(&self, name: &str) -> Result<(), Error> {
        let status = Command::new(&self.binary)
            .args(["logs", "--follow", "--tail", "10", name])
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::Unavailable(format!("{}: {}", self.binary, e)))?;

        if !status.success() {
            return Err(Error::Command {
                command: format!("{} logs --follow", self.binary),
                stderr: status.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::{Identity, Isolation, LaunchConfig};

    #[test]
    fn run_args_layout() {
        let cfg = LaunchConfig {
            size: 1024,
            host: "app.example.com".to_string(),
            app_id: uuid::Uuid::nil(),
            code: "/ws/code.tar".into(),
            application: "app:app".to_string(),
            identity: Identity::SelfSigned { expiration: 10 },
            healthcheck: "/".to_string(),
            isolation: Isolation::Plain,
            port: 8443,
        };

        let args = DockerRuntime::run_args("img:1", &cfg.to_launch_spec());
        let joined = args.join(" ");

        assert!(joined.starts_with("--entrypoint mse-run -v /ws/code.tar:/tmp/app.tar:rw"));
        assert!(joined.contains("-p 127.0.0.1:8443:443/tcp"));
        assert!(joined.contains("--label healthcheck_endpoint=/"));
        assert!(joined.contains("--label sgx-deploy=1"));
        assert!(joined.contains("img:1 --size 1024M"));
        assert!(joined.ends_with("--no-sgx"));
        assert!(!joined.contains("--device"));
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let d = DockerRuntime::new("/nonexistent/docker-binary");
        assert!(matches!(d.find("x"), Err(Error::Unavailable(_))));
    }
}
