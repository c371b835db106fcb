// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::{io, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration shipped in the package as `app.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application name
    pub name: String,
    /// Entrypoint in the `module:variable` form
    pub application: String,
    /// Path probed to learn the instance's state
    pub healthcheck_endpoint: String,
    /// Shell command running the application's test suite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_cmd: Option<String>,
    /// Packages the test suite needs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests_requirements: Vec<String>,
}

impl AppConfig {
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        let c: AppConfig = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        c.validate()?;
        Ok(c)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path).map_err(|e| io(path, e))?;
        Self::from_toml(&s)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let s = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, s).map_err(|e| io(path, e))
    }

    fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::Config("empty application name".to_string()));
        }

        match self.application.split_once(':') {
            Some((m, v)) if !m.is_empty() && !v.is_empty() && !v.contains(':') => {}
            _ => {
                return Err(Error::Config(format!(
                    "application must look like module:variable, got '{}'",
                    self.application
                )))
            }
        }

        if !self.healthcheck_endpoint.starts_with('/') {
            return Err(Error::Config(format!(
                "healthcheck endpoint must be an absolute path, got '{}'",
                self.healthcheck_endpoint
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP_TOML: &str = r#"
name = "helloworld"
application = "app:app"
healthcheck_endpoint = "/health"
tests_cmd = "pytest"
tests_requirements = ["intel-sgx-ra-verifier", "requests", "pytest"]
"#;

    #[test]
    fn parse_ok() {
        let c = AppConfig::from_toml(APP_TOML).unwrap();

        assert_eq!(c.name, "helloworld");
        assert_eq!(c.application, "app:app");
        assert_eq!(c.healthcheck_endpoint, "/health");
        assert_eq!(c.tests_cmd.as_deref(), Some("pytest"));
        assert_eq!(c.tests_requirements.len(), 3);
    }

    #[test]
    fn tests_are_optional() {
        let c = AppConfig::from_toml(
            "name = \"a\"\napplication = \"m:v\"\nhealthcheck_endpoint = \"/\"\n",
        )
        .unwrap();

        assert_eq!(c.tests_cmd, None);
        assert!(c.tests_requirements.is_empty());
    }

    #[test]
    fn missing_field() {
        let r = AppConfig::from_toml("name = \"a\"\napplication = \"m:v\"\n");
        match r {
            Err(Error::Config(e)) => assert!(e.contains("healthcheck_endpoint"), "{e}"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_application() {
        let r = AppConfig::from_toml(
            "name = \"a\"\napplication = \"app\"\nhealthcheck_endpoint = \"/\"\n",
        );
        assert!(matches!(r, Err(Error::Config(_))));

        let r = AppConfig::from_toml(
            "name = \"a\"\napplication = \"app:app:x\"\nhealthcheck_endpoint = \"/\"\n",
        );
        assert!(matches!(r, Err(Error::Config(_))));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let p = dir.path().join("app.toml");
        let c = AppConfig::from_toml(APP_TOML).unwrap();

        c.save(&p).unwrap();

        assert_eq!(AppConfig::load(&p).unwrap(), c);
    }
}
