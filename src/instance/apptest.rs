// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use crate::package::AppConfig;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Environment variable telling the test suite where the instance is
pub const TEST_URL_VAR: &str = "TEST_REMOTE_URL";

fn check(what: &str, cmd: &mut Command) -> Result<(), Error> {
    let status = cmd
        .status()
        .map_err(|e| Error::TestsFailed(format!("{what}: {e}")))?;

    if !status.success() {
        return Err(Error::TestsFailed(format!("{what}: {status}")));
    }
    Ok(())
}

/// Install the test requirements, then run the test command from
/// `test_dir` against `https://<host>:<port>`.
pub fn run(config: &AppConfig, test_dir: &Path, host: &str, port: u16) -> Result<(), Error> {
    let tests_cmd = config.tests_cmd.as_deref().ok_or_else(|| {
        Error::TestsFailed(format!("{} does not define tests_cmd", config.name))
    })?;

    if !config.tests_requirements.is_empty() {
        info!("Installing the test requirements...");
        check(
            "pip install",
            Command::new("python3")
                .args(["-m", "pip", "install"])
                .args(&config.tests_requirements),
        )?;
    }

    info!("Running the tests...");
    check(
        tests_cmd,
        Command::new("sh")
            .arg("-c")
            .arg(tests_cmd)
            .current_dir(test_dir)
            .env(TEST_URL_VAR, format!("https://{host}:{port}")),
    )
}
