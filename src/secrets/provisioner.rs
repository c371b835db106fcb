// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::payload::SecretsMaterial;
use crate::instance::{IInstanceEndpoint, InstanceState, Orchestrator};
use crate::poll::{ClockTick, IClock};
use crate::runtime::IContainerRuntime;
use tracing::info;

/// Where the configuration server takes the secrets
pub const SECRETS_PATH: &str = "/";

/// Send `material` to instance `name` and wait until the application
/// serves.
///
/// Nothing is sent unless the instance is waiting for its secrets.
pub fn provision<R, E, C>(
    orchestrator: &Orchestrator<R, E, C>,
    name: &str,
    material: &SecretsMaterial,
    tick: &ClockTick,
) -> Result<(), Error>
where
    R: IContainerRuntime,
    E: IInstanceEndpoint,
    C: IClock,
{
    if material.is_empty() {
        return Err(Error::NothingToSend);
    }

    let status = orchestrator.status(name)?;
    if status.state != InstanceState::AwaitingSecrets {
        return Err(Error::NotAwaitingSecrets(status.state.to_string()));
    }

    let body = serde_json::to_value(material.payload(status.config.app_id))
        .map_err(|e| Error::Material(e.to_string()))?;

    info!("Sending the secrets to {name}...");
    let reply = orchestrator
        .endpoint()
        .post_json(status.config.port, SECRETS_PATH, &body)?;

    if !(200..300).contains(&reply.status) {
        return Err(Error::SecretDeliveryRejected {
            status: reply.status,
            body: reply.body,
        });
    }

    info!("Waiting for the application to start...");
    tick.wait(orchestrator.clock(), || {
        Ok::<_, Error>(
            orchestrator
                .reached(name, &status.config, InstanceState::Serving)?
                .then_some(()),
        )
    })?;
    info!("{name} is up and serving");

    Ok(())
}
