// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use crate::runtime::ContainerStatus;
use std::fmt;

/// What a probe of the healthcheck endpoint returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResponse {
    /// No HTTP answer at all: refused connection, TLS failure, timeout
    Unreachable(String),
    Http {
        status: u16,
        /// the trust status header was present
        trust_header: bool,
    },
}

/// Lifecycle state of an instance, as seen from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Initializing,
    AwaitingSecrets,
    OnError,
    Serving,
    Exited,
    Unknown,
}

impl InstanceState {
    /// Classify a probe of a running instance.
    ///
    /// Until the application is provisioned, a configuration server answers
    /// on the same port and sets the trust status header.
    pub fn classify(r: &ProbeResponse) -> Self {
        match r {
            ProbeResponse::Unreachable(_) => Self::Initializing,
            ProbeResponse::Http { status: 503, .. } => Self::Initializing,
            ProbeResponse::Http { status: 500, .. } => Self::OnError,
            ProbeResponse::Http {
                status: 200,
                trust_header: true,
            } => Self::AwaitingSecrets,
            ProbeResponse::Http { status: 200, .. } => Self::Serving,
            ProbeResponse::Http { .. } => Self::Unknown,
        }
    }

    /// State of an instance whose container is not running
    pub fn from_container(s: ContainerStatus) -> Self {
        match s {
            ContainerStatus::Exited | ContainerStatus::Dead => Self::Exited,
            ContainerStatus::Created | ContainerStatus::Restarting => Self::Initializing,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initializing => "initializing",
            Self::AwaitingSecrets => "waiting for secrets",
            Self::OnError => "on error",
            Self::Serving => "serving",
            Self::Exited => "exited",
            Self::Unknown => "unknown",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, trust_header: bool) -> ProbeResponse {
        ProbeResponse::Http {
            status,
            trust_header,
        }
    }

    #[test]
    fn classification_table() {
        let table = [
            (
                ProbeResponse::Unreachable("connection refused".to_string()),
                InstanceState::Initializing,
            ),
            (http(503, false), InstanceState::Initializing),
            (http(503, true), InstanceState::Initializing),
            (http(500, false), InstanceState::OnError),
            (http(500, true), InstanceState::OnError),
            (http(200, true), InstanceState::AwaitingSecrets),
            (http(200, false), InstanceState::Serving),
            (http(404, false), InstanceState::Unknown),
            (http(302, true), InstanceState::Unknown),
        ];

        for (probe, expected) in table {
            assert_eq!(InstanceState::classify(&probe), expected, "{:?}", probe);
        }
    }

    #[test]
    fn stopped_containers() {
        assert_eq!(
            InstanceState::from_container(ContainerStatus::Exited),
            InstanceState::Exited
        );
        assert_eq!(
            InstanceState::from_container(ContainerStatus::Dead),
            InstanceState::Exited
        );
        assert_eq!(
            InstanceState::from_container(ContainerStatus::Paused),
            InstanceState::Unknown
        );
    }
}
