// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use crate::base64::Bytes;
use serde::Serialize;
use serde_with::serde_as;
use std::path::Path;
use uuid::Uuid;

/// What the operator hands over to an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretsMaterial {
    /// Application secrets, any JSON document
    pub secrets: Option<serde_json::Value>,
    /// Secrets sealed for the enclave
    pub sealed_secrets: Option<Vec<u8>>,
    /// Key decrypting the code archive
    pub code_secret_key: Option<Vec<u8>>,
}

impl SecretsMaterial {
    /// Read the material from the given files; the code key is hex
    pub fn load(
        secrets: Option<&Path>,
        sealed_secrets: Option<&Path>,
        code_secret_key: Option<&str>,
    ) -> Result<Self, Error> {
        let read = |p: &Path| {
            std::fs::read(p).map_err(|e| Error::Material(format!("{}: {}", p.display(), e)))
        };

        let secrets = secrets
            .map(|p| {
                let raw = read(p)?;
                serde_json::from_slice(&raw)
                    .map_err(|e| Error::Material(format!("{}: {}", p.display(), e)))
            })
            .transpose()?;

        let sealed_secrets = sealed_secrets.map(read).transpose()?;

        let code_secret_key = code_secret_key
            .map(|k| hex::decode(k.trim()).map_err(|e| Error::Material(format!("code key: {e}"))))
            .transpose()?;

        Ok(Self {
            secrets,
            sealed_secrets,
            code_secret_key,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_none() && self.sealed_secrets.is_none() && self.code_secret_key.is_none()
    }

    pub fn payload(&self, app_id: Uuid) -> SecretsPayload {
        SecretsPayload {
            uuid: app_id,
            app_secrets: self.secrets.clone(),
            app_sealed_secrets: self.sealed_secrets.clone().map(Bytes::from),
            code_secret_key: self.code_secret_key.clone(),
        }
    }
}

/// Body of the provisioning request.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretsPayload {
    pub uuid: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_secrets: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_sealed_secrets: Option<Bytes>,
    #[serde_as(as = "Option<serde_with::hex::Hex>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_secret_key: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn full_payload() {
        let m = SecretsMaterial {
            secrets: Some(json!({"db": {"password": "hunter2"}})),
            sealed_secrets: Some(b"sealed".to_vec()),
            code_secret_key: Some(vec![0xde, 0xad, 0xbe, 0xef]),
        };

        let v = serde_json::to_value(m.payload(Uuid::nil())).unwrap();

        assert_eq!(
            v,
            json!({
                "uuid": "00000000-0000-0000-0000-000000000000",
                "app_secrets": {"db": {"password": "hunter2"}},
                "app_sealed_secrets": "c2VhbGVk",
                "code_secret_key": "deadbeef",
            })
        );
    }

    #[test]
    fn absent_members_are_omitted() {
        let m = SecretsMaterial {
            code_secret_key: Some(vec![1, 2]),
            ..Default::default()
        };

        let v = serde_json::to_value(m.payload(Uuid::nil())).unwrap();

        assert_eq!(
            v,
            json!({
                "uuid": "00000000-0000-0000-0000-000000000000",
                "code_secret_key": "0102",
            })
        );
    }

    #[test]
    fn load_from_files() {
        let dir = TempDir::new().unwrap();
        let secrets = dir.path().join("secrets.json");
        std::fs::write(&secrets, br#"{"api_key": "k"}"#).unwrap();

        let m = SecretsMaterial::load(Some(&secrets), None, Some("00ff")).unwrap();

        assert_eq!(m.secrets, Some(json!({"api_key": "k"})));
        assert_eq!(m.sealed_secrets, None);
        assert_eq!(m.code_secret_key, Some(vec![0x00, 0xff]));
        assert!(!m.is_empty());
    }

    #[test]
    fn bad_material() {
        let dir = TempDir::new().unwrap();
        let secrets = dir.path().join("secrets.json");
        std::fs::write(&secrets, b"not json").unwrap();

        assert!(matches!(
            SecretsMaterial::load(Some(&secrets), None, None),
            Err(Error::Material(_))
        ));
        assert!(matches!(
            SecretsMaterial::load(None, None, Some("xyz")),
            Err(Error::Material(_))
        ));
        assert!(SecretsMaterial::load(None, None, None).unwrap().is_empty());
    }
}
