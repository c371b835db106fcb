// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Byte blobs carried as standard (padded) base64 in JSON documents.

use base64::{self, engine::general_purpose, Engine as _};
use serde::{
    de::{self, Deserialize, Visitor},
    ser::{Serialize, Serializer},
};

/// decodes bytes from a standard base64-encoded string
pub fn decode_str(v: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(v.trim())
}

/// encodes bytes as a standard base64 string
pub fn encode(v: &[u8]) -> String {
    general_purpose::STANDARD.encode(v)
}

/// a `Vec<u8>` encoded as base64 in human readable serialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<&[u8]> for Bytes {
    fn from(v: &[u8]) -> Self {
        Self(v.to_owned())
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl TryFrom<&str> for Bytes {
    type Error = base64::DecodeError;

    fn try_from(v: &str) -> Result<Self, Self::Error> {
        decode_str(v).map(Bytes)
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(&base64::display::Base64Display::new(
                &self.0,
                &general_purpose::STANDARD,
            ))
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(BytesVisitor {})
    }
}

struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Bytes;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a base64 text string or a byte string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Bytes::try_from(v).map_err(de::Error::custom)
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Bytes::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_padded_standard_base64() {
        let b = Bytes::from(&b"{\"tcbInfo\":1}?"[..]);

        let j = serde_json::to_string(&b).unwrap();
        assert_eq!(j, "\"eyJ0Y2JJbmZvIjoxfT8=\"");

        let back: Bytes = serde_json::from_str(&j).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn url_safe_alphabet_is_rejected() {
        let r: Result<Bytes, _> = serde_json::from_str("\"-_-_\"");
        assert!(r.is_err());
    }
}
