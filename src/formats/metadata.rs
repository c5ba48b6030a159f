// Metadata block of an .img file
// Reference: chirp/chirp_common.py CloneModeRadio._make_metadata

use crate::drivers::{registry, ModelDescriptor};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Radio identification stored after the image bytes
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Metadata {
    #[serde(default)]
    pub rclass: String,

    #[serde(default)]
    pub vendor: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub variant: String,

    #[serde(default)]
    pub chirp_version: String,

    /// Keys written by other tools, kept so a rewrite doesn't lose them
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Metadata {
    /// Metadata naming the radio described by `descriptor`
    pub fn for_model(descriptor: &ModelDescriptor) -> Self {
        Self {
            rclass: rclass_name(descriptor),
            vendor: descriptor.vendor.to_string(),
            model: descriptor.model.to_string(),
            chirp_version: crate::VERSION.to_string(),
            ..Default::default()
        }
    }

    /// Descriptor named by vendor and model, if this crate supports it
    pub fn descriptor(&self) -> Option<&'static ModelDescriptor> {
        if self.vendor.is_empty() || self.model.is_empty() {
            return None;
        }
        registry::get_model(&self.vendor, &self.model)
    }

    pub fn to_base64(&self) -> Result<String, serde_json::Error> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }

    /// Decode a base64 JSON block. `None` when it is not base64 at all.
    pub fn from_base64(encoded: &[u8]) -> Option<Result<Self, serde_json::Error>> {
        let json = STANDARD.decode(encoded.trim_ascii()).ok()?;
        Some(serde_json::from_slice(&json))
    }
}

/// Driver class name as the desktop application records it, e.g. `ICT70Radio`
fn rclass_name(descriptor: &ModelDescriptor) -> String {
    let mut name: String = descriptor
        .model
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    name.push_str("Radio");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{ICT70, VX3};

    #[test]
    fn test_for_model() {
        let meta = Metadata::for_model(&VX3);
        assert_eq!(meta.vendor, "Yaesu");
        assert_eq!(meta.model, "VX-3");
        assert_eq!(meta.rclass, "VX3Radio");
        assert!(!meta.chirp_version.is_empty());
        assert_eq!(meta.descriptor().map(|d| d.model), Some("VX-3"));

        assert_eq!(Metadata::for_model(&ICT70).rclass, "ICT70Radio");
        assert!(Metadata::default().descriptor().is_none());
    }

    #[test]
    fn test_base64_keeps_extra_keys() {
        let mut meta = Metadata::for_model(&ICT70);
        meta.extra
            .insert("mem_extra".to_string(), serde_json::json!({"0": "note"}));

        let encoded = meta.to_base64().unwrap();
        let decoded = Metadata::from_base64(encoded.as_bytes()).unwrap().unwrap();
        assert_eq!(decoded, meta);

        assert!(Metadata::from_base64(b"not base64!").is_none());
        let garbage = STANDARD.encode(b"[1, 2");
        assert!(Metadata::from_base64(garbage.as_bytes()).unwrap().is_err());
    }
}
