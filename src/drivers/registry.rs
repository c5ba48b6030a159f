// Model registry: descriptor lookup and image detection

use super::descriptor::ModelDescriptor;
use super::ict70::ICT70;
use super::vx3::VX3;
use std::collections::HashMap;
use tracing::debug;

/// Summary of a supported model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub vendor: String,
    pub model: String,
    pub memsize: usize,
    pub channels: usize,
}

impl ModelInfo {
    fn from_descriptor(d: &ModelDescriptor) -> Self {
        Self {
            vendor: d.vendor.to_string(),
            model: d.model.to_string(),
            memsize: d.memsize,
            channels: d.channel_count(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.vendor, self.model)
    }
}

static MODELS: &[&ModelDescriptor] = &[&ICT70, &VX3];

lazy_static::lazy_static! {
    static ref MODEL_REGISTRY: HashMap<String, &'static ModelDescriptor> = MODELS
        .iter()
        .map(|d| (key(d.vendor, d.model), *d))
        .collect();
}

fn key(vendor: &str, model: &str) -> String {
    format!("{}::{}", vendor, model).to_lowercase()
}

/// All supported models, sorted by vendor then model
pub fn list_models() -> Vec<ModelInfo> {
    let mut models: Vec<ModelInfo> = MODEL_REGISTRY
        .values()
        .map(|d| ModelInfo::from_descriptor(d))
        .collect();
    models.sort_by(|a, b| (&a.vendor, &a.model).cmp(&(&b.vendor, &b.model)));
    models
}

/// Descriptor for a vendor and model, matched case-insensitively
pub fn get_model(vendor: &str, model: &str) -> Option<&'static ModelDescriptor> {
    MODEL_REGISTRY.get(&key(vendor, model)).copied()
}

/// Guess the model of a raw image.
///
/// The length must match exactly. Models that store their clone id at the
/// start of the image win over those that only match on length.
pub fn detect_model(data: &[u8]) -> Option<&'static ModelDescriptor> {
    let sized: Vec<&'static ModelDescriptor> = MODELS
        .iter()
        .copied()
        .filter(|d| d.memsize == data.len())
        .collect();

    let by_prefix = sized.iter().copied().find(|d| {
        d.clone
            .image_prefix()
            .is_some_and(|prefix| data.starts_with(prefix))
    });
    let found = by_prefix.or_else(|| {
        sized
            .iter()
            .copied()
            .find(|d| d.clone.image_prefix().is_none())
    });

    match found {
        Some(d) => debug!("Detected {} {} from {} byte image", d.vendor, d.model, data.len()),
        None => debug!("No model matches a {} byte image", data.len()),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_models() {
        let models = list_models();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].full_name(), "Icom IC-T70");
        assert_eq!(models[0].channels, 300);
        assert_eq!(models[1].full_name(), "Yaesu VX-3");
        assert_eq!(models[1].memsize, 32587);
    }

    #[test]
    fn test_get_model() {
        assert_eq!(get_model("Icom", "IC-T70").map(|d| d.memsize), Some(0x19E0));
        assert_eq!(get_model("yaesu", "vx-3").map(|d| d.model), Some("VX-3"));
        assert!(get_model("Baofeng", "UV-5R").is_none());
    }

    #[test]
    fn test_detect_model() {
        let ict70 = vec![0xFF; 0x19E0];
        assert_eq!(detect_model(&ict70).map(|d| d.model), Some("IC-T70"));

        let mut vx3 = vec![0; 32587];
        vx3[..5].copy_from_slice(b"AH028");
        assert_eq!(detect_model(&vx3).map(|d| d.model), Some("VX-3"));

        // Right size, wrong clone id
        vx3[..5].copy_from_slice(b"AH003");
        assert!(detect_model(&vx3).is_none());

        assert!(detect_model(&[0; 100]).is_none());
    }
}
