//! PBR material types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Alpha blending mode of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Fully opaque; alpha is ignored
    #[default]
    #[serde(rename = "OPAQUE")]
    Opaque,
    /// Alpha-tested cutout
    #[serde(rename = "MASK")]
    Mask,
    /// Alpha blending
    #[serde(rename = "BLEND")]
    Blend,
}

impl AlphaMode {
    /// Whether this mode renders any degree of transparency
    pub fn is_transparent(self) -> bool {
        matches!(self, AlphaMode::Mask | AlphaMode::Blend)
    }
}

/// Metallic-roughness parameter block of a material
///
/// Texture references ride along in `extra` untouched; the editor only
/// writes the scalar factors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    /// Base color RGBA factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_factor: Option<[f64; 4]>,

    /// Metalness factor in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic_factor: Option<f64>,

    /// Roughness factor in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness_factor: Option<f64>,

    /// Unmodeled fields (baseColorTexture, metallicRoughnessTexture, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A PBR material
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Material name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Metallic-roughness block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,

    /// Alpha mode (absent means opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_mode: Option<AlphaMode>,

    /// Alpha cutoff for MASK mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_cutoff: Option<f64>,

    /// Whether back faces are rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_sided: Option<bool>,

    /// Unmodeled fields (normalTexture, emissiveFactor, extensions, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    /// Create an unnamed default material
    pub fn new() -> Self {
        Self::default()
    }

    /// The material's effective alpha mode (defaults to opaque)
    pub fn effective_alpha_mode(&self) -> AlphaMode {
        self.alpha_mode.unwrap_or_default()
    }

    /// Mutable access to the metallic-roughness block, creating it if absent
    pub fn pbr_mut(&mut self) -> &mut PbrMetallicRoughness {
        self.pbr_metallic_roughness
            .get_or_insert_with(PbrMetallicRoughness::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_mode_serialization() {
        assert_eq!(serde_json::to_string(&AlphaMode::Blend).unwrap(), "\"BLEND\"");
        assert_eq!(serde_json::to_string(&AlphaMode::Opaque).unwrap(), "\"OPAQUE\"");
        let mode: AlphaMode = serde_json::from_str("\"MASK\"").unwrap();
        assert_eq!(mode, AlphaMode::Mask);
        assert!(mode.is_transparent());
        assert!(!AlphaMode::Opaque.is_transparent());
    }

    #[test]
    fn test_material_round_trip_preserves_textures() {
        let json = r#"{
            "name": "Trunk",
            "pbrMetallicRoughness": {
                "baseColorFactor": [0.5, 0.4, 0.3, 1.0],
                "baseColorTexture": {"index": 0},
                "metallicFactor": 0.1
            },
            "normalTexture": {"index": 1},
            "alphaMode": "OPAQUE"
        }"#;
        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.name.as_deref(), Some("Trunk"));
        let pbr = material.pbr_metallic_roughness.as_ref().unwrap();
        assert!(pbr.extra.contains_key("baseColorTexture"));
        assert!(material.extra.contains_key("normalTexture"));

        let reencoded = serde_json::to_value(&material).unwrap();
        assert_eq!(reencoded["pbrMetallicRoughness"]["baseColorTexture"]["index"], 0);
        assert_eq!(reencoded["normalTexture"]["index"], 1);
    }

    #[test]
    fn test_pbr_mut_creates_block() {
        let mut material = Material::new();
        assert!(material.pbr_metallic_roughness.is_none());
        material.pbr_mut().metallic_factor = Some(1.0);
        assert_eq!(
            material.pbr_metallic_roughness.unwrap().metallic_factor,
            Some(1.0)
        );
    }

    #[test]
    fn test_effective_alpha_mode_defaults_to_opaque() {
        let material = Material::new();
        assert_eq!(material.effective_alpha_mode(), AlphaMode::Opaque);
    }
}
