//! Material modifier
//!
//! Applies caller-requested PBR parameter changes to every material in a
//! document. Foliage and transparency-dependent materials are exempt from
//! the caller's color and surface parameters: recoloring a leaf card or
//! forcing it opaque destroys the vegetation look, so exempt materials only
//! receive transparency-preserving normalization.

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{AlphaMode, Document, Material};

/// Name keywords marking vegetation materials, matched case-insensitively
pub const DEFAULT_EXEMPT_KEYWORDS: [&str; 7] = [
    "leaf", "leaves", "foliage", "grass", "frond", "plant", "branch",
];

/// Caller-requested material changes; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialEdit {
    /// Base color as a `#RRGGBB` hex string
    pub base_color_hex: Option<String>,
    /// Opacity in [0, 1]; below 1 switches the material to alpha blending
    pub opacity: Option<f64>,
    /// Metalness factor in [0, 1]
    pub metallic: Option<f64>,
    /// Roughness factor in [0, 1]
    pub roughness: Option<f64>,
}

/// Tuning knobs for the material modifier
#[derive(Debug, Clone)]
pub struct MaterialEditOptions {
    /// Lowercased name keywords that mark a material exempt
    pub exempt_keywords: Vec<String>,
}

impl Default for MaterialEditOptions {
    fn default() -> Self {
        Self {
            exempt_keywords: DEFAULT_EXEMPT_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}

/// How the modifier treats a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialClass {
    /// Transparency or vegetation; caller parameters are ignored
    Exempt,
    /// Receives the caller's parameters directly
    Normal,
}

/// Classify a material against the exemption rules
///
/// Exempt iff the material already renders transparency (BLEND or MASK) or
/// its name contains one of the configured keywords.
pub fn classify(material: &Material, options: &MaterialEditOptions) -> MaterialClass {
    if material.effective_alpha_mode().is_transparent() {
        return MaterialClass::Exempt;
    }
    if let Some(name) = &material.name {
        let lowered = name.to_lowercase();
        if options
            .exempt_keywords
            .iter()
            .any(|keyword| lowered.contains(keyword.as_str()))
        {
            return MaterialClass::Exempt;
        }
    }
    MaterialClass::Normal
}

/// Parse a `#RRGGBB` (or `RRGGBB`) hex color into linear [0, 1] RGB
pub fn parse_hex_color(hex: &str) -> Result<[f64; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::invalid_request(
            "material.color",
            &format!("'{hex}' is not a #RRGGBB hex color"),
        ));
    }
    let channel = |at: usize| -> f64 {
        f64::from(u8::from_str_radix(&digits[at..at + 2], 16).unwrap_or(0)) / 255.0
    };
    Ok([channel(0), channel(2), channel(4)])
}

fn check_unit_range(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(Error::invalid_request(
            field,
            &format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(())
}

/// Apply a material edit to every material in the document
///
/// All materials become double-sided. Exempt materials are forced to alpha
/// blending with vegetation-friendly defaults (metallic 0, roughness 1)
/// filled in only where the source left them unset; the caller's color,
/// opacity, metallic and roughness are ignored for them. Normal materials
/// take the caller's parameters directly, switching to alpha blending when
/// opacity drops below 1.
pub fn apply_material_edit(
    doc: &mut Document,
    edit: &MaterialEdit,
    options: &MaterialEditOptions,
) -> Result<()> {
    let color = edit.base_color_hex.as_deref().map(parse_hex_color).transpose()?;
    if let Some(opacity) = edit.opacity {
        check_unit_range("material.opacity", opacity)?;
    }
    if let Some(metallic) = edit.metallic {
        check_unit_range("material.metallic", metallic)?;
    }
    if let Some(roughness) = edit.roughness {
        check_unit_range("material.roughness", roughness)?;
    }

    let mut exempt_count = 0usize;
    let materials = &mut doc.root_mut().materials;
    for material in materials.iter_mut() {
        material.double_sided = Some(true);

        match classify(material, options) {
            MaterialClass::Exempt => {
                exempt_count += 1;
                material.alpha_mode = Some(AlphaMode::Blend);
                let pbr = material.pbr_mut();
                pbr.metallic_factor.get_or_insert(0.0);
                pbr.roughness_factor.get_or_insert(1.0);
            }
            MaterialClass::Normal => {
                let opacity = edit.opacity;
                if color.is_some() || opacity.is_some() {
                    let pbr = material.pbr_mut();
                    let mut factor = pbr.base_color_factor.unwrap_or([1.0, 1.0, 1.0, 1.0]);
                    if let Some([r, g, b]) = color {
                        factor[0] = r;
                        factor[1] = g;
                        factor[2] = b;
                    }
                    if let Some(alpha) = opacity {
                        factor[3] = alpha;
                    }
                    pbr.base_color_factor = Some(factor);
                }
                if let Some(alpha) = opacity {
                    material.alpha_mode = Some(if alpha < 1.0 {
                        AlphaMode::Blend
                    } else {
                        AlphaMode::Opaque
                    });
                }
                let pbr = material.pbr_mut();
                if let Some(metallic) = edit.metallic {
                    pbr.metallic_factor = Some(metallic);
                }
                if let Some(roughness) = edit.roughness {
                    pbr.roughness_factor = Some(roughness);
                }
            }
        }
    }

    debug!(
        materials = doc.root().materials.len(),
        exempt = exempt_count,
        "applied material edit"
    );
    Ok(())
}
