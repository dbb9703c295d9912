use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::core::Dpi,
    foundation::error::{TokenError, TokenResult},
    model::color::Color,
};

/// Nominal diameter of a character ("role") token in inches.
pub const ROLE_DIAMETER_INCHES: f64 = 1.75;
/// Nominal diameter of a reminder token in inches.
pub const REMINDER_DIAMETER_INCHES: f64 = 1.0;
/// Character id whose token carries a script's bootlegger rules in a batch.
pub const BOOTLEGGER_ID: &str = "bootlegger";

/// Letter spacing per text role, in pixels at 300 DPI.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSpacing {
    pub character_name: f64,
    pub ability_text: f64,
    pub reminder_text: f64,
    pub meta_text: f64,
}

impl Default for FontSpacing {
    fn default() -> Self {
        Self {
            character_name: 0.0,
            ability_text: 0.0,
            reminder_text: 0.0,
            meta_text: 0.0,
        }
    }
}

/// Shadow blur radius per text role, in pixels at 300 DPI. Zero disables the shadow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextShadow {
    pub character_name: f64,
    pub ability_text: f64,
    pub reminder_text: f64,
    pub meta_text: f64,
    pub color: Color,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            character_name: 4.0,
            ability_text: 3.0,
            reminder_text: 3.0,
            meta_text: 4.0,
            color: Color::rgba(0, 0, 0, 200),
        }
    }
}

/// Partial [`FontSpacing`]; unset fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSpacingPatch {
    pub character_name: Option<f64>,
    pub ability_text: Option<f64>,
    pub reminder_text: Option<f64>,
    pub meta_text: Option<f64>,
}

/// Partial [`TextShadow`]; unset fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextShadowPatch {
    pub character_name: Option<f64>,
    pub ability_text: Option<f64>,
    pub reminder_text: Option<f64>,
    pub meta_text: Option<f64>,
    pub color: Option<Color>,
}

/// Leaf decoration parameters. Leaves are drawn along the top arc, outside the circular clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeafOptions {
    /// Upper bound on drawn leaves. Zero disables leaves.
    pub max_leaves: u32,
    /// Chance that an individual slot receives a leaf, in `[0, 1]`.
    pub probability: f64,
    /// Angular span of the leaf arc, centered on the top of the token.
    pub arc_span_degrees: f64,
    /// Number of evenly spaced candidate positions on the arc.
    pub slots: u32,
    /// Fill for vector leaves.
    pub color: Color,
    /// Optional image asset reference drawn instead of the vector leaf.
    pub style: Option<String>,
}

impl Default for LeafOptions {
    fn default() -> Self {
        Self {
            max_leaves: 0,
            probability: 0.3,
            arc_span_degrees: 120.0,
            slots: 7,
            color: Color::rgb(74, 110, 52),
            style: None,
        }
    }
}

/// Icon scale and offset override. Offsets are fractions of the token diameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for IconTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Icon overrides per token kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconSettings {
    pub character: IconTransform,
    pub reminder: IconTransform,
    pub meta: IconTransform,
}

/// Background of one token kind: an optional image reference over a flat color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Background {
    /// Fill used when no image is set or the image fails to load.
    pub color: Color,
    /// Asset reference (`asset:<id>`, built-in catalog id, or legacy file stem).
    pub image: Option<String>,
}

impl Background {
    fn flat(color: Color) -> Self {
        Self { color, image: None }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::flat(Color::rgb(244, 236, 218))
    }
}

/// Complete render configuration. Every field has a default; see [`GenerationOptionsPatch`]
/// for partial updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    pub dpi: Dpi,
    pub role_diameter_inches: f64,
    pub reminder_diameter_inches: f64,

    pub display_ability_text: bool,
    /// Draw a badge with the number of reminder tokens on character tokens.
    pub token_count: bool,
    pub generate_reminder_tokens: bool,
    /// One character token per image variant instead of the primary image only.
    pub generate_image_variants: bool,
    pub script_name_token: bool,
    pub almanac_token: bool,
    pub pandemonium_token: bool,

    pub transparent_background: bool,
    pub character_background: Background,
    pub reminder_background: Background,
    pub meta_background: Background,

    pub character_name_font: String,
    pub character_name_color: Color,
    pub ability_text_font: String,
    pub ability_text_color: Color,
    pub reminder_text_font: String,
    pub reminder_text_color: Color,
    pub meta_text_font: String,
    pub meta_text_color: Color,

    /// Font sizes as fractions of the token diameter.
    pub name_font_size: f64,
    pub ability_font_size: f64,
    pub reminder_font_size: f64,
    pub meta_font_size: f64,
    pub uppercase_names: bool,

    pub ability_line_height: f64,
    pub ability_max_lines: usize,
    /// Smallest ability font scale tried before the text is truncated.
    pub ability_min_font_scale: f64,
    /// Horizontal inset subtracted from each chord, as a fraction of the diameter.
    pub circular_padding: f64,
    /// Top of the ability text block, as a fraction of the diameter.
    pub ability_text_top: f64,

    pub font_spacing: FontSpacing,
    pub text_shadow: TextShadow,

    pub leaf: LeafOptions,
    /// Fixed seed for leaf placement; `None` draws fresh randomness per render.
    pub leaf_seed: Option<u64>,
    pub setup_flower_style: Option<String>,
    pub icon: IconSettings,

    /// Replaces the ability text of character tokens when non-empty.
    pub bootlegger_rules: Option<String>,
    pub pandemonium_image: Option<String>,

    pub badge_color: Color,
    pub badge_text_color: Color,
    pub qr_color: Color,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            dpi: Dpi::PRINT,
            role_diameter_inches: ROLE_DIAMETER_INCHES,
            reminder_diameter_inches: REMINDER_DIAMETER_INCHES,

            display_ability_text: true,
            token_count: false,
            generate_reminder_tokens: true,
            generate_image_variants: false,
            script_name_token: true,
            almanac_token: true,
            pandemonium_token: true,

            transparent_background: false,
            character_background: Background::default(),
            reminder_background: Background::flat(Color::rgb(236, 226, 200)),
            meta_background: Background::default(),

            character_name_font: "Dumbledor".to_string(),
            character_name_color: Color::BLACK,
            ability_text_font: "Trade Gothic".to_string(),
            ability_text_color: Color::BLACK,
            reminder_text_font: "Trade Gothic".to_string(),
            reminder_text_color: Color::WHITE,
            meta_text_font: "Dumbledor".to_string(),
            meta_text_color: Color::BLACK,

            name_font_size: 0.1,
            ability_font_size: 0.052,
            reminder_font_size: 0.12,
            meta_font_size: 0.11,
            uppercase_names: true,

            ability_line_height: 1.15,
            ability_max_lines: 5,
            ability_min_font_scale: 0.6,
            circular_padding: 0.12,
            ability_text_top: 0.12,

            font_spacing: FontSpacing::default(),
            text_shadow: TextShadow::default(),

            leaf: LeafOptions::default(),
            leaf_seed: None,
            setup_flower_style: Some("setup_flower_1".to_string()),
            icon: IconSettings::default(),

            bootlegger_rules: None,
            pandemonium_image: None,

            badge_color: Color::rgb(120, 20, 20),
            badge_text_color: Color::WHITE,
            qr_color: Color::BLACK,
        }
    }
}

/// Partial update of [`GenerationOptions`].
///
/// Top-level fields replace the current value when set. `font_spacing` and `text_shadow` are
/// merged field by field so their unset members keep the current values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptionsPatch {
    pub dpi: Option<Dpi>,
    pub role_diameter_inches: Option<f64>,
    pub reminder_diameter_inches: Option<f64>,
    pub display_ability_text: Option<bool>,
    pub token_count: Option<bool>,
    pub generate_reminder_tokens: Option<bool>,
    pub generate_image_variants: Option<bool>,
    pub script_name_token: Option<bool>,
    pub almanac_token: Option<bool>,
    pub pandemonium_token: Option<bool>,
    pub transparent_background: Option<bool>,
    pub character_background: Option<Background>,
    pub reminder_background: Option<Background>,
    pub meta_background: Option<Background>,
    pub character_name_font: Option<String>,
    pub character_name_color: Option<Color>,
    pub ability_text_font: Option<String>,
    pub ability_text_color: Option<Color>,
    pub reminder_text_font: Option<String>,
    pub reminder_text_color: Option<Color>,
    pub meta_text_font: Option<String>,
    pub meta_text_color: Option<Color>,
    pub name_font_size: Option<f64>,
    pub ability_font_size: Option<f64>,
    pub reminder_font_size: Option<f64>,
    pub meta_font_size: Option<f64>,
    pub uppercase_names: Option<bool>,
    pub ability_line_height: Option<f64>,
    pub ability_max_lines: Option<usize>,
    pub ability_min_font_scale: Option<f64>,
    pub circular_padding: Option<f64>,
    pub ability_text_top: Option<f64>,
    pub font_spacing: Option<FontSpacingPatch>,
    pub text_shadow: Option<TextShadowPatch>,
    pub leaf: Option<LeafOptions>,
    pub leaf_seed: Option<Option<u64>>,
    pub setup_flower_style: Option<Option<String>>,
    pub icon: Option<IconSettings>,
    pub bootlegger_rules: Option<Option<String>>,
    pub pandemonium_image: Option<Option<String>>,
    pub badge_color: Option<Color>,
    pub badge_text_color: Option<Color>,
    pub qr_color: Option<Color>,
}

macro_rules! apply_fields {
    ($dst:expr, $patch:expr; $($field:ident),* $(,)?) => {
        $(
            if let Some(v) = $patch.$field {
                $dst.$field = v;
            }
        )*
    };
}

impl FontSpacing {
    fn merge(&mut self, patch: FontSpacingPatch) {
        apply_fields!(self, patch; character_name, ability_text, reminder_text, meta_text);
    }
}

impl TextShadow {
    fn merge(&mut self, patch: TextShadowPatch) {
        apply_fields!(self, patch; character_name, ability_text, reminder_text, meta_text, color);
    }
}

impl GenerationOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> TokenResult<Self> {
        serde_json::from_str(json).map_err(|e| TokenError::serde(format!("options: {e}")))
    }

    /// Read and parse an options JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> TokenResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read options from '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Return a copy with `patch` applied (nested shadow/spacing merged field by field).
    pub fn merged(&self, patch: GenerationOptionsPatch) -> Self {
        let mut out = self.clone();
        out.apply(patch);
        out
    }

    /// Apply `patch` in place.
    pub fn apply(&mut self, patch: GenerationOptionsPatch) {
        if let Some(spacing) = patch.font_spacing {
            self.font_spacing.merge(spacing);
        }
        if let Some(shadow) = patch.text_shadow {
            self.text_shadow.merge(shadow);
        }
        apply_fields!(self, patch;
            dpi,
            role_diameter_inches,
            reminder_diameter_inches,
            display_ability_text,
            token_count,
            generate_reminder_tokens,
            generate_image_variants,
            script_name_token,
            almanac_token,
            pandemonium_token,
            transparent_background,
            character_background,
            reminder_background,
            meta_background,
            character_name_font,
            character_name_color,
            ability_text_font,
            ability_text_color,
            reminder_text_font,
            reminder_text_color,
            meta_text_font,
            meta_text_color,
            name_font_size,
            ability_font_size,
            reminder_font_size,
            meta_font_size,
            uppercase_names,
            ability_line_height,
            ability_max_lines,
            ability_min_font_scale,
            circular_padding,
            ability_text_top,
            leaf,
            leaf_seed,
            setup_flower_style,
            icon,
            bootlegger_rules,
            pandemonium_image,
            badge_color,
            badge_text_color,
            qr_color,
        );
    }

    /// Reject option combinations no token can be rendered with.
    pub fn validate(&self) -> TokenResult<()> {
        self.dpi.validate()?;
        for (name, v) in [
            ("roleDiameterInches", self.role_diameter_inches),
            ("reminderDiameterInches", self.reminder_diameter_inches),
            ("abilityLineHeight", self.ability_line_height),
            ("nameFontSize", self.name_font_size),
            ("abilityFontSize", self.ability_font_size),
            ("reminderFontSize", self.reminder_font_size),
            ("metaFontSize", self.meta_font_size),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(TokenError::validation(format!("{name} must be finite and > 0")));
            }
        }
        if !(0.0..=1.0).contains(&self.leaf.probability) {
            return Err(TokenError::validation("leaf.probability must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.ability_min_font_scale) || self.ability_min_font_scale == 0.0
        {
            return Err(TokenError::validation(
                "abilityMinFontScale must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Ability text for `character`. Non-blank bootlegger rules replace the character's own
    /// ability; blank text yields `None`.
    pub fn ability_text_for<'a>(&'a self, character: &'a crate::Character) -> Option<&'a str> {
        if let Some(rules) = self.bootlegger_rules.as_deref().map(str::trim)
            && !rules.is_empty()
        {
            return Some(rules);
        }
        let ability = character.ability.trim();
        (!ability.is_empty()).then_some(ability)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/options.rs"]
mod tests;
