use serde_json::json;

use super::*;
use crate::{Character, Team};

#[test]
fn empty_json_yields_defaults() {
    let opts = GenerationOptions::from_json_str("{}").unwrap();
    assert_eq!(opts, GenerationOptions::default());
    assert_eq!(opts.dpi, Dpi::PRINT);
    assert_eq!(opts.role_diameter_inches, ROLE_DIAMETER_INCHES);
    opts.validate().unwrap();
}

#[test]
fn patch_merges_nested_shadow_field_by_field() {
    let base = GenerationOptions::default();
    let patch: GenerationOptionsPatch = serde_json::from_value(json!({
        "dpi": 600,
        "textShadow": { "abilityText": 0 },
        "fontSpacing": { "characterName": 2.5 }
    }))
    .unwrap();

    let merged = base.merged(patch);
    assert_eq!(merged.dpi, Dpi::HIGH);
    assert_eq!(merged.text_shadow.ability_text, 0.0);
    assert_eq!(
        merged.text_shadow.character_name,
        base.text_shadow.character_name
    );
    assert_eq!(merged.text_shadow.color, base.text_shadow.color);
    assert_eq!(merged.font_spacing.character_name, 2.5);
    assert_eq!(merged.font_spacing.ability_text, 0.0);
    assert_eq!(merged.leaf, base.leaf);
}

#[test]
fn patch_without_fields_is_identity() {
    let base = GenerationOptions {
        token_count: true,
        ..GenerationOptions::default()
    };
    assert_eq!(base.merged(GenerationOptionsPatch::default()), base);
}

#[test]
fn validate_rejects_bad_values() {
    let mut opts = GenerationOptions::default();
    opts.dpi = Dpi(0);
    assert!(opts.validate().unwrap_err().is_validation());

    let mut opts = GenerationOptions::default();
    opts.leaf.probability = 1.5;
    assert!(opts.validate().is_err());

    let mut opts = GenerationOptions::default();
    opts.role_diameter_inches = -1.0;
    assert!(opts.validate().is_err());
}

#[test]
fn bootlegger_rules_replace_ability_text() {
    let mut bootlegger = Character::new("bootlegger", "Bootlegger", Team::Loric);
    bootlegger.ability = "This script has homebrew characters or rules.".to_string();

    let mut opts = GenerationOptions::default();
    assert_eq!(
        opts.ability_text_for(&bootlegger),
        Some("This script has homebrew characters or rules.")
    );

    opts.bootlegger_rules = Some("  The Spy sees the Grimoire twice.  ".to_string());
    assert_eq!(
        opts.ability_text_for(&bootlegger),
        Some("The Spy sees the Grimoire twice.")
    );

    let mut imp = Character::new("imp", "Imp", Team::Demon);
    imp.ability = "  ".to_string();
    assert_eq!(
        opts.ability_text_for(&imp),
        Some("The Spy sees the Grimoire twice.")
    );

    opts.bootlegger_rules = Some("   ".to_string());
    assert_eq!(opts.ability_text_for(&imp), None);
    assert_eq!(
        opts.ability_text_for(&bootlegger),
        Some("This script has homebrew characters or rules.")
    );
}

#[test]
fn options_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opts.json");
    std::fs::write(&path, r##"{ "tokenCount": true, "qrColor": "#112233" }"##).unwrap();
    let opts = GenerationOptions::from_path(&path).unwrap();
    assert!(opts.token_count);
    assert_eq!(opts.qr_color, Color::rgb(0x11, 0x22, 0x33));

    assert!(GenerationOptions::from_path(dir.path().join("missing.json")).is_err());
}
