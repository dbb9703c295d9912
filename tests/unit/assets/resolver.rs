use super::*;

#[test]
fn tiers_are_tried_in_order() {
    let catalog = StaticAssetCatalog::new()
        .with_user_asset("u1", "/uploads/u1.png")
        .with_builtin("parchment", "builtin/parchment.webp");

    assert_eq!(
        catalog.resolve("asset:u1"),
        Some(ResolvedAsset::local("/uploads/u1.png"))
    );
    assert_eq!(catalog.resolve("asset:missing"), None);
    assert_eq!(
        catalog.resolve("parchment"),
        Some(ResolvedAsset::local("builtin/parchment.webp"))
    );
    assert_eq!(
        catalog.resolve("setup_flower_1"),
        Some(ResolvedAsset::local("images/setup_flower_1.png"))
    );
    assert_eq!(
        catalog.resolve("https://cdn.test/bg.png"),
        Some(ResolvedAsset::remote("https://cdn.test/bg.png"))
    );
    assert_eq!(catalog.resolve("  "), None);
}

#[test]
fn legacy_tier_can_be_disabled() {
    let catalog = StaticAssetCatalog::new().with_legacy_pattern(None);
    assert_eq!(catalog.resolve("setup_flower_1"), None);
}

#[test]
fn from_dir_registers_images_by_stem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("leaf.png"), b"x").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

    let catalog = StaticAssetCatalog::from_dir(dir.path()).unwrap();
    let leaf = catalog.resolve("leaf").unwrap();
    assert!(leaf.is_local);
    assert!(leaf.source.ends_with("leaf.png"));
    assert!(catalog.resolve("notes").unwrap().source.ends_with("notes.png"));
}
