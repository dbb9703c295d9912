use std::{collections::HashMap, path::Path};

use anyhow::Context as _;

use crate::foundation::error::TokenResult;

/// Prefix marking a user-uploaded asset reference (`asset:<id>`).
pub const USER_ASSET_PREFIX: &str = "asset:";

/// Where the bytes of a resolved reference come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub source: String,
    /// Read from the local asset root rather than over the network.
    pub is_local: bool,
}

impl ResolvedAsset {
    pub fn local(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            is_local: true,
        }
    }

    pub fn remote(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            is_local: false,
        }
    }
}

/// Maps decorative asset references (backgrounds, setup flower, leaves) to image sources.
pub trait AssetResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Option<ResolvedAsset>;
}

/// In-memory resolver with three tiers, tried in order:
///
/// 1. `asset:<id>` references look up user-uploaded assets only.
/// 2. Built-in catalog ids.
/// 3. The legacy file pattern, with `{name}` replaced by the reference.
///
/// URLs (`http(s)://`, `data:`) pass through unchanged.
#[derive(Clone, Debug)]
pub struct StaticAssetCatalog {
    user: HashMap<String, String>,
    builtin: HashMap<String, String>,
    legacy_pattern: Option<String>,
}

impl Default for StaticAssetCatalog {
    fn default() -> Self {
        Self {
            user: HashMap::new(),
            builtin: HashMap::new(),
            legacy_pattern: Some("images/{name}.png".to_string()),
        }
    }
}

impl StaticAssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_asset(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.user.insert(id.into(), source.into());
        self
    }

    pub fn with_builtin(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.builtin.insert(id.into(), source.into());
        self
    }

    /// Replace the legacy pattern; `None` disables the third tier.
    pub fn with_legacy_pattern(mut self, pattern: Option<String>) -> Self {
        self.legacy_pattern = pattern;
        self
    }

    /// Register every image file directly under `dir` as a built-in asset keyed by file stem.
    pub fn from_dir(dir: impl AsRef<Path>) -> TokenResult<Self> {
        let dir = dir.as_ref();
        let mut out = Self::default();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("read asset dir '{}'", dir.display()))?
        {
            let path = entry.context("read asset dir entry")?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| {
                    matches!(
                        e.to_ascii_lowercase().as_str(),
                        "png" | "jpg" | "jpeg" | "webp" | "gif" | "svg"
                    )
                });
            if is_image {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                out.builtin
                    .entry(stem.to_string())
                    .or_insert_with(|| path.to_string_lossy().into_owned());
            }
        }
        out.legacy_pattern = Some(format!("{}/{{name}}.png", dir.display()));
        Ok(out)
    }
}

fn is_url(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

impl AssetResolver for StaticAssetCatalog {
    fn resolve(&self, reference: &str) -> Option<ResolvedAsset> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if let Some(id) = reference.strip_prefix(USER_ASSET_PREFIX) {
            return self.user.get(id).map(|src| {
                if is_url(src) {
                    ResolvedAsset::remote(src.clone())
                } else {
                    ResolvedAsset::local(src.clone())
                }
            });
        }
        if is_url(reference) {
            return Some(ResolvedAsset::remote(reference));
        }
        if let Some(src) = self.builtin.get(reference) {
            return Some(ResolvedAsset::local(src.clone()));
        }
        self.legacy_pattern
            .as_deref()
            .map(|p| ResolvedAsset::local(p.replace("{name}", reference)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
