use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use base64::Engine as _;

use crate::foundation::error::{TokenError, TokenResult};

/// Source of raw image bytes for the [`ImageCache`](crate::ImageCache).
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Fetch the encoded bytes behind `source`. `is_local` forces a lookup under the asset root.
    async fn load_bytes(&self, source: &str, is_local: bool) -> TokenResult<Vec<u8>>;
}

/// Fallback proxy used when a direct fetch of a remote image fails.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CorsProxySetting {
    /// Never retry through a proxy.
    #[default]
    Disabled,
    /// Retry once through `<prefix><url-encoded target>`.
    Endpoint(String),
}

impl CorsProxySetting {
    /// Proxied form of `target`, if a proxy is configured.
    pub fn proxied_url(&self, target: &str) -> Option<String> {
        match self {
            Self::Disabled => None,
            Self::Endpoint(prefix) => {
                let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
                Some(format!("{prefix}{encoded}"))
            }
        }
    }
}

/// Settings for [`HttpImageLoader`].
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    pub cors_proxy: CorsProxySetting,
    /// Directory relative and local image paths are resolved against.
    pub asset_root: Option<PathBuf>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cors_proxy: CorsProxySetting::Disabled,
            asset_root: None,
            timeout: Duration::from_secs(30),
            user_agent: concat!("clocktower-tokens/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LoaderConfig {
    /// Environment variable holding the CORS proxy prefix.
    pub const PROXY_ENV: &str = "TOKENS_CORS_PROXY";
    /// Environment variable holding the local asset root.
    pub const ASSET_ROOT_ENV: &str = "TOKENS_ASSET_ROOT";

    /// Defaults overridden by `TOKENS_CORS_PROXY` and `TOKENS_ASSET_ROOT` when set and non-empty.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(prefix) = std::env::var(Self::PROXY_ENV)
            && !prefix.trim().is_empty()
        {
            cfg.cors_proxy = CorsProxySetting::Endpoint(prefix.trim().to_string());
        }
        if let Ok(root) = std::env::var(Self::ASSET_ROOT_ENV)
            && !root.trim().is_empty()
        {
            cfg.asset_root = Some(PathBuf::from(root.trim()));
        }
        cfg
    }
}

/// Loader for data URLs, local files and remote URLs (`reqwest`), with optional proxy retry.
pub struct HttpImageLoader {
    http: reqwest::Client,
    config: LoaderConfig,
}

impl HttpImageLoader {
    pub fn new(config: LoaderConfig) -> TokenResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TokenError::Other(anyhow::anyhow!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self.http.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }

    async fn load_remote(&self, url: &str) -> TokenResult<Vec<u8>> {
        let mut attempts = Vec::new();
        match self.fetch(url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => attempts.push(format!("direct: {e}")),
        }

        if let Some(proxied) = self.config.cors_proxy.proxied_url(url) {
            tracing::debug!(url, "direct fetch failed, retrying through proxy");
            match self.fetch(&proxied).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => attempts.push(format!("proxy: {e}")),
            }
        }

        Err(TokenError::ImageLoad {
            url: url.to_string(),
            attempts,
        })
    }

    async fn load_local(&self, source: &str) -> TokenResult<Vec<u8>> {
        let path = resolve_local_path(self.config.asset_root.as_deref(), source);
        tokio::fs::read(&path)
            .await
            .map_err(|e| TokenError::ImageLoad {
                url: source.to_string(),
                attempts: vec![format!("file '{}': {e}", path.display())],
            })
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load_bytes(&self, source: &str, is_local: bool) -> TokenResult<Vec<u8>> {
        let source = source.trim();
        if source.starts_with("data:") {
            return decode_data_url(source);
        }
        if !is_local && is_remote(source) {
            return self.load_remote(source).await;
        }
        self.load_local(source).await
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.get(..8).unwrap_or(source).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn resolve_local_path(root: Option<&Path>, source: &str) -> PathBuf {
    let source = source.strip_prefix("file://").unwrap_or(source);
    let path = Path::new(source);
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

/// Decode a `data:` URL with a base64 or percent-encoded payload.
pub fn decode_data_url(url: &str) -> TokenResult<Vec<u8>> {
    let fail = |why: &str| TokenError::ImageLoad {
        url: url.chars().take(64).collect(),
        attempts: vec![format!("data url: {why}")],
    };
    let rest = url.strip_prefix("data:").ok_or_else(|| fail("missing 'data:' prefix"))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| fail("missing ','"))?;
    if header.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        return base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| fail(&e.to_string()));
    }
    percent_decode(payload).ok_or_else(|| fail("invalid percent-encoding"))
}

/// Percent-decode `s`; every `%` must be followed by exactly two hex digits.
fn percent_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let well_formed = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
    well_formed.then(|| urlencoding::decode_binary(bytes).into_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
