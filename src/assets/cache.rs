use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use async_trait::async_trait;

use crate::{
    assets::{
        decode::{DecodedImage, decode_image},
        loader::{HttpImageLoader, ImageLoader, LoaderConfig},
    },
    foundation::error::TokenResult,
};

const MB: f64 = 1024.0 * 1024.0;

/// Budgets for [`ImageCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Soft limit on the summed estimated size (`width × height × 4`) of cached images.
    pub max_bytes: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024 * 1024,
            max_entries: 500,
        }
    }
}

/// Snapshot returned by [`ImageCache::stats`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub used_mb: f64,
    pub budget_mb: f64,
    pub max_entries: usize,
}

/// Outcome of [`ImageCache::preload_many`]; failures never abort the preload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
}

/// Image access used by the token generator. [`ImageCache`] is the production implementation.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn get(&self, url: &str, is_local: bool) -> TokenResult<Arc<DecodedImage>>;
    fn has(&self, url: &str) -> bool;
    async fn preload_many(&self, urls: &[String]) -> PreloadReport;
    fn clear(&self);
    fn stats(&self) -> CacheStats;
}

struct CacheEntry {
    image: Arc<DecodedImage>,
    last_access: u64,
    estimated_bytes: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    clock: u64,
    used_bytes: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_oldest(&mut self) -> bool {
        let Some(oldest) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| k.clone())
        else {
            return false;
        };
        if let Some(e) = self.entries.remove(&oldest) {
            self.used_bytes = self.used_bytes.saturating_sub(e.estimated_bytes);
            tracing::trace!(url = %oldest, bytes = e.estimated_bytes, "evicted image");
        }
        true
    }
}

/// URL → decoded image cache with least-recently-used eviction under a byte and entry budget.
///
/// Access order is tracked with a logical clock, so eviction order is deterministic. The state
/// lock is never held across an await: two concurrent misses for one URL may both load, but
/// only one entry is kept. Failed loads are not cached.
pub struct ImageCache {
    loader: Arc<dyn ImageLoader>,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl ImageCache {
    pub fn new(loader: Arc<dyn ImageLoader>, config: CacheConfig) -> Self {
        Self {
            loader,
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, url: &str) -> Option<Arc<DecodedImage>> {
        let mut state = self.lock();
        let now = state.tick();
        let entry = state.entries.get_mut(url)?;
        entry.last_access = now;
        Some(Arc::clone(&entry.image))
    }

    fn insert(&self, url: &str, image: Arc<DecodedImage>) -> Arc<DecodedImage> {
        let size = image.estimated_bytes();
        let mut state = self.lock();
        let now = state.tick();

        if let Some(existing) = state.entries.get_mut(url) {
            existing.last_access = now;
            return Arc::clone(&existing.image);
        }
        if size > self.config.max_bytes || self.config.max_entries == 0 {
            tracing::warn!(url, bytes = size, "image exceeds cache budget, returning uncached");
            return image;
        }

        while state.entries.len() + 1 > self.config.max_entries
            || state.used_bytes + size > self.config.max_bytes
        {
            if !state.evict_oldest() {
                break;
            }
        }

        state.used_bytes += size;
        state.entries.insert(
            url.to_string(),
            CacheEntry {
                image: Arc::clone(&image),
                last_access: now,
                estimated_bytes: size,
            },
        );
        image
    }

    /// Cached image for `url`, loading and decoding it on a miss.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self, url: &str, is_local: bool) -> TokenResult<Arc<DecodedImage>> {
        if let Some(hit) = self.lookup(url) {
            return Ok(hit);
        }
        let bytes = self.loader.load_bytes(url, is_local).await?;
        let image = Arc::new(decode_image(&bytes)?);
        Ok(self.insert(url, image))
    }

    /// Whether `url` is cached. Does not refresh its access time.
    pub fn has(&self, url: &str) -> bool {
        self.lock().entries.contains_key(url)
    }

    /// Load every distinct URL concurrently; failures are logged and counted.
    pub async fn preload_many(&self, urls: &[String]) -> PreloadReport {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty() && seen.insert(*u))
            .collect();

        let results = futures::future::join_all(distinct.iter().map(|u| self.get(u, false))).await;

        let mut report = PreloadReport {
            requested: distinct.len(),
            ..PreloadReport::default()
        };
        for (url, res) in distinct.iter().zip(results) {
            match res {
                Ok(_) => report.loaded += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(url, error = %e, "image preload failed");
                }
            }
        }
        report
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.used_bytes = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            entries: state.entries.len(),
            used_mb: state.used_bytes as f64 / MB,
            budget_mb: self.config.max_bytes as f64 / MB,
            max_entries: self.config.max_entries,
        }
    }
}

#[async_trait]
impl ImageProvider for ImageCache {
    async fn get(&self, url: &str, is_local: bool) -> TokenResult<Arc<DecodedImage>> {
        ImageCache::get(self, url, is_local).await
    }

    fn has(&self, url: &str) -> bool {
        ImageCache::has(self, url)
    }

    async fn preload_many(&self, urls: &[String]) -> PreloadReport {
        ImageCache::preload_many(self, urls).await
    }

    fn clear(&self) {
        ImageCache::clear(self)
    }

    fn stats(&self) -> CacheStats {
        ImageCache::stats(self)
    }
}

static GLOBAL_CACHE: OnceLock<Arc<ImageCache>> = OnceLock::new();

/// Process-wide cache backed by an [`HttpImageLoader`] configured from the environment.
pub fn global_image_cache() -> TokenResult<Arc<ImageCache>> {
    if let Some(cache) = GLOBAL_CACHE.get() {
        return Ok(Arc::clone(cache));
    }
    let loader = HttpImageLoader::new(LoaderConfig::from_env())?;
    let cache = Arc::new(ImageCache::new(Arc::new(loader), CacheConfig::default()));
    Ok(Arc::clone(GLOBAL_CACHE.get_or_init(|| cache)))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
