use std::{
    io::Cursor,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::foundation::error::TokenError;

/// Serves 10×10 PNGs (400 estimated bytes) for any URL except those containing "bad".
#[derive(Default)]
struct FakeLoader {
    loads: AtomicUsize,
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, [9u8, 8, 7, 255].repeat((w * h) as usize)).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[async_trait]
impl ImageLoader for FakeLoader {
    async fn load_bytes(&self, source: &str, _is_local: bool) -> TokenResult<Vec<u8>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if source.contains("bad") {
            return Err(TokenError::ImageLoad {
                url: source.to_string(),
                attempts: vec!["direct: HTTP 404".to_string()],
            });
        }
        if source.contains("huge") {
            return Ok(png(40, 40));
        }
        Ok(png(10, 10))
    }
}

fn cache(max_bytes: u64, max_entries: usize) -> (Arc<FakeLoader>, ImageCache) {
    let loader = Arc::new(FakeLoader::default());
    let cache = ImageCache::new(
        loader.clone(),
        CacheConfig {
            max_bytes,
            max_entries,
        },
    );
    (loader, cache)
}

#[tokio::test]
async fn hit_does_not_reload() {
    let (loader, cache) = cache(10_000, 10);
    let a = cache.get("a", false).await.unwrap();
    let b = cache.get("a", false).await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert!(cache.has("a"));
}

#[tokio::test]
async fn entry_bound_evicts_least_recently_used() {
    let (_, cache) = cache(10_000, 2);
    cache.get("a", false).await.unwrap();
    cache.get("b", false).await.unwrap();
    cache.get("a", false).await.unwrap();
    cache.get("c", false).await.unwrap();

    assert!(cache.has("a"));
    assert!(!cache.has("b"));
    assert!(cache.has("c"));
    assert_eq!(cache.stats().entries, 2);
}

#[tokio::test]
async fn byte_budget_evicts_oldest_first() {
    let (_, cache) = cache(1_000, 100);
    for url in ["a", "b", "c"] {
        cache.get(url, false).await.unwrap();
    }
    assert!(!cache.has("a"));
    assert!(cache.has("b") && cache.has("c"));

    let stats = cache.stats();
    assert_eq!(stats.entries, 2);
    assert!(stats.used_mb * MB <= 1_000.0);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let (loader, cache) = cache(10_000, 10);
    assert!(cache.get("bad", false).await.is_err());
    assert!(cache.get("bad", false).await.is_err());
    assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stats().entries, 0);
}

#[tokio::test]
async fn oversize_image_is_returned_uncached() {
    let (_, cache) = cache(1_000, 10);
    let img = cache.get("huge", false).await.unwrap();
    assert_eq!(img.width, 40);
    assert!(!cache.has("huge"));
}

#[tokio::test]
async fn concurrent_misses_keep_one_entry() {
    let (_, cache) = cache(10_000, 10);
    let (a, b) = tokio::join!(cache.get("same", false), cache.get("same", false));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(cache.stats().entries, 1);
    assert_eq!(cache.stats().used_mb * MB, 400.0);
}

#[tokio::test]
async fn preload_is_best_effort_and_deduplicates() {
    let (loader, cache) = cache(10_000, 10);
    let urls = ["a", "bad", "a", " ", "b"].map(String::from);
    let report = cache.preload_many(&urls).await;
    assert_eq!(
        report,
        PreloadReport {
            requested: 3,
            loaded: 2,
            failed: 1,
        }
    );
    assert_eq!(loader.loads.load(Ordering::SeqCst), 3);

    cache.clear();
    let stats = cache.stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.used_mb, 0.0);
    assert_eq!(stats.max_entries, 10);
}
