use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::*;

/// Local HTTP server: `/proxy...` answers 200 with `IMG`, every other path 403. Records each
/// request path.
async fn spawn_image_server() -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let paths = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&paths);
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let mut len = 0;
            while !buf[..len].windows(4).any(|w| w == b"\r\n\r\n") && len < buf.len() {
                let n = sock.read(&mut buf[len..]).await.unwrap();
                if n == 0 {
                    break;
                }
                len += n;
            }
            let head = String::from_utf8_lossy(&buf[..len]).into_owned();
            let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
            log.lock().unwrap().push(path.clone());

            let (status, body): (&str, &[u8]) = if path.starts_with("/proxy") {
                ("200 OK", &b"IMG"[..])
            } else {
                ("403 Forbidden", &b""[..])
            };
            let head = format!(
                "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            sock.write_all(head.as_bytes()).await.unwrap();
            sock.write_all(body).await.unwrap();
            let _ = sock.shutdown().await;
        }
    });
    (base, paths)
}

#[test]
fn proxy_url_encodes_target() {
    let proxy = CorsProxySetting::Endpoint("https://proxy.example/?url=".to_string());
    assert_eq!(
        proxy.proxied_url("https://x.test/a b.png?s=1").unwrap(),
        "https://proxy.example/?url=https%3A%2F%2Fx.test%2Fa+b.png%3Fs%3D1"
    );
    assert_eq!(CorsProxySetting::Disabled.proxied_url("https://x"), None);
}

#[test]
fn data_urls_decode_base64_and_percent_payloads() {
    assert_eq!(decode_data_url("data:image/png;base64,aGk=").unwrap(), b"hi");
    assert_eq!(
        decode_data_url("data:image/svg+xml,%3Csvg%3E").unwrap(),
        b"<svg>"
    );
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(decode_data_url("data:text/plain,%zz").is_err());
    assert!(decode_data_url("data:text/plain,%+1").is_err());
    assert!(decode_data_url("data:text/plain,%4").is_err());
    assert_eq!(decode_data_url("data:text/plain,a+b%20c").unwrap(), b"a+b c");
}

#[test]
fn local_paths_resolve_against_root() {
    let root = Path::new("/assets");
    assert_eq!(
        resolve_local_path(Some(root), "icons/imp.png"),
        PathBuf::from("/assets/icons/imp.png")
    );
    assert_eq!(
        resolve_local_path(Some(root), "/abs/imp.png"),
        PathBuf::from("/abs/imp.png")
    );
    assert_eq!(
        resolve_local_path(None, "file://rel.png"),
        PathBuf::from("rel.png")
    );
}

#[tokio::test]
async fn local_file_loads_and_missing_file_reports_attempt() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.bin"), [1u8, 2, 3]).unwrap();
    let loader = HttpImageLoader::new(LoaderConfig {
        asset_root: Some(dir.path().to_path_buf()),
        ..LoaderConfig::default()
    })
    .unwrap();

    assert_eq!(loader.load_bytes("a.bin", false).await.unwrap(), vec![1, 2, 3]);

    let err = loader.load_bytes("missing.png", true).await.unwrap_err();
    match err {
        TokenError::ImageLoad { url, attempts } => {
            assert_eq!(url, "missing.png");
            assert_eq!(attempts.len(), 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn disabled_proxy_fetches_directly_once() {
    let (base, paths) = spawn_image_server().await;
    let loader = HttpImageLoader::new(LoaderConfig::default()).unwrap();

    let err = loader
        .load_bytes(&format!("{base}/imp.png"), false)
        .await
        .unwrap_err();
    match err {
        TokenError::ImageLoad { attempts, .. } => {
            assert_eq!(attempts, vec!["direct: HTTP 403 Forbidden".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(*paths.lock().unwrap(), vec!["/imp.png".to_string()]);
}

#[tokio::test]
async fn failed_direct_fetch_retries_through_proxy() {
    let (base, paths) = spawn_image_server().await;
    let loader = HttpImageLoader::new(LoaderConfig {
        cors_proxy: CorsProxySetting::Endpoint(format!("{base}/proxy?url=")),
        ..LoaderConfig::default()
    })
    .unwrap();

    let target = format!("{base}/imp.png");
    assert_eq!(loader.load_bytes(&target, false).await.unwrap(), b"IMG");

    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    assert_eq!(
        *paths.lock().unwrap(),
        vec!["/imp.png".to_string(), format!("/proxy?url={encoded}")]
    );
}
