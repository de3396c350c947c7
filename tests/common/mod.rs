#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use rocket::async_trait;
use rocket::figment::Figment;
use rocket::local::asynchronous::Client;
use tempfile::TempDir;

use proxy_resizer::cache::{DiskCache, StoredResponse};
use proxy_resizer::images::{
    LanczosResizer, Origin, OriginError, OriginResponse, ResizeError, Resizer,
};
use proxy_resizer::proxy::Pipeline;

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Jpeg(90))
        .unwrap();
    out
}

pub fn ok_response(content_type: &str, body: Vec<u8>) -> OriginResponse {
    OriginResponse {
        status: 200,
        headers: vec![
            ("content-type".to_string(), content_type.to_string()),
            ("content-length".to_string(), body.len().to_string()),
            ("etag".to_string(), "\"origin-etag\"".to_string()),
            ("connection".to_string(), "keep-alive".to_string()),
        ],
        body,
    }
}

/// In-memory origin. Unknown paths answer 404.
#[derive(Default)]
pub struct FakeOrigin {
    files: HashMap<String, OriginResponse>,
    calls: AtomicUsize,
}

impl FakeOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, response: OriginResponse) -> Self {
        self.files.insert(path.to_string(), response);
        self
    }

    /// The usual fixture set: a 681x1024 cat, a broken JPEG and a text file.
    pub fn cats() -> Self {
        Self::new()
            .with("cat-1.jpg", ok_response("image/jpeg", jpeg(681, 1024)))
            .with("cat-2.jpg", ok_response("image/jpeg", jpeg(1024, 768)))
            .with("bad.jpg", ok_response("image/jpeg", b"\xFF\xD8\xFFnot really".to_vec()))
            .with("doc.jpg", ok_response("text/html", b"<html></html>".to_vec()))
            .with(
                "broken.jpg",
                OriginResponse {
                    status: 500,
                    headers: vec![("content-type".to_string(), "text/plain".to_string())],
                    body: b"boom".to_vec(),
                },
            )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Origin for FakeOrigin {
    fn target(&self, path: &str) -> String {
        format!("fake://{}", path)
    }

    async fn fetch(&self, path: &str) -> Result<OriginResponse, OriginError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.files.get(path).cloned().unwrap_or(OriginResponse {
            status: 404,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: b"404 page not found".to_vec(),
        }))
    }
}

/// Codec stand-in that ignores image content.
pub struct StubResizer {
    pub output: Option<Vec<u8>>,
}

impl Resizer for StubResizer {
    fn fit(&self, _data: &[u8], _width: u32, _height: u32) -> Result<Vec<u8>, ResizeError> {
        self.output
            .clone()
            .ok_or_else(|| ResizeError::Encode("stub refuses".to_string()))
    }
}

pub struct TestProxy {
    pub client: Client,
    pub cache: Arc<DiskCache>,
    _dir: TempDir,
}

pub async fn proxy_with(origin: Arc<dyn Origin>, resizer: Arc<dyn Resizer>) -> TestProxy {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(DiskCache::new(dir.path(), 10).unwrap());
    let pipeline = Pipeline::new(Arc::clone(&cache), origin, resizer);

    let figment = Figment::from(rocket::Config::debug_default());
    let client = Client::tracked(proxy_resizer::build(figment, pipeline))
        .await
        .expect("valid rocket instance");

    TestProxy {
        client,
        cache,
        _dir: dir,
    }
}

pub async fn proxy(origin: Arc<dyn Origin>) -> TestProxy {
    proxy_with(origin, Arc::new(LanczosResizer::default())).await
}

/// Records are written after the response is returned; poll until one lands.
pub async fn wait_for_record(cache: &DiskCache, key: &str) -> StoredResponse {
    for _ in 0..200 {
        if let Some(record) = cache.get(key) {
            return record;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no cache record for {}", key);
}

pub fn key_for(uri: &str) -> String {
    proxy_resizer::models::FillRequest::parse(uri)
        .unwrap()
        .cache_key()
}
