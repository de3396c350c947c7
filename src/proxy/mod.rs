use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::api::ProxyError;
use crate::cache::{DiskCache, StoredResponse};
use crate::images::{Origin, OriginResponse, Resizer};
use crate::models::FillRequest;

pub const PROXY_NAME: &str = "proxy-resizer";

const JPEG_CONTENT_TYPE: &str = "image/jpeg";

// Connection-level headers; they describe the origin hop, not the image.
const HOP_BY_HOP_HEADERS: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// A preview ready to be written to the client.
#[derive(Debug, Clone)]
pub struct Preview {
    pub status: u16,
    pub record: StoredResponse,
    pub cached: bool,
}

/// Serves fill requests: cache lookup, origin fetch, validation, resize, persistence.
pub struct Pipeline {
    cache: Arc<DiskCache>,
    origin: Arc<dyn Origin>,
    resizer: Arc<dyn Resizer>,
}

impl Pipeline {
    pub fn new(cache: Arc<DiskCache>, origin: Arc<dyn Origin>, resizer: Arc<dyn Resizer>) -> Self {
        Self {
            cache,
            origin,
            resizer,
        }
    }

    pub async fn handle(&self, uri: &str) -> Result<Preview, ProxyError> {
        info!("Request URI {}", uri);

        let request = FillRequest::parse(uri)?;
        let key = request.cache_key();

        if let Some(record) = self.lookup(&key).await {
            info!("taken from cache: {}", key);
            return Ok(Preview {
                status: 200,
                record,
                cached: true,
            });
        }

        info!("target: {}", self.origin.target(&request.path));
        let OriginResponse {
            status,
            headers,
            body,
        } = self.origin.fetch(&request.path).await.map_err(|e| {
            error!("{}", e);
            ProxyError::from(e)
        })?;

        if status == 404 {
            info!("origin has no {}", request.path);
            return Err(ProxyError::OriginNotFound);
        }
        if !(200..=299).contains(&status) {
            let err = ProxyError::OriginBadStatus(status);
            error!("{}", err);
            return Err(err);
        }
        let content_type = headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str());
        if content_type != Some(JPEG_CONTENT_TYPE) {
            debug!("origin content type {:?} for {}", content_type, request.path);
            return Err(ProxyError::OriginBadContentType);
        }

        let resized = self.resize(body, request.width, request.height).await?;

        let mut record = StoredResponse::new();
        for (name, value) in headers {
            if !HOP_BY_HOP_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(&name)) {
                record.set_header(&canonical_header_name(&name), value);
            }
        }
        record.body = resized;
        record.set_header("Content-Length", record.len().to_string());

        self.persist(key, record.clone());

        Ok(Preview {
            status,
            record,
            cached: false,
        })
    }

    async fn lookup(&self, key: &str) -> Option<StoredResponse> {
        let cache = Arc::clone(&self.cache);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || cache.get(&key))
            .await
            .unwrap_or_else(|e| {
                warn!("cache lookup task failed: {}", e);
                None
            })
    }

    async fn resize(&self, body: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, ProxyError> {
        let resizer = Arc::clone(&self.resizer);

        let resized = tokio::task::spawn_blocking(move || resizer.fit(&body, width, height))
            .await
            .map_err(|e| {
                error!("resize task failed: {}", e);
                ProxyError::ResizeAborted(e.to_string())
            })?;

        resized.map_err(|e| {
            error!("{}", e);
            ProxyError::from(e)
        })
    }

    // Runs detached on the blocking pool; the response never waits for the write.
    fn persist(&self, key: String, record: StoredResponse) {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || cache.set(&key, &record));
    }
}

/// `content-type` -> `Content-Type`; the origin client hands names over lowercased.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
