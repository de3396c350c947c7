use std::time::Duration;

use rocket::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OriginError {
    #[error("origin request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to build origin client: {0}")]
    Client(String),
}

/// What the origin answered. Headers keep the first value of each name, in response order.
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl OriginResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Where original images come from.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Describe where `path` is fetched from, for logging.
    fn target(&self, path: &str) -> String;

    async fn fetch(&self, path: &str) -> Result<OriginResponse, OriginError>;
}

/// Origin reached over HTTP(S) with a shared, pooled client.
pub struct HttpOrigin {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrigin {
    pub fn new(base_url: &str, timeout: u64) -> Result<Self, OriginError> {
        // reqwest only decompresses when built with its gzip/brotli/deflate
        // features, which are off: origin bytes reach the decoder untouched.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| OriginError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    fn target(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch(&self, path: &str) -> Result<OriginResponse, OriginError> {
        let response = self.client.get(self.target(path)).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .keys()
            .filter_map(|name| {
                let value = response.headers().get(name)?.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response.bytes().await?.to_vec();

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }
}
