use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const MAX_WIDTH: u32 = 4096;
pub const MAX_HEIGHT: u32 = 4096;

lazy_static! {
    static ref FILL_PATH: Regex =
        Regex::new(r"^/fill/(\d+)/(\d+)/((?:[/a-z\d\-._])+\.jpe?g)$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("bad image request url")]
    BadRequestUrl,
}

/// A request for a JPEG from the origin, scaled to fit a `width` x `height` box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FillRequest {
    pub path: String,
    pub width: u32,
    pub height: u32,
}

impl FillRequest {
    /// Parse `/fill/<width>/<height>/<path>`.
    ///
    /// The path may contain lowercase letters, digits, `/`, `-`, `_` and `.`,
    /// and must end in `.jpg` or `.jpeg`. Dimensions must be within
    /// `1..=4096`.
    pub fn parse(uri: &str) -> Result<Self, ParseError> {
        let caps = FILL_PATH.captures(uri).ok_or(ParseError::BadRequestUrl)?;

        let width = parse_dimension(&caps[1], MAX_WIDTH)?;
        let height = parse_dimension(&caps[2], MAX_HEIGHT)?;

        let path = &caps[3];
        if path.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
            return Err(ParseError::BadRequestUrl);
        }

        Ok(Self {
            path: path.to_string(),
            width,
            height,
        })
    }

    /// `"{width}x{height}-{sha256(path)}"`, the sole identity of a cached preview.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.path.as_bytes());
        format!("{}x{}-{:x}", self.width, self.height, hasher.finalize())
    }
}

fn parse_dimension(digits: &str, max: u32) -> Result<u32, ParseError> {
    match digits.parse::<u32>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(ParseError::BadRequestUrl),
    }
}
