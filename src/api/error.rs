use std::io::Cursor;

use rocket::http::{ContentType, Header, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use thiserror::Error;

use crate::images::{OriginError, ResizeError};
use crate::models::ParseError;

/// Every way a preview request can fail. All variants are terminal for the request.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error(transparent)]
    BadRequest(#[from] ParseError),

    #[error(transparent)]
    OriginUnavailable(#[from] OriginError),

    #[error("Not Found")]
    OriginNotFound,

    #[error("bad target server response {0}")]
    OriginBadStatus(u16),

    #[error("bad content type")]
    OriginBadContentType,

    #[error(transparent)]
    Resize(#[from] ResizeError),

    #[error("resize error: {0}")]
    ResizeAborted(String),
}

impl ProxyError {
    pub fn status(&self) -> Status {
        match self {
            ProxyError::OriginNotFound => Status::NotFound,
            // Malformed preview URLs answer 502 as well, like every other failure.
            _ => Status::BadGateway,
        }
    }
}

impl<'r> Responder<'r, 'static> for ProxyError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body = format!("{}\n", self);

        Response::build()
            .status(self.status())
            .header(ContentType::Plain)
            .header(Header::new("X-Content-Type-Options", "nosniff"))
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
