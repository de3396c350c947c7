use std::io::Cursor;

use rocket::http::uri::Origin as RequestUri;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::State;

use crate::api::ProxyError;
use crate::proxy::{Pipeline, Preview, PROXY_NAME};

// Every path is routed here so that malformed preview URLs get the
// pipeline's 502 instead of Rocket's default 404. The query is kept: a
// preview URL never carries one.
#[get("/<_..>")]
pub async fn fill(uri: &RequestUri<'_>, pipeline: &State<Pipeline>) -> Result<Preview, ProxyError> {
    pipeline.handle(&uri.to_string()).await
}

impl<'r> Responder<'r, 'static> for Preview {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Response::build();

        // Rocket derives Content-Length from the sized body; the stored value
        // always equals the body length.
        for (name, value) in self.record.headers {
            if !name.eq_ignore_ascii_case("content-length") {
                response.raw_header(name, value);
            }
        }

        response
            .raw_header("X-Proxy", PROXY_NAME)
            .raw_header("X-Cached", if self.cached { "yes" } else { "no" });

        let body = self.record.body;
        response
            .status(Status::new(self.status))
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
