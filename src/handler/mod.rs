mod responses;
mod router;
mod templates;

use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

/// A failure while generating response content. Propagated up the call
/// stack; the request gets no partial response.
#[derive(Debug)]
pub enum HandlerError {
    Render(minijinja::Error),
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::Render(err) => write!(f, "template rendering failed: {}", err),
        }
    }
}

pub fn handle_request(req: &HttpRequest) -> Result<HttpResponse, HandlerError> {
    router::route(req)
}

pub fn handle_error(err: HttpStatus) -> HttpResponse {
    responses::any_error(err)
}
