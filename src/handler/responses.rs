use crate::http::request::HttpRequest;
use crate::http::response::{HttpResponse, ResponseHeader};
use crate::http::status::HttpStatus;

pub fn hello() -> HttpResponse {
    let mut res = HttpResponse::new();
    res.status = HttpStatus::Ok;
    res.set_header(ResponseHeader::Connection, "keep-alive");
    res.set_header(ResponseHeader::ContentType, "text/plain; charset=UTF-8");
    res.set_body(b"<p>Hello world</p>".to_vec());
    res
}

/// Streams the uploaded chunks back to the sender, one response chunk per
/// received chunk.
pub fn echo_upload(req: &HttpRequest) -> HttpResponse {
    let mut res = HttpResponse::new();
    res.status = HttpStatus::Ok;
    res.set_header(ResponseHeader::ContentType, "application/octet-stream");
    res.stream_body(Box::new(req.chunks.clone().into_iter()));
    res
}

pub fn not_found() -> HttpResponse {
    let mut res = HttpResponse::new();
    res.status = HttpStatus::NotFound;
    res.set_header(ResponseHeader::ContentType, "text/html");
    res.set_body(b"<h1>404 Not Found</h1>".to_vec());
    res
}

pub fn any_error(err: HttpStatus) -> HttpResponse {
    if err == HttpStatus::NotFound {
        return not_found();
    }
    let mut res = HttpResponse::new();
    res.status = err;
    res.set_header(ResponseHeader::ContentLength, "0");
    res
}
