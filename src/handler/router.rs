use crate::config::config;
use crate::handler::HandlerError;
use crate::handler::responses;
use crate::handler::templates;
use crate::http::HttpMethod;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

pub fn route(req: &HttpRequest) -> Result<HttpResponse, HandlerError> {
    // HEAD routes like GET; the server write path suppresses the body.
    match (&req.method, req.path.as_str()) {
        (HttpMethod::Get | HttpMethod::Head, "/") => {
            templates::render_index(&config().template_root, "Subbu")
        }

        (HttpMethod::Get | HttpMethod::Head, "/hello") => Ok(responses::hello()),
        (HttpMethod::Post, "/upload") => Ok(responses::echo_upload(req)),

        (HttpMethod::Get | HttpMethod::Head | HttpMethod::Post, _) => {
            Ok(responses::not_found())
        }
        _ => Ok(responses::any_error(HttpStatus::MethodNotAllowed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body::Body;
    use crate::http::http_method_from_str;

    fn request(method: &str, path: &str) -> HttpRequest {
        let mut req = HttpRequest::new();
        req.method = http_method_from_str(method);
        req.path = path.to_string();
        req.http_version = (1, 1);
        req
    }

    fn body_bytes(res: HttpResponse) -> Vec<u8> {
        match res.body {
            Body::Empty => Vec::new(),
            Body::Full(bytes) => bytes,
            Body::Stream(chunks) => chunks.flatten().collect(),
        }
    }

    #[test]
    fn root_renders_the_template() {
        let res = route(&request("GET", "/")).unwrap();

        assert_eq!(res.status, HttpStatus::Ok);
        assert_eq!(res.headers.get("Content-Type"), Some("text/html"));
        let body = body_bytes(res);
        assert!(String::from_utf8(body).unwrap().contains("Subbu"));
    }

    #[test]
    fn root_content_length_matches_body() {
        let res = route(&request("GET", "/")).unwrap();
        let declared: usize = res.headers.get("Content-Length").unwrap().parse().unwrap();
        assert_eq!(declared, body_bytes(res).len());
    }

    #[test]
    fn hello_returns_the_exact_fragment() {
        let res = route(&request("GET", "/hello")).unwrap();

        assert_eq!(res.status, HttpStatus::Ok);
        assert_eq!(
            res.headers.get("Content-Type"),
            Some("text/plain; charset=UTF-8")
        );
        assert_eq!(body_bytes(res), b"<p>Hello world</p>");
    }

    #[test]
    fn upload_echoes_received_chunks() {
        let mut req = request("POST", "/upload");
        req.chunks.push(b"data".to_vec());
        req.chunks.push(b"dataa".to_vec());

        let res = route(&req).unwrap();
        assert_eq!(res.status, HttpStatus::Ok);
        assert_eq!(body_bytes(res), b"datadataa");
    }

    #[test]
    fn head_routes_like_get() {
        let get = route(&request("GET", "/hello")).unwrap();
        let head = route(&request("HEAD", "/hello")).unwrap();

        assert_eq!(head.status, HttpStatus::Ok);
        assert_eq!(head.build_head(), get.build_head());
    }

    #[test]
    fn unknown_path_is_not_found() {
        let res = route(&request("GET", "/missing")).unwrap();
        assert_eq!(res.status, HttpStatus::NotFound);
    }

    #[test]
    fn unsupported_method_is_rejected() {
        let res = route(&request("DELETE", "/")).unwrap();
        assert_eq!(res.status, HttpStatus::MethodNotAllowed);
    }

    #[test]
    fn routing_is_idempotent() {
        let first = route(&request("GET", "/")).unwrap();
        let second = route(&request("GET", "/")).unwrap();

        assert_eq!(first.build_head(), second.build_head());
        assert_eq!(body_bytes(first), body_bytes(second));
    }
}
