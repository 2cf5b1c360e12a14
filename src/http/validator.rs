use crate::config::config;
use crate::http::HttpMethod;
use crate::http::HttpVersion;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;

pub enum ValidatorError {
    Error,
    HttpVersionNotSupported,
    PayloadTooLarge,
    MalformedHeaderField,
    MissingContentLength,
    BodyNotAllowed,
}

impl ValidatorError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ValidatorError::Error => HttpStatus::BadRequest,
            ValidatorError::HttpVersionNotSupported => HttpStatus::HttpVersionNotSupported,
            ValidatorError::PayloadTooLarge => HttpStatus::PayloadTooLarge,
            ValidatorError::MalformedHeaderField => HttpStatus::BadRequest,
            ValidatorError::BodyNotAllowed => HttpStatus::BadRequest,
            ValidatorError::MissingContentLength => HttpStatus::LengthRequired,
        }
    }
}

pub struct Validator;

impl Validator {
    fn validate_http_version(v: (u8, u8)) -> Result<(), ValidatorError> {
        match HttpVersion::is_valid(v) {
            Ok(http_v) => {
                if http_v <= config().http_version {
                    Ok(())
                } else {
                    Err(ValidatorError::HttpVersionNotSupported)
                }
            }
            Err(_) => Err(ValidatorError::Error),
        }
    }

    /// A request body must be announced through `Content-Length` or chunked
    /// transfer encoding by the methods that carry one, and absent from the
    /// methods that do not.
    fn validate_http_method(
        content_length: Option<usize>,
        chunked: bool,
        method: &HttpMethod,
    ) -> Result<(), ValidatorError> {
        match method {
            HttpMethod::Get | HttpMethod::Head => {
                if chunked {
                    return Err(ValidatorError::BodyNotAllowed);
                }
                match content_length {
                    Some(n) if n > 0 => Err(ValidatorError::BodyNotAllowed),
                    _ => Ok(()),
                }
            }

            HttpMethod::Post | HttpMethod::Put => {
                if chunked {
                    return Ok(());
                }
                match content_length {
                    None => Err(ValidatorError::MissingContentLength),
                    Some(_) => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Validates a request once all headers are known, before the body is
    /// consumed.
    pub fn validate_request(req: &HttpRequest) -> Result<(), ValidatorError> {
        Self::validate_http_version(req.http_version)?;

        let content_length = req
            .header("Content-Length")
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|_| ValidatorError::MalformedHeaderField)?;

        Self::validate_http_method(content_length, req.is_chunked(), &req.method)?;

        if content_length.is_some() && content_length > Some(config().max_body_size) {
            return Err(ValidatorError::PayloadTooLarge);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::http_method_from_str;

    fn request(method: &str, headers: &[(&str, &str)]) -> HttpRequest {
        let mut req = HttpRequest::new();
        req.method = http_method_from_str(method);
        req.path = "/".to_string();
        req.http_version = (1, 1);
        for &(name, value) in headers {
            req.headers.set_raw(name, value);
        }
        req
    }

    #[test]
    fn accepts_plain_get() {
        let req = request("GET", &[("Host", "localhost")]);
        assert!(Validator::validate_request(&req).is_ok());
    }

    #[test]
    fn rejects_get_with_body() {
        let req = request("GET", &[("Content-Length", "4")]);
        assert!(matches!(
            Validator::validate_request(&req),
            Err(ValidatorError::BodyNotAllowed)
        ));
    }

    #[test]
    fn post_requires_announced_body() {
        let req = request("POST", &[]);
        assert!(matches!(
            Validator::validate_request(&req),
            Err(ValidatorError::MissingContentLength)
        ));
    }

    #[test]
    fn accepts_chunked_post() {
        let req = request("POST", &[("Transfer-Encoding", "chunked")]);
        assert!(Validator::validate_request(&req).is_ok());
    }

    #[test]
    fn rejects_malformed_content_length() {
        let req = request("POST", &[("Content-Length", "four")]);
        assert!(matches!(
            Validator::validate_request(&req),
            Err(ValidatorError::MalformedHeaderField)
        ));
    }

    #[test]
    fn rejects_future_http_version() {
        let mut req = request("GET", &[]);
        req.http_version = (2, 0);
        assert!(matches!(
            Validator::validate_request(&req),
            Err(ValidatorError::HttpVersionNotSupported)
        ));
    }
}
