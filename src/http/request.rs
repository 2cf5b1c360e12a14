use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;

/// An inbound HTTP request.
///
/// The body is kept as an ordered sequence of byte chunks, exactly as it
/// arrived: one element per wire chunk for chunked transfer encoding, one
/// element per transport read for fixed-length bodies.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub http_version: (u8, u8),

    pub headers: HttpHeaders,
    pub chunks: Vec<Vec<u8>>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self {
            method: HttpMethod::Unknown,
            path: String::new(),
            http_version: (0, 0),
            headers: HttpHeaders::new(),
            chunks: Vec::new(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Total number of body bytes received so far.
    pub fn body_len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    /// The body as one contiguous buffer.
    pub fn body(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    pub fn is_chunked(&self) -> bool {
        self.header("Transfer-Encoding")
            .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    }

    /// True if the client asked for the connection to be closed after this
    /// request.
    pub fn wants_close(&self) -> bool {
        self.header("Connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_concatenates_chunks_in_order() {
        let mut req = HttpRequest::new();
        req.chunks.push(b"data".to_vec());
        req.chunks.push(b"dataa".to_vec());

        assert_eq!(req.body_len(), 9);
        assert_eq!(req.body(), b"datadataa");
    }

    #[test]
    fn connection_close_detection() {
        let mut req = HttpRequest::new();
        assert!(!req.wants_close());

        req.headers.set_raw("Connection", "Close");
        assert!(req.wants_close());
    }
}
