use std::time::SystemTime;

use crate::config::config;
use crate::http::body::{Body, ChunkStream};
use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;

/// Response headers that can be set through the safe wrapper API.
pub enum ResponseHeader {
    ContentLength,
    ContentType,
    Connection,
    Server,
    Date,
    TransferEncoding,
}

pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HttpHeaders,
    pub body: Body,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: HttpStatus::Ok,
            headers: HttpHeaders::new(),
            body: Body::Empty,
        }
    }

    pub fn set_header(&mut self, h: ResponseHeader, value: &str) {
        let name = match h {
            ResponseHeader::ContentType => "Content-Type",
            ResponseHeader::ContentLength => "Content-Length",
            ResponseHeader::Connection => "Connection",
            ResponseHeader::Server => "Server",
            ResponseHeader::Date => "Date",
            ResponseHeader::TransferEncoding => "Transfer-Encoding",
        };

        self.headers.set_raw(name, value);
    }

    /// Sets a buffered body and pins `Content-Length` to its exact length.
    pub fn set_body(&mut self, bytes: Vec<u8>) {
        self.set_header(ResponseHeader::ContentLength, &bytes.len().to_string());
        self.body = Body::Full(bytes);
    }

    /// Sets a lazily produced body. It will be sent with chunked transfer
    /// encoding unless a `Content-Length` header is set explicitly.
    pub fn stream_body(&mut self, chunks: ChunkStream) {
        self.body = Body::Stream(chunks);
    }

    /// True if the body must be sent with chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        self.headers
            .get("Transfer-Encoding")
            .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    }

    /// Finalizes the headers before serialization. Applies the transfer
    /// policy (a `Content-Length` wins over chunking), the connection
    /// disposition, and the standing `Server` and `Date` headers.
    ///
    /// Headers must not change after this point: the head is written before
    /// the first body byte.
    pub fn prepare(&mut self, keep_alive: bool) {
        if self.headers.contains("Content-Length") {
            self.headers.remove("Transfer-Encoding");
        } else if !self.body.is_empty() {
            self.set_header(ResponseHeader::TransferEncoding, "chunked");
        }

        if !keep_alive {
            // The close disposition wins over whatever the handler set.
            self.set_header(ResponseHeader::Connection, "close");
        } else if !self.headers.contains("Connection") {
            self.set_header(ResponseHeader::Connection, "keep-alive");
        }

        if !self.headers.contains("Server") {
            self.set_header(ResponseHeader::Server, &config().server_name);
        }
        if !self.headers.contains("Date") {
            let date = httpdate::fmt_http_date(SystemTime::now());
            self.set_header(ResponseHeader::Date, &date);
        }
    }

    /// Serializes the status line, headers, and terminating blank line.
    ///
    /// HTTP/1.1 <status> <reason>\r\n
    /// <header_name>: <header_value>\r\n
    /// ...
    /// \r\n
    pub fn build_head(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n{}\r\n",
            self.status as u16,
            self.status.reason(),
            self.headers.stringify(),
        )
    }
}
