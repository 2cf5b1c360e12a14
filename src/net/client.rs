//! Minimal asynchronous HTTP/1.1 client.
//!
//! The request body is streamed: each [`ClientRequest::write`] sends one
//! chunk with chunked transfer encoding, and [`ClientRequest::end`]
//! terminates the body and reads the response from the same connection.
//! The head goes out lazily, before the first body chunk (or at `end` for
//! bodiless requests), so headers can be set until the body starts.

use async_std::io::BufReader;
use async_std::net::TcpStream;
use async_std::prelude::*;
use std::io;

use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;
use crate::net::writer::MessageWriter;

pub struct ClientConnection {
    stream: TcpStream,
    host: String,
}

impl ClientConnection {
    pub async fn connect(host: &str, port: u16) -> io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        Ok(Self {
            stream,
            host: format!("{}:{}", host, port),
        })
    }

    /// Opens a request on this connection.
    pub fn request(self, method: HttpMethod, path: &str) -> ClientRequest {
        let mut headers = HttpHeaders::new();
        headers.set_raw("Host", &self.host);
        ClientRequest {
            writer: MessageWriter::new(self.stream),
            method,
            path: path.to_string(),
            headers,
            head_sent: false,
        }
    }
}

pub struct ClientRequest {
    writer: MessageWriter<TcpStream>,
    method: HttpMethod,
    path: String,
    headers: HttpHeaders,
    head_sent: bool,
}

impl ClientRequest {
    /// Sets a request header. Has no effect once the head has been sent.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if !self.head_sent {
            self.headers.set_raw(name, value);
        }
    }

    async fn send_head(&mut self, with_body: bool) -> io::Result<()> {
        if with_body && !self.headers.contains("Content-Length") {
            self.headers.set_raw("Transfer-Encoding", "chunked");
        }
        let head = format!(
            "{} {} HTTP/1.1\r\n{}\r\n",
            self.method.as_str(),
            self.path,
            self.headers.stringify(),
        );
        let chunked = with_body && !self.headers.contains("Content-Length");
        self.writer.write_head(&head, chunked).await?;
        self.head_sent = true;
        Ok(())
    }

    /// Sends one body chunk. The head is sent first if it has not been yet.
    pub async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if !self.head_sent {
            self.send_head(true).await?;
        }
        self.writer.write_body(data).await
    }

    /// Signals end-of-body and reads the response.
    pub async fn end(mut self) -> io::Result<ClientResponse> {
        if !self.head_sent {
            self.send_head(false).await?;
        }
        self.writer.end().await?;

        let stream = self.writer.into_inner();
        read_response(stream).await
    }
}

pub struct ClientResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub chunks: Vec<Vec<u8>>,
}

impl ClientResponse {
    pub fn body(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// Reads a response: status line, headers, then the body as framed by
/// `Content-Length`, chunked transfer encoding, or connection close.
async fn read_response(stream: TcpStream) -> io::Result<ClientResponse> {
    let mut reader = BufReader::new(stream);

    let status_line = read_line(&mut reader).await?;
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/1.") {
        return Err(bad_response("bad status line"));
    }
    let status = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| bad_response("bad status code"))?;

    let mut headers = HttpHeaders::new();
    loop {
        let line = read_line(&mut reader).await?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| bad_response("bad header line"))?;
        headers.set_raw(name.trim(), value.trim());
    }

    let chunked = headers
        .get("Transfer-Encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));

    let mut chunks = Vec::new();
    if chunked {
        loop {
            let size_line = read_line(&mut reader).await?;
            let size_str = size_line.split(';').next().unwrap_or("").trim();
            let size = usize::from_str_radix(size_str, 16)
                .map_err(|_| bad_response("bad chunk size"))?;
            if size == 0 {
                // trailer section, up to the final empty line
                loop {
                    if read_line(&mut reader).await?.is_empty() {
                        break;
                    }
                }
                break;
            }
            let mut chunk = vec![0; size];
            reader.read_exact(&mut chunk).await?;
            let mut crlf = [0; 2];
            reader.read_exact(&mut crlf).await?;
            if &crlf != b"\r\n" {
                return Err(bad_response("missing chunk terminator"));
            }
            chunks.push(chunk);
        }
    } else if let Some(len) = headers.get("Content-Length") {
        let len = len
            .parse::<usize>()
            .map_err(|_| bad_response("bad content length"))?;
        if len > 0 {
            let mut body = vec![0; len];
            reader.read_exact(&mut body).await?;
            chunks.push(body);
        }
    } else {
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        if !body.is_empty() {
            chunks.push(body);
        }
    }

    Ok(ClientResponse {
        status,
        headers,
        chunks,
    })
}

async fn read_line(reader: &mut BufReader<TcpStream>) -> io::Result<String> {
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line).await?;
    while line.last() == Some(&b'\n') || line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line).map_err(|_| bad_response("non-utf8 line"))
}

fn bad_response(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}
