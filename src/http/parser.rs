use crate::config::config;
use crate::http::request::HttpRequest;
use crate::http::status::HttpStatus;
use crate::http::*;

// Upper bound on buffered request-line + header bytes.
const HEAD_BUF_CAP: usize = 16 * 1024;

// A chunk-size line is a hex number plus optional extensions.
const CHUNK_SIZE_LINE_CAP: usize = 128;

#[derive(PartialEq, Debug)]
pub enum ParseOutcome {
    /// More data is needed to make progress.
    Incomplete,
    /// Request line and headers are fully parsed; the body (if any) follows.
    HeadersDone,
    /// The request is fully parsed.
    Done,
}

#[derive(PartialEq, Debug)]
pub enum ParseError {
    // 400
    BadRequest,
    // 413
    PayloadTooLarge,
    // 414
    UriTooLong,
    // 505
    VersionNotSupported,
}

impl ParseError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ParseError::BadRequest => HttpStatus::BadRequest,
            ParseError::PayloadTooLarge => HttpStatus::PayloadTooLarge,
            ParseError::UriTooLong => HttpStatus::UriTooLong,
            ParseError::VersionNotSupported => HttpStatus::HttpVersionNotSupported,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ParserState {
    RequestLine,
    Headers,
    FixedBody { remaining: usize },
    ChunkSize,
    ChunkData { remaining: usize },
    ChunkDataEnd,
    Trailer,
    Done,
}

/// Incremental HTTP/1.1 request parser.
///
/// Fed arbitrary byte slices as they arrive from the transport; progresses
/// through request line, headers, and body. Bodies are delivered to the
/// request as an ordered sequence of chunks: one per wire chunk for chunked
/// transfer encoding, one per feed for fixed-length bodies.
pub struct RequestParser {
    buf: Vec<u8>,
    state: ParserState,
    current_chunk: Vec<u8>,
    body_len: usize,
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            state: ParserState::RequestLine,
            current_chunk: Vec::new(),
            body_len: 0,
        }
    }

    /// Feeds newly read bytes and parses as far as the data allows.
    ///
    /// Returns [`ParseOutcome::HeadersDone`] exactly once, when the header
    /// section completes, so the caller can validate the request before the
    /// body is consumed. Call again (an empty slice is fine) to continue.
    pub fn feed(
        &mut self,
        data: &[u8],
        req: &mut HttpRequest,
    ) -> Result<ParseOutcome, ParseError> {
        if self.state == ParserState::RequestLine || self.state == ParserState::Headers {
            if self.buf.len() + data.len() > HEAD_BUF_CAP {
                return Err(ParseError::BadRequest);
            }
        }
        self.buf.extend_from_slice(data);

        loop {
            match self.state {
                ParserState::RequestLine => {
                    if !self.parse_request_line(req)? {
                        return Ok(ParseOutcome::Incomplete);
                    }
                }
                ParserState::Headers => {
                    if !self.parse_headers(req)? {
                        return Ok(ParseOutcome::Incomplete);
                    }
                    self.state = self.body_state(req)?;
                    return Ok(ParseOutcome::HeadersDone);
                }
                ParserState::FixedBody { remaining } => {
                    if self.buf.is_empty() {
                        return Ok(ParseOutcome::Incomplete);
                    }
                    let take = std::cmp::min(self.buf.len(), remaining);
                    req.chunks.push(self.buf.drain(..take).collect());
                    if take == remaining {
                        self.state = ParserState::Done;
                    } else {
                        self.state = ParserState::FixedBody {
                            remaining: remaining - take,
                        };
                        return Ok(ParseOutcome::Incomplete);
                    }
                }
                ParserState::ChunkSize => {
                    if !self.parse_chunk_size()? {
                        return Ok(ParseOutcome::Incomplete);
                    }
                }
                ParserState::ChunkData { remaining } => {
                    let take = std::cmp::min(self.buf.len(), remaining);
                    self.current_chunk.extend(self.buf.drain(..take));
                    if take == remaining {
                        self.state = ParserState::ChunkDataEnd;
                    } else {
                        self.state = ParserState::ChunkData {
                            remaining: remaining - take,
                        };
                        return Ok(ParseOutcome::Incomplete);
                    }
                }
                ParserState::ChunkDataEnd => {
                    if self.buf.len() < 2 {
                        return Ok(ParseOutcome::Incomplete);
                    }
                    if self.buf[..2] != *b"\r\n" {
                        return Err(ParseError::BadRequest);
                    }
                    self.buf.drain(..2);
                    req.chunks.push(std::mem::take(&mut self.current_chunk));
                    self.state = ParserState::ChunkSize;
                }
                ParserState::Trailer => {
                    let line_end = match find_crlf(&self.buf) {
                        Some(i) => i,
                        None => return Ok(ParseOutcome::Incomplete),
                    };
                    // Trailer fields are consumed and discarded; an empty
                    // line ends the message.
                    let done = line_end == 0;
                    self.buf.drain(..line_end + 2);
                    if done {
                        self.state = ParserState::Done;
                    }
                }
                ParserState::Done => return Ok(ParseOutcome::Done),
            }
        }
    }

    /// Bytes fed but not consumed by this request, i.e. the start of the
    /// next pipelined request on the same connection.
    pub fn into_remaining(self) -> Vec<u8> {
        self.buf
    }

    /// Decides how the body is framed once all headers are known.
    fn body_state(&mut self, req: &HttpRequest) -> Result<ParserState, ParseError> {
        if req.is_chunked() {
            return Ok(ParserState::ChunkSize);
        }
        match req.header("Content-Length") {
            None => Ok(ParserState::Done),
            Some(v) => {
                let n = v.parse::<usize>().map_err(|_| ParseError::BadRequest)?;
                if n > config().max_body_size {
                    return Err(ParseError::PayloadTooLarge);
                }
                if n == 0 {
                    Ok(ParserState::Done)
                } else {
                    Ok(ParserState::FixedBody { remaining: n })
                }
            }
        }
    }

    // Request line: METHOD PATH HTTP/VERSION
    fn parse_request_line(&mut self, req: &mut HttpRequest) -> Result<bool, ParseError> {
        let line_end = match find_crlf(&self.buf) {
            Some(i) => i,
            None => return Ok(false),
        };

        let line = &self.buf[..line_end];
        let parts: Vec<&[u8]> = line.split(|&b| b == b' ').collect();
        if parts.len() != 3 {
            return Err(ParseError::BadRequest);
        }

        let method = std::str::from_utf8(parts[0]).unwrap_or("").to_uppercase();
        let method = match http_method_from_str(&method) {
            HttpMethod::Unknown => return Err(ParseError::BadRequest),
            m => m,
        };

        let path = std::str::from_utf8(parts[1]).unwrap_or("");
        if path.is_empty() {
            return Err(ParseError::BadRequest);
        }
        if path.len() > config().max_path_size {
            return Err(ParseError::UriTooLong);
        }

        let version = std::str::from_utf8(parts[2]).unwrap_or("");
        let (maj, min) = version
            .strip_prefix("HTTP/")
            .and_then(|v| v.split_once('.'))
            .and_then(|(maj, min)| Some((maj.parse::<u8>().ok()?, min.parse::<u8>().ok()?)))
            .ok_or(ParseError::BadRequest)?;
        if maj != 1 || (min != 0 && min != 1) {
            return Err(ParseError::VersionNotSupported);
        }

        req.method = method;
        req.path = path.to_string();
        req.http_version = (maj, min);

        self.buf.drain(..line_end + 2);
        self.state = ParserState::Headers;
        Ok(true)
    }

    // Headers end at \r\n\r\n. All headers are kept on the request.
    fn parse_headers(&mut self, req: &mut HttpRequest) -> Result<bool, ParseError> {
        // No headers at all: the empty line follows the request line
        // directly.
        if self.buf.starts_with(b"\r\n") {
            self.buf.drain(..2);
            return Ok(true);
        }

        let headers_end = match find_crlf_crlf(&self.buf) {
            Some(i) => i,
            None => return Ok(false),
        };

        if headers_end > config().max_header_size {
            return Err(ParseError::BadRequest);
        }

        let headers = &self.buf[..headers_end];
        for line in headers.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let mut it = line.splitn(2, |&b| b == b':');
            let name = it.next().unwrap_or(b"");
            let value = match it.next() {
                Some(v) => v,
                None => return Err(ParseError::BadRequest),
            };

            let name = std::str::from_utf8(name)
                .map_err(|_| ParseError::BadRequest)?
                .trim();
            let value = std::str::from_utf8(value)
                .map_err(|_| ParseError::BadRequest)?
                .trim();
            if name.is_empty() {
                return Err(ParseError::BadRequest);
            }
            req.headers.set_raw(name, value);
        }

        self.buf.drain(..headers_end + 4);
        Ok(true)
    }

    // Chunk size line: hex size, optional ";ext" extensions, \r\n.
    fn parse_chunk_size(&mut self) -> Result<bool, ParseError> {
        let line_end = match find_crlf(&self.buf) {
            Some(i) => i,
            None => {
                if self.buf.len() > CHUNK_SIZE_LINE_CAP {
                    return Err(ParseError::BadRequest);
                }
                return Ok(false);
            }
        };

        let line = std::str::from_utf8(&self.buf[..line_end])
            .map_err(|_| ParseError::BadRequest)?;
        let size_str = line.split(';').next().unwrap_or("").trim();
        let size =
            usize::from_str_radix(size_str, 16).map_err(|_| ParseError::BadRequest)?;

        self.buf.drain(..line_end + 2);

        if size == 0 {
            self.state = ParserState::Trailer;
            return Ok(true);
        }

        self.body_len += size;
        if self.body_len > config().max_body_size {
            return Err(ParseError::PayloadTooLarge);
        }

        self.current_chunk = Vec::with_capacity(size);
        self.state = ParserState::ChunkData { remaining: size };
        Ok(true)
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn find_crlf_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(raw: &[u8]) -> Result<HttpRequest, ParseError> {
        let mut parser = RequestParser::new();
        let mut req = HttpRequest::new();
        let mut outcome = parser.feed(raw, &mut req)?;
        loop {
            match outcome {
                ParseOutcome::Done => return Ok(req),
                ParseOutcome::HeadersDone => outcome = parser.feed(&[], &mut req)?,
                ParseOutcome::Incomplete => panic!("request truncated"),
            }
        }
    }

    #[test]
    fn parses_simple_get() {
        let req = feed_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "/hello");
        assert_eq!(req.http_version, (1, 1));
        assert_eq!(req.header("host"), Some("localhost"));
        assert!(req.chunks.is_empty());
    }

    #[test]
    fn parses_across_split_feeds() {
        let mut parser = RequestParser::new();
        let mut req = HttpRequest::new();

        assert_eq!(
            parser.feed(b"GET / HT", &mut req).unwrap(),
            ParseOutcome::Incomplete
        );
        assert_eq!(
            parser.feed(b"TP/1.1\r\nHost: a\r\n", &mut req).unwrap(),
            ParseOutcome::Incomplete
        );
        assert_eq!(
            parser.feed(b"\r\n", &mut req).unwrap(),
            ParseOutcome::HeadersDone
        );
        assert_eq!(parser.feed(&[], &mut req).unwrap(), ParseOutcome::Done);
        assert_eq!(req.path, "/");
    }

    #[test]
    fn parses_fixed_length_body() {
        let req =
            feed_all(b"POST /upload HTTP/1.1\r\nContent-Length: 9\r\n\r\ndatadataa").unwrap();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body(), b"datadataa");
    }

    #[test]
    fn fixed_length_body_split_across_feeds() {
        let mut parser = RequestParser::new();
        let mut req = HttpRequest::new();

        let outcome = parser
            .feed(b"POST / HTTP/1.1\r\nContent-Length: 8\r\n\r\n", &mut req)
            .unwrap();
        assert_eq!(outcome, ParseOutcome::HeadersDone);

        assert_eq!(parser.feed(b"data", &mut req).unwrap(), ParseOutcome::Incomplete);
        assert_eq!(parser.feed(b"data", &mut req).unwrap(), ParseOutcome::Done);
        assert_eq!(req.chunks.len(), 2);
        assert_eq!(req.body(), b"datadata");
    }

    #[test]
    fn chunked_body_preserves_all_chunks_in_order() {
        // Ten chunks of increasing length: "data", "dataa", ... "dataaaaaaaaaa".
        let mut raw =
            b"POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
        let mut sent = Vec::new();
        for i in 0..10 {
            let chunk = format!("data{}", "a".repeat(i)).into_bytes();
            raw.extend_from_slice(&crate::http::body::encode_chunk(&chunk));
            sent.push(chunk);
        }
        raw.extend_from_slice(crate::http::body::LAST_CHUNK);

        let req = feed_all(&raw).unwrap();
        assert_eq!(req.chunks, sent);
    }

    #[test]
    fn chunked_body_split_mid_chunk() {
        let mut parser = RequestParser::new();
        let mut req = HttpRequest::new();

        let outcome = parser
            .feed(
                b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n",
                &mut req,
            )
            .unwrap();
        assert_eq!(outcome, ParseOutcome::HeadersDone);

        assert_eq!(parser.feed(b"5\r\nda", &mut req).unwrap(), ParseOutcome::Incomplete);
        assert_eq!(parser.feed(b"taa\r\n", &mut req).unwrap(), ParseOutcome::Incomplete);
        assert_eq!(
            parser.feed(b"0\r\n\r\n", &mut req).unwrap(),
            ParseOutcome::Done
        );
        assert_eq!(req.chunks, vec![b"dataa".to_vec()]);
    }

    #[test]
    fn parses_request_without_headers() {
        let req = feed_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "/");
        assert_eq!(req.headers.len(), 0);
    }

    #[test]
    fn keeps_pipelined_bytes_for_the_next_request() {
        let mut parser = RequestParser::new();
        let mut req = HttpRequest::new();

        let raw = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nGET /hello HTTP/1.1\r\n";
        assert_eq!(
            parser.feed(raw, &mut req).unwrap(),
            ParseOutcome::HeadersDone
        );
        assert_eq!(parser.feed(&[], &mut req).unwrap(), ParseOutcome::Done);
        assert_eq!(parser.into_remaining(), b"GET /hello HTTP/1.1\r\n");
    }

    #[test]
    fn rejects_unknown_method() {
        let err = feed_all(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::BadRequest);
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = feed_all(b"GET / HTTP/2.0\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::VersionNotSupported);
        assert_eq!(
            ParseError::VersionNotSupported.into_http_status(),
            HttpStatus::HttpVersionNotSupported
        );
    }

    #[test]
    fn rejects_oversized_uri() {
        let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "x".repeat(2048));
        let err = feed_all(raw.as_bytes()).unwrap_err();
        assert_eq!(err, ParseError::UriTooLong);
    }

    #[test]
    fn rejects_oversized_content_length() {
        let raw = format!(
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            usize::MAX
        );
        let err = feed_all(raw.as_bytes()).unwrap_err();
        assert_eq!(err, ParseError::PayloadTooLarge);
    }

    #[test]
    fn rejects_malformed_header_line() {
        let err = feed_all(b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::BadRequest);
    }

    #[test]
    fn rejects_bad_chunk_size() {
        let err = feed_all(
            b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\ndata\r\n0\r\n\r\n",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::BadRequest);
    }
}
