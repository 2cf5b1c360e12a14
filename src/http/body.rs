//! Message body representation and chunked-transfer framing.
//!
//! A body is either absent, fully buffered, or a lazy, finite,
//! non-restartable sequence of byte chunks. Streamed bodies are consumed
//! by the writer until exhaustion and sent with chunked transfer encoding
//! unless a `Content-Length` was set.

/// Lazy sequence of body chunks. Consumed exactly once by the writer.
pub type ChunkStream = Box<dyn Iterator<Item = Vec<u8>> + Send>;

pub enum Body {
    Empty,
    Full(Vec<u8>),
    Stream(ChunkStream),
}

impl Body {
    /// Byte length, known only for buffered bodies.
    pub fn len(&self) -> Option<usize> {
        match self {
            Body::Empty => Some(0),
            Body::Full(bytes) => Some(bytes.len()),
            Body::Stream(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

/// Terminal marker of a chunked body: zero-length chunk, empty trailer.
pub const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

/// Frame a single chunk: `<hex size>\r\n<data>\r\n`.
pub fn encode_chunk(data: &[u8]) -> Vec<u8> {
    let mut framed = format!("{:x}\r\n", data.len()).into_bytes();
    framed.extend_from_slice(data);
    framed.extend_from_slice(b"\r\n");
    framed
}
