//! Writable side of an HTTP message: head, then body, then end.
//!
//! Both the server response path and the client request path write through
//! [`MessageWriter`], which enforces the message lifecycle: the head is
//! written exactly once before any body byte, body chunks follow while the
//! message is open, and `end` closes it for good. A closed message accepts
//! no further writes.

use async_std::io::Write;
use async_std::prelude::*;
use std::io;

use crate::http::body::{LAST_CHUNK, encode_chunk};

#[derive(PartialEq, Debug)]
enum WriterState {
    Open,
    HeadWritten,
    Closed,
}

pub struct MessageWriter<W: Write + Unpin> {
    sink: W,
    state: WriterState,
    chunked: bool,
}

impl<W: Write + Unpin> MessageWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriterState::Open,
            chunked: false,
        }
    }

    /// Writes the serialized head (status/request line, headers, blank
    /// line). Must happen exactly once, before any body write.
    pub async fn write_head(&mut self, head: &str, chunked: bool) -> io::Result<()> {
        if self.state != WriterState::Open {
            return Err(closed("head already written"));
        }
        self.sink.write_all(head.as_bytes()).await?;
        self.chunked = chunked;
        self.state = WriterState::HeadWritten;
        Ok(())
    }

    /// Writes one body chunk, framed for chunked transfer encoding when the
    /// head announced it.
    pub async fn write_body(&mut self, data: &[u8]) -> io::Result<()> {
        match self.state {
            WriterState::Open => return Err(closed("head not written yet")),
            WriterState::Closed => return Err(closed("message already ended")),
            WriterState::HeadWritten => {}
        }
        if data.is_empty() {
            return Ok(());
        }
        if self.chunked {
            self.sink.write_all(&encode_chunk(data)).await?;
        } else {
            self.sink.write_all(data).await?;
        }
        Ok(())
    }

    /// Ends the message: emits the terminal chunk marker when the message
    /// is chunked, flushes, and closes the writer. Idempotent.
    pub async fn end(&mut self) -> io::Result<()> {
        if self.state == WriterState::Closed {
            return Ok(());
        }
        if self.state == WriterState::Open {
            return Err(closed("head not written yet"));
        }
        if self.chunked {
            // A chunked body always terminates with the last-chunk marker,
            // even when no chunk was written.
            self.sink.write_all(LAST_CHUNK).await?;
        }
        self.sink.flush().await?;
        self.state = WriterState::Closed;
        Ok(())
    }

    /// Hands the underlying sink back, e.g. to read a response from the same
    /// connection.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

fn closed(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}
