//! Core HTTP server implementation.
//!
//! This module implements the low-level HTTP server runtime.
//! It is responsible only for networking concerns such as:
//! - accepting TCP connections,
//! - reading raw bytes from the network,
//! - writing raw bytes back to the client.
//!
//! Higher-level HTTP semantics—such as request parsing, validation,
//! and response generation—are intentionally delegated to other modules
//! in the `http` and `handler` namespaces.
//!
//! The server is fully asynchronous and leverages the `async-std` crate
//! to provide non-blocking I/O and concurrent client handling.
//!
//! ## Request handling flow
//!
//! The typical lifecycle of a client connection is as follows:
//!
//! 1. Accept a TCP connection
//! 2. Read raw data from the stream
//! 3. Incrementally parse the data into an [`HttpRequest`]
//!    (delegated to [`http::parser::RequestParser`](crate::http::parser::RequestParser))
//! 4. Validate the request
//!    (delegated to [`http::validator::Validator`](crate::http::validator::Validator))
//! 5. Generate an [`HttpResponse`]
//!    (delegated to [`handler::handle_request`](crate::handler::handle_request))
//! 6. Serialize and write the response back to the client
//!
//! The connection is then reused for the next request unless the client
//! asked for it to be closed. Malformed requests get an error response and
//! a closed connection; a handler failure is propagated and drops the
//! connection without a partial response.

use crate::config::config;
use crate::handler;
use crate::http::body::Body;
use crate::http::parser::{ParseError, ParseOutcome, RequestParser};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::validator::{Validator, ValidatorError};
use crate::http::HttpMethod;
use crate::net::writer::MessageWriter;
use async_std::io::Write;
use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task;

pub struct Server;

/// Errors that can occur while reading and parsing an HTTP request from the
/// stream, used to interrupt the flow and return appropriate responses.
enum ReadError {
    Io(std::io::Error),
    ConnectionClosed,
    Parser(ParseError),
    Validator(ValidatorError),
}

impl Server {
    /// Starts the HTTP server by binding to the configured address and port.
    ///
    /// This method runs indefinitely, accepting incoming TCP connections and
    /// spawning a new asynchronous task for each client.
    pub async fn run() -> std::io::Result<()> {
        let listener = TcpListener::bind((config().address, config().port)).await?;
        println!("Waiting on {}", config().port);
        Self::serve(listener).await
    }

    /// Accept loop over an already bound listener.
    pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
        while let Ok((stream, _addr)) = listener.accept().await {
            task::spawn(Self::handle_client(stream));
        }

        Ok(())
    }

    /// Reads and incrementally parses an HTTP request from the TCP stream.
    ///
    /// The request is parsed as data becomes available. Once all headers are
    /// read, the request is validated. If a body is expected, it is read
    /// until completion.
    ///
    /// Returns a fully constructed [`HttpRequest`] or a [`ReadError`] in
    /// case of I/O, parsing, or validation failure.
    /// `carry` holds bytes read past the end of the previous request on
    /// this connection (pipelined or coalesced requests); leftovers from
    /// this request are stored back into it.
    async fn read_request(
        stream: &mut TcpStream,
        carry: &mut Vec<u8>,
    ) -> Result<HttpRequest, ReadError> {
        let mut parser = RequestParser::new();
        let mut req = HttpRequest::new();
        let mut buffer = vec![0; config().buffer_size];

        let pending = std::mem::take(carry);
        let mut outcome = parser.feed(&pending, &mut req).map_err(ReadError::Parser)?;

        loop {
            match outcome {
                ParseOutcome::Done => {
                    *carry = parser.into_remaining();
                    return Ok(req);
                }
                ParseOutcome::HeadersDone => {
                    // All headers have been parsed. Validate the request
                    // early, before reading the body.
                    Validator::validate_request(&req).map_err(ReadError::Validator)?;
                    outcome = parser.feed(&[], &mut req).map_err(ReadError::Parser)?;
                }
                ParseOutcome::Incomplete => {
                    let n = match stream.read(&mut buffer).await {
                        Ok(0) => return Err(ReadError::ConnectionClosed),
                        Ok(n) => n,
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(ReadError::Io(e)),
                    };
                    outcome = parser
                        .feed(&buffer[..n], &mut req)
                        .map_err(ReadError::Parser)?;
                }
            }
        }
    }

    /// Writes the given [`HttpResponse`] to the sink. The head goes out
    /// before any body byte; a streamed body is consumed until exhaustion.
    /// With `head_only` set (HEAD requests) the body is suppressed while the
    /// headers stay untouched.
    async fn write_response<W: Write + Unpin>(
        sink: W,
        response: HttpResponse,
        head_only: bool,
    ) -> std::io::Result<()> {
        let chunked = !head_only && response.is_chunked();
        let mut writer = MessageWriter::new(sink);
        writer.write_head(&response.build_head(), chunked).await?;

        if !head_only {
            match response.body {
                Body::Empty => {}
                Body::Full(bytes) => writer.write_body(&bytes).await?,
                Body::Stream(chunks) => {
                    for chunk in chunks {
                        writer.write_body(&chunk).await?;
                    }
                }
            }
        }

        writer.end().await
    }

    /// Handles a single client connection: requests are read and answered in
    /// sequence until the client asks for the connection to be closed, the
    /// connection drops, or an error occurs.
    async fn handle_client(mut stream: TcpStream) -> std::io::Result<()> {
        let mut carry = Vec::new();
        loop {
            let (mut response, keep_alive, head_only) =
                match Self::read_request(&mut stream, &mut carry).await {
                    Ok(req) => {
                        let keep_alive = !req.wants_close();
                        let head_only = req.method == HttpMethod::Head;
                        match handler::handle_request(&req) {
                            Ok(res) => (res, keep_alive, head_only),
                            Err(err) => {
                                // Content-generation failure: no partial
                                // response, no error page. Drop the connection.
                                eprintln!("request handling failed: {}", err);
                                return Ok(());
                            }
                        }
                    }
                    Err(ReadError::Io(err)) => {
                        eprintln!("I/O error while reading request: {:?}", err);
                        return Ok(());
                    }
                    Err(ReadError::ConnectionClosed) => return Ok(()),
                    Err(ReadError::Parser(err)) => {
                        (handler::handle_error(err.into_http_status()), false, false)
                    }
                    Err(ReadError::Validator(err)) => {
                        (handler::handle_error(err.into_http_status()), false, false)
                    }
                };

            response.prepare(keep_alive);
            Self::write_response(&mut stream, response, head_only).await?;

            if !keep_alive {
                return Ok(());
            }
        }
    }
}
