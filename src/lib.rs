//! A tiny asynchronous HTTP/1.1 server and client.

pub mod config;
pub mod handler;
pub mod http;
pub mod net;
