//! Transport seam.
//!
//! The fetch layer issues exactly one [`Transport::send`] per invocation and
//! never retries. A transport accepts a flat request record and reports back
//! status, status text, the raw header block in wire format, the resolved URL
//! if it knows one, and the payload read according to the requested
//! [`ReadMode`]. Cancellation is cooperative through the passed token.

pub mod reqwest_transport;

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// How the transport should materialize the response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Bytes, wrapped as a typed blob by the fetch layer.
    Blob,
    /// Bytes, surfaced as a raw buffer.
    Buffer,
    /// Decoded text.
    #[default]
    Text,
}

/// Flat request record handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: String,
    pub url: String,
    /// Header pairs exactly as they should hit the wire.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// `Some(true)` to include ambient credentials, `Some(false)` to omit
    /// them, `None` for the transport's same-origin default.
    pub with_credentials: Option<bool>,
    pub read_mode: ReadMode,
}

/// Response payload in the shape the read mode asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

/// Completion record reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// Raw header block: CRLF or LF delimited `Name: value` lines,
    /// continuation lines permitted.
    pub raw_headers: String,
    /// Resolved URL, when the transport tracks redirects.
    pub url: Option<String>,
    pub payload: Payload,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request aborted")]
    Aborted,
}

/// A lower-level primitive issuing one network call per `send`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}
