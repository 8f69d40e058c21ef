//! The fetch operation.
//!
//! Builds a [`Request`], issues exactly one transport call, and wraps the
//! completion into a [`Response`]. Every outcome (success, network failure,
//! timeout, abort) settles one scheduler tick after the transport reports,
//! so callers only ever observe it asynchronously. The one exception is a
//! signal that is already cancelled before the call is issued: that rejects
//! without touching the transport.

use lazy_static::lazy_static;
use tokio_util::sync::CancellationToken;

use crate::body::{Blob, BodyInit};
use crate::capabilities::Capabilities;
use crate::errors::FetchError;
use crate::headers::Headers;
use crate::request::{Credentials, Request, RequestInit};
use crate::response::Response;
use crate::transport::reqwest_transport::ReqwestTransport;
use crate::transport::{Payload, ReadMode, Transport, TransportError, TransportRequest};

lazy_static! {
    static ref SHARED_CLIENT: FetchClient<ReqwestTransport> =
        FetchClient::new(ReqwestTransport::new());
}

/// Fetch `url` over a shared `reqwest`-backed client.
pub async fn fetch(url: &str, init: RequestInit) -> Result<Response, FetchError> {
    SHARED_CLIENT.fetch(url, init).await
}

/// Fetch a prebuilt request over the shared client.
pub async fn fetch_request(request: Request) -> Result<Response, FetchError> {
    SHARED_CLIENT.fetch_request(request).await
}

/// A fetch entry point bound to a transport and a capability configuration.
pub struct FetchClient<T: Transport> {
    transport: T,
    capabilities: Capabilities,
}

impl<T: Transport> FetchClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_capabilities(transport: T, capabilities: Capabilities) -> Self {
        Self {
            transport,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub async fn fetch(&self, url: &str, init: RequestInit) -> Result<Response, FetchError> {
        self.fetch_request(Request::new(url, init)?).await
    }

    pub async fn fetch_request(&self, request: Request) -> Result<Response, FetchError> {
        // pre-flight check, the only synchronous rejection path
        if request.signal().is_some_and(|s| s.is_cancelled()) {
            return Err(FetchError::Aborted);
        }

        let url = self.resolve_url(&request)?;
        let read_mode = self.select_read_mode(&request);

        // a raw header object bypasses the validated store entirely
        let headers: Vec<(String, String)> = match request.raw_headers() {
            Some(raw) => raw.to_vec(),
            None => request
                .headers()
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        };

        let with_credentials = match request.credentials() {
            Credentials::Include => Some(true),
            Credentials::Omit => Some(false),
            Credentials::SameOrigin => None,
        };

        let transport_request = TransportRequest {
            method: request.method().to_string(),
            url,
            headers,
            body: request.body().transport_payload(),
            with_credentials,
            read_mode,
        };

        log::debug!(
            "fetch {} {}",
            transport_request.method,
            transport_request.url
        );

        let cancel = request
            .signal()
            .cloned()
            .unwrap_or_else(CancellationToken::new);

        // racing the token against the call is the abort listener; dropping
        // the unfinished branch on settle is the deregistration
        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Aborted),
            result = self.transport.send(transport_request, cancel.clone()) => result,
        };

        // settle one tick later so the outcome is only observed asynchronously
        tokio::task::yield_now().await;

        let completion = match outcome {
            Ok(completion) => completion,
            Err(TransportError::Aborted) => return Err(FetchError::Aborted),
            Err(e @ (TransportError::Network(_) | TransportError::Timeout)) => {
                log::debug!("transport failure: {e}");
                return Err(FetchError::Network("Network request failed".to_string()));
            }
        };

        let headers = Headers::parse_raw(&completion.raw_headers);
        let resolved_url = completion
            .url
            .or_else(|| headers.get("x-request-url").map(str::to_string))
            .unwrap_or_default();

        let body = match completion.payload {
            Payload::Text(text) => {
                if text.is_empty() {
                    None
                } else {
                    Some(BodyInit::Text(text))
                }
            }
            Payload::Bytes(bytes) => match read_mode {
                ReadMode::Blob => Some(BodyInit::Blob(match headers.get("content-type") {
                    Some(content_type) => Blob::with_type(bytes, content_type),
                    None => Blob::new(bytes),
                })),
                ReadMode::Buffer | ReadMode::Text => Some(BodyInit::Bytes(bytes)),
            },
        };

        Response::from_transport(
            body,
            completion.status,
            completion.status_text,
            headers,
            resolved_url,
        )
    }

    /// Resolve the request URL: an empty URL falls back to the configured
    /// base, a relative one joins onto it. Absolute URLs pass through.
    fn resolve_url(&self, request: &Request) -> Result<String, FetchError> {
        let raw = request.url();
        if raw.is_empty() {
            return match &self.capabilities.base_url {
                Some(base) => Ok(base.to_string()),
                None => Err(FetchError::InvalidUrl(raw.to_string())),
            };
        }
        if url::Url::parse(raw).is_ok() {
            return Ok(raw.to_string());
        }
        match &self.capabilities.base_url {
            Some(base) => Ok(base
                .join(raw)
                .map_err(|_| FetchError::InvalidUrl(raw.to_string()))?
                .to_string()),
            // no base to resolve against; let the transport report it
            None => Ok(raw.to_string()),
        }
    }

    /// Blob when the platform can, raw buffer for octet-stream payloads,
    /// text otherwise.
    fn select_read_mode(&self, request: &Request) -> ReadMode {
        if self.capabilities.blob {
            ReadMode::Blob
        } else if self.capabilities.array_buffer
            && request
                .headers()
                .get("content-type")
                .is_some_and(|ct| ct.contains("application/octet-stream"))
        {
            ReadMode::Buffer
        } else {
            ReadMode::Text
        }
    }
}
