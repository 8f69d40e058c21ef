//! `reqwest`-backed transport.
//!
//! One underlying HTTP call per [`send`](super::Transport::send). The
//! response header map is re-serialized into the raw wire block so the fetch
//! layer parses headers the same way for every transport.

use tokio_util::sync::CancellationToken;

use super::{Payload, ReadMode, Transport, TransportError, TransportRequest, TransportResponse};

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap a preconfigured client (timeouts, proxies, cookie store).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let url = url::Url::parse(&request.url)
            .map_err(|e| TransportError::Network(format!("invalid URL {:?}: {e}", request.url)))?;
        let method = http::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::Network(format!("invalid method {:?}: {e}", request.method)))?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            // invalid raw header names surface as a send error
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(with_credentials) = request.with_credentials {
            // cookie policy is fixed when the reqwest client is built; the
            // flag is honored by transports that manage credentials per call
            log::debug!("with_credentials={with_credentials} requested on {}", request.url);
        }

        let call = async {
            let response = builder.send().await.map_err(map_error)?;
            let status = response.status().as_u16();
            let status_text = response
                .status()
                .canonical_reason()
                .unwrap_or("")
                .to_string();
            let raw_headers = serialize_raw_headers(response.headers());
            let final_url = response.url().to_string();
            let payload = match request.read_mode {
                ReadMode::Text => Payload::Text(response.text().await.map_err(map_error)?),
                ReadMode::Blob | ReadMode::Buffer => {
                    Payload::Bytes(response.bytes().await.map_err(map_error)?.to_vec())
                }
            };
            Ok(TransportResponse {
                status,
                status_text,
                raw_headers,
                url: Some(final_url),
                payload,
            })
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Aborted),
            result = call => result,
        }
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}

/// Render a header map back into CRLF-delimited `Name: value` lines.
fn serialize_raw_headers(map: &http::HeaderMap) -> String {
    let mut out = String::new();
    for (name, value) in map {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(value.to_str().unwrap_or(""));
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_header_serialization_is_line_based() {
        let mut map = http::HeaderMap::new();
        map.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("text/plain"),
        );
        map.append("x-multi", http::HeaderValue::from_static("a"));
        map.append("x-multi", http::HeaderValue::from_static("b"));
        let raw = serialize_raw_headers(&map);
        assert!(raw.contains("content-type: text/plain\r\n"));
        assert!(raw.contains("x-multi: a\r\n"));
        assert!(raw.contains("x-multi: b\r\n"));

        let parsed = crate::headers::Headers::parse_raw(&raw);
        assert_eq!(parsed.get("x-multi"), Some("a, b"));
    }

    #[tokio::test]
    async fn bad_url_is_a_network_error() {
        let transport = ReqwestTransport::new();
        let request = TransportRequest {
            method: "GET".to_string(),
            url: "not a url".to_string(),
            headers: Vec::new(),
            body: None,
            with_credentials: None,
            read_mode: ReadMode::Text,
        };
        let result = transport.send(request, CancellationToken::new()).await;
        assert!(matches!(result, Err(TransportError::Network(_))));
    }
}
