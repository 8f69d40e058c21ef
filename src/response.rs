//! HTTP response model.
//!
//! This struct represents a **fully buffered** response: status code and
//! reason, headers, the resolved URL (after redirects, if the transport
//! follows them), and the body payload.
//!
//! ## Notes
//! - `ok()` is derived from the status: `true` exactly when the status is in
//!   `[200, 300)`.
//! - A network-level failure is represented by the sentinel produced by
//!   [`Response::error`]: status `0`, type [`ResponseType::Error`].
//! - The body follows single-read semantics; see [`Body`](crate::body::Body).

use crate::body::{init_body, Blob, Body, BodyInit};
use crate::errors::FetchError;
use crate::form::FormData;
use crate::headers::{Headers, HeadersInit};

/// Status codes [`Response::redirect`] accepts.
const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Default,
    Error,
}

/// Options recognized when building a [`Response`] directly.
#[derive(Debug, Clone, Default)]
pub struct ResponseInit {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Option<HeadersInit>,
    pub url: Option<String>,
}

/// A received (or directly constructed) HTTP response.
#[derive(Debug)]
pub struct Response {
    status: u16,
    status_text: String,
    headers: Headers,
    url: String,
    body: Body,
    response_type: ResponseType,
}

impl Response {
    /// Build a response from a body payload and options.
    ///
    /// The status defaults to 200 and must lie in `200..=599`; status 0 is
    /// reserved for the [`Response::error`] sentinel.
    pub fn new(body: Option<BodyInit>, init: ResponseInit) -> Result<Self, FetchError> {
        let status = init.status.unwrap_or(200);
        if !(200..=599).contains(&status) {
            return Err(FetchError::InvalidStatus(status));
        }
        let (mut headers, _) = match init.headers {
            Some(headers_init) => headers_init.resolve()?,
            None => (Headers::new(), None),
        };
        let body = init_body(body, &mut headers)?;
        Ok(Self {
            status,
            status_text: init.status_text.unwrap_or_default(),
            headers,
            url: init.url.unwrap_or_default(),
            body,
            response_type: ResponseType::Default,
        })
    }

    /// Response assembled by the fetch layer from a transport completion.
    /// Transport statuses are trusted as-is.
    pub(crate) fn from_transport(
        body: Option<BodyInit>,
        status: u16,
        status_text: String,
        mut headers: Headers,
        url: String,
    ) -> Result<Self, FetchError> {
        let body = init_body(body, &mut headers)?;
        Ok(Self {
            status,
            status_text,
            headers,
            url,
            body,
            response_type: ResponseType::Default,
        })
    }

    /// Sentinel for a network-level failure: status 0, no headers, no body.
    pub fn error() -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            headers: Headers::new(),
            url: String::new(),
            body: Body::empty(),
            response_type: ResponseType::Error,
        }
    }

    /// A redirect response carrying a `Location` header.
    ///
    /// Only 301, 302, 303, 307 and 308 are valid redirect statuses; anything
    /// else fails with [`FetchError::InvalidRedirectStatus`].
    pub fn redirect(url: &str, status: u16) -> Result<Self, FetchError> {
        if !REDIRECT_STATUSES.contains(&status) {
            return Err(FetchError::InvalidRedirectStatus(status));
        }
        let mut headers = Headers::new();
        headers.set("location", url)?;
        Ok(Self {
            status,
            status_text: String::new(),
            headers,
            url: String::new(),
            body: Body::empty(),
            response_type: ResponseType::Default,
        })
    }

    /// Independent copy with deep-copied headers and the same payload.
    /// Fails once the body of this response has been read.
    pub fn try_clone(&self) -> Result<Self, FetchError> {
        Ok(Self {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            url: self.url.clone(),
            body: self.body.try_clone()?,
            response_type: self.response_type,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status lies in the success range `[200, 300)`.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub async fn blob(&mut self) -> Result<Blob, FetchError> {
        self.body.blob().await
    }

    pub async fn bytes(&mut self) -> Result<Vec<u8>, FetchError> {
        self.body.bytes().await
    }

    pub async fn text(&mut self) -> Result<String, FetchError> {
        self.body.text().await
    }

    pub async fn form_data(&mut self) -> Result<FormData, FetchError> {
        self.body.form_data().await
    }

    pub async fn json<T: serde::de::DeserializeOwned>(&mut self) -> Result<T, FetchError> {
        self.body.json().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let response = Response::new(None, ResponseInit::default()).unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.ok());
        assert_eq!(response.status_text(), "");
        assert_eq!(response.url(), "");
        assert_eq!(response.response_type(), ResponseType::Default);
    }

    #[test]
    fn ok_is_derived_from_status_range() {
        for (status, ok) in [(200, true), (204, true), (299, true), (300, false), (404, false), (500, false)] {
            let response = Response::new(
                None,
                ResponseInit {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .unwrap();
            assert_eq!(response.ok(), ok, "status {status}");
        }
    }

    #[test]
    fn out_of_range_status_rejected() {
        for status in [0, 199, 600] {
            assert!(matches!(
                Response::new(
                    None,
                    ResponseInit {
                        status: Some(status),
                        ..Default::default()
                    }
                ),
                Err(FetchError::InvalidStatus(s)) if s == status
            ));
        }
    }

    #[test]
    fn error_sentinel() {
        let response = Response::error();
        assert_eq!(response.status(), 0);
        assert!(!response.ok());
        assert_eq!(response.response_type(), ResponseType::Error);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn redirect_sets_location() {
        let response = Response::redirect("https://example.com/next", 302).unwrap();
        assert_eq!(response.status(), 302);
        assert_eq!(
            response.headers().get("location"),
            Some("https://example.com/next")
        );
    }

    #[test]
    fn redirect_rejects_non_redirect_status() {
        for status in [200, 204, 300, 304, 400] {
            assert!(matches!(
                Response::redirect("https://example.com/", status),
                Err(FetchError::InvalidRedirectStatus(s)) if s == status
            ));
        }
    }

    #[test]
    fn body_sets_default_content_type() {
        let response = Response::new(
            Some(BodyInit::Text("hi".to_string())),
            ResponseInit::default(),
        )
        .unwrap();
        assert_eq!(
            response.headers().get("content-type"),
            Some("text/plain;charset=UTF-8")
        );
    }

    #[tokio::test]
    async fn clone_preserves_status_and_headers() {
        let mut headers = Headers::new();
        headers.set("x-id", "7").unwrap();
        let mut response = Response::new(
            Some(BodyInit::Text("payload".to_string())),
            ResponseInit {
                status: Some(201),
                status_text: Some("Created".to_string()),
                headers: Some(headers.into()),
                url: Some("https://example.com/things/7".to_string()),
            },
        )
        .unwrap();

        let mut copy = response.try_clone().unwrap();
        assert_eq!(copy.status(), 201);
        assert_eq!(copy.status_text(), "Created");
        assert_eq!(copy.headers().get("x-id"), Some("7"));
        assert_eq!(copy.url(), "https://example.com/things/7");
        assert_eq!(response.text().await.unwrap(), "payload");
        assert_eq!(copy.text().await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn clone_after_read_fails() {
        let mut response = Response::new(
            Some(BodyInit::Text("x".to_string())),
            ResponseInit::default(),
        )
        .unwrap();
        response.text().await.unwrap();
        assert!(matches!(
            response.try_clone(),
            Err(FetchError::AlreadyRead)
        ));
    }
}
