//! Request descriptor.
//!
//! A [`Request`] is immutable after construction: method, URL, headers,
//! credentials mode, and body are fixed by [`Request::new`] (or by building
//! from an existing request). The body itself still follows the single-read
//! rules of [`Body`](crate::body::Body).

use tokio_util::sync::CancellationToken;

use crate::body::{init_body, Body, BodyInit};
use crate::errors::FetchError;
use crate::headers::{Headers, HeadersInit};

/// Methods that normalize to uppercase. Anything else is sent verbatim.
const NORMALIZED_METHODS: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

/// Uppercase `method` when its uppercased form is a known safe verb,
/// otherwise keep the caller's spelling.
pub fn normalize_method(method: &str) -> String {
    let upper = method.to_ascii_uppercase();
    if NORMALIZED_METHODS.contains(&upper.as_str()) {
        upper
    } else {
        method.to_string()
    }
}

/// How the transport should treat ambient credentials (cookies, auth).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

/// Request mode. Carried on the descriptor for callers that care; the shim
/// itself does not enforce CORS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

/// Cache directive. `NoStore` and `NoCache` trigger cache busting on GET and
/// HEAD requests; the rest are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

/// Options recognized when building a [`Request`].
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Option<String>,
    pub headers: Option<HeadersInit>,
    pub body: Option<BodyInit>,
    pub mode: Option<Mode>,
    pub credentials: Option<Credentials>,
    pub cache: Option<CacheMode>,
    pub signal: Option<CancellationToken>,
    pub referrer: Option<String>,
}

impl RequestInit {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn map(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }

    pub fn method(self, method: impl Into<String>) -> Self {
        self.map(|i| i.method = Some(method.into()))
    }
    pub fn headers(self, headers: impl Into<HeadersInit>) -> Self {
        self.map(|i| i.headers = Some(headers.into()))
    }
    pub fn body(self, body: BodyInit) -> Self {
        self.map(|i| i.body = Some(body))
    }
    pub fn mode(self, mode: Mode) -> Self {
        self.map(|i| i.mode = Some(mode))
    }
    pub fn credentials(self, credentials: Credentials) -> Self {
        self.map(|i| i.credentials = Some(credentials))
    }
    pub fn cache(self, cache: CacheMode) -> Self {
        self.map(|i| i.cache = Some(cache))
    }
    pub fn signal(self, signal: CancellationToken) -> Self {
        self.map(|i| i.signal = Some(signal))
    }
    pub fn referrer(self, referrer: impl Into<String>) -> Self {
        self.map(|i| i.referrer = Some(referrer.into()))
    }
}

/// An outgoing request: method, URL, headers, credentials mode, and body.
#[derive(Debug)]
pub struct Request {
    url: String,
    method: String,
    headers: Headers,
    raw_headers: Option<Vec<(String, String)>>,
    body: Body,
    mode: Option<Mode>,
    credentials: Credentials,
    signal: Option<CancellationToken>,
    referrer: Option<String>,
}

impl Request {
    /// Build a request for `url` with the given options.
    ///
    /// Fails when a body is supplied for a GET or HEAD request, when a header
    /// name in a validated init is malformed, or (via
    /// [`from_request`](Request::from_request)) when the source body was
    /// already read.
    pub fn new(url: impl Into<String>, init: RequestInit) -> Result<Self, FetchError> {
        let mut url = url.into();
        let method = normalize_method(init.method.as_deref().unwrap_or("GET"));
        let (mut headers, raw_headers) = match init.headers {
            Some(headers_init) => headers_init.resolve()?,
            None => (Headers::new(), None),
        };

        let is_get_or_head = method == "GET" || method == "HEAD";
        if is_get_or_head && init.body.is_some() {
            return Err(FetchError::BodyNotAllowed);
        }
        let body = init_body(init.body, &mut headers)?;

        if is_get_or_head && matches!(init.cache, Some(CacheMode::NoStore | CacheMode::NoCache)) {
            url = apply_cache_bust(&url, unix_millis());
        }

        Ok(Self {
            url,
            method,
            headers,
            raw_headers,
            body,
            mode: init.mode,
            credentials: init.credentials.unwrap_or_default(),
            signal: init.signal,
            referrer: init.referrer,
        })
    }

    /// Build a request from an existing one, with `init` overriding
    /// individual options. When `init` carries no body, the source's body is
    /// transferred and the source is marked consumed.
    pub fn from_request(source: &mut Request, init: RequestInit) -> Result<Self, FetchError> {
        if source.body.is_used() {
            return Err(FetchError::AlreadyRead);
        }

        let method = normalize_method(init.method.as_deref().unwrap_or(&source.method));
        let (mut headers, raw_headers) = match init.headers {
            Some(headers_init) => headers_init.resolve()?,
            None => (source.headers.clone(), source.raw_headers.clone()),
        };

        let is_get_or_head = method == "GET" || method == "HEAD";
        let body = match init.body {
            Some(body_init) => {
                if is_get_or_head {
                    return Err(FetchError::BodyNotAllowed);
                }
                init_body(Some(body_init), &mut headers)?
            }
            None => {
                if is_get_or_head && !source.body.is_empty() {
                    return Err(FetchError::BodyNotAllowed);
                }
                source.body.take()?
            }
        };

        let mut url = source.url.clone();
        if is_get_or_head && matches!(init.cache, Some(CacheMode::NoStore | CacheMode::NoCache)) {
            url = apply_cache_bust(&url, unix_millis());
        }

        Ok(Self {
            url,
            method,
            headers,
            raw_headers,
            body,
            mode: init.mode.or(source.mode),
            credentials: init.credentials.unwrap_or(source.credentials),
            signal: init.signal.or_else(|| source.signal.clone()),
            referrer: init.referrer.or_else(|| source.referrer.clone()),
        })
    }

    /// Independent copy sharing the same payload. Fails once the body of this
    /// request has been read.
    pub fn try_clone(&self) -> Result<Self, FetchError> {
        Ok(Self {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            raw_headers: self.raw_headers.clone(),
            body: self.body.try_clone()?,
            mode: self.mode,
            credentials: self.credentials,
            signal: self.signal.clone(),
            referrer: self.referrer.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Unvalidated header pairs supplied through [`HeadersInit::Raw`], if any.
    pub fn raw_headers(&self) -> Option<&[(String, String)]> {
        self.raw_headers.as_deref()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
    }

    pub fn signal(&self) -> Option<&CancellationToken> {
        self.signal.as_ref()
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub async fn blob(&mut self) -> Result<crate::body::Blob, FetchError> {
        self.body.blob().await
    }

    pub async fn bytes(&mut self) -> Result<Vec<u8>, FetchError> {
        self.body.bytes().await
    }

    pub async fn text(&mut self) -> Result<String, FetchError> {
        self.body.text().await
    }

    pub async fn form_data(&mut self) -> Result<crate::form::FormData, FetchError> {
        self.body.form_data().await
    }

    pub async fn json<T: serde::de::DeserializeOwned>(&mut self) -> Result<T, FetchError> {
        self.body.json().await
    }
}

fn unix_millis() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// Append a `_=<timestamp>` query parameter, or replace an existing `_`
/// parameter, leaving any fragment in place.
fn apply_cache_bust(url: &str, timestamp: i128) -> String {
    let bust = format!("_={timestamp}");
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };

    let rebuilt = match base.split_once('?') {
        Some((path, query)) => {
            let mut replaced = false;
            let mut params: Vec<&str> = Vec::new();
            for param in query.split('&') {
                if param == "_" || param.starts_with("_=") {
                    params.push(&bust);
                    replaced = true;
                } else {
                    params.push(param);
                }
            }
            if !replaced {
                params.push(&bust);
            }
            format!("{path}?{}", params.join("&"))
        }
        None => format!("{base}?{bust}"),
    };

    match fragment {
        Some(fragment) => format!("{rebuilt}#{fragment}"),
        None => rebuilt,
    }
}
