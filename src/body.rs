//! Request and response payloads.
//!
//! A [`Body`] holds exactly one underlying representation (text, raw bytes, a
//! typed blob, or structured form data) and converts it to the requested shape
//! on extraction. A body may be read at most once: every extraction first
//! flips the consumed flag, so even a failed conversion uses the body up, and
//! any second read fails with [`FetchError::AlreadyRead`].

use crate::errors::FetchError;
use crate::form::FormData;
use crate::headers::Headers;

/// A typed chunk of bytes; the nearest native analogue of a browser `Blob`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    data: Vec<u8>,
    content_type: Option<String>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: None,
        }
    }

    pub fn with_type(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: Some(content_type.into()),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The payload sources a request or response body can be built from.
///
/// `Params` is serialized to its URL-encoded text form immediately; the
/// distinction from `Text` only matters for content-type inference.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyInit {
    Text(String),
    Bytes(Vec<u8>),
    Blob(Blob),
    Form(FormData),
    Params(FormData),
}

impl BodyInit {
    /// Content type implied by the payload kind, used when the owner's
    /// headers do not name one.
    fn default_content_type(&self) -> Option<String> {
        match self {
            BodyInit::Text(_) => Some("text/plain;charset=UTF-8".to_string()),
            BodyInit::Blob(blob) => blob.content_type().map(str::to_string),
            BodyInit::Params(_) => {
                Some("application/x-www-form-urlencoded;charset=UTF-8".to_string())
            }
            BodyInit::Bytes(_) | BodyInit::Form(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum BodyKind {
    #[default]
    Empty,
    Text(String),
    Bytes(Vec<u8>),
    Blob(Blob),
    Form(FormData),
}

impl BodyKind {
    fn name(&self) -> &'static str {
        match self {
            BodyKind::Empty => "empty",
            BodyKind::Text(_) => "text",
            BodyKind::Bytes(_) => "bytes",
            BodyKind::Blob(_) => "blob",
            BodyKind::Form(_) => "form data",
        }
    }
}

/// Single-read payload container.
#[derive(Debug, PartialEq)]
pub struct Body {
    kind: BodyKind,
    used: bool,
}

/// Build a body from an optional init, setting a default `content-type` on
/// `headers` when the payload implies one and none is present yet.
pub(crate) fn init_body(init: Option<BodyInit>, headers: &mut Headers) -> Result<Body, FetchError> {
    let Some(init) = init else {
        return Ok(Body::empty());
    };
    if !headers.has("content-type") {
        if let Some(content_type) = init.default_content_type() {
            headers.set("content-type", &content_type)?;
        }
    }
    Ok(Body::new(init))
}

impl Body {
    pub fn empty() -> Self {
        Self {
            kind: BodyKind::Empty,
            used: false,
        }
    }

    pub fn new(init: BodyInit) -> Self {
        let kind = match init {
            BodyInit::Text(text) => BodyKind::Text(text),
            BodyInit::Bytes(bytes) => BodyKind::Bytes(bytes),
            BodyInit::Blob(blob) => BodyKind::Blob(blob),
            BodyInit::Form(form) => BodyKind::Form(form),
            BodyInit::Params(params) => BodyKind::Text(params.to_urlencoded()),
        };
        Self { kind, used: false }
    }

    /// Whether the body has been consumed by an extraction or a transfer.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Whether there is no payload at all.
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, BodyKind::Empty)
    }

    /// Independent copy of the payload. Fails once the original is consumed.
    pub fn try_clone(&self) -> Result<Body, FetchError> {
        if self.used {
            return Err(FetchError::AlreadyRead);
        }
        Ok(Body {
            kind: self.kind.clone(),
            used: false,
        })
    }

    /// Move the payload out, marking this body consumed. Taking an empty body
    /// leaves it untouched and yields another empty body.
    pub(crate) fn take(&mut self) -> Result<Body, FetchError> {
        if self.used {
            return Err(FetchError::AlreadyRead);
        }
        if self.is_empty() {
            return Ok(Body::empty());
        }
        self.used = true;
        Ok(Body {
            kind: std::mem::take(&mut self.kind),
            used: false,
        })
    }

    /// Bytes to hand to the transport, without consuming the body. Form data
    /// goes over the wire URL-encoded.
    pub(crate) fn transport_payload(&self) -> Option<Vec<u8>> {
        match &self.kind {
            BodyKind::Empty => None,
            BodyKind::Text(text) => Some(text.clone().into_bytes()),
            BodyKind::Bytes(bytes) => Some(bytes.clone()),
            BodyKind::Blob(blob) => Some(blob.data().to_vec()),
            BodyKind::Form(form) => Some(form.to_urlencoded().into_bytes()),
        }
    }

    fn consume(&mut self) -> Result<BodyKind, FetchError> {
        if self.used {
            return Err(FetchError::AlreadyRead);
        }
        self.used = true;
        Ok(std::mem::take(&mut self.kind))
    }

    /// Read the payload as a typed blob.
    pub async fn blob(&mut self) -> Result<Blob, FetchError> {
        match self.consume()? {
            BodyKind::Blob(blob) => Ok(blob),
            BodyKind::Bytes(bytes) => Ok(Blob::new(bytes)),
            BodyKind::Text(text) => Ok(Blob::new(text.into_bytes())),
            BodyKind::Empty => Ok(Blob::new(Vec::new())),
            kind @ BodyKind::Form(_) => Err(FetchError::UnsupportedConversion {
                stored: kind.name(),
                requested: "blob",
            }),
        }
    }

    /// Read the payload as raw bytes.
    pub async fn bytes(&mut self) -> Result<Vec<u8>, FetchError> {
        match self.consume()? {
            BodyKind::Bytes(bytes) => Ok(bytes),
            BodyKind::Blob(blob) => Ok(blob.into_data()),
            BodyKind::Text(text) => Ok(text.into_bytes()),
            BodyKind::Empty => Ok(Vec::new()),
            kind @ BodyKind::Form(_) => Err(FetchError::UnsupportedConversion {
                stored: kind.name(),
                requested: "bytes",
            }),
        }
    }

    /// Read the payload as text. Raw bytes decode as lossy UTF-8.
    pub async fn text(&mut self) -> Result<String, FetchError> {
        kind_into_text(self.consume()?, "text")
    }

    /// Read the payload as URL-encoded form data.
    pub async fn form_data(&mut self) -> Result<FormData, FetchError> {
        match self.consume()? {
            BodyKind::Form(form) => Ok(form),
            kind => Ok(FormData::parse_urlencoded(&kind_into_text(
                kind,
                "form data",
            )?)),
        }
    }

    /// Read the payload as text and deserialize it as JSON.
    pub async fn json<T: serde::de::DeserializeOwned>(&mut self) -> Result<T, FetchError> {
        let text = self.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn kind_into_text(kind: BodyKind, requested: &'static str) -> Result<String, FetchError> {
    match kind {
        BodyKind::Text(text) => Ok(text),
        BodyKind::Blob(blob) => {
            let data = blob.into_data();
            Ok(String::from_utf8_lossy(&data).into_owned())
        }
        BodyKind::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        BodyKind::Empty => Ok(String::new()),
        kind @ BodyKind::Form(_) => Err(FetchError::UnsupportedConversion {
            stored: kind.name(),
            requested,
        }),
    }
}
