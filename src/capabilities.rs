//! Capability configuration.
//!
//! Rather than probing the host environment at run time, the supported
//! payload shapes are an explicit struct handed to the fetch client,
//! defaulting to "best available".

/// What the surrounding platform supports, plus the base URL used to resolve
/// empty or relative request URLs.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Read response payloads as typed blobs. Takes precedence over
    /// `array_buffer` when selecting the read mode.
    pub blob: bool,
    /// Read octet-stream responses as raw byte buffers.
    pub array_buffer: bool,
    /// Base for empty and relative request URLs. With no base, such URLs are
    /// passed to the transport untouched.
    pub base_url: Option<url::Url>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::best_available()
    }
}

impl Capabilities {
    /// Everything enabled, no base URL.
    pub fn best_available() -> Self {
        Self {
            blob: true,
            array_buffer: true,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base: url::Url) -> Self {
        self.base_url = Some(base);
        self
    }
}
