#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid character in header field name: {0:?}")]
    InvalidHeaderName(String),

    #[error("Body not allowed for GET or HEAD requests")]
    BodyNotAllowed,

    #[error("Already read")]
    AlreadyRead,

    #[error("Could not read {stored} body as {requested}")]
    UnsupportedConversion {
        stored: &'static str,
        requested: &'static str,
    },

    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("Invalid redirect status code: {0}")]
    InvalidRedirectStatus(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Aborted")]
    Aborted,

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0:?}")]
    InvalidUrl(String),
}
