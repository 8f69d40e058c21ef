pub mod body;
pub mod capabilities;
pub mod errors;
pub mod fetch;
pub mod form;
pub mod headers;
pub mod request;
pub mod response;
pub mod transport;

pub use body::{Blob, Body, BodyInit};
pub use capabilities::Capabilities;
pub use errors::FetchError;
pub use fetch::{fetch, fetch_request, FetchClient};
pub use form::FormData;
pub use headers::{Headers, HeadersInit};
pub use request::{CacheMode, Credentials, Mode, Request, RequestInit};
pub use response::{Response, ResponseInit, ResponseType};
pub use transport::reqwest_transport::ReqwestTransport;
pub use transport::{Payload, ReadMode, Transport, TransportError, TransportRequest, TransportResponse};

// the abort signal type, re-exported for callers
pub use tokio_util::sync::CancellationToken;
