//! HTTP engine: fetches the real response for an intercepted request.
//!
//! The pipeline only depends on [`HttpEngine`]; [`CurlEngine`] is the libcurl
//! implementation used by the CLI. Embedders with their own authenticated
//! client implement the trait directly.

mod libcurl;
mod parse;

pub use libcurl::CurlEngine;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use url::Url;

/// Response headers as received, one entry per name with every value in order.
pub type HeaderFields = BTreeMap<String, Vec<String>>;

/// Request as the engine will send it; handed to the caller's customizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: String,
    pub headers: Vec<(String, String)>,
}

impl Default for OutgoingRequest {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: Vec::new(),
        }
    }
}

impl OutgoingRequest {
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }
}

/// An opened connection: status line, headers and the body streams.
pub struct Connection {
    pub status: u32,
    pub status_message: Option<String>,
    /// Raw `Content-Type` value, parameters included.
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub header_fields: HeaderFields,
    /// Body for 2xx responses.
    pub input_stream: Box<dyn Read + Send>,
    /// Body for non-2xx responses, if the server sent one.
    pub error_stream: Option<Box<dyn Read + Send>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("status", &self.status)
            .field("status_message", &self.status_message)
            .field("content_type", &self.content_type)
            .field("content_encoding", &self.content_encoding)
            .field("header_fields", &self.header_fields)
            .field("error_stream", &self.error_stream.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unsupported URL {0}")]
    InvalidUrl(String),
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Authenticated HTTP client collaborator.
pub trait HttpEngine: Send + Sync {
    /// Opens `url`. The engine prepares its default request (GET, session
    /// cookie) and lets `customize` adjust it before sending.
    fn connect(
        &self,
        url: &Url,
        customize: &dyn Fn(&mut OutgoingRequest),
    ) -> Result<Connection, EngineError>;

    /// Replaces the session cookie sent with later requests.
    fn update_cookie(&self, _cookie: Option<String>) {}
}

/// Case-insensitive lookup of the first value for `name`.
pub fn header_value<'a>(fields: &'a HeaderFields, name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}
