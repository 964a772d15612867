//! libcurl-backed [`HttpEngine`].

use arc_swap::ArcSwapOption;
use std::io::{self, Cursor};
use std::str;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::parse::parse_response_head;
use super::{header_value, Connection, EngineError, HttpEngine, OutgoingRequest};
use crate::config::EngineConfig;

/// Performs each request with a fresh curl easy handle, buffering the body.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
#[derive(Debug)]
pub struct CurlEngine {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: Option<String>,
    cookie: ArcSwapOption<String>,
}

impl CurlEngine {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.timeout(),
            user_agent: cfg.user_agent.clone(),
            cookie: ArcSwapOption::empty(),
        }
    }

    pub fn cookie(&self) -> Option<Arc<String>> {
        self.cookie.load_full()
    }
}

impl Default for CurlEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl HttpEngine for CurlEngine {
    fn connect(
        &self,
        url: &Url,
        customize: &dyn Fn(&mut OutgoingRequest),
    ) -> Result<Connection, EngineError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EngineError::InvalidUrl(url.to_string()));
        }
        let mut request = OutgoingRequest::default();
        if let Some(cookie) = self.cookie.load_full() {
            request.add_header("Cookie", cookie.as_str());
        }
        customize(&mut request);

        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        match request.method.as_str() {
            "GET" => easy.get(true)?,
            "HEAD" => easy.nobody(true)?,
            other => easy.custom_request(other)?,
        }
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }

        // Build curl list for request headers (e.g. "Name: value").
        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !request.headers.is_empty() {
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let head = parse_response_head(&header_lines)?;
        tracing::debug!(url = %url, status = head.status, bytes = body.len(), "engine response");

        let content_type = header_value(&head.fields, "content-type").map(str::to_string);
        let content_encoding = header_value(&head.fields, "content-encoding").map(str::to_string);
        let success = (200..=299).contains(&head.status);
        let (input_stream, error_stream): (Box<dyn io::Read + Send>, _) = if success {
            (Box::new(Cursor::new(body)), None)
        } else if body.is_empty() {
            (Box::new(io::empty()), None)
        } else {
            let error: Box<dyn io::Read + Send> = Box::new(Cursor::new(body));
            (Box::new(io::empty()), Some(error))
        };

        Ok(Connection {
            status: head.status,
            status_message: head.reason,
            content_type,
            content_encoding,
            header_fields: head.fields,
            input_stream,
            error_stream,
        })
    }

    fn update_cookie(&self, cookie: Option<String>) {
        self.cookie.store(cookie.map(Arc::new));
    }
}
