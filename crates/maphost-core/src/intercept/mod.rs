//! Interception pipeline: fetch qualifying responses through the HTTP engine,
//! rewrite their bodies, and hand back a synthesized response.
//!
//! Every failure degrades: an unreachable engine means "not intercepted" and a
//! body that cannot be transformed is delivered byte-for-byte as received.

mod charset;

pub use charset::{charset_for, RewriteError};

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use url::Url;

use crate::engine::{Connection, HeaderFields, HttpEngine, OutgoingRequest};
use crate::page::ThemeProbe;
use crate::rules::{self, RewriteOutcome, RuleEffect, RuleKind};
use crate::session::SessionState;

/// Status message used when the server sent none.
pub const DEFAULT_STATUS_MESSAGE: &str = "N/A";
/// Separator for repeated header values folded into one.
pub const HEADER_VALUE_SEPARATOR: &str = ", ";

/// An outgoing request observed by the browser surface.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub url: Url,
    pub method: String,
    pub headers: Vec<(String, String)>,
}

impl InterceptedRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: "GET".to_string(),
            headers: Vec::new(),
        }
    }
}

/// Response handed back to the browser surface instead of its own fetch.
pub struct SynthesizedResponse {
    /// MIME type only, parameters stripped.
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub status: u32,
    pub status_message: String,
    pub headers: BTreeMap<String, String>,
    pub body: Box<dyn Read + Send>,
}

impl SynthesizedResponse {
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Drains the body stream.
    pub fn read_body(&mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.body.read_to_end(&mut out)?;
        Ok(out)
    }
}

impl fmt::Debug for SynthesizedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesizedResponse")
            .field("content_type", &self.content_type)
            .field("content_encoding", &self.content_encoding)
            .field("status", &self.status)
            .field("status_message", &self.status_message)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

fn is_success(status: u32) -> bool {
    (200..=299).contains(&status)
}

/// `type/subtype` part of a Content-Type value.
pub fn mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Collapses repeated headers into one joined value per name. Names are
/// compared ignoring ASCII case; the first spelling seen is kept.
pub fn fold_headers(fields: HeaderFields) -> BTreeMap<String, String> {
    let mut folded: BTreeMap<String, String> = BTreeMap::new();
    for (name, values) in fields {
        let joined = values.join(HEADER_VALUE_SEPARATOR);
        match folded.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some((_, value)) => {
                value.push_str(HEADER_VALUE_SEPARATOR);
                value.push_str(&joined);
            }
            None => {
                folded.insert(name, joined);
            }
        }
    }
    folded
}

pub struct Interceptor {
    engine: Arc<dyn HttpEngine>,
    session: Arc<SessionState>,
    theme_probe: Option<ThemeProbe>,
}

impl Interceptor {
    pub fn new(engine: Arc<dyn HttpEngine>, session: Arc<SessionState>) -> Self {
        Self {
            engine,
            session,
            theme_probe: None,
        }
    }

    /// Schedules the out-of-band theme probe whenever settings are delivered.
    pub fn with_theme_probe(mut self, probe: ThemeProbe) -> Self {
        self.theme_probe = Some(probe);
        self
    }

    /// Rule for `url` if it is a secure request to the active host.
    pub fn qualifying_rule(&self, url: &Url) -> RuleKind {
        if !url.scheme().eq_ignore_ascii_case("https") {
            return RuleKind::None;
        }
        match url.host_str() {
            Some(host) if self.session.is_active_host(host) => RuleKind::for_path(url.path()),
            _ => RuleKind::None,
        }
    }

    /// Returns `None` when the request should go through the normal network path.
    pub fn intercept(&self, request: &InterceptedRequest) -> Option<SynthesizedResponse> {
        let kind = self.qualifying_rule(&request.url);
        if !kind.intercepts() {
            return None;
        }

        let conn = match self.engine.connect(&request.url, &|out: &mut OutgoingRequest| {
            out.method = request.method.clone();
            for (name, value) in &request.headers {
                out.add_header(name.as_str(), value.as_str());
            }
        }) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "engine failed, not intercepting");
                return None;
            }
        };

        Some(self.synthesize(kind, &request.url, conn))
    }

    fn synthesize(&self, kind: RuleKind, url: &Url, conn: Connection) -> SynthesizedResponse {
        let Connection {
            status,
            status_message,
            content_type,
            content_encoding,
            header_fields,
            input_stream,
            error_stream,
        } = conn;

        let body: Box<dyn Read + Send> = if is_success(status) {
            self.rewrite_body(kind, url, content_encoding.as_deref(), input_stream)
        } else {
            error_stream.unwrap_or_else(|| Box::new(io::empty()))
        };

        SynthesizedResponse {
            content_type: content_type.as_deref().map(mime_type),
            content_encoding,
            status,
            status_message: status_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS_MESSAGE.to_string()),
            headers: fold_headers(header_fields),
            body,
        }
    }

    fn rewrite_body(
        &self,
        kind: RuleKind,
        url: &Url,
        encoding: Option<&str>,
        mut stream: Box<dyn Read + Send>,
    ) -> Box<dyn Read + Send> {
        let mut raw = Vec::new();
        if let Err(e) = stream.read_to_end(&mut raw) {
            tracing::debug!(url = %url, error = %e, "reading body failed, passing stream through");
            return Box::new(Cursor::new(raw).chain(stream));
        }

        let (bytes, outcome) = match transform(kind, encoding, &raw) {
            Ok((Some(bytes), effect)) => {
                self.apply_effect(effect);
                (bytes, "rewritten")
            }
            Ok((None, effect)) => {
                self.apply_effect(effect);
                (raw, "unchanged")
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "rewrite failed, delivering original body");
                (raw, "fallback")
            }
        };
        tracing::debug!(url = %url, rule = ?kind, outcome, "intercepted");
        Box::new(Cursor::new(bytes))
    }

    fn apply_effect(&self, effect: Option<RuleEffect>) {
        match effect {
            Some(RuleEffect::LoginLabel(label)) => self.session.set_pending_login_label(label),
            Some(RuleEffect::MapHandleInstalled) => self.session.install_map_handle(),
            Some(RuleEffect::TileServers(servers)) => match &self.theme_probe {
                Some(probe) => probe.schedule(servers),
                None => tracing::debug!("no theme probe configured"),
            },
            None => {}
        }
    }
}

/// Decodes, rewrites and re-encodes `raw`. `Ok(None)` means the original bytes stand.
fn transform(
    kind: RuleKind,
    encoding: Option<&str>,
    raw: &[u8],
) -> Result<(Option<Vec<u8>>, Option<RuleEffect>), RewriteError> {
    let charset = charset::charset_for(encoding)?;
    let text = charset::decode(charset, raw)?;
    let rewrite = rules::apply(kind, &text);
    match rewrite.outcome {
        RewriteOutcome::Rewritten(out) => Ok((Some(charset::encode(charset, &out)?), rewrite.effect)),
        RewriteOutcome::Unchanged | RewriteOutcome::FallbackRaw => Ok((None, rewrite.effect)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use std::sync::Mutex;

    struct CannedEngine {
        status: u32,
        message: Option<&'static str>,
        content_type: Option<&'static str>,
        encoding: Option<&'static str>,
        body: Vec<u8>,
        seen: Mutex<Vec<OutgoingRequest>>,
    }

    impl CannedEngine {
        fn ok(body: &[u8]) -> Self {
            Self {
                status: 200,
                message: Some("OK"),
                content_type: Some("application/json; charset=utf-8"),
                encoding: None,
                body: body.to_vec(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpEngine for CannedEngine {
        fn connect(
            &self,
            _url: &Url,
            customize: &dyn Fn(&mut OutgoingRequest),
        ) -> Result<Connection, EngineError> {
            let mut req = OutgoingRequest::default();
            customize(&mut req);
            self.seen.lock().unwrap().push(req);
            let mut fields = HeaderFields::new();
            fields.insert(
                "Cache-Control".to_string(),
                vec!["no-cache".to_string(), "private".to_string()],
            );
            let body: Box<dyn Read + Send> = Box::new(Cursor::new(self.body.clone()));
            let (input_stream, error_stream): (Box<dyn Read + Send>, _) =
                if is_success(self.status) {
                    (body, None)
                } else {
                    (Box::new(io::empty()), Some(body))
                };
            Ok(Connection {
                status: self.status,
                status_message: self.message.map(str::to_string),
                content_type: self.content_type.map(str::to_string),
                content_encoding: self.encoding.map(str::to_string),
                header_fields: fields,
                input_stream,
                error_stream,
            })
        }
    }

    fn interceptor(engine: CannedEngine) -> (Interceptor, Arc<SessionState>) {
        let session = Arc::new(SessionState::new("map.example.com"));
        (
            Interceptor::new(Arc::new(engine), Arc::clone(&session)),
            session,
        )
    }

    fn req(url: &str) -> InterceptedRequest {
        InterceptedRequest::get(Url::parse(url).unwrap())
    }

    #[test]
    fn folds_headers_differing_only_in_case() {
        let mut fields = HeaderFields::new();
        fields.insert("Set-Cookie".to_string(), vec!["a=1".to_string()]);
        fields.insert("set-cookie".to_string(), vec!["b=2".to_string(), "c=3".to_string()]);
        fields.insert("ETag".to_string(), vec!["\"v1\"".to_string()]);
        let folded = fold_headers(fields);
        assert_eq!(folded.len(), 2);
        assert_eq!(folded["Set-Cookie"], "a=1, b=2, c=3");
        assert_eq!(folded["ETag"], "\"v1\"");
    }

    #[test]
    fn non_qualifying_requests_pass_through() {
        let (icpt, _) = interceptor(CannedEngine::ok(b"{}"));
        for url in [
            "http://map.example.com/api/settings",
            "https://other.example.com/api/settings",
            "https://map.example.com/index.html",
            "https://map.example.com/",
        ] {
            assert!(icpt.intercept(&req(url)).is_none(), "{url}");
        }
    }

    #[test]
    fn forwards_method_and_headers() {
        let engine = Arc::new(CannedEngine::ok(b"{}"));
        let session = Arc::new(SessionState::new("map.example.com"));
        let icpt = Interceptor::new(engine.clone(), session);
        let mut request = req("https://map.example.com/api/settings");
        request.method = "POST".to_string();
        request.headers.push(("X-Test".to_string(), "1".to_string()));
        icpt.intercept(&request).unwrap();
        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].headers, vec![("X-Test".to_string(), "1".to_string())]);
    }

    #[test]
    fn response_fields_are_normalized() {
        let mut engine = CannedEngine::ok(b"x");
        engine.message = Some("  ");
        let (icpt, _) = interceptor(engine);
        let resp = icpt
            .intercept(&req("https://map.example.com/vendor-01234567.js"))
            .unwrap();
        assert_eq!(resp.status_message, DEFAULT_STATUS_MESSAGE);
        assert_eq!(resp.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            resp.headers.get("Cache-Control").map(String::as_str),
            Some("no-cache, private")
        );
    }

    #[test]
    fn translation_sets_login_label() {
        let body = br#"{"login":"Sign in"}"#;
        let (icpt, session) = interceptor(CannedEngine::ok(body));
        let mut resp = icpt
            .intercept(&req("https://map.example.com/locales/en/translation.json"))
            .unwrap();
        assert_eq!(resp.read_body().unwrap(), body.to_vec());
        assert_eq!(session.pending_login_label().unwrap().as_str(), "Sign in");
    }

    #[test]
    fn vendor_bundle_installs_map_handle() {
        let (icpt, session) =
            interceptor(CannedEngine::ok(b"x,this.callInitHooks(),this._zoomAnimated=1;"));
        let mut resp = icpt
            .intercept(&req("https://map.example.com/vendor-0123abcd.js"))
            .unwrap();
        assert_eq!(
            resp.read_body().unwrap(),
            b"x,(window._hijackedMap=this).callInitHooks(),this._zoomAnimated=1;".to_vec()
        );
        assert!(session.has_map_handle());
    }

    #[test]
    fn undecodable_body_falls_back_to_raw_bytes() {
        let mut body = b"x,this.callInitHooks(),this._zoomAnimated=1;".to_vec();
        body.push(0xff);
        let (icpt, session) = interceptor(CannedEngine::ok(&body));
        let mut resp = icpt
            .intercept(&req("https://map.example.com/vendor-0123abcd.js"))
            .unwrap();
        assert_eq!(resp.read_body().unwrap(), body);
        assert!(!session.has_map_handle());
    }

    #[test]
    fn unknown_charset_falls_back_to_raw_bytes() {
        let mut engine = CannedEngine::ok(br#"{"login":"Sign in"}"#);
        engine.encoding = Some("gzip");
        let (icpt, session) = interceptor(engine);
        let mut resp = icpt
            .intercept(&req("https://map.example.com/locales/de/translation.json"))
            .unwrap();
        assert_eq!(resp.content_encoding.as_deref(), Some("gzip"));
        assert_eq!(resp.read_body().unwrap(), br#"{"login":"Sign in"}"#.to_vec());
        assert!(session.pending_login_label().is_none());
    }

    #[test]
    fn declared_charset_is_preserved() {
        // "é" in windows-1252 is a single byte that is invalid UTF-8.
        let body = b"/*\xe9*/x,this.callInitHooks(),this._zoomAnimated=1;";
        let mut engine = CannedEngine::ok(body);
        engine.encoding = Some("windows-1252");
        let (icpt, _) = interceptor(engine);
        let mut resp = icpt
            .intercept(&req("https://map.example.com/vendor-0123abcd.js"))
            .unwrap();
        let mut expected = b"/*\xe9".to_vec();
        expected.extend_from_slice(b"*/x,(window._hijackedMap=this).callInitHooks(),this._zoomAnimated=1;");
        assert_eq!(resp.read_body().unwrap(), expected);
    }

    #[test]
    fn error_status_uses_error_stream() {
        let mut engine = CannedEngine::ok(b"x,this.callInitHooks(),this._zoomAnimated=1;");
        engine.status = 503;
        engine.message = None;
        let (icpt, session) = interceptor(engine);
        let mut resp = icpt
            .intercept(&req("https://map.example.com/vendor-0123abcd.js"))
            .unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.status_message, "N/A");
        assert_eq!(
            resp.read_body().unwrap(),
            b"x,this.callInitHooks(),this._zoomAnimated=1;".to_vec()
        );
        assert!(!session.has_map_handle());
    }

    #[test]
    fn malformed_settings_never_fail_the_request() {
        let (icpt, _) = interceptor(CannedEngine::ok(b"{not json"));
        let mut resp = icpt
            .intercept(&req("https://map.example.com/api/settings"))
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.read_body().unwrap(), b"{not json".to_vec());
    }

    #[test]
    fn mime_type_strips_parameters() {
        assert_eq!(mime_type("text/html; charset=utf-8"), "text/html");
        assert_eq!(mime_type("application/json"), "application/json");
        assert_eq!(mime_type(" text/plain ;q=1"), "text/plain");
    }
}
