//! In-memory collaborators: an HTTP engine serving canned bodies and a bridge
//! that records what the page was asked to do.

use maphost_core::bridge::{HostBridge, ScriptCallback};
use maphost_core::engine::{Connection, EngineError, HeaderFields, HttpEngine, OutgoingRequest};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Default)]
pub struct FakeEngine {
    bodies: HashMap<String, (u32, Vec<u8>)>,
    pub cookies: Mutex<Vec<Option<String>>>,
    pub requests: Mutex<Vec<(String, OutgoingRequest)>>,
}

impl FakeEngine {
    pub fn serve(mut self, path: &str, status: u32, body: &[u8]) -> Self {
        self.bodies.insert(path.to_string(), (status, body.to_vec()));
        self
    }
}

impl HttpEngine for FakeEngine {
    fn connect(
        &self,
        url: &Url,
        customize: &dyn Fn(&mut OutgoingRequest),
    ) -> Result<Connection, EngineError> {
        let mut req = OutgoingRequest::default();
        customize(&mut req);
        self.requests.lock().unwrap().push((url.to_string(), req));
        let Some((status, body)) = self.bodies.get(url.path()).cloned() else {
            return Err(EngineError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "no route",
            )));
        };
        let mut fields = HeaderFields::new();
        fields.insert("Content-Type".to_string(), vec!["application/json".to_string()]);
        let stream: Box<dyn Read + Send> = Box::new(Cursor::new(body));
        let (input_stream, error_stream): (Box<dyn Read + Send>, _) = if (200..300).contains(&status)
        {
            (stream, None)
        } else {
            (Box::new(io::empty()), Some(stream))
        };
        Ok(Connection {
            status,
            status_message: Some("OK".to_string()),
            content_type: Some("application/json; charset=utf-8".to_string()),
            content_encoding: None,
            header_fields: fields,
            input_stream,
            error_stream,
        })
    }

    fn update_cookie(&self, cookie: Option<String>) {
        self.cookies.lock().unwrap().push(cookie);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    Script(String),
    Load(String),
}

#[derive(Default)]
pub struct RecordingBridge {
    /// JSON value handed to script callbacks.
    pub probe_result: Mutex<String>,
    pub cookie: Option<String>,
    pub calls: Mutex<Vec<BridgeCall>>,
}

impl RecordingBridge {
    pub fn with_probe_result(result: &str) -> Self {
        let bridge = Self::default();
        *bridge.probe_result.lock().unwrap() = result.to_string();
        bridge
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Polls until at least `n` calls were recorded.
    pub async fn wait_for_calls(&self, n: usize) -> Vec<BridgeCall> {
        for _ in 0..200 {
            let calls = self.calls();
            if calls.len() >= n {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {n} bridge calls, got {:?}", self.calls());
    }
}

impl HostBridge for RecordingBridge {
    fn evaluate_script(&self, script: &str, callback: Option<ScriptCallback>) {
        self.calls
            .lock()
            .unwrap()
            .push(BridgeCall::Script(script.to_string()));
        if let Some(callback) = callback {
            let result = self.probe_result.lock().unwrap().clone();
            callback(result);
        }
    }

    fn load_url(&self, url: &str) {
        self.calls.lock().unwrap().push(BridgeCall::Load(url.to_string()));
    }

    fn cookies_for(&self, _url: &str) -> Option<String> {
        self.cookie.clone()
    }
}
