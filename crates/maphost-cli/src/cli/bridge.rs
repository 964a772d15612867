//! Stand-in page bridge for terminal use: there is no live page, so scripts
//! and navigations are only logged.

use maphost_core::bridge::{HostBridge, ScriptCallback};

pub struct LogBridge;

impl HostBridge for LogBridge {
    fn evaluate_script(&self, script: &str, callback: Option<ScriptCallback>) {
        tracing::info!(script, "page script (no live page)");
        if let Some(callback) = callback {
            callback("null".to_string());
        }
    }

    fn load_url(&self, url: &str) {
        tracing::info!(url, "page navigation (no live page)");
    }
}
