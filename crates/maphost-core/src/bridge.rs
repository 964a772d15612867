//! Host page bridge: the embedding surface's script and navigation entry points.

/// Receives the JSON-encoded result of an evaluated script.
pub type ScriptCallback = Box<dyn FnOnce(String) + Send + 'static>;

pub trait HostBridge: Send + Sync {
    /// Runs `script` in the live page. No ordering is guaranteed relative to
    /// other evaluations.
    fn evaluate_script(&self, script: &str, callback: Option<ScriptCallback>);

    /// Starts a full navigation of the surface.
    fn load_url(&self, url: &str);

    /// Cookie header the surface holds for `url`, if it exposes one.
    fn cookies_for(&self, _url: &str) -> Option<String> {
        None
    }
}
