//! Page host: the event surface an embedding browser drives.
//!
//! Owns the shared session, lifecycle gate, engine and bridge, and wires the
//! interception pipeline and the deep-link dispatcher to them.

mod deep_link;
mod theme;

pub use deep_link::DeepLinkDispatcher;
pub use theme::ThemeProbe;

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use url::Url;

use crate::bridge::HostBridge;
use crate::config::MaphostConfig;
use crate::console::{self, ConsoleLevel};
use crate::engine::HttpEngine;
use crate::export::{self, ExportError, SettingsExport};
use crate::intercept::{InterceptedRequest, Interceptor, SynthesizedResponse};
use crate::lifecycle::PageLifecycle;
use crate::login;
use crate::navigation::{self, NavigationDecision};
use crate::session::SessionState;

pub struct PageHost {
    session: Arc<SessionState>,
    lifecycle: PageLifecycle,
    engine: Arc<dyn HttpEngine>,
    bridge: Arc<dyn HostBridge>,
    interceptor: Interceptor,
    dispatcher: DeepLinkDispatcher,
    deep_links: mpsc::UnboundedSender<Url>,
    supported_hosts: Vec<String>,
}

impl PageHost {
    /// Builds the host and starts its deep-link queue on `runtime`.
    pub fn new(
        active_host: impl Into<String>,
        supported_hosts: Vec<String>,
        engine: Arc<dyn HttpEngine>,
        bridge: Arc<dyn HostBridge>,
        runtime: Handle,
    ) -> Self {
        let session = Arc::new(SessionState::new(active_host));
        let lifecycle = PageLifecycle::new();
        let probe = ThemeProbe::new(
            Arc::clone(&session),
            lifecycle.clone(),
            Arc::clone(&bridge),
            runtime.clone(),
        );
        let interceptor =
            Interceptor::new(Arc::clone(&engine), Arc::clone(&session)).with_theme_probe(probe);
        let dispatcher =
            DeepLinkDispatcher::new(Arc::clone(&session), lifecycle.clone(), Arc::clone(&bridge));

        let (deep_links, rx) = mpsc::unbounded_channel();
        runtime.spawn(dispatcher.clone().run_queue(rx));

        Self {
            session,
            lifecycle,
            engine,
            bridge,
            interceptor,
            dispatcher,
            deep_links,
            supported_hosts: supported_hosts
                .into_iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(
        cfg: &MaphostConfig,
        engine: Arc<dyn HttpEngine>,
        bridge: Arc<dyn HostBridge>,
        runtime: Handle,
    ) -> anyhow::Result<Self> {
        Ok(Self::new(
            cfg.active_host()?,
            cfg.supported_hosts.clone(),
            engine,
            bridge,
            runtime,
        ))
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn lifecycle(&self) -> &PageLifecycle {
        &self.lifecycle
    }

    /// The surface exists; queued deep links and probes may run.
    pub fn mark_ready(&self) {
        self.lifecycle.mark_ready();
    }

    /// The surface is gone; pending page work is abandoned and deep links wait again.
    pub fn on_surface_destroyed(&self) {
        self.lifecycle.mark_torn_down();
    }

    pub fn on_page_started(&self, url: &Url) {
        self.session.reset_for_new_page();
        let generation = self.lifecycle.begin_page();
        tracing::debug!(url = %url, generation, "page started");
    }

    /// Refreshes the engine cookie when the active host finished loading.
    pub fn on_page_finished(&self, url: &Url) -> bool {
        if !url.host_str().is_some_and(|h| self.session.is_active_host(h)) {
            return false;
        }
        self.engine.update_cookie(self.bridge.cookies_for(url.as_str()));
        true
    }

    /// On the login page, follows the link whose text is the pending login label.
    pub fn on_history_updated(&self, url: &Url) -> Option<String> {
        if !login::is_login_path(url) {
            return None;
        }
        let label = self.session.pending_login_label()?;
        let script = login::follow_link_script(&label);
        self.bridge.evaluate_script(&script, None);
        Some(script)
    }

    pub fn on_console_message(&self, level: ConsoleLevel, source: &str, line: u32, message: &str) {
        console::forward(level, source, line, message);
    }

    /// A download the page started; only settings exports as `data:` URLs are supported.
    pub fn on_download(&self, url: &str, disposition: &str) -> Result<SettingsExport, ExportError> {
        export::decode_data_url(url, disposition)
    }

    pub fn should_override_url_loading(&self, url: &Url) -> NavigationDecision {
        navigation::decide(url, &self.session.active_hostname(), &self.supported_hosts)
    }

    pub fn intercept(&self, request: &InterceptedRequest) -> Option<SynthesizedResponse> {
        self.interceptor.intercept(request)
    }

    /// Queues an OS-supplied deep link; it runs once the surface is ready.
    pub fn handle_uri(&self, uri: Url) {
        if self.deep_links.send(uri).is_err() {
            tracing::warn!("deep-link queue closed");
        }
    }

    /// For callers that need to await the outcome of a deep link.
    pub fn dispatcher(&self) -> &DeepLinkDispatcher {
        &self.dispatcher
    }
}
