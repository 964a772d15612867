//! Out-of-band theme probe scheduled after a settings response is delivered.

use std::sync::Arc;
use tokio::runtime::Handle;

use crate::bridge::HostBridge;
use crate::lifecycle::PageLifecycle;
use crate::rules::{light_status_bar, parse_probe_result, TileServer, THEME_PROBE_SCRIPT};
use crate::session::SessionState;

/// Asks the page which tile server is selected and derives the status bar style.
///
/// Best effort: the result may land after the page was replaced, in which
/// case it is simply stale until the next settings response.
#[derive(Clone)]
pub struct ThemeProbe {
    session: Arc<SessionState>,
    lifecycle: PageLifecycle,
    bridge: Arc<dyn HostBridge>,
    runtime: Handle,
}

impl ThemeProbe {
    pub fn new(
        session: Arc<SessionState>,
        lifecycle: PageLifecycle,
        bridge: Arc<dyn HostBridge>,
        runtime: Handle,
    ) -> Self {
        Self {
            session,
            lifecycle,
            bridge,
            runtime,
        }
    }

    /// Queues the probe for the current page; never blocks the caller.
    pub fn schedule(&self, tile_servers: Vec<TileServer>) {
        let generation = self.lifecycle.generation();
        let probe = self.clone();
        self.runtime.spawn(async move {
            if !probe.lifecycle.until_ready_for(generation).await {
                tracing::debug!(generation, "page replaced before theme probe");
                return;
            }
            let session = Arc::clone(&probe.session);
            probe.bridge.evaluate_script(
                THEME_PROBE_SCRIPT,
                Some(Box::new(move |raw: String| {
                    let selected = parse_probe_result(&raw);
                    let light = light_status_bar(&tile_servers, selected.as_deref());
                    tracing::debug!(selected = ?selected, light, "theme probed");
                    session.set_light_status_bar(light);
                })),
            );
        });
    }
}
