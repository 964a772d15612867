//! Deep-link dispatch: wait for the surface, route, then act through the bridge.

use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

use crate::bridge::HostBridge;
use crate::lifecycle::PageLifecycle;
use crate::router::{DeepLinkRouter, RouteAction};
use crate::session::SessionState;

#[derive(Clone)]
pub struct DeepLinkDispatcher {
    router: DeepLinkRouter,
    session: Arc<SessionState>,
    lifecycle: PageLifecycle,
    bridge: Arc<dyn HostBridge>,
}

impl DeepLinkDispatcher {
    pub fn new(
        session: Arc<SessionState>,
        lifecycle: PageLifecycle,
        bridge: Arc<dyn HostBridge>,
    ) -> Self {
        Self {
            router: DeepLinkRouter::new(Arc::clone(&session)),
            session,
            lifecycle,
            bridge,
        }
    }

    /// Suspends until the surface is ready, then routes and performs `uri`.
    pub async fn dispatch(&self, uri: Url) -> RouteAction {
        self.lifecycle.until_surface_ready().await;
        tracing::debug!(uri = %uri, "handling deep link");
        let action = self.router.route(&uri);
        match &action {
            RouteAction::Ignore => {}
            RouteAction::Navigate(target) => self.bridge.load_url(target.as_str()),
            RouteAction::RunMapCommand(cmd) if self.session.has_map_handle() => {
                self.bridge.evaluate_script(&cmd.script(), None)
            }
            RouteAction::RunMapCommand(_) => {
                tracing::debug!(uri = %uri, "no map handle on this page, navigating instead");
                self.bridge.load_url(uri.as_str());
            }
        }
        action
    }

    /// Processes queued links in arrival order until the sender is dropped.
    pub(crate) async fn run_queue(self, mut rx: mpsc::UnboundedReceiver<Url>) {
        while let Some(uri) = rx.recv().await {
            self.dispatch(uri).await;
        }
    }
}
