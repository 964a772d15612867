//! Deep-link router: a URI from the OS either reloads the surface or flies
//! the live map to a position.

mod fly_to;

pub use fly_to::FlyToCommand;

use std::sync::Arc;
use url::Url;

use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq)]
pub enum RouteAction {
    Ignore,
    Navigate(Url),
    RunMapCommand(FlyToCommand),
}

#[derive(Debug, Clone)]
pub struct DeepLinkRouter {
    session: Arc<SessionState>,
}

impl DeepLinkRouter {
    pub fn new(session: Arc<SessionState>) -> Self {
        Self { session }
    }

    /// Classifies `uri` against the active host. A different host becomes the
    /// active one and always gets a full navigation.
    pub fn route(&self, uri: &Url) -> RouteAction {
        let Some(host) = uri.host_str() else {
            return RouteAction::Ignore;
        };
        if !self.session.is_active_host(host) {
            tracing::debug!(from = %self.session.active_hostname(), to = host, "switching host");
            self.session.set_active_hostname(host);
            return RouteAction::Navigate(uri.clone());
        }
        let path = uri.path();
        if path.is_empty() || path == "/" {
            return RouteAction::Ignore;
        }
        match FlyToCommand::parse(path) {
            Some(cmd) => RouteAction::RunMapCommand(cmd),
            None => RouteAction::Navigate(uri.clone()),
        }
    }
}
