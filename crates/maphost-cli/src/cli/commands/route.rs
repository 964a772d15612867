//! `maphost route <uri>` – show the deep-link router's decision.

use anyhow::{Context, Result};
use maphost_core::config::MaphostConfig;
use maphost_core::router::{DeepLinkRouter, RouteAction};
use maphost_core::session::SessionState;
use std::sync::Arc;
use url::Url;

pub async fn run_route(cfg: &MaphostConfig, uri: &str, host: Option<String>) -> Result<()> {
    let uri = Url::parse(uri).with_context(|| format!("invalid URI {uri:?}"))?;
    let active = match host {
        Some(h) => h,
        None => cfg.active_host()?,
    };
    let session = Arc::new(SessionState::new(active));
    let router = DeepLinkRouter::new(Arc::clone(&session));

    match router.route(&uri) {
        RouteAction::Ignore => println!("ignore"),
        RouteAction::Navigate(target) => {
            println!("navigate {target} (active host: {})", session.active_hostname())
        }
        RouteAction::RunMapCommand(cmd) => println!("map {}", cmd.script()),
    }
    Ok(())
}
