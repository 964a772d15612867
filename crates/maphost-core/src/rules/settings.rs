//! `/api/settings`: drop seasonal map effects and collect tile servers for the theme probe.

use serde_json::Value;

use super::{Rewrite, RewriteOutcome, RuleEffect};

/// Reads the tile server name the page has persisted as the current selection.
pub const THEME_PROBE_SCRIPT: &str =
    "JSON.parse(localStorage.getItem('local-state')).state.settings.tileServers";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileServer {
    pub name: Option<String>,
    pub style: Option<String>,
}

impl TileServer {
    fn from_json(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: field("name"),
            style: field("style"),
        }
    }
}

pub(super) fn rewrite_settings(body: &str) -> Rewrite {
    let mut config: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "settings payload is not valid JSON");
            return Rewrite::unchanged();
        }
    };

    let tile_servers: Vec<TileServer> = match config.get("tileServers").and_then(Value::as_array) {
        Some(servers) => servers.iter().map(TileServer::from_json).collect(),
        None => {
            tracing::warn!("settings payload has no tileServers array");
            return Rewrite::unchanged();
        }
    };
    let effect = Some(RuleEffect::TileServers(tile_servers));

    let Some(map) = config.get_mut("map").and_then(Value::as_object_mut) else {
        tracing::warn!("settings payload has no map object");
        return Rewrite {
            outcome: RewriteOutcome::Unchanged,
            effect,
        };
    };

    let has_effects = map
        .get("holidayEffects")
        .and_then(Value::as_array)
        .is_some_and(|effects| !effects.is_empty());
    if !has_effects {
        return Rewrite {
            outcome: RewriteOutcome::Unchanged,
            effect,
        };
    }

    map.insert("holidayEffects".to_string(), Value::Array(Vec::new()));
    let outcome = match serde_json::to_string(&config) {
        Ok(text) => RewriteOutcome::Rewritten(text),
        Err(e) => {
            tracing::warn!(error = %e, "re-serializing settings failed");
            RewriteOutcome::Unchanged
        }
    };
    Rewrite { outcome, effect }
}

/// Decodes the probe's JSON result into the selected tile server name.
pub fn parse_probe_result(raw: &str) -> Option<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(name)) => Some(name),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "theme probe returned non-JSON");
            None
        }
    }
}

/// Light status bar unless the selected server (last match wins) is styled dark.
pub fn light_status_bar(tile_servers: &[TileServer], selected: Option<&str>) -> bool {
    let Some(selected) = selected else {
        return true;
    };
    tile_servers
        .iter()
        .rev()
        .find(|server| server.name.as_deref() == Some(selected))
        .map_or(true, |server| server.style.as_deref() != Some("dark"))
}
