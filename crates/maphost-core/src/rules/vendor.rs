//! `/vendor-<hash>.js`: expose the map engine instance as `window._hijackedMap`.

use regex::Regex;
use std::sync::OnceLock;

use super::{Rewrite, RewriteOutcome, RuleEffect};

pub const MAP_INIT_HOOK: &str = ",this.callInitHooks(),this._zoomAnimated=";
pub const MAP_INIT_HIJACK: &str = ",(window._hijackedMap=this).callInitHooks(),this._zoomAnimated=";

fn vendor_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/vendor-[0-9a-f]{8}\.js$").expect("vendor path regex"))
}

pub fn is_vendor_bundle_path(path: &str) -> bool {
    vendor_path().is_match(path)
}

/// Rewrites the first map constructor hook; `None` if the bundle has none.
pub fn hijack_map(body: &str) -> Option<String> {
    body.contains(MAP_INIT_HOOK)
        .then(|| body.replacen(MAP_INIT_HOOK, MAP_INIT_HIJACK, 1))
}

pub(super) fn rewrite_vendor_bundle(body: &str) -> Rewrite {
    match hijack_map(body) {
        Some(text) => Rewrite {
            outcome: RewriteOutcome::Rewritten(text),
            effect: Some(RuleEffect::MapHandleInstalled),
        },
        None => {
            tracing::debug!("vendor bundle has no map init hook");
            Rewrite::unchanged()
        }
    }
}
