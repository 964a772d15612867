//! Path-triggered rewrite rules for intercepted response bodies.
//!
//! A request path selects at most one [`RuleKind`]; the rule itself is a pure
//! function of the decoded body. Anything a rule learns about the page is
//! returned as a [`RuleEffect`] and applied by the caller once the response
//! is actually delivered.

mod settings;
mod translation;
mod vendor;

pub use settings::{light_status_bar, parse_probe_result, TileServer, THEME_PROBE_SCRIPT};
pub use translation::extract_login_label;
pub use vendor::{hijack_map, is_vendor_bundle_path, MAP_INIT_HIJACK, MAP_INIT_HOOK};

pub const SETTINGS_PATH: &str = "/api/settings";

/// Which rule (if any) applies to a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Settings,
    Translation,
    VendorBundle,
    None,
}

impl RuleKind {
    /// Selects the rule for `path`. Precedence: settings, translation, vendor bundle.
    pub fn for_path(path: &str) -> RuleKind {
        if path == SETTINGS_PATH {
            RuleKind::Settings
        } else if path.starts_with("/locales/") && path.ends_with("/translation.json") {
            RuleKind::Translation
        } else if is_vendor_bundle_path(path) {
            RuleKind::VendorBundle
        } else {
            RuleKind::None
        }
    }

    pub fn intercepts(self) -> bool {
        self != RuleKind::None
    }

    fn rule(self) -> Option<RuleFn> {
        match self {
            RuleKind::Settings => Some(settings::rewrite_settings as RuleFn),
            RuleKind::Translation => Some(translation::rewrite_translation as RuleFn),
            RuleKind::VendorBundle => Some(vendor::rewrite_vendor_bundle as RuleFn),
            RuleKind::None => None,
        }
    }
}

type RuleFn = fn(&str) -> Rewrite;

/// What happened to a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten(String),
    Unchanged,
    /// The body could not be transformed; the original bytes are delivered verbatim.
    FallbackRaw,
}

/// Page knowledge extracted while rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEffect {
    /// Text of the login link on the current locale (translation rule).
    LoginLabel(String),
    /// Tile servers offered by the settings document, in document order.
    TileServers(Vec<TileServer>),
    /// The vendor bundle now exposes `window._hijackedMap`.
    MapHandleInstalled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub outcome: RewriteOutcome,
    pub effect: Option<RuleEffect>,
}

impl Rewrite {
    pub fn unchanged() -> Self {
        Self {
            outcome: RewriteOutcome::Unchanged,
            effect: None,
        }
    }

    /// Final text for a body that decoded to `original`.
    pub fn text_or<'a>(&'a self, original: &'a str) -> &'a str {
        match &self.outcome {
            RewriteOutcome::Rewritten(text) => text.as_str(),
            RewriteOutcome::Unchanged | RewriteOutcome::FallbackRaw => original,
        }
    }
}

/// Runs the rule selected by `kind` over `body`. `RuleKind::None` leaves it untouched.
pub fn apply(kind: RuleKind, body: &str) -> Rewrite {
    match kind.rule() {
        Some(rule) => rule(body),
        None => Rewrite::unchanged(),
    }
}
