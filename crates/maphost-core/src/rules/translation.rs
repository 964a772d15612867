//! `/locales/<lang>/translation.json`: remember the localized login link text.

use serde_json::Value;

use super::{Rewrite, RewriteOutcome, RuleEffect};

/// Reads the string field `login` of a translation document.
pub fn extract_login_label(body: &str) -> Result<String, serde_json::Error> {
    let doc: Value = serde_json::from_str(body)?;
    match doc.get("login") {
        Some(Value::String(label)) => Ok(label.clone()),
        _ => Err(serde::de::Error::custom("no string field `login`")),
    }
}

pub(super) fn rewrite_translation(body: &str) -> Rewrite {
    match extract_login_label(body) {
        Ok(label) => Rewrite {
            outcome: RewriteOutcome::Unchanged,
            effect: Some(RuleEffect::LoginLabel(label)),
        },
        Err(e) => {
            tracing::warn!(error = %e, "translation payload has no login label");
            Rewrite::unchanged()
        }
    }
}
