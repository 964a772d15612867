//! Follow-up script for the login page: jump straight to the provider link.

use serde_json::Value;
use url::Url;

pub fn is_login_path(url: &Url) -> bool {
    url.path().trim_end_matches('/') == "/login"
}

/// Script navigating to the href of the first anchor whose text is `label`.
pub fn follow_link_script(label: &str) -> String {
    // JSON string literal, with `'` escaped so it also survives the JS quoting.
    let literal = Value::String(label.to_string())
        .to_string()
        .replace('\'', "\\u0027");
    format!(
        "document.location = document.evaluate('//a[text()={literal}]', document, null, \
         XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue.href;"
    )
}
