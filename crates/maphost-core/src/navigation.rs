//! Which navigations stay inside the surface.

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the surface load it.
    Allow,
    /// Foreign host: hand the URL to the system browser.
    LaunchExternal,
    /// Plain-HTTP page on an allowed host; only HTTPS is loaded.
    RejectInsecure,
}

/// `supported_hosts` must already be lower-case.
pub fn decide(url: &Url, active_host: &str, supported_hosts: &[String]) -> NavigationDecision {
    let host = url.host_str().map(str::to_ascii_lowercase);
    let allowed = host
        .as_deref()
        .is_some_and(|h| h == active_host || supported_hosts.iter().any(|s| s == h));
    if !allowed {
        NavigationDecision::LaunchExternal
    } else if url.scheme().eq_ignore_ascii_case("http") {
        NavigationDecision::RejectInsecure
    } else {
        NavigationDecision::Allow
    }
}
