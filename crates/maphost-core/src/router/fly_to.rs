//! `/@/<lat>/<lon>[/<zoom>]` deep-link paths.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn fly_to_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/@/([0-9.-]+)/([0-9.-]+)(?:/([0-9.-]+))?/?$").expect("fly-to path regex")
    })
}

/// Position tokens exactly as they appear in the path; the page's own
/// number parsing decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlyToCommand {
    pub lat: String,
    pub lon: String,
    pub zoom: Option<String>,
}

impl FlyToCommand {
    /// Parses a deep-link path. Any path matching the grammar is a command.
    pub fn parse(path: &str) -> Option<Self> {
        let caps = fly_to_path().captures(path)?;
        let token = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Some(Self {
            lat: token(1)?,
            lon: token(2)?,
            zoom: token(3),
        })
    }

    /// Script that flies the hijacked map handle to this position.
    pub fn script(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlyToCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window._hijackedMap.flyTo([{}, {}]", self.lat, self.lon)?;
        if let Some(zoom) = &self.zoom {
            write!(f, ", {}", zoom)?;
        }
        f.write_str(")")
    }
}
