//! Decoding of settings exports the page offers as `data:` URL downloads.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_EXPORT_FILENAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsExport {
    pub json: String,
    pub filename: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unsupported download {0}")]
    UnsupportedDownload(String),
    #[error("export payload is not UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),
}

fn filename_param() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)filename=("([^"]+)"|[^;]+)"#).expect("filename regex")
    })
}

/// Filename from a Content-Disposition value, quoted or bare.
pub fn filename_from_disposition(disposition: &str) -> Option<String> {
    let caps = filename_param().captures(disposition)?;
    caps.get(2)
        .or_else(|| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Splits a `data:` URL download into its form-decoded payload and a filename.
pub fn decode_data_url(url: &str, disposition: &str) -> Result<SettingsExport, ExportError> {
    let is_data = url
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"));
    if !is_data {
        return Err(ExportError::UnsupportedDownload(url.to_string()));
    }
    let payload = url.split_once(',').map_or("", |(_, p)| p).replace('+', " ");
    let json = percent_decode_str(&payload).decode_utf8()?.into_owned();
    let filename = filename_from_disposition(disposition)
        .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string());
    Ok(SettingsExport { json, filename })
}
