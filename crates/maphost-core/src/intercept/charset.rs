//! Strict charset decode/encode for response bodies.
//!
//! Decoding never substitutes replacement characters: a body that is not
//! valid in its declared charset is reported as an error so the caller can
//! deliver the original bytes instead.

use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("unsupported charset {0:?}")]
    UnsupportedCharset(String),
    #[error("body is not valid {0}")]
    Malformed(&'static str),
    #[error("rewritten body is not representable in {0}")]
    Unmappable(&'static str),
}

/// Charset named by the declared content encoding; UTF-8 when none is declared.
///
/// Only charsets that encode back to themselves qualify, so a rewritten body
/// always goes out in the charset it arrived in.
pub fn charset_for(label: Option<&str>) -> Result<&'static Encoding, RewriteError> {
    let Some(label) = label else {
        return Ok(UTF_8);
    };
    Encoding::for_label(label.trim().as_bytes())
        .filter(|enc| enc.output_encoding() == *enc)
        .ok_or_else(|| RewriteError::UnsupportedCharset(label.to_string()))
}

pub fn decode(charset: &'static Encoding, bytes: &[u8]) -> Result<String, RewriteError> {
    charset
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(RewriteError::Malformed(charset.name()))
}

pub fn encode(charset: &'static Encoding, text: &str) -> Result<Vec<u8>, RewriteError> {
    let (bytes, _, unmappable) = charset.encode(text);
    if unmappable {
        return Err(RewriteError::Unmappable(charset.name()));
    }
    Ok(bytes.into_owned())
}
