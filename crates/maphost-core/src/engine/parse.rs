//! Parse HTTP response header lines into a status line and header multimap.

use super::{EngineError, HeaderFields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status: u32,
    pub reason: Option<String>,
    pub fields: HeaderFields,
}

/// Parse collected header lines. With redirects followed, curl reports every
/// hop; only the block after the last status line describes the response.
pub(crate) fn parse_response_head(lines: &[String]) -> Result<ResponseHead, EngineError> {
    let mut head: Option<ResponseHead> = None;

    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = Some(parse_status_line(line)?);
            continue;
        }
        let Some(current) = head.as_mut() else {
            return Err(EngineError::MalformedResponse(format!(
                "header before status line: {line:?}"
            )));
        };
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim().to_string();
            match current
                .fields
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                Some((_, values)) => values.push(value),
                None => {
                    current.fields.insert(name.to_string(), vec![value]);
                }
            }
        }
    }

    head.ok_or_else(|| EngineError::MalformedResponse("no status line".to_string()))
}

fn parse_status_line(line: &str) -> Result<ResponseHead, EngineError> {
    let mut parts = line.splitn(3, ' ');
    let _version = parts.next();
    let status = parts
        .next()
        .and_then(|code| code.trim().parse::<u32>().ok())
        .ok_or_else(|| EngineError::MalformedResponse(format!("bad status line: {line:?}")))?;
    let reason = parts
        .next()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);
    Ok(ResponseHead {
        status,
        reason,
        fields: HeaderFields::new(),
    })
}
