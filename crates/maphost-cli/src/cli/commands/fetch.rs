//! `maphost fetch <url>` – run one request through the interception pipeline.

use anyhow::{bail, Context, Result};
use maphost_core::config::MaphostConfig;
use maphost_core::engine::CurlEngine;
use maphost_core::intercept::InterceptedRequest;
use maphost_core::page::PageHost;
use std::io::Write;
use std::sync::Arc;
use url::Url;

use crate::cli::bridge::LogBridge;

/// Parses a "Name: value" header argument.
pub(crate) fn parse_header(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("invalid header {:?}, expected \"Name: value\"", raw),
    }
}

pub async fn run_fetch(
    cfg: &MaphostConfig,
    url: &str,
    method: &str,
    headers: &[String],
) -> Result<()> {
    let url = Url::parse(url).with_context(|| format!("invalid URL {url:?}"))?;
    let host = url
        .host_str()
        .with_context(|| format!("{url} has no host"))?
        .to_string();
    let headers = headers
        .iter()
        .map(|h| parse_header(h))
        .collect::<Result<Vec<_>>>()?;

    // Treat the requested host as the hosted application for this run.
    let page = Arc::new(PageHost::new(
        host,
        cfg.supported_hosts.clone(),
        Arc::new(CurlEngine::new(&cfg.engine_or_default())),
        Arc::new(LogBridge),
        tokio::runtime::Handle::current(),
    ));
    page.mark_ready();
    page.on_page_started(&url);

    let request = InterceptedRequest {
        url: url.clone(),
        method: method.to_string(),
        headers,
    };
    let intercepted = {
        let page = Arc::clone(&page);
        tokio::task::spawn_blocking(move || page.intercept(&request)).await?
    };

    let Some(mut response) = intercepted else {
        println!("Not intercepted: {url} would load from the network unchanged.");
        return Ok(());
    };

    println!("HTTP {} {}", response.status, response.status_message);
    for (name, value) in &response.headers {
        println!("{name}: {value}");
    }
    println!();
    let body = response.read_body().context("reading response body")?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&body)?;
    stdout.flush()?;
    Ok(())
}
