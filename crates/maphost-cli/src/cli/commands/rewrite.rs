//! `maphost rewrite --path <p> <file>` – apply a rewrite rule offline.

use anyhow::{bail, Context, Result};
use maphost_core::rules::{self, RuleEffect, RuleKind};
use std::path::Path;

pub async fn run_rewrite(request_path: &str, file: &Path) -> Result<()> {
    let kind = RuleKind::for_path(request_path);
    if !kind.intercepts() {
        bail!("no rewrite rule applies to {request_path:?}");
    }
    let body = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;

    let rewrite = rules::apply(kind, &body);
    match &rewrite.effect {
        Some(RuleEffect::LoginLabel(label)) => eprintln!("login label: {label}"),
        Some(RuleEffect::TileServers(servers)) => {
            eprintln!("tile servers: {}", servers.len());
        }
        Some(RuleEffect::MapHandleInstalled) => eprintln!("map handle installed"),
        None => {}
    }
    print!("{}", rewrite.text_or(&body));
    Ok(())
}
