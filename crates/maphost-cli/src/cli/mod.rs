//! CLI for maphost: exercise the interception pipeline and deep-link router from a terminal.

mod bridge;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use maphost_core::config;
use std::path::PathBuf;

use commands::{run_fetch, run_rewrite, run_route};

/// Top-level CLI for maphost.
#[derive(Debug, Parser)]
#[command(name = "maphost")]
#[command(about = "maphost: response rewriting and deep-link routing for an embedded map app", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL through the interception pipeline and print the synthesized response.
    Fetch {
        /// HTTPS URL on the hosted application.
        url: String,
        /// Request method to forward.
        #[arg(long, default_value = "GET")]
        method: String,
        /// Extra request header, as "Name: value". Repeatable.
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,
    },

    /// Apply the rewrite rule selected by a request path to a local file.
    Rewrite {
        /// Request path that selects the rule, e.g. /api/settings.
        #[arg(long)]
        path: String,
        /// File holding the response body.
        file: PathBuf,
    },

    /// Show what a deep link would do.
    Route {
        /// Deep-link URI, e.g. reactmap://map.example.com/@/45.5/-73.6/12.
        uri: String,
        /// Active hostname (defaults to the configured application host).
        #[arg(long)]
        host: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                url,
                method,
                headers,
            } => run_fetch(&cfg, &url, &method, &headers).await?,
            CliCommand::Rewrite { path, file } => run_rewrite(&path, &file).await?,
            CliCommand::Route { uri, host } => run_route(&cfg, &uri, host).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
