//! route-rule CLI
//!
//! Command-line tool for checking a rules file and trying requests and
//! routes against it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use route_rule::{Method, Params, RouteRule, RuleConfig, RuleSet, Url};

/// Route pattern compiler, request matcher and URL builder.
#[derive(Parser)]
#[command(name = "route-rule")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rules file (JSON array of rules or an object with a `rules` array).
    #[arg(short, long, env = "ROUTE_RULES", default_value = "rules.json")]
    rules: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every rule and show what it compiles to.
    Check,

    /// Find the rule matching a request.
    Match {
        /// Request URL, e.g. `/user/42?tab=posts`.
        url: String,

        /// Request method.
        #[arg(short, long, default_value = "GET")]
        method: String,
    },

    /// Build the URL of a route.
    Url {
        /// Route name, e.g. `user/view`.
        route: String,

        /// Parameters as `key=value` pairs.
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

fn load_configs(path: &Path) -> anyhow::Result<Vec<RuleConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse rules file {}", path.display()))?;
    Ok(RuleConfig::list_from_value(&value)?)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let configs = load_configs(&cli.rules)?;

    match cli.command {
        Commands::Check => {
            info!("Checking {} rule(s) from {}", configs.len(), cli.rules.display());

            println!("\nRules:");
            println!("{:-<60}", "");
            for (index, config) in configs.iter().enumerate() {
                let rule = RouteRule::new(config)
                    .with_context(|| format!("rule #{index} ({}) is invalid", config.pattern))?;
                let methods: Vec<&str> = rule.methods().iter().map(Method::as_str).collect();
                println!(" [{index}] {} -> {}", rule.template(), rule.route());
                println!("     regex:   {}", rule.pattern().as_str());
                if let Some(route_rule) = rule.route_rule() {
                    println!("     route:   {}", route_rule.as_str());
                }
                println!("     methods: {}", methods.join(", "));
            }
            println!();
        }

        Commands::Match { url, method } => {
            let method: Method = method.parse().map_err(anyhow::Error::msg)?;
            let rules = RuleSet::from_configs(&configs)?;

            let Some((route, params)) = rules.parse_request(method, &Url::parse(&url)) else {
                info!("No rule matches {} {}", method, url);
                return Ok(ExitCode::FAILURE);
            };
            println!("route: {route}");
            for (key, value) in params.iter() {
                println!("  {key} = {value}");
            }
        }

        Commands::Url { route, params } => {
            let rules = RuleSet::from_configs(&configs)?;
            let params: Params = params.into_iter().collect();

            let Some(url) = rules.create_url(&route, &params) else {
                info!("No rule can build a URL for route {}", route);
                return Ok(ExitCode::FAILURE);
            };
            println!("{url}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
