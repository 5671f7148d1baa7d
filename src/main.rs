mod config;
mod model;
mod pipeline;
mod pr;
mod server;
mod speech;
mod summary;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// PR Narrator — HTTP service that fetches a GitHub Pull Request, asks a
/// hosted language model for a voice-ready summary (optionally translated),
/// and synthesizes the result into audio.
#[derive(Parser, Debug)]
#[command(name = "pr-narrator", version, about)]
struct Cli {
    /// Listen port (overrides config file and PORT env var)
    #[arg(short, long)]
    port: Option<u16>,

    /// Verify credentials and GitHub connectivity, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;

    if cli.check {
        return run_check(&config).await;
    }

    let credentials = config.validate()?;
    let orchestrator = pipeline::Orchestrator::from_config(&config, credentials)?;
    let state = Arc::new(server::AppState {
        pipeline: orchestrator,
    });

    let port = cli.port.unwrap_or(config.server.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    server::run_server(addr, state).await?;

    Ok(())
}

/// Report which credentials are configured and confirm GitHub is reachable.
/// Deliberately touches neither the model nor the speech provider, so a
/// deployment can be debugged without spending quota.
async fn run_check(config: &config::Config) -> Result<(), Box<dyn std::error::Error>> {
    use colored::Colorize;

    let github_token = config.github_token();
    let statuses = [
        ("GitHub token", github_token.is_some()),
        ("model API key", config.model_api_key().is_some()),
        ("speech API key", config.speech_api_key().is_some()),
    ];

    let mut failed = false;
    for (name, present) in statuses {
        if present {
            println!("{} {}", "ok".green().bold(), name);
        } else {
            println!("{} {} missing", "!!".red().bold(), name);
            failed = true;
        }
    }

    if let Some(token) = github_token {
        let client = pr::GithubClient::new(token, config.limits.fetch_timeout())?;
        match client.latest_pull("rust-lang", "rust").await {
            Ok(Some((number, title))) => println!(
                "{} GitHub reachable, newest PR #{}: {}",
                "ok".green().bold(),
                number,
                title
            ),
            Ok(None) => println!("{} GitHub reachable, no open PRs", "ok".green().bold()),
            Err(err) => {
                println!("{} GitHub unreachable: {}", "!!".red().bold(), err);
                failed = true;
            }
        }
    }

    if failed {
        return Err("diagnostics failed, see output above".into());
    }
    println!("{}", "all checks passed".green());
    Ok(())
}
