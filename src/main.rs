use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use factcheck::api::create_router;
use factcheck::config::Config;
use factcheck::pipeline::FactChecker;
use factcheck::report::Report;

#[derive(Parser)]
#[command(name = "factcheck", about = "Gather web evidence for a claim and judge it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a single claim and print the report as JSON
    Check {
        claim: String,
        /// Write the report to this file, or into this directory as analysis_<timestamp>.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve {
        /// Overrides FACTCHECK_BIND_ADDR
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let checker = FactChecker::from_config(&config)?;

    match cli.command {
        Command::Check { claim, output } => {
            let claim = claim.trim();
            anyhow::ensure!(!claim.is_empty(), "claim cannot be empty");

            let outcome = checker.run(claim).await;
            let report = Report::from_outcome(claim, &outcome);
            let json = report.to_json()?;
            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(report.file_name())
                    } else {
                        path
                    };
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("failed to write report to {}", path.display()))?;
                    tracing::info!("report written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Serve { addr } => {
            let addr = addr.unwrap_or(config.bind_addr);
            let router = create_router(Arc::new(checker));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!("listening on {addr}");
            axum::serve(listener, router).await?;
        }
    }
    Ok(())
}
