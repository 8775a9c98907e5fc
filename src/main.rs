//! gitcode - a multi-organization git repository browser
//!
//! # Usage
//! ```bash
//! gitcode --repos /srv --hostname git.example.com   # Serve /srv/<org>/<repo>.git
//! gitcode --config ./gitcode.toml --port 9000       # Explicit config file
//! ```

mod auth;
mod config;
mod error;
mod git;
mod models;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use state::AppState;

const CONFIG_FILE: &str = "gitcode.toml";

/// gitcode - Browse the repositories hosted under one directory
#[derive(Parser)]
#[command(name = "gitcode")]
#[command(about = "A multi-organization git repository browser", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to run the server on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Public hostname, used for clone URLs and the session cookie domain
    #[arg(long, default_value = "localhost")]
    hostname: String,

    /// Directory holding <org>/<repo>.git repositories
    #[arg(long, default_value = "/srv")]
    repos: PathBuf,

    /// Config file [default: <repos>/gitcode.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.repos.join(CONFIG_FILE));
    let config = match AppConfig::load(&config_path, cli.repos.clone(), cli.hostname.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load config: {}", e);
            eprintln!("  Path: {}", config_path.display());
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(config));
    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to {}: {}", addr, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "serving {} as {} on http://{}",
        cli.repos.display(),
        cli.hostname,
        addr
    );
    println!();
    println!("  Repositories: {}", cli.repos.display());
    println!("  Server:       http://{}", addr);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
