//! crypto-research CLI
//!
//! Fetches prices and news directly, or hands both to Claude through the
//! tool-use loop and prints the resulting research brief.

mod cli;
mod commands;
mod config;
mod render;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::AgentError;

use crate::cli::Cli;
use crate::render::Renderer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| config::default_log_directive(cli.verbose).into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let renderer = Renderer::detect(cli.no_color);

    match commands::run(&cli, &renderer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            let message = err
                .downcast_ref::<AgentError>()
                .map_or_else(|| err.to_string(), AgentError::user_message);
            eprint!("{}", renderer.error_panel(commands::error_title(&err), &message));
            ExitCode::FAILURE
        }
    }
}
