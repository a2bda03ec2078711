//! Ebbtide CLI - Command-line interface
//!
//! Process entrypoint: initializes logging, parses arguments, and runs the
//! media server.

mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ebbtide")]
#[command(about = "A magnet-link media acquisition and streaming server")]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(error) = commands::handle_command(cli.command).await {
        tracing::error!(error = %error, "fatal error");
        eprintln!("Error: {}", error.user_message());
        std::process::exit(if error.is_user_error() { 2 } else { 1 });
    }
}
