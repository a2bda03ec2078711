//! CLI command handling.

use std::path::PathBuf;

use clap::Subcommand;
use ebbtide_core::config::{EbbtideConfig, RuntimeMode};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the media server
    Serve {
        /// Runtime mode: production runs the configured pipeline command,
        /// development simulates acquisitions
        #[arg(long, default_value_t = RuntimeMode::Development)]
        mode: RuntimeMode,

        /// Port to bind on 127.0.0.1 (overrides EBBTIDE_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Library root directory (overrides EBBTIDE_LIBRARY_ROOT)
        #[arg(long)]
        library_root: Option<PathBuf>,
    },
}

/// Executes a parsed command.
pub async fn handle_command(command: Commands) -> ebbtide_core::Result<()> {
    match command {
        Commands::Serve {
            mode,
            port,
            library_root,
        } => {
            let mut config = EbbtideConfig::from_env();
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(root) = library_root {
                config.storage.library_root = root;
            }

            tracing::info!(
                mode = %mode,
                library_root = %config.storage.library_root.display(),
                "starting server"
            );
            ebbtide_web::run_server(config, mode).await
        }
    }
}
