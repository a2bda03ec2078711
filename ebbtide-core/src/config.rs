//! Centralized configuration for Ebbtide.
//!
//! All tunable parameters live here to avoid hard-coded values scattered
//! throughout the codebase. Environment variables override the defaults at
//! process startup; nothing in the core reads the environment directly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Subdirectory of the library root where the pipeline lands encoded output.
pub const ENCODED_DIR: &str = "encodedVideos";

/// Central configuration for all Ebbtide components.
#[derive(Debug, Clone, Default)]
pub struct EbbtideConfig {
    pub storage: StorageConfig,
    pub queue: QueueConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
}

/// Library storage layout configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory under which all acquired media lives
    pub library_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::from("library"),
        }
    }
}

impl StorageConfig {
    /// Directory holding every encoded video.
    pub fn encoded_root(&self) -> PathBuf {
        self.library_root.join(ENCODED_DIR)
    }

    /// Directory where the encoded file for `filename` will land.
    ///
    /// Computed eagerly at submission time; the directory is not expected to
    /// exist until the producing job finishes.
    pub fn record_dir(&self, filename: &str) -> PathBuf {
        self.encoded_root().join(filename)
    }
}

/// Job queue behavior configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Number of jobs executed concurrently
    pub workers: usize,
    /// Command channel capacity for the queue actor
    pub command_buffer: usize,
    /// Bounded wait applied to a cancellation attempt before deletion proceeds
    pub cancel_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            command_buffer: 100,
            cancel_timeout: Duration::from_secs(5),
        }
    }
}

/// Download+encode pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// External command template for production acquisitions.
    ///
    /// Whitespace-separated; `{magnet}` and `{output}` placeholders are
    /// substituted per job. None means no production pipeline is configured.
    pub command: Option<String>,
    /// Simulated acquisition duration for development mode
    pub simulated_duration: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            command: None,
            simulated_duration: Duration::from_millis(300),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind on 127.0.0.1
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl EbbtideConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(root) = std::env::var("EBBTIDE_LIBRARY_ROOT") {
            config.storage.library_root = PathBuf::from(root);
        }

        if let Ok(port) = std::env::var("EBBTIDE_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Ok(workers) = std::env::var("EBBTIDE_QUEUE_WORKERS") {
            if let Ok(count) = workers.parse::<usize>() {
                config.queue.workers = count.max(1);
            }
        }

        if let Ok(timeout) = std::env::var("EBBTIDE_CANCEL_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.queue.cancel_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(command) = std::env::var("EBBTIDE_PIPELINE_COMMAND") {
            if !command.trim().is_empty() {
                config.pipeline.command = Some(command);
            }
        }

        config
    }

    /// Creates a configuration rooted at `dir`, suited to tests.
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            storage: StorageConfig {
                library_root: dir.to_path_buf(),
            },
            ..Default::default()
        }
    }
}

/// Runtime mode for Ebbtide services.
///
/// Selects between the external-command acquisition pipeline and the
/// simulated one, keeping the same interfaces either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeMode {
    /// Production mode - runs the configured external pipeline command
    Production,
    /// Development mode - simulates acquisitions for offline development
    Development,
}

impl RuntimeMode {
    /// Check if running in development mode.
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl Default for RuntimeMode {
    fn default() -> Self {
        Self::Development
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "PRODUCTION"),
            Self::Development => write!(f, "DEVELOPMENT"),
        }
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(format!(
                "Invalid runtime mode: '{s}'. Valid options are: production, development"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = EbbtideConfig::default();

        assert_eq!(config.storage.library_root, PathBuf::from("library"));
        assert_eq!(config.queue.workers, 2);
        assert_eq!(config.queue.cancel_timeout, Duration::from_secs(5));
        assert_eq!(config.server.port, 3000);
        assert!(config.pipeline.command.is_none());
    }

    #[test]
    fn test_record_dir_includes_encoded_segment() {
        let storage = StorageConfig {
            library_root: PathBuf::from("/srv/media"),
        };

        assert_eq!(
            storage.record_dir("Big.Movie.mp4"),
            PathBuf::from("/srv/media/encodedVideos/Big.Movie.mp4")
        );
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("EBBTIDE_LIBRARY_ROOT", "/tmp/ebbtide-test");
            std::env::set_var("EBBTIDE_PORT", "8080");
            std::env::set_var("EBBTIDE_QUEUE_WORKERS", "4");
            std::env::set_var("EBBTIDE_CANCEL_TIMEOUT", "9");
        }

        let config = EbbtideConfig::from_env();

        assert_eq!(config.storage.library_root, PathBuf::from("/tmp/ebbtide-test"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.queue.workers, 4);
        assert_eq!(config.queue.cancel_timeout, Duration::from_secs(9));

        // Cleanup
        unsafe {
            std::env::remove_var("EBBTIDE_LIBRARY_ROOT");
            std::env::remove_var("EBBTIDE_PORT");
            std::env::remove_var("EBBTIDE_QUEUE_WORKERS");
            std::env::remove_var("EBBTIDE_CANCEL_TIMEOUT");
        }
    }

    #[test]
    fn test_runtime_mode_parsing() {
        assert_eq!("prod".parse::<RuntimeMode>(), Ok(RuntimeMode::Production));
        assert_eq!("dev".parse::<RuntimeMode>(), Ok(RuntimeMode::Development));
        assert!("staging".parse::<RuntimeMode>().is_err());
    }
}
