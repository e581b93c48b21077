use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] satscan_core::ConfigError),

    #[error("failed to load environment file: {0}")]
    EnvFile(#[from] dotenv::Error),

    #[error("lookup unavailable: {0}")]
    Lookup(String),

    #[error(transparent)]
    Sink(#[from] satscan_core::SinkError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::EnvFile(_) => 2,
            Self::Lookup(_) => 3,
            Self::Serialization(_) => 4,
            Self::Sink(_) => 10,
        }
    }
}
