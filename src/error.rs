use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load errors – fatal for the session, rendered as a single message
// ---------------------------------------------------------------------------

/// Why the source table could not be turned into a [`crate::data::model::Table`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("workbook contains no worksheet")]
    EmptyWorkbook,

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("row {row}: year value '{value}' is not an integer")]
    InvalidYear { row: usize, value: String },

    /// Reader-level failure; the context chain is kept for display.
    #[error("{0:#}")]
    Parse(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
