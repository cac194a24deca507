use thiserror::Error;

/// Main error type for the site analysis core
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Corrupt store record {path}: {reason}")]
    CorruptRecord { path: String, reason: String },

    /// Contract violation from the caller: never a normal zero-result outcome
    #[error("Unknown business type: {0}")]
    UnknownBusinessType(String),

    #[error("Data source error ({source_name}): {message}")]
    SourceError {
        source_name: &'static str,
        message: String,
    },
}

impl SiteError {
    /// Build a data-source failure for one facet of an analysis
    pub fn source_failure(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::SourceError {
            source_name,
            message: message.into(),
        }
    }

    /// True for errors raised by the backing stores rather than by callers
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::IoError(_) | Self::SerializationError(_) | Self::CorruptRecord { .. }
        )
    }
}
