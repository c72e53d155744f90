//! Domain error taxonomy.
//!
//! Everything a batch scan can hit per symbol (`NoData`, `InsufficientData`,
//! `Provider`) is recoverable: the symbol is skipped and the sweep continues.
//! `InvalidInput` is rejected at the boundary before it reaches the engine.

/// Top-level error type for trendscore.
#[derive(Debug, thiserror::Error)]
pub enum TrendscoreError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("provider error for {code}: {reason}")]
    Provider { code: String, reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("insufficient data for {code}: have {bars} bars, need {minimum}")]
    InsufficientData {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrendscoreError> for std::process::ExitCode {
    fn from(err: &TrendscoreError) -> Self {
        let code: u8 = match err {
            TrendscoreError::Io(_) => 1,
            TrendscoreError::ConfigParse { .. }
            | TrendscoreError::ConfigMissing { .. }
            | TrendscoreError::ConfigInvalid { .. } => 2,
            TrendscoreError::Provider { .. } => 3,
            TrendscoreError::InvalidInput { .. } => 4,
            TrendscoreError::NoData { .. } | TrendscoreError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
