use thiserror::Error;

/// Failures a [`SnapshotProvider`](super::provider::SnapshotProvider) may report.
///
/// Transport specific errors are flattened into these two variants at the
/// provider boundary.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ProviderError {
    #[error("unknown contract symbol: {0}")]
    UnknownSymbol(String),

    #[error("market data unavailable: {0}")]
    DataUnavailable(String),
}

impl ProviderError {
    pub fn is_unknown_symbol(&self) -> bool {
        matches!(self, ProviderError::UnknownSymbol(_))
    }

    /// Short reason shown in the dashboard status line.
    pub fn status_text(&self) -> String {
        match self {
            ProviderError::UnknownSymbol(symbol) => format!("unknown symbol {symbol}"),
            ProviderError::DataUnavailable(reason) => reason.clone(),
        }
    }
}

/// Invalid dashboard configuration read from the environment.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown contract symbol in {key}: {value}")]
    UnknownContract { key: &'static str, value: String },

    #[error("unknown data source: {0} (expected \"mock\" or \"live\")")]
    UnknownDataSource(String),

    #[error("invalid snapshot API url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
