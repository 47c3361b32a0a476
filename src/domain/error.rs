//! Domain error types.

/// Top-level error type for stockfolio.
#[derive(Debug, thiserror::Error)]
pub enum StockfolioError {
    #[error("validation error: {reason}")]
    Validation { reason: String },

    #[error("cannot aggregate an empty set of transactions")]
    EmptyInput,

    #[error("no historical observations for {ticker} since {start_date}")]
    EmptySeries { ticker: String, start_date: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("arithmetic overflow during {operation}")]
    Arithmetic { operation: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockfolioError {
    pub fn validation(reason: impl Into<String>) -> Self {
        StockfolioError::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        StockfolioError::NotFound { what: what.into() }
    }
}

impl From<&StockfolioError> for std::process::ExitCode {
    fn from(err: &StockfolioError) -> Self {
        let code: u8 = match err {
            StockfolioError::Io(_) => 1,
            StockfolioError::ConfigParse { .. }
            | StockfolioError::ConfigMissing { .. }
            | StockfolioError::ConfigInvalid { .. } => 2,
            StockfolioError::Database { .. } | StockfolioError::DatabaseQuery { .. } => 3,
            StockfolioError::Validation { .. } | StockfolioError::Arithmetic { .. } => 4,
            StockfolioError::EmptyInput
            | StockfolioError::EmptySeries { .. }
            | StockfolioError::NotFound { .. }
            | StockfolioError::MarketData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
