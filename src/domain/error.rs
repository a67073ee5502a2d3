//! Domain error types.

use chrono::NaiveDate;

/// Failure reported by a market-data backend, before symbol context is attached.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarketDataError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response")]
    Empty,

    #[error("start date {from} is not before end date {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
}

/// Top-level error type for qmoney.
#[derive(Debug, thiserror::Error)]
pub enum QmoneyError {
    #[error("invalid date range for {symbol}: purchased {purchase_date}, end date {end_date}")]
    InvalidDateRange {
        symbol: String,
        purchase_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("no data for {symbol} between {from} and {to}")]
    NoData {
        symbol: String,
        from: NaiveDate,
        to: NaiveDate,
    },

    #[error("market data error for {symbol} ({from} to {to}): {source}")]
    Client {
        symbol: String,
        from: NaiveDate,
        to: NaiveDate,
        #[source]
        source: MarketDataError,
    },

    #[error("computation error: {reason}")]
    Computation { reason: String },

    #[error("{failed} of {total} trades failed; first failure: {source}")]
    Evaluation {
        failed: usize,
        total: usize,
        #[source]
        source: Box<QmoneyError>,
    },

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("failed to start worker pool: {reason}")]
    WorkerPool { reason: String },

    #[error("failed to read trades from {source_name}: {reason}")]
    TradeSource { source_name: String, reason: String },

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

impl QmoneyError {
    /// Attach symbol and range context to a backend failure.
    ///
    /// An empty response becomes [`QmoneyError::NoData`] so callers can tell
    /// missing data apart from a broken client.
    pub fn from_market_data(
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
        source: MarketDataError,
    ) -> Self {
        match source {
            MarketDataError::Empty => QmoneyError::NoData {
                symbol: symbol.to_string(),
                from,
                to,
            },
            MarketDataError::InvalidRange { from, to } => QmoneyError::InvalidDateRange {
                symbol: symbol.to_string(),
                purchase_date: from,
                end_date: to,
            },
            source => QmoneyError::Client {
                symbol: symbol.to_string(),
                from,
                to,
                source,
            },
        }
    }
}

impl From<&QmoneyError> for std::process::ExitCode {
    fn from(err: &QmoneyError) -> Self {
        let code: u8 = match err {
            QmoneyError::Io(_) => 1,
            QmoneyError::ConfigParse { .. }
            | QmoneyError::ConfigMissing { .. }
            | QmoneyError::ConfigInvalid { .. }
            | QmoneyError::InvalidWorkerCount
            | QmoneyError::WorkerPool { .. } => 2,
            QmoneyError::TradeSource { .. } => 3,
            QmoneyError::InvalidDateRange { .. } => 4,
            QmoneyError::NoData { .. } | QmoneyError::Client { .. } => 5,
            QmoneyError::Computation { .. } => 6,
            QmoneyError::Evaluation { source, .. } => return Self::from(&**source),
        };
        std::process::ExitCode::from(code)
    }
}
