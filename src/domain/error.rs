//! Domain error types.

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
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

    #[error("invalid {indicator} parameter {param}: {reason}")]
    InvalidParameter {
        indicator: String,
        param: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {code} on {exchange}")]
    NoData { code: String, exchange: String },

    #[error("signal sink failed: {reason}")]
    Sink { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    pub(crate) fn invalid_parameter(indicator: &str, param: &str, reason: &str) -> Self {
        SigtraderError::InvalidParameter {
            indicator: indicator.to_string(),
            param: param.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) | SigtraderError::Csv(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. }
            | SigtraderError::InvalidParameter { .. } => 2,
            SigtraderError::Data { .. } => 3,
            SigtraderError::NoData { .. } => 5,
            SigtraderError::Sink { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
