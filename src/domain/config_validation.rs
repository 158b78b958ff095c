//! Configuration validation.
//!
//! Checks every field a run reads before any data is loaded. Present values
//! must parse; absent optional values fall back to defaults when the config
//! is built.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::rsi::ZeroLossPolicy;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// Symbol and exchange given on the command line replace the `[backtest]`
/// keys, so a present override satisfies the check for that key.
pub fn validate_run_config(
    config: &dyn ConfigPort,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
) -> Result<(), SigtraderError> {
    validate_dates(config)?;
    validate_backtest_key(config, "exchange", exchange_override)?;
    validate_backtest_key(config, "code", code_override)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let kind = validate_kind(config)?;
    match kind {
        StrategyKind::Dpo { .. } => {
            validate_period(config, "dpo", "period")?;
            validate_non_negative(config, "dpo", "threshold")?;
        }
        StrategyKind::Macd { .. } => {
            for key in ["fast", "slow", "signal"] {
                validate_period(config, "macd", key)?;
            }
        }
        StrategyKind::RsiCross { .. } => {
            for key in ["period", "short_sma", "long_sma"] {
                validate_period(config, "rsi_cross", key)?;
            }
            validate_zero_loss(config)?;
        }
    }
    validate_risk(config)?;
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(SigtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SigtraderError> {
    match value {
        None => Err(SigtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SigtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_backtest_key(
    config: &dyn ConfigPort,
    key: &str,
    override_value: Option<&str>,
) -> Result<(), SigtraderError> {
    if override_value.is_some_and(|v| !v.trim().is_empty()) {
        return Ok(());
    }
    match config.get_string("backtest", key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SigtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_kind(config: &dyn ConfigPort) -> Result<StrategyKind, SigtraderError> {
    match config.get_string("strategy", "kind") {
        Some(s) if !s.trim().is_empty() => s.parse(),
        _ => Err(SigtraderError::ConfigMissing {
            section: "strategy".to_string(),
            key: "kind".to_string(),
        }),
    }
}

/// A present period must be an integer of at least 1.
fn validate_period(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), SigtraderError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    let value: i64 = raw.trim().parse().map_err(|_| SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{key} must be an integer, got '{raw}'"),
    })?;
    if value < 1 {
        return Err(SigtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be at least 1"),
        });
    }
    Ok(())
}

fn validate_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), SigtraderError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(()),
        _ => Err(SigtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be a non-negative number"),
        }),
    }
}

fn validate_zero_loss(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let Some(raw) = config.get_string("rsi_cross", "zero_loss") else {
        return Ok(());
    };
    raw.parse::<ZeroLossPolicy>()
        .map(|_| ())
        .map_err(|reason| SigtraderError::ConfigInvalid {
            section: "rsi_cross".to_string(),
            key: "zero_loss".to_string(),
            reason,
        })
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_non_negative(config, "risk", "stop_loss_pct")?;
    validate_non_negative(config, "risk", "take_profit_pct")?;
    for key in ["enable_shorting", "enable_stop_loss", "enable_take_profit"] {
        if let Some(raw) = config.get_string("risk", key) {
            if parse_bool(&raw).is_none() {
                return Err(SigtraderError::ConfigInvalid {
                    section: "risk".to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must be true or false, got '{raw}'"),
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
