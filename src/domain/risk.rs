//! Percentage stop-loss / take-profit exit rules.
//!
//! Thresholds are relative to the entry price:
//! - long:  stop at entry * (1 - sl/100), target at entry * (1 + tp/100)
//! - short: stop at entry * (1 + sl/100), target at entry * (1 - tp/100)
//!
//! Both bounds are inclusive. The stop is checked first, so a bar that
//! satisfies both closes as a stop-loss.

use std::fmt;

use crate::domain::error::SigtraderError;
use crate::domain::position::PositionState;

pub const DEFAULT_STOP_LOSS_PCT: f64 = 2.0;
pub const DEFAULT_TAKE_PROFIT_PCT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub enable_shorting: bool,
    pub enable_stop_loss: bool,
    pub enable_take_profit: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
            take_profit_pct: DEFAULT_TAKE_PROFIT_PCT,
            enable_shorting: true,
            enable_stop_loss: true,
            enable_take_profit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), SigtraderError> {
        for (key, value) in [
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SigtraderError::ConfigInvalid {
                    section: "risk".to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must be a non-negative number"),
                });
            }
        }
        Ok(())
    }

    pub fn stop_loss_price(&self, position: &PositionState) -> Option<f64> {
        if !self.enable_stop_loss {
            return None;
        }
        match *position {
            PositionState::Flat => None,
            PositionState::Long { entry_price } => {
                Some(entry_price * (1.0 - self.stop_loss_pct / 100.0))
            }
            PositionState::Short { entry_price } => {
                Some(entry_price * (1.0 + self.stop_loss_pct / 100.0))
            }
        }
    }

    pub fn take_profit_price(&self, position: &PositionState) -> Option<f64> {
        if !self.enable_take_profit {
            return None;
        }
        match *position {
            PositionState::Flat => None,
            PositionState::Long { entry_price } => {
                Some(entry_price * (1.0 + self.take_profit_pct / 100.0))
            }
            PositionState::Short { entry_price } => {
                Some(entry_price * (1.0 - self.take_profit_pct / 100.0))
            }
        }
    }

    pub fn should_stop_loss(&self, position: &PositionState, price: f64) -> bool {
        match self.stop_loss_price(position) {
            Some(stop) if position.is_long() => price <= stop,
            Some(stop) => price >= stop,
            None => false,
        }
    }

    pub fn should_take_profit(&self, position: &PositionState, price: f64) -> bool {
        match self.take_profit_price(position) {
            Some(target) if position.is_long() => price >= target,
            Some(target) => price <= target,
            None => false,
        }
    }

    pub fn exit_reason(&self, position: &PositionState, price: f64) -> Option<ExitReason> {
        if self.should_stop_loss(position, price) {
            Some(ExitReason::StopLoss)
        } else if self.should_take_profit(position, price) {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }
}
