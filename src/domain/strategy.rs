//! Strategy configuration and composition.
//!
//! A strategy is an indicator variant plus its entry rule, combined with a
//! [`RiskConfig`]. Values are built once per run and never mutated.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SigtraderError;
use crate::domain::indicator::rsi::{self, ZeroLossPolicy};
use crate::domain::indicator::{dpo, macd, IndicatorType};
use crate::domain::risk::RiskConfig;
use crate::domain::rule::EntryRule;
use crate::domain::signal::SignalEngine;

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    Dpo {
        period: usize,
        threshold: f64,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    RsiCross {
        period: usize,
        short_sma: usize,
        long_sma: usize,
        zero_loss: ZeroLossPolicy,
    },
}

impl StrategyKind {
    pub fn default_dpo() -> Self {
        StrategyKind::Dpo {
            period: dpo::DEFAULT_PERIOD,
            threshold: dpo::DEFAULT_THRESHOLD,
        }
    }

    pub fn default_macd() -> Self {
        StrategyKind::Macd {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        }
    }

    pub fn default_rsi_cross() -> Self {
        StrategyKind::RsiCross {
            period: rsi::DEFAULT_PERIOD,
            short_sma: rsi::DEFAULT_SHORT_SMA,
            long_sma: rsi::DEFAULT_LONG_SMA,
            zero_loss: ZeroLossPolicy::default(),
        }
    }

    /// Config name of the variant, also its INI section.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Dpo { .. } => "dpo",
            StrategyKind::Macd { .. } => "macd",
            StrategyKind::RsiCross { .. } => "rsi_cross",
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        match *self {
            StrategyKind::Dpo { period, .. } => IndicatorType::Dpo(period),
            StrategyKind::Macd { fast, slow, signal } => IndicatorType::Macd { fast, slow, signal },
            StrategyKind::RsiCross {
                period,
                short_sma,
                long_sma,
                zero_loss,
            } => IndicatorType::RsiCross {
                period,
                short_sma,
                long_sma,
                zero_loss,
            },
        }
    }

    pub fn entry_rule(&self) -> EntryRule {
        match *self {
            StrategyKind::Dpo { threshold, .. } => EntryRule::Dpo { threshold },
            StrategyKind::Macd { .. } => EntryRule::MacdCrossover,
            StrategyKind::RsiCross { .. } => EntryRule::RsiCrossover,
        }
    }

    pub fn validate(&self) -> Result<(), SigtraderError> {
        let periods: Vec<(&str, usize)> = match self {
            StrategyKind::Dpo { period, threshold } => {
                if !threshold.is_finite() || *threshold < 0.0 {
                    return Err(SigtraderError::ConfigInvalid {
                        section: self.name().to_string(),
                        key: "threshold".to_string(),
                        reason: "threshold must be a non-negative number".to_string(),
                    });
                }
                vec![("period", *period)]
            }
            StrategyKind::Macd { fast, slow, signal } => {
                vec![("fast", *fast), ("slow", *slow), ("signal", *signal)]
            }
            StrategyKind::RsiCross {
                period,
                short_sma,
                long_sma,
                ..
            } => vec![
                ("period", *period),
                ("short_sma", *short_sma),
                ("long_sma", *long_sma),
            ],
        };

        for (key, value) in periods {
            if value == 0 {
                return Err(SigtraderError::ConfigInvalid {
                    section: self.name().to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must be at least 1"),
                });
            }
        }
        Ok(())
    }
}

impl FromStr for StrategyKind {
    type Err = SigtraderError;

    /// Parse a kind name into that kind with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dpo" => Ok(StrategyKind::default_dpo()),
            "macd" => Ok(StrategyKind::default_macd()),
            "rsi_cross" | "rsi" => Ok(StrategyKind::default_rsi_cross()),
            other => Err(SigtraderError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "kind".to_string(),
                reason: format!("unknown strategy kind '{other}' (expected dpo, macd or rsi_cross)"),
            }),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Dpo { period, threshold } => {
                write!(f, "DPO(period={}, threshold={})", period, threshold)
            }
            StrategyKind::Macd { fast, slow, signal } => {
                write!(f, "MACD(fast={}, slow={}, signal={})", fast, slow, signal)
            }
            StrategyKind::RsiCross {
                period,
                short_sma,
                long_sma,
                zero_loss,
            } => write!(
                f,
                "RSI_CROSS(period={}, short_sma={}, long_sma={}, zero_loss={})",
                period, short_sma, long_sma, zero_loss
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub name: String,
    pub kind: StrategyKind,
    pub risk: RiskConfig,
}

impl StrategyConfig {
    pub fn new(kind: StrategyKind, risk: RiskConfig) -> Self {
        StrategyConfig {
            name: kind.name().to_string(),
            kind,
            risk,
        }
    }

    pub fn validate(&self) -> Result<(), SigtraderError> {
        self.kind.validate()?;
        self.risk.validate()
    }

    /// A fresh engine with an empty position.
    pub fn engine(&self) -> SignalEngine {
        SignalEngine::new(self.risk.clone(), self.kind.entry_rule())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_kind() {
        assert_eq!(
            StrategyKind::default_dpo(),
            StrategyKind::Dpo {
                period: 20,
                threshold: 0.0
            }
        );
        assert_eq!(
            StrategyKind::default_macd(),
            StrategyKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
        );
        assert_eq!(
            StrategyKind::default_rsi_cross(),
            StrategyKind::RsiCross {
                period: 14,
                short_sma: 10,
                long_sma: 20,
                zero_loss: ZeroLossPolicy::Neutral,
            }
        );
    }

    #[test]
    fn parse_kind_names() {
        assert_eq!("dpo".parse::<StrategyKind>().unwrap().name(), "dpo");
        assert_eq!("MACD".parse::<StrategyKind>().unwrap().name(), "macd");
        assert_eq!("rsi_cross".parse::<StrategyKind>().unwrap().name(), "rsi_cross");
        assert!(matches!(
            "bollinger".parse::<StrategyKind>(),
            Err(SigtraderError::ConfigInvalid { key, .. }) if key == "kind"
        ));
    }

    #[test]
    fn kind_maps_to_indicator_and_rule() {
        let kind = StrategyKind::Dpo {
            period: 10,
            threshold: 0.25,
        };
        assert_eq!(kind.indicator_type(), IndicatorType::Dpo(10));
        assert_eq!(kind.entry_rule(), EntryRule::Dpo { threshold: 0.25 });
        assert_eq!(StrategyKind::default_macd().entry_rule(), EntryRule::MacdCrossover);
        assert_eq!(
            StrategyKind::default_rsi_cross().entry_rule(),
            EntryRule::RsiCrossover
        );
    }

    #[test]
    fn validate_rejects_zero_periods() {
        let kind = StrategyKind::Macd {
            fast: 12,
            slow: 0,
            signal: 9,
        };
        assert!(matches!(
            kind.validate(),
            Err(SigtraderError::ConfigInvalid { section, key, .. })
                if section == "macd" && key == "slow"
        ));
        let kind = StrategyKind::RsiCross {
            period: 14,
            short_sma: 0,
            long_sma: 20,
            zero_loss: ZeroLossPolicy::Neutral,
        };
        assert!(kind.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_threshold() {
        let kind = StrategyKind::Dpo {
            period: 20,
            threshold: f64::INFINITY,
        };
        assert!(kind.validate().is_err());
        let kind = StrategyKind::Dpo {
            period: 20,
            threshold: -0.5,
        };
        assert!(kind.validate().is_err());
    }

    #[test]
    fn strategy_config_validates_risk() {
        let config = StrategyConfig::new(
            StrategyKind::default_dpo(),
            RiskConfig {
                take_profit_pct: -5.0,
                ..RiskConfig::default()
            },
        );
        assert!(config.validate().is_err());
        assert_eq!(config.name, "dpo");
    }

    #[test]
    fn engine_starts_flat() {
        let config = StrategyConfig::new(StrategyKind::default_macd(), RiskConfig::default());
        let engine = config.engine();
        assert!(!engine.position().is_open());
        assert_eq!(*engine.rule(), EntryRule::MacdCrossover);
    }

    #[test]
    fn kind_display() {
        assert_eq!(
            StrategyKind::default_macd().to_string(),
            "MACD(fast=12, slow=26, signal=9)"
        );
    }
}
