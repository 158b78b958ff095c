//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod indicator;
pub mod rule;
pub mod risk;
pub mod signal;
pub mod strategy;
pub mod run;
pub mod config_validation;
pub mod error;
