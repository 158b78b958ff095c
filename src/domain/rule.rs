//! Entry rules and crossover detection.
//!
//! # Evaluation Semantics
//!
//! - `Dpo`: long when the oscillator is above `threshold`, short when below
//!   `-threshold`, evaluated on the current bar only
//! - `MacdCrossover`: long when the MACD line crosses above the signal line,
//!   short on the mirror crossing
//! - `RsiCrossover`: long when the short RSI average crosses above the long
//!   one, short on the mirror crossing
//!
//! A crossover needs the previous bar. Any undefined (or NaN) input on either
//! bar means no signal.

use crate::domain::indicator::{IndicatorPoint, IndicatorValue};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryRule {
    Dpo { threshold: f64 },
    MacdCrossover,
    RsiCrossover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySignal {
    Long,
    Short,
    None,
}

impl EntryRule {
    pub fn evaluate(&self, prev: Option<&IndicatorPoint>, curr: &IndicatorPoint) -> EntrySignal {
        if !curr.valid {
            return EntrySignal::None;
        }

        match self {
            EntryRule::Dpo { threshold } => match curr.value {
                IndicatorValue::Simple(v) if v > *threshold => EntrySignal::Long,
                IndicatorValue::Simple(v) if v < -*threshold => EntrySignal::Short,
                _ => EntrySignal::None,
            },
            EntryRule::MacdCrossover | EntryRule::RsiCrossover => {
                let Some(prev) = prev.filter(|p| p.valid) else {
                    return EntrySignal::None;
                };
                let (Some(before), Some(now)) = (self.pair(prev), self.pair(curr)) else {
                    return EntrySignal::None;
                };
                if crossed_above(before, now) {
                    EntrySignal::Long
                } else if crossed_below(before, now) {
                    EntrySignal::Short
                } else {
                    EntrySignal::None
                }
            }
        }
    }

    /// The (fast, slow) pair a crossover rule compares.
    fn pair(&self, point: &IndicatorPoint) -> Option<(f64, f64)> {
        match (self, &point.value) {
            (EntryRule::MacdCrossover, IndicatorValue::Macd { line, signal, .. }) => {
                Some((*line, *signal))
            }
            (
                EntryRule::RsiCrossover,
                IndicatorValue::RsiCross {
                    short: Some(short),
                    long: Some(long),
                    ..
                },
            ) => Some((*short, *long)),
            _ => None,
        }
    }
}

/// A crosses above B: A[t-1] <= B[t-1] and A[t] > B[t].
/// Each argument is an (A, B) pair for one bar.
pub fn crossed_above(prev: (f64, f64), curr: (f64, f64)) -> bool {
    prev.0 <= prev.1 && curr.0 > curr.1
}

/// A crosses below B: A[t-1] >= B[t-1] and A[t] < B[t].
pub fn crossed_below(prev: (f64, f64), curr: (f64, f64)) -> bool {
    prev.0 >= prev.1 && curr.0 < curr.1
}

/// Whether series `a` crosses above `b` at `index`.
pub fn crosses_above(a: &[Option<f64>], b: &[Option<f64>], index: usize) -> bool {
    aligned_pairs(a, b, index).is_some_and(|(prev, curr)| crossed_above(prev, curr))
}

/// Whether series `a` crosses below `b` at `index`.
pub fn crosses_below(a: &[Option<f64>], b: &[Option<f64>], index: usize) -> bool {
    aligned_pairs(a, b, index).is_some_and(|(prev, curr)| crossed_below(prev, curr))
}

fn aligned_pairs(
    a: &[Option<f64>],
    b: &[Option<f64>],
    index: usize,
) -> Option<((f64, f64), (f64, f64))> {
    if index == 0 || index >= a.len() || index >= b.len() {
        return None;
    }
    let defined = |v: Option<f64>| v.filter(|x| !x.is_nan());
    let prev = (defined(a[index - 1])?, defined(b[index - 1])?);
    let curr = (defined(a[index])?, defined(b[index])?);
    Some((prev, curr))
}
