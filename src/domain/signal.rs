//! Per-bar signal and risk state machine.
//!
//! One engine drives one run. Each bar:
//! 1. If a position is open, check stop-loss then take-profit. A hit closes
//!    the position and ends the bar (no re-entry on the same bar).
//! 2. If flat, evaluate the entry rule. Short entries are dropped when
//!    shorting is disabled.
//! 3. Otherwise hold.

use std::fmt;

use tracing::debug;

use crate::domain::indicator::IndicatorPoint;
use crate::domain::position::PositionState;
use crate::domain::risk::{ExitReason, RiskConfig};
use crate::domain::rule::{EntryRule, EntrySignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    OpenLong,
    OpenShort,
    Close(ExitReason),
    Hold,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::OpenLong => "OPEN_LONG",
            Action::OpenShort => "OPEN_SHORT",
            Action::Close(_) => "CLOSE",
            Action::Hold => "HOLD",
        }
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        match self {
            Action::Close(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct SignalEngine {
    risk: RiskConfig,
    rule: EntryRule,
    position: PositionState,
    suppressed_shorts: usize,
}

impl SignalEngine {
    pub fn new(risk: RiskConfig, rule: EntryRule) -> Self {
        SignalEngine {
            risk,
            rule,
            position: PositionState::Flat,
            suppressed_shorts: 0,
        }
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn rule(&self) -> &EntryRule {
        &self.rule
    }

    /// Short entries dropped so far because shorting is disabled.
    pub fn suppressed_shorts(&self) -> usize {
        self.suppressed_shorts
    }

    /// Advance one bar. `prev` is the previous bar's reading (None on the
    /// first bar), `curr` this bar's, `close` this bar's closing price.
    pub fn on_bar(
        &mut self,
        close: f64,
        prev: Option<&IndicatorPoint>,
        curr: &IndicatorPoint,
    ) -> Action {
        if self.position.is_open() {
            if let Some(reason) = self.risk.exit_reason(&self.position, close) {
                debug!(
                    date = %curr.date,
                    side = %self.position.side(),
                    entry = self.position.entry_price(),
                    close,
                    return_pct = self.position.unrealized_return_pct(close),
                    %reason,
                    "position closed"
                );
                self.position.close();
                return Action::Close(reason);
            }
            return Action::Hold;
        }

        match self.rule.evaluate(prev, curr) {
            EntrySignal::Long => {
                self.position.open_long(close);
                debug!(date = %curr.date, close, "opened long");
                Action::OpenLong
            }
            EntrySignal::Short if self.risk.enable_shorting => {
                self.position.open_short(close);
                debug!(date = %curr.date, close, "opened short");
                Action::OpenShort
            }
            EntrySignal::Short => {
                self.suppressed_shorts += 1;
                debug!(date = %curr.date, close, "short signal ignored: shorting disabled");
                Action::Hold
            }
            EntrySignal::None => Action::Hold,
        }
    }
}
