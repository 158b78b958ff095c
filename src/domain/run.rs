//! Run driver: indicators, then one engine step per bar, into a sink.
//!
//! RunConfig carries the data selection for a run (symbol, exchange, date
//! range). The strategy itself comes from [`StrategyConfig`].

use chrono::NaiveDate;
use tracing::info;

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{self, IndicatorSeries};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::{PositionState, Side};
use crate::domain::risk::ExitReason;
use crate::domain::signal::Action;
use crate::domain::strategy::StrategyConfig;
use crate::ports::signal_sink::SignalSink;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub code: String,
    pub exchange: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The engine's output for one bar, with the position it left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSignal {
    pub date: NaiveDate,
    pub close: f64,
    pub action: Action,
    pub position: PositionState,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub bars: usize,
    pub long_entries: usize,
    pub short_entries: usize,
    pub stop_loss_exits: usize,
    pub take_profit_exits: usize,
    pub suppressed_shorts: usize,
    pub open_at_end: Option<PositionState>,
}

impl RunSummary {
    fn count(&mut self, action: Action) {
        self.bars += 1;
        match action {
            Action::OpenLong => self.long_entries += 1,
            Action::OpenShort => self.short_entries += 1,
            Action::Close(ExitReason::StopLoss) => self.stop_loss_exits += 1,
            Action::Close(ExitReason::TakeProfit) => self.take_profit_exits += 1,
            Action::Hold => {}
        }
    }

    pub fn entries(&self) -> usize {
        self.long_entries + self.short_entries
    }

    pub fn exits(&self) -> usize {
        self.stop_loss_exits + self.take_profit_exits
    }
}

/// Everything a run produces, kept in memory.
#[derive(Debug, Clone)]
pub struct SignalRun {
    pub indicator: IndicatorSeries,
    pub signals: Vec<BarSignal>,
    pub summary: RunSummary,
}

/// Run `config` over `bars` and feed every bar's signal to `sink`.
///
/// Configuration is validated before any computation. An empty bar slice is
/// a normal, empty run. A sink error aborts the run and is returned as is.
pub fn run_strategy(
    bars: &[OhlcvBar],
    config: &StrategyConfig,
    sink: &mut dyn SignalSink,
) -> Result<(IndicatorSeries, RunSummary), SigtraderError> {
    config.validate()?;
    let series = indicator::calculate(bars, &config.kind.indicator_type())?;

    info!(
        strategy = %config.name,
        indicator = %series.indicator_type,
        bars = bars.len(),
        "running strategy"
    );

    let mut engine = config.engine();
    let mut summary = RunSummary::default();

    for (i, bar) in bars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| &series.values[p]);
        let curr = &series.values[i];
        let action = engine.on_bar(bar.close, prev, curr);
        summary.count(action);

        let signal = BarSignal {
            date: bar.date,
            close: bar.close,
            action,
            position: *engine.position(),
        };
        sink.record(&signal, curr)?;
    }
    sink.finish()?;

    summary.suppressed_shorts = engine.suppressed_shorts();
    summary.open_at_end = match engine.position().side() {
        Side::Flat => None,
        _ => Some(*engine.position()),
    };

    info!(
        bars = summary.bars,
        entries = summary.entries(),
        exits = summary.exits(),
        "run complete"
    );

    Ok((series, summary))
}

/// Run `config` over `bars`, collecting the signals in memory.
pub fn generate_signals(
    bars: &[OhlcvBar],
    config: &StrategyConfig,
) -> Result<SignalRun, SigtraderError> {
    let mut signals: Vec<BarSignal> = Vec::with_capacity(bars.len());
    let (indicator, summary) = run_strategy(bars, config, &mut signals)?;
    Ok(SignalRun {
        indicator,
        signals,
        summary,
    })
}
