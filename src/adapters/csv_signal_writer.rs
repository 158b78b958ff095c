//! CSV output: per-bar actions as a [`SignalSink`], and indicator series for
//! charting.

use std::io::Write;

use serde::Serialize;

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::run::BarSignal;
use crate::ports::signal_sink::SignalSink;

#[derive(Debug, Serialize)]
struct SignalRecord<'a> {
    date: String,
    close: f64,
    action: &'a str,
    reason: Option<String>,
    position: String,
    entry_price: Option<f64>,
    indicator_valid: bool,
}

/// Writes one CSV row per bar: date, close, action, exit reason, the
/// position after the bar and its entry price.
pub struct CsvSignalWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> CsvSignalWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
            rows: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W, SigtraderError> {
        self.writer.into_inner().map_err(|e| SigtraderError::Sink {
            reason: format!("failed to flush CSV writer: {}", e.error()),
        })
    }
}

impl<W: Write> SignalSink for CsvSignalWriter<W> {
    fn record(&mut self, signal: &BarSignal, reading: &IndicatorPoint) -> Result<(), SigtraderError> {
        let record = SignalRecord {
            date: signal.date.format("%Y-%m-%d").to_string(),
            close: signal.close,
            action: signal.action.label(),
            reason: signal.action.exit_reason().map(|r| r.to_string()),
            position: signal.position.side().to_string(),
            entry_price: signal.position.entry_price(),
            indicator_valid: reading.valid,
        };
        self.writer.serialize(record).map_err(sink_error)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SigtraderError> {
        self.writer.flush().map_err(|e| SigtraderError::Sink {
            reason: format!("failed to flush signal output: {e}"),
        })
    }
}

fn sink_error(e: csv::Error) -> SigtraderError {
    SigtraderError::Sink {
        reason: format!("failed to write signal row: {e}"),
    }
}

/// Column names for an indicator export.
pub fn indicator_header(indicator_type: &IndicatorType) -> Vec<&'static str> {
    match indicator_type {
        IndicatorType::Dpo(_) => vec!["date", "close", "dpo", "upper", "lower"],
        IndicatorType::Macd { .. } => vec!["date", "close", "macd", "signal", "histogram"],
        IndicatorType::RsiCross { .. } => vec!["date", "close", "rsi", "rsi_short", "rsi_long"],
    }
}

/// Write `bars` alongside their indicator readings.
///
/// `series` must be index-aligned with `bars`. Undefined readings are left
/// empty. For DPO the `upper`/`lower` columns carry `threshold`/`-threshold`
/// on every row.
pub fn write_indicator_csv<W: Write>(
    out: W,
    bars: &[OhlcvBar],
    series: &IndicatorSeries,
    threshold: f64,
) -> Result<usize, SigtraderError> {
    if bars.len() != series.len() {
        return Err(SigtraderError::Data {
            reason: format!(
                "indicator series has {} values for {} bars",
                series.len(),
                bars.len()
            ),
        });
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(indicator_header(&series.indicator_type))?;

    for (bar, point) in bars.iter().zip(&series.values) {
        let mut row = vec![bar.date.format("%Y-%m-%d").to_string(), bar.close.to_string()];
        match point.value {
            IndicatorValue::Simple(v) => {
                row.push(cell(point.valid.then_some(v)));
                row.push(threshold.to_string());
                row.push((-threshold).to_string());
            }
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => {
                row.push(line.to_string());
                row.push(signal.to_string());
                row.push(histogram.to_string());
            }
            IndicatorValue::RsiCross { rsi, short, long } => {
                row.push(rsi.to_string());
                row.push(cell(short));
                row.push(cell(long));
            }
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(bars.len())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::calculate;
    use crate::domain::position::PositionState;
    use crate::domain::risk::ExitReason;
    use crate::domain::signal::Action;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                code: "TEST".into(),
                exchange: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn reading(valid: bool) -> IndicatorPoint {
        IndicatorPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            valid,
            value: IndicatorValue::Simple(0.5),
        }
    }

    #[test]
    fn signal_rows_written_with_header() {
        let mut writer = CsvSignalWriter::new(Vec::new());
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        writer
            .record(
                &BarSignal {
                    date,
                    close: 100.0,
                    action: Action::OpenLong,
                    position: PositionState::Long { entry_price: 100.0 },
                },
                &reading(true),
            )
            .unwrap();
        writer
            .record(
                &BarSignal {
                    date: date.succ_opt().unwrap(),
                    close: 97.5,
                    action: Action::Close(ExitReason::StopLoss),
                    position: PositionState::Flat,
                },
                &reading(true),
            )
            .unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.rows(), 2);

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,close,action,reason,position,entry_price,indicator_valid"
        );
        assert_eq!(lines[1], "2024-01-02,100.0,OPEN_LONG,,long,100.0,true");
        assert_eq!(lines[2], "2024-01-03,97.5,CLOSE,stop_loss,flat,,true");
    }

    #[test]
    fn dpo_export_leaves_warmup_empty() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let series = calculate(&bars, &IndicatorType::Dpo(4)).unwrap();
        let mut out = Vec::new();
        let rows = write_indicator_csv(&mut out, &bars, &series, 0.5).unwrap();
        assert_eq!(rows, 8);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,close,dpo,upper,lower");
        assert_eq!(lines[1], "2024-01-01,1,,0.5,-0.5");
        assert_eq!(lines[7], "2024-01-07,7,-1.5,0.5,-0.5");
    }

    #[test]
    fn macd_export_has_histogram() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let series = calculate(
            &bars,
            &IndicatorType::Macd {
                fast: 2,
                slow: 3,
                signal: 2,
            },
        )
        .unwrap();
        let mut out = Vec::new();
        write_indicator_csv(&mut out, &bars, &series, 0.0).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,close,macd,signal,histogram");
        assert_eq!(lines.len(), 4);
        assert!(lines[1..].iter().all(|l| l.split(',').count() == 5));
        assert!(lines[1].starts_with("2024-01-01,10,0,0,0"));
    }

    #[test]
    fn misaligned_series_rejected() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = calculate(&bars[..2], &IndicatorType::Dpo(2)).unwrap();
        let result = write_indicator_csv(Vec::new(), &bars, &series, 0.0);
        assert!(matches!(result, Err(SigtraderError::Data { .. })));
    }
}
