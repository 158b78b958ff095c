//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_signal_writer::{write_indicator_csv, CsvSignalWriter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{parse_date, validate_run_config, validate_strategy_config};
use crate::domain::error::SigtraderError;
use crate::domain::indicator::{self, rsi::ZeroLossPolicy};
use crate::domain::ohlcv::{filter_traded, OhlcvBar};
use crate::domain::risk::{RiskConfig, DEFAULT_STOP_LOSS_PCT, DEFAULT_TAKE_PROFIT_PCT};
use crate::domain::run::{run_strategy, RunConfig, RunSummary};
use crate::domain::strategy::{StrategyConfig, StrategyKind};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

const DEFAULT_DATA_PATH: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Indicator-driven long/short signal generator")]
pub struct Cli {
    /// Log every entry, exit and suppressed short
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the strategy and write one action per bar as CSV
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
    },
    /// Export the strategy's indicator series as CSV
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        /// Drop zero-volume bars before computing
        #[arg(long)]
        traded_only: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List available symbols on an exchange
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        exchange: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signals {
            config,
            output,
            code,
            exchange,
        } => run_signals(&config, output.as_ref(), code.as_deref(), exchange.as_deref()),
        Command::Indicators {
            config,
            output,
            code,
            exchange,
            traded_only,
        } => run_indicators(
            &config,
            output.as_ref(),
            code.as_deref(),
            exchange.as_deref(),
            traded_only,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, exchange } => run_list_symbols(&config, &exchange),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &SigtraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_signals(
    config_path: &Path,
    output_path: Option<&PathBuf>,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let (run_config, strategy) = match prepare(&adapter, code_override, exchange_override) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    eprintln!("Loading strategy: {} {}", strategy.name, strategy.kind);

    // Stage 2: Fetch bars
    let bars = match load_bars(&adapter, &run_config) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    eprintln!(
        "Generating signals: {} on {}, {} bars, {} to {}",
        run_config.code,
        run_config.exchange,
        bars.len(),
        run_config.start_date,
        run_config.end_date,
    );

    // Stage 3: Run the engine into the CSV sink
    let out = match open_output(output_path) {
        Ok(o) => o,
        Err(e) => return fail(&e),
    };
    let mut writer = CsvSignalWriter::new(out);
    let summary = match run_strategy(&bars, &strategy, &mut writer) {
        Ok((_, summary)) => summary,
        Err(e) => return fail(&e),
    };

    // Stage 4: Summary
    print_summary(&summary);
    if let Some(path) = output_path {
        eprintln!("Signals written to {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_indicators(
    config_path: &Path,
    output_path: Option<&PathBuf>,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
    traded_only: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let (run_config, strategy) = match prepare(&adapter, code_override, exchange_override) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let mut bars = match load_bars(&adapter, &run_config) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    if traded_only {
        let before = bars.len();
        bars = filter_traded(&bars);
        eprintln!("Dropped {} zero-volume bars", before - bars.len());
    }

    let series = match indicator::calculate(&bars, &strategy.kind.indicator_type()) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let threshold = match strategy.kind {
        StrategyKind::Dpo { threshold, .. } => threshold,
        _ => 0.0,
    };

    let out = match open_output(output_path) {
        Ok(o) => o,
        Err(e) => return fail(&e),
    };
    match write_indicator_csv(out, &bars, &series, threshold) {
        Ok(rows) => {
            eprintln!("{}: {} rows exported", series.indicator_type, rows);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (run_config, strategy) = match prepare(&adapter, None, None) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    eprintln!("\nData:");
    eprintln!("  path:     {}", data_path(&adapter).display());
    eprintln!("  symbol:   {} on {}", run_config.code, run_config.exchange);
    eprintln!("  range:    {} to {}", run_config.start_date, run_config.end_date);

    eprintln!("\nStrategy:");
    eprintln!("  name:      {}", strategy.name);
    eprintln!("  kind:      {}", strategy.kind);
    eprintln!("  indicator: {}", strategy.kind.indicator_type());

    let risk = &strategy.risk;
    eprintln!("\nRisk:");
    eprintln!(
        "  stop-loss:   {:.2}% ({})",
        risk.stop_loss_pct,
        on_off(risk.enable_stop_loss)
    );
    eprintln!(
        "  take-profit: {:.2}% ({})",
        risk.take_profit_pct,
        on_off(risk.enable_take_profit)
    );
    eprintln!("  shorting:    {}", on_off(risk.enable_shorting));

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path, exchange: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_port = CsvAdapter::new(data_path(&config));
    let symbols = match data_port.list_symbols(exchange) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found for exchange {}", exchange);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

/// Validate everything a run reads, then build the immutable run values.
fn prepare(
    adapter: &dyn ConfigPort,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
) -> Result<(RunConfig, StrategyConfig), SigtraderError> {
    validate_run_config(adapter, code_override, exchange_override)?;
    validate_strategy_config(adapter)?;
    let run_config = build_run_config(adapter, code_override, exchange_override)?;
    let strategy = build_strategy_config(adapter)?;
    Ok((run_config, strategy))
}

/// Directory holding the `<code>_<exchange>.csv` files.
pub fn data_path(adapter: &dyn ConfigPort) -> PathBuf {
    adapter
        .get_string("data", "path")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

pub fn build_run_config(
    adapter: &dyn ConfigPort,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
) -> Result<RunConfig, SigtraderError> {
    let start_date = parse_date(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    let code = resolve(code_override, adapter, "code")?.to_uppercase();
    let exchange = resolve(exchange_override, adapter, "exchange")?;

    Ok(RunConfig {
        code,
        exchange,
        start_date,
        end_date,
    })
}

fn resolve(
    override_value: Option<&str>,
    adapter: &dyn ConfigPort,
    key: &str,
) -> Result<String, SigtraderError> {
    override_value
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", key))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "backtest".into(),
            key: key.into(),
        })
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, SigtraderError> {
    let kind_name = adapter.get_string("strategy", "kind").ok_or_else(|| {
        SigtraderError::ConfigMissing {
            section: "strategy".into(),
            key: "kind".into(),
        }
    })?;

    let kind = match kind_name.parse::<StrategyKind>()? {
        StrategyKind::Dpo { period, threshold } => StrategyKind::Dpo {
            period: get_period(adapter, "dpo", "period", period)?,
            threshold: adapter.get_double("dpo", "threshold", threshold),
        },
        StrategyKind::Macd { fast, slow, signal } => StrategyKind::Macd {
            fast: get_period(adapter, "macd", "fast", fast)?,
            slow: get_period(adapter, "macd", "slow", slow)?,
            signal: get_period(adapter, "macd", "signal", signal)?,
        },
        StrategyKind::RsiCross {
            period,
            short_sma,
            long_sma,
            zero_loss,
        } => StrategyKind::RsiCross {
            period: get_period(adapter, "rsi_cross", "period", period)?,
            short_sma: get_period(adapter, "rsi_cross", "short_sma", short_sma)?,
            long_sma: get_period(adapter, "rsi_cross", "long_sma", long_sma)?,
            zero_loss: match adapter.get_string("rsi_cross", "zero_loss") {
                Some(raw) => raw.parse::<ZeroLossPolicy>().map_err(|reason| {
                    SigtraderError::ConfigInvalid {
                        section: "rsi_cross".into(),
                        key: "zero_loss".into(),
                        reason,
                    }
                })?,
                None => zero_loss,
            },
        },
    };

    let risk = RiskConfig {
        stop_loss_pct: adapter.get_double("risk", "stop_loss_pct", DEFAULT_STOP_LOSS_PCT),
        take_profit_pct: adapter.get_double("risk", "take_profit_pct", DEFAULT_TAKE_PROFIT_PCT),
        enable_shorting: adapter.get_bool("risk", "enable_shorting", true),
        enable_stop_loss: adapter.get_bool("risk", "enable_stop_loss", true),
        enable_take_profit: adapter.get_bool("risk", "enable_take_profit", true),
    };

    let mut config = StrategyConfig::new(kind, risk);
    if let Some(name) = adapter
        .get_string("strategy", "name")
        .filter(|s| !s.trim().is_empty())
    {
        config.name = name;
    }
    config.validate()?;
    Ok(config)
}

fn get_period(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SigtraderError> {
    let value = adapter.get_int(section, key, default as i64);
    usize::try_from(value).map_err(|_| SigtraderError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{key} must be at least 1"),
    })
}

fn load_bars(adapter: &dyn ConfigPort, run: &RunConfig) -> Result<Vec<OhlcvBar>, SigtraderError> {
    let data_port = CsvAdapter::new(data_path(adapter));
    let bars = data_port.fetch_ohlcv(&run.code, &run.exchange, run.start_date, run.end_date)?;
    if bars.is_empty() {
        return Err(SigtraderError::NoData {
            code: run.code.clone(),
            exchange: run.exchange.clone(),
        });
    }
    Ok(bars)
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, SigtraderError> {
    match path {
        Some(p) => {
            let file = File::create(p)?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\n=== Signal Summary ===");
    eprintln!("Bars processed:    {}", summary.bars);
    eprintln!("Long entries:      {}", summary.long_entries);
    eprintln!("Short entries:     {}", summary.short_entries);
    eprintln!("Stop-loss exits:   {}", summary.stop_loss_exits);
    eprintln!("Take-profit exits: {}", summary.take_profit_exits);
    eprintln!("Suppressed shorts: {}", summary.suppressed_shorts);
    match summary.open_at_end.and_then(|p| p.entry_price().map(|e| (p.side(), e))) {
        Some((side, entry)) => eprintln!("Open at end:       {} @ {:.2}", side, entry),
        None => eprintln!("Open at end:       none"),
    }
}
