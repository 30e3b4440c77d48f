//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_export_adapter::JsonExportAdapter;
use crate::adapters::run_dir_adapter::{RunDirAdapter, TimelineFormat, DEFAULT_TIMELINE_FILE};
use crate::domain::chart::signal_markers;
use crate::domain::drawdown::{drawdown_periods, max_drawdown, top_recovered};
use crate::domain::error::VizError;
use crate::domain::performance::{format_performance_metrics, FormattedMetrics};
use crate::domain::processor::{process_timeline, ProcessedBacktestData};
use crate::domain::returns::{monthly_returns_grid, MONTH_NAMES};
use crate::domain::run::{display_name, BacktestRun};
use crate::domain::trade::{format_trades, TradeRow};
use crate::ports::config_port::ConfigPort;
use crate::ports::export_port::{ExportPort, RunExport};
use crate::ports::run_port::RunPort;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Parser, Debug)]
#[command(name = "qtviz", about = "Backtest run visualisation data tool")]
pub struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List runs under the runs directory
    ListRuns {
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show run info and performance metrics
    Summary {
        #[arg(short, long)]
        run: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Classify the timeline and export display-ready series as JSON
    Process {
        #[arg(short, long)]
        run: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Keep bars in input order without per-second dedup
        #[arg(long)]
        raw: bool,
        /// Write single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Show the deepest recovered drawdowns
    Drawdowns {
        #[arg(short, long)]
        run: PathBuf,
        #[arg(short, long, value_parser = parse_top)]
        top: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the monthly returns grid
    Returns {
        #[arg(short, long)]
        run: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the closed trades table
    Trades {
        #[arg(short, long)]
        run: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn parse_top(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Command {
    fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::ListRuns { config, .. }
            | Command::Summary { config, .. }
            | Command::Process { config, .. }
            | Command::Drawdowns { config, .. }
            | Command::Returns { config, .. }
            | Command::Trades { config, .. } => config.as_ref(),
        }
    }
}

/// Settings resolved from the optional config file.
#[derive(Debug, Clone, PartialEq)]
pub struct VizSettings {
    pub runs_dir: Option<PathBuf>,
    pub timeline_file: PathBuf,
    pub dedup_bars: bool,
    pub top_drawdowns: usize,
    pub log_level: String,
}

impl Default for VizSettings {
    fn default() -> Self {
        Self {
            runs_dir: None,
            timeline_file: PathBuf::from(DEFAULT_TIMELINE_FILE),
            dedup_bars: true,
            top_drawdowns: 10,
            log_level: "warn".into(),
        }
    }
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<VizSettings, VizError> {
    let defaults = VizSettings::default();

    let timeline_file = config
        .get_string("timeline", "file")
        .map(|f| PathBuf::from(f.trim()))
        .unwrap_or(defaults.timeline_file);
    if TimelineFormat::from_path(&timeline_file).is_none() {
        return Err(VizError::ConfigInvalid {
            section: "timeline".into(),
            key: "file".into(),
            reason: "expected a .csv or .json file".into(),
        });
    }

    let top = config.get_int("chart", "top_drawdowns", defaults.top_drawdowns as i64)?;
    if top <= 0 {
        return Err(VizError::ConfigInvalid {
            section: "chart".into(),
            key: "top_drawdowns".into(),
            reason: "must be positive".into(),
        });
    }

    let log_level = config
        .get_string("logging", "level")
        .map(|l| l.trim().to_lowercase())
        .unwrap_or(defaults.log_level);
    if !LOG_LEVELS.contains(&log_level.as_str()) {
        return Err(VizError::ConfigInvalid {
            section: "logging".into(),
            key: "level".into(),
            reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
        });
    }

    Ok(VizSettings {
        runs_dir: config
            .get_string("runs", "dir")
            .filter(|d| !d.trim().is_empty())
            .map(|d| PathBuf::from(d.trim())),
        timeline_file,
        dedup_bars: config.get_bool("chart", "dedup_bars", defaults.dedup_bars)?,
        top_drawdowns: top as usize,
        log_level,
    })
}

pub fn load_settings(config_path: Option<&PathBuf>) -> Result<VizSettings, VizError> {
    match config_path {
        Some(path) => build_settings(&FileConfigAdapter::from_file(path)?),
        None => Ok(VizSettings::default()),
    }
}

/// RUST_LOG wins, then `--log-level`, then `[logging] level`.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn fail(err: VizError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(cli.command.config_path()) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    init_logging(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    let result = match cli.command {
        Command::ListRuns { dir, .. } => run_list_runs(dir.as_deref(), &settings),
        Command::Summary { run, .. } => run_summary(&run, &settings),
        Command::Process {
            run,
            output,
            raw,
            compact,
            ..
        } => run_process(&run, output.as_deref(), raw, compact, &settings),
        Command::Drawdowns { run, top, .. } => run_drawdowns(&run, top, &settings),
        Command::Returns { run, .. } => run_returns(&run, &settings),
        Command::Trades { run, .. } => run_trades(&run, &settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

/// Resolve `--run` to an adapter and run id. An existing directory is used
/// directly; otherwise the argument is a run id under `[runs] dir`.
pub fn resolve_run(run: &Path, settings: &VizSettings) -> Result<(RunDirAdapter, String), VizError> {
    let (base, id) = if run.is_dir() {
        let id = run
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| VizError::RunNotFound {
                path: run.display().to_string(),
            })?;
        let base = run
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (base, id)
    } else if let Some(dir) = &settings.runs_dir {
        (dir.clone(), run.display().to_string())
    } else {
        return Err(VizError::RunNotFound {
            path: run.display().to_string(),
        });
    };

    let adapter = RunDirAdapter::new(base).with_timeline_file(settings.timeline_file.clone());
    Ok((adapter, id))
}

/// Load a run and push its timeline through the pipeline.
pub fn load_processed_run(
    port: &dyn RunPort,
    run_id: &str,
) -> Result<(BacktestRun, ProcessedBacktestData), VizError> {
    tracing::info!(run = run_id, "loading run");
    let run = port.load_run(run_id)?;
    let rows = port.load_timeline(run_id)?;
    let trades = run.performance.trades.clone().unwrap_or_default();
    let data = process_timeline(&rows, trades)?;
    Ok((run, data))
}

fn run_list_runs(dir: Option<&Path>, settings: &VizSettings) -> Result<(), VizError> {
    let base = dir
        .map(Path::to_path_buf)
        .or_else(|| settings.runs_dir.clone())
        .ok_or_else(|| VizError::ConfigMissing {
            section: "runs".into(),
            key: "dir".into(),
        })?;

    let runs = RunDirAdapter::new(base.clone()).list_runs()?;
    if runs.is_empty() {
        eprintln!("No runs found in {}", base.display());
    }
    for run in &runs {
        println!("{}\t{}", run.id, run.display_name());
    }
    Ok(())
}

pub fn format_summary(run_id: &str, run: &BacktestRun, metrics: &FormattedMetrics) -> String {
    let m = &run.manifest;
    let mut out = String::new();
    out.push_str(&format!("Run:              {} ({})\n", run_id, display_name(run_id)));
    out.push_str(&format!("Status:           {}\n", m.status));
    out.push_str(&format!("Duration:         {:.1}s\n", m.metrics.duration_seconds));
    out.push_str(&format!("Bars:             {}\n", m.metrics.bars_processed));
    out.push_str(&format!("Version:          {}\n", m.environment.qtrader_version));
    out.push_str(&format!(
        "Period:           {} to {}\n",
        run.metadata.backtest.start_date, run.metadata.backtest.end_date
    ));
    out.push_str("\n=== Performance ===\n");
    out.push_str(&format!("Total Return:     {:.2}%\n", metrics.total_return));
    out.push_str(&format!("CAGR:             {:.2}%\n", metrics.cagr));
    out.push_str(&format!("Sharpe Ratio:     {:.2}\n", metrics.sharpe_ratio));
    out.push_str(&format!("Sortino Ratio:    {:.2}\n", metrics.sortino_ratio));
    out.push_str(&format!("Max Drawdown:     -{:.2}%\n", metrics.max_drawdown));
    out.push_str(&format!("Win Rate:         {:.2}%\n", metrics.win_rate));
    out.push_str(&format!("Profit Factor:    {:.2}\n", metrics.profit_factor));
    out.push_str(&format!("Total Trades:     {}\n", metrics.total_trades));
    out.push_str(&format!("Expectancy:       ${:.2}\n", metrics.expectancy));
    if let Some(err) = &m.error {
        out.push_str(&format!("\nRun error: {err}\n"));
    }
    out
}

fn run_summary(run: &Path, settings: &VizSettings) -> Result<(), VizError> {
    let (adapter, id) = resolve_run(run, settings)?;
    let backtest = adapter.load_run(&id)?;
    let metrics = format_performance_metrics(&backtest.performance)?;
    print!("{}", format_summary(&id, &backtest, &metrics));
    Ok(())
}

fn run_process(
    run: &Path,
    output: Option<&Path>,
    raw: bool,
    compact: bool,
    settings: &VizSettings,
) -> Result<(), VizError> {
    let (adapter, id) = resolve_run(run, settings)?;
    let (backtest, data) = load_processed_run(&adapter, &id)?;
    let metrics = format_performance_metrics(&backtest.performance)?;

    let data = if settings.dedup_bars && !raw {
        data.chart_ready()
    } else {
        data
    };

    eprintln!("Processed {} rows:", data.stats.rows);
    eprintln!("  bars:        {}", data.ohlcv.len());
    eprintln!(
        "  signals:     {} ({} before dedup)",
        data.signals.len(),
        data.stats.raw_signals
    );
    eprintln!("  equity:      {}", data.equity.len());
    eprintln!("  indicators:  {}", data.indicators.len());
    eprintln!("  dropped:     {}", data.stats.dropped_rows);
    eprintln!("  max drawdown {:.2}%", max_drawdown(&data.drawdown));

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{id}.json")));
    let markers = signal_markers(&data.signals);
    let export = RunExport {
        run_id: &id,
        metrics: &metrics,
        data: &data,
        markers: &markers,
    };
    JsonExportAdapter::new(!compact).export(&export, &output)?;
    eprintln!("\nExport written to: {}", output.display());
    Ok(())
}

fn run_drawdowns(run: &Path, top: Option<usize>, settings: &VizSettings) -> Result<(), VizError> {
    let (adapter, id) = resolve_run(run, settings)?;
    let (_, data) = load_processed_run(&adapter, &id)?;
    let periods = drawdown_periods(&data.equity);
    let top = top_recovered(&periods, top.unwrap_or(settings.top_drawdowns));

    if top.is_empty() {
        eprintln!("No recovered drawdowns in {}", id);
        return Ok(());
    }
    println!("Start\tTrough\tEnd\tDepth %\tDuration\tRecovery\tPeak\tTrough Equity");
    for p in &top {
        println!(
            "{}\t{}\t{}\t-{:.2}%\t{} days\t{} days\t{:.2}\t{:.2}",
            p.start.format("%Y-%m-%d"),
            p.trough.format("%Y-%m-%d"),
            p.end.map(|e| e.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".into()),
            p.depth_pct,
            p.duration_days,
            p.recovery_days.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            p.peak_equity,
            p.trough_equity,
        );
    }
    Ok(())
}

fn run_returns(run: &Path, settings: &VizSettings) -> Result<(), VizError> {
    let (adapter, id) = resolve_run(run, settings)?;
    let performance = adapter.load_performance(&id)?;
    let grid = monthly_returns_grid(&performance.monthly_returns)?;
    if grid.is_empty() {
        eprintln!("No monthly returns in {}", id);
        return Ok(());
    }

    println!("Year\t{}\tYTD", MONTH_NAMES.join("\t"));
    for year in &grid {
        let cells: Vec<String> = year
            .months
            .iter()
            .map(|m| m.map(|r| format!("{:.2}", r * 100.0)).unwrap_or_else(|| "-".into()))
            .collect();
        println!("{}\t{}\t{:.2}", year.year, cells.join("\t"), year.ytd_pct);
    }
    Ok(())
}

pub fn format_trades_table(trades: &[TradeRow]) -> String {
    let mut out = String::from(
        "ID\tSymbol\tSide\tEntry\tExit\tEntry Px\tExit Px\tQty\tP&L\tP&L %\tDays\n",
    );
    for t in trades {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}\t{:.2}\t{:.2}%\t{}\n",
            t.trade_id,
            t.symbol,
            t.side,
            t.entry.format("%Y-%m-%d"),
            t.exit.format("%Y-%m-%d"),
            t.entry_price,
            t.exit_price,
            t.quantity,
            t.pnl,
            t.pnl_pct,
            t.duration_days,
        ));
    }
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let total: f64 = trades.iter().map(|t| t.pnl).sum();
    out.push_str(&format!(
        "\n{} trades, {} winners, total P&L {:.2}\n",
        trades.len(),
        wins,
        total
    ));
    out
}

fn run_trades(run: &Path, settings: &VizSettings) -> Result<(), VizError> {
    let (adapter, id) = resolve_run(run, settings)?;
    let performance = adapter.load_performance(&id)?;
    let trades = format_trades(performance.trades.as_deref().unwrap_or_default())?;
    if trades.is_empty() {
        eprintln!("No trades in {}", id);
        return Ok(());
    }
    print!("{}", format_trades_table(&trades));
    Ok(())
}
