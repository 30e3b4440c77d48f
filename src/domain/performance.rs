//! Performance summary and its numeric display projection.

use serde::{Deserialize, Serialize};

use super::error::VizError;
use super::trade::TradeRecord;

/// Per-period return entry (monthly or yearly).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub period: String,
    pub period_type: String,
    pub start_date: String,
    pub end_date: String,
    pub start_equity: String,
    pub end_equity: String,
    pub return_pct: String,
    pub num_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
}

/// `performance.json`. Decimal values are string-encoded by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub backtest_id: String,
    pub start_date: String,
    pub end_date: String,
    pub duration_days: i64,
    pub initial_equity: String,
    pub final_equity: String,
    pub total_return_pct: String,
    pub cagr: String,
    #[serde(default)]
    pub best_day_return_pct: Option<String>,
    #[serde(default)]
    pub worst_day_return_pct: Option<String>,
    pub volatility_annual_pct: String,
    pub max_drawdown_pct: String,
    #[serde(default)]
    pub max_drawdown_duration_days: i64,
    #[serde(default)]
    pub avg_drawdown_pct: Option<String>,
    #[serde(default)]
    pub current_drawdown_pct: Option<String>,
    pub sharpe_ratio: String,
    pub sortino_ratio: String,
    pub calmar_ratio: String,
    #[serde(default)]
    pub risk_free_rate: Option<String>,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate: String,
    pub profit_factor: String,
    pub avg_win: String,
    pub avg_loss: String,
    #[serde(default)]
    pub avg_win_pct: Option<String>,
    #[serde(default)]
    pub avg_loss_pct: Option<String>,
    pub largest_win: String,
    pub largest_loss: String,
    #[serde(default)]
    pub largest_win_pct: Option<String>,
    #[serde(default)]
    pub largest_loss_pct: Option<String>,
    pub expectancy: String,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    pub avg_trade_duration_days: String,
    #[serde(default)]
    pub total_commissions: Option<String>,
    #[serde(default)]
    pub commission_pct_of_pnl: Option<String>,
    #[serde(default)]
    pub monthly_returns: Vec<PeriodReturn>,
    #[serde(default)]
    pub yearly_returns: Option<Vec<PeriodReturn>>,
    #[serde(default)]
    pub trades: Option<Vec<TradeRecord>>,
}

/// Numeric display values. One field per summary field; no derived values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub expectancy: f64,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    pub avg_trade_duration: f64,
}

/// Parse a string-encoded decimal. Surrounding whitespace is ignored;
/// anything else that is not a finite number is an error.
pub fn parse_decimal(field: &str, value: &str) -> Result<f64, VizError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| VizError::metric(field, value))
}

/// Coerce every string field; any failure fails the whole call.
pub fn format_performance_metrics(p: &Performance) -> Result<FormattedMetrics, VizError> {
    Ok(FormattedMetrics {
        total_return: parse_decimal("total_return_pct", &p.total_return_pct)?,
        cagr: parse_decimal("cagr", &p.cagr)?,
        sharpe_ratio: parse_decimal("sharpe_ratio", &p.sharpe_ratio)?,
        sortino_ratio: parse_decimal("sortino_ratio", &p.sortino_ratio)?,
        calmar_ratio: parse_decimal("calmar_ratio", &p.calmar_ratio)?,
        max_drawdown: parse_decimal("max_drawdown_pct", &p.max_drawdown_pct)?,
        volatility: parse_decimal("volatility_annual_pct", &p.volatility_annual_pct)?,
        win_rate: parse_decimal("win_rate", &p.win_rate)?,
        profit_factor: parse_decimal("profit_factor", &p.profit_factor)?,
        total_trades: p.total_trades,
        winning_trades: p.winning_trades,
        losing_trades: p.losing_trades,
        avg_win: parse_decimal("avg_win", &p.avg_win)?,
        avg_loss: parse_decimal("avg_loss", &p.avg_loss)?,
        largest_win: parse_decimal("largest_win", &p.largest_win)?,
        largest_loss: parse_decimal("largest_loss", &p.largest_loss)?,
        expectancy: parse_decimal("expectancy", &p.expectancy)?,
        max_consecutive_wins: p.max_consecutive_wins,
        max_consecutive_losses: p.max_consecutive_losses,
        avg_trade_duration: parse_decimal("avg_trade_duration_days", &p.avg_trade_duration_days)?,
    })
}
