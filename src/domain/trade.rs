//! Closed trades as reported in the performance summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::VizError;
use super::performance::parse_decimal;
use super::timeline::parse_timestamp;

/// A trade exactly as the engine wrote it. Decimal fields are strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: String,
    #[serde(default)]
    pub strategy_id: String,
    pub symbol: String,
    pub side: String,
    pub entry_timestamp: String,
    pub exit_timestamp: String,
    pub entry_price: String,
    pub exit_price: String,
    pub quantity: String,
    pub realized_pnl: String,
    pub realized_pnl_pct: String,
    pub duration_days: i64,
    #[serde(default)]
    pub commission: Option<String>,
}

/// Numeric view of a [`TradeRecord`] for tabular display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub trade_id: String,
    pub symbol: String,
    pub side: String,
    pub entry: DateTime<Utc>,
    pub exit: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub duration_days: i64,
}

impl TradeRow {
    pub fn is_win(&self) -> bool {
        self.pnl >= 0.0
    }
}

fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>, VizError> {
    parse_timestamp(value).ok_or_else(|| VizError::metric(field, value))
}

impl TryFrom<&TradeRecord> for TradeRow {
    type Error = VizError;

    fn try_from(t: &TradeRecord) -> Result<Self, Self::Error> {
        Ok(TradeRow {
            trade_id: t.trade_id.clone(),
            symbol: t.symbol.clone(),
            side: t.side.clone(),
            entry: parse_instant("entry_timestamp", &t.entry_timestamp)?,
            exit: parse_instant("exit_timestamp", &t.exit_timestamp)?,
            entry_price: parse_decimal("entry_price", &t.entry_price)?,
            exit_price: parse_decimal("exit_price", &t.exit_price)?,
            quantity: parse_decimal("quantity", &t.quantity)?,
            pnl: parse_decimal("realized_pnl", &t.realized_pnl)?,
            pnl_pct: parse_decimal("realized_pnl_pct", &t.realized_pnl_pct)?,
            duration_days: t.duration_days,
        })
    }
}

/// Format every trade; the first unparseable field fails the whole call.
pub fn format_trades(trades: &[TradeRecord]) -> Result<Vec<TradeRow>, VizError> {
    trades.iter().map(TradeRow::try_from).collect()
}
