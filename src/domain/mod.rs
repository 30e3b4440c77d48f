//! Core domain types and the timeline transformation pipeline.

pub mod timeline;
pub mod chart;
pub mod ohlcv;
pub mod signal;
pub mod indicator;
pub mod portfolio;
pub mod classifier;
pub mod drawdown;
pub mod processor;
pub mod performance;
pub mod returns;
pub mod trade;
pub mod run;
pub mod error;
