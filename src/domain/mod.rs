//! Core domain types and logic.

pub mod config;
pub mod error;
pub mod indicator;
pub mod notification;
pub mod reconciler;
pub mod screener;
pub mod series;
pub mod signal;
pub mod trading_day;
pub mod trend;
