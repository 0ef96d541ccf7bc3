//! Prints notifications to standard output.

use crate::domain::error::TrendwatchError;
use crate::domain::notification::{NotificationLog, SymbolNotification};
use crate::ports::notification_port::NotificationSink;
use std::io::Write;

#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl StdoutNotifier {
    pub fn new() -> Self {
        Self
    }

    fn line(note: &SymbolNotification, kind: &str) -> String {
        let s = &note.snapshot;
        let cmf = match s.cmf15 {
            Some(v) => format!("{:.4}", v),
            None => "n/a".to_string(),
        };
        format!(
            "{:<6} {:<22} {} close={:.2} volume={} sma10={:.2} ema20={:.2} ema30={:.2} cmf15={}",
            note.symbol, kind, s.date, s.close, s.volume, s.sma10, s.ema20, s.ema30, cmf
        )
    }

    /// One line per (symbol, kind), symbols in order.
    pub fn render(log: &NotificationLog) -> Vec<String> {
        log.iter()
            .flat_map(|note| {
                note.kinds
                    .iter()
                    .map(move |kind| Self::line(note, &kind.to_string()))
            })
            .collect()
    }
}

impl NotificationSink for StdoutNotifier {
    fn publish(&self, log: &NotificationLog) -> Result<(), TrendwatchError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if log.is_empty() {
            writeln!(out, "No trend changes.")?;
            return Ok(());
        }
        for line in Self::render(log) {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}
