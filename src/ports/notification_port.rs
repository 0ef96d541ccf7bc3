//! Notification sink port trait.

use crate::domain::error::TrendwatchError;
use crate::domain::notification::NotificationLog;

/// Consumes the notifications collected during one run.
pub trait NotificationSink {
    fn publish(&self, log: &NotificationLog) -> Result<(), TrendwatchError>;
}
