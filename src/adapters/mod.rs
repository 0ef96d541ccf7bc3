//! Concrete adapter implementations for ports.

pub mod csv_quote_source;
pub mod file_config_adapter;
pub mod memory_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
pub mod stdout_notifier;
