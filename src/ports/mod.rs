//! Port traits the domain depends on; adapters implement them.

pub mod config_port;
pub mod notification_port;
pub mod quote_port;
pub mod store_port;
