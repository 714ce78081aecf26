//! Configuration types for multiHTU21D
//!
//! A single [`StaticConfig`] is read once at startup. The only option the
//! driver itself consumes is the serial device path; the rest configures
//! the daemon around it.

mod paths;
mod static_config;

pub use paths::default_config_path;
pub use static_config::{BoardSection, PollConfig, StaticConfig};
