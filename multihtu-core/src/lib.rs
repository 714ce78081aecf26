//! multiHTU21D Core Library
//!
//! Shared types, frame decoding and configuration for the multiHTU21D
//! sensor board bridge. Used by the hardware driver and the daemon.

pub mod board;
pub mod config;
pub mod error;
pub mod frame;
pub mod types;

// Re-export commonly used types
pub use board::*;
pub use config::{default_config_path, BoardSection, PollConfig, StaticConfig};
pub use error::*;
pub use frame::{Frame, FRAME_LEN, FRAME_SLOTS};
pub use types::*;
