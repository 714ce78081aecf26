//! Board definitions and configuration
//!
//! The sensor board is described by the `BoardConfig` trait: channel count,
//! serial parameters and protocol timing are all compile-time constants.
//!
//! Note: Actual hardware I/O is in the `multihtu-hardware` crate. This module
//! only contains board constants.

/// Hardware board configuration trait
///
/// # Example
///
/// ```
/// use multihtu_core::board::{BoardConfig, MultiHtu21d};
///
/// const CHANNELS: usize = MultiHtu21d::CHANNEL_COUNT;
/// const NAME: &str = MultiHtu21d::NAME;
/// ```
pub trait BoardConfig: Send + Sync + 'static {
    /// Human-readable board name
    const NAME: &'static str;

    /// Number of temperature/humidity sensor pairs
    const CHANNEL_COUNT: usize;

    /// Serial communication baud rate
    const BAUD_RATE: u32;

    /// Read timeout for a single frame, in milliseconds
    const READ_TIMEOUT_MS: u64;

    /// Delay after opening the port while the board reboots, in milliseconds
    const SETTLE_DELAY_MS: u64;

    /// Minimum spacing between two real refresh round trips, in milliseconds
    const MIN_REFRESH_INTERVAL_MS: u64;

    /// Wire values at or above this mean "sensor not present"
    const SENTINEL: f32;
}

/// multiHTU21D board: an Arduino with eight HTU21D sensors behind an I2C mux
///
/// - 8 temperature/humidity channels
/// - supply voltage and power telemetry
/// - heater and fan outputs
/// - 115200 baud serial, 8N1
pub struct MultiHtu21d;

impl BoardConfig for MultiHtu21d {
    const NAME: &'static str = "multiHTU21D";
    const CHANNEL_COUNT: usize = 8;
    const BAUD_RATE: u32 = 115200;
    const READ_TIMEOUT_MS: u64 = 3000;
    const SETTLE_DELAY_MS: u64 = 3000;
    const MIN_REFRESH_INTERVAL_MS: u64 = 5000;
    const SENTINEL: f32 = 255.0;
}

/// Default board type used throughout the codebase
pub type DefaultBoard = MultiHtu21d;

/// Number of sensor channels on the default board
pub const CHANNEL_COUNT: usize = DefaultBoard::CHANNEL_COUNT;
