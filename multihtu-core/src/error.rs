//! Error types for the multiHTU21D bridge

use thiserror::Error;

/// Core error type for multiHTU21D operations
#[derive(Error, Debug)]
pub enum MultiHtuError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serial port errors (open, write, read)
    #[error("Serial port error: {0}")]
    Serial(String),

    /// The link is closed and the operation needs an open one
    #[error("Serial link is not open")]
    NotConnected,

    /// Frame decoding errors
    #[error("Frame error: expected {expected} bytes, got {actual}")]
    Frame { expected: usize, actual: usize },

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Device disconnected (USB unplugged, power cycle)
    #[error("Device disconnected: {0}")]
    DeviceDisconnected(String),
}

/// Result type alias for multiHTU21D operations
pub type Result<T> = std::result::Result<T, MultiHtuError>;

impl From<toml::de::Error> for MultiHtuError {
    fn from(err: toml::de::Error) -> Self {
        MultiHtuError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: MultiHtuError = toml_err.into();
        assert!(matches!(err, MultiHtuError::Config(_)));
    }

    #[test]
    fn test_error_display() {
        let err = MultiHtuError::Config("missing port".to_string());
        assert_eq!(format!("{}", err), "Configuration error: missing port");

        let err = MultiHtuError::Frame {
            expected: 36,
            actual: 20,
        };
        assert_eq!(format!("{}", err), "Frame error: expected 36 bytes, got 20");

        let err = MultiHtuError::NotConnected;
        assert_eq!(format!("{}", err), "Serial link is not open");

        let err = MultiHtuError::DeviceDisconnected("EOF on /dev/ttyUSB0".to_string());
        assert_eq!(format!("{}", err), "Device disconnected: EOF on /dev/ttyUSB0");
    }
}
