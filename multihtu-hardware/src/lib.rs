//! multihtu-hardware
//!
//! Hardware crate containing the low-level serial driver, the link manager
//! that owns the connection lifecycle, and the board driver that speaks the
//! multiHTU21D protocol.
//!
//! Public API:
//! - `board_driver::BoardDriver`: throttled refresh, readings, actuators
//! - `link_manager::LinkManager`: open / close / read / write on one link
//! - `serial_driver::SerialDriver`: low-level serial I/O driver

pub mod board_driver;
pub mod link_manager;
pub mod serial_driver;

#[cfg(test)]
mod mock_serial;

pub use board_driver::{BoardDriver, Command};
pub use link_manager::{LinkManager, ReadOutcome};
pub use serial_driver::{Connector, SerialConnector, SerialDriver, SerialTransport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_present() {
        let _ = std::any::TypeId::of::<BoardDriver>();
        let _ = std::any::TypeId::of::<LinkManager>();
        let _ = std::any::TypeId::of::<SerialDriver>();
    }

    #[test]
    fn board_driver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BoardDriver>();
    }
}
