//! Link manager: serial connection lifecycle
//!
//! Owns the one connection to the board. Opens it lazily, waits for the
//! board to boot, and tears it down on request. It never retries on its
//! own; the caller decides when to try again.

use crate::serial_driver::{Connector, SerialConnector, SerialTransport};
use multihtu_core::{BoardConfig, DefaultBoard, MultiHtuError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Result of a fixed-length read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// All requested bytes arrived
    Complete(Vec<u8>),
    /// The read timeout elapsed first; carries what did arrive
    Short(Vec<u8>),
}

/// Serial connection lifecycle manager
pub struct LinkManager {
    port_path: String,
    connector: Box<dyn Connector>,
    transport: Option<Box<dyn SerialTransport>>,
    read_timeout: Duration,
    settle_delay: Duration,
}

impl LinkManager {
    /// Create a closed link to a real serial device
    pub fn new(port_path: impl Into<String>, debug_uart: bool) -> Self {
        Self::with_connector(
            port_path,
            Box::new(SerialConnector::<DefaultBoard>::new(debug_uart)),
        )
    }

    /// Create a closed link that opens transports through `connector`
    pub fn with_connector(port_path: impl Into<String>, connector: Box<dyn Connector>) -> Self {
        Self {
            port_path: port_path.into(),
            connector,
            transport: None,
            read_timeout: Duration::from_millis(DefaultBoard::READ_TIMEOUT_MS),
            settle_delay: Duration::from_millis(DefaultBoard::SETTLE_DELAY_MS),
        }
    }

    /// Device path this link opens
    pub fn device_path(&self) -> &str {
        &self.port_path
    }

    /// Whether a connection is currently held
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Make sure the link is open
    ///
    /// Returns `true` immediately when already open. Otherwise opens the
    /// device and waits for the board to boot. Failures are logged and leave
    /// the link closed.
    pub async fn ensure_open(&mut self) -> bool {
        if self.transport.is_some() {
            return true;
        }

        match self.connector.open(&self.port_path).await {
            Ok(transport) => {
                debug!(
                    "Port {} opened, waiting {:?} for the board to boot",
                    self.port_path, self.settle_delay
                );
                sleep(self.settle_delay).await;
                self.transport = Some(transport);
                info!("Connected to board at {}", self.port_path);
                true
            }
            Err(e) => {
                error!("Cannot open port {}: {}", self.port_path, e);
                false
            }
        }
    }

    fn transport(&mut self) -> Result<&mut Box<dyn SerialTransport>> {
        self.transport.as_mut().ok_or(MultiHtuError::NotConnected)
    }

    /// Write bytes to the board
    pub async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.transport()?.write_all(bytes).await
    }

    /// Read exactly `len` bytes or whatever arrives before the read timeout
    pub async fn read_exact(&mut self, len: usize) -> Result<ReadOutcome> {
        let timeout = self.read_timeout;
        let bytes = self.transport()?.read_up_to(len, timeout).await?;
        if bytes.len() == len {
            Ok(ReadOutcome::Complete(bytes))
        } else {
            Ok(ReadOutcome::Short(bytes))
        }
    }

    /// Drop any bytes waiting in the input buffer
    pub fn clear_input(&mut self) -> Result<()> {
        self.transport()?.clear_input_buffer()
    }

    /// Close the link; always ends closed, errors are swallowed
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!("Ignoring error while closing {}: {}", self.port_path, e);
            }
            info!("Closed port {}", self.port_path);
        }
    }
}
