//! Serial driver for low-level hardware communication
//!
//! Provides async serial I/O with the sensor board over `tokio-serial`.

use async_trait::async_trait;
use multihtu_core::{BoardConfig, MultiHtuError, Result};
use std::marker::PhantomData;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{timeout, timeout_at, Instant};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, warn};

/// Trait for serial transport abstraction
///
/// This trait enables testing of the link and board logic without real
/// hardware by allowing mock implementations.
#[async_trait]
pub trait SerialTransport: Send {
    /// Write all bytes and flush
    async fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read up to `len` bytes, stopping early when `deadline` passes
    ///
    /// Returns the bytes received so far on timeout; only EOF and OS errors
    /// are reported as `Err`.
    async fn read_up_to(&mut self, len: usize, deadline: Duration) -> Result<Vec<u8>>;

    /// Clear the input buffer
    fn clear_input_buffer(&mut self) -> Result<()>;

    /// Flush pending output before the port is dropped
    async fn close(&mut self) -> Result<()>;
}

/// Opens transports for a device path
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open the device and return a ready transport
    async fn open(&self, port_path: &str) -> Result<Box<dyn SerialTransport>>;
}

/// Serial driver for hardware communication
pub struct SerialDriver<B: BoardConfig = multihtu_core::DefaultBoard> {
    port: SerialStream,
    port_path: String,
    timeout_duration: Duration,
    debug_uart: bool,
    _board: PhantomData<B>,
}

impl<B: BoardConfig> SerialDriver<B> {
    /// Create a new serial driver
    ///
    /// # Arguments
    /// * `port_path` - Path to the serial device (e.g., "/dev/ttyUSB0")
    /// * `debug_uart` - Enable UART debug logging
    pub fn new(port_path: &str, debug_uart: bool) -> Result<Self> {
        debug!("Opening {} serial port: {}", B::NAME, port_path);

        let timeout_duration = Duration::from_millis(B::READ_TIMEOUT_MS);
        let port = tokio_serial::new(port_path, B::BAUD_RATE)
            .timeout(timeout_duration)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                error!("Failed to open serial port {}: {}", port_path, e);
                MultiHtuError::Serial(format!("Failed to open serial port: {}", e))
            })?;

        debug!("Serial port opened successfully");

        if debug_uart {
            debug!("UART debug logging enabled");
        }

        Ok(Self {
            port,
            port_path: port_path.to_string(),
            timeout_duration,
            debug_uart,
            _board: PhantomData,
        })
    }
}

#[async_trait]
impl<B: BoardConfig> SerialTransport for SerialDriver<B> {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        if self.debug_uart {
            debug!("TX {}: {:02X?}", self.port_path, bytes);
        }

        timeout(self.timeout_duration, self.port.write_all(bytes))
            .await
            .map_err(|_| {
                error!("Write timeout");
                MultiHtuError::Timeout("Write operation timed out".to_string())
            })?
            .map_err(|e| {
                error!("Write failed: {}", e);
                MultiHtuError::Serial(format!("Write failed: {}", e))
            })?;

        // Flush to ensure data is sent
        timeout(self.timeout_duration, self.port.flush())
            .await
            .map_err(|_| MultiHtuError::Timeout("Flush operation timed out".to_string()))?
            .map_err(|e| MultiHtuError::Serial(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    async fn read_up_to(&mut self, len: usize, deadline: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + deadline;
        let mut buf = vec![0u8; len];
        let mut filled = 0;

        while filled < len {
            match timeout_at(deadline, self.port.read(&mut buf[filled..])).await {
                Err(_) => {
                    debug!("Read timeout after {} of {} bytes", filled, len);
                    break;
                }
                Ok(Ok(0)) => {
                    // EOF indicates device disconnection (USB unplugged, power loss, etc.)
                    warn!(
                        "Serial port {} returned EOF - device may have been disconnected",
                        self.port_path
                    );
                    return Err(MultiHtuError::DeviceDisconnected(
                        "Serial port returned EOF - device may have been unplugged".to_string(),
                    ));
                }
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) => {
                    error!("Read error: {}", e);
                    return Err(MultiHtuError::Serial(format!("Read error: {}", e)));
                }
            }
        }

        buf.truncate(filled);
        if self.debug_uart {
            debug!("RX {}: {:02X?}", self.port_path, buf);
        }
        Ok(buf)
    }

    fn clear_input_buffer(&mut self) -> Result<()> {
        self.port
            .clear(tokio_serial::ClearBuffer::Input)
            .map_err(|e| {
                warn!("Failed to clear input buffer: {}", e);
                MultiHtuError::Serial(format!("Failed to clear buffer: {}", e))
            })
    }

    async fn close(&mut self) -> Result<()> {
        self.port
            .flush()
            .await
            .map_err(|e| MultiHtuError::Serial(format!("Flush on close failed: {}", e)))
    }
}

/// Connector that opens real serial ports
pub struct SerialConnector<B: BoardConfig = multihtu_core::DefaultBoard> {
    debug_uart: bool,
    _board: PhantomData<B>,
}

impl<B: BoardConfig> SerialConnector<B> {
    /// Create a connector; `debug_uart` is passed to every driver it opens
    pub fn new(debug_uart: bool) -> Self {
        Self {
            debug_uart,
            _board: PhantomData,
        }
    }
}

#[async_trait]
impl<B: BoardConfig> Connector for SerialConnector<B> {
    async fn open(&self, port_path: &str) -> Result<Box<dyn SerialTransport>> {
        let driver = SerialDriver::<B>::new(port_path, self.debug_uart)?;
        Ok(Box::new(driver))
    }
}
