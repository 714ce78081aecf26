//! Board Driver - High-level interface to the sensor board
//!
//! Implements the read and actuator protocol over the link manager and
//! caches the last decoded readings.
//!
//! `refresh` is throttled: many pollers can call it every cycle and only one
//! serial round trip happens per interval. Nothing here returns transport
//! errors to the caller; failures turn into a [`RefreshOutcome`] and missing
//! readings.

use crate::link_manager::{LinkManager, ReadOutcome};
use crate::serial_driver::Connector;
use multihtu_core::{
    Actuator, ActuatorOutcome, BoardConfig, BoardState, DefaultBoard, Frame, RefreshOutcome,
    Result, FRAME_LEN,
};
use std::sync::{Mutex as StdMutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Command bytes understood by the board firmware
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request the temperature frame, followed by the humidity frame ('D')
    ReadClimate = b'D',
    /// Heater on ('C')
    HeaterOn = b'C',
    /// Heater off ('E')
    HeaterOff = b'E',
    /// Fan on ('S')
    FanOn = b'S',
    /// Fan off ('F')
    FanOff = b'F',
}

impl Command {
    /// Command that switches `actuator` to `on`
    pub fn switch(actuator: Actuator, on: bool) -> Self {
        match (actuator, on) {
            (Actuator::Heater, true) => Command::HeaterOn,
            (Actuator::Heater, false) => Command::HeaterOff,
            (Actuator::Fan, true) => Command::FanOn,
            (Actuator::Fan, false) => Command::FanOff,
        }
    }
}

/// Driver for one multiHTU21D board
pub struct BoardDriver {
    link: Mutex<LinkManager>,
    state: RwLock<BoardState>,
    last_refresh: StdMutex<Option<Instant>>,
    min_interval: Duration,
    port_path: String,
}

impl BoardDriver {
    /// Create a driver for the serial device at `port_path`
    ///
    /// No I/O happens until the first `refresh` or actuator call.
    pub fn new(port_path: impl Into<String>, debug_uart: bool) -> Self {
        Self::from_link(LinkManager::new(port_path, debug_uart))
    }

    /// Create a driver whose link opens transports through `connector`
    pub fn with_connector(port_path: impl Into<String>, connector: Box<dyn Connector>) -> Self {
        Self::from_link(LinkManager::with_connector(port_path, connector))
    }

    fn from_link(link: LinkManager) -> Self {
        Self {
            port_path: link.device_path().to_string(),
            link: Mutex::new(link),
            state: RwLock::new(BoardState::default()),
            last_refresh: StdMutex::new(None),
            min_interval: Duration::from_millis(DefaultBoard::MIN_REFRESH_INTERVAL_MS),
        }
    }

    /// Override the minimum spacing between refresh round trips
    pub fn with_throttle(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Device path of the board
    pub fn port_path(&self) -> &str {
        &self.port_path
    }

    /// When the last non-throttled refresh started
    pub fn last_refresh(&self) -> Option<Instant> {
        *self
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the serial link is currently open
    pub async fn is_connected(&self) -> bool {
        self.link.lock().await.is_open()
    }

    /// Claim the refresh slot; false when inside the throttle window
    ///
    /// Check and update happen under one lock.
    fn claim_refresh(&self) -> bool {
        let mut last = self
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if let Some(previous) = *last {
            if now.duration_since(previous) < self.min_interval {
                return false;
            }
        }
        *last = Some(now);
        true
    }

    /// Read both frames from the board and update the cached readings
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.claim_refresh() {
            debug!("Refresh throttled");
            return RefreshOutcome::Throttled;
        }

        let mut link = self.link.lock().await;
        if !link.ensure_open().await {
            return RefreshOutcome::Unavailable;
        }

        match self.read_frames(&mut link).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Error communicating with port {}: {}", self.port_path, e);
                link.close().await;
                self.clear_state();
                RefreshOutcome::Transport
            }
        }
    }

    async fn read_frames(&self, link: &mut LinkManager) -> Result<RefreshOutcome> {
        link.clear_input()?;
        link.write(&[Command::ReadClimate as u8]).await?;

        let Some(temperature) = self.read_frame(link, "temperature").await? else {
            return Ok(RefreshOutcome::Framing);
        };
        let Some(humidity) = self.read_frame(link, "humidity").await? else {
            return Ok(RefreshOutcome::Framing);
        };

        // Both frames land together or not at all
        let mut state = self.write_state();
        state.temperature_frame = Some(temperature);
        state.humidity_frame = Some(humidity);
        drop(state);

        debug!("Refreshed readings from {}", self.port_path);
        Ok(RefreshOutcome::Updated)
    }

    async fn read_frame(&self, link: &mut LinkManager, label: &str) -> Result<Option<Frame>> {
        match link.read_exact(FRAME_LEN).await? {
            ReadOutcome::Complete(bytes) => Frame::decode(&bytes).map(Some),
            ReadOutcome::Short(bytes) => {
                warn!(
                    "Error receiving {} frame from {}, actually read {} bytes",
                    label,
                    self.port_path,
                    bytes.len()
                );
                Ok(None)
            }
        }
    }

    /// Switch the heater
    pub async fn set_heater(&self, on: bool) -> ActuatorOutcome {
        self.switch(Actuator::Heater, on).await
    }

    /// Switch the fan
    pub async fn set_fan(&self, on: bool) -> ActuatorOutcome {
        self.switch(Actuator::Fan, on).await
    }

    /// Send the on/off command for an actuator; no response is read
    pub async fn switch(&self, actuator: Actuator, on: bool) -> ActuatorOutcome {
        let command = Command::switch(actuator, on);

        let mut link = self.link.lock().await;
        if !link.ensure_open().await {
            return ActuatorOutcome::Unavailable;
        }

        match link.write(&[command as u8]).await {
            Ok(()) => {
                debug!("Sent {:?} to {}", command, self.port_path);
                ActuatorOutcome::Sent
            }
            Err(e) => {
                warn!(
                    "Failed to switch {} on port {}: {}",
                    actuator.name(),
                    self.port_path,
                    e
                );
                link.close().await;
                self.clear_state();
                ActuatorOutcome::Transport
            }
        }
    }

    /// Close the link and forget all readings
    pub async fn disconnect(&self) {
        let mut link = self.link.lock().await;
        link.close().await;
        self.clear_state();
        info!("Disconnected from {}", self.port_path);
    }

    /// Temperature of the sensor at a 1-based index
    pub fn temperature(&self, index: usize) -> Option<f32> {
        self.snapshot().temperature(index)
    }

    /// Humidity of the sensor at a 1-based index
    pub fn humidity(&self, index: usize) -> Option<f32> {
        self.snapshot().humidity(index)
    }

    /// Input voltage
    pub fn voltage(&self) -> Option<f32> {
        self.snapshot().voltage()
    }

    /// Input power
    pub fn power(&self) -> Option<f32> {
        self.snapshot().power()
    }

    /// Copy of all cached readings
    pub fn snapshot(&self) -> BoardState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, BoardState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_state(&self) {
        self.write_state().clear();
    }
}
