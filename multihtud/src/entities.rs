//! Host-facing entities
//!
//! Every reading is exposed as an [`ObservableValue`] and every actuator as
//! a [`Switch`]. All of them share one `Arc<BoardDriver>`; the driver's
//! throttle collapses their refresh calls into a single round trip.

use multihtu_core::{Actuator, ActuatorOutcome, ReadingKind};
use multihtu_hardware::BoardDriver;
use std::sync::Arc;
use tracing::warn;

/// One reading of the board, refreshed on each poll
pub struct ObservableValue {
    kind: ReadingKind,
    board: Arc<BoardDriver>,
    state: Option<f32>,
}

impl ObservableValue {
    /// Create a value for `kind`; it reads unknown until the first update
    pub fn new(kind: ReadingKind, board: Arc<BoardDriver>) -> Self {
        Self {
            kind,
            board,
            state: None,
        }
    }

    /// Unique name, e.g. `Humidity_4`
    pub fn name(&self) -> String {
        self.kind.name()
    }

    /// Unit of measurement
    pub fn unit(&self) -> &'static str {
        self.kind.unit()
    }

    /// Ask the board for fresh data, then pick up this value
    pub async fn update(&mut self) {
        self.board.refresh().await;
        self.state = self.kind.read(&self.board.snapshot());
    }

    /// Current value rounded for display, `None` when unknown
    pub fn value(&self) -> Option<f64> {
        self.state.map(|v| self.kind.precision().apply(v))
    }

    /// `name = value unit`, or `name = unknown`
    pub fn display(&self) -> String {
        match self.value() {
            Some(value) => format!("{} = {} {}", self.name(), value, self.unit()),
            None => format!("{} = unknown", self.name()),
        }
    }
}

/// Optimistic on/off control for one actuator
///
/// The board never reports actuator state, so `is_on` is whatever was
/// last requested.
pub struct Switch {
    actuator: Actuator,
    board: Arc<BoardDriver>,
    is_on: bool,
}

impl Switch {
    /// Create a switch, initially off
    pub fn new(actuator: Actuator, board: Arc<BoardDriver>) -> Self {
        Self {
            actuator,
            board,
            is_on: false,
        }
    }

    /// Switch name
    pub fn name(&self) -> &'static str {
        self.actuator.name()
    }

    /// Last requested state
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Turn the actuator on
    pub async fn turn_on(&mut self) -> ActuatorOutcome {
        self.set(true).await
    }

    /// Turn the actuator off
    pub async fn turn_off(&mut self) -> ActuatorOutcome {
        self.set(false).await
    }

    /// Record the requested state, then send the command
    pub async fn set(&mut self, on: bool) -> ActuatorOutcome {
        self.is_on = on;
        let outcome = self.board.switch(self.actuator, on).await;
        if outcome != ActuatorOutcome::Sent {
            warn!("{} command not delivered: {:?}", self.name(), outcome);
        }
        outcome
    }
}

/// All entities of one board
pub struct Entities {
    pub values: Vec<ObservableValue>,
    pub heater: Switch,
    pub fan: Switch,
}

impl Entities {
    /// Register every reading and both switches against `board`
    pub fn new(board: Arc<BoardDriver>) -> Self {
        let values = ReadingKind::all()
            .into_iter()
            .map(|kind| ObservableValue::new(kind, board.clone()))
            .collect();

        Self {
            values,
            heater: Switch::new(Actuator::Heater, board.clone()),
            fan: Switch::new(Actuator::Fan, board),
        }
    }

    /// Mutable access to a switch by actuator
    pub fn switch_mut(&mut self, actuator: Actuator) -> &mut Switch {
        match actuator {
            Actuator::Heater => &mut self.heater,
            Actuator::Fan => &mut self.fan,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use multihtu_core::{Result, FRAME_SLOTS};
    use multihtu_hardware::{Connector, SerialTransport};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Board that answers every read with the same two frames, in turn
    pub(crate) struct FixedBoard {
        pub(crate) frames: [[f32; FRAME_SLOTS]; 2],
        pub(crate) written: Arc<Mutex<Vec<u8>>>,
    }

    struct FixedTransport {
        frames: [[f32; FRAME_SLOTS]; 2],
        next: usize,
        written: Arc<Mutex<Vec<u8>>>,
    }

    #[async_trait]
    impl Connector for FixedBoard {
        async fn open(&self, _port_path: &str) -> Result<Box<dyn SerialTransport>> {
            Ok(Box::new(FixedTransport {
                frames: self.frames,
                next: 0,
                written: self.written.clone(),
            }))
        }
    }

    #[async_trait]
    impl SerialTransport for FixedTransport {
        async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
            self.written.lock().unwrap().extend_from_slice(bytes);
            Ok(())
        }

        async fn read_up_to(&mut self, _len: usize, _deadline: Duration) -> Result<Vec<u8>> {
            let frame = self.frames[self.next % 2];
            self.next += 1;
            Ok(frame.iter().flat_map(|v| v.to_le_bytes()).collect())
        }

        fn clear_input_buffer(&mut self) -> Result<()> {
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    pub(crate) fn fixed_driver() -> (Arc<BoardDriver>, Arc<Mutex<Vec<u8>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let board = FixedBoard {
            frames: [
                [19.6, 20.2, 255.0, 21.0, 22.0, 23.0, 24.0, 25.0, 4.876],
                [55.0, 56.0, 57.0, 58.0, 59.0, 60.0, 61.0, 300.0, 2.5],
            ],
            written: written.clone(),
        };
        let driver = BoardDriver::with_connector("/dev/ttyUSB0", Box::new(board));
        (Arc::new(driver), written)
    }

    #[tokio::test(start_paused = true)]
    async fn test_entities_cover_board() {
        let (driver, _) = fixed_driver();
        let entities = Entities::new(driver);

        assert_eq!(entities.values.len(), 20);
        assert_eq!(entities.heater.name(), "Heater");
        assert_eq!(entities.fan.name(), "Fan");
        assert!(entities.values.iter().all(|v| v.value().is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_share_one_round_trip() {
        let (driver, written) = fixed_driver();
        let mut entities = Entities::new(driver);

        for value in entities.values.iter_mut() {
            value.update().await;
        }

        assert_eq!(written.lock().unwrap().as_slice(), b"D");

        let find = |name: &str| {
            entities
                .values
                .iter()
                .find(|v| v.name() == name)
                .unwrap()
                .value()
        };
        assert_eq!(find("Temperature_1"), Some(20.0));
        assert_eq!(find("Temperature_3"), None);
        assert_eq!(find("Humidity_7"), Some(61.0));
        assert_eq!(find("Humidity_8"), None);
        assert_eq!(find("Voltage"), Some(4.88));
        assert_eq!(find("Power"), Some(2.5));
        assert_eq!(find("Work_time"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_formats() {
        let (driver, _) = fixed_driver();
        let mut voltage = ObservableValue::new(ReadingKind::Voltage, driver.clone());
        let mut limit = ObservableValue::new(ReadingKind::WorkLimit, driver);

        voltage.update().await;
        limit.update().await;

        assert_eq!(voltage.display(), "Voltage = 4.88 V");
        assert_eq!(limit.display(), "Work_limit = unknown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_is_optimistic() {
        let (driver, written) = fixed_driver();
        let mut entities = Entities::new(driver);

        assert!(!entities.heater.is_on());
        assert_eq!(entities.heater.turn_on().await, ActuatorOutcome::Sent);
        assert!(entities.heater.is_on());

        entities.switch_mut(Actuator::Fan).turn_on().await;
        entities.switch_mut(Actuator::Fan).turn_off().await;
        assert!(!entities.fan.is_on());

        assert_eq!(written.lock().unwrap().as_slice(), b"CSF");
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_keeps_requested_state_when_board_missing() {
        let driver = Arc::new(BoardDriver::new("/dev/multihtu-does-not-exist", false));
        let mut heater = Switch::new(Actuator::Heater, driver);

        assert_eq!(heater.turn_on().await, ActuatorOutcome::Unavailable);
        assert!(heater.is_on());
    }
}
