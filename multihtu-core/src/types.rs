//! Core types and data structures for multiHTU21D

use std::fmt;

use crate::board::CHANNEL_COUNT;
use crate::frame::Frame;

/// Latest successfully decoded readings
///
/// Each frame is stored as a whole: the eight temperatures and the voltage
/// arrive together, as do the eight humidities and the power. `None` means
/// no data for that block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoardState {
    /// Temperature channels plus supply voltage
    pub temperature_frame: Option<Frame>,
    /// Humidity channels plus power draw
    pub humidity_frame: Option<Frame>,
}

impl BoardState {
    /// Temperature of the sensor at a 1-based index
    pub fn temperature(&self, index: usize) -> Option<f32> {
        self.temperature_frame.and_then(|f| f.channel(index))
    }

    /// Humidity of the sensor at a 1-based index
    pub fn humidity(&self, index: usize) -> Option<f32> {
        self.humidity_frame.and_then(|f| f.channel(index))
    }

    /// Input voltage
    pub fn voltage(&self) -> Option<f32> {
        self.temperature_frame.and_then(|f| f.aux)
    }

    /// Input power
    pub fn power(&self) -> Option<f32> {
        self.humidity_frame.and_then(|f| f.aux)
    }

    /// True when no frame has been stored
    pub fn is_empty(&self) -> bool {
        self.temperature_frame.is_none() && self.humidity_frame.is_none()
    }

    /// Reset every field to no data
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Result of a `refresh` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Both frames were read and stored
    Updated,
    /// Inside the minimum interval; no I/O was performed
    Throttled,
    /// The link could not be opened; state left as it was
    Unavailable,
    /// A frame came back short; cycle aborted, link kept open
    Framing,
    /// Hard I/O failure; link closed and state cleared
    Transport,
}

/// Result of an actuator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorOutcome {
    /// The command byte was written
    Sent,
    /// The link could not be opened; nothing was written
    Unavailable,
    /// The write failed; link closed and state cleared
    Transport,
}

/// Board outputs that can be switched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    /// Sensor heater
    Heater,
    /// Ventilation fan
    Fan,
}

impl Actuator {
    /// Display name of the switch
    pub fn name(&self) -> &'static str {
        match self {
            Actuator::Heater => "Heater",
            Actuator::Fan => "Fan",
        }
    }
}

/// How an observable value is rounded for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Whole units
    Integer,
    /// Two decimal places
    TwoDecimals,
}

impl Precision {
    /// Round a reading for presentation
    pub fn apply(&self, value: f32) -> f64 {
        let value = value as f64;
        match self {
            Precision::Integer => value.round_ties_even(),
            Precision::TwoDecimals => (value * 100.0).round_ties_even() / 100.0,
        }
    }
}

/// Every value the board can report, as one tagged set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingKind {
    /// Temperature of a 1-based channel
    Temperature(u8),
    /// Humidity of a 1-based channel
    Humidity(u8),
    /// Supply voltage
    Voltage,
    /// Power draw
    Power,
    /// Heater work time
    WorkTime,
    /// Heater work time limit
    WorkLimit,
}

impl ReadingKind {
    /// All readings exposed for a board, in registration order
    pub fn all() -> Vec<ReadingKind> {
        let mut kinds = Vec::with_capacity(CHANNEL_COUNT * 2 + 4);
        for channel in 1..=CHANNEL_COUNT as u8 {
            kinds.push(ReadingKind::Temperature(channel));
            kinds.push(ReadingKind::Humidity(channel));
        }
        kinds.extend([
            ReadingKind::Voltage,
            ReadingKind::Power,
            ReadingKind::WorkTime,
            ReadingKind::WorkLimit,
        ]);
        kinds
    }

    /// Unique display name, e.g. `Temperature_3`
    pub fn name(&self) -> String {
        match self {
            ReadingKind::Temperature(n) => format!("Temperature_{}", n),
            ReadingKind::Humidity(n) => format!("Humidity_{}", n),
            ReadingKind::Voltage => "Voltage".to_string(),
            ReadingKind::Power => "Power".to_string(),
            ReadingKind::WorkTime => "Work_time".to_string(),
            ReadingKind::WorkLimit => "Work_limit".to_string(),
        }
    }

    /// Unit of measurement
    pub fn unit(&self) -> &'static str {
        match self {
            ReadingKind::Temperature(_) => "°C",
            ReadingKind::Humidity(_) => "%",
            ReadingKind::Voltage => "V",
            ReadingKind::Power => "W",
            ReadingKind::WorkTime | ReadingKind::WorkLimit => "H",
        }
    }

    /// Display rounding rule
    pub fn precision(&self) -> Precision {
        match self {
            ReadingKind::WorkTime | ReadingKind::WorkLimit => Precision::Integer,
            _ => Precision::TwoDecimals,
        }
    }

    /// Look the value up in a board state
    ///
    /// The firmware frames carry no work-time data, so those kinds are
    /// always `None`.
    pub fn read(&self, state: &BoardState) -> Option<f32> {
        match *self {
            ReadingKind::Temperature(n) => state.temperature(n as usize),
            ReadingKind::Humidity(n) => state.humidity(n as usize),
            ReadingKind::Voltage => state.voltage(),
            ReadingKind::Power => state.power(),
            ReadingKind::WorkTime | ReadingKind::WorkLimit => None,
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
