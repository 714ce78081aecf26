//! Binary frame decoding
//!
//! Every response from the board is a fixed 36-byte block of nine
//! little-endian `f32` values: eight channel readings followed by one
//! auxiliary scalar (voltage for the temperature frame, power for the
//! humidity frame).

use crate::board::{BoardConfig, DefaultBoard, CHANNEL_COUNT};
use crate::{MultiHtuError, Result};

/// Number of `f32` slots in a frame
pub const FRAME_SLOTS: usize = CHANNEL_COUNT + 1;

/// Size of a frame on the wire, in bytes
pub const FRAME_LEN: usize = FRAME_SLOTS * 4;

/// One decoded response frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Channel readings 1..=8, rounded to whole units
    pub channels: [Option<f32>; CHANNEL_COUNT],
    /// Auxiliary scalar, rounded to 2 decimals
    pub aux: Option<f32>,
}

impl Frame {
    /// Decode a raw frame
    ///
    /// # Errors
    ///
    /// Returns `MultiHtuError::Frame` if `bytes` is not exactly `FRAME_LEN` long.
    ///
    /// # Examples
    ///
    /// ```
    /// use multihtu_core::frame::{Frame, FRAME_LEN};
    ///
    /// let mut raw = Vec::with_capacity(FRAME_LEN);
    /// for v in [21.4f32, 255.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 4.987] {
    ///     raw.extend_from_slice(&v.to_le_bytes());
    /// }
    /// let frame = Frame::decode(&raw).unwrap();
    /// assert_eq!(frame.channels[0], Some(21.0));
    /// assert_eq!(frame.channels[1], None);
    /// assert_eq!(frame.aux, Some(4.99));
    /// ```
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FRAME_LEN {
            return Err(MultiHtuError::Frame {
                expected: FRAME_LEN,
                actual: bytes.len(),
            });
        }

        let mut slots = [0f32; FRAME_SLOTS];
        for (slot, chunk) in slots.iter_mut().zip(bytes.chunks_exact(4)) {
            *slot = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let mut channels = [None; CHANNEL_COUNT];
        for (value, raw) in channels.iter_mut().zip(slots.iter()) {
            *value = decode_channel(*raw);
        }

        Ok(Self {
            channels,
            aux: decode_aux(slots[CHANNEL_COUNT]),
        })
    }

    /// Reading for a 1-based channel index, `None` when out of range or absent
    pub fn channel(&self, index: usize) -> Option<f32> {
        index
            .checked_sub(1)
            .and_then(|i| self.channels.get(i))
            .copied()
            .flatten()
    }
}

/// True when the wire value is a real measurement
///
/// NaN fails the comparison and is treated like the sentinel.
#[inline]
pub fn is_present(raw: f32) -> bool {
    raw < DefaultBoard::SENTINEL
}

/// Decode a channel slot: whole units, halves to even
#[inline]
pub fn decode_channel(raw: f32) -> Option<f32> {
    is_present(raw).then(|| raw.round_ties_even())
}

/// Decode the auxiliary slot: two decimal places
#[inline]
pub fn decode_aux(raw: f32) -> Option<f32> {
    is_present(raw).then(|| ((raw as f64 * 100.0).round_ties_even() / 100.0) as f32)
}
