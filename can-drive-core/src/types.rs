//! Core types for the drive-control protocol
//!
//! This module defines the raw frame representation shared by the decoder,
//! the encoder and the transports, the decoded signal type handed to display
//! sinks, and the error types of the library.

use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp type used for display rows
pub type Timestamp = DateTime<Utc>;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Largest identifier representable on the bus (29-bit extended)
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// Largest 11-bit standard identifier
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Classic CAN payload capacity
pub const MAX_PAYLOAD_LEN: usize = 8;

/// A single CAN frame as received from or sent to the bus
///
/// Frames are immutable once built. The payload is stored inline; only the
/// first `len` bytes are meaningful.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawFrame {
    can_id: u32,
    extended: bool,
    data: [u8; MAX_PAYLOAD_LEN],
    len: usize,
}

impl RawFrame {
    /// Build a frame, choosing the extended format for identifiers above 0x7FF
    pub fn new(can_id: u32, payload: &[u8]) -> std::result::Result<Self, FrameError> {
        if can_id > MAX_EXTENDED_ID {
            return Err(FrameError::InvalidIdentifier(can_id));
        }
        Self::with_format(can_id, can_id > MAX_STANDARD_ID, payload)
    }

    /// Build a frame with an explicit identifier format
    pub fn with_format(
        can_id: u32,
        extended: bool,
        payload: &[u8],
    ) -> std::result::Result<Self, FrameError> {
        let limit = if extended { MAX_EXTENDED_ID } else { MAX_STANDARD_ID };
        if can_id > limit {
            return Err(FrameError::InvalidIdentifier(can_id));
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLong(payload.len()));
        }

        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            can_id,
            extended,
            data,
            len: payload.len(),
        })
    }

    /// Full 8-byte standard frame; used by the encoder for its fixed identifiers
    pub(crate) const fn standard(can_id: u16, data: [u8; MAX_PAYLOAD_LEN]) -> Self {
        Self {
            can_id: can_id as u32,
            extended: false,
            data,
            len: MAX_PAYLOAD_LEN,
        }
    }

    /// CAN identifier (11-bit or 29-bit)
    pub fn can_id(&self) -> u32 {
        self.can_id
    }

    /// True if this frame uses a 29-bit identifier
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.len
    }

    /// Payload rendered as lowercase hex without separators
    pub fn hex_data(&self) -> String {
        self.data().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawFrame(0x{:03X} [{}] {})", self.can_id, self.len, self.hex_data())
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:03X} [{}]", self.can_id, self.len)?;
        for byte in self.data() {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// A decoded signal with its display-ready value
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSignal {
    /// Signal name from the signal table
    pub name: &'static str,
    /// Formatted value (fixed decimals, integer, or enumeration label)
    pub value: String,
    /// Engineering unit (e.g., "km/h", "°C", "V")
    pub unit: Option<&'static str>,
    /// Raw field value before scaling (useful for debugging)
    pub raw_value: i64,
}

impl DecodedSignal {
    /// Display label: the name, followed by the unit in parentheses if any
    pub fn label(&self) -> String {
        match self.unit {
            Some(unit) => format!("{} ({})", self.name, unit),
            None => self.name.to_string(),
        }
    }
}

impl fmt::Display for DecodedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.label(), self.value)
    }
}

/// Per-signal decoding failure; sibling signals in the same frame are unaffected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Signal '{signal}': enumeration index {index} out of range (table has {len} entries)")]
    EnumIndexOutOfRange {
        signal: &'static str,
        index: u64,
        len: usize,
    },

    #[error("Signal '{signal}' requires {required} bytes but frame only has {available}")]
    PayloadTooShort {
        signal: &'static str,
        required: usize,
        available: usize,
    },
}

/// Raw frame construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Invalid CAN identifier: 0x{0:X}")]
    InvalidIdentifier(u32),

    #[error("Payload of {0} bytes exceeds the 8-byte classic CAN limit")]
    PayloadTooLong(usize),
}

/// Drive command validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Scheduler transition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("No drive command is active")]
    NotActive,
}

/// Bus transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to connect to '{channel}': {source}")]
    Connect {
        channel: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to send frame 0x{can_id:X}: {source}")]
    Send {
        can_id: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to receive frame: {0}")]
    Receive(#[source] std::io::Error),

    #[error("Transport disconnected")]
    Disconnected,

    #[error("Transport not available: {0}")]
    Unsupported(String),
}

/// Umbrella error for library operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
