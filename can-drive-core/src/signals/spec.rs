//! Signal definition types
//!
//! A [`MessageSpec`] groups the [`SignalSpec`]s carried by one CAN identifier.
//! Definitions are `'static` and never mutated at runtime.

/// Value type for multi-byte fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Two's-complement signed integer
    Signed,
    /// Unsigned integer
    Unsigned,
}

/// Location of a signal's raw value within the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Little-endian integer spanning `len` bytes starting at `start`
    Bytes {
        start: usize,
        len: usize,
        value_type: ValueType,
    },
    /// Bit field inside a single byte: `(data[byte] >> shift) & mask`
    Bits { byte: usize, shift: u8, mask: u8 },
}

impl Field {
    /// Half-open byte range `[first, end)` touched by this field
    pub const fn byte_range(&self) -> (usize, usize) {
        match *self {
            Field::Bytes { start, len, .. } => (start, start + len),
            Field::Bits { byte, .. } => (byte, byte + 1),
        }
    }
}

/// How a raw field value becomes a display value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// `raw * scale + offset`, printed with a fixed number of decimals
    Linear {
        scale: f64,
        offset: f64,
        decimals: usize,
    },
    /// `raw + offset`, printed as a plain (signed) integer
    Integer { offset: i64 },
    /// Index into a label table
    Enumeration { labels: &'static [&'static str] },
    /// Single-bit flag with labels for set and clear
    Flag {
        set: &'static str,
        clear: &'static str,
    },
}

/// A single signal definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSpec {
    /// Signal name
    pub name: &'static str,
    /// Engineering unit (e.g., "km/h", "V")
    pub unit: Option<&'static str>,
    /// Where the raw value lives
    pub field: Field,
    /// Raw-to-display conversion
    pub transform: Transform,
}

/// All signals carried by one CAN identifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageSpec {
    /// CAN identifier
    pub can_id: u32,
    /// Message name
    pub name: &'static str,
    /// Signals in display order
    pub signals: &'static [SignalSpec],
}

impl MessageSpec {
    /// Look up a signal by name
    pub fn signal(&self, name: &str) -> Option<&'static SignalSpec> {
        self.signals.iter().find(|s| s.name == name)
    }
}
