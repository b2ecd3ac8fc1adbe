//! Frame Decoding Engine
//!
//! Extracts signal values from raw CAN frames based on the static signal
//! table. Each signal is decoded independently: a failure in one signal is
//! reported alongside the siblings that decoded fine.

use crate::signals::{self, Field, MessageSpec, SignalSpec, Transform, ValueType};
use crate::types::{DecodeError, DecodedSignal, RawFrame};
use byteorder::{ByteOrder, LittleEndian};

/// The outcome of decoding one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedFrame {
    /// CAN identifier of the decoded frame
    pub can_id: u32,
    /// Message name from the signal table (None for unknown identifiers)
    pub message_name: Option<&'static str>,
    /// Successfully decoded signals, in table order
    pub signals: Vec<DecodedSignal>,
    /// Signals that failed to decode
    pub errors: Vec<DecodeError>,
}

impl DecodedFrame {
    /// Find a decoded signal by name
    pub fn get(&self, name: &str) -> Option<&DecodedSignal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Formatted value of a decoded signal
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|s| s.value.as_str())
    }

    /// True if no signal decoded (unknown identifier or every signal failed)
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.signals.iter().map(|s| (s.name, s.value.as_str()))
    }
}

/// Decode a payload received under `can_id` using the built-in signal table
pub fn decode(can_id: u32, data: &[u8]) -> DecodedFrame {
    FrameDecoder::decode(can_id, data)
}

/// Frame decoder - extracts signals from CAN frames
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode a payload using the built-in signal table
    ///
    /// Unknown identifiers yield an empty [`DecodedFrame`], not an error.
    pub fn decode(can_id: u32, data: &[u8]) -> DecodedFrame {
        match signals::message_spec(can_id) {
            Some(message) => Self::decode_message(message, data),
            None => {
                log::trace!("Unknown CAN ID: 0x{:X}, nothing to decode", can_id);
                DecodedFrame {
                    can_id,
                    ..DecodedFrame::default()
                }
            }
        }
    }

    /// Decode a received frame using the built-in signal table
    pub fn decode_frame(frame: &RawFrame) -> DecodedFrame {
        Self::decode(frame.can_id(), frame.data())
    }

    /// Decode a payload against an explicit message definition
    pub fn decode_message(message: &MessageSpec, data: &[u8]) -> DecodedFrame {
        let mut decoded = DecodedFrame {
            can_id: message.can_id,
            message_name: Some(message.name),
            signals: Vec::with_capacity(message.signals.len()),
            errors: Vec::new(),
        };

        for signal in message.signals {
            match Self::decode_signal(signal, data) {
                Ok(value) => decoded.signals.push(value),
                Err(e) => {
                    log::warn!("0x{:03X}: {}", message.can_id, e);
                    decoded.errors.push(e);
                }
            }
        }

        decoded
    }

    /// Decode a single signal from CAN frame data
    pub fn decode_signal(signal: &SignalSpec, data: &[u8]) -> Result<DecodedSignal, DecodeError> {
        let raw_value = Self::extract_raw(signal, data)?;

        let value = match signal.transform {
            Transform::Linear {
                scale,
                offset,
                decimals,
            } => {
                let physical = raw_value as f64 * scale + offset;
                format!("{:.*}", decimals, physical)
            }
            Transform::Integer { offset } => (raw_value + offset).to_string(),
            Transform::Enumeration { labels } => {
                let index = raw_value as u64;
                labels
                    .get(index as usize)
                    .map(|label| label.to_string())
                    .ok_or(DecodeError::EnumIndexOutOfRange {
                        signal: signal.name,
                        index,
                        len: labels.len(),
                    })?
            }
            Transform::Flag { set, clear } => {
                let label = if raw_value != 0 { set } else { clear };
                label.to_string()
            }
        };

        Ok(DecodedSignal {
            name: signal.name,
            value,
            unit: signal.unit,
            raw_value,
        })
    }

    /// Extract the raw field value, sign-extended for signed fields
    fn extract_raw(signal: &SignalSpec, data: &[u8]) -> Result<i64, DecodeError> {
        let (_, end) = signal.field.byte_range();
        if end > data.len() {
            return Err(DecodeError::PayloadTooShort {
                signal: signal.name,
                required: end,
                available: data.len(),
            });
        }

        let raw = match signal.field {
            Field::Bytes {
                start,
                len,
                value_type: ValueType::Unsigned,
            } => LittleEndian::read_uint(&data[start..end], len) as i64,
            Field::Bytes {
                start,
                len,
                value_type: ValueType::Signed,
            } => LittleEndian::read_int(&data[start..end], len),
            Field::Bits { byte, shift, mask } => ((data[byte] >> shift) & mask) as i64,
        };

        Ok(raw)
    }
}
