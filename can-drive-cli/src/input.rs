//! Operator input parsing (hex identifiers and payload bytes)

use can_drive_core::{FrameError, RawFrame};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("CAN ID is empty")]
    EmptyId,

    #[error("Invalid hex CAN ID: '{0}'")]
    InvalidId(String),

    #[error("Data byte {index}: invalid hex value '{text}' (expected 00-FF)")]
    InvalidByte { index: usize, text: String },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Parse a hexadecimal identifier, with or without a `0x` prefix
pub fn parse_can_id(text: &str) -> Result<u32, InputError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(InputError::EmptyId);
    }
    u32::from_str_radix(digits, 16).map_err(|_| InputError::InvalidId(text.to_string()))
}

/// Parse hexadecimal payload bytes (each 00-FF)
pub fn parse_bytes<S: AsRef<str>>(texts: &[S]) -> Result<Vec<u8>, InputError> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let text = text.as_ref().trim();
            u8::from_str_radix(text, 16).map_err(|_| InputError::InvalidByte {
                index: i + 1,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Build a frame from operator input; identifiers above 0x7FF are sent extended
pub fn parse_frame<S: AsRef<str>>(id: &str, bytes: &[S]) -> Result<RawFrame, InputError> {
    let can_id = parse_can_id(id)?;
    let data = parse_bytes(bytes)?;
    Ok(RawFrame::new(can_id, &data)?)
}
