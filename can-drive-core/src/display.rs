//! Display sinks
//!
//! A sink receives every inbound frame twice: raw, for the frame view, and
//! decoded, for the signal view. [`SignalBoard`] is an in-memory sink that
//! keeps one row per identifier and one row per signal label, overwriting in
//! place.

use crate::types::{DecodedSignal, RawFrame, Timestamp};
use chrono::Utc;
use std::collections::HashMap;

/// Receiver of inbound bus data
pub trait DisplaySink {
    /// A frame as received
    fn raw_frame(&mut self, frame: &RawFrame);

    /// The signals decoded from a frame received under `can_id`
    fn signals(&mut self, can_id: u32, signals: &[DecodedSignal]);

    /// Drop everything displayed so far
    fn clear(&mut self);
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn raw_frame(&mut self, frame: &RawFrame) {
        (**self).raw_frame(frame)
    }

    fn signals(&mut self, can_id: u32, signals: &[DecodedSignal]) {
        (**self).signals(can_id, signals)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

/// One row of the raw frame view
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub can_id: u32,
    pub dlc: usize,
    /// Payload as lowercase hex
    pub data: String,
    /// Frames seen under this identifier
    pub count: u64,
    pub updated_at: Timestamp,
}

/// One row of the decoded signal view
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    /// Name with unit, e.g. "Vehicle Speed (km/h)"
    pub label: String,
    pub value: String,
    /// Identifier the value last arrived under
    pub can_id: u32,
    pub updated_at: Timestamp,
}

/// In-memory sink with overwrite-in-place rows, in first-seen order
#[derive(Debug, Default)]
pub struct SignalBoard {
    raw_rows: Vec<RawRow>,
    raw_index: HashMap<u32, usize>,
    signal_rows: Vec<SignalRow>,
    signal_index: HashMap<String, usize>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_rows(&self) -> &[RawRow] {
        &self.raw_rows
    }

    pub fn signal_rows(&self) -> &[SignalRow] {
        &self.signal_rows
    }

    /// Row for `can_id` in the raw view
    pub fn raw_row(&self, can_id: u32) -> Option<&RawRow> {
        self.raw_index.get(&can_id).map(|&i| &self.raw_rows[i])
    }

    /// Current value displayed for a signal label
    pub fn value(&self, label: &str) -> Option<&str> {
        self.signal_index
            .get(label)
            .map(|&i| self.signal_rows[i].value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.raw_rows.is_empty() && self.signal_rows.is_empty()
    }
}

impl DisplaySink for SignalBoard {
    fn raw_frame(&mut self, frame: &RawFrame) {
        let now = Utc::now();
        match self.raw_index.get(&frame.can_id()) {
            Some(&i) => {
                let row = &mut self.raw_rows[i];
                row.dlc = frame.dlc();
                row.data = frame.hex_data();
                row.count += 1;
                row.updated_at = now;
            }
            None => {
                self.raw_index.insert(frame.can_id(), self.raw_rows.len());
                self.raw_rows.push(RawRow {
                    can_id: frame.can_id(),
                    dlc: frame.dlc(),
                    data: frame.hex_data(),
                    count: 1,
                    updated_at: now,
                });
            }
        }
    }

    fn signals(&mut self, can_id: u32, signals: &[DecodedSignal]) {
        let now = Utc::now();
        for signal in signals {
            let label = signal.label();
            match self.signal_index.get(&label) {
                Some(&i) => {
                    let row = &mut self.signal_rows[i];
                    row.value.clone_from(&signal.value);
                    row.can_id = can_id;
                    row.updated_at = now;
                }
                None => {
                    self.signal_index.insert(label.clone(), self.signal_rows.len());
                    self.signal_rows.push(SignalRow {
                        label,
                        value: signal.value.clone(),
                        can_id,
                        updated_at: now,
                    });
                }
            }
        }
    }

    fn clear(&mut self) {
        self.raw_rows.clear();
        self.raw_index.clear();
        self.signal_rows.clear();
        self.signal_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_decoder::decode;

    fn feed(board: &mut SignalBoard, can_id: u32, data: &[u8]) {
        let frame = RawFrame::new(can_id, data).unwrap();
        board.raw_frame(&frame);
        board.signals(can_id, &decode(can_id, data).signals);
    }

    #[test]
    fn test_rows_overwrite_in_place() {
        let mut board = SignalBoard::new();
        feed(&mut board, 0x060, &[0x64, 0x00, 0x10, 0x27, 0, 0, 0, 0]);
        feed(&mut board, 0x0A0, &[0, 0, 0, 0, 0x32, 0, 0, 0x64]);
        feed(&mut board, 0x060, &[0xC8, 0x00, 0x10, 0x27, 0, 0, 0, 0]);

        assert_eq!(board.raw_rows().len(), 2);
        assert_eq!(board.raw_rows()[0].can_id, 0x060);
        assert_eq!(board.raw_row(0x060).unwrap().data, "c800102700000000");
        assert_eq!(board.raw_row(0x060).unwrap().count, 2);

        assert_eq!(board.signal_rows().len(), 5);
        assert_eq!(board.value("Bus Voltage (V)"), Some("20.00"));
        assert_eq!(board.value("Bus Current (A)"), Some("0.00"));
        assert_eq!(board.value("Battery SOH (%)"), Some("100"));
    }

    #[test]
    fn test_same_name_different_unit_keeps_separate_rows() {
        let mut board = SignalBoard::new();
        feed(&mut board, 0x303, &[0, 0, 0x20, 0x03, 0, 0, 0, 0]);
        feed(&mut board, 0x160, &[0, 0, 0, 0x58, 0x1B, 0, 0, 0]);

        assert_eq!(board.value("Speed Request (km/h)"), Some("0.0"));
        assert_eq!(board.value("Speed Request (RPM)"), Some("0"));
    }

    #[test]
    fn test_clear() {
        let mut board = SignalBoard::new();
        feed(&mut board, 0x060, &[0; 8]);
        assert!(!board.is_empty());
        board.clear();
        assert!(board.is_empty());
        assert_eq!(board.value("Bus Voltage (V)"), None);
    }
}
