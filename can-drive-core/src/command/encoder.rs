//! Drive command encoder
//!
//! Turns one [`DriveCommand`] into the five frames the motion-control ECUs
//! expect, in send order:
//!
//! | ID    | Purpose       | Payload                                         |
//! |-------|---------------|-------------------------------------------------|
//! | 0x501 | enable        | `F1 00 00 00 00 00 00 00`                       |
//! | 0x503 | brake release | `F1 00 00 00 00 00 00 00`                       |
//! | 0x502 | steering      | `F1 00 00 00 lo hi 00 00` (steering field)      |
//! | 0x506 | indicator     | `ii 00 00 00 00 00 00 00`                       |
//! | 0x504 | drive         | `F1 00 01 gg 00 00 lo hi` (gear, speed field)   |

use super::drive::DriveCommand;
use crate::types::RawFrame;
use byteorder::{ByteOrder, LittleEndian};

/// Enable / keep-alive frame
pub const ENABLE_ID: u16 = 0x501;
/// Steering setpoint frame
pub const STEERING_ID: u16 = 0x502;
/// Brake release frame
pub const BRAKE_RELEASE_ID: u16 = 0x503;
/// Gear and speed setpoint frame
pub const DRIVE_ID: u16 = 0x504;
/// Turn indicator frame
pub const INDICATOR_ID: u16 = 0x506;

/// Identifiers in the order they are put on the bus
pub const SEND_ORDER: [u16; 5] = [ENABLE_ID, BRAKE_RELEASE_ID, STEERING_ID, INDICATOR_ID, DRIVE_ID];

/// Marker byte leading every control frame except the indicator
const CONTROL_MARKER: u8 = 0xF1;

/// Drive frame sub-mode (byte 2)
const DRIVE_SUB_MODE: u8 = 0x01;

/// Steering field offset in degrees
const STEERING_OFFSET_DEG: f64 = 30.0;

/// Resolution of both speed and steering fields
const FIELD_RESOLUTION: f64 = 0.1;

/// The five frames encoding one drive command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundFrameSet {
    frames: [RawFrame; 5],
}

impl OutboundFrameSet {
    /// Frames in send order
    pub fn frames(&self) -> &[RawFrame; 5] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawFrame> {
        self.frames.iter()
    }

    /// The frame sent under `can_id`, if it belongs to the set
    pub fn get(&self, can_id: u32) -> Option<&RawFrame> {
        self.frames.iter().find(|f| f.can_id() == can_id)
    }
}

impl<'a> IntoIterator for &'a OutboundFrameSet {
    type Item = &'a RawFrame;
    type IntoIter = std::slice::Iter<'a, RawFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// 16-bit speed field: `round(|speed| / 0.1)`
pub fn speed_field(command: &DriveCommand) -> u16 {
    to_field(command.speed_kmh().abs())
}

/// 16-bit steering field: `round((angle + 30) / 0.1)`
pub fn steering_field(command: &DriveCommand) -> u16 {
    to_field(command.steering_deg() + STEERING_OFFSET_DEG)
}

// Values outside the field wrap to their low 16 bits
fn to_field(value: f64) -> u16 {
    (value / FIELD_RESOLUTION).round() as i64 as u16
}

/// Encode a drive command into its outbound frame set
pub fn encode(command: &DriveCommand) -> OutboundFrameSet {
    let gear = command.gear();
    let indicator = command.indicator();

    let mut steering = [CONTROL_MARKER, 0, 0, 0, 0, 0, 0, 0];
    LittleEndian::write_u16(&mut steering[4..6], steering_field(command));

    let mut drive = [CONTROL_MARKER, 0x00, DRIVE_SUB_MODE, gear.code(), 0, 0, 0, 0];
    LittleEndian::write_u16(&mut drive[6..8], speed_field(command));

    log::trace!("Encoding {} (gear {}, indicator {})", command, gear, indicator);

    OutboundFrameSet {
        frames: [
            RawFrame::standard(ENABLE_ID, [CONTROL_MARKER, 0, 0, 0, 0, 0, 0, 0]),
            RawFrame::standard(BRAKE_RELEASE_ID, [CONTROL_MARKER, 0, 0, 0, 0, 0, 0, 0]),
            RawFrame::standard(STEERING_ID, steering),
            RawFrame::standard(INDICATOR_ID, [indicator.code(), 0, 0, 0, 0, 0, 0, 0]),
            RawFrame::standard(DRIVE_ID, drive),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Gear, Indicator};

    fn drive_frame(set: &OutboundFrameSet) -> &[u8] {
        set.get(DRIVE_ID as u32).unwrap().data()
    }

    #[test]
    fn test_send_order_and_identifiers() {
        let set = encode(&DriveCommand::new(3.0, -4.0).unwrap());
        let ids: Vec<u32> = set.iter().map(|f| f.can_id()).collect();
        assert_eq!(ids, vec![0x501, 0x503, 0x502, 0x506, 0x504]);
        assert!(set.iter().all(|f| f.dlc() == 8 && !f.is_extended()));
    }

    #[test]
    fn test_forward_straight() {
        let cmd = DriveCommand::new(10.0, 0.0).unwrap();
        assert_eq!(cmd.gear(), Gear::Drive);
        assert_eq!(cmd.indicator(), Indicator::None);

        let set = encode(&cmd);
        assert_eq!(drive_frame(&set), &[0xF1, 0x00, 0x01, 0x01, 0, 0, 100, 0]);
        assert_eq!(set.get(0x506).unwrap().data()[0], 0x00);
        // (0 + 30) / 0.1 = 300 = 0x012C
        assert_eq!(set.get(0x502).unwrap().data(), &[0xF1, 0, 0, 0, 0x2C, 0x01, 0, 0]);
    }

    #[test]
    fn test_reverse_uses_magnitude() {
        let set = encode(&DriveCommand::new(-5.0, 0.0).unwrap());
        assert_eq!(drive_frame(&set)[3], Gear::Reverse.code());
        assert_eq!(&drive_frame(&set)[6..8], &[50, 0]);
    }

    #[test]
    fn test_neutral_at_standstill() {
        let set = encode(&DriveCommand::STOP);
        assert_eq!(drive_frame(&set)[3], Gear::Neutral.code());
        assert_eq!(&drive_frame(&set)[6..8], &[0, 0]);
    }

    #[test]
    fn test_indicator_codes_on_wire() {
        let left = encode(&DriveCommand::new(2.0, 15.0).unwrap());
        assert_eq!(left.get(0x506).unwrap().data()[0], 0xF1);

        let right = encode(&DriveCommand::new(2.0, -15.0).unwrap());
        assert_eq!(right.get(0x506).unwrap().data()[0], 0xF2);
        // (-15 + 30) / 0.1 = 150
        assert_eq!(&right.get(0x502).unwrap().data()[4..6], &[150, 0]);
    }

    #[test]
    fn test_constant_frames() {
        let set = encode(&DriveCommand::new(1.5, 1.5).unwrap());
        assert_eq!(set.get(0x501).unwrap().data(), &[0xF1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(set.get(0x503).unwrap().data(), &[0xF1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(speed_field(&DriveCommand::new(1.5, 0.0).unwrap()), 15);
    }

    #[test]
    fn test_unchecked_values_wrap() {
        // 7000 km/h -> 70000 = 0x11170, truncated to 0x1170
        assert_eq!(speed_field(&DriveCommand::unchecked(7000.0, 0.0)), 0x1170);
        // (-35 + 30) / 0.1 = -50 -> 0xFFCE
        assert_eq!(steering_field(&DriveCommand::unchecked(0.0, -35.0)), 0xFFCE);
    }
}
