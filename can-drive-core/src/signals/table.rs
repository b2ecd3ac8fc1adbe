//! The vehicle's inbound signal table
//!
//! One [`MessageSpec`] per supported identifier. Adding a frame type means
//! adding an entry here; the decoder itself never changes.

use super::spec::{Field, MessageSpec, SignalSpec, Transform, ValueType};
use crate::command::GEAR_LABELS;

const fn u16_le(start: usize) -> Field {
    Field::Bytes {
        start,
        len: 2,
        value_type: ValueType::Unsigned,
    }
}

const fn bit(byte: usize, shift: u8) -> Field {
    Field::Bits {
        byte,
        shift,
        mask: 0x01,
    }
}

const fn linear(scale: f64, offset: f64, decimals: usize) -> Transform {
    Transform::Linear {
        scale,
        offset,
        decimals,
    }
}

const ON_OFF: Transform = Transform::Flag {
    set: "ON",
    clear: "OFF",
};

const TRIGGER: Transform = Transform::Flag {
    set: "trigger",
    clear: "Not trigger",
};

/// Drive state modes reported by the VCU
pub const DRIVE_STATE_LABELS: &[&str] = &[
    "Remote Control Mode",
    "AD Mode",
    "Parallel Mode",
    "Semi-Autonomous Mode",
];

/// Motor controller drive modes
pub const MCU_DRIVE_MODE_LABELS: &[&str] = &["Torque", "Speed", "Torque Ring", "Speed Loop"];

const VCU_STATUS: &[SignalSpec] = &[
    SignalSpec {
        name: "Vehicle Gear",
        unit: None,
        field: Field::Bits {
            byte: 0,
            shift: 0,
            mask: 0x03,
        },
        transform: Transform::Enumeration {
            labels: GEAR_LABELS,
        },
    },
    SignalSpec {
        name: "Drive State Mode",
        unit: None,
        field: Field::Bits {
            byte: 1,
            shift: 0,
            mask: 0x03,
        },
        transform: Transform::Enumeration {
            labels: DRIVE_STATE_LABELS,
        },
    },
    SignalSpec {
        name: "Speed Request",
        unit: Some("km/h"),
        field: u16_le(2),
        transform: linear(0.1, -80.0, 1),
    },
];

const EPS_STATUS: &[SignalSpec] = &[
    SignalSpec {
        name: "Direction Angle",
        unit: Some("deg"),
        field: u16_le(1),
        transform: Transform::Integer { offset: 0 },
    },
    SignalSpec {
        name: "EPS Control",
        unit: None,
        field: bit(0, 0),
        transform: Transform::Flag {
            set: "Works",
            clear: "Stops",
        },
    },
];

const CHASSIS_STATUS: &[SignalSpec] = &[
    SignalSpec {
        name: "Vehicle Speed",
        unit: Some("km/h"),
        field: u16_le(0),
        transform: linear(0.1, -80.0, 1),
    },
    SignalSpec {
        name: "Wheel Angle",
        unit: Some("deg"),
        field: u16_le(4),
        transform: linear(0.1, -35.0, 1),
    },
    SignalSpec {
        name: "Brake Pressure",
        unit: Some("MPa"),
        field: u16_le(2),
        transform: linear(0.01, 0.0, 2),
    },
];

const BODY_STATUS: &[SignalSpec] = &[
    SignalSpec {
        name: "Brake Light",
        unit: None,
        field: bit(5, 0),
        transform: ON_OFF,
    },
    SignalSpec {
        name: "Head Light",
        unit: None,
        field: bit(1, 7),
        transform: ON_OFF,
    },
    SignalSpec {
        name: "Emergency Button",
        unit: None,
        field: bit(0, 0),
        transform: Transform::Flag {
            set: "Pressed",
            clear: "Not Pressed",
        },
    },
    SignalSpec {
        name: "Back Touch Switch",
        unit: None,
        field: bit(1, 5),
        transform: TRIGGER,
    },
    SignalSpec {
        name: "Front Touch Switch",
        unit: None,
        field: bit(1, 4),
        transform: TRIGGER,
    },
];

const EPS_FEEDBACK: &[SignalSpec] = &[
    SignalSpec {
        name: "EPS Current Angle",
        unit: Some("deg"),
        field: Field::Bytes {
            start: 1,
            len: 2,
            value_type: ValueType::Signed,
        },
        transform: Transform::Integer { offset: 0 },
    },
    SignalSpec {
        name: "EPS Temperature",
        unit: Some("°C"),
        field: Field::Bytes {
            start: 6,
            len: 1,
            value_type: ValueType::Signed,
        },
        transform: Transform::Integer { offset: 0 },
    },
];

const POWER_BUS: &[SignalSpec] = &[
    SignalSpec {
        name: "Bus Voltage",
        unit: Some("V"),
        field: u16_le(0),
        transform: linear(0.1, 0.0, 2),
    },
    SignalSpec {
        name: "Bus Current",
        unit: Some("A"),
        field: u16_le(2),
        transform: linear(0.1, -1000.0, 2),
    },
];

const MCU_COMMAND: &[SignalSpec] = &[
    SignalSpec {
        name: "Drive Mode",
        unit: None,
        field: Field::Bits {
            byte: 0,
            shift: 1,
            mask: 0x03,
        },
        transform: Transform::Enumeration {
            labels: MCU_DRIVE_MODE_LABELS,
        },
    },
    SignalSpec {
        name: "Brake Request",
        unit: None,
        field: bit(0, 3),
        transform: Transform::Flag {
            set: "Hold brake",
            clear: "Release",
        },
    },
    SignalSpec {
        name: "Speed Request",
        unit: Some("RPM"),
        field: Field::Bytes {
            start: 3,
            len: 3,
            value_type: ValueType::Unsigned,
        },
        transform: Transform::Integer { offset: -7000 },
    },
    SignalSpec {
        name: "Torque Request",
        unit: Some("Nm"),
        field: u16_le(1),
        transform: linear(0.1, -1000.0, 1),
    },
];

const BMS_STATUS: &[SignalSpec] = &[
    SignalSpec {
        name: "Battery SOH",
        unit: Some("%"),
        field: Field::Bytes {
            start: 7,
            len: 1,
            value_type: ValueType::Unsigned,
        },
        transform: Transform::Integer { offset: 0 },
    },
    SignalSpec {
        name: "Battery SOC",
        unit: Some("%"),
        field: Field::Bytes {
            start: 4,
            len: 1,
            value_type: ValueType::Unsigned,
        },
        transform: linear(0.4, 0.0, 2),
    },
    SignalSpec {
        name: "Battery Voltage",
        unit: Some("V"),
        field: u16_le(2),
        transform: linear(0.1, 0.0, 2),
    },
];

/// Every identifier the decoder understands
pub static SIGNAL_TABLE: &[MessageSpec] = &[
    MessageSpec {
        can_id: 0x303,
        name: "VCU_Status",
        signals: VCU_STATUS,
    },
    MessageSpec {
        can_id: 0x314,
        name: "EPS_Status",
        signals: EPS_STATUS,
    },
    MessageSpec {
        can_id: 0x304,
        name: "Chassis_Status",
        signals: CHASSIS_STATUS,
    },
    MessageSpec {
        can_id: 0x301,
        name: "Body_Status",
        signals: BODY_STATUS,
    },
    MessageSpec {
        can_id: 0x18F,
        name: "EPS_Feedback",
        signals: EPS_FEEDBACK,
    },
    MessageSpec {
        can_id: 0x060,
        name: "Power_Bus",
        signals: POWER_BUS,
    },
    MessageSpec {
        can_id: 0x160,
        name: "MCU_Command",
        signals: MCU_COMMAND,
    },
    MessageSpec {
        can_id: 0x0A0,
        name: "BMS_Status",
        signals: BMS_STATUS,
    },
];

/// Get the message definition for a CAN identifier
pub fn message_spec(can_id: u32) -> Option<&'static MessageSpec> {
    SIGNAL_TABLE.iter().find(|m| m.can_id == can_id)
}

/// Statistics about the signal table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub num_messages: usize,
    pub num_signals: usize,
}

/// Count messages and signals in the table
pub fn stats() -> TableStats {
    TableStats {
        num_messages: SIGNAL_TABLE.len(),
        num_signals: SIGNAL_TABLE.iter().map(|m| m.signals.len()).sum(),
    }
}
