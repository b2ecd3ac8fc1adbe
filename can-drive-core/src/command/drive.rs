//! Operator drive commands and the states derived from them

use crate::types::CommandError;
use std::fmt;

/// Largest speed magnitude a 16-bit field holds at 0.1 km/h resolution
pub const MAX_SPEED_KMH: f64 = 6553.5;

/// Steering limit; the encoder's +30° offset maps [-30, 30] onto the wire field
pub const MAX_STEERING_DEG: f64 = 30.0;

/// Gear labels indexed by gear code
pub const GEAR_LABELS: &[&str] = &["Park", "Drive", "Neutral", "Reverse"];

/// Vehicle gear, indexed by its wire code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Gear {
    Park = 0,
    Drive = 1,
    Neutral = 2,
    Reverse = 3,
}

impl Gear {
    /// Wire code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Gear for a wire code (only the low two bits are significant)
    pub const fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Gear::Park,
            1 => Gear::Drive,
            2 => Gear::Neutral,
            _ => Gear::Reverse,
        }
    }

    pub fn label(self) -> &'static str {
        GEAR_LABELS[self as usize]
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Turn indicator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    None,
    Left,
    Right,
}

impl Indicator {
    /// Wire code for the indicator frame
    pub const fn code(self) -> u8 {
        match self {
            Indicator::None => 0x00,
            Indicator::Left => 0xF1,
            Indicator::Right => 0xF2,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Indicator::None => "None",
            Indicator::Left => "Left",
            Indicator::Right => "Right",
        };
        f.write_str(label)
    }
}

/// A speed/steering setpoint
///
/// Gear and indicator are not stored; they are always derived from the two
/// fields by [`DriveCommand::gear`] and [`DriveCommand::indicator`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveCommand {
    speed_kmh: f64,
    steering_deg: f64,
}

impl DriveCommand {
    /// Zero speed, straight ahead; sent when the vehicle is stopped
    pub const STOP: DriveCommand = DriveCommand {
        speed_kmh: 0.0,
        steering_deg: 0.0,
    };

    /// Build a command, rejecting values the wire fields cannot carry
    pub fn new(speed_kmh: f64, steering_deg: f64) -> Result<Self, CommandError> {
        check("speed", speed_kmh, MAX_SPEED_KMH)?;
        check("steering angle", steering_deg, MAX_STEERING_DEG)?;
        Ok(Self {
            speed_kmh,
            steering_deg,
        })
    }

    /// Build a command without bounds checks
    ///
    /// Out-of-range values are truncated to 16 bits by the encoder, which is
    /// what the vehicle's legacy tooling put on the wire.
    pub const fn unchecked(speed_kmh: f64, steering_deg: f64) -> Self {
        Self {
            speed_kmh,
            steering_deg,
        }
    }

    /// Commanded speed in km/h; negative means reverse
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Commanded steering angle in degrees; positive turns left
    pub fn steering_deg(&self) -> f64 {
        self.steering_deg
    }

    pub fn gear(&self) -> Gear {
        if self.speed_kmh < 0.0 {
            Gear::Reverse
        } else if self.speed_kmh == 0.0 && self.steering_deg == 0.0 {
            Gear::Neutral
        } else {
            Gear::Drive
        }
    }

    pub fn indicator(&self) -> Indicator {
        if self.steering_deg < 0.0 {
            Indicator::Right
        } else if self.steering_deg > 0.0 {
            Indicator::Left
        } else {
            Indicator::None
        }
    }
}

impl fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} km/h, {:.1} deg ({}, indicator {})",
            self.speed_kmh,
            self.steering_deg,
            self.gear(),
            self.indicator()
        )
    }
}

fn check(field: &'static str, value: f64, limit: f64) -> Result<(), CommandError> {
    if !value.is_finite() {
        return Err(CommandError::NotFinite { field, value });
    }
    if value.abs() > limit {
        return Err(CommandError::OutOfRange {
            field,
            value,
            min: -limit,
            max: limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gear_selection() {
        assert_eq!(DriveCommand::new(10.0, 0.0).unwrap().gear(), Gear::Drive);
        assert_eq!(DriveCommand::new(-5.0, 0.0).unwrap().gear(), Gear::Reverse);
        assert_eq!(DriveCommand::new(0.0, 0.0).unwrap().gear(), Gear::Neutral);
        // Steering at standstill still selects Drive
        assert_eq!(DriveCommand::new(0.0, 5.0).unwrap().gear(), Gear::Drive);
        assert_eq!(DriveCommand::STOP.gear(), Gear::Neutral);
    }

    #[test]
    fn test_indicator_selection() {
        assert_eq!(DriveCommand::new(1.0, -0.1).unwrap().indicator(), Indicator::Right);
        assert_eq!(DriveCommand::new(1.0, 0.1).unwrap().indicator(), Indicator::Left);
        assert_eq!(DriveCommand::new(1.0, 0.0).unwrap().indicator(), Indicator::None);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Gear::Reverse.code(), 3);
        assert_eq!(Gear::from_code(0xFE), Gear::Neutral);
        assert_eq!(Gear::Drive.label(), "Drive");
        assert_eq!(Indicator::Left.code(), 0xF1);
        assert_eq!(Indicator::Right.code(), 0xF2);
    }

    #[test]
    fn test_bounds() {
        assert!(DriveCommand::new(MAX_SPEED_KMH, MAX_STEERING_DEG).is_ok());
        assert!(DriveCommand::new(-MAX_SPEED_KMH, -MAX_STEERING_DEG).is_ok());
        assert!(matches!(
            DriveCommand::new(f64::NAN, 0.0),
            Err(CommandError::NotFinite { field: "speed", .. })
        ));
        assert!(matches!(
            DriveCommand::new(0.0, f64::INFINITY),
            Err(CommandError::NotFinite { field: "steering angle", .. })
        ));
        assert!(matches!(
            DriveCommand::new(7000.0, 0.0),
            Err(CommandError::OutOfRange { field: "speed", .. })
        ));
        assert!(matches!(
            DriveCommand::new(0.0, -30.5),
            Err(CommandError::OutOfRange { field: "steering angle", .. })
        ));
    }

    #[test]
    fn test_display() {
        let cmd = DriveCommand::new(-5.0, 12.0).unwrap();
        assert_eq!(cmd.to_string(), "-5.0 km/h, 12.0 deg (Reverse, indicator Left)");
    }
}
