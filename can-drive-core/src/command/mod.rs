//! Outbound drive control
//!
//! Drive command model, the five-frame encoder and the heartbeat scheduler.

pub mod drive;
pub mod encoder;
pub mod scheduler;

pub use drive::{DriveCommand, Gear, Indicator, GEAR_LABELS, MAX_SPEED_KMH, MAX_STEERING_DEG};
pub use encoder::{encode, OutboundFrameSet};
pub use scheduler::{CommandScheduler, SchedulerEvent, SchedulerState, Transition};
