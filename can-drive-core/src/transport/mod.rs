//! Bus transports
//!
//! A transport sends and receives raw frames. Link bring-up (bitrate,
//! `ip link set`) is outside this crate; a transport only opens an interface
//! that is already up.

use crate::command::OutboundFrameSet;
use crate::types::{RawFrame, TransportError};
use std::time::Duration;

pub mod memory;
#[cfg(feature = "socketcan")]
pub mod socketcan;

pub use memory::MemoryTransport;
#[cfg(feature = "socketcan")]
pub use self::socketcan::SocketCanTransport;

/// Common trait for all bus transports
pub trait BusTransport {
    /// Channel name this transport is bound to
    fn channel(&self) -> &str;

    /// Write one frame to the bus
    fn send(&mut self, frame: &RawFrame) -> Result<(), TransportError>;

    /// Non-blocking poll; `Ok(None)` when nothing is queued
    fn receive(&mut self) -> Result<Option<RawFrame>, TransportError>;
}

impl<T: BusTransport + ?Sized> BusTransport for Box<T> {
    fn channel(&self) -> &str {
        (**self).channel()
    }

    fn send(&mut self, frame: &RawFrame) -> Result<(), TransportError> {
        (**self).send(frame)
    }

    fn receive(&mut self) -> Result<Option<RawFrame>, TransportError> {
        (**self).receive()
    }
}

/// Send a frame set strictly in order, pausing `delay` between frames
///
/// The burst runs to completion; a failed send aborts the remaining frames
/// and returns the error.
pub fn dispatch<T>(
    transport: &mut T,
    frames: &OutboundFrameSet,
    delay: Duration,
) -> Result<(), TransportError>
where
    T: BusTransport + ?Sized,
{
    for (i, frame) in frames.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        log::trace!("TX {}", frame);
        transport.send(frame)?;
    }
    Ok(())
}
