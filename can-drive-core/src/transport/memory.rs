//! In-memory transport
//!
//! Queues inbound frames pushed by the caller and records every frame sent.
//! Used for offline runs and tests.

use super::BusTransport;
use crate::types::{RawFrame, TransportError};
use std::collections::VecDeque;
use std::io;

#[derive(Debug, Default)]
pub struct MemoryTransport {
    channel: String,
    inbound: VecDeque<RawFrame>,
    sent: Vec<RawFrame>,
    sends_before_failure: Option<usize>,
    fail_receive: bool,
}

impl MemoryTransport {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Self::default()
        }
    }

    /// Queue a frame for the next `receive`
    pub fn push_inbound(&mut self, frame: RawFrame) {
        self.inbound.push_back(frame);
    }

    /// Frames still waiting to be received
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Every frame sent so far, in order
    pub fn sent(&self) -> &[RawFrame] {
        &self.sent
    }

    /// Drain the sent-frame log
    pub fn take_sent(&mut self) -> Vec<RawFrame> {
        std::mem::take(&mut self.sent)
    }

    /// Make every send after the next `count` successful ones fail
    pub fn fail_sends_after(&mut self, count: usize) {
        self.sends_before_failure = Some(count);
    }

    /// Make every subsequent receive fail, as an unplugged device would
    pub fn unplug(&mut self) {
        self.fail_receive = true;
    }
}

impl BusTransport for MemoryTransport {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn send(&mut self, frame: &RawFrame) -> Result<(), TransportError> {
        if let Some(remaining) = self.sends_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(TransportError::Send {
                    can_id: frame.can_id(),
                    source: io::Error::new(io::ErrorKind::BrokenPipe, "send rejected"),
                });
            }
            *remaining -= 1;
        }
        self.sent.push(*frame);
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<RawFrame>, TransportError> {
        if self.fail_receive {
            return Err(TransportError::Receive(io::Error::new(
                io::ErrorKind::NotConnected,
                "device unplugged",
            )));
        }
        Ok(self.inbound.pop_front())
    }
}
