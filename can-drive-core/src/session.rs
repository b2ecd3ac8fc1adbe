//! Control session
//!
//! A [`Session`] owns the bus transport for its connected lifetime and runs
//! on a single thread, driven by two periodic triggers:
//!
//! - the inbound poll, which drains at most `max_frames_per_poll` frames per
//!   tick into the display sink (raw and decoded);
//! - the scheduler heartbeat, which re-sends the active drive command.
//!
//! Frame sets are dispatched in full before any other work proceeds. A
//! receive failure ends the session: both triggers are disarmed and every
//! later operation fails with [`TransportError::Disconnected`].

use crate::command::{CommandScheduler, DriveCommand, OutboundFrameSet, SchedulerState};
use crate::config::ControlConfig;
use crate::display::DisplaySink;
use crate::frame_decoder::FrameDecoder;
use crate::transport::{self, BusTransport};
use crate::trigger::PeriodicTrigger;
use crate::types::{RawFrame, Result, TransportError};
use std::time::{Duration, Instant};

/// Counters collected over a session's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames received from the bus
    pub frames_received: u64,
    /// Signals that failed to decode
    pub decode_errors: u64,
    /// Drive frame sets put on the bus (initial, heartbeat and stop)
    pub frame_sets_sent: u64,
    /// Operator frames sent with [`Session::send_raw`]
    pub raw_frames_sent: u64,
}

pub struct Session<T: BusTransport, S: DisplaySink> {
    config: ControlConfig,
    transport: T,
    sink: S,
    scheduler: CommandScheduler,
    poll: PeriodicTrigger,
    connected: bool,
    stats: SessionStats,
}

impl<T: BusTransport, S: DisplaySink> Session<T, S> {
    /// Take ownership of a connected transport and arm the inbound poll
    pub fn new(transport: T, sink: S, config: ControlConfig) -> Self {
        let mut poll = PeriodicTrigger::new(config.poll_interval());
        poll.arm(Instant::now());
        log::info!(
            "Session started on '{}' (poll {}ms, heartbeat {}ms)",
            transport.channel(),
            config.poll_interval_ms,
            config.heartbeat_interval_ms
        );

        Self {
            scheduler: CommandScheduler::new(config.heartbeat_interval()),
            config,
            transport,
            sink,
            poll,
            connected: true,
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Drain up to `max_frames_per_poll` queued frames into the sink
    ///
    /// Returns the number of frames processed. Frames beyond the bound stay
    /// queued for the next tick.
    pub fn poll_inbound(&mut self) -> Result<usize> {
        self.ensure_connected()?;

        let mut processed = 0;
        while processed < self.config.max_frames_per_poll {
            let frame = match self.transport.receive() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    log::error!("Read error on '{}': {}", self.transport.channel(), e);
                    self.mark_disconnected();
                    return Err(e.into());
                }
            };

            log::trace!("RX {}", frame);
            self.sink.raw_frame(&frame);
            let decoded = FrameDecoder::decode_frame(&frame);
            if !decoded.signals.is_empty() {
                self.sink.signals(frame.can_id(), &decoded.signals);
            }
            self.stats.decode_errors += decoded.errors.len() as u64;
            self.stats.frames_received += 1;
            processed += 1;
        }

        Ok(processed)
    }

    /// Send `command` now and keep re-sending it on every heartbeat
    pub fn start_drive(&mut self, command: DriveCommand) -> Result<()> {
        self.ensure_connected()?;
        let frames = self.scheduler.start(command, Instant::now());
        if let Err(e) = self.dispatch(&frames) {
            // Nothing reached the ECU; do not keep a heartbeat for it
            self.scheduler.abandon();
            return Err(e);
        }
        Ok(())
    }

    /// Replace the active command; it goes out with the next heartbeat
    pub fn update_drive(&mut self, command: DriveCommand) -> Result<()> {
        self.ensure_connected()?;
        self.scheduler.update(command)?;
        Ok(())
    }

    /// Stop the heartbeat and send the zero command once
    pub fn stop_drive(&mut self) -> Result<()> {
        self.ensure_connected()?;
        let frames = self.scheduler.stop();
        self.dispatch(&frames)
    }

    /// Send a single operator-built frame
    pub fn send_raw(&mut self, frame: &RawFrame) -> Result<()> {
        self.ensure_connected()?;
        log::debug!("Sending raw frame {}", frame);
        self.transport.send(frame)?;
        self.stats.raw_frames_sent += 1;
        Ok(())
    }

    /// Run every trigger due at `now`: inbound poll first, then heartbeat
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        self.ensure_connected()?;
        if self.poll.fire_if_due(now) {
            self.poll_inbound()?;
        }
        if let Some(frames) = self.scheduler.poll(now) {
            self.dispatch(&frames)?;
        }
        Ok(())
    }

    /// Earliest pending trigger deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.poll.deadline(), self.scheduler.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Tick and sleep until `deadline`
    pub fn run_until(&mut self, deadline: Instant) -> Result<()> {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            self.tick(now)?;

            let wake = self
                .next_deadline()
                .map_or(deadline, |next| next.min(deadline));
            let pause = wake.saturating_duration_since(Instant::now());
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }
    }

    /// Tick and sleep for `duration`
    pub fn run_for(&mut self, duration: Duration) -> Result<()> {
        self.run_until(Instant::now() + duration)
    }

    /// Stop both triggers and give the transport and sink back
    ///
    /// No stop command is sent; call [`Session::stop_drive`] first if the
    /// vehicle should be brought to a standstill.
    pub fn disconnect(mut self) -> (T, S) {
        self.poll.disarm();
        self.scheduler.abandon();
        log::info!("Session on '{}' disconnected", self.transport.channel());
        (self.transport, self.sink)
    }

    fn dispatch(&mut self, frames: &OutboundFrameSet) -> Result<()> {
        transport::dispatch(&mut self.transport, frames, self.config.inter_frame_delay())?;
        self.stats.frame_sets_sent += 1;
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(TransportError::Disconnected.into())
        }
    }

    fn mark_disconnected(&mut self) {
        self.connected = false;
        self.poll.disarm();
        self.scheduler.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::SignalBoard;
    use crate::transport::MemoryTransport;
    use crate::types::Error;

    fn session() -> Session<MemoryTransport, SignalBoard> {
        let config = ControlConfig::new()
            .with_interface("mem")
            .with_max_frames_per_poll(3)
            .with_inter_frame_delay(Duration::ZERO);
        Session::new(MemoryTransport::new("mem"), SignalBoard::new(), config)
    }

    #[test]
    fn test_poll_is_bounded() {
        let mut session = session();
        for i in 0..5u8 {
            let frame = RawFrame::new(0x060, &[i, 0, 0x10, 0x27, 0, 0, 0, 0]).unwrap();
            session.transport_mut().push_inbound(frame);
        }

        assert_eq!(session.poll_inbound().unwrap(), 3);
        assert_eq!(session.transport().pending_inbound(), 2);
        assert_eq!(session.poll_inbound().unwrap(), 2);
        assert_eq!(session.poll_inbound().unwrap(), 0);

        assert_eq!(session.stats().frames_received, 5);
        assert_eq!(session.sink().raw_rows().len(), 1);
        assert_eq!(session.sink().value("Bus Voltage (V)"), Some("0.40"));
    }

    #[test]
    fn test_unknown_frames_reach_raw_view_only() {
        let mut session = session();
        session
            .transport_mut()
            .push_inbound(RawFrame::new(0x7AB, &[1, 2, 3]).unwrap());
        session.poll_inbound().unwrap();

        assert_eq!(session.sink().raw_row(0x7AB).unwrap().data, "010203");
        assert!(session.sink().signal_rows().is_empty());
    }

    #[test]
    fn test_read_failure_disconnects() {
        let mut session = session();
        session.start_drive(DriveCommand::new(5.0, 0.0).unwrap()).unwrap();
        session.transport_mut().unplug();

        assert!(matches!(
            session.poll_inbound(),
            Err(Error::Transport(TransportError::Receive(_)))
        ));
        assert!(!session.is_connected());
        assert_eq!(session.scheduler_state(), SchedulerState::Idle);
        assert_eq!(session.next_deadline(), None);
        assert!(matches!(
            session.tick(Instant::now()),
            Err(Error::Transport(TransportError::Disconnected))
        ));
        assert!(session.stop_drive().is_err());
    }

    #[test]
    fn test_failed_start_does_not_arm_heartbeat() {
        let mut session = session();
        session.transport_mut().fail_sends_after(0);
        assert!(session.start_drive(DriveCommand::new(5.0, 0.0).unwrap()).is_err());
        assert_eq!(session.scheduler_state(), SchedulerState::Idle);
        assert!(session.is_connected());
    }

    #[test]
    fn test_update_requires_active_command() {
        let mut session = session();
        assert!(matches!(
            session.update_drive(DriveCommand::STOP),
            Err(Error::Scheduler(_))
        ));
    }

    #[test]
    fn test_send_raw() {
        let mut session = session();
        let frame = RawFrame::new(0x10A, &[0x02, 0x01]).unwrap();
        session.send_raw(&frame).unwrap();
        assert_eq!(session.transport().sent(), &[frame]);
        assert_eq!(session.stats().raw_frames_sent, 1);
    }

    #[test]
    fn test_disconnect_returns_transport() {
        let mut session = session();
        session.start_drive(DriveCommand::new(5.0, 0.0).unwrap()).unwrap();
        let (transport, board) = session.disconnect();
        // Only the initial burst; disconnect sends nothing
        assert_eq!(transport.sent().len(), 5);
        assert!(board.is_empty());
    }
}
