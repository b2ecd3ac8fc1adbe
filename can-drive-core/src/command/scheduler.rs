//! Command scheduler
//!
//! Holds at most one active drive command and decides when its frame set
//! goes on the bus: once on `start`, on every heartbeat while active, and a
//! final zero command on `stop`.
//!
//! The state machine itself is [`SchedulerState::apply`], a pure transition
//! function. [`CommandScheduler`] pairs it with the heartbeat trigger and the
//! encoder.

use super::drive::DriveCommand;
use super::encoder::{self, OutboundFrameSet};
use crate::trigger::PeriodicTrigger;
use crate::types::SchedulerError;
use std::time::{Duration, Instant};

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SchedulerState {
    /// No active command
    #[default]
    Idle,
    /// Re-sending `command` on every heartbeat
    Active { command: DriveCommand },
}

/// Inputs to the scheduler state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerEvent {
    Start(DriveCommand),
    Update(DriveCommand),
    Heartbeat,
    Stop,
}

/// Result of a transition: the next state and the command to send now, if any
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: SchedulerState,
    pub send: Option<DriveCommand>,
}

impl SchedulerState {
    /// The active command, if any
    pub fn command(&self) -> Option<DriveCommand> {
        match self {
            SchedulerState::Idle => None,
            SchedulerState::Active { command } => Some(*command),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SchedulerState::Active { .. })
    }

    /// Apply one event
    ///
    /// - `Start` from any state sends immediately and becomes active (last writer wins).
    /// - `Update` replaces the active command without sending; it is an error while idle.
    /// - `Heartbeat` re-sends the active command; it is a no-op while idle.
    /// - `Stop` sends the zero command once and becomes idle.
    pub fn apply(self, event: SchedulerEvent) -> Result<Transition, SchedulerError> {
        let transition = match (self, event) {
            (_, SchedulerEvent::Start(command)) => Transition {
                state: SchedulerState::Active { command },
                send: Some(command),
            },
            (SchedulerState::Active { .. }, SchedulerEvent::Update(command)) => Transition {
                state: SchedulerState::Active { command },
                send: None,
            },
            (SchedulerState::Idle, SchedulerEvent::Update(_)) => {
                return Err(SchedulerError::NotActive)
            }
            (SchedulerState::Active { command }, SchedulerEvent::Heartbeat) => Transition {
                state: self,
                send: Some(command),
            },
            (SchedulerState::Idle, SchedulerEvent::Heartbeat) => Transition {
                state: self,
                send: None,
            },
            (_, SchedulerEvent::Stop) => Transition {
                state: SchedulerState::Idle,
                send: Some(DriveCommand::STOP),
            },
        };
        Ok(transition)
    }
}

/// Stateful wrapper: state machine + heartbeat trigger + encoder
#[derive(Debug, Clone)]
pub struct CommandScheduler {
    state: SchedulerState,
    heartbeat: PeriodicTrigger,
}

impl CommandScheduler {
    pub fn new(heartbeat_interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            heartbeat: PeriodicTrigger::new(heartbeat_interval),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Next heartbeat deadline, if active
    pub fn deadline(&self) -> Option<Instant> {
        self.heartbeat.deadline()
    }

    /// Activate `command`; returns the frame set to send right away
    pub fn start(&mut self, command: DriveCommand, now: Instant) -> OutboundFrameSet {
        let frames = self.step(SchedulerEvent::Start(command)).ok().flatten();
        self.heartbeat.arm(now);
        log::info!("Drive command started: {}", command);
        frames.unwrap_or_else(|| encoder::encode(&command))
    }

    /// Replace the active command; it goes out on the next heartbeat
    pub fn update(&mut self, command: DriveCommand) -> Result<(), SchedulerError> {
        self.step(SchedulerEvent::Update(command))?;
        log::debug!("Drive command updated: {}", command);
        Ok(())
    }

    /// Frame set to re-send if the heartbeat is due at `now`
    pub fn poll(&mut self, now: Instant) -> Option<OutboundFrameSet> {
        if !self.heartbeat.fire_if_due(now) {
            return None;
        }
        let frames = self.step(SchedulerEvent::Heartbeat).ok().flatten();
        if let Some(command) = self.state.command() {
            log::debug!("Heartbeat: {}", command);
        }
        frames
    }

    /// Deactivate; returns the zero-command frame set to send once
    pub fn stop(&mut self) -> OutboundFrameSet {
        self.heartbeat.disarm();
        let was_active = self.state.is_active();
        let frames = self.step(SchedulerEvent::Stop).ok().flatten();
        if was_active {
            log::info!("Drive command stopped");
        }
        frames.unwrap_or_else(|| encoder::encode(&DriveCommand::STOP))
    }

    /// Drop the active command without sending anything (transport gone)
    pub fn abandon(&mut self) {
        self.heartbeat.disarm();
        self.state = SchedulerState::Idle;
    }

    fn step(&mut self, event: SchedulerEvent) -> Result<Option<OutboundFrameSet>, SchedulerError> {
        let transition = self.state.apply(event)?;
        self.state = transition.state;
        Ok(transition.send.map(|command| encoder::encode(&command)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(speed: f64, angle: f64) -> DriveCommand {
        DriveCommand::new(speed, angle).unwrap()
    }

    #[test]
    fn test_transitions() {
        let active = SchedulerState::Idle
            .apply(SchedulerEvent::Start(cmd(5.0, 0.0)))
            .unwrap();
        assert_eq!(active.send, Some(cmd(5.0, 0.0)));
        assert!(active.state.is_active());

        let updated = active
            .state
            .apply(SchedulerEvent::Update(cmd(6.0, 1.0)))
            .unwrap();
        assert_eq!(updated.send, None);
        assert_eq!(updated.state.command(), Some(cmd(6.0, 1.0)));

        let beat = updated.state.apply(SchedulerEvent::Heartbeat).unwrap();
        assert_eq!(beat.send, Some(cmd(6.0, 1.0)));

        let stopped = beat.state.apply(SchedulerEvent::Stop).unwrap();
        assert_eq!(stopped.state, SchedulerState::Idle);
        assert_eq!(stopped.send, Some(DriveCommand::STOP));
    }

    #[test]
    fn test_idle_transitions() {
        assert_eq!(
            SchedulerState::Idle.apply(SchedulerEvent::Update(cmd(1.0, 0.0))),
            Err(SchedulerError::NotActive)
        );
        let beat = SchedulerState::Idle.apply(SchedulerEvent::Heartbeat).unwrap();
        assert_eq!(beat.send, None);
        assert_eq!(beat.state, SchedulerState::Idle);
    }

    #[test]
    fn test_restart_is_last_writer_wins() {
        let first = SchedulerState::Idle
            .apply(SchedulerEvent::Start(cmd(1.0, 0.0)))
            .unwrap();
        let second = first
            .state
            .apply(SchedulerEvent::Start(cmd(2.0, 0.0)))
            .unwrap();
        assert_eq!(second.state.command(), Some(cmd(2.0, 0.0)));
        assert_eq!(second.send, Some(cmd(2.0, 0.0)));
    }

    #[test]
    fn test_heartbeat_timing() {
        let t0 = Instant::now();
        let mut scheduler = CommandScheduler::new(Duration::from_millis(500));

        let initial = scheduler.start(cmd(10.0, 0.0), t0);
        assert_eq!(initial, encoder::encode(&cmd(10.0, 0.0)));
        assert!(scheduler.poll(t0 + Duration::from_millis(100)).is_none());

        let beat = scheduler.poll(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(beat, initial);
    }

    #[test]
    fn test_update_takes_effect_on_next_heartbeat() {
        let t0 = Instant::now();
        let mut scheduler = CommandScheduler::new(Duration::from_millis(500));
        scheduler.start(cmd(10.0, 0.0), t0);
        scheduler.update(cmd(3.0, -2.0)).unwrap();

        let beat = scheduler.poll(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(beat, encoder::encode(&cmd(3.0, -2.0)));
    }

    #[test]
    fn test_stop_disarms_heartbeat() {
        let t0 = Instant::now();
        let mut scheduler = CommandScheduler::new(Duration::from_millis(500));
        scheduler.start(cmd(10.0, 0.0), t0);

        let stop = scheduler.stop();
        assert_eq!(stop, encoder::encode(&DriveCommand::STOP));
        assert_eq!(scheduler.deadline(), None);
        assert!(scheduler.poll(t0 + Duration::from_secs(5)).is_none());
        assert_eq!(scheduler.update(cmd(1.0, 0.0)), Err(SchedulerError::NotActive));
    }
}
