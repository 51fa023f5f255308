use std::time::{Duration, Instant};

/// Time of a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockIndex {
    /// Time passed since previous step.
    pub delta: Duration,

    /// Instant of this step.
    pub step: Instant,

    /// Instant of the first step.
    pub start: Instant,
}

impl ClockIndex {
    pub fn elapsed(&self) -> Duration {
        self.step - self.start
    }
}

/// Frame clock.
pub struct Clocks {
    start: Instant,
    last: Instant,
}

impl Default for Clocks {
    fn default() -> Self {
        Clocks::new()
    }
}

impl Clocks {
    pub fn new() -> Self {
        let now = Instant::now();
        Clocks {
            start: now,
            last: now,
        }
    }

    /// Steps to current instant.
    pub fn step(&mut self) -> ClockIndex {
        let now = Instant::now();
        self.step_to(now.max(self.last))
    }

    /// Steps by fixed `delta`, regardless of wall clock.
    pub fn advance(&mut self, delta: Duration) -> ClockIndex {
        self.step_to(self.last + delta)
    }

    fn step_to(&mut self, step: Instant) -> ClockIndex {
        let delta = step - self.last;
        self.last = step;
        ClockIndex {
            delta,
            step,
            start: self.start,
        }
    }
}

/// Host playback state fed into skeleton updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    /// Host is simulating, local time follows the clock.
    Running(ClockIndex),

    /// Host is idle (e.g. paused editor), clock time is unavailable.
    Idle,
}

impl Playback {
    pub fn is_running(&self) -> bool {
        matches!(self, Playback::Running(_))
    }

    /// Seconds since playback start, if running.
    pub fn time(&self) -> Option<f32> {
        match self {
            Playback::Running(clock) => Some(clock.elapsed().as_secs_f32()),
            Playback::Idle => None,
        }
    }
}

/// Override of the effect's local time by an external sequencer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeControl {
    FreeRunning,

    /// Sequencer owns the time.
    /// Until it pins a value the playback clock is still used.
    Controlled { pinned: Option<f32> },
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl::FreeRunning
    }
}

impl TimeControl {
    pub fn is_controlled(&self) -> bool {
        matches!(self, TimeControl::Controlled { .. })
    }

    /// Local time for this frame, `0` while the host is idle.
    pub fn local_time(&self, playback: &Playback) -> f32 {
        self.local_time_or(playback, 0.0)
    }

    /// Local time for this frame, `idle` while the host is idle.
    pub fn local_time_or(&self, playback: &Playback, idle: f32) -> f32 {
        match self {
            TimeControl::Controlled { pinned: Some(time) } => *time,
            _ => playback.time().unwrap_or(idle),
        }
    }
}

/// Interface exposed to external sequencing tools.
pub trait TimeControlled {
    fn enter_control(&mut self);

    fn exit_control(&mut self);

    /// Pins local time.
    /// Implicitly enters control if not controlled yet.
    fn set_time(&mut self, time: f32);
}

impl TimeControlled for TimeControl {
    fn enter_control(&mut self) {
        if !self.is_controlled() {
            *self = TimeControl::Controlled { pinned: None };
        }
    }

    fn exit_control(&mut self) {
        *self = TimeControl::FreeRunning;
    }

    fn set_time(&mut self, time: f32) {
        *self = TimeControl::Controlled { pinned: Some(time) };
    }
}
