use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change in the system produces an Event.
/// The CLI prints them; a GUI layer would subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// A phase ran down to zero. Side effects (sound, notification,
    /// pomodoro stat) fire exactly once per one of these.
    PhaseCompleted {
        completed: Phase,
        next: Phase,
        /// True when the completed phase was Work; only then does the
        /// profile store's pomodoro counter move.
        work_phase: bool,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        id: String,
        at: DateTime<Utc>,
    },
    /// Remote sync failed; the session continues on local state only.
    SyncDegraded {
        at: DateTime<Utc>,
    },
}
