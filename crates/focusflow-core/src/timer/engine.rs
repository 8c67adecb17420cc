//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-aware state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once
//! per second while the timer runs (see [`Ticker`](super::Ticker)).
//!
//! ## Phases
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... -> Work -> LongBreak -> Work
//! ```
//!
//! A phase completes when its countdown reaches zero. Completing Work
//! advances `completed_work_phases`; every `long_break_interval`-th Work
//! phase is followed by a long break (and the counter resets entering it).
//! Completing any break returns to Work. The engine never auto-starts the
//! next phase: completion leaves it paused at the next phase's full
//! duration.
//!
//! ## Resume
//!
//! Snapshots carry the wall-clock time they were taken at. [`TimerEngine::resume`]
//! re-derives the state a continuously running clock would be in: elapsed
//! suspension time is subtracted from the countdown, and if that underruns,
//! the phase is completed as if it had expired while the process was gone.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// One of the three Pomodoro countdown phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "work")]
    Work,
    #[serde(rename = "shortBreak")]
    ShortBreak,
    #[serde(rename = "longBreak")]
    LongBreak,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }
}

/// Phase lengths in minutes, plus the number of Work phases before a
/// long break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Durations {
    #[serde(default = "default_work_min")]
    pub work: u32,
    #[serde(default = "default_short_break_min")]
    pub short_break: u32,
    #[serde(default = "default_long_break_min")]
    pub long_break: u32,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
}

fn default_work_min() -> u32 {
    25
}
fn default_short_break_min() -> u32 {
    5
}
fn default_long_break_min() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}

const MAX_PHASE_MIN: u32 = 180;
const MAX_INTERVAL: u32 = 12;

impl Default for Durations {
    fn default() -> Self {
        Self {
            work: default_work_min(),
            short_break: default_short_break_min(),
            long_break: default_long_break_min(),
            long_break_interval: default_long_break_interval(),
        }
    }
}

impl Durations {
    /// Clamp every field to its valid range.
    pub fn clamped(self) -> Self {
        Self {
            work: self.work.clamp(1, MAX_PHASE_MIN),
            short_break: self.short_break.clamp(1, MAX_PHASE_MIN),
            long_break: self.long_break.clamp(1, MAX_PHASE_MIN),
            long_break_interval: self.long_break_interval.clamp(1, MAX_INTERVAL),
        }
    }

    /// Full duration of a phase, in seconds.
    pub fn secs(&self, phase: Phase) -> u32 {
        let minutes = match phase {
            Phase::Work => self.work,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        };
        minutes * 60
    }
}

/// Core timer engine.
///
/// Sole owner of the countdown state. Serializes to the persisted
/// `timer.json` snapshot blob; field names are the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerEngine {
    phase: Phase,
    seconds_remaining: u32,
    is_running: bool,
    /// Work phases completed since the last long break.
    completed_work_phases: u32,
    /// Wall-clock time of the last snapshot (ms since epoch). Used on
    /// resume to recompute how much time passed while suspended.
    #[serde(default)]
    last_persisted_at_epoch_ms: u64,
    #[serde(default)]
    durations: Durations,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

impl TimerEngine {
    /// Create a paused engine at the start of a Work phase.
    pub fn new(durations: Durations) -> Self {
        let durations = durations.clamped();
        Self {
            phase: Phase::Work,
            seconds_remaining: durations.secs(Phase::Work),
            is_running: false,
            completed_work_phases: 0,
            last_persisted_at_epoch_ms: 0,
            durations,
        }
    }

    /// Rebuild an engine from a persisted snapshot, correcting for the
    /// time that passed since it was taken.
    ///
    /// If the snapshot was running, `(now - snapshot time)` seconds are
    /// subtracted from the countdown. If that consumes the whole
    /// countdown, the current phase is completed (returning the
    /// completion event) and the engine is left paused in the next phase
    /// at full duration - the timer never reports negative time.
    pub fn resume(snapshot: Self, now_epoch_ms: u64) -> (Self, Option<Event>) {
        let mut engine = snapshot;
        engine.durations = engine.durations.clamped();
        // Re-clamp in case the blob was edited out from under us.
        engine.seconds_remaining = engine
            .seconds_remaining
            .min(engine.durations.secs(engine.phase));

        if !engine.is_running {
            return (engine, None);
        }

        let elapsed_secs =
            now_epoch_ms.saturating_sub(engine.last_persisted_at_epoch_ms) / 1000;
        if elapsed_secs >= u64::from(engine.seconds_remaining) {
            // Expired while suspended: complete the phase we were in.
            let event = engine.complete_phase();
            (engine, Some(event))
        } else {
            engine.seconds_remaining -= elapsed_secs as u32;
            (engine, None)
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn completed_work_phases(&self) -> u32 {
        self.completed_work_phases
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.durations.secs(self.phase);
        if total == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.seconds_remaining) / f64::from(total))
    }

    /// "MM:SS" rendering of the countdown.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.seconds_remaining / 60,
            self.seconds_remaining % 60
        )
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Begin (or continue) the countdown. No-op while already running,
    /// and no-op at zero - a completion must transition first.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running || self.seconds_remaining == 0 {
            return None;
        }
        self.is_running = true;
        Some(Event::TimerStarted {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.is_running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Stop and rewind the current phase to its full duration.
    pub fn reset(&mut self) -> Option<Event> {
        self.is_running = false;
        self.seconds_remaining = self.durations.secs(self.phase);
        Some(Event::TimerReset {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// User-driven phase switch. Stops the countdown and loads the new
    /// phase at full duration. Does not touch `completed_work_phases`.
    pub fn switch_mode(&mut self, phase: Phase) -> Option<Event> {
        let from = self.phase;
        self.is_running = false;
        self.phase = phase;
        self.seconds_remaining = self.durations.secs(phase);
        Some(Event::ModeSwitched {
            from,
            to: phase,
            at: Utc::now(),
        })
    }

    /// Replace the duration configuration. The live countdown is clamped
    /// so the remaining-time invariant holds under a shortened phase.
    pub fn set_durations(&mut self, durations: Durations) {
        self.durations = durations.clamped();
        self.seconds_remaining = self
            .seconds_remaining
            .min(self.durations.secs(self.phase));
    }

    /// Advance the countdown by one second. Call once per second while
    /// running. Returns the completion event when the phase finishes.
    ///
    /// Completion fires only on the transition into zero; a duplicate
    /// tick delivered at the boundary finds the engine paused (or the
    /// countdown already reloaded) and does nothing.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running || self.seconds_remaining == 0 {
            return None;
        }
        self.seconds_remaining -= 1;
        if self.seconds_remaining == 0 {
            return Some(self.complete_phase());
        }
        None
    }

    /// Stamp the snapshot time. Call immediately before serializing.
    pub fn touch(&mut self, now_epoch_ms: u64) {
        self.last_persisted_at_epoch_ms = now_epoch_ms;
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Transition out of an expired phase. Leaves the engine paused in
    /// the next phase at full duration.
    fn complete_phase(&mut self) -> Event {
        let completed = self.phase;
        let next = match completed {
            Phase::Work => {
                self.completed_work_phases += 1;
                if self.completed_work_phases >= self.durations.long_break_interval {
                    self.completed_work_phases = 0;
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };
        self.phase = next;
        self.seconds_remaining = self.durations.secs(next);
        self.is_running = false;
        Event::PhaseCompleted {
            completed,
            next,
            work_phase: completed == Phase::Work,
            at: Utc::now(),
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
