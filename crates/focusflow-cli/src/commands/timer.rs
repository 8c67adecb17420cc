use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use focusflow_core::error::{Result, ValidationError};
use focusflow_core::storage::TIMER_FILE;
use focusflow_core::timer::now_epoch_ms;
use focusflow_core::{Event, LocalStore, Phase, ProfileStore, Ticker, TimerEngine};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PhaseArg {
    Work,
    ShortBreak,
    LongBreak,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Work => Phase::Work,
            PhaseArg::ShortBreak => Phase::ShortBreak,
            PhaseArg::LongBreak => Phase::LongBreak,
        }
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown in the current phase
    Start,
    /// Pause the countdown
    Pause,
    /// Rewind the current phase to its full duration
    Reset,
    /// Switch to another phase (stops the countdown)
    Switch {
        #[arg(value_enum)]
        phase: PhaseArg,
    },
    /// Print the drift-corrected timer state as JSON
    Status,
    /// Start and tick the countdown until the phase completes
    Run,
}

/// Load the persisted snapshot and correct it for the time we were gone.
/// A completion detected here fires its side effects like any other.
fn load_engine(store: &LocalStore, profile: &mut ProfileStore) -> TimerEngine {
    let snapshot: TimerEngine = store.load_or_default(TIMER_FILE);
    let (engine, expired) = TimerEngine::resume(snapshot, now_epoch_ms());
    if let Some(event) = expired {
        fire_completion(&event, profile);
    }
    engine
}

fn save_engine(store: &LocalStore, engine: &mut TimerEngine) -> Result<()> {
    engine.touch(now_epoch_ms());
    store.save(TIMER_FILE, engine)?;
    Ok(())
}

/// Phase-completion side effects, in their fixed order: sound,
/// notification, then the pomodoro stat for completed Work phases.
fn fire_completion(event: &Event, profile: &mut ProfileStore) {
    let Event::PhaseCompleted {
        completed,
        next,
        work_phase,
        ..
    } = event
    else {
        return;
    };
    let settings = profile.settings().clone();
    if settings.sound_enabled {
        println!("(chime) {} finished", completed.label());
    }
    if settings.notifications && settings.pomodoro_notifications {
        println!("notify: {} finished, next up: {}", completed.label(), next.label());
    }
    if *work_phase {
        for unlock in profile.record_pomodoro_completed() {
            if let Event::AchievementUnlocked { id, .. } = unlock {
                println!("achievement unlocked: {id}");
            }
        }
    }
}

pub fn run(action: TimerAction) -> Result<()> {
    let store = LocalStore::open()?;
    let mut profile = ProfileStore::local(store.clone());
    let mut engine = load_engine(&store, &mut profile);

    match action {
        TimerAction::Start => {
            if let Some(event) = engine.start() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Pause => {
            if let Some(event) = engine.pause() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Reset => {
            if let Some(event) = engine.reset() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Switch { phase } => {
            if let Some(event) = engine.switch_mode(phase.into()) {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&engine)?);
        }
        TimerAction::Run => {
            save_engine(&store, &mut engine)?;
            return run_until_complete(store, profile, engine);
        }
    }

    save_engine(&store, &mut engine)?;
    Ok(())
}

/// Foreground run loop: one tick per second through a cancel-and-replace
/// schedule, persisting each second so a kill can be resumed.
fn run_until_complete(
    store: LocalStore,
    mut profile: ProfileStore,
    mut engine: TimerEngine,
) -> Result<()> {
    if engine.start().is_none() && !engine.is_running() {
        return Err(ValidationError::InvalidValue {
            field: "timer".to_string(),
            message: "cannot start a countdown at zero".to_string(),
        }
        .into());
    }
    println!("{} {}", engine.phase().label(), engine.display());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(1), move || {
            let completed = engine.tick();
            let _ = save_engine(&store, &mut engine);
            match completed {
                Some(event) => {
                    fire_completion(&event, &mut profile);
                    println!("{} ready: {}", engine.phase().label(), engine.display());
                    false
                }
                None => {
                    if engine.seconds_remaining() % 60 == 0 {
                        println!("{} {}", engine.phase().label(), engine.display());
                    }
                    true
                }
            }
        });
        ticker.join().await;
    });
    Ok(())
}
