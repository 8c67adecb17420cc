mod engine;
mod ticker;

pub use engine::{now_epoch_ms, Durations, Phase, TimerEngine};
pub use ticker::Ticker;
