//! # Focusflow Core Library
//!
//! Core business logic for Focusflow, a Pomodoro timer + task list +
//! user profile system. The CLI binary and the profile API server are
//! thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a caller-ticked state machine over the three
//!   Pomodoro phases, with wall-clock drift correction on resume
//! - **Profile Store**: owns the user profile and settings; optimistic
//!   local mutations with best-effort remote sync
//! - **Achievement Evaluator**: pure threshold rules over profile
//!   counters, evaluated inside the triggering mutation
//! - **Storage**: independent JSON state blobs under the data directory
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: phase countdown state machine
//! - [`ProfileStore`]: profile/settings owner and sync orchestrator
//! - [`ApiClient`]: typed client for the remote profile API

pub mod error;
pub mod events;
pub mod profile;
pub mod storage;
pub mod sync;
pub mod tasks;
pub mod timer;

pub use error::{CoreError, StorageError, SyncError, ValidationError};
pub use events::Event;
pub use profile::{
    Achievement, AppSettings, Language, ProfileStore, ProfileUpdate, SettingsUpdate, Theme,
    UserProfile,
};
pub use storage::LocalStore;
pub use sync::{ApiClient, SyncHandle, UserEnvelope};
pub use tasks::{Task, TaskList};
pub use timer::{Durations, Phase, Ticker, TimerEngine};
