//! Best-effort synchronization with the remote profile store.
//!
//! The remote is an eventually-consistent mirror, never the source of
//! truth for a running session. Reads happen once at startup; writes are
//! detached and their failures degrade to a status flag.

mod client;
mod handle;

pub use client::{ApiClient, HealthReport, UserEnvelope};
pub use handle::SyncHandle;
