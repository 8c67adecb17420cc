use clap::Subcommand;
use focusflow_core::error::Result;
use focusflow_core::{ApiClient, Event, LocalStore, ProfileStore};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the local profile as JSON
    Show,
    /// Fetch/create the remote profile and reconcile local state
    Sync,
    /// Query the profile server's health endpoint
    Health,
}

pub fn run(action: ProfileAction) -> Result<()> {
    let store = LocalStore::open()?;

    match action {
        ProfileAction::Show => {
            let profile = ProfileStore::local(store);
            println!("{}", serde_json::to_string_pretty(profile.profile())?);
        }
        ProfileAction::Sync => {
            let runtime = tokio::runtime::Runtime::new()?;
            let (profile, events) =
                runtime.block_on(ProfileStore::init(store, ApiClient::from_env()))?;
            println!("{}", serde_json::to_string_pretty(profile.profile())?);
            for event in &events {
                if matches!(event, Event::SyncDegraded { .. }) {
                    eprintln!("sync degraded: continuing on local state");
                }
            }
        }
        ProfileAction::Health => {
            let runtime = tokio::runtime::Runtime::new()?;
            let report = runtime.block_on(ApiClient::from_env().health())?;
            println!(
                "{} (users: {}, at {})",
                report.status, report.users_count, report.timestamp
            );
        }
    }
    Ok(())
}
