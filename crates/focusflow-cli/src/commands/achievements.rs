use clap::Subcommand;
use focusflow_core::error::Result;
use focusflow_core::{LocalStore, ProfileStore};

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List badges and their unlock state
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: AchievementsAction) -> Result<()> {
    let store = LocalStore::open()?;
    let profile = ProfileStore::local(store);

    match action {
        AchievementsAction::List { json } => {
            let badges = &profile.profile().achievements;
            if json {
                println!("{}", serde_json::to_string_pretty(badges)?);
            } else {
                for badge in badges {
                    let mark = if badge.unlocked { "unlocked" } else { "locked" };
                    println!("{:14} {:8} {}", badge.id, mark, badge.description);
                }
            }
        }
    }
    Ok(())
}
