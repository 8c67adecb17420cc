pub mod achievements;
mod store;
mod types;

pub use store::ProfileStore;
pub use types::{
    Achievement, AppSettings, Language, ProfileUpdate, SettingsUpdate, Theme, UserProfile,
};
