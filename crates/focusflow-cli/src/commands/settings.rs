use clap::Subcommand;
use focusflow_core::error::{Result, ValidationError};
use focusflow_core::storage::SETTINGS_FILE;
use focusflow_core::{AppSettings, LocalStore};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings as JSON
    Show,
    /// Get one settings value by its key (e.g. `theme`, `volume`)
    Get { key: String },
    /// Set one settings value by key
    Set { key: String, value: String },
}

pub fn run(action: SettingsAction) -> Result<()> {
    let store = LocalStore::open()?;
    let mut settings: AppSettings = store.load_or_default(SETTINGS_FILE);

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Get { key } => match settings.get(&key) {
            Some(value) => println!("{value}"),
            None => {
                return Err(ValidationError::InvalidValue {
                    field: key,
                    message: "unknown settings key".to_string(),
                }
                .into())
            }
        },
        SettingsAction::Set { key, value } => {
            let previous_theme = settings.theme;
            settings
                .set(&key, &value)
                .map_err(|message| ValidationError::InvalidValue {
                    field: key.clone(),
                    message,
                })?;
            store.save(SETTINGS_FILE, &settings)?;
            if settings.theme != previous_theme {
                // Presentation layers watch for this to restyle.
                println!("theme -> {}", settings.get("theme").unwrap_or_default());
            }
            println!("{key} = {}", settings.get(&key).unwrap_or_default());
        }
    }
    Ok(())
}
