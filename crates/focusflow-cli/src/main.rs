use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "focusflow-cli", version, about = "Focusflow CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Profile and remote sync
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Settings management
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Achievement badges
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result: focusflow_core::error::Result<()> = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Achievements { action } => commands::achievements::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
