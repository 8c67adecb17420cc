use clap::Subcommand;
use focusflow_core::error::{Result, ValidationError};
use focusflow_core::storage::TASKS_FILE;
use focusflow_core::{Event, LocalStore, ProfileStore, TaskList};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        text: String,
        /// Category label
        #[arg(long, default_value = "geral")]
        category: String,
        /// Record the task as already completed
        #[arg(long)]
        done: bool,
    },
    /// Toggle a task's completion by id
    Toggle { id: String },
    /// Delete a task by id
    Delete { id: String },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Task counters
    Stats,
}

fn print_unlocks(events: &[Event]) {
    for event in events {
        if let Event::AchievementUnlocked { id, .. } = event {
            println!("achievement unlocked: {id}");
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    id.parse().map_err(|_| {
        ValidationError::InvalidValue {
            field: "id".to_string(),
            message: format!("not a task id: {id}"),
        }
        .into()
    })
}

fn not_found(id: Uuid) -> focusflow_core::CoreError {
    ValidationError::InvalidValue {
        field: "id".to_string(),
        message: format!("task not found: {id}"),
    }
    .into()
}

pub fn run(action: TaskAction) -> Result<()> {
    let store = LocalStore::open()?;
    let mut list: TaskList = store.load_or_default(TASKS_FILE);
    let mut profile = ProfileStore::local(store.clone());

    match action {
        TaskAction::Add {
            text,
            category,
            done,
        } => {
            let Some(task) = list.add(&text, &category) else {
                return Err(ValidationError::MissingField("text".to_string()).into());
            };
            let mut task = task.clone();
            let unlocks = if done {
                list.toggle(task.id);
                task = list.get(task.id).cloned().unwrap_or(task);
                profile.record_task_completed(true)
            } else {
                profile.record_task_added()
            };
            store.save(TASKS_FILE, &list)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
            print_unlocks(&unlocks);
        }
        TaskAction::Toggle { id } => {
            let id = parse_id(&id)?;
            let Some(completed) = list.toggle(id) else {
                return Err(not_found(id));
            };
            let unlocks = profile.record_task_toggled(completed);
            store.save(TASKS_FILE, &list)?;
            println!("{}", serde_json::to_string_pretty(&list.get(id))?);
            print_unlocks(&unlocks);
        }
        TaskAction::Delete { id } => {
            let id = parse_id(&id)?;
            if !list.delete(id) {
                return Err(not_found(id));
            }
            store.save(TASKS_FILE, &list)?;
            println!("deleted {id}");
        }
        TaskAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&list.tasks)?);
            } else {
                for task in &list.tasks {
                    let mark = if task.completed { "x" } else { " " };
                    println!("[{mark}] {}  {} ({})", task.id, task.text, task.category);
                }
            }
        }
        TaskAction::Stats => {
            println!("{}", serde_json::to_string_pretty(&list.stats())?);
        }
    }
    Ok(())
}
