pub mod achievements;
pub mod profile;
pub mod settings;
pub mod task;
pub mod timer;
