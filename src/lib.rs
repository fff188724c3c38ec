pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{Command, CliConfig};

pub use crate::config::{cli::LocalStorage, toml_config::SchedulerConfig};
pub use crate::core::{
    date::TaskDate,
    preview::{preview, PreviewResponse},
    resolver::{next_date, resolve, Resolution, ResolutionRequest},
    rule::RecurrenceRule,
    store::JsonTaskStore,
};
pub use crate::domain::model::{DoneOutcome, Task};
pub use crate::domain::ports::TaskRepository;
pub use crate::utils::error::{Result, SchedulerError};
