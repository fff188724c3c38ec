pub mod date;
pub mod preview;
pub mod resolver;
pub mod rule;
pub mod store;

pub use crate::domain::model::{CreatedTask, DoneOutcome, StoreSnapshot, Task, TaskList};
pub use crate::domain::ports::{ConfigProvider, Storage, TaskRepository};
pub use crate::utils::error::Result;
