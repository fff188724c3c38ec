use crate::core::date::TaskDate;
use serde::{Deserialize, Serialize};

/// 任務記錄；欄位名稱與 JSON 格式一致
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

impl Task {
    pub fn new(date: &str, title: &str, comment: &str, repeat: &str) -> Self {
        Self {
            id: String::new(),
            date: date.to_string(),
            title: title.to_string(),
            comment: comment.to_string(),
            repeat: repeat.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTask {
    pub id: String,
}

/// 整個任務庫的持久化格式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub next_id: u64,
    pub tasks: Vec<Task>,
}

/// 任務完成後的處理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneOutcome {
    Rescheduled(TaskDate),
    Deleted,
}
