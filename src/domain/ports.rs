use crate::core::date::TaskDate;
use crate::domain::model::{DoneOutcome, Task};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn store_path(&self) -> &str;
    fn list_limit(&self) -> usize;
}

/// 任務生命週期操作；`today` 為參考日期，用於順延過期任務及計算下一次日期
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn add_task(&self, task: Task, today: TaskDate) -> Result<String>;
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn get_task(&self, id: &str) -> Result<Task>;
    async fn update_task(&self, task: Task) -> Result<()>;
    async fn done_task(&self, id: &str, today: TaskDate) -> Result<DoneOutcome>;
    async fn delete_task(&self, id: &str) -> Result<()>;
    async fn search_tasks(&self, query: &str) -> Result<Vec<Task>>;
}
