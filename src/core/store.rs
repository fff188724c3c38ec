use crate::core::date::TaskDate;
use crate::core::resolver::{resolve, Resolution};
use crate::core::rule::RecurrenceRule;
use crate::core::{ConfigProvider, Storage, TaskRepository};
use crate::domain::model::{DoneOutcome, StoreSnapshot, Task};
use crate::utils::error::{Result, SchedulerError};
use crate::utils::validation::validate_non_empty_string;
use async_trait::async_trait;
use tokio::sync::Mutex;

pub const DEFAULT_LIST_LIMIT: usize = 10;

/// 以單一 JSON 文件存放於 [`Storage`] 後端的任務庫
pub struct JsonTaskStore<S: Storage> {
    storage: S,
    path: String,
    list_limit: usize,
    // 讀取與讀-改-寫皆需持有，避免讀到寫一半的文件
    lock: Mutex<()>,
}

impl<S: Storage> JsonTaskStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            list_limit: DEFAULT_LIST_LIMIT,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config<C: ConfigProvider>(storage: S, config: &C) -> Self {
        Self::new(storage, config.store_path()).with_list_limit(config.list_limit())
    }

    pub fn with_list_limit(mut self, list_limit: usize) -> Self {
        self.list_limit = list_limit;
        self
    }

    async fn load(&self) -> Result<StoreSnapshot> {
        match self.storage.read_file(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(StoreSnapshot::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(SchedulerError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("store file {} not found, starting empty", self.path);
                Ok(StoreSnapshot::default())
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let data = serde_json::to_vec_pretty(snapshot)?;
        self.storage.write_file(&self.path, &data).await
    }

    fn sorted_and_limited(&self, mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| numeric_id(&a.id).cmp(&numeric_id(&b.id)))
        });
        tasks.truncate(self.list_limit);
        tasks
    }
}

fn numeric_id(id: &str) -> u64 {
    id.parse().unwrap_or(u64::MAX)
}

fn require_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(SchedulerError::MissingIdError);
    }
    Ok(())
}

fn position(snapshot: &StoreSnapshot, id: &str) -> Result<usize> {
    snapshot
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| SchedulerError::TaskNotFoundError { id: id.to_string() })
}

/// 新任務的存放日期：過期的一次性任務改為 `today`，重複任務改為下一次日期
fn initial_date(task: &Task, rule: &RecurrenceRule, today: TaskDate) -> Result<TaskDate> {
    if task.date.is_empty() {
        return Ok(today);
    }
    let date = TaskDate::parse(&task.date)?;
    if date >= today {
        return Ok(date);
    }
    match resolve(date, rule, today)? {
        Resolution::Next(next) => Ok(next),
        Resolution::NoRecurrence => Ok(today),
    }
}

#[async_trait]
impl<S: Storage> TaskRepository for JsonTaskStore<S> {
    async fn add_task(&self, mut task: Task, today: TaskDate) -> Result<String> {
        let rule = RecurrenceRule::parse(&task.repeat)?;
        validate_non_empty_string("title", &task.title)?;
        task.date = initial_date(&task, &rule, today)?.to_string();

        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await?;
        snapshot.next_id += 1;
        task.id = snapshot.next_id.to_string();
        let id = task.id.clone();

        tracing::info!("adding task {} on {}", id, task.date);
        snapshot.tasks.push(task);
        self.save(&snapshot).await?;
        Ok(id)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let _guard = self.lock.lock().await;
        let snapshot = self.load().await?;
        Ok(self.sorted_and_limited(snapshot.tasks))
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        require_id(id)?;
        let _guard = self.lock.lock().await;
        let snapshot = self.load().await?;
        let index = position(&snapshot, id)?;
        Ok(snapshot.tasks[index].clone())
    }

    async fn update_task(&self, task: Task) -> Result<()> {
        RecurrenceRule::parse(&task.repeat)?;
        TaskDate::parse(&task.date)?;
        validate_non_empty_string("title", &task.title)?;
        require_id(&task.id)?;

        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await?;
        let index = position(&snapshot, &task.id)?;
        tracing::info!("updating task {}", task.id);
        snapshot.tasks[index] = task;
        self.save(&snapshot).await
    }

    async fn done_task(&self, id: &str, today: TaskDate) -> Result<DoneOutcome> {
        require_id(id)?;

        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await?;
        let index = position(&snapshot, id)?;
        let task = &snapshot.tasks[index];

        let rule = RecurrenceRule::parse(&task.repeat)?;
        let outcome = if rule.is_none() {
            tracing::info!("task {} does not repeat, deleting", id);
            snapshot.tasks.remove(index);
            DoneOutcome::Deleted
        } else {
            let date = TaskDate::parse(&task.date)?;
            let next = resolve(date, &rule, today)?.next().unwrap_or(today);
            tracing::info!("task {} rescheduled to {}", id, next);
            snapshot.tasks[index].date = next.to_string();
            DoneOutcome::Rescheduled(next)
        };

        self.save(&snapshot).await?;
        Ok(outcome)
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        require_id(id)?;

        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await?;
        let index = position(&snapshot, id)?;
        snapshot.tasks.remove(index);
        tracing::info!("deleted task {}", id);
        self.save(&snapshot).await
    }

    async fn search_tasks(&self, query: &str) -> Result<Vec<Task>> {
        let _guard = self.lock.lock().await;
        let snapshot = self.load().await?;

        let matches: Vec<Task> = if let Some(date) = TaskDate::parse_search(query) {
            let wanted = date.to_string();
            snapshot
                .tasks
                .into_iter()
                .filter(|t| t.date == wanted)
                .collect()
        } else {
            let needle = query.to_lowercase();
            snapshot
                .tasks
                .into_iter()
                .filter(|t| {
                    t.title.to_lowercase().contains(&needle)
                        || t.comment.to_lowercase().contains(&needle)
                })
                .collect()
        };

        tracing::debug!("search '{}' matched {} tasks", query, matches.len());
        Ok(self.sorted_and_limited(matches))
    }
}
