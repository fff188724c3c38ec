use anyhow::Context;
use clap::Parser;
use todo_scheduler::core::{CreatedTask, TaskList};
use todo_scheduler::utils::{logger, validation::Validate};
use todo_scheduler::{
    preview, CliConfig, Command, DoneOutcome, JsonTaskStore, LocalStorage, SchedulerConfig,
    SchedulerError, Task, TaskDate, TaskRepository,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("❌ {:#}", e);
        eprintln!("❌ {:#}", e);

        // 根據錯誤類別決定退出碼
        let exit_code = e
            .downcast_ref::<SchedulerError>()
            .map(SchedulerError::exit_code)
            .unwrap_or(1);
        std::process::exit(exit_code);
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let mut config = SchedulerConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load config file '{}'", cli.config))?;

    logger::init_logger(cli.verbose, config.log_format());
    tracing::debug!("CLI config: {:?}", cli);

    config.apply_env_overrides();
    if let Some(store) = &cli.store {
        config.store.path = Some(store.clone());
    }
    config.validate()?;

    tracing::debug!("using task store {}", config.store_path());
    let store = JsonTaskStore::from_config(LocalStorage::new("."), &config);
    let today = TaskDate::today();

    match cli.command {
        Command::NextDate { date, repeat, now } => {
            let now = now.unwrap_or_else(|| today.to_string());
            let response = preview(&date, &repeat, &now);
            println!("{}", response.body);
            if !response.is_success() {
                return Err(SchedulerError::ValidationError {
                    message: "next date could not be computed".to_string(),
                }
                .into());
            }
        }
        Command::Add {
            title,
            date,
            comment,
            repeat,
        } => {
            let id = store
                .add_task(Task::new(&date, &title, &comment, &repeat), today)
                .await?;
            println!("{}", serde_json::to_string(&CreatedTask { id })?);
        }
        Command::List => {
            let tasks = store.list_tasks().await?;
            println!("{}", serde_json::to_string_pretty(&TaskList { tasks })?);
        }
        Command::Search { query } => {
            let tasks = store.search_tasks(&query).await?;
            println!("{}", serde_json::to_string_pretty(&TaskList { tasks })?);
        }
        Command::Show { id } => {
            let task = store.get_task(&id).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Command::Update {
            id,
            title,
            date,
            comment,
            repeat,
        } => {
            let task = Task {
                id,
                ..Task::new(&date, &title, &comment, &repeat)
            };
            store.update_task(task).await?;
            println!("{{}}");
        }
        Command::Done { id } => match store.done_task(&id, today).await? {
            DoneOutcome::Rescheduled(next) => {
                tracing::info!("✅ task {} moved to {}", id, next);
                println!("{{}}");
            }
            DoneOutcome::Deleted => {
                tracing::info!("✅ task {} completed and removed", id);
                println!("{{}}");
            }
        },
        Command::Delete { id } => {
            store.delete_task(&id).await?;
            println!("{{}}");
        }
    }

    Ok(())
}
