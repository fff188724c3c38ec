use crate::core::store::DEFAULT_LIST_LIMIT;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SchedulerError};
use crate::utils::validation::{validate_path, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STORE_PATH: &str = "scheduler.json";

/// 覆寫儲存路徑的環境變數
pub const STORE_PATH_ENV: &str = "TODO_DBFILE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<String>,
    pub list_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl SchedulerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SchedulerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SchedulerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOME})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SchedulerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `TODO_DBFILE` 優先於檔案中的 `store.path`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(STORE_PATH_ENV) {
            if !path.is_empty() {
                tracing::debug!("store path overridden by {}: {}", STORE_PATH_ENV, path);
                self.store.path = Some(path);
            }
        }
    }

    pub fn store_path(&self) -> &str {
        self.store.path.as_deref().unwrap_or(DEFAULT_STORE_PATH)
    }

    pub fn list_limit(&self) -> usize {
        self.store.list_limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging.format
    }
}

impl ConfigProvider for SchedulerConfig {
    fn store_path(&self) -> &str {
        self.store_path()
    }

    fn list_limit(&self) -> usize {
        self.list_limit()
    }
}

impl Validate for SchedulerConfig {
    fn validate(&self) -> Result<()> {
        validate_path("store.path", self.store_path())?;
        validate_range("store.list_limit", self.list_limit(), 1, 1000)?;
        Ok(())
    }
}
