use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("invalid date '{value}': expected YYYYMMDD")]
    DateFormatError { value: String },

    #[error("invalid repeat rule '{rule}': {reason}")]
    RuleError { rule: String, reason: String },

    #[error("repeat interval of {days} days is not allowed (limit is 400): '{rule}'")]
    IntervalTooLongError { rule: String, days: i64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("task id is not specified")]
    MissingIdError,

    #[error("task not found: {id}")]
    TaskNotFoundError { id: String },
}

/// 錯誤類別，用於決定 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Configuration,
}

impl SchedulerError {
    pub fn rule(rule: &str, reason: impl Into<String>) -> Self {
        SchedulerError::RuleError {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }

    pub fn date_format(value: &str) -> Self {
        SchedulerError::DateFormatError {
            value: value.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SchedulerError::IoError(_) | SchedulerError::SerializationError(_) => {
                ErrorCategory::Storage
            }
            SchedulerError::ConfigError { .. }
            | SchedulerError::ConfigValidationError { .. }
            | SchedulerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            _ => ErrorCategory::Input,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::Storage => 2,
            ErrorCategory::Configuration => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
