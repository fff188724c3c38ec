use crate::core::resolver::{next_date, Resolution};
use serde::Serialize;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// 下一次日期預覽的回應：成功時 body 為 `YYYYMMDD`，
/// 失敗時狀態碼 400，body 為 `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResponse {
    pub status: u16,
    pub body: String,
}

impl PreviewResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    fn error(message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
        Self {
            status: STATUS_BAD_REQUEST,
            body,
        }
    }
}

pub fn preview(date: &str, repeat: &str, now: &str) -> PreviewResponse {
    match next_date(date, repeat, now) {
        Ok(Resolution::Next(next)) => PreviewResponse {
            status: STATUS_OK,
            body: next.to_string(),
        },
        Ok(Resolution::NoRecurrence) => PreviewResponse {
            status: STATUS_OK,
            body: String::new(),
        },
        Err(e) => {
            tracing::warn!("next date preview failed: {}", e);
            PreviewResponse::error(&e.to_string())
        }
    }
}
