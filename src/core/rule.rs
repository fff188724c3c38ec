//! 重複規則語法解析
//!
//! | 文字                 | 規則                                    |
//! |----------------------|-----------------------------------------|
//! | `""`                 | 不重複                                  |
//! | `d 7`                | 每 7 天 (1..400)                        |
//! | `y`                  | 每年                                    |
//! | `w 1,3,7`            | 指定星期 (0/7 = 星期日)                 |
//! | `m 1,-1`             | 指定日期 (-1 最後一天，-2 倒數第二天)   |
//! | `m 15 1,7`           | 指定日期，僅限列出的月份                |

use crate::utils::error::{Result, SchedulerError};
use std::collections::BTreeSet;
use std::fmt;

/// 天數間隔達到此值即拒絕
pub const MAX_DAILY_INTERVAL: i64 = 400;

/// 各月份最多天數 (二月以閏年計)
const MAX_MONTH_LENGTH: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    None,
    Daily(u32),
    Yearly,
    Weekly(BTreeSet<u32>),
    Monthly {
        days: Vec<i32>,
        months: Option<Vec<u32>>,
    },
}

impl RecurrenceRule {
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(RecurrenceRule::None);
        }
        if text == "y" {
            return Ok(RecurrenceRule::Yearly);
        }
        if let Some(rest) = text.strip_prefix("d ") {
            return parse_daily(text, rest);
        }
        if let Some(rest) = text.strip_prefix("w ") {
            return parse_weekly(text, rest);
        }
        if text.starts_with("m ") {
            return parse_monthly(text);
        }
        Err(SchedulerError::rule(text, "unknown repeat format"))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RecurrenceRule::None)
    }
}

fn parse_number(rule: &str, token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|e| SchedulerError::rule(rule, format!("'{}' is not a number: {}", token, e)))
}

fn parse_daily(rule: &str, rest: &str) -> Result<RecurrenceRule> {
    let days = parse_number(rule, rest)?;
    if days >= MAX_DAILY_INTERVAL {
        return Err(SchedulerError::IntervalTooLongError {
            rule: rule.to_string(),
            days,
        });
    }
    if days < 1 {
        return Err(SchedulerError::rule(rule, "day interval must be at least 1"));
    }
    let days = u32::try_from(days).map_err(|_| SchedulerError::rule(rule, "day interval out of range"))?;
    Ok(RecurrenceRule::Daily(days))
}

fn parse_weekly(rule: &str, rest: &str) -> Result<RecurrenceRule> {
    let mut weekdays = BTreeSet::new();
    for token in rest.split(',') {
        let value = parse_number(rule, token)?;
        if !(0..=7).contains(&value) {
            return Err(SchedulerError::rule(
                rule,
                format!("weekday {} is out of range 0..7", value),
            ));
        }
        // 7 與 0 都代表星期日
        let weekday = u32::try_from(value % 7).unwrap_or(0);
        weekdays.insert(weekday);
    }
    Ok(RecurrenceRule::Weekly(weekdays))
}

fn parse_monthly(rule: &str) -> Result<RecurrenceRule> {
    let tokens: Vec<&str> = rule.split(' ').collect();
    if tokens.len() < 2 || tokens.len() > 3 {
        return Err(SchedulerError::rule(
            rule,
            "expected 'm <days>' or 'm <days> <months>'",
        ));
    }

    let mut days = Vec::new();
    for token in tokens[1].split(',') {
        let value = parse_number(rule, token)?;
        if value == 0 || !(-2..=31).contains(&value) {
            return Err(SchedulerError::rule(
                rule,
                format!("day {} is out of range (1..31, -1, -2)", value),
            ));
        }
        days.push(i32::try_from(value).unwrap_or(0));
    }
    days.sort_unstable();
    days.dedup();

    let months = match tokens.get(2) {
        Some(list) => {
            let mut months = Vec::new();
            for token in list.split(',') {
                let value = parse_number(rule, token)?;
                if !(1..=12).contains(&value) {
                    return Err(SchedulerError::rule(
                        rule,
                        format!("month {} is out of range 1..12", value),
                    ));
                }
                months.push(u32::try_from(value).unwrap_or(1));
            }
            months.sort_unstable();
            months.dedup();
            Some(months)
        }
        None => None,
    };

    if let Some(months) = &months {
        if !any_day_fits(&days, months) {
            return Err(SchedulerError::rule(
                rule,
                "none of the listed days exists in the listed months",
            ));
        }
    }

    Ok(RecurrenceRule::Monthly { days, months })
}

fn any_day_fits(days: &[i32], months: &[u32]) -> bool {
    days.iter().any(|&day| {
        day < 0
            || months.iter().any(|&month| {
                MAX_MONTH_LENGTH
                    .get((month - 1) as usize)
                    .is_some_and(|&len| day as u32 <= len)
            })
    })
}

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceRule::None => Ok(()),
            RecurrenceRule::Daily(days) => write!(f, "d {}", days),
            RecurrenceRule::Yearly => write!(f, "y"),
            RecurrenceRule::Weekly(weekdays) => write!(f, "w {}", join(weekdays.iter())),
            RecurrenceRule::Monthly { days, months } => {
                write!(f, "m {}", join(days.iter()))?;
                if let Some(months) = months {
                    write!(f, " {}", join(months.iter()))?;
                }
                Ok(())
            }
        }
    }
}
