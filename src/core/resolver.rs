//! 重複規則的下一次日期計算
//!
//! 全部是純函式；參考日期 ("now") 一律由呼叫端傳入，
//! CLI、任務庫與測試走同一條路徑。

use crate::core::date::TaskDate;
use crate::core::rule::RecurrenceRule;
use crate::utils::error::{Result, SchedulerError};
use std::collections::BTreeSet;

/// 逐日掃描上限；列出的星期或日期必定在兩年內出現
const MAX_DAY_STEPS: usize = 732;

/// 逐月掃描上限
const MAX_MONTH_STEPS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Next(TaskDate),
    /// 規則為空：任務不重複，完成時刪除
    NoRecurrence,
}

impl Resolution {
    pub fn next(self) -> Option<TaskDate> {
        match self {
            Resolution::Next(date) => Some(date),
            Resolution::NoRecurrence => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub base: TaskDate,
    pub rule: RecurrenceRule,
    pub reference: TaskDate,
}

impl ResolutionRequest {
    pub fn new(base: TaskDate, rule: RecurrenceRule, reference: TaskDate) -> Self {
        Self {
            base,
            rule,
            reference,
        }
    }

    pub fn resolve(&self) -> Result<Resolution> {
        resolve(self.base, &self.rule, self.reference)
    }
}

/// 字串入口：`now` 與 `date` 為 `YYYYMMDD`，`repeat` 為規則文字
///
/// 規則為空時直接回傳 [`Resolution::NoRecurrence`]，不檢查 `date`
pub fn next_date(date: &str, repeat: &str, now: &str) -> Result<Resolution> {
    let reference = TaskDate::parse(now)?;
    let rule = RecurrenceRule::parse(repeat)?;
    if rule.is_none() {
        return Ok(Resolution::NoRecurrence);
    }
    let base = TaskDate::parse(date)?;
    resolve(base, &rule, reference).map_err(|e| with_rule_text(e, repeat))
}

/// 以 `reference` 為基準，計算 `base` 之後 `rule` 的下一次日期
pub fn resolve(base: TaskDate, rule: &RecurrenceRule, reference: TaskDate) -> Result<Resolution> {
    let next = match rule {
        RecurrenceRule::None => return Ok(Resolution::NoRecurrence),
        RecurrenceRule::Daily(days) => resolve_daily(base, *days, reference)?,
        RecurrenceRule::Yearly => resolve_yearly(base, reference)?,
        RecurrenceRule::Weekly(weekdays) => resolve_weekly(base, weekdays, reference)?,
        RecurrenceRule::Monthly { days, months } => {
            resolve_monthly(base, days, months.as_deref(), reference)?
        }
    };

    tracing::debug!(%base, %reference, rule = %rule, %next, "resolved next date");
    Ok(Resolution::Next(next))
}

fn out_of_range(rule: &RecurrenceRule) -> SchedulerError {
    SchedulerError::rule(&rule.to_string(), "next date is outside the supported calendar")
}

fn with_rule_text(err: SchedulerError, text: &str) -> SchedulerError {
    match err {
        SchedulerError::RuleError { reason, .. } => SchedulerError::rule(text, reason),
        other => other,
    }
}

/// 不早於 `reference` 的最小 `base + k * days` (k >= 1)
fn resolve_daily(base: TaskDate, days: u32, reference: TaskDate) -> Result<TaskDate> {
    let step = i64::from(days);
    let first = base
        .checked_add_days(step)
        .ok_or_else(|| out_of_range(&RecurrenceRule::Daily(days)))?;
    if first >= reference {
        return Ok(first);
    }

    let behind = (reference.naive() - first.naive()).num_days();
    let steps = (behind + step - 1) / step;
    first
        .checked_add_days(steps * step)
        .ok_or_else(|| out_of_range(&RecurrenceRule::Daily(days)))
}

fn resolve_yearly(base: TaskDate, reference: TaskDate) -> Result<TaskDate> {
    let advance = |date: TaskDate| {
        date.checked_add_years(1)
            .ok_or_else(|| out_of_range(&RecurrenceRule::Yearly))
    };

    let mut next = advance(base)?;
    while next < reference {
        next = advance(next)?;
    }
    Ok(next)
}

/// 過期或當天的任務從 `reference` 隔天開始搜尋；未來日期本身即為第一個候選
fn search_start(base: TaskDate, reference: TaskDate) -> Option<TaskDate> {
    if base > reference {
        Some(base)
    } else {
        reference.checked_add_days(1)
    }
}

fn resolve_weekly(
    base: TaskDate,
    weekdays: &BTreeSet<u32>,
    reference: TaskDate,
) -> Result<TaskDate> {
    let rule = || RecurrenceRule::Weekly(weekdays.clone());
    let mut candidate = search_start(base, reference).ok_or_else(|| out_of_range(&rule()))?;

    for _ in 0..MAX_DAY_STEPS {
        if weekdays.contains(&candidate.weekday_index()) {
            return Ok(candidate);
        }
        candidate = candidate
            .checked_add_days(1)
            .ok_or_else(|| out_of_range(&rule()))?;
    }
    Err(SchedulerError::rule(&rule().to_string(), "no matching weekday found"))
}

fn day_matches(candidate: TaskDate, days: &[i32]) -> bool {
    days.iter()
        .any(|&selector| candidate.day() == candidate.resolve_month_day(selector))
}

/// 三個階段：
/// 1. 在起始月份內尋找列出的日期，找不到則停在下個月第一天；
/// 2. 有月份清單時，逐月前進直到月份符合；
/// 3. 逐日前進直到日期符合。
fn resolve_monthly(
    base: TaskDate,
    days: &[i32],
    months: Option<&[u32]>,
    reference: TaskDate,
) -> Result<TaskDate> {
    let rule = || RecurrenceRule::Monthly {
        days: days.to_vec(),
        months: months.map(<[u32]>::to_vec),
    };
    let step_day = |date: TaskDate| date.checked_add_days(1).ok_or_else(|| out_of_range(&rule()));

    let mut candidate = search_start(base, reference).ok_or_else(|| out_of_range(&rule()))?;

    let start_month = candidate.month();
    while !day_matches(candidate, days) {
        candidate = step_day(candidate)?;
        if candidate.month() != start_month {
            break;
        }
    }

    if let Some(months) = months {
        let mut steps = 0;
        while !months.contains(&candidate.month()) {
            if steps == MAX_MONTH_STEPS {
                return Err(SchedulerError::rule(&rule().to_string(), "no matching month found"));
            }
            candidate = candidate
                .checked_add_months(1)
                .ok_or_else(|| out_of_range(&rule()))?;
            steps += 1;
        }
    }

    for _ in 0..MAX_DAY_STEPS {
        if day_matches(candidate, days) {
            return Ok(candidate);
        }
        candidate = step_day(candidate)?;
    }
    Err(SchedulerError::rule(&rule().to_string(), "no matching day found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> TaskDate {
        TaskDate::parse(s).unwrap()
    }

    fn next(base: &str, rule: &str, reference: &str) -> String {
        match next_date(base, rule, reference).unwrap() {
            Resolution::Next(d) => d.to_string(),
            Resolution::NoRecurrence => panic!("unexpected NoRecurrence for {rule}"),
        }
    }

    #[test]
    fn test_empty_rule_is_no_recurrence() {
        assert_eq!(
            next_date("20250101", "", "20250115").unwrap(),
            Resolution::NoRecurrence
        );
        // 規則為空時不檢查 base date
        assert_eq!(
            next_date("garbage", "", "20250115").unwrap(),
            Resolution::NoRecurrence
        );
    }

    #[test]
    fn test_daily_leap_rollover() {
        assert_eq!(next("20240228", "d 1", "20240301"), "20240301");
    }

    #[test]
    fn test_daily_is_strictly_after_base() {
        assert_eq!(next("20250115", "d 1", "20250101"), "20250116");
        assert_eq!(next("20250115", "d 7", "20250115"), "20250122");
    }

    #[test]
    fn test_daily_catches_up_to_reference() {
        assert_eq!(next("20240113", "d 7", "20240126"), "20240127");
        assert_eq!(next("20240120", "d 20", "20240126"), "20240209");
        assert_eq!(next("20240202", "d 30", "20240126"), "20240303");
        assert_eq!(next("20240126", "d 1", "20240126"), "20240127");
        assert_eq!(next("20240101", "d 5", "20240126"), "20240126");
    }

    #[test]
    fn test_daily_limit() {
        assert!(matches!(
            next_date("20240101", "d 400", "20240126"),
            Err(SchedulerError::IntervalTooLongError { .. })
        ));
        assert_eq!(next("20240101", "d 399", "20240101"), "20250203");
    }

    #[test]
    fn test_yearly() {
        assert_eq!(next("20240126", "y", "20240126"), "20250126");
        assert_eq!(next("16890220", "y", "20240126"), "20240220");
        assert_eq!(next("20231106", "y", "20240126"), "20241106");
        assert_eq!(next("20240229", "y", "20240301"), "20250301");
    }

    #[test]
    fn test_weekly() {
        // 2025-01-16 是星期四
        assert_eq!(next("20250115", "w 1,3", "20250115"), "20250120");
        assert_eq!(next("20240125", "w 1,2,3", "20240126"), "20240129");
        assert_eq!(next("20240126", "w 7", "20240126"), "20240128");
        assert_eq!(next("20230126", "w 4,5", "20240126"), "20240201");
        // 未來的 base date 本身就是第一個候選
        assert_eq!(next("20250120", "w 1", "20250115"), "20250120");
    }

    #[test]
    fn test_monthly_last_day() {
        assert_eq!(next("20250101", "m -1", "20250115"), "20250131");
        assert_eq!(next("20240201", "m -1", "20240201"), "20240229");
        assert_eq!(next("20240201", "m -2", "20240201"), "20240228");
    }

    #[test]
    fn test_monthly_days() {
        assert_eq!(next("20240126", "m 25,26,7", "20240126"), "20240207");
        assert_eq!(next("20240409", "m 31", "20240126"), "20240531");
        assert_eq!(next("20240125", "m 10,17", "20240126"), "20240210");
        assert_eq!(next("20240202", "m 3,-1", "20240126"), "20240203");
        assert_eq!(next("20240202", "m -1,18", "20240126"), "20240218");
    }

    #[test]
    fn test_monthly_with_months() {
        assert_eq!(next("20240126", "m 1 1,2", "20240126"), "20240201");
        assert_eq!(next("20230311", "m 12 8,9", "20240126"), "20240812");
        // 1/31 + 1 個月溢位到 3/2，因此跳過二月
        assert_eq!(next("20240126", "m -1 2,8", "20240126"), "20240831");
        assert_eq!(next("20240126", "m 10 2,8", "20240126"), "20240210");
    }

    #[test]
    fn test_monthly_unsatisfiable_terminates_with_error() {
        for rule in ["m 31 2", "m 30,31 2"] {
            assert!(matches!(
                next_date("20250101", rule, "20250115"),
                Err(SchedulerError::RuleError { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_dates() {
        assert!(matches!(
            next_date("2025011", "d 1", "20250115"),
            Err(SchedulerError::DateFormatError { .. })
        ));
        assert!(matches!(
            next_date("20250101", "d 1", "today"),
            Err(SchedulerError::DateFormatError { .. })
        ));
    }

    #[test]
    fn test_results_past_year_9999_are_rule_errors() {
        for rule in ["d 1", "w 1", "y", "m 1", "m 1 3"] {
            assert!(
                matches!(
                    next_date("99991231", rule, "99991231"),
                    Err(SchedulerError::RuleError { .. })
                ),
                "{rule}"
            );
        }
        assert_eq!(next("99991230", "d 1", "99991230"), "99991231");
    }

    #[test]
    fn test_request_struct_matches_function() {
        let request = ResolutionRequest::new(
            date("20250101"),
            RecurrenceRule::parse("m -1").unwrap(),
            date("20250115"),
        );
        assert_eq!(request.resolve().unwrap(), Resolution::Next(date("20250131")));
    }
}
