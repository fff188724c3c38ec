//! 排程使用的日曆日期
//!
//! 對外 (CLI、JSON 儲存、預覽) 一律使用 8 位數 `YYYYMMDD` 字串，
//! 內部以 [`chrono::NaiveDate`] 處理。

use crate::utils::error::{Result, SchedulerError};
use chrono::{Datelike, Local, NaiveDate, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y%m%d";

/// `YYYYMMDD` 可表示的年份範圍
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// 以 "DD.MM.YYYY" 輸入的日期，用於搜尋
pub const SEARCH_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskDate(NaiveDate);

impl TaskDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(TaskDate)
    }

    /// 本地日曆日期；整個 crate 只有這裡讀取系統時間
    pub fn today() -> Self {
        TaskDate(Local::now().date_naive())
    }

    pub fn parse(value: &str) -> Result<Self> {
        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SchedulerError::date_format(value));
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(TaskDate)
            .map_err(|_| SchedulerError::date_format(value))
    }

    pub fn parse_search(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value, SEARCH_DATE_FORMAT)
            .ok()
            .map(TaskDate)
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// 0 = 星期日 .. 6 = 星期六
    pub fn weekday_index(self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    /// 正規化的日曆加法
    ///
    /// 先加年、月；目標月份不存在的日期會溢位到下個月，
    /// 例如 1/31 + 1 個月 = 3/3 (閏年為 3/2)，2/29 + 1 年 = 3/1。
    /// 結果年份超出 0..=9999 時回傳 `None`，以維持 8 位數格式。
    pub fn checked_add_ymd(self, years: i32, months: i32, days: i64) -> Option<Self> {
        let total_months = i64::from(self.0.year()) * 12
            + i64::from(self.0.month0())
            + i64::from(years) * 12
            + i64::from(months);
        let year = i32::try_from(total_months.div_euclid(12)).ok()?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        let month = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;

        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let offset = TimeDelta::try_days(i64::from(self.0.day()) - 1 + days)?;
        first
            .checked_add_signed(offset)
            .filter(|date| (MIN_YEAR..=MAX_YEAR).contains(&date.year()))
            .map(TaskDate)
    }

    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.checked_add_ymd(0, 0, days)
    }

    pub fn checked_add_months(self, months: i32) -> Option<Self> {
        self.checked_add_ymd(0, months, 0)
    }

    pub fn checked_add_years(self, years: i32) -> Option<Self> {
        self.checked_add_ymd(years, 0, 0)
    }

    /// 下個月的第 0 天
    pub fn last_day_of_month(self) -> u32 {
        if self.0.month() == 12 {
            return 31;
        }
        NaiveDate::from_ymd_opt(self.0.year(), self.0.month() + 1, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    /// 依本月解析日期選擇值：`-1` 為最後一天，`-2` 為倒數第二天，正數照原值
    pub fn resolve_month_day(self, selector: i32) -> u32 {
        if selector < 0 {
            let last = i64::from(self.last_day_of_month());
            u32::try_from(last + 1 + i64::from(selector)).unwrap_or(0)
        } else {
            u32::try_from(selector).unwrap_or(0)
        }
    }
}

impl fmt::Display for TaskDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for TaskDate {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        TaskDate::parse(s)
    }
}

impl From<NaiveDate> for TaskDate {
    fn from(date: NaiveDate) -> Self {
        TaskDate(date)
    }
}

impl Serialize for TaskDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TaskDate::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> TaskDate {
        TaskDate::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_format() {
        let d = date("20240229");
        assert_eq!((d.year(), d.month(), d.day()), (2024, 2, 29));
        assert_eq!(d.to_string(), "20240229");
        assert_eq!(date(&d.to_string()), d);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in ["", "2024022", "202402290", "2024-02-2", "20230229", "20241301", "abcdefgh"] {
            let err = TaskDate::parse(bad).unwrap_err();
            assert!(matches!(err, SchedulerError::DateFormatError { .. }), "{bad}");
        }
    }

    #[test]
    fn test_add_days_crosses_leap_february() {
        assert_eq!(date("20240228").checked_add_days(1), Some(date("20240229")));
        assert_eq!(date("20240229").checked_add_days(1), Some(date("20240301")));
        assert_eq!(date("20231231").checked_add_days(1), Some(date("20240101")));
    }

    #[test]
    fn test_add_months_overflows_short_months() {
        assert_eq!(date("20250131").checked_add_months(1), Some(date("20250303")));
        assert_eq!(date("20240131").checked_add_months(1), Some(date("20240302")));
        assert_eq!(date("20251115").checked_add_months(2), Some(date("20260115")));
    }

    #[test]
    fn test_add_years_from_leap_day() {
        assert_eq!(date("20240229").checked_add_years(1), Some(date("20250301")));
        assert_eq!(date("20240229").checked_add_years(4), Some(date("20280229")));
    }

    #[test]
    fn test_add_stays_within_four_digit_years() {
        let last = date("99991231");
        assert_eq!(last.checked_add_days(1), None);
        assert_eq!(last.checked_add_months(1), None);
        assert_eq!(date("99990301").checked_add_years(1), None);
        assert_eq!(TaskDate::from_ymd(0, 1, 1).unwrap().checked_add_days(-1), None);
        assert_eq!(date("99991230").checked_add_days(1), Some(last));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(date("20240210").last_day_of_month(), 29);
        assert_eq!(date("20250210").last_day_of_month(), 28);
        assert_eq!(date("20250415").last_day_of_month(), 30);
        assert_eq!(date("20251201").last_day_of_month(), 31);
    }

    #[test]
    fn test_resolve_negative_month_day() {
        let feb = date("20240201");
        assert_eq!(feb.resolve_month_day(-1), 29);
        assert_eq!(feb.resolve_month_day(-2), 28);
        assert_eq!(feb.resolve_month_day(15), 15);
    }

    #[test]
    fn test_weekday_index() {
        // 2025-01-12 是星期日
        assert_eq!(date("20250112").weekday_index(), 0);
        assert_eq!(date("20250118").weekday_index(), 6);
    }

    #[test]
    fn test_serde_uses_wire_format() {
        let json = serde_json::to_string(&date("20250115")).unwrap();
        assert_eq!(json, "\"20250115\"");
        let back: TaskDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date("20250115"));
        assert!(serde_json::from_str::<TaskDate>("\"2025-01-15\"").is_err());
    }

    #[test]
    fn test_parse_search_date() {
        assert_eq!(TaskDate::parse_search("15.01.2025"), Some(date("20250115")));
        assert_eq!(TaskDate::parse_search("meeting"), None);
    }
}
