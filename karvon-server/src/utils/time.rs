//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期 + 时分秒 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(hour, min, sec).unwrap();
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_hms_to_millis(next_day, 0, 0, 0, tz)
}

/// millis → 业务时区下的营业日 (YYYY-MM-DD)
pub fn millis_to_business_date(millis: i64, tz: Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .date_naive()
}

/// 解析事件时间戳：RFC 3339 完整时间，或 YYYY-MM-DD (取当日零点)
pub fn parse_timestamp(value: &str, tz: Tz) -> AppResult<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    let date = parse_date(value)?;
    Ok(day_start_millis(date, tz))
}

/// 可选事件时间戳，缺省为当前时间
pub fn parse_timestamp_or_now(value: Option<&str>, tz: Tz) -> AppResult<i64> {
    match value {
        Some(v) => parse_timestamp(v, tz),
        None => Ok(shared::util::now_millis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Warsaw;

    #[test]
    fn day_range_is_half_open_24h() {
        let d = parse_date("2025-03-10").unwrap();
        let start = day_start_millis(d, Warsaw);
        let end = day_end_millis(d, Warsaw);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
        assert_eq!(millis_to_business_date(start, Warsaw), d);
        assert_eq!(millis_to_business_date(end - 1, Warsaw), d);
        assert_ne!(millis_to_business_date(end, Warsaw), d);
    }

    #[test]
    fn parses_rfc3339_and_bare_dates() {
        let ts = parse_timestamp("2025-03-10T12:30:00+01:00", Warsaw).unwrap();
        assert_eq!(millis_to_business_date(ts, Warsaw).to_string(), "2025-03-10");

        let ts = parse_timestamp("2025-03-10", Warsaw).unwrap();
        let d = parse_date("2025-03-10").unwrap();
        assert_eq!(ts, day_start_millis(d, Warsaw));

        assert!(parse_timestamp("10/03/2025", Warsaw).is_err());
    }
}
