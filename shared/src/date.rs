//! 业务时区与日期/时间精度处理
//!
//! 表单里的日期默认值一律取阿尔伯塔（America/Edmonton）当天，而不是
//! 浏览器本地时区——深夜录入的班次必须落在营业日上。服务端返回的
//! 日期/时间可能带秒或完整 ISO 时间戳，编辑表单先截断到控件精度，
//! 提交时原样传回，保证不改动任何字段时编辑是幂等的。

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::America::Edmonton;
use chrono_tz::Tz;

/// 全系统唯一的业务时区
pub const BUSINESS_TZ: Tz = Edmonton;

/// 给定 UTC 时刻对应的营业日
pub fn business_date(utc: DateTime<Utc>) -> NaiveDate {
    utc.with_timezone(&BUSINESS_TZ).date_naive()
}

/// 前端从 `js_sys::Date::now()` 拿到的毫秒时间戳转营业日。
/// 时间戳越界时退回 Unix 纪元当天（实践中不可达）。
pub fn business_date_from_millis(millis: i64) -> NaiveDate {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH);
    business_date(utc)
}

// =========================================================
// 控件精度截断 (Widget Precision)
// =========================================================

/// `"2025-03-01T00:00:00Z"` -> `"2025-03-01"`；已是日期精度的输入原样返回
pub fn truncate_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() > 10 && trimmed.as_bytes().get(4) == Some(&b'-') {
        trimmed[..10].to_string()
    } else {
        trimmed.to_string()
    }
}

/// `"09:00:00"` -> `"09:00"`；已是分钟精度的输入原样返回
pub fn truncate_hm(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() > 5 && trimmed.as_bytes().get(2) == Some(&b':') {
        trimmed[..5].to_string()
    } else {
        trimmed.to_string()
    }
}

/// 详情页的长日期：`"2025-03-01"` -> `"March 1, 2025"`，解析失败原样返回
pub fn format_long_date(raw: &str) -> String {
    let date_part = truncate_date(raw);
    match NaiveDate::parse_from_str(&date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn business_date_rolls_back_across_midnight_utc() {
        // UTC 3 月 2 日 02:00 在埃德蒙顿仍是 3 月 1 日晚间
        let utc = Utc.with_ymd_and_hms(2025, 3, 2, 2, 0, 0).unwrap();
        assert_eq!(business_date(utc), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn business_date_honours_daylight_saving() {
        // 夏令时期间 UTC-6：7 月 2 日 05:30 UTC 已是当地 1 日 23:30
        let utc = Utc.with_ymd_and_hms(2025, 7, 2, 5, 30, 0).unwrap();
        assert_eq!(business_date(utc), NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        // 冬令时 UTC-7：同一钟点差一小时，翻到 2 日
        let utc = Utc.with_ymd_and_hms(2025, 12, 2, 6, 30, 0).unwrap();
        assert_eq!(business_date(utc), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn iso_timestamp_truncates_to_date_input_value() {
        assert_eq!(truncate_date("2025-03-01T00:00:00Z"), "2025-03-01");
        assert_eq!(truncate_date("2025-03-01"), "2025-03-01");
    }

    #[test]
    fn seconds_truncate_to_time_input_value() {
        assert_eq!(truncate_hm("09:00:00"), "09:00");
        assert_eq!(truncate_hm("09:00"), "09:00");
    }

    #[test]
    fn truncation_round_trips_losslessly() {
        // 服务端值装入编辑表单再原样提交，应得到等价值
        let date = truncate_date("2025-03-01T00:00:00Z");
        let start = truncate_hm("09:00:00");
        let end = truncate_hm("17:00:00");
        assert_eq!((date.as_str(), start.as_str(), end.as_str()), ("2025-03-01", "09:00", "17:00"));
        assert_eq!(truncate_date(&date), date);
        assert_eq!(truncate_hm(&start), start);
    }

    #[test]
    fn long_date_formatting_falls_back_to_raw() {
        assert_eq!(format_long_date("2025-03-01"), "March 1, 2025");
        assert_eq!(format_long_date("2025-03-01T08:15:00Z"), "March 1, 2025");
        assert_eq!(format_long_date("not a date"), "not a date");
    }
}
