//! 工时计算
//!
//! 两个 `HH:MM` 字符串默认落在同一天。结束不晚于开始时返回 0 而不是负数；
//! 快捷录入页直接采用该钳制值，结构化工时表单则在校验层把同样的情况
//! 当作字段错误拦下，两种页面策略都依赖这里的同一份解析逻辑。

use chrono::NaiveTime;

/// 解析 `HH:MM`，兼容服务端可能多带的秒（`HH:MM:SS`）
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// 起止时间之差，单位小时，保留两位小数，非负。
/// 任一端为空或不可解析时返回 0.0。
pub fn calculate_total_hours(start: &str, end: &str) -> f64 {
    let (Some(start), Some(end)) = (parse_hhmm(start), parse_hhmm(end)) else {
        return 0.0;
    };
    let minutes = (end - start).num_minutes();
    if minutes <= 0 {
        return 0.0;
    }
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

/// 结构化表单的校验谓词：两端可解析且结束严格晚于开始
pub fn end_after_start(start: &str, end: &str) -> bool {
    match (parse_hhmm(start), parse_hhmm(end)) {
        (Some(start), Some(end)) => end > start,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_shift_is_eight_hours() {
        assert_eq!(calculate_total_hours("09:00", "17:00"), 8.00);
    }

    #[test]
    fn reversed_times_clamp_to_zero() {
        // 钳制而非负数
        assert_eq!(calculate_total_hours("17:00", "09:00"), 0.00);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(calculate_total_hours("", "17:00"), 0.0);
        assert_eq!(calculate_total_hours("09:00", ""), 0.0);
    }

    #[test]
    fn partial_hours_round_to_two_decimals() {
        assert_eq!(calculate_total_hours("09:00", "13:20"), 4.33);
        assert_eq!(calculate_total_hours("09:15", "17:45"), 8.5);
    }

    #[test]
    fn seconds_precision_from_server_is_accepted() {
        assert_eq!(calculate_total_hours("09:00:00", "17:00:00"), 8.00);
    }

    #[test]
    fn end_after_start_rejects_equal_and_reversed() {
        assert!(end_after_start("09:00", "17:00"));
        assert!(!end_after_start("09:00", "09:00"));
        assert!(!end_after_start("17:00", "09:00"));
        assert!(!end_after_start("", "09:00"));
    }
}
