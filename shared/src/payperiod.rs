//! 薪资期间的解析、格式化与分组
//!
//! 期间在系统里是一段自由文本（通常形如 `10/24/2025- 11/06/2025`，
//! 破折号两侧的空白不定）。可解析时渲染成长日期区间，解析不了的
//! 原样透传，绝不报错——报告上传时用户手填的 `Q4 2025` 之类也要能显示。

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::Payroll;

/// 按期分组展示时，单独成表的最近期间数；更早的记录并入一张“历史”表
pub const RECENT_PERIOD_TABLES: usize = 3;

fn period_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2})/(\d{1,2})/(\d{4})\s*-\s*(\d{1,2})/(\d{1,2})/(\d{4})\s*$")
            .expect("period pattern is a constant")
    })
}

/// 解析 `MM/DD/YYYY - MM/DD/YYYY` 形状的期间文本
pub fn parse_pay_period(raw: &str) -> Option<(NaiveDate, NaiveDate)> {
    let caps = period_regex().captures(raw)?;
    let num = |i: usize| caps[i].parse::<u32>().ok();
    let start = NaiveDate::from_ymd_opt(caps[3].parse().ok()?, num(1)?, num(2)?)?;
    let end = NaiveDate::from_ymd_opt(caps[6].parse().ok()?, num(4)?, num(5)?)?;
    Some((start, end))
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `"10/24/2025- 11/06/2025"` -> `"October 24, 2025 - November 6, 2025"`；
/// 不匹配的输入原样返回
pub fn format_pay_period(raw: &str) -> String {
    match parse_pay_period(raw) {
        Some((start, end)) => format!("{} - {}", long_date(start), long_date(end)),
        None => raw.to_string(),
    }
}

// =========================================================
// 按期分组 (Grouping)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodGroup {
    /// 原始期间字符串（分组键）
    pub period: String,
    /// 解析出的期末日；解析失败视为最旧
    pub end_date: Option<NaiveDate>,
    pub entries: Vec<Payroll>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedPayrolls {
    /// 期末日最近的若干组，每组渲染为独立表格
    pub recent: Vec<PeriodGroup>,
    /// 其余的组，合并成一张表
    pub older: Vec<PeriodGroup>,
}

impl GroupedPayrolls {
    /// 历史表的行：期间标签不再由表头隐含，逐行携带
    pub fn older_rows(&self) -> Vec<(&str, &Payroll)> {
        self.older
            .iter()
            .flat_map(|group| {
                group
                    .entries
                    .iter()
                    .map(move |entry| (group.period.as_str(), entry))
            })
            .collect()
    }
}

/// 按原始期间字符串分组，组间按期末日降序，前 [`RECENT_PERIOD_TABLES`]
/// 组单独展示，其余并入历史表
pub fn group_by_period(records: Vec<Payroll>) -> GroupedPayrolls {
    let mut groups: Vec<PeriodGroup> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.period == record.pay_period) {
            Some(group) => group.entries.push(record),
            None => groups.push(PeriodGroup {
                period: record.pay_period.clone(),
                end_date: parse_pay_period(&record.pay_period).map(|(_, end)| end),
                entries: vec![record],
            }),
        }
    }

    // None 的期末日排在所有可解析日期之后
    groups.sort_by(|a, b| match (a.end_date, b.end_date) {
        (Some(a_end), Some(b_end)) => b_end.cmp(&a_end),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.period.cmp(&b.period),
    });

    let older = groups.split_off(groups.len().min(RECENT_PERIOD_TABLES));
    GroupedPayrolls {
        recent: groups,
        older,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PayrollFigures;

    fn payroll(period: &str, employee_id: i64) -> Payroll {
        Payroll {
            id: employee_id,
            employee_id,
            employee_name: None,
            pay_date: String::new(),
            pay_period: period.to_string(),
            figures: PayrollFigures::default(),
        }
    }

    #[test]
    fn formats_range_with_long_month_names() {
        assert_eq!(
            format_pay_period("10/24/2025- 11/06/2025"),
            "October 24, 2025 - November 6, 2025"
        );
    }

    #[test]
    fn tolerates_whitespace_variants_around_dash() {
        assert_eq!(
            format_pay_period("01/01/2025 - 01/14/2025"),
            "January 1, 2025 - January 14, 2025"
        );
        assert_eq!(
            format_pay_period("01/01/2025-01/14/2025"),
            "January 1, 2025 - January 14, 2025"
        );
    }

    #[test]
    fn unparsable_input_passes_through() {
        assert_eq!(format_pay_period("Q4 2025"), "Q4 2025");
        assert_eq!(format_pay_period(""), "");
    }

    #[test]
    fn invalid_calendar_dates_pass_through() {
        assert_eq!(format_pay_period("13/45/2025- 14/50/2025"), "13/45/2025- 14/50/2025");
    }

    #[test]
    fn five_periods_split_into_three_recent_plus_older() {
        let records = vec![
            payroll("01/01/2025- 01/14/2025", 1),
            payroll("01/15/2025- 01/28/2025", 2),
            payroll("01/29/2025- 02/11/2025", 3),
            payroll("02/12/2025- 02/25/2025", 4),
            payroll("02/26/2025- 03/11/2025", 5),
            // 第二个落在最旧期间的记录
            payroll("01/01/2025- 01/14/2025", 6),
        ];
        let grouped = group_by_period(records);

        assert_eq!(grouped.recent.len(), 3);
        assert_eq!(grouped.recent[0].period, "02/26/2025- 03/11/2025");
        assert_eq!(grouped.recent[2].period, "01/29/2025- 02/11/2025");

        assert_eq!(grouped.older.len(), 2);
        let rows = grouped.older_rows();
        assert_eq!(rows.len(), 3);
        // 历史表逐行携带期间标签
        assert!(rows.iter().all(|(label, _)| !label.is_empty()));
        assert_eq!(
            rows.iter()
                .filter(|(label, _)| *label == "01/01/2025- 01/14/2025")
                .count(),
            2
        );
    }

    #[test]
    fn unparsable_periods_never_displace_recent_ones() {
        let records = vec![
            payroll("Q4 2025", 1),
            payroll("01/01/2025- 01/14/2025", 2),
            payroll("01/15/2025- 01/28/2025", 3),
            payroll("01/29/2025- 02/11/2025", 4),
        ];
        let grouped = group_by_period(records);
        assert_eq!(grouped.recent.len(), 3);
        assert!(grouped.recent.iter().all(|g| g.period != "Q4 2025"));
        assert_eq!(grouped.older[0].period, "Q4 2025");
    }

    #[test]
    fn fewer_groups_than_tables_means_no_older_section() {
        let grouped = group_by_period(vec![payroll("01/01/2025- 01/14/2025", 1)]);
        assert_eq!(grouped.recent.len(), 1);
        assert!(grouped.older.is_empty());
        assert!(grouped.older_rows().is_empty());
    }
}
