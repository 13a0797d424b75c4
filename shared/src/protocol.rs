//! API protocol types shared by every page-level fetch.
//!
//! The REST backend is an external collaborator; this module pins down the
//! one request/response shape the client accepts. Collection endpoints
//! return [`Paginated<T>`], detail/create/update return the bare entity,
//! delete returns no body. There is deliberately no fallback parsing of
//! alternative envelope shapes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::models::{PayrollFigures, User, WorkScheduleDay};

// =========================================================
// 列表查询参数 (List Query)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// 集合端点的查询参数。`filters` 承载实体特有的过滤键
/// （如员工列表的 `status`、工时列表的 `employee_id`）。
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub search: String,
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
    pub page: u32,
    pub per_page: u32,
    pub filters: Vec<(String, String)>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_by: None,
            sort_direction: SortDirection::Asc,
            page: 1,
            per_page: 25,
            filters: Vec::new(),
        }
    }
}

impl ListQuery {
    /// 编码为 `?a=b&c=d` 形式的查询串，空 search 与未设置的排序键省略
    pub fn to_query_string(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        if !self.search.trim().is_empty() {
            ser.append_pair("search", self.search.trim());
        }
        if let Some(sort_by) = &self.sort_by {
            ser.append_pair("sort_by", sort_by);
            ser.append_pair("sort_direction", self.sort_direction.as_str());
        }
        ser.append_pair("page", &self.page.to_string());
        ser.append_pair("per_page", &self.per_page.to_string());
        for (key, value) in &self.filters {
            if !value.is_empty() {
                ser.append_pair(key, value);
            }
        }
        format!("?{}", ser.finish())
    }
}

// =========================================================
// 响应信封 (Response Envelope)
// =========================================================

/// 集合端点的统一分页信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 422 响应体：整体消息 + 按字段键控的错误列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationPayload {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: HashMap<String, Vec<String>>,
}

// =========================================================
// 认证 (Auth)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// =========================================================
// 写入请求体 (Create / Update Inputs)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    pub preferred_name: Option<String>,
    pub position: String,
    pub department: Option<String>,
    pub hourly_rate: f64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkHourInput {
    pub employee_id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub project: Option<String>,
    pub description: Option<String>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkScheduleInput {
    pub employee_id: i64,
    pub week_start: String,
    pub days: Vec<WorkScheduleDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderInput {
    pub name: String,
    pub service: Option<String>,
    pub payment_method: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderBillInput {
    pub provider_id: i64,
    pub bill_date: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerInput {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerEquityInput {
    pub owner_id: i64,
    pub date: String,
    pub amount: f64,
    pub kind: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySaleInput {
    pub date: String,
    pub fuel_litres: f64,
    pub fuel_total: f64,
    pub store_total: f64,
    pub cash_total: f64,
    pub card_total: f64,
    pub notes: Option<String>,
}

/// 薪资记录的写入体，亦用于报告处理页的批量提交。
/// 草稿阶段 `employee_id` 可能缺失，提交前由表单校验补全。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollInput {
    pub employee_id: Option<i64>,
    pub pay_date: String,
    pub pay_period: String,
    #[serde(flatten)]
    pub figures: PayrollFigures,
}

/// `POST /payroll-reports/:id/process` 的请求体：
/// 一次请求持久化整批记录，成功/失败整体生效
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReportRequest {
    pub records: Vec<PayrollInput>,
}

/// `POST /employees/pay-stubs` 的请求体，响应为 HTML 文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayStubRequest {
    pub employee_id: i64,
    pub pay_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_includes_pagination_only_by_default() {
        let q = ListQuery::default();
        assert_eq!(q.to_query_string(), "?page=1&per_page=25");
    }

    #[test]
    fn query_string_carries_search_sort_and_filters() {
        let q = ListQuery {
            search: "diesel pump".into(),
            sort_by: Some("date".into()),
            sort_direction: SortDirection::Desc,
            page: 3,
            per_page: 10,
            filters: vec![("status".into(), "active".into())],
        };
        assert_eq!(
            q.to_query_string(),
            "?search=diesel+pump&sort_by=date&sort_direction=desc&page=3&per_page=10&status=active"
        );
    }

    #[test]
    fn empty_filter_values_are_omitted() {
        let q = ListQuery {
            filters: vec![("status".into(), String::new())],
            ..ListQuery::default()
        };
        assert!(!q.to_query_string().contains("status"));
    }

    #[test]
    fn paginated_envelope_deserializes() {
        let json = r#"{"data":[{"pay_date":"2025-11-06","pay_period":"10/24/2025-11/06/2025"}],"current_page":1,"last_page":4,"total":42}"#;
        let page: Paginated<crate::models::PayDay> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.last_page, 4);
        assert_eq!(page.total, 42);
    }

    #[test]
    fn validation_payload_tolerates_missing_errors_map() {
        let payload: ValidationPayload =
            serde_json::from_str(r#"{"message":"The given data was invalid."}"#).unwrap();
        assert!(payload.errors.is_empty());
    }
}
