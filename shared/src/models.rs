//! 领域实体定义
//!
//! 客户端缓存的实体快照。服务端持有权威数据，这里只描述 UI 消费的字段。
//! 日期/时间字段保持服务端返回的字符串原样（可能带秒或完整 ISO 时间戳），
//! 截断到输入控件精度由 `crate::date` 的工具函数完成。

use serde::{Deserialize, Serialize};

// =========================================================
// 用户与权限 (User & Permissions)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub can_manage_users: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    // 行级操作谓词：列表页据此决定是否渲染对应按钮
    pub fn can_create(&self) -> bool {
        !self.is_staff()
    }

    pub fn can_update(&self) -> bool {
        !self.is_staff()
    }

    pub fn can_delete(&self) -> bool {
        self.is_admin()
    }
}

// =========================================================
// 员工 (Employees)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub preferred_name: Option<String>,
    pub position: String,
    pub department: Option<String>,
    pub hourly_rate: f64,
    pub status: EmployeeStatus,
    /// 入职文档元数据（详情展示用；文件本体走 multipart）
    #[serde(default)]
    pub documents: Vec<EmployeeDocument>,
}

impl Employee {
    /// 列表与下拉框的显示名：优先使用常用名
    pub fn display_name(&self) -> &str {
        self.preferred_name.as_deref().unwrap_or(&self.name)
    }
}

/// 入职文档描述符。文件本体走 multipart 上传，这里只是列表展示用的元数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDocument {
    pub id: i64,
    pub employee_id: i64,
    pub name: String,
    pub file_name: String,
}

// =========================================================
// 工时 (Work Hours)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHour {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub project: Option<String>,
    pub description: Option<String>,
    /// 读取时以服务端计算值为准；表单在提交前只做本地预览
    pub total_hours: f64,
}

// =========================================================
// 排班 (Work Schedules)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: Option<String>,
    /// 周起始日（周一），`YYYY-MM-DD`
    pub week_start: String,
    pub days: Vec<WorkScheduleDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkScheduleDay {
    /// 0 = 周一 .. 6 = 周日
    pub weekday: u8,
    pub is_working_day: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl WorkSchedule {
    /// 聚合工时：逐日求和，非工作日与缺失时间记 0
    pub fn total_hours(&self) -> f64 {
        let sum: f64 = self
            .days
            .iter()
            .filter(|d| d.is_working_day)
            .map(|d| {
                crate::hours::calculate_total_hours(
                    d.start_time.as_deref().unwrap_or(""),
                    d.end_time.as_deref().unwrap_or(""),
                )
            })
            .sum();
        (sum * 100.0).round() / 100.0
    }

    pub fn working_day_count(&self) -> usize {
        self.days.iter().filter(|d| d.is_working_day).count()
    }
}

// =========================================================
// 薪资报告与薪资记录 (Payroll)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Processed,
    Failed,
}

/// 上传的 PDF 薪资报告，生命周期 pending -> processed | failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollReport {
    pub id: i64,
    pub file_name: String,
    pub pay_period: String,
    pub status: ReportStatus,
    pub parsed_data: Option<ParsedReport>,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub employees: Vec<ParsedEmployee>,
}

/// 后端从 PDF 提取出的单个员工记录，编辑后复制为正式薪资记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEmployee {
    pub employee_id: Option<i64>,
    pub name: String,
    pub parsed_data: PayrollFigures,
}

/// 一张工资单的全部数字字段。
/// 税额与 YTD 均为后端计算结果，客户端只展示和人工修正。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollFigures {
    #[serde(default)]
    pub regular_hours: f64,
    #[serde(default)]
    pub regular_rate: f64,
    #[serde(default)]
    pub regular_current: f64,
    #[serde(default)]
    pub regular_ytd: f64,
    #[serde(default)]
    pub stat_hours: f64,
    #[serde(default)]
    pub stat_rate: f64,
    #[serde(default)]
    pub stat_current: f64,
    #[serde(default)]
    pub stat_ytd: f64,
    #[serde(default)]
    pub overtime_hours: f64,
    #[serde(default)]
    pub overtime_rate: f64,
    #[serde(default)]
    pub overtime_current: f64,
    #[serde(default)]
    pub overtime_ytd: f64,
    #[serde(default)]
    pub cpp_current: f64,
    #[serde(default)]
    pub cpp_ytd: f64,
    #[serde(default)]
    pub ei_current: f64,
    #[serde(default)]
    pub ei_ytd: f64,
    #[serde(default)]
    pub federal_tax_current: f64,
    #[serde(default)]
    pub federal_tax_ytd: f64,
    #[serde(default)]
    pub vacation_earned: f64,
    #[serde(default)]
    pub vacation_paid: f64,
    #[serde(default)]
    pub gross_pay: f64,
    #[serde(default)]
    pub net_pay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payroll {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: Option<String>,
    pub pay_date: String,
    /// 原始期间字符串，按期分组以此为键
    pub pay_period: String,
    #[serde(flatten)]
    pub figures: PayrollFigures,
}

/// `GET /employees/pay-days` 的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayDay {
    pub pay_date: String,
    pub pay_period: String,
}

/// `GET /employees/earnings` 的行，全部为后端预计算值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsRow {
    pub employee_id: i64,
    pub employee_name: String,
    pub pay_period: String,
    pub total_hours: f64,
    pub gross_pay: f64,
    pub net_pay: f64,
}

// =========================================================
// 服务商与账单 (Providers & Bills)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub service: Option<String>,
    pub payment_method: Option<String>,
    pub status: EmployeeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderBill {
    pub id: i64,
    pub provider_id: i64,
    pub provider_name: Option<String>,
    pub bill_date: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub status: BillStatus,
    pub notes: Option<String>,
}

// =========================================================
// 业主与权益 (Owners & Equity)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityKind {
    Investment,
    Withdrawal,
}

/// 业主资本账户的一笔投入或支取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerEquityTransaction {
    pub id: i64,
    pub owner_id: i64,
    pub owner_name: Option<String>,
    pub date: String,
    pub amount: f64,
    pub kind: EquityKind,
    pub description: Option<String>,
}

// =========================================================
// 每日销售 (Daily Sales)
// =========================================================

/// 一天的燃油与便利店销售汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySale {
    pub id: i64,
    pub date: String,
    pub fuel_litres: f64,
    pub fuel_total: f64,
    pub store_total: f64,
    pub cash_total: f64,
    pub card_total: f64,
    pub notes: Option<String>,
}

impl DailySale {
    pub fn grand_total(&self) -> f64 {
        self.fuel_total + self.store_total
    }
}
