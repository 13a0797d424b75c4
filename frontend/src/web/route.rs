//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、每条路由的权限标签，以及旧路径的改写表。

use std::fmt::Display;

/// 路由的权限标签。`None`（未打标签）表示任何已登录用户可访问。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 非一线员工（经理及以上）
    NotStaff,
    /// 仅管理员
    Admin,
    /// 管理员或带用户管理标记的账号
    ManageUsers,
}

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Dashboard,

    Sales,
    SaleNew,
    SaleEdit(i64),

    Employees,
    EmployeeNew,
    EmployeeDetail(i64),
    EmployeeEdit(i64),

    WorkHours,
    WorkHourNew,
    WorkHourEdit(i64),
    QuickHours,

    Schedules,
    ScheduleNew,
    ScheduleEdit(i64),

    PayrollReports,
    PayrollReportUpload,
    PayrollReportProcess(i64),

    Payrolls,
    PayrollNew,
    PayrollEdit(i64),
    PayStubs,

    Providers,
    ProviderNew,
    ProviderEdit(i64),
    ProviderBills,
    ProviderBillNew,
    ProviderBillDetail(i64),
    ProviderBillEdit(i64),

    Owners,
    OwnerNew,
    OwnerEdit(i64),
    OwnerEquity,
    OwnerEquityNew,

    /// 页面未找到
    NotFound,
}

/// 旧路径改写表：纯重写，不产生状态。
/// 销售页在旧版本里挂在 `/daily-sales` 下。
fn rewrite_legacy(path: &str) -> String {
    if path == "/daily-sales" {
        return "/sales".to_string();
    }
    if let Some(rest) = path.strip_prefix("/daily-sales/") {
        return format!("/sales/{rest}");
    }
    path.to_string()
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse::<i64>().ok().filter(|id| *id > 0)
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let canonical = rewrite_legacy(path);
        let segments: Vec<&str> = canonical.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["login"] => Self::Login,
            ["dashboard"] => Self::Dashboard,

            ["sales"] => Self::Sales,
            ["sales", "new"] => Self::SaleNew,
            ["sales", id, "edit"] => match parse_id(id) {
                Some(id) => Self::SaleEdit(id),
                None => Self::NotFound,
            },

            ["employees"] => Self::Employees,
            ["employees", "new"] => Self::EmployeeNew,
            ["employees", id] => match parse_id(id) {
                Some(id) => Self::EmployeeDetail(id),
                None => Self::NotFound,
            },
            ["employees", id, "edit"] => match parse_id(id) {
                Some(id) => Self::EmployeeEdit(id),
                None => Self::NotFound,
            },

            ["work-hours"] => Self::WorkHours,
            ["work-hours", "new"] => Self::WorkHourNew,
            ["work-hours", id, "edit"] => match parse_id(id) {
                Some(id) => Self::WorkHourEdit(id),
                None => Self::NotFound,
            },
            ["quick-hours"] => Self::QuickHours,

            ["schedules"] => Self::Schedules,
            ["schedules", "new"] => Self::ScheduleNew,
            ["schedules", id, "edit"] => match parse_id(id) {
                Some(id) => Self::ScheduleEdit(id),
                None => Self::NotFound,
            },

            ["payroll-reports"] => Self::PayrollReports,
            ["payroll-reports", "upload"] => Self::PayrollReportUpload,
            ["payroll-reports", id, "process"] => match parse_id(id) {
                Some(id) => Self::PayrollReportProcess(id),
                None => Self::NotFound,
            },

            ["payrolls"] => Self::Payrolls,
            ["payrolls", "new"] => Self::PayrollNew,
            ["payrolls", id, "edit"] => match parse_id(id) {
                Some(id) => Self::PayrollEdit(id),
                None => Self::NotFound,
            },
            ["pay-stubs"] => Self::PayStubs,

            ["providers"] => Self::Providers,
            ["providers", "new"] => Self::ProviderNew,
            ["providers", id, "edit"] => match parse_id(id) {
                Some(id) => Self::ProviderEdit(id),
                None => Self::NotFound,
            },
            ["provider-bills"] => Self::ProviderBills,
            ["provider-bills", "new"] => Self::ProviderBillNew,
            ["provider-bills", id] => match parse_id(id) {
                Some(id) => Self::ProviderBillDetail(id),
                None => Self::NotFound,
            },
            ["provider-bills", id, "edit"] => match parse_id(id) {
                Some(id) => Self::ProviderBillEdit(id),
                None => Self::NotFound,
            },

            ["owners"] => Self::Owners,
            ["owners", "new"] => Self::OwnerNew,
            ["owners", id, "edit"] => match parse_id(id) {
                Some(id) => Self::OwnerEdit(id),
                None => Self::NotFound,
            },
            ["owner-equity"] => Self::OwnerEquity,
            ["owner-equity", "new"] => Self::OwnerEquityNew,

            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),

            Self::Sales => "/sales".to_string(),
            Self::SaleNew => "/sales/new".to_string(),
            Self::SaleEdit(id) => format!("/sales/{id}/edit"),

            Self::Employees => "/employees".to_string(),
            Self::EmployeeNew => "/employees/new".to_string(),
            Self::EmployeeDetail(id) => format!("/employees/{id}"),
            Self::EmployeeEdit(id) => format!("/employees/{id}/edit"),

            Self::WorkHours => "/work-hours".to_string(),
            Self::WorkHourNew => "/work-hours/new".to_string(),
            Self::WorkHourEdit(id) => format!("/work-hours/{id}/edit"),
            Self::QuickHours => "/quick-hours".to_string(),

            Self::Schedules => "/schedules".to_string(),
            Self::ScheduleNew => "/schedules/new".to_string(),
            Self::ScheduleEdit(id) => format!("/schedules/{id}/edit"),

            Self::PayrollReports => "/payroll-reports".to_string(),
            Self::PayrollReportUpload => "/payroll-reports/upload".to_string(),
            Self::PayrollReportProcess(id) => format!("/payroll-reports/{id}/process"),

            Self::Payrolls => "/payrolls".to_string(),
            Self::PayrollNew => "/payrolls/new".to_string(),
            Self::PayrollEdit(id) => format!("/payrolls/{id}/edit"),
            Self::PayStubs => "/pay-stubs".to_string(),

            Self::Providers => "/providers".to_string(),
            Self::ProviderNew => "/providers/new".to_string(),
            Self::ProviderEdit(id) => format!("/providers/{id}/edit"),
            Self::ProviderBills => "/provider-bills".to_string(),
            Self::ProviderBillNew => "/provider-bills/new".to_string(),
            Self::ProviderBillDetail(id) => format!("/provider-bills/{id}"),
            Self::ProviderBillEdit(id) => format!("/provider-bills/{id}/edit"),

            Self::Owners => "/owners".to_string(),
            Self::OwnerNew => "/owners/new".to_string(),
            Self::OwnerEdit(id) => format!("/owners/{id}/edit"),
            Self::OwnerEquity => "/owner-equity".to_string(),
            Self::OwnerEquityNew => "/owner-equity/new".to_string(),

            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::NotFound)
    }

    /// 路由的权限标签
    pub fn permission(&self) -> Option<Access> {
        match self {
            Self::Sales | Self::SaleNew | Self::SaleEdit(_) => Some(Access::NotStaff),
            Self::Employees | Self::EmployeeDetail(_) => Some(Access::NotStaff),
            Self::EmployeeNew | Self::EmployeeEdit(_) => Some(Access::ManageUsers),
            Self::PayStubs => Some(Access::NotStaff),

            Self::PayrollReports
            | Self::PayrollReportUpload
            | Self::PayrollReportProcess(_)
            | Self::Payrolls
            | Self::PayrollNew
            | Self::PayrollEdit(_)
            | Self::Providers
            | Self::ProviderNew
            | Self::ProviderEdit(_)
            | Self::ProviderBills
            | Self::ProviderBillNew
            | Self::ProviderBillDetail(_)
            | Self::ProviderBillEdit(_)
            | Self::Owners
            | Self::OwnerNew
            | Self::OwnerEdit(_)
            | Self::OwnerEquity
            | Self::OwnerEquityNew => Some(Access::Admin),

            _ => None,
        }
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功（或权限不足）时的落点
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_login_both_resolve_to_login() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
    }

    #[test]
    fn parametrized_paths_round_trip() {
        let routes = [
            AppRoute::EmployeeDetail(7),
            AppRoute::EmployeeEdit(7),
            AppRoute::WorkHourEdit(12),
            AppRoute::PayrollReportProcess(3),
            AppRoute::ProviderBillDetail(99),
            AppRoute::SaleEdit(1),
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn legacy_daily_sales_paths_rewrite_to_sales() {
        assert_eq!(AppRoute::from_path("/daily-sales"), AppRoute::Sales);
        assert_eq!(AppRoute::from_path("/daily-sales/new"), AppRoute::SaleNew);
        assert_eq!(AppRoute::from_path("/daily-sales/4/edit"), AppRoute::SaleEdit(4));
    }

    #[test]
    fn malformed_ids_fall_through_to_not_found() {
        assert_eq!(AppRoute::from_path("/employees/abc"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/employees/0/edit"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/work-hours/-3/edit"), AppRoute::NotFound);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(AppRoute::from_path("/vendors"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/sales/1/edit/extra"), AppRoute::NotFound);
    }

    #[test]
    fn permission_tags_match_the_route_table() {
        assert_eq!(AppRoute::Dashboard.permission(), None);
        assert_eq!(AppRoute::WorkHours.permission(), None);
        assert_eq!(AppRoute::QuickHours.permission(), None);
        assert_eq!(AppRoute::Sales.permission(), Some(Access::NotStaff));
        assert_eq!(AppRoute::Employees.permission(), Some(Access::NotStaff));
        assert_eq!(AppRoute::EmployeeNew.permission(), Some(Access::ManageUsers));
        assert_eq!(AppRoute::Payrolls.permission(), Some(Access::Admin));
        assert_eq!(AppRoute::OwnerEquity.permission(), Some(Access::Admin));
    }

    #[test]
    fn only_login_and_not_found_skip_auth() {
        assert!(!AppRoute::Login.requires_auth());
        assert!(!AppRoute::NotFound.requires_auth());
        assert!(AppRoute::Dashboard.requires_auth());
        assert!(AppRoute::QuickHours.requires_auth());
    }
}
