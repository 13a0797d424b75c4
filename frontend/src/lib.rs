//! StationOps 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型，含权限标签与旧路径改写）
//! - `web::router`: 路由服务（核心引擎，认证 + 权限守卫）
//! - `auth`: 会话状态管理
//! - `api`: REST 客户端（统一信封、超时、错误分类）
//! - `components`: UI 组件层（通用脚手架 + 各实体页面）

mod api;
mod auth;
mod components {
    pub mod dashboard;
    pub mod detail;
    pub mod employees;
    pub mod feedback;
    pub mod forms;
    mod icons;
    pub mod layout;
    pub mod listing;
    pub mod login;
    pub mod owner_equity;
    pub mod pay_stubs;
    pub mod payroll_process;
    pub mod payroll_reports;
    pub mod payrolls;
    pub mod providers;
    pub mod quick_hours;
    pub mod sales;
    pub mod schedules;
    pub mod work_hours;
}
mod serde_helper;
pub(crate) mod web;

use leptos::prelude::*;

use crate::auth::{SessionContext, init_session};
use crate::components::dashboard::DashboardPage;
use crate::components::employees::{EmployeeDetailPage, EmployeeFormPage, EmployeeListPage};
use crate::components::layout::AppShell;
use crate::components::login::LoginPage;
use crate::components::owner_equity::{
    OwnerEquityFormPage, OwnerEquityListPage, OwnerFormPage, OwnerListPage,
};
use crate::components::pay_stubs::PayStubsPage;
use crate::components::payroll_process::PayrollReportProcessPage;
use crate::components::payroll_reports::{PayrollReportListPage, PayrollReportUploadPage};
use crate::components::payrolls::{PayrollFormPage, PayrollsPage};
use crate::components::providers::{
    ProviderBillDetailPage, ProviderBillFormPage, ProviderBillListPage, ProviderFormPage,
    ProviderListPage,
};
use crate::components::quick_hours::QuickHoursPage;
use crate::components::sales::{SaleFormPage, SalesListPage};
use crate::components::schedules::{ScheduleFormPage, ScheduleListPage};
use crate::components::work_hours::{WorkHourFormPage, WorkHourListPage};
use crate::web::route::AppRoute;
use crate::web::router::{Router, RouterOutlet};

/// 已认证页面包上公共外壳
fn in_shell(page: AnyView) -> AnyView {
    view! { <AppShell>{page}</AppShell> }.into_any()
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。守卫已由路由服务执行，
/// 这里只做纯映射。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),

        AppRoute::Dashboard => in_shell(view! { <DashboardPage /> }.into_any()),

        AppRoute::Sales => in_shell(view! { <SalesListPage /> }.into_any()),
        AppRoute::SaleNew => in_shell(view! { <SaleFormPage /> }.into_any()),
        AppRoute::SaleEdit(id) => in_shell(view! { <SaleFormPage id=id /> }.into_any()),

        AppRoute::Employees => in_shell(view! { <EmployeeListPage /> }.into_any()),
        AppRoute::EmployeeNew => in_shell(view! { <EmployeeFormPage /> }.into_any()),
        AppRoute::EmployeeDetail(id) => {
            in_shell(view! { <EmployeeDetailPage id=id /> }.into_any())
        }
        AppRoute::EmployeeEdit(id) => in_shell(view! { <EmployeeFormPage id=id /> }.into_any()),

        AppRoute::WorkHours => in_shell(view! { <WorkHourListPage /> }.into_any()),
        AppRoute::WorkHourNew => in_shell(view! { <WorkHourFormPage /> }.into_any()),
        AppRoute::WorkHourEdit(id) => in_shell(view! { <WorkHourFormPage id=id /> }.into_any()),
        AppRoute::QuickHours => in_shell(view! { <QuickHoursPage /> }.into_any()),

        AppRoute::Schedules => in_shell(view! { <ScheduleListPage /> }.into_any()),
        AppRoute::ScheduleNew => in_shell(view! { <ScheduleFormPage /> }.into_any()),
        AppRoute::ScheduleEdit(id) => in_shell(view! { <ScheduleFormPage id=id /> }.into_any()),

        AppRoute::PayrollReports => in_shell(view! { <PayrollReportListPage /> }.into_any()),
        AppRoute::PayrollReportUpload => {
            in_shell(view! { <PayrollReportUploadPage /> }.into_any())
        }
        AppRoute::PayrollReportProcess(id) => {
            in_shell(view! { <PayrollReportProcessPage id=id /> }.into_any())
        }

        AppRoute::Payrolls => in_shell(view! { <PayrollsPage /> }.into_any()),
        AppRoute::PayrollNew => in_shell(view! { <PayrollFormPage /> }.into_any()),
        AppRoute::PayrollEdit(id) => in_shell(view! { <PayrollFormPage id=id /> }.into_any()),
        AppRoute::PayStubs => in_shell(view! { <PayStubsPage /> }.into_any()),

        AppRoute::Providers => in_shell(view! { <ProviderListPage /> }.into_any()),
        AppRoute::ProviderNew => in_shell(view! { <ProviderFormPage /> }.into_any()),
        AppRoute::ProviderEdit(id) => in_shell(view! { <ProviderFormPage id=id /> }.into_any()),
        AppRoute::ProviderBills => in_shell(view! { <ProviderBillListPage /> }.into_any()),
        AppRoute::ProviderBillNew => in_shell(view! { <ProviderBillFormPage /> }.into_any()),
        AppRoute::ProviderBillDetail(id) => {
            in_shell(view! { <ProviderBillDetailPage id=id /> }.into_any())
        }
        AppRoute::ProviderBillEdit(id) => {
            in_shell(view! { <ProviderBillFormPage id=id /> }.into_any())
        }

        AppRoute::Owners => in_shell(view! { <OwnerListPage /> }.into_any()),
        AppRoute::OwnerNew => in_shell(view! { <OwnerFormPage /> }.into_any()),
        AppRoute::OwnerEdit(id) => in_shell(view! { <OwnerFormPage id=id /> }.into_any()),
        AppRoute::OwnerEquity => in_shell(view! { <OwnerEquityListPage /> }.into_any()),
        AppRoute::OwnerEquityNew => in_shell(view! { <OwnerEquityFormPage /> }.into_any()),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建会话上下文
    let session_ctx = SessionContext::new();
    provide_context(session_ctx);

    // 2. 会话回放：持久化 token -> 恰好一次 profile 请求
    init_session(&session_ctx);

    // 3. 会话快照信号注入路由服务（解耦）
    let session_signal = session_ctx.snapshot_signal();

    // 启动回放在途且无缓存用户时显示全局加载屏
    let is_replaying = move || session_ctx.state.get().is_loading;

    view! {
        <Router session=session_signal>
            <Show
                when=move || !is_replaying()
                fallback=|| view! {
                    <div class="flex items-center justify-center min-h-screen bg-base-200">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
            >
                <RouterOutlet matcher=route_matcher />
            </Show>
        </Router>
    }
}
