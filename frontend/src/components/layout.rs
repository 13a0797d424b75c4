//! 已认证页面的公共外壳
//!
//! 导航栏 + 内容区。导航项经会话权限谓词过滤：无权限的入口整个不渲染，
//! 与行级按钮同一套判定。

use leptos::prelude::*;

use crate::auth::{logout, use_session};
use crate::components::icons::{Fuel, LogOut};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 单个导航项，权限不足时不渲染；当前路由高亮
#[component]
fn NavItem(to: AppRoute, #[prop(into)] label: String) -> impl IntoView {
    let session = use_session();
    let router = use_router();

    let visible = move || session.state.get().allows(to.permission());

    let href = to.to_path();
    let on_click = move |ev: leptos::web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate_to(to);
    };

    view! {
        <Show when=visible>
            <li>
                <a
                    href=href.clone()
                    class=move || if router.current_route().get() == to { "active" } else { "" }
                    on:click=on_click
                >
                    {label.clone()}
                </a>
            </li>
        </Show>
    }
}

/// 导航栏里的分组下拉；组内项目全部被权限滤掉时隐藏整组
#[component]
fn NavGroup(
    #[prop(into)] label: String,
    routes: &'static [(AppRoute, &'static str)],
) -> impl IntoView {
    let session = use_session();

    let any_visible = move || {
        let state = session.state.get();
        routes.iter().any(|(route, _)| state.allows(route.permission()))
    };

    view! {
        <Show when=any_visible>
            <li>
                <details>
                    <summary>{label.clone()}</summary>
                    <ul class="p-2 bg-base-100 rounded-t-none z-[20] min-w-44">
                        {routes
                            .iter()
                            .map(|(route, item_label)| view! {
                                <NavItem to=*route label=*item_label />
                            })
                            .collect_view()}
                    </ul>
                </details>
            </li>
        </Show>
    }
}

const HOURS_MENU: &[(AppRoute, &str)] = &[
    (AppRoute::WorkHours, "Work Hours"),
    (AppRoute::QuickHours, "Quick Entry"),
    (AppRoute::Schedules, "Schedules"),
];

const PAYROLL_MENU: &[(AppRoute, &str)] = &[
    (AppRoute::PayrollReports, "Payroll Reports"),
    (AppRoute::Payrolls, "Payrolls"),
    (AppRoute::PayStubs, "Pay Stubs"),
];

const BILLING_MENU: &[(AppRoute, &str)] = &[
    (AppRoute::Providers, "Providers"),
    (AppRoute::ProviderBills, "Provider Bills"),
    (AppRoute::Owners, "Owners"),
    (AppRoute::OwnerEquity, "Owner Equity"),
];

#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let session = use_session();

    let on_logout = move |_| {
        // 导航由路由服务监听会话变化自动完成
        logout(&session);
    };

    view! {
        <div class="min-h-screen bg-base-200">
            <div class="navbar bg-base-100 shadow-md px-4">
                <div class="flex-1 gap-2">
                    <Fuel attr:class="text-primary h-6 w-6" />
                    <Link to=AppRoute::Dashboard class="btn btn-ghost text-xl px-2">
                        "StationOps"
                    </Link>
                    <ul class="menu menu-horizontal px-1 hidden lg:flex">
                        <NavItem to=AppRoute::Dashboard label="Dashboard" />
                        <NavItem to=AppRoute::Sales label="Sales" />
                        <NavGroup label="Hours" routes=HOURS_MENU />
                        <NavItem to=AppRoute::Employees label="Employees" />
                        <NavGroup label="Payroll" routes=PAYROLL_MENU />
                        <NavGroup label="Billing" routes=BILLING_MENU />
                    </ul>
                </div>
                <div class="flex-none gap-2">
                    <span class="text-sm text-base-content/70 hidden md:inline">
                        {move || session.state.get().user.as_ref().map(|u| u.name.clone()).unwrap_or_default()}
                    </span>
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm gap-2">
                        <LogOut attr:class="h-4 w-4" />
                        "Sign out"
                    </button>
                </div>
            </div>
            <main class="max-w-7xl mx-auto p-4 md:p-8">{children()}</main>
        </div>
    }
}
