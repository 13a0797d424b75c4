use leptos::prelude::*;

use stationops_shared::date::format_long_date;

use crate::auth::use_session;
use crate::components::forms::today;
use crate::components::icons::*;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 快捷入口卡片；目标路由无权限时不渲染
#[component]
fn QuickLink(
    to: AppRoute,
    #[prop(into)] title: String,
    #[prop(into)] subtitle: String,
    children: ChildrenFn,
) -> impl IntoView {
    let session = use_session();
    let visible = move || session.state.get().allows(to.permission());

    view! {
        <Show when=visible>
            {
                let children = children.clone();
                let title = title.clone();
                let subtitle = subtitle.clone();
                view! {
                    <Link to=to class="card bg-base-100 shadow-xl hover:shadow-2xl transition-shadow">
                        <div class="card-body flex-row items-center gap-4">
                            <div class="p-3 bg-primary/10 rounded-xl text-primary">{children()}</div>
                            <div>
                                <h3 class="card-title text-base">{title.clone()}</h3>
                                <p class="text-sm text-base-content/60">{subtitle.clone()}</p>
                            </div>
                        </div>
                    </Link>
                }
            }
        </Show>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();

    let greeting = move || {
        session
            .state
            .get()
            .user
            .as_ref()
            .map(|u| format!("Welcome back, {}", u.name))
            .unwrap_or_default()
    };

    view! {
        <div class="space-y-8">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body flex-row items-center justify-between">
                    <div>
                        <h2 class="card-title text-2xl">{greeting}</h2>
                        <p class="text-base-content/60">{format_long_date(&today())}</p>
                    </div>
                    <Fuel attr:class="h-10 w-10 text-primary hidden md:block" />
                </div>
            </div>

            <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                <QuickLink to=AppRoute::Sales title="Daily Sales" subtitle="Fuel and store sales log">
                    <DollarSign attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::QuickHours title="Quick Hours" subtitle="Fast shift entry">
                    <Clock attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::WorkHours title="Work Hours" subtitle="Structured hours log">
                    <Clock attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::Schedules title="Schedules" subtitle="Weekly staff schedules">
                    <Calendar attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::Employees title="Employees" subtitle="Staff records and documents">
                    <Users attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::PayrollReports title="Payroll Reports" subtitle="Upload and process PDFs">
                    <FileText attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::Payrolls title="Payrolls" subtitle="Pay records by period">
                    <DollarSign attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::PayStubs title="Pay Stubs" subtitle="Generate employee stubs">
                    <Printer attr:class="h-6 w-6" />
                </QuickLink>
                <QuickLink to=AppRoute::ProviderBills title="Provider Bills" subtitle="Recurring service invoices">
                    <FileText attr:class="h-6 w-6" />
                </QuickLink>
            </div>
        </div>
    }
}
