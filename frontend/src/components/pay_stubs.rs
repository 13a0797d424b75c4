//! 工资单页面
//!
//! 选员工 + 发薪日，展示后端预计算的收入行，生成的工资单是服务端
//! 渲染的 HTML，在新标签页打开。弹窗被浏览器拦截时给出放行指引，
//! 不作为请求失败处理。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::format_long_date;
use stationops_shared::money::format_cad;
use stationops_shared::payperiod::format_pay_period;
use stationops_shared::{EarningsRow, PayDay, PayStubRequest};

use crate::api::FetchGuard;
use crate::auth::use_session;
use crate::components::feedback::ErrorAlert;
use crate::components::forms::use_employee_options;
use crate::components::icons::Printer;
use crate::web::download::open_html_document;

#[component]
pub fn PayStubsPage() -> impl IntoView {
    let session = use_session();
    let employees = use_employee_options();

    let employee_id = RwSignal::new(String::new());
    let pay_date = RwSignal::new(String::new());
    let pay_days = RwSignal::new(Vec::<PayDay>::new());
    let earnings = RwSignal::new(Vec::<EarningsRow>::new());
    let earnings_loading = RwSignal::new(false);
    let error = RwSignal::new(Option::<String>::None);
    let popup_notice = RwSignal::new(false);
    let generating = RwSignal::new(false);

    // 发薪日列表一次拉取
    Effect::new(move |_| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            match api.pay_days().await {
                Ok(days) => {
                    pay_days.try_set(days);
                }
                Err(e) => {
                    error.try_set(Some(e.to_string()));
                }
            }
        });
    });

    // 两个下拉都选定后抓取收入行；选择连续变化时旧响应按代际戳丢弃
    let guard = FetchGuard::new();
    Effect::new({
        let guard = guard.clone();
        move |_| {
            let employee = employee_id.get();
            let date = pay_date.get();
            let stamp = guard.begin();
            if employee.is_empty() || date.is_empty() {
                earnings.set(Vec::new());
                return;
            }
            let Ok(employee) = employee.parse::<i64>() else {
                return;
            };
            let api = session.state.get_untracked().api();
            earnings_loading.set(true);

            let guard = guard.clone();
            spawn_local(async move {
                let result = api.earnings(employee, &date).await;
                if !guard.is_current(stamp) {
                    return;
                }
                match result {
                    Ok(rows) => {
                        earnings.try_set(rows);
                        error.try_set(None);
                    }
                    Err(e) => {
                        error.try_set(Some(e.to_string()));
                    }
                }
                earnings_loading.try_set(false);
            });
        }
    });

    let generate = move |_| {
        if generating.get_untracked() {
            return;
        }
        let Ok(employee) = employee_id.get_untracked().parse::<i64>() else {
            error.set(Some("Select an employee and a pay day first.".to_string()));
            return;
        };
        let date = pay_date.get_untracked();
        if date.is_empty() {
            error.set(Some("Select an employee and a pay day first.".to_string()));
            return;
        }

        generating.set(true);
        popup_notice.set(false);
        error.set(None);
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            match api
                .render_pay_stub(&PayStubRequest {
                    employee_id: employee,
                    pay_date: date,
                })
                .await
            {
                Ok(html) => {
                    // 弹窗被拦截不是请求失败
                    if open_html_document(&html).is_err() {
                        popup_notice.try_set(true);
                    }
                }
                Err(e) => {
                    error.try_set(Some(e.to_string()));
                }
            }
            generating.try_set(false);
        });
    };

    let pay_day_options = move || {
        pay_days
            .get()
            .into_iter()
            .map(|day| {
                let value = day.pay_date.clone();
                let selected_value = value.clone();
                let label = format!(
                    "{} ({})",
                    format_long_date(&day.pay_date),
                    format_pay_period(&day.pay_period)
                );
                view! {
                    <option value=value selected=move || pay_date.get() == selected_value>
                        {label}
                    </option>
                }
            })
            .collect_view()
    };

    view! {
        <div class="max-w-3xl mx-auto space-y-4">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">"Pay Stubs"</h2>
                    <ErrorAlert message=Signal::derive(move || error.get()) />
                    <Show when=move || popup_notice.get()>
                        <div role="alert" class="alert alert-info text-sm py-2">
                            <span>
                                "The pay stub window was blocked. Allow pop-ups for this site and generate again."
                            </span>
                        </div>
                    </Show>

                    <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                        <div class="form-control">
                            <label class="label" for="employee">
                                <span class="label-text">"Employee"</span>
                            </label>
                            <select
                                id="employee"
                                class="select select-bordered w-full"
                                on:change=move |ev| employee_id.set(event_target_value(&ev))
                            >
                                <option value="" selected=move || employee_id.get().is_empty()>
                                    "Select an employee"
                                </option>
                                {move || {
                                    employees
                                        .get()
                                        .into_iter()
                                        .map(|(value, label)| {
                                            let this_value = value.clone();
                                            view! {
                                                <option value=value selected=move || employee_id.get() == this_value>
                                                    {label}
                                                </option>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </select>
                        </div>
                        <div class="form-control">
                            <label class="label" for="pay_day">
                                <span class="label-text">"Pay Day"</span>
                            </label>
                            <select
                                id="pay_day"
                                class="select select-bordered w-full"
                                on:change=move |ev| pay_date.set(event_target_value(&ev))
                            >
                                <option value="" selected=move || pay_date.get().is_empty()>
                                    "Select a pay day"
                                </option>
                                {pay_day_options}
                            </select>
                        </div>
                    </div>

                    <div class="flex justify-end mt-2">
                        <button
                            class="btn btn-primary gap-2"
                            disabled=move || generating.get()
                            on:click=generate
                        >
                            <Printer attr:class="h-4 w-4" />
                            {move || if generating.get() { "Generating..." } else { "Generate Pay Stub" }}
                        </button>
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <h3 class="card-title p-6 pb-2 text-base">"Earnings"</h3>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Employee"</th>
                                    <th>"Period"</th>
                                    <th class="text-right">"Hours"</th>
                                    <th class="text-right">"Gross"</th>
                                    <th class="text-right">"Net"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || earnings.with(|e| e.is_empty()) && !earnings_loading.get()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            "Pick an employee and a pay day to see earnings."
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || earnings_loading.get()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            <span class="loading loading-spinner loading-md"></span>
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || earnings.get()
                                    key=|row| (row.employee_id, row.pay_period.clone())
                                    children=move |row: EarningsRow| {
                                        view! {
                                            <tr>
                                                <td>{row.employee_name}</td>
                                                <td>{format_pay_period(&row.pay_period)}</td>
                                                <td class="text-right font-mono">{format!("{:.2}", row.total_hours)}</td>
                                                <td class="text-right font-mono">{format_cad(row.gross_pay)}</td>
                                                <td class="text-right font-mono">{format_cad(row.net_pay)}</td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>
    }
}
