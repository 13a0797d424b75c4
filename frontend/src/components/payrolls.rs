//! 薪资记录页面
//!
//! 列表按薪资期间分组：期末日最近的三个期间各自成表，更早的记录
//! 并入一张“历史”表并逐行标注期间。分组与排序逻辑在共享层
//! （`stationops_shared::payperiod`），这里只负责渲染。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::{format_long_date, truncate_date};
use stationops_shared::money::format_cad;
use stationops_shared::payperiod::{GroupedPayrolls, format_pay_period, group_by_period};
use stationops_shared::{ListQuery, Payroll, PayrollFigures, PayrollInput, SortDirection};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, LoadingPanel};
use crate::components::forms::{
    FieldErrors, SelectField, SubmitRow, TextField, format_numeric, parse_numeric,
    use_employee_options,
};
use crate::components::icons::{Pencil, Plus};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_navigate};

// =========================================================
// 数字字段描述符 (Figure Descriptors)
// =========================================================

/// 薪资表单与报告处理页共用的可编辑数字字段 (键, 标签)
pub(crate) const FIGURE_FIELDS: &[(&str, &str)] = &[
    ("regular_hours", "Regular Hours"),
    ("regular_rate", "Regular Rate"),
    ("stat_hours", "Stat Hours"),
    ("stat_rate", "Stat Rate"),
    ("overtime_hours", "OT Hours"),
    ("overtime_rate", "OT Rate"),
    ("cpp_current", "CPP"),
    ("ei_current", "EI"),
    ("federal_tax_current", "Federal Tax"),
    ("vacation_earned", "Vacation Earned"),
    ("vacation_paid", "Vacation Paid"),
    ("gross_pay", "Gross Pay"),
    ("net_pay", "Net Pay"),
];

pub(crate) fn figure_get(figures: &PayrollFigures, key: &str) -> f64 {
    match key {
        "regular_hours" => figures.regular_hours,
        "regular_rate" => figures.regular_rate,
        "stat_hours" => figures.stat_hours,
        "stat_rate" => figures.stat_rate,
        "overtime_hours" => figures.overtime_hours,
        "overtime_rate" => figures.overtime_rate,
        "cpp_current" => figures.cpp_current,
        "ei_current" => figures.ei_current,
        "federal_tax_current" => figures.federal_tax_current,
        "vacation_earned" => figures.vacation_earned,
        "vacation_paid" => figures.vacation_paid,
        "gross_pay" => figures.gross_pay,
        "net_pay" => figures.net_pay,
        _ => 0.0,
    }
}

pub(crate) fn figure_set(figures: &mut PayrollFigures, key: &str, value: f64) {
    match key {
        "regular_hours" => figures.regular_hours = value,
        "regular_rate" => figures.regular_rate = value,
        "stat_hours" => figures.stat_hours = value,
        "stat_rate" => figures.stat_rate = value,
        "overtime_hours" => figures.overtime_hours = value,
        "overtime_rate" => figures.overtime_rate = value,
        "cpp_current" => figures.cpp_current = value,
        "ei_current" => figures.ei_current = value,
        "federal_tax_current" => figures.federal_tax_current = value,
        "vacation_earned" => figures.vacation_earned = value,
        "vacation_paid" => figures.vacation_paid = value,
        "gross_pay" => figures.gross_pay = value,
        "net_pay" => figures.net_pay = value,
        _ => {}
    }
}

// =========================================================
// 分组列表 (Grouped List)
// =========================================================

fn payroll_rows(entries: &[Payroll], period_column: bool) -> AnyView {
    entries
        .iter()
        .map(|entry| {
            let edit_to = AppRoute::PayrollEdit(entry.id);
            let employee = entry
                .employee_name
                .clone()
                .unwrap_or_else(|| format!("#{}", entry.employee_id));
            view! {
                <tr>
                    {period_column.then(|| view! {
                        <td class="text-sm">{format_pay_period(&entry.pay_period)}</td>
                    })}
                    <td>{employee}</td>
                    <td>{format_long_date(&entry.pay_date)}</td>
                    <td class="text-right font-mono">
                        {format!("{:.2}", entry.figures.regular_hours + entry.figures.overtime_hours)}
                    </td>
                    <td class="text-right font-mono">{format_cad(entry.figures.gross_pay)}</td>
                    <td class="text-right font-mono">{format_cad(entry.figures.net_pay)}</td>
                    <td class="text-right">
                        <Link to=edit_to class="btn btn-ghost btn-xs btn-square" attr:title="Edit">
                            <Pencil attr:class="h-4 w-4" />
                        </Link>
                    </td>
                </tr>
            }
        })
        .collect_view()
        .into_any()
}

fn payroll_table(heading: String, entries: &[Payroll], period_column: bool) -> AnyView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <h3 class="card-title p-6 pb-2 text-base">{heading}</h3>
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                {period_column.then(|| view! { <th>"Period"</th> })}
                                <th>"Employee"</th>
                                <th>"Pay Date"</th>
                                <th class="text-right">"Hours"</th>
                                <th class="text-right">"Gross"</th>
                                <th class="text-right">"Net"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>{payroll_rows(entries, period_column)}</tbody>
                    </table>
                </div>
            </div>
        </div>
    }
    .into_any()
}

#[component]
pub fn PayrollsPage() -> impl IntoView {
    let session = use_session();

    let grouped = RwSignal::new(GroupedPayrolls::default());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(Option::<String>::None);

    Effect::new(move |_| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            let query = ListQuery {
                per_page: 500,
                sort_by: Some("pay_date".to_string()),
                sort_direction: SortDirection::Desc,
                ..ListQuery::default()
            };
            match api.list::<Payroll>(resources::PAYROLLS, &query).await {
                Ok(page) => {
                    grouped.try_set(group_by_period(page.data));
                    error.try_set(None);
                }
                Err(e) => {
                    error.try_set(Some(e.to_string()));
                }
            }
            loading.try_set(false);
        });
    });

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between">
                <h2 class="text-xl font-bold">"Payrolls by Period"</h2>
                <Link to=AppRoute::PayrollNew class="btn btn-primary btn-sm gap-1">
                    <Plus attr:class="h-4 w-4" />
                    "New Payroll"
                </Link>
            </div>
            <ErrorAlert message=Signal::derive(move || error.get()) />
            <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                {move || {
                    let groups = grouped.get();
                    if groups.recent.is_empty() {
                        return view! {
                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body items-center py-16 text-base-content/50">
                                    "No payroll records yet."
                                </div>
                            </div>
                        }
                        .into_any();
                    }

                    let recent_tables = groups
                        .recent
                        .iter()
                        .map(|group| payroll_table(format_pay_period(&group.period), &group.entries, false))
                        .collect_view();

                    let older_entries: Vec<Payroll> = groups
                        .older_rows()
                        .into_iter()
                        .map(|(_, entry)| entry.clone())
                        .collect();
                    let older_table = (!older_entries.is_empty())
                        .then(|| payroll_table("Older Periods".to_string(), &older_entries, true));

                    view! {
                        <div class="space-y-4">
                            {recent_tables}
                            {older_table}
                        </div>
                    }
                    .into_any()
                }}
            </Show>
        </div>
    }
}

// =========================================================
// 表单 (Form)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct PayrollDraft {
    employee_id: String,
    pay_date: String,
    pay_period: String,
    /// (字段键, 原始文本) × FIGURE_FIELDS
    figures: Vec<(&'static str, String)>,
}

impl PayrollDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.employee_id.is_empty() {
            errors.set("employee_id", "Select an employee.");
        }
        if self.pay_date.trim().is_empty() {
            errors.set("pay_date", "The pay date is required.");
        }
        if self.pay_period.trim().is_empty() {
            errors.set("pay_period", "The pay period is required.");
        }
        for (key, raw) in &self.figures {
            if parse_numeric(raw).is_none() {
                errors.set(key, "Enter a valid number.");
            }
        }
        errors
    }

    fn to_input(&self, base: &PayrollFigures) -> PayrollInput {
        let mut figures = base.clone();
        for (key, raw) in &self.figures {
            figure_set(&mut figures, key, parse_numeric(raw).unwrap_or(0.0));
        }
        PayrollInput {
            employee_id: self.employee_id.parse().ok(),
            pay_date: self.pay_date.clone(),
            pay_period: self.pay_period.trim().to_string(),
            figures,
        }
    }
}

#[component]
pub fn PayrollFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let employees = use_employee_options();

    let employee_id = RwSignal::new(String::new());
    let pay_date = RwSignal::new(String::new());
    let pay_period = RwSignal::new(String::new());
    let figure_signals: Vec<(&'static str, &'static str, RwSignal<String>)> = FIGURE_FIELDS
        .iter()
        .map(|(key, label)| (*key, *label, RwSignal::new(String::new())))
        .collect();
    // 未暴露编辑的字段（YTD 等）原样回传
    let base_figures = RwSignal::new(PayrollFigures::default());

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        let figure_signals = figure_signals.clone();
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            let figure_signals = figure_signals.clone();
            spawn_local(async move {
                match api.fetch_one::<Payroll>(resources::PAYROLLS, id).await {
                    Ok(payroll) => {
                        employee_id.try_set(payroll.employee_id.to_string());
                        pay_date.try_set(truncate_date(&payroll.pay_date));
                        pay_period.try_set(payroll.pay_period.clone());
                        for (key, _, signal) in &figure_signals {
                            signal.try_set(format_numeric(figure_get(&payroll.figures, key)));
                        }
                        base_figures.try_set(payroll.figures);
                    }
                    Err(e) => {
                        banner.try_set(Some(e.to_string()));
                    }
                }
                loading.try_set(false);
            });
        });
    }

    let snapshot = {
        let figure_signals = figure_signals.clone();
        move || PayrollDraft {
            employee_id: employee_id.get_untracked(),
            pay_date: pay_date.get_untracked(),
            pay_period: pay_period.get_untracked(),
            figures: figure_signals
                .iter()
                .map(|(key, _, signal)| (*key, signal.get_untracked()))
                .collect(),
        }
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = snapshot();
        let validation = draft.validate();
        if !validation.is_empty() {
            errors.set(validation);
            return;
        }

        submitting.set(true);
        banner.set(None);
        let input = draft.to_input(&base_figures.get_untracked());
        let api = session.state.get_untracked().api();
        let navigate = navigate.clone();
        spawn_local(async move {
            let result: Result<Payroll, ApiError> = match id {
                Some(id) => api.update(resources::PAYROLLS, id, &input).await,
                None => api.create(resources::PAYROLLS, &input).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::Payrolls),
                Err(e) => {
                    match e.field_errors() {
                        Some(fields) => errors.update(|er| er.merge_server(fields)),
                        None => { banner.try_set(Some(e.to_string())); }
                    }
                    submitting.try_set(false);
                }
            }
        });
    };

    let title = if id.is_some() { "Edit Payroll" } else { "New Payroll" };
    let figure_inputs = {
        let figure_signals = figure_signals.clone();
        move || {
            figure_signals
                .iter()
                .map(|(key, label, signal)| {
                    let key = *key;
                    let signal = *signal;
                    view! {
                        <TextField
                            label=*label
                            name=key
                            value=signal
                            errors=errors
                            input_type="number"
                            step="0.01"
                        />
                    }
                })
                .collect_view()
        }
    };

    view! {
        <div class="max-w-3xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                                <SelectField
                                    label="Employee"
                                    name="employee_id"
                                    value=employee_id
                                    errors=errors
                                    options=employees
                                    prompt="Select an employee"
                                    required=true
                                />
                                <TextField label="Pay Date" name="pay_date" value=pay_date errors=errors input_type="date" required=true />
                                <TextField
                                    label="Pay Period"
                                    name="pay_period"
                                    value=pay_period
                                    errors=errors
                                    placeholder="10/24/2025 - 11/06/2025"
                                    required=true
                                />
                            </div>
                            <div class="divider text-sm text-base-content/50">"Figures"</div>
                            <div class="grid grid-cols-2 md:grid-cols-3 gap-x-4">
                                {figure_inputs()}
                            </div>
                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::Payrolls
                            />
                        </form>
                    </Show>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PayrollDraft {
        PayrollDraft {
            employee_id: "5".into(),
            pay_date: "2025-11-06".into(),
            pay_period: "10/24/2025- 11/06/2025".into(),
            figures: vec![
                ("regular_hours", "80".into()),
                ("regular_rate", "17.5".into()),
                ("net_pay", "1180.44".into()),
            ],
        }
    }

    #[test]
    fn edited_keys_overwrite_base_figures() {
        let base = PayrollFigures {
            regular_ytd: 9000.0,
            regular_hours: 75.0,
            ..PayrollFigures::default()
        };
        let input = draft().to_input(&base);
        assert_eq!(input.figures.regular_hours, 80.0);
        assert_eq!(input.figures.net_pay, 1180.44);
        // 未暴露编辑的字段原样保留
        assert_eq!(input.figures.regular_ytd, 9000.0);
    }

    #[test]
    fn required_fields_are_keyed() {
        let mut d = draft();
        d.employee_id = String::new();
        d.pay_date = String::new();
        let errors = d.validate();
        assert!(errors.get("employee_id").is_some());
        assert!(errors.get("pay_date").is_some());
        assert!(errors.get("pay_period").is_none());
    }

    #[test]
    fn bad_figure_text_is_keyed_to_that_figure() {
        let mut d = draft();
        d.figures[1].1 = "abc".into();
        let errors = d.validate();
        assert!(errors.get("regular_rate").is_some());
        assert!(errors.get("regular_hours").is_none());
    }
}
