//! 薪资报告处理页（批量子表单）
//!
//! 每条解析出的员工记录对应一个独立可编辑、独立可删的子表单；
//! 批次至少保留一条（最后一条不可删）。提交前逐条校验
//! `employee_id` 与 `pay_date`，任何一条不合格都不发网络请求；
//! 合格后一次请求整批落库，成败整体呈现。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::payperiod::format_pay_period;
use stationops_shared::{
    PayrollFigures, PayrollInput, PayrollReport, ProcessReportRequest,
};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, LoadingPanel, NotFoundPanel};
use crate::components::forms::{FieldErrors, parse_numeric, use_employee_options};
use crate::components::icons::Trash2;
use crate::components::payrolls::{FIGURE_FIELDS, figure_get, figure_set};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

// =========================================================
// 批次校验（纯逻辑） (Batch Validation)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct SectionDraft {
    employee_id: String,
    pay_date: String,
    figures: Vec<(&'static str, String)>,
}

impl SectionDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.employee_id.is_empty() {
            errors.set("employee_id", "Select the matching employee.");
        }
        if self.pay_date.trim().is_empty() {
            errors.set("pay_date", "The pay date is required.");
        }
        for (key, raw) in &self.figures {
            if parse_numeric(raw).is_none() {
                errors.set(key, "Enter a valid number.");
            }
        }
        errors
    }
}

/// 批次下限：最后一条不可删
fn can_remove_section(batch_len: usize) -> bool {
    batch_len > 1
}

// =========================================================
// 子表单状态 (Section State)
// =========================================================

#[derive(Clone, PartialEq)]
struct SectionForm {
    /// 批内稳定键（删除后其余条目不换位重建）
    key: usize,
    source_name: String,
    employee_id: RwSignal<String>,
    pay_date: RwSignal<String>,
    figures: Vec<(&'static str, &'static str, RwSignal<String>)>,
    base: PayrollFigures,
    errors: RwSignal<FieldErrors>,
}

impl SectionForm {
    fn from_parsed(key: usize, parsed: &stationops_shared::ParsedEmployee) -> Self {
        Self {
            key,
            source_name: parsed.name.clone(),
            employee_id: RwSignal::new(
                parsed.employee_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            pay_date: RwSignal::new(String::new()),
            figures: FIGURE_FIELDS
                .iter()
                .map(|(field_key, label)| {
                    let value = figure_get(&parsed.parsed_data, field_key);
                    (
                        *field_key,
                        *label,
                        RwSignal::new(if value == 0.0 { String::new() } else { value.to_string() }),
                    )
                })
                .collect(),
            base: parsed.parsed_data.clone(),
            errors: RwSignal::new(FieldErrors::new()),
        }
    }

    fn snapshot(&self) -> SectionDraft {
        SectionDraft {
            employee_id: self.employee_id.get_untracked(),
            pay_date: self.pay_date.get_untracked(),
            figures: self
                .figures
                .iter()
                .map(|(key, _, signal)| (*key, signal.get_untracked()))
                .collect(),
        }
    }

    fn to_input(&self, pay_period: &str) -> PayrollInput {
        let draft = self.snapshot();
        let mut figures = self.base.clone();
        for (key, raw) in &draft.figures {
            figure_set(&mut figures, key, parse_numeric(raw).unwrap_or(0.0));
        }
        PayrollInput {
            employee_id: draft.employee_id.parse().ok(),
            pay_date: draft.pay_date,
            pay_period: pay_period.to_string(),
            figures,
        }
    }
}

// =========================================================
// 页面 (Page)
// =========================================================

#[component]
pub fn PayrollReportProcessPage(id: i64) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let employees = use_employee_options();

    let report = RwSignal::new(Option::<PayrollReport>::None);
    let sections = RwSignal::new(Vec::<SectionForm>::new());
    let loading = RwSignal::new(true);
    let not_found = RwSignal::new(false);
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);

    Effect::new(move |_| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            match api
                .fetch_one::<PayrollReport>(resources::PAYROLL_REPORTS, id)
                .await
            {
                Ok(fetched) => {
                    if let Some(parsed) = &fetched.parsed_data {
                        sections.try_set(
                            parsed
                                .employees
                                .iter()
                                .enumerate()
                                .map(|(index, parsed)| SectionForm::from_parsed(index, parsed))
                                .collect(),
                        );
                    }
                    report.try_set(Some(fetched));
                }
                Err(ApiError::NotFound) => {
                    not_found.try_set(true);
                }
                Err(e) => {
                    banner.try_set(Some(e.to_string()));
                }
            }
            loading.try_set(false);
        });
    });

    let remove_section = move |key: usize| {
        sections.update(|batch| {
            // 下限：最后一条不可删
            if can_remove_section(batch.len()) {
                batch.retain(|section| section.key != key);
            }
        });
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        // 逐条本地校验；任何一条失败都不发请求
        let batch = sections.get_untracked();
        let mut all_valid = true;
        for section in &batch {
            let validation = section.snapshot().validate();
            if !validation.is_empty() {
                all_valid = false;
            }
            section.errors.set(validation);
        }
        if !all_valid {
            banner.set(Some("Fix the highlighted sections before processing.".to_string()));
            return;
        }

        let pay_period = report
            .get_untracked()
            .map(|r| r.pay_period)
            .unwrap_or_default();
        let request = ProcessReportRequest {
            records: batch.iter().map(|s| s.to_input(&pay_period)).collect(),
        };

        submitting.set(true);
        banner.set(None);
        let api = session.state.get_untracked().api();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api.process_payroll_report(id, &request).await {
                Ok(_) => navigate(AppRoute::Payrolls),
                Err(e) => {
                    banner.try_set(Some(e.to_string()));
                    submitting.try_set(false);
                }
            }
        });
    };

    let heading = move || {
        report
            .get()
            .map(|r| format!("Process {} — {}", r.file_name, format_pay_period(&r.pay_period)))
            .unwrap_or_else(|| "Process Payroll Report".to_string())
    };

    view! {
        <div class="max-w-4xl mx-auto space-y-4">
            <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                {
                let on_submit = on_submit.clone();
                view! {
                <Show
                    when=move || !not_found.get()
                    fallback=|| view! { <NotFoundPanel what="payroll report" /> }
                >
                    <h2 class="text-xl font-bold">{heading}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />

                    <form on:submit=on_submit.clone() class="space-y-4">
                        <For
                            each=move || sections.get()
                            key=|section| section.key
                            children=move |section: SectionForm| {
                                let key = section.key;
                                let errors = section.errors;
                                let employee_value = section.employee_id;
                                let pay_date_value = section.pay_date;
                                let removable = move || can_remove_section(sections.with(|b| b.len()));
                                let employee_error = Memo::new(move |_| errors.with(|e| e.get("employee_id")));
                                let pay_date_error = Memo::new(move |_| errors.with(|e| e.get("pay_date")));
                                let figure_inputs = section
                                    .figures
                                    .iter()
                                    .map(|(field_key, label, signal)| {
                                        let field_key = *field_key;
                                        let signal = *signal;
                                        let error = Memo::new(move |_| errors.with(|e| e.get(field_key)));
                                        view! {
                                            <div class="form-control">
                                                <label class="label py-1">
                                                    <span class="label-text text-xs">{*label}</span>
                                                </label>
                                                <input
                                                    type="number"
                                                    step="0.01"
                                                    class=move || {
                                                        if error.get().is_some() {
                                                            "input input-bordered input-error input-sm w-full"
                                                        } else {
                                                            "input input-bordered input-sm w-full"
                                                        }
                                                    }
                                                    prop:value=signal
                                                    on:input=move |ev| {
                                                        signal.set(event_target_value(&ev));
                                                        errors.update(|e| e.clear(field_key));
                                                    }
                                                />
                                                <Show when=move || error.get().is_some()>
                                                    <span class="text-error text-xs">{move || error.get().unwrap_or_default()}</span>
                                                </Show>
                                            </div>
                                        }
                                    })
                                    .collect_view();

                                view! {
                                    <div class="card bg-base-100 shadow-xl">
                                        <div class="card-body">
                                            <div class="flex items-center justify-between">
                                                <h3 class="card-title text-base">
                                                    {format!("Extracted: {}", section.source_name)}
                                                </h3>
                                                <button
                                                    type="button"
                                                    class="btn btn-ghost btn-sm btn-square text-error"
                                                    title="Remove from batch"
                                                    disabled=move || !removable()
                                                    on:click=move |_| remove_section(key)
                                                >
                                                    <Trash2 attr:class="h-4 w-4" />
                                                </button>
                                            </div>

                                            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                                                <div class="form-control">
                                                    <label class="label py-1">
                                                        <span class="label-text">"Employee" <span class="text-error">" *"</span></span>
                                                    </label>
                                                    <select
                                                        class=move || {
                                                            if employee_error.get().is_some() {
                                                                "select select-bordered select-error select-sm w-full"
                                                            } else {
                                                                "select select-bordered select-sm w-full"
                                                            }
                                                        }
                                                        on:change=move |ev| {
                                                            employee_value.set(event_target_value(&ev));
                                                            errors.update(|e| e.clear("employee_id"));
                                                        }
                                                    >
                                                        <option value="" selected=move || employee_value.get().is_empty()>
                                                            "Select the matching employee"
                                                        </option>
                                                        {move || {
                                                            employees
                                                                .get()
                                                                .into_iter()
                                                                .map(|(value, label)| {
                                                                    let this_value = value.clone();
                                                                    view! {
                                                                        <option
                                                                            value=value
                                                                            selected=move || employee_value.get() == this_value
                                                                        >
                                                                            {label}
                                                                        </option>
                                                                    }
                                                                })
                                                                .collect_view()
                                                        }}
                                                    </select>
                                                    <Show when=move || employee_error.get().is_some()>
                                                        <span class="text-error text-xs">{move || employee_error.get().unwrap_or_default()}</span>
                                                    </Show>
                                                </div>
                                                <div class="form-control">
                                                    <label class="label py-1">
                                                        <span class="label-text">"Pay Date" <span class="text-error">" *"</span></span>
                                                    </label>
                                                    <input
                                                        type="date"
                                                        class=move || {
                                                            if pay_date_error.get().is_some() {
                                                                "input input-bordered input-error input-sm w-full"
                                                            } else {
                                                                "input input-bordered input-sm w-full"
                                                            }
                                                        }
                                                        prop:value=pay_date_value
                                                        on:input=move |ev| {
                                                            pay_date_value.set(event_target_value(&ev));
                                                            errors.update(|e| e.clear("pay_date"));
                                                        }
                                                    />
                                                    <Show when=move || pay_date_error.get().is_some()>
                                                        <span class="text-error text-xs">{move || pay_date_error.get().unwrap_or_default()}</span>
                                                    </Show>
                                                </div>
                                            </div>

                                            <div class="grid grid-cols-2 md:grid-cols-4 gap-x-3">
                                                {figure_inputs}
                                            </div>
                                        </div>
                                    </div>
                                }
                            }
                        />

                        <div class="flex justify-end gap-2">
                            <button
                                type="submit"
                                class="btn btn-primary"
                                disabled=move || submitting.get() || sections.with(|b| b.is_empty())
                            >
                                {move || if submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Processing..." }.into_any()
                                } else {
                                    "Process Batch".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </Show>
                }
                }
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(employee_id: &str, pay_date: &str) -> SectionDraft {
        SectionDraft {
            employee_id: employee_id.into(),
            pay_date: pay_date.into(),
            figures: vec![("regular_hours", "80".into())],
        }
    }

    #[test]
    fn missing_employee_or_pay_date_blocks_before_any_network_call() {
        assert!(section("", "2025-11-06").validate().get("employee_id").is_some());
        assert!(section("4", "").validate().get("pay_date").is_some());
        assert!(section("4", "2025-11-06").validate().is_empty());
    }

    #[test]
    fn last_remaining_section_cannot_be_removed() {
        assert!(can_remove_section(3));
        assert!(can_remove_section(2));
        // 批次下限为一
        assert!(!can_remove_section(1));
        assert!(!can_remove_section(0));
    }

    #[test]
    fn figure_text_must_be_numeric() {
        let mut draft = section("4", "2025-11-06");
        draft.figures[0].1 = "eighty".into();
        assert!(draft.validate().get("regular_hours").is_some());
    }
}
