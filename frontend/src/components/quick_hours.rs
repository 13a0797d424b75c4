//! 快捷工时录入
//!
//! 面向柜台的最小录入面：员工、日期、起止时间，小时数实时预览。
//! 结束不晚于开始时按 0.00 提交——这是本页面的有意策略，不是校验
//! 错误；需要严格校验的录入走结构化工时表单。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::hours::calculate_total_hours;
use stationops_shared::{WorkHour, WorkHourInput};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::feedback::Toast;
use crate::components::forms::{
    FieldErrors, SelectField, SubmitRow, TextField, today, use_employee_options,
};

#[derive(Clone, Debug, PartialEq)]
struct QuickDraft {
    employee_id: String,
    date: String,
    start_time: String,
    end_time: String,
}

impl QuickDraft {
    /// 只校验必填；时间先后不设限（差值钳制为 0）
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.employee_id.is_empty() {
            errors.set("employee_id", "Select an employee.");
        }
        if self.date.trim().is_empty() {
            errors.set("date", "The date is required.");
        }
        if self.start_time.is_empty() {
            errors.set("start_time", "The start time is required.");
        }
        if self.end_time.is_empty() {
            errors.set("end_time", "The end time is required.");
        }
        errors
    }

    fn to_input(&self) -> WorkHourInput {
        WorkHourInput {
            employee_id: self.employee_id.parse().unwrap_or(0),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            project: None,
            description: None,
            // 钳制值照常提交
            total_hours: calculate_total_hours(&self.start_time, &self.end_time),
        }
    }
}

#[component]
pub fn QuickHoursPage() -> impl IntoView {
    let session = use_session();
    let employees = use_employee_options();

    let employee_id = RwSignal::new(String::new());
    let date = RwSignal::new(today());
    let start_time = RwSignal::new(String::new());
    let end_time = RwSignal::new(String::new());

    let errors = RwSignal::new(FieldErrors::new());
    let submitting = RwSignal::new(false);
    let notification = RwSignal::new(Option::<(String, bool)>::None);

    let preview = move || {
        format!(
            "{:.2}",
            calculate_total_hours(&start_time.get(), &end_time.get())
        )
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = QuickDraft {
            employee_id: employee_id.get_untracked(),
            date: date.get_untracked(),
            start_time: start_time.get_untracked(),
            end_time: end_time.get_untracked(),
        };
        let validation = draft.validate();
        if !validation.is_empty() {
            errors.set(validation);
            return;
        }

        submitting.set(true);
        let input = draft.to_input();
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            let result: Result<WorkHour, ApiError> =
                api.create(resources::WORK_HOURS, &input).await;
            match result {
                Ok(_) => {
                    notification.try_set(Some(("Hours recorded.".to_string(), false)));
                    // 连续录入：清时间，保留员工与日期
                    start_time.try_set(String::new());
                    end_time.try_set(String::new());
                }
                Err(e) => match e.field_errors() {
                    Some(fields) => {
                        errors.try_update(|er| er.merge_server(fields));
                    }
                    None => {
                        notification.try_set(Some((e.to_string(), true)));
                    }
                },
            }
            submitting.try_set(false);
        });
    };

    view! {
        <div class="max-w-xl mx-auto">
            <Toast notification=notification />
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">"Quick Hours Entry"</h2>
                    <p class="text-sm text-base-content/60">
                        "Fast shift logging. Reversed times record as 0.00 hours."
                    </p>
                    <form on:submit=on_submit class="space-y-2">
                        <SelectField
                            label="Employee"
                            name="employee_id"
                            value=employee_id
                            errors=errors
                            options=employees
                            prompt="Select an employee"
                            required=true
                        />
                        <TextField label="Date" name="date" value=date errors=errors input_type="date" required=true />
                        <div class="grid grid-cols-2 gap-4">
                            <TextField label="Start" name="start_time" value=start_time errors=errors input_type="time" required=true />
                            <TextField label="End" name="end_time" value=end_time errors=errors input_type="time" required=true />
                        </div>
                        <div class="stat px-0">
                            <div class="stat-title">"Hours"</div>
                            <div class="stat-value text-primary">{preview}</div>
                        </div>
                        <SubmitRow submitting=Signal::derive(move || submitting.get()) label="Record" />
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_times_submit_clamped_zero_not_an_error() {
        let draft = QuickDraft {
            employee_id: "2".into(),
            date: "2025-03-01".into(),
            start_time: "17:00".into(),
            end_time: "09:00".into(),
        };
        // 与结构化表单相对：这里不是校验错误
        assert!(draft.validate().is_empty());
        assert_eq!(draft.to_input().total_hours, 0.00);
    }

    #[test]
    fn normal_shift_computes_hours() {
        let draft = QuickDraft {
            employee_id: "2".into(),
            date: "2025-03-01".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
        };
        assert_eq!(draft.to_input().total_hours, 8.00);
    }

    #[test]
    fn required_fields_still_apply() {
        let draft = QuickDraft {
            employee_id: String::new(),
            date: "2025-03-01".into(),
            start_time: String::new(),
            end_time: "17:00".into(),
        };
        let errors = draft.validate();
        assert!(errors.get("employee_id").is_some());
        assert!(errors.get("start_time").is_some());
        assert!(errors.get("date").is_none());
    }
}
