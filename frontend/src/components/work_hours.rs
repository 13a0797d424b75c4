//! 结构化工时页面
//!
//! 与快捷录入页共用同一份小时数计算，但策略相反：这里结束时间不晚于
//! 开始时间是**字段级校验错误**，直接拦下提交；快捷录入页则把差值
//! 钳制为 0 照常提交。两种行为分别属于各自页面，不能混用。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::{format_long_date, truncate_date, truncate_hm};
use stationops_shared::hours::{calculate_total_hours, end_after_start};
use stationops_shared::{WorkHour, WorkHourInput};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, LoadingPanel};
use crate::components::forms::{
    FieldErrors, SelectField, SubmitRow, TextAreaField, TextField, today, use_employee_options,
};
use crate::components::listing::{Cell, Column, ListEntity, ListPage};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

// =========================================================
// 列表 (List)
// =========================================================

const COLUMNS: &[Column] = &[
    Column { key: "date", label: "Date", sortable: true },
    Column { key: "employee", label: "Employee", sortable: false },
    Column { key: "start_time", label: "Start", sortable: false },
    Column { key: "end_time", label: "End", sortable: false },
    Column { key: "project", label: "Project", sortable: false },
    Column { key: "total_hours", label: "Hours", sortable: true },
];

impl ListEntity for WorkHour {
    const RESOURCE: &'static str = resources::WORK_HOURS;
    const TITLE: &'static str = "Work Hours";

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "date" => Cell::Text(format_long_date(&self.date)),
            "employee" => Cell::Text(
                self.employee_name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", self.employee_id)),
            ),
            "start_time" => Cell::Text(truncate_hm(&self.start_time)),
            "end_time" => Cell::Text(truncate_hm(&self.end_time)),
            "project" => Cell::Text(self.project.clone().unwrap_or_default()),
            _ => Cell::Text(format!("{:.2}", self.total_hours)),
        }
    }

    fn row_label(&self) -> String {
        format!(
            "{} on {}",
            self.employee_name.clone().unwrap_or_else(|| "entry".to_string()),
            truncate_date(&self.date)
        )
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::WorkHourNew)
    }

    fn edit_route(&self) -> Option<AppRoute> {
        Some(AppRoute::WorkHourEdit(self.id))
    }
}

#[component]
pub fn WorkHourListPage() -> impl IntoView {
    view! { <ListPage<WorkHour> /> }
}

// =========================================================
// 表单 (Form)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct WorkHourDraft {
    employee_id: String,
    date: String,
    start_time: String,
    end_time: String,
    project: String,
    description: String,
}

impl WorkHourDraft {
    /// 结束时间必须严格晚于开始时间（与快捷录入页的钳制策略相对）
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
        } else if !self.start_time.is_empty() && !end_after_start(&self.start_time, &self.end_time)
        {
            errors.set("end_time", "The end time must be after the start time.");
        }
        errors
    }

    fn to_input(&self) -> WorkHourInput {
        let project = self.project.trim();
        let description = self.description.trim();
        WorkHourInput {
            employee_id: self.employee_id.parse().unwrap_or(0),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            project: (!project.is_empty()).then(|| project.to_string()),
            description: (!description.is_empty()).then(|| description.to_string()),
            total_hours: calculate_total_hours(&self.start_time, &self.end_time),
        }
    }
}

#[derive(Clone, Copy)]
struct WorkHourFormState {
    employee_id: RwSignal<String>,
    date: RwSignal<String>,
    start_time: RwSignal<String>,
    end_time: RwSignal<String>,
    project: RwSignal<String>,
    description: RwSignal<String>,
}

impl WorkHourFormState {
    fn new() -> Self {
        Self {
            employee_id: RwSignal::new(String::new()),
            date: RwSignal::new(today()),
            start_time: RwSignal::new(String::new()),
            end_time: RwSignal::new(String::new()),
            project: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
        }
    }

    fn populate(&self, entry: &WorkHour) {
        self.employee_id.set(entry.employee_id.to_string());
        self.date.set(truncate_date(&entry.date));
        self.start_time.set(truncate_hm(&entry.start_time));
        self.end_time.set(truncate_hm(&entry.end_time));
        self.project.set(entry.project.clone().unwrap_or_default());
        self.description
            .set(entry.description.clone().unwrap_or_default());
    }

    fn snapshot(&self) -> WorkHourDraft {
        WorkHourDraft {
            employee_id: self.employee_id.get_untracked(),
            date: self.date.get_untracked(),
            start_time: self.start_time.get_untracked(),
            end_time: self.end_time.get_untracked(),
            project: self.project.get_untracked(),
            description: self.description.get_untracked(),
        }
    }
}

#[component]
pub fn WorkHourFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let employees = use_employee_options();

    let form = WorkHourFormState::new();
    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            spawn_local(async move {
                match api.fetch_one::<WorkHour>(resources::WORK_HOURS, id).await {
                    Ok(entry) => form.populate(&entry),
                    Err(e) => {
                        banner.try_set(Some(e.to_string()));
                    }
                }
                loading.try_set(false);
            });
        });
    }

    // 提交前的本地预览，与服务端回读值无关
    let preview_hours = move || {
        format!(
            "{:.2} h",
            calculate_total_hours(&form.start_time.get(), &form.end_time.get())
        )
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = form.snapshot();
        let validation = draft.validate();
        if !validation.is_empty() {
            errors.set(validation);
            return;
        }

        submitting.set(true);
        banner.set(None);
        let input = draft.to_input();
        let api = session.state.get_untracked().api();
        let navigate = navigate.clone();
        spawn_local(async move {
            let result: Result<WorkHour, ApiError> = match id {
                Some(id) => api.update(resources::WORK_HOURS, id, &input).await,
                None => api.create(resources::WORK_HOURS, &input).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::WorkHours),
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

    let title = if id.is_some() { "Edit Work Hours" } else { "Log Work Hours" };

    view! {
        <div class="max-w-2xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <SelectField
                                label="Employee"
                                name="employee_id"
                                value=form.employee_id
                                errors=errors
                                options=employees
                                prompt="Select an employee"
                                required=true
                            />
                            <TextField label="Date" name="date" value=form.date errors=errors input_type="date" required=true />
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Start Time" name="start_time" value=form.start_time errors=errors input_type="time" required=true />
                                <TextField label="End Time" name="end_time" value=form.end_time errors=errors input_type="time" required=true />
                            </div>
                            <div class="text-sm text-base-content/60">
                                "Total: " <span class="font-mono">{preview_hours}</span>
                            </div>
                            <TextField label="Project" name="project" value=form.project errors=errors placeholder="Optional" />
                            <TextAreaField label="Description" name="description" value=form.description errors=errors placeholder="Optional" />
                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::WorkHours
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

    fn draft() -> WorkHourDraft {
        WorkHourDraft {
            employee_id: "4".into(),
            date: "2025-03-01".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            project: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn valid_entry_computes_total_hours() {
        let d = draft();
        assert!(d.validate().is_empty());
        assert_eq!(d.to_input().total_hours, 8.00);
    }

    #[test]
    fn end_before_start_is_a_field_error_here() {
        // 与快捷录入的钳制策略相对：此页面拦下提交
        let mut d = draft();
        d.start_time = "17:00".into();
        d.end_time = "09:00".into();
        let errors = d.validate();
        assert!(errors.get("end_time").is_some());
    }

    #[test]
    fn equal_times_are_rejected() {
        let mut d = draft();
        d.end_time = "09:00".into();
        assert!(d.validate().get("end_time").is_some());
    }

    #[test]
    fn missing_fields_are_keyed_individually() {
        let d = WorkHourDraft {
            employee_id: String::new(),
            date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            project: String::new(),
            description: String::new(),
        };
        let errors = d.validate();
        assert!(errors.get("employee_id").is_some());
        assert!(errors.get("date").is_some());
        assert!(errors.get("start_time").is_some());
        assert!(errors.get("end_time").is_some());
    }

    #[test]
    fn server_precision_round_trips_through_the_form() {
        // 服务端返回带秒/完整时间戳，装入表单后原样提交应得到等价值
        let entry_date = truncate_date("2025-03-01T00:00:00Z");
        let start = truncate_hm("09:00:00");
        let end = truncate_hm("17:00:00");
        let d = WorkHourDraft {
            employee_id: "4".into(),
            date: entry_date,
            start_time: start,
            end_time: end,
            project: String::new(),
            description: String::new(),
        };
        assert!(d.validate().is_empty());
        let input = d.to_input();
        assert_eq!(input.date, "2025-03-01");
        assert_eq!(input.start_time, "09:00");
        assert_eq!(input.end_time, "17:00");
        assert_eq!(input.total_hours, 8.00);
    }
}
