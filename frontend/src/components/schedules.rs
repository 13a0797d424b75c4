//! 周排班页面
//!
//! 一周一个容器，至多 7 个日条目；聚合小时数与工作日数在客户端
//! 逐日求和展示。日条目的时间可留空（如“到岗即排”）。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::{format_long_date, truncate_date, truncate_hm};
use stationops_shared::hours::{calculate_total_hours, end_after_start};
use stationops_shared::{WorkSchedule, WorkScheduleDay, WorkScheduleInput};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, LoadingPanel};
use crate::components::forms::{
    FieldErrors, SelectField, SubmitRow, TextField, use_employee_options,
};
use crate::components::listing::{Cell, Column, ListEntity, ListPage};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// =========================================================
// 列表 (List)
// =========================================================

const COLUMNS: &[Column] = &[
    Column { key: "week_start", label: "Week of", sortable: true },
    Column { key: "employee", label: "Employee", sortable: false },
    Column { key: "working_days", label: "Working Days", sortable: false },
    Column { key: "total_hours", label: "Hours", sortable: false },
];

impl ListEntity for WorkSchedule {
    const RESOURCE: &'static str = resources::WORK_SCHEDULES;
    const TITLE: &'static str = "Work Schedules";

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "week_start" => Cell::Text(format_long_date(&self.week_start)),
            "employee" => Cell::Text(
                self.employee_name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", self.employee_id)),
            ),
            "working_days" => Cell::Text(self.working_day_count().to_string()),
            _ => Cell::Text(format!("{:.2}", self.total_hours())),
        }
    }

    fn row_label(&self) -> String {
        format!(
            "schedule for {} (week of {})",
            self.employee_name.clone().unwrap_or_else(|| format!("#{}", self.employee_id)),
            truncate_date(&self.week_start)
        )
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::ScheduleNew)
    }

    fn edit_route(&self) -> Option<AppRoute> {
        Some(AppRoute::ScheduleEdit(self.id))
    }
}

#[component]
pub fn ScheduleListPage() -> impl IntoView {
    view! { <ListPage<WorkSchedule> /> }
}

// =========================================================
// 表单 (Form)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct ScheduleDraft {
    employee_id: String,
    week_start: String,
    /// (工作日, 开始, 结束) × 7
    days: Vec<(bool, String, String)>,
}

impl ScheduleDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.employee_id.is_empty() {
            errors.set("employee_id", "Select an employee.");
        }
        if self.week_start.trim().is_empty() {
            errors.set("week_start", "The week start date is required.");
        }
        for (index, (working, start, end)) in self.days.iter().enumerate() {
            // 两端都填了才校验先后；单端留空按开放时段对待
            if *working
                && !start.is_empty()
                && !end.is_empty()
                && !end_after_start(start, end)
            {
                errors.set(
                    &format!("day_{index}"),
                    "The end time must be after the start time.",
                );
            }
        }
        errors
    }

    fn to_input(&self) -> WorkScheduleInput {
        WorkScheduleInput {
            employee_id: self.employee_id.parse().unwrap_or(0),
            week_start: self.week_start.clone(),
            days: self
                .days
                .iter()
                .enumerate()
                .map(|(index, (working, start, end))| WorkScheduleDay {
                    weekday: index as u8,
                    is_working_day: *working,
                    start_time: (*working && !start.is_empty()).then(|| start.clone()),
                    end_time: (*working && !end.is_empty()).then(|| end.clone()),
                })
                .collect(),
        }
    }

    fn total_hours(&self) -> f64 {
        let sum: f64 = self
            .days
            .iter()
            .filter(|(working, _, _)| *working)
            .map(|(_, start, end)| calculate_total_hours(start, end))
            .sum();
        (sum * 100.0).round() / 100.0
    }

    fn working_day_count(&self) -> usize {
        self.days.iter().filter(|(working, _, _)| *working).count()
    }
}

#[derive(Clone, Copy)]
struct DayRow {
    working: RwSignal<bool>,
    start: RwSignal<String>,
    end: RwSignal<String>,
}

impl DayRow {
    fn new() -> Self {
        Self {
            working: RwSignal::new(false),
            start: RwSignal::new(String::new()),
            end: RwSignal::new(String::new()),
        }
    }
}

#[component]
pub fn ScheduleFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let employees = use_employee_options();

    let employee_id = RwSignal::new(String::new());
    let week_start = RwSignal::new(String::new());
    let days: [DayRow; 7] = std::array::from_fn(|_| DayRow::new());

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            spawn_local(async move {
                match api
                    .fetch_one::<WorkSchedule>(resources::WORK_SCHEDULES, id)
                    .await
                {
                    Ok(schedule) => {
                        employee_id.try_set(schedule.employee_id.to_string());
                        week_start.try_set(truncate_date(&schedule.week_start));
                        for day in &schedule.days {
                            let Some(row) = days.get(day.weekday as usize) else {
                                continue;
                            };
                            row.working.try_set(day.is_working_day);
                            row.start
                                .try_set(day.start_time.as_deref().map(truncate_hm).unwrap_or_default());
                            row.end
                                .try_set(day.end_time.as_deref().map(truncate_hm).unwrap_or_default());
                        }
                    }
                    Err(e) => {
                        banner.try_set(Some(e.to_string()));
                    }
                }
                loading.try_set(false);
            });
        });
    }

    let snapshot = move || ScheduleDraft {
        employee_id: employee_id.get_untracked(),
        week_start: week_start.get_untracked(),
        days: days
            .iter()
            .map(|row| {
                (
                    row.working.get_untracked(),
                    row.start.get_untracked(),
                    row.end.get_untracked(),
                )
            })
            .collect(),
    };

    // 聚合预览跟随输入实时更新
    let aggregate = move || {
        let draft = ScheduleDraft {
            employee_id: String::new(),
            week_start: String::new(),
            days: days
                .iter()
                .map(|row| (row.working.get(), row.start.get(), row.end.get()))
                .collect(),
        };
        format!(
            "{} working day(s), {:.2} h",
            draft.working_day_count(),
            draft.total_hours()
        )
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
        let input = draft.to_input();
        let api = session.state.get_untracked().api();
        let navigate = navigate.clone();
        spawn_local(async move {
            let result: Result<WorkSchedule, ApiError> = match id {
                Some(id) => api.update(resources::WORK_SCHEDULES, id, &input).await,
                None => api.create(resources::WORK_SCHEDULES, &input).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::Schedules),
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

    let title = if id.is_some() { "Edit Schedule" } else { "New Schedule" };

    view! {
        <div class="max-w-3xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <div class="grid grid-cols-2 gap-4">
                                <SelectField
                                    label="Employee"
                                    name="employee_id"
                                    value=employee_id
                                    errors=errors
                                    options=employees
                                    prompt="Select an employee"
                                    required=true
                                />
                                <TextField label="Week Start (Monday)" name="week_start" value=week_start errors=errors input_type="date" required=true />
                            </div>

                            <div class="overflow-x-auto">
                                <table class="table table-sm">
                                    <thead>
                                        <tr>
                                            <th>"Day"</th>
                                            <th>"Working"</th>
                                            <th>"Start"</th>
                                            <th>"End"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {WEEKDAYS
                                            .iter()
                                            .enumerate()
                                            .map(|(index, weekday)| {
                                                let row = days[index];
                                                let day_error = Memo::new(move |_| {
                                                    errors.with(|e| e.get(&format!("day_{index}")))
                                                });
                                                view! {
                                                    <tr>
                                                        <td class="font-medium">{*weekday}</td>
                                                        <td>
                                                            <input
                                                                type="checkbox"
                                                                class="toggle toggle-primary toggle-sm"
                                                                prop:checked=row.working
                                                                on:change=move |ev| {
                                                                    row.working.set(event_target_checked(&ev));
                                                                    errors.update(|e| e.clear(&format!("day_{index}")));
                                                                }
                                                            />
                                                        </td>
                                                        <td>
                                                            <input
                                                                type="time"
                                                                class="input input-bordered input-sm"
                                                                prop:value=row.start
                                                                disabled=move || !row.working.get()
                                                                on:input=move |ev| {
                                                                    row.start.set(event_target_value(&ev));
                                                                    errors.update(|e| e.clear(&format!("day_{index}")));
                                                                }
                                                            />
                                                        </td>
                                                        <td>
                                                            <input
                                                                type="time"
                                                                class="input input-bordered input-sm"
                                                                prop:value=row.end
                                                                disabled=move || !row.working.get()
                                                                on:input=move |ev| {
                                                                    row.end.set(event_target_value(&ev));
                                                                    errors.update(|e| e.clear(&format!("day_{index}")));
                                                                }
                                                            />
                                                            <Show when=move || day_error.get().is_some()>
                                                                <div class="text-error text-xs mt-1">
                                                                    {move || day_error.get().unwrap_or_default()}
                                                                </div>
                                                            </Show>
                                                        </td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()}
                                    </tbody>
                                </table>
                            </div>

                            <div class="text-sm text-base-content/60">{aggregate}</div>

                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::Schedules
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

    fn working_week() -> ScheduleDraft {
        let mut days = vec![(false, String::new(), String::new()); 7];
        days[0] = (true, "09:00".into(), "17:00".into());
        days[1] = (true, "09:00".into(), "13:30".into());
        ScheduleDraft {
            employee_id: "3".into(),
            week_start: "2025-06-02".into(),
            days,
        }
    }

    #[test]
    fn aggregates_sum_only_working_days() {
        let draft = working_week();
        assert_eq!(draft.working_day_count(), 2);
        assert_eq!(draft.total_hours(), 12.5);
    }

    #[test]
    fn open_ended_working_day_counts_zero_hours() {
        let mut draft = working_week();
        draft.days[2] = (true, String::new(), String::new());
        assert!(draft.validate().is_empty());
        assert_eq!(draft.working_day_count(), 3);
        assert_eq!(draft.total_hours(), 12.5);
    }

    #[test]
    fn reversed_day_times_error_on_that_day_only() {
        let mut draft = working_week();
        draft.days[1] = (true, "17:00".into(), "09:00".into());
        let errors = draft.validate();
        assert!(errors.get("day_1").is_some());
        assert!(errors.get("day_0").is_none());
    }

    #[test]
    fn input_days_are_indexed_by_weekday() {
        let input = working_week().to_input();
        assert_eq!(input.days.len(), 7);
        assert_eq!(input.days[0].weekday, 0);
        assert!(input.days[0].is_working_day);
        assert_eq!(input.days[0].start_time.as_deref(), Some("09:00"));
        // 非工作日不携带时间
        assert!(!input.days[6].is_working_day);
        assert_eq!(input.days[6].start_time, None);
    }
}
