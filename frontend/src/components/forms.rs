//! 表单基础设施
//!
//! 字段键控的错误状态 + 带错误呈现的输入控件 + 单飞提交按钮。
//! 控件在用户修改时只清除自己字段的错误，其余字段的错误保持原样；
//! 服务端 422 的键控错误由页面合并进同一个 [`FieldErrors`]。

use std::collections::HashMap;

use leptos::prelude::*;

use stationops_shared::date::business_date_from_millis;

use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 今天（业务时区）的 `YYYY-MM-DD`，表单日期默认值统一从这里取
pub fn today() -> String {
    business_date_from_millis(js_sys::Date::now() as i64)
        .format("%Y-%m-%d")
        .to_string()
}

/// 数字输入框的显示值：`8.0` -> `"8"`，`12.5` -> `"12.5"`
pub fn format_numeric(value: f64) -> String {
    if value == value.trunc() {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// 解析数字字段；空串视为 0，非法输入返回 `None`
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok()
}

/// 员工下拉的选项（在职员工，id -> 显示名）。
/// 多个表单共用：工时、快捷录入、排班、薪资、工资单。
pub fn use_employee_options() -> Signal<Vec<(String, String)>> {
    use leptos::task::spawn_local;
    use stationops_shared::{Employee, ListQuery};

    use crate::api::resources;
    use crate::auth::use_session;

    let session = use_session();
    let options = RwSignal::new(Vec::<(String, String)>::new());

    Effect::new(move |_| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            let query = ListQuery {
                per_page: 200,
                sort_by: Some("name".to_string()),
                filters: vec![("status".to_string(), "active".to_string())],
                ..ListQuery::default()
            };
            if let Ok(page) = api.list::<Employee>(resources::EMPLOYEES, &query).await {
                options.try_set(
                    page.data
                        .into_iter()
                        .map(|e| (e.id.to_string(), e.display_name().to_string()))
                        .collect(),
                );
            }
        });
    });

    options.into()
}

// =========================================================
// 字段错误 (Field Errors)
// =========================================================

/// 字段名 -> 单条错误信息。本地校验与服务端 422 共用。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    /// 用户修改某字段时单独清除该字段的错误
    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<String> {
        self.0.get(field).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 合并服务端键控错误（每个字段取第一条）
    pub fn merge_server(&mut self, errors: &HashMap<String, Vec<String>>) {
        for (field, messages) in errors {
            if let Some(first) = messages.first() {
                self.0.insert(field.clone(), first.clone());
            }
        }
    }
}

// =========================================================
// 输入控件 (Field Widgets)
// =========================================================

#[component]
pub fn TextField(
    #[prop(into)] label: String,
    /// 字段名：既是 input id 也是错误映射的键
    name: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<FieldErrors>,
    #[prop(default = "text")] input_type: &'static str,
    #[prop(into, optional)] placeholder: Option<String>,
    #[prop(optional)] required: bool,
    /// number 输入的步长（如 "0.01"）
    #[prop(optional)]
    step: Option<&'static str>,
) -> impl IntoView {
    let error = Memo::new(move |_| errors.with(|e| e.get(name)));

    view! {
        <div class="form-control">
            <label class="label" for=name>
                <span class="label-text">
                    {label}
                    {required.then(|| view! { <span class="text-error">" *"</span> })}
                </span>
            </label>
            <input
                id=name
                type=input_type
                placeholder=placeholder.unwrap_or_default()
                step=step
                class=move || {
                    if error.get().is_some() {
                        "input input-bordered input-error w-full"
                    } else {
                        "input input-bordered w-full"
                    }
                }
                prop:value=value
                on:input=move |ev| {
                    value.set(event_target_value(&ev));
                    errors.update(|e| e.clear(name));
                }
            />
            <Show when=move || error.get().is_some()>
                <label class="label py-0" for=name>
                    <span class="label-text-alt text-error">{move || error.get().unwrap_or_default()}</span>
                </label>
            </Show>
        </div>
    }
}

#[component]
pub fn SelectField(
    #[prop(into)] label: String,
    name: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<FieldErrors>,
    /// (值, 显示文本) 选项；员工下拉等动态来源传 Signal
    #[prop(into)]
    options: Signal<Vec<(String, String)>>,
    /// 首行空值提示（如 "Select an employee"）
    #[prop(into, optional)]
    prompt: Option<String>,
    #[prop(optional)] required: bool,
) -> impl IntoView {
    let error = Memo::new(move |_| errors.with(|e| e.get(name)));

    view! {
        <div class="form-control">
            <label class="label" for=name>
                <span class="label-text">
                    {label}
                    {required.then(|| view! { <span class="text-error">" *"</span> })}
                </span>
            </label>
            <select
                id=name
                class=move || {
                    if error.get().is_some() {
                        "select select-bordered select-error w-full"
                    } else {
                        "select select-bordered w-full"
                    }
                }
                on:change=move |ev| {
                    value.set(event_target_value(&ev));
                    errors.update(|e| e.clear(name));
                }
            >
                {prompt.map(|p| view! {
                    <option value="" selected=move || value.get().is_empty()>{p}</option>
                })}
                {move || {
                    options
                        .get()
                        .into_iter()
                        .map(|(option_value, option_label)| {
                            let this_value = option_value.clone();
                            view! {
                                <option
                                    value=option_value
                                    selected=move || value.get() == this_value
                                >
                                    {option_label}
                                </option>
                            }
                        })
                        .collect_view()
                }}
            </select>
            <Show when=move || error.get().is_some()>
                <label class="label py-0" for=name>
                    <span class="label-text-alt text-error">{move || error.get().unwrap_or_default()}</span>
                </label>
            </Show>
        </div>
    }
}

#[component]
pub fn TextAreaField(
    #[prop(into)] label: String,
    name: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<FieldErrors>,
    #[prop(into, optional)] placeholder: Option<String>,
) -> impl IntoView {
    let error = Memo::new(move |_| errors.with(|e| e.get(name)));

    view! {
        <div class="form-control">
            <label class="label" for=name>
                <span class="label-text">{label}</span>
            </label>
            <textarea
                id=name
                placeholder=placeholder.unwrap_or_default()
                class="textarea textarea-bordered w-full"
                prop:value=value
                on:input=move |ev| {
                    value.set(event_target_value(&ev));
                    errors.update(|e| e.clear(name));
                }
            ></textarea>
            <Show when=move || error.get().is_some()>
                <label class="label py-0" for=name>
                    <span class="label-text-alt text-error">{move || error.get().unwrap_or_default()}</span>
                </label>
            </Show>
        </div>
    }
}

/// 开关（排班的工作日标记等）
#[component]
pub fn ToggleField(#[prop(into)] label: String, value: RwSignal<bool>) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label cursor-pointer justify-start gap-3">
                <input
                    type="checkbox"
                    class="toggle toggle-primary"
                    prop:checked=value
                    on:change=move |ev| value.set(event_target_checked(&ev))
                />
                <span class="label-text">{label}</span>
            </label>
        </div>
    }
}

/// 提交行：在途期间禁用提交按钮（单飞），可选返回链接
#[component]
pub fn SubmitRow(
    #[prop(into)] submitting: Signal<bool>,
    #[prop(into)] label: String,
    #[prop(optional)] cancel_to: Option<AppRoute>,
) -> impl IntoView {
    let busy_label = label.clone();

    view! {
        <div class="flex justify-end gap-2 mt-6">
            {cancel_to.map(|to| view! {
                <Link to=to class="btn btn-ghost">"Cancel"</Link>
            })}
            <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                {move || {
                    if submitting.get() {
                        view! {
                            <span class="loading loading-spinner"></span>
                            {format!("{busy_label}...")}
                        }
                        .into_any()
                    } else {
                        label.clone().into_any()
                    }
                }}
            </button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_clear_per_field_not_globally() {
        let mut errors = FieldErrors::new();
        errors.set("start_time", "Required.");
        errors.set("end_time", "Must be after the start time.");

        errors.clear("start_time");

        // 只清除被修改的字段
        assert!(errors.get("start_time").is_none());
        assert_eq!(
            errors.get("end_time").as_deref(),
            Some("Must be after the start time.")
        );
        assert!(!errors.is_empty());
    }

    #[test]
    fn server_errors_merge_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.set("date", "client message");

        let mut server = HashMap::new();
        server.insert(
            "date".to_string(),
            vec!["The date is required.".to_string(), "second".to_string()],
        );
        server.insert("amount".to_string(), vec!["Must be a number.".to_string()]);
        errors.merge_server(&server);

        assert_eq!(errors.get("date").as_deref(), Some("The date is required."));
        assert_eq!(errors.get("amount").as_deref(), Some("Must be a number."));
    }
}
