//! 员工页面：列表 / 详情 / 表单
//!
//! 表单是全站唯一的 multipart 提交：文本字段与入职文档一次发出。
//! 文件在本地暂存（每个字段一份），整单提交前不产生任何上传；
//! 新建时证件文档必填，缺失直接拦下提交。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::money::format_cad;
use stationops_shared::{Employee, EmployeeStatus};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::detail::{DetailPage, DetailRow};
use crate::components::feedback::{ErrorAlert, LoadingPanel};
use crate::components::forms::{
    FieldErrors, SelectField, SubmitRow, TextField, format_numeric, parse_numeric,
};
use crate::components::listing::{Cell, Column, FilterSpec, ListEntity, ListPage};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

fn status_badge(status: EmployeeStatus) -> (&'static str, &'static str) {
    match status {
        EmployeeStatus::Active => ("Active", "badge-success"),
        EmployeeStatus::Inactive => ("Inactive", "badge-ghost"),
    }
}

// =========================================================
// 列表 (List)
// =========================================================

const COLUMNS: &[Column] = &[
    Column { key: "name", label: "Name", sortable: true },
    Column { key: "position", label: "Position", sortable: true },
    Column { key: "department", label: "Department", sortable: false },
    Column { key: "hourly_rate", label: "Rate", sortable: true },
    Column { key: "status", label: "Status", sortable: false },
];

const STATUS_FILTER: FilterSpec = FilterSpec {
    key: "status",
    prompt: "All statuses",
    options: &[("active", "Active"), ("inactive", "Inactive")],
};

impl ListEntity for Employee {
    const RESOURCE: &'static str = resources::EMPLOYEES;
    const TITLE: &'static str = "Employees";

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "name" => Cell::Text(self.display_name().to_string()),
            "position" => Cell::Text(self.position.clone()),
            "department" => Cell::Text(self.department.clone().unwrap_or_default()),
            "hourly_rate" => Cell::Text(format!("{}/h", format_cad(self.hourly_rate))),
            _ => {
                let (label, class) = status_badge(self.status);
                Cell::Badge(label.to_string(), class)
            }
        }
    }

    fn row_label(&self) -> String {
        self.name.clone()
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::EmployeeNew)
    }

    fn detail_route(&self) -> Option<AppRoute> {
        Some(AppRoute::EmployeeDetail(self.id))
    }

    fn edit_route(&self) -> Option<AppRoute> {
        Some(AppRoute::EmployeeEdit(self.id))
    }
}

#[component]
pub fn EmployeeListPage() -> impl IntoView {
    view! { <ListPage<Employee> filter=STATUS_FILTER /> }
}

// =========================================================
// 详情 (Detail)
// =========================================================

fn render_employee(employee: &Employee) -> AnyView {
    let (status_label, status_class) = status_badge(employee.status);
    let documents = employee.documents.clone();

    view! {
        <div class="grid grid-cols-1 lg:grid-cols-2 gap-4">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h3 class="card-title">{employee.name.clone()}</h3>
                        <span class=format!("badge {status_class}")>{status_label}</span>
                    </div>
                    <DetailRow label="Preferred name" value=employee.preferred_name.clone().unwrap_or_else(|| "—".into()) />
                    <DetailRow label="Position" value=employee.position.clone() />
                    <DetailRow label="Department" value=employee.department.clone().unwrap_or_else(|| "—".into()) />
                    <DetailRow label="Hourly rate" value=format!("{}/h", format_cad(employee.hourly_rate)) />
                </div>
            </div>
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title text-base">"Onboarding Documents"</h3>
                    {if documents.is_empty() {
                        view! { <p class="text-base-content/50 text-sm">"No documents on file."</p> }.into_any()
                    } else {
                        view! {
                            <ul class="menu menu-sm px-0">
                                {documents
                                    .into_iter()
                                    .map(|doc| view! {
                                        <li class="flex-row justify-between py-1">
                                            <span>{doc.name}</span>
                                            <span class="text-base-content/50 font-mono text-xs">{doc.file_name}</span>
                                        </li>
                                    })
                                    .collect_view()}
                            </ul>
                        }
                        .into_any()
                    }}
                </div>
            </div>
        </div>
    }
    .into_any()
}

#[component]
pub fn EmployeeDetailPage(id: i64) -> impl IntoView {
    view! {
        <DetailPage<Employee>
            id=id
            resource=resources::EMPLOYEES
            title="Employee"
            entity_name="employee"
            back_to=AppRoute::Employees
            render=render_employee
        />
    }
}

// =========================================================
// 表单 (Form)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct EmployeeDraft {
    name: String,
    preferred_name: String,
    position: String,
    department: String,
    hourly_rate: String,
    status: String,
    /// 新建模式下证件文档必填
    is_create: bool,
    has_id_document: bool,
}

impl EmployeeDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.set("name", "The name is required.");
        }
        if self.position.trim().is_empty() {
            errors.set("position", "The position is required.");
        }
        match parse_numeric(&self.hourly_rate) {
            Some(rate) if rate > 0.0 => {}
            _ => errors.set("hourly_rate", "Enter an hourly rate above zero."),
        }
        if self.is_create && !self.has_id_document {
            errors.set("id_document", "A government ID document is required.");
        }
        errors
    }

    /// 文本字段写入 multipart 表单；文件由提交处理器追加
    fn apply_to(&self, form_data: &web_sys::FormData) {
        let _ = form_data.append_with_str("name", self.name.trim());
        let _ = form_data.append_with_str("preferred_name", self.preferred_name.trim());
        let _ = form_data.append_with_str("position", self.position.trim());
        let _ = form_data.append_with_str("department", self.department.trim());
        let _ = form_data.append_with_str(
            "hourly_rate",
            &parse_numeric(&self.hourly_rate).unwrap_or(0.0).to_string(),
        );
        let _ = form_data.append_with_str("status", &self.status);
    }
}

#[component]
pub fn EmployeeFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let name = RwSignal::new(String::new());
    let preferred_name = RwSignal::new(String::new());
    let position = RwSignal::new(String::new());
    let department = RwSignal::new(String::new());
    let hourly_rate = RwSignal::new(String::new());
    let status = RwSignal::new("active".to_string());

    // 暂存的文件不跨线程，用 local 信号持有
    let id_document = RwSignal::new_local(Option::<web_sys::File>::None);
    let work_permit = RwSignal::new_local(Option::<web_sys::File>::None);
    let id_document_name = RwSignal::new(Option::<String>::None);
    let work_permit_name = RwSignal::new(Option::<String>::None);

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            spawn_local(async move {
                match api.fetch_one::<Employee>(resources::EMPLOYEES, id).await {
                    Ok(employee) => {
                        name.try_set(employee.name);
                        preferred_name.try_set(employee.preferred_name.unwrap_or_default());
                        position.try_set(employee.position);
                        department.try_set(employee.department.unwrap_or_default());
                        hourly_rate.try_set(format_numeric(employee.hourly_rate));
                        status.try_set(match employee.status {
                            EmployeeStatus::Active => "active".to_string(),
                            EmployeeStatus::Inactive => "inactive".to_string(),
                        });
                    }
                    Err(e) => {
                        banner.try_set(Some(e.to_string()));
                    }
                }
                loading.try_set(false);
            });
        });
    }

    let pick_id_document = move |ev: leptos::web_sys::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let file = input.files().and_then(|list| list.item(0));
        id_document_name.set(file.as_ref().map(|f| f.name()));
        id_document.set(file);
        errors.update(|e| e.clear("id_document"));
    };
    let pick_work_permit = move |ev: leptos::web_sys::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let file = input.files().and_then(|list| list.item(0));
        work_permit_name.set(file.as_ref().map(|f| f.name()));
        work_permit.set(file);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = EmployeeDraft {
            name: name.get_untracked(),
            preferred_name: preferred_name.get_untracked(),
            position: position.get_untracked(),
            department: department.get_untracked(),
            hourly_rate: hourly_rate.get_untracked(),
            status: status.get_untracked(),
            is_create: id.is_none(),
            has_id_document: id_document.with_untracked(|f| f.is_some()),
        };
        let validation = draft.validate();
        if !validation.is_empty() {
            errors.set(validation);
            return;
        }

        let Ok(form_data) = web_sys::FormData::new() else {
            banner.set(Some("Could not build the upload form.".to_string()));
            return;
        };
        draft.apply_to(&form_data);
        if let Some(file) = id_document.get_untracked() {
            let _ = form_data.append_with_blob("id_document", &file);
        }
        if let Some(file) = work_permit.get_untracked() {
            let _ = form_data.append_with_blob("work_permit", &file);
        }

        submitting.set(true);
        banner.set(None);
        let api = session.state.get_untracked().api();
        let navigate = navigate.clone();
        spawn_local(async move {
            let result: Result<Employee, ApiError> = match id {
                Some(id) => api.update_employee(id, form_data).await,
                None => api.create_employee(form_data).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::Employees),
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

    let title = if id.is_some() { "Edit Employee" } else { "New Employee" };
    let id_document_error = Memo::new(move |_| errors.with(|e| e.get("id_document")));

    view! {
        <div class="max-w-2xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Full Name" name="name" value=name errors=errors required=true />
                                <TextField label="Preferred Name" name="preferred_name" value=preferred_name errors=errors placeholder="Optional" />
                            </div>
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Position" name="position" value=position errors=errors required=true />
                                <TextField label="Department" name="department" value=department errors=errors placeholder="Optional" />
                            </div>
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Hourly Rate ($)" name="hourly_rate" value=hourly_rate errors=errors input_type="number" step="0.01" required=true />
                                <SelectField
                                    label="Status"
                                    name="status"
                                    value=status
                                    errors=errors
                                    options=vec![
                                        ("active".to_string(), "Active".to_string()),
                                        ("inactive".to_string(), "Inactive".to_string()),
                                    ]
                                />
                            </div>

                            <div class="divider text-sm text-base-content/50">"Onboarding Documents"</div>
                            <div class="form-control">
                                <label class="label" for="id_document">
                                    <span class="label-text">
                                        "Government ID"
                                        {id.is_none().then(|| view! { <span class="text-error">" *"</span> })}
                                    </span>
                                </label>
                                <input
                                    id="id_document"
                                    type="file"
                                    accept=".pdf,.png,.jpg,.jpeg"
                                    class="file-input file-input-bordered w-full"
                                    on:change=pick_id_document
                                />
                                <Show when=move || id_document_name.get().is_some()>
                                    <label class="label py-0">
                                        <span class="label-text-alt">{move || id_document_name.get().unwrap_or_default()}</span>
                                    </label>
                                </Show>
                                <Show when=move || id_document_error.get().is_some()>
                                    <label class="label py-0">
                                        <span class="label-text-alt text-error">{move || id_document_error.get().unwrap_or_default()}</span>
                                    </label>
                                </Show>
                            </div>
                            <div class="form-control">
                                <label class="label" for="work_permit">
                                    <span class="label-text">"Work Permit"</span>
                                </label>
                                <input
                                    id="work_permit"
                                    type="file"
                                    accept=".pdf,.png,.jpg,.jpeg"
                                    class="file-input file-input-bordered w-full"
                                    on:change=pick_work_permit
                                />
                                <Show when=move || work_permit_name.get().is_some()>
                                    <label class="label py-0">
                                        <span class="label-text-alt">{move || work_permit_name.get().unwrap_or_default()}</span>
                                    </label>
                                </Show>
                            </div>

                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::Employees
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

    fn draft() -> EmployeeDraft {
        EmployeeDraft {
            name: "Jordan Reyes".into(),
            preferred_name: String::new(),
            position: "Cashier".into(),
            department: "Store".into(),
            hourly_rate: "17.50".into(),
            status: "active".into(),
            is_create: true,
            has_id_document: true,
        }
    }

    #[test]
    fn create_requires_the_id_document() {
        let mut d = draft();
        d.has_id_document = false;
        let errors = d.validate();
        // 未选文件时整单被拦下
        assert!(errors.get("id_document").is_some());
    }

    #[test]
    fn edit_does_not_require_a_new_document() {
        let mut d = draft();
        d.is_create = false;
        d.has_id_document = false;
        assert!(d.validate().is_empty());
    }

    #[test]
    fn rate_must_be_positive() {
        let mut d = draft();
        d.hourly_rate = "0".into();
        assert!(d.validate().get("hourly_rate").is_some());
        d.hourly_rate = "abc".into();
        assert!(d.validate().get("hourly_rate").is_some());
    }
}
