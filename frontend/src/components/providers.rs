//! 服务商与服务商账单页面
//!
//! 主档/流水对的第一组实例：Provider 是主档，ProviderBill 是按期账单。
//! 两者都走通用列表脚手架；账单另有详情页展示派生显示字段。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::{format_long_date, truncate_date};
use stationops_shared::money::format_cad;
use stationops_shared::{
    BillStatus, EmployeeStatus, Provider, ProviderBill, ProviderBillInput, ProviderInput,
};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::detail::{DetailPage, DetailRow};
use crate::components::feedback::{ErrorAlert, LoadingPanel};
use crate::components::forms::{
    FieldErrors, SelectField, SubmitRow, TextAreaField, TextField, format_numeric, parse_numeric,
    today,
};
use crate::components::listing::{Cell, Column, FilterSpec, ListEntity, ListPage};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

fn bill_status_badge(status: BillStatus) -> (&'static str, &'static str) {
    match status {
        BillStatus::Pending => ("Pending", "badge-warning"),
        BillStatus::Paid => ("Paid", "badge-success"),
    }
}

// =========================================================
// 服务商列表 (Provider List)
// =========================================================

const PROVIDER_COLUMNS: &[Column] = &[
    Column { key: "name", label: "Name", sortable: true },
    Column { key: "service", label: "Service", sortable: false },
    Column { key: "payment_method", label: "Payment Method", sortable: false },
    Column { key: "status", label: "Status", sortable: false },
];

impl ListEntity for Provider {
    const RESOURCE: &'static str = resources::PROVIDERS;
    const TITLE: &'static str = "Providers";

    fn columns() -> &'static [Column] {
        PROVIDER_COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "name" => Cell::Text(self.name.clone()),
            "service" => Cell::Text(self.service.clone().unwrap_or_default()),
            "payment_method" => Cell::Text(self.payment_method.clone().unwrap_or_default()),
            _ => match self.status {
                EmployeeStatus::Active => Cell::Badge("Active".to_string(), "badge-success"),
                EmployeeStatus::Inactive => Cell::Badge("Inactive".to_string(), "badge-ghost"),
            },
        }
    }

    fn row_label(&self) -> String {
        self.name.clone()
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::ProviderNew)
    }

    fn edit_route(&self) -> Option<AppRoute> {
        Some(AppRoute::ProviderEdit(self.id))
    }
}

#[component]
pub fn ProviderListPage() -> impl IntoView {
    view! { <ListPage<Provider> /> }
}

// =========================================================
// 服务商表单 (Provider Form)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct ProviderDraft {
    name: String,
    service: String,
    payment_method: String,
    status: String,
}

impl ProviderDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.set("name", "The provider name is required.");
        }
        errors
    }

    fn to_input(&self) -> ProviderInput {
        let service = self.service.trim();
        let payment_method = self.payment_method.trim();
        ProviderInput {
            name: self.name.trim().to_string(),
            service: (!service.is_empty()).then(|| service.to_string()),
            payment_method: (!payment_method.is_empty()).then(|| payment_method.to_string()),
            status: self.status.clone(),
        }
    }
}

#[component]
pub fn ProviderFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let name = RwSignal::new(String::new());
    let service = RwSignal::new(String::new());
    let payment_method = RwSignal::new(String::new());
    let status = RwSignal::new("active".to_string());

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            spawn_local(async move {
                match api.fetch_one::<Provider>(resources::PROVIDERS, id).await {
                    Ok(provider) => {
                        name.try_set(provider.name);
                        service.try_set(provider.service.unwrap_or_default());
                        payment_method.try_set(provider.payment_method.unwrap_or_default());
                        status.try_set(match provider.status {
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

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = ProviderDraft {
            name: name.get_untracked(),
            service: service.get_untracked(),
            payment_method: payment_method.get_untracked(),
            status: status.get_untracked(),
        };
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
            let result: Result<Provider, ApiError> = match id {
                Some(id) => api.update(resources::PROVIDERS, id, &input).await,
                None => api.create(resources::PROVIDERS, &input).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::Providers),
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

    let title = if id.is_some() { "Edit Provider" } else { "New Provider" };

    view! {
        <div class="max-w-xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <TextField label="Name" name="name" value=name errors=errors required=true />
                            <TextField label="Service" name="service" value=service errors=errors placeholder="Fuel delivery, waste pickup, ..." />
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Payment Method" name="payment_method" value=payment_method errors=errors placeholder="Pre-authorized debit" />
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
                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::Providers
                            />
                        </form>
                    </Show>
                </div>
            </div>
        </div>
    }
}

// =========================================================
// 账单列表 (Bill List)
// =========================================================

const BILL_COLUMNS: &[Column] = &[
    Column { key: "bill_date", label: "Date", sortable: true },
    Column { key: "provider", label: "Provider", sortable: false },
    Column { key: "amount", label: "Amount", sortable: true },
    Column { key: "payment_method", label: "Payment Method", sortable: false },
    Column { key: "status", label: "Status", sortable: false },
];

const BILL_STATUS_FILTER: FilterSpec = FilterSpec {
    key: "status",
    prompt: "All statuses",
    options: &[("pending", "Pending"), ("paid", "Paid")],
};

impl ListEntity for ProviderBill {
    const RESOURCE: &'static str = resources::PROVIDER_BILLS;
    const TITLE: &'static str = "Provider Bills";

    fn columns() -> &'static [Column] {
        BILL_COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "bill_date" => Cell::Text(format_long_date(&self.bill_date)),
            "provider" => Cell::Text(
                self.provider_name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", self.provider_id)),
            ),
            "amount" => Cell::Text(format_cad(self.amount)),
            "payment_method" => Cell::Text(self.payment_method.clone().unwrap_or_default()),
            _ => {
                let (label, class) = bill_status_badge(self.status);
                Cell::Badge(label.to_string(), class)
            }
        }
    }

    fn row_label(&self) -> String {
        format!(
            "bill from {} on {}",
            self.provider_name.clone().unwrap_or_else(|| format!("#{}", self.provider_id)),
            truncate_date(&self.bill_date)
        )
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::ProviderBillNew)
    }

    fn detail_route(&self) -> Option<AppRoute> {
        Some(AppRoute::ProviderBillDetail(self.id))
    }

    fn edit_route(&self) -> Option<AppRoute> {
        Some(AppRoute::ProviderBillEdit(self.id))
    }
}

#[component]
pub fn ProviderBillListPage() -> impl IntoView {
    view! { <ListPage<ProviderBill> filter=BILL_STATUS_FILTER /> }
}

// =========================================================
// 账单详情 (Bill Detail)
// =========================================================

fn render_bill(bill: &ProviderBill) -> AnyView {
    let (status_label, status_class) = bill_status_badge(bill.status);

    view! {
        <div class="card bg-base-100 shadow-xl max-w-xl">
            <div class="card-body">
                <div class="flex items-center justify-between">
                    <h3 class="card-title">
                        {bill.provider_name.clone().unwrap_or_else(|| format!("Provider #{}", bill.provider_id))}
                    </h3>
                    <span class=format!("badge {status_class}")>{status_label}</span>
                </div>
                <DetailRow label="Bill date" value=format_long_date(&bill.bill_date) />
                <DetailRow label="Amount" value=format_cad(bill.amount) />
                <DetailRow label="Payment method" value=bill.payment_method.clone().unwrap_or_else(|| "—".into()) />
                <DetailRow label="Notes" value=bill.notes.clone().unwrap_or_else(|| "—".into()) />
            </div>
        </div>
    }
    .into_any()
}

#[component]
pub fn ProviderBillDetailPage(id: i64) -> impl IntoView {
    view! {
        <DetailPage<ProviderBill>
            id=id
            resource=resources::PROVIDER_BILLS
            title="Provider Bill"
            entity_name="provider bill"
            back_to=AppRoute::ProviderBills
            render=render_bill
        />
    }
}

// =========================================================
// 账单表单 (Bill Form)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct BillDraft {
    provider_id: String,
    bill_date: String,
    amount: String,
    payment_method: String,
    status: String,
    notes: String,
}

impl BillDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.provider_id.is_empty() {
            errors.set("provider_id", "Select a provider.");
        }
        if self.bill_date.trim().is_empty() {
            errors.set("bill_date", "The bill date is required.");
        }
        match parse_numeric(&self.amount) {
            Some(amount) if amount > 0.0 => {}
            _ => errors.set("amount", "Enter an amount above zero."),
        }
        errors
    }

    fn to_input(&self) -> ProviderBillInput {
        let payment_method = self.payment_method.trim();
        let notes = self.notes.trim();
        ProviderBillInput {
            provider_id: self.provider_id.parse().unwrap_or(0),
            bill_date: self.bill_date.clone(),
            amount: parse_numeric(&self.amount).unwrap_or(0.0),
            payment_method: (!payment_method.is_empty()).then(|| payment_method.to_string()),
            status: self.status.clone(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}

/// 服务商下拉的选项（在用主档）
fn use_provider_options() -> Signal<Vec<(String, String)>> {
    use stationops_shared::ListQuery;

    let session = use_session();
    let options = RwSignal::new(Vec::<(String, String)>::new());

    Effect::new(move |_| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            let query = ListQuery {
                per_page: 200,
                sort_by: Some("name".to_string()),
                ..ListQuery::default()
            };
            if let Ok(page) = api.list::<Provider>(resources::PROVIDERS, &query).await {
                options.try_set(
                    page.data
                        .into_iter()
                        .map(|p| (p.id.to_string(), p.name))
                        .collect(),
                );
            }
        });
    });

    options.into()
}

#[component]
pub fn ProviderBillFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let providers = use_provider_options();

    let provider_id = RwSignal::new(String::new());
    let bill_date = RwSignal::new(today());
    let amount = RwSignal::new(String::new());
    let payment_method = RwSignal::new(String::new());
    let status = RwSignal::new("pending".to_string());
    let notes = RwSignal::new(String::new());

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            spawn_local(async move {
                match api
                    .fetch_one::<ProviderBill>(resources::PROVIDER_BILLS, id)
                    .await
                {
                    Ok(bill) => {
                        provider_id.try_set(bill.provider_id.to_string());
                        bill_date.try_set(truncate_date(&bill.bill_date));
                        amount.try_set(format_numeric(bill.amount));
                        payment_method.try_set(bill.payment_method.unwrap_or_default());
                        status.try_set(match bill.status {
                            BillStatus::Pending => "pending".to_string(),
                            BillStatus::Paid => "paid".to_string(),
                        });
                        notes.try_set(bill.notes.unwrap_or_default());
                    }
                    Err(e) => {
                        banner.try_set(Some(e.to_string()));
                    }
                }
                loading.try_set(false);
            });
        });
    }

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = BillDraft {
            provider_id: provider_id.get_untracked(),
            bill_date: bill_date.get_untracked(),
            amount: amount.get_untracked(),
            payment_method: payment_method.get_untracked(),
            status: status.get_untracked(),
            notes: notes.get_untracked(),
        };
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
            let result: Result<ProviderBill, ApiError> = match id {
                Some(id) => api.update(resources::PROVIDER_BILLS, id, &input).await,
                None => api.create(resources::PROVIDER_BILLS, &input).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::ProviderBills),
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

    let title = if id.is_some() { "Edit Provider Bill" } else { "New Provider Bill" };

    view! {
        <div class="max-w-xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <SelectField
                                label="Provider"
                                name="provider_id"
                                value=provider_id
                                errors=errors
                                options=providers
                                prompt="Select a provider"
                                required=true
                            />
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Bill Date" name="bill_date" value=bill_date errors=errors input_type="date" required=true />
                                <TextField label="Amount ($)" name="amount" value=amount errors=errors input_type="number" step="0.01" required=true />
                            </div>
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Payment Method" name="payment_method" value=payment_method errors=errors placeholder="Optional" />
                                <SelectField
                                    label="Status"
                                    name="status"
                                    value=status
                                    errors=errors
                                    options=vec![
                                        ("pending".to_string(), "Pending".to_string()),
                                        ("paid".to_string(), "Paid".to_string()),
                                    ]
                                />
                            </div>
                            <TextAreaField label="Notes" name="notes" value=notes errors=errors />
                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::ProviderBills
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

    #[test]
    fn bill_requires_provider_date_and_positive_amount() {
        let draft = BillDraft {
            provider_id: String::new(),
            bill_date: String::new(),
            amount: "0".into(),
            payment_method: String::new(),
            status: "pending".into(),
            notes: String::new(),
        };
        let errors = draft.validate();
        assert!(errors.get("provider_id").is_some());
        assert!(errors.get("bill_date").is_some());
        assert!(errors.get("amount").is_some());
    }

    #[test]
    fn provider_only_requires_a_name() {
        let draft = ProviderDraft {
            name: "  ".into(),
            service: String::new(),
            payment_method: String::new(),
            status: "active".into(),
        };
        assert!(draft.validate().get("name").is_some());

        let draft = ProviderDraft {
            name: "Clearwater Fuel".into(),
            service: String::new(),
            payment_method: String::new(),
            status: "active".into(),
        };
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn optional_bill_fields_normalise_to_none() {
        let draft = BillDraft {
            provider_id: "7".into(),
            bill_date: "2025-05-10".into(),
            amount: "420.69".into(),
            payment_method: " ".into(),
            status: "paid".into(),
            notes: String::new(),
        };
        assert!(draft.validate().is_empty());
        let input = draft.to_input();
        assert_eq!(input.provider_id, 7);
        assert_eq!(input.payment_method, None);
        assert_eq!(input.notes, None);
    }
}
