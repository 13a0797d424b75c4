//! 业主与权益交易页面
//!
//! 主档/流水对的第二组实例：Owner 主档 + 资本账户的投入/支取流水。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::{format_long_date, truncate_date};
use stationops_shared::money::format_cad;
use stationops_shared::{
    EquityKind, ListQuery, Owner, OwnerEquityInput, OwnerEquityTransaction, OwnerInput,
};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, LoadingPanel};
use crate::components::forms::{
    FieldErrors, SelectField, SubmitRow, TextAreaField, TextField, parse_numeric, today,
};
use crate::components::listing::{Cell, Column, FilterSpec, ListEntity, ListPage};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

// =========================================================
// 业主列表 (Owner List)
// =========================================================

const OWNER_COLUMNS: &[Column] = &[
    Column { key: "name", label: "Name", sortable: true },
    Column { key: "email", label: "Email", sortable: false },
];

impl ListEntity for Owner {
    const RESOURCE: &'static str = resources::OWNERS;
    const TITLE: &'static str = "Owners";

    fn columns() -> &'static [Column] {
        OWNER_COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "name" => Cell::Text(self.name.clone()),
            _ => Cell::Text(self.email.clone().unwrap_or_default()),
        }
    }

    fn row_label(&self) -> String {
        self.name.clone()
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::OwnerNew)
    }

    fn edit_route(&self) -> Option<AppRoute> {
        Some(AppRoute::OwnerEdit(self.id))
    }
}

#[component]
pub fn OwnerListPage() -> impl IntoView {
    view! { <ListPage<Owner> /> }
}

// =========================================================
// 业主表单 (Owner Form)
// =========================================================

#[component]
pub fn OwnerFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            spawn_local(async move {
                match api.fetch_one::<Owner>(resources::OWNERS, id).await {
                    Ok(owner) => {
                        name.try_set(owner.name);
                        email.try_set(owner.email.unwrap_or_default());
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
        let owner_name = name.get_untracked();
        if owner_name.trim().is_empty() {
            errors.update(|e| e.set("name", "The owner name is required."));
            return;
        }

        submitting.set(true);
        banner.set(None);
        let trimmed_email = email.get_untracked().trim().to_string();
        let input = OwnerInput {
            name: owner_name.trim().to_string(),
            email: (!trimmed_email.is_empty()).then_some(trimmed_email),
        };
        let api = session.state.get_untracked().api();
        let navigate = navigate.clone();
        spawn_local(async move {
            let result: Result<Owner, ApiError> = match id {
                Some(id) => api.update(resources::OWNERS, id, &input).await,
                None => api.create(resources::OWNERS, &input).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::Owners),
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

    let title = if id.is_some() { "Edit Owner" } else { "New Owner" };

    view! {
        <div class="max-w-xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <TextField label="Name" name="name" value=name errors=errors required=true />
                            <TextField label="Email" name="email" value=email errors=errors input_type="email" placeholder="Optional" />
                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::Owners
                            />
                        </form>
                    </Show>
                </div>
            </div>
        </div>
    }
}

// =========================================================
// 权益流水列表 (Equity List)
// =========================================================

const EQUITY_COLUMNS: &[Column] = &[
    Column { key: "date", label: "Date", sortable: true },
    Column { key: "owner", label: "Owner", sortable: false },
    Column { key: "kind", label: "Type", sortable: false },
    Column { key: "amount", label: "Amount", sortable: true },
    Column { key: "description", label: "Description", sortable: false },
];

const KIND_FILTER: FilterSpec = FilterSpec {
    key: "kind",
    prompt: "All types",
    options: &[("investment", "Investment"), ("withdrawal", "Withdrawal")],
};

impl ListEntity for OwnerEquityTransaction {
    const RESOURCE: &'static str = resources::OWNER_EQUITY;
    const TITLE: &'static str = "Owner Equity";

    fn columns() -> &'static [Column] {
        EQUITY_COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "date" => Cell::Text(format_long_date(&self.date)),
            "owner" => Cell::Text(
                self.owner_name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", self.owner_id)),
            ),
            "kind" => match self.kind {
                EquityKind::Investment => Cell::Badge("Investment".to_string(), "badge-success"),
                EquityKind::Withdrawal => Cell::Badge("Withdrawal".to_string(), "badge-warning"),
            },
            "amount" => Cell::Text(format_cad(self.amount)),
            _ => Cell::Text(self.description.clone().unwrap_or_default()),
        }
    }

    fn row_label(&self) -> String {
        format!(
            "{} of {} on {}",
            match self.kind {
                EquityKind::Investment => "investment",
                EquityKind::Withdrawal => "withdrawal",
            },
            format_cad(self.amount),
            truncate_date(&self.date)
        )
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::OwnerEquityNew)
    }
}

#[component]
pub fn OwnerEquityListPage() -> impl IntoView {
    view! { <ListPage<OwnerEquityTransaction> filter=KIND_FILTER /> }
}

// =========================================================
// 权益流水表单 (Equity Form)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
struct EquityDraft {
    owner_id: String,
    date: String,
    amount: String,
    kind: String,
    description: String,
}

impl EquityDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.owner_id.is_empty() {
            errors.set("owner_id", "Select an owner.");
        }
        if self.date.trim().is_empty() {
            errors.set("date", "The date is required.");
        }
        match parse_numeric(&self.amount) {
            Some(amount) if amount > 0.0 => {}
            _ => errors.set("amount", "Enter an amount above zero."),
        }
        errors
    }

    fn to_input(&self) -> OwnerEquityInput {
        let description = self.description.trim();
        OwnerEquityInput {
            owner_id: self.owner_id.parse().unwrap_or(0),
            date: self.date.clone(),
            amount: parse_numeric(&self.amount).unwrap_or(0.0),
            kind: self.kind.clone(),
            description: (!description.is_empty()).then(|| description.to_string()),
        }
    }
}

fn use_owner_options() -> Signal<Vec<(String, String)>> {
    let session = use_session();
    let options = RwSignal::new(Vec::<(String, String)>::new());

    Effect::new(move |_| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            let query = ListQuery {
                per_page: 100,
                sort_by: Some("name".to_string()),
                ..ListQuery::default()
            };
            if let Ok(page) = api.list::<Owner>(resources::OWNERS, &query).await {
                options.try_set(
                    page.data
                        .into_iter()
                        .map(|o| (o.id.to_string(), o.name))
                        .collect(),
                );
            }
        });
    });

    options.into()
}

#[component]
pub fn OwnerEquityFormPage() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let owners = use_owner_options();

    let owner_id = RwSignal::new(String::new());
    let date = RwSignal::new(today());
    let amount = RwSignal::new(String::new());
    let kind = RwSignal::new("investment".to_string());
    let description = RwSignal::new(String::new());

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = EquityDraft {
            owner_id: owner_id.get_untracked(),
            date: date.get_untracked(),
            amount: amount.get_untracked(),
            kind: kind.get_untracked(),
            description: description.get_untracked(),
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
            let result: Result<OwnerEquityTransaction, ApiError> =
                api.create(resources::OWNER_EQUITY, &input).await;
            match result {
                Ok(_) => navigate(AppRoute::OwnerEquity),
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

    view! {
        <div class="max-w-xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">"New Equity Transaction"</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <form on:submit=on_submit class="space-y-2">
                        <SelectField
                            label="Owner"
                            name="owner_id"
                            value=owner_id
                            errors=errors
                            options=owners
                            prompt="Select an owner"
                            required=true
                        />
                        <div class="grid grid-cols-2 gap-4">
                            <TextField label="Date" name="date" value=date errors=errors input_type="date" required=true />
                            <TextField label="Amount ($)" name="amount" value=amount errors=errors input_type="number" step="0.01" required=true />
                        </div>
                        <SelectField
                            label="Type"
                            name="kind"
                            value=kind
                            errors=errors
                            options=vec![
                                ("investment".to_string(), "Investment".to_string()),
                                ("withdrawal".to_string(), "Withdrawal".to_string()),
                            ]
                        />
                        <TextAreaField label="Description" name="description" value=description errors=errors />
                        <SubmitRow
                            submitting=Signal::derive(move || submitting.get())
                            label="Save"
                            cancel_to=AppRoute::OwnerEquity
                        />
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
    fn equity_requires_owner_date_and_positive_amount() {
        let draft = EquityDraft {
            owner_id: String::new(),
            date: String::new(),
            amount: "-5".into(),
            kind: "investment".into(),
            description: String::new(),
        };
        let errors = draft.validate();
        assert!(errors.get("owner_id").is_some());
        assert!(errors.get("date").is_some());
        assert!(errors.get("amount").is_some());
    }

    #[test]
    fn valid_withdrawal_converts() {
        let draft = EquityDraft {
            owner_id: "2".into(),
            date: "2025-04-15".into(),
            amount: "2500".into(),
            kind: "withdrawal".into(),
            description: "Quarterly draw".into(),
        };
        assert!(draft.validate().is_empty());
        let input = draft.to_input();
        assert_eq!(input.owner_id, 2);
        assert_eq!(input.kind, "withdrawal");
        assert_eq!(input.description.as_deref(), Some("Quarterly draw"));
    }
}
