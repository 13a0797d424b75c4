//! 每日销售 / 燃油日志页面
//!
//! 旧版路径 `/daily-sales` 由路由层改写到这里。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::{format_long_date, truncate_date};
use stationops_shared::money::format_cad;
use stationops_shared::{DailySale, DailySaleInput};

use crate::api::{ApiError, resources};
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, LoadingPanel};
use crate::components::forms::{
    FieldErrors, SubmitRow, TextAreaField, TextField, format_numeric, parse_numeric, today,
};
use crate::components::listing::{Cell, Column, ListEntity, ListPage};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

// =========================================================
// 列表 (List)
// =========================================================

const COLUMNS: &[Column] = &[
    Column { key: "date", label: "Date", sortable: true },
    Column { key: "fuel_litres", label: "Fuel (L)", sortable: false },
    Column { key: "fuel_total", label: "Fuel Sales", sortable: true },
    Column { key: "store_total", label: "Store Sales", sortable: true },
    Column { key: "total", label: "Total", sortable: false },
];

impl ListEntity for DailySale {
    const RESOURCE: &'static str = resources::SALES;
    const TITLE: &'static str = "Daily Sales";

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn cell(&self, key: &str) -> Cell {
        match key {
            "date" => Cell::Text(format_long_date(&self.date)),
            "fuel_litres" => Cell::Text(format!("{:.1}", self.fuel_litres)),
            "fuel_total" => Cell::Text(format_cad(self.fuel_total)),
            "store_total" => Cell::Text(format_cad(self.store_total)),
            _ => Cell::Text(format_cad(self.grand_total())),
        }
    }

    fn row_label(&self) -> String {
        format!("sales for {}", truncate_date(&self.date))
    }

    fn create_route() -> Option<AppRoute> {
        Some(AppRoute::SaleNew)
    }

    fn edit_route(&self) -> Option<AppRoute> {
        Some(AppRoute::SaleEdit(self.id))
    }
}

#[component]
pub fn SalesListPage() -> impl IntoView {
    view! { <ListPage<DailySale> /> }
}

// =========================================================
// 表单 (Form)
// =========================================================

/// 表单快照（纯数据，供校验与转换）
#[derive(Clone, Debug, PartialEq)]
struct SaleDraft {
    date: String,
    fuel_litres: String,
    fuel_total: String,
    store_total: String,
    cash_total: String,
    card_total: String,
    notes: String,
}

impl SaleDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.date.trim().is_empty() {
            errors.set("date", "The date is required.");
        }
        for (field, value) in [
            ("fuel_litres", &self.fuel_litres),
            ("fuel_total", &self.fuel_total),
            ("store_total", &self.store_total),
            ("cash_total", &self.cash_total),
            ("card_total", &self.card_total),
        ] {
            if parse_numeric(value).is_none() {
                errors.set(field, "Enter a valid number.");
            }
        }
        errors
    }

    fn to_input(&self) -> DailySaleInput {
        let notes = self.notes.trim();
        DailySaleInput {
            date: self.date.clone(),
            fuel_litres: parse_numeric(&self.fuel_litres).unwrap_or(0.0),
            fuel_total: parse_numeric(&self.fuel_total).unwrap_or(0.0),
            store_total: parse_numeric(&self.store_total).unwrap_or(0.0),
            cash_total: parse_numeric(&self.cash_total).unwrap_or(0.0),
            card_total: parse_numeric(&self.card_total).unwrap_or(0.0),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}

/// 表单状态：信号字段 + 默认值 / 回填 / 快照
#[derive(Clone, Copy)]
struct SaleFormState {
    date: RwSignal<String>,
    fuel_litres: RwSignal<String>,
    fuel_total: RwSignal<String>,
    store_total: RwSignal<String>,
    cash_total: RwSignal<String>,
    card_total: RwSignal<String>,
    notes: RwSignal<String>,
}

impl SaleFormState {
    fn new() -> Self {
        Self {
            date: RwSignal::new(today()),
            fuel_litres: RwSignal::new(String::new()),
            fuel_total: RwSignal::new(String::new()),
            store_total: RwSignal::new(String::new()),
            cash_total: RwSignal::new(String::new()),
            card_total: RwSignal::new(String::new()),
            notes: RwSignal::new(String::new()),
        }
    }

    /// 编辑模式回填：服务端精度截断到控件精度
    fn populate(&self, sale: &DailySale) {
        self.date.set(truncate_date(&sale.date));
        self.fuel_litres.set(format_numeric(sale.fuel_litres));
        self.fuel_total.set(format_numeric(sale.fuel_total));
        self.store_total.set(format_numeric(sale.store_total));
        self.cash_total.set(format_numeric(sale.cash_total));
        self.card_total.set(format_numeric(sale.card_total));
        self.notes.set(sale.notes.clone().unwrap_or_default());
    }

    fn snapshot(&self) -> SaleDraft {
        SaleDraft {
            date: self.date.get_untracked(),
            fuel_litres: self.fuel_litres.get_untracked(),
            fuel_total: self.fuel_total.get_untracked(),
            store_total: self.store_total.get_untracked(),
            cash_total: self.cash_total.get_untracked(),
            card_total: self.card_total.get_untracked(),
            notes: self.notes.get_untracked(),
        }
    }
}

#[component]
pub fn SaleFormPage(#[prop(optional)] id: Option<i64>) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let form = SaleFormState::new();
    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let loading = RwSignal::new(id.is_some());

    if let Some(id) = id {
        Effect::new(move |_| {
            let api = session.state.get_untracked().api();
            spawn_local(async move {
                match api.fetch_one::<DailySale>(resources::SALES, id).await {
                    Ok(sale) => form.populate(&sale),
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
            let result: Result<DailySale, ApiError> = match id {
                Some(id) => api.update(resources::SALES, id, &input).await,
                None => api.create(resources::SALES, &input).await,
            };
            match result {
                Ok(_) => navigate(AppRoute::Sales),
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

    let title = if id.is_some() { "Edit Daily Sales" } else { "Record Daily Sales" };

    view! {
        <div class="max-w-2xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <Show when=move || !loading.get() fallback=|| view! { <LoadingPanel /> }>
                        <form on:submit=on_submit.clone() class="space-y-2">
                            <TextField label="Date" name="date" value=form.date errors=errors input_type="date" required=true />
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Fuel Volume (L)" name="fuel_litres" value=form.fuel_litres errors=errors input_type="number" step="0.1" />
                                <TextField label="Fuel Sales ($)" name="fuel_total" value=form.fuel_total errors=errors input_type="number" step="0.01" />
                            </div>
                            <div class="grid grid-cols-2 gap-4">
                                <TextField label="Store Sales ($)" name="store_total" value=form.store_total errors=errors input_type="number" step="0.01" />
                                <TextField label="Cash ($)" name="cash_total" value=form.cash_total errors=errors input_type="number" step="0.01" />
                            </div>
                            <TextField label="Card ($)" name="card_total" value=form.card_total errors=errors input_type="number" step="0.01" />
                            <TextAreaField label="Notes" name="notes" value=form.notes errors=errors />
                            <SubmitRow
                                submitting=Signal::derive(move || submitting.get())
                                label="Save"
                                cancel_to=AppRoute::Sales
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

    fn draft() -> SaleDraft {
        SaleDraft {
            date: "2025-06-01".into(),
            fuel_litres: "1200.5".into(),
            fuel_total: "1890.20".into(),
            store_total: "640".into(),
            cash_total: "".into(),
            card_total: "2530.20".into(),
            notes: "  ".into(),
        }
    }

    #[test]
    fn valid_draft_converts_with_empty_numbers_as_zero() {
        let draft = draft();
        assert!(draft.validate().is_empty());
        let input = draft.to_input();
        assert_eq!(input.fuel_litres, 1200.5);
        assert_eq!(input.cash_total, 0.0);
        // 空白备注归一为 None
        assert_eq!(input.notes, None);
    }

    #[test]
    fn missing_date_is_a_field_error() {
        let mut d = draft();
        d.date = " ".into();
        let errors = d.validate();
        assert!(errors.get("date").is_some());
        assert!(errors.get("fuel_total").is_none());
    }

    #[test]
    fn non_numeric_amounts_are_field_errors() {
        let mut d = draft();
        d.fuel_total = "12.x".into();
        assert!(d.validate().get("fuel_total").is_some());
    }
}
