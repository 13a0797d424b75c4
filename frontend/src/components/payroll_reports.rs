//! 薪资报告页面：列表 + 上传
//!
//! 报告生命周期 pending -> processed | failed。processed 的报告携带
//! 解析出的员工记录，进入处理页复核后批量落库。下载走临时对象 URL。
//! 行级动作超出了通用列表脚手架的 view/edit/delete 三件套，此页为
//! 手写列表（查询状态与代际戳复用同一套基元）。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::date::format_long_date;
use stationops_shared::payperiod::format_pay_period;
use stationops_shared::{PayrollReport, ReportStatus};

use crate::api::{ApiError, FetchGuard, resources};
use crate::auth::use_session;
use crate::components::feedback::{ConfirmDialog, ErrorAlert, Toast};
use crate::components::forms::{FieldErrors, SubmitRow, TextField};
use crate::components::icons::*;
use crate::components::listing::ListQueryState;
use crate::web::download::save_bytes;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_navigate};

fn status_badge(status: ReportStatus) -> (&'static str, &'static str) {
    match status {
        ReportStatus::Pending => ("Pending", "badge-warning"),
        ReportStatus::Processed => ("Processed", "badge-success"),
        ReportStatus::Failed => ("Failed", "badge-error"),
    }
}

// =========================================================
// 列表 (List)
// =========================================================

#[component]
pub fn PayrollReportListPage() -> impl IntoView {
    let session = use_session();

    let state = RwSignal::new(ListQueryState::new());
    let rows = RwSignal::new(Vec::<PayrollReport>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(Option::<String>::None);
    let last_page = RwSignal::new(1u32);
    let notification = RwSignal::new(Option::<(String, bool)>::None);
    let pending_delete = RwSignal::new(Option::<(i64, String)>::None);
    let confirm_open = RwSignal::new(false);
    let guard = FetchGuard::new();

    Effect::new({
        let guard = guard.clone();
        move |_| {
            let query = state.get().query;
            let api = session.state.get_untracked().api();
            let stamp = guard.begin();
            loading.set(true);

            let guard = guard.clone();
            spawn_local(async move {
                let result = api
                    .list::<PayrollReport>(resources::PAYROLL_REPORTS, &query)
                    .await;
                if !guard.is_current(stamp) {
                    return;
                }
                match result {
                    Ok(page) => {
                        rows.try_set(page.data);
                        last_page.try_set(page.last_page.max(1));
                        error.try_set(None);
                    }
                    Err(e) => {
                        error.try_set(Some(e.to_string()));
                    }
                }
                loading.try_set(false);
            });
        }
    });

    let download = move |id: i64, file_name: String| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            match api.download_payroll_report(id).await {
                Ok(bytes) => {
                    if let Err(e) = save_bytes(&bytes, &file_name) {
                        notification.try_set(Some((format!("Download failed: {e}"), true)));
                    }
                }
                Err(e) => {
                    notification.try_set(Some((format!("Download failed: {e}"), true)));
                }
            }
        });
    };

    let on_confirm_delete = Callback::new(move |_| {
        let Some((id, _)) = pending_delete.get_untracked() else {
            return;
        };
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            match api.remove(resources::PAYROLL_REPORTS, id).await {
                Ok(()) => {
                    rows.try_update(|list| list.retain(|r| r.id != id));
                    notification.try_set(Some(("Report deleted.".to_string(), false)));
                }
                Err(e) => {
                    notification.try_set(Some((format!("Delete failed: {e}"), true)));
                }
            }
        });
    });

    let confirm_message = Signal::derive(move || {
        pending_delete
            .get()
            .map(|(_, name)| format!("Delete \"{name}\"? This cannot be undone."))
            .unwrap_or_default()
    });

    let can_delete = move || session.state.get().user.as_ref().is_some_and(|u| u.can_delete());

    view! {
        <div class="space-y-4">
            <Toast notification=notification />
            <ConfirmDialog
                open=confirm_open
                title="Delete payroll report"
                message=confirm_message
                on_confirm=on_confirm_delete
            />

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <h3 class="card-title">"Payroll Reports"</h3>
                        <Link to=AppRoute::PayrollReportUpload class="btn btn-primary btn-sm gap-1">
                            <Plus attr:class="h-4 w-4" />
                            "Upload"
                        </Link>
                    </div>

                    <div class="px-6">
                        <ErrorAlert message=Signal::derive(move || error.get()) />
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"File"</th>
                                    <th>"Pay Period"</th>
                                    <th>"Uploaded"</th>
                                    <th>"Status"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || rows.with(|r| r.is_empty()) && !loading.get()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            "No reports uploaded yet."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || rows.get()
                                    key=|report| report.id
                                    children=move |report: PayrollReport| {
                                        let id = report.id;
                                        let file_name = report.file_name.clone();
                                        let download_name = report.file_name.clone();
                                        let delete_name = report.file_name.clone();
                                        let (status_label, status_class) = status_badge(report.status);
                                        let processable = report.status == ReportStatus::Processed
                                            && report.parsed_data.is_some();
                                        view! {
                                            <tr>
                                                <td class="font-mono text-sm">{file_name}</td>
                                                <td>{format_pay_period(&report.pay_period)}</td>
                                                <td>{format_long_date(&report.uploaded_at)}</td>
                                                <td><span class=format!("badge {status_class}")>{status_label}</span></td>
                                                <td class="text-right whitespace-nowrap">
                                                    {processable.then(|| view! {
                                                        <Link
                                                            to=AppRoute::PayrollReportProcess(id)
                                                            class="btn btn-ghost btn-xs gap-1"
                                                            attr:title="Review and process"
                                                        >
                                                            <FileText attr:class="h-4 w-4" />
                                                            "Process"
                                                        </Link>
                                                    })}
                                                    <button
                                                        class="btn btn-ghost btn-xs btn-square"
                                                        title="Download PDF"
                                                        on:click=move |_| download(id, download_name.clone())
                                                    >
                                                        <Download attr:class="h-4 w-4" />
                                                    </button>
                                                    <Show when=can_delete>
                                                        {
                                                            let delete_name = delete_name.clone();
                                                            view! {
                                                                <button
                                                                    class="btn btn-ghost btn-xs btn-square text-error"
                                                                    title="Delete"
                                                                    on:click={
                                                                        let delete_name = delete_name.clone();
                                                                        move |_| {
                                                                            pending_delete.set(Some((id, delete_name.clone())));
                                                                            confirm_open.set(true);
                                                                        }
                                                                    }
                                                                >
                                                                    <Trash2 attr:class="h-4 w-4" />
                                                                </button>
                                                            }
                                                        }
                                                    </Show>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>

                    <div class="flex justify-end p-6 pt-2">
                        <div class="join">
                            <button
                                class="join-item btn btn-sm"
                                disabled=move || state.with(|s| s.query.page) <= 1
                                on:click=move |_| state.update(|s| { let page = s.query.page.saturating_sub(1).max(1); s.set_page(page); })
                            >
                                <ChevronLeft attr:class="h-4 w-4" />
                            </button>
                            <button class="join-item btn btn-sm pointer-events-none">
                                {move || format!("Page {} of {}", state.with(|s| s.query.page), last_page.get())}
                            </button>
                            <button
                                class="join-item btn btn-sm"
                                disabled=move || state.with(|s| s.query.page) >= last_page.get()
                                on:click=move |_| state.update(|s| { let page = s.query.page + 1; s.set_page(page); })
                            >
                                <ChevronRight attr:class="h-4 w-4" />
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

// =========================================================
// 上传 (Upload)
// =========================================================

#[component]
pub fn PayrollReportUploadPage() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let pay_period = RwSignal::new(String::new());
    let file = RwSignal::new_local(Option::<web_sys::File>::None);
    let file_name = RwSignal::new(Option::<String>::None);

    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);

    let pick_file = move |ev: leptos::web_sys::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let picked = input.files().and_then(|list| list.item(0));
        file_name.set(picked.as_ref().map(|f| f.name()));
        file.set(picked);
        errors.update(|e| e.clear("file"));
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        let mut validation = FieldErrors::new();
        if pay_period.get_untracked().trim().is_empty() {
            validation.set("pay_period", "The pay period is required.");
        }
        if file.with_untracked(|f| f.is_none()) {
            validation.set("file", "Choose a PDF report to upload.");
        }
        if !validation.is_empty() {
            errors.set(validation);
            return;
        }

        let Ok(form_data) = web_sys::FormData::new() else {
            banner.set(Some("Could not build the upload form.".to_string()));
            return;
        };
        let _ = form_data.append_with_str("pay_period", pay_period.get_untracked().trim());
        if let Some(picked) = file.get_untracked() {
            let _ = form_data.append_with_blob("file", &picked);
        }

        submitting.set(true);
        banner.set(None);
        let api = session.state.get_untracked().api();
        let navigate = navigate.clone();
        spawn_local(async move {
            let result: Result<PayrollReport, ApiError> =
                api.upload_payroll_report(form_data).await;
            match result {
                Ok(_) => navigate(AppRoute::PayrollReports),
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

    let file_error = Memo::new(move |_| errors.with(|e| e.get("file")));

    view! {
        <div class="max-w-xl mx-auto">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">"Upload Payroll Report"</h2>
                    <p class="text-sm text-base-content/60">
                        "The PDF is parsed server-side; review the extracted records before they are saved."
                    </p>
                    <ErrorAlert message=Signal::derive(move || banner.get()) />
                    <form on:submit=on_submit class="space-y-2">
                        <TextField
                            label="Pay Period"
                            name="pay_period"
                            value=pay_period
                            errors=errors
                            placeholder="10/24/2025 - 11/06/2025"
                            required=true
                        />
                        <div class="form-control">
                            <label class="label" for="file">
                                <span class="label-text">"Report PDF" <span class="text-error">" *"</span></span>
                            </label>
                            <input
                                id="file"
                                type="file"
                                accept=".pdf"
                                class="file-input file-input-bordered w-full"
                                on:change=pick_file
                            />
                            <Show when=move || file_name.get().is_some()>
                                <label class="label py-0">
                                    <span class="label-text-alt">{move || file_name.get().unwrap_or_default()}</span>
                                </label>
                            </Show>
                            <Show when=move || file_error.get().is_some()>
                                <label class="label py-0">
                                    <span class="label-text-alt text-error">{move || file_error.get().unwrap_or_default()}</span>
                                </label>
                            </Show>
                        </div>
                        <SubmitRow
                            submitting=Signal::derive(move || submitting.get())
                            label="Upload"
                            cancel_to=AppRoute::PayrollReports
                        />
                    </form>
                </div>
            </div>
        </div>
    }
}
