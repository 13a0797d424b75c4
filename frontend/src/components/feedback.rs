//! 反馈组件层
//!
//! 全站统一的非阻塞错误呈现：行内告警、角标通知、加载与“未找到”面板。
//! 任何页面都不得使用阻塞式 `alert()`。

use leptos::prelude::*;

/// 行内错误告警。`message` 为 `None` 时不渲染。
#[component]
pub fn ErrorAlert(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div role="alert" class="alert alert-error text-sm py-2">
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// 角标通知（消息内容，是否出错），3 秒后自动消失
#[component]
pub fn Toast(notification: RwSignal<Option<(String, bool)>>) -> impl IntoView {
    Effect::new(move |_| {
        if notification.get().is_some() {
            set_timeout(
                move || notification.set(None),
                std::time::Duration::from_secs(3),
            );
        }
    });

    view! {
        <Show when=move || notification.get().is_some()>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    let (_, is_err) = notification.get().unwrap_or_default();
                    if is_err {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    }
                }>
                    <span>{move || notification.get().unwrap_or_default().0}</span>
                </div>
            </div>
        </Show>
    }
}

/// 居中加载指示
#[component]
pub fn LoadingPanel() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-16">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 详情页 404 专用面板，与通用错误面板区分
#[component]
pub fn NotFoundPanel(#[prop(into)] what: String) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body items-center text-center py-16">
                <h2 class="text-4xl font-bold text-base-content/40">"404"</h2>
                <p class="text-base-content/70">{format!("This {what} does not exist or was removed.")}</p>
            </div>
        </div>
    }
}

/// 破坏性操作的确认对话框
#[component]
pub fn ConfirmDialog(
    /// 打开状态；确认或取消都会复位为 false
    open: RwSignal<bool>,
    #[prop(into)] title: String,
    /// 对话框正文（随删除目标变化）
    #[prop(into)] message: Signal<String>,
    /// 确认后的动作
    on_confirm: Callback<()>,
) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">{title}</h3>
                <p class="py-4 text-base-content/70">{move || message.get()}</p>
                <div class="modal-action">
                    <button type="button" class="btn btn-ghost" on:click=move |_| open.set(false)>
                        "Cancel"
                    </button>
                    <button
                        type="button"
                        class="btn btn-error"
                        on:click=move |_| {
                            open.set(false);
                            on_confirm.run(());
                        }
                    >
                        "Delete"
                    </button>
                </div>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
