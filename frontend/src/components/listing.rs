//! 列表页脚手架
//!
//! 二十来个集合页面共用同一套生命周期：查询状态（搜索防抖、过滤、
//! 逐列三态排序、翻页）任一变化即发出一次打代际戳的集合抓取，过期
//! 响应整体丢弃；行级动作按会话谓词渲染；删除走确认对话框，成功后
//! 仅移除本地行、不整表重拉。各实体页面只需实现 [`ListEntity`]。

use std::marker::PhantomData;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::de::DeserializeOwned;

use stationops_shared::{ListQuery, SortDirection};

use crate::api::FetchGuard;
use crate::auth::use_session;
use crate::components::feedback::{ConfirmDialog, ErrorAlert, Toast};
use crate::components::icons::*;
use crate::web::Debounce;
use crate::web::route::AppRoute;
use crate::web::router::Link;

// =========================================================
// 查询状态 (Query State)
// =========================================================

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ListQueryState {
    pub query: ListQuery,
}

impl ListQueryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 逐列三态排序：点其他列 -> 该列升序；点当前列 -> 翻转方向
    pub fn toggle_sort(&mut self, column: &str) {
        match &self.query.sort_by {
            Some(current) if current == column => {
                self.query.sort_direction = self.query.sort_direction.flipped();
            }
            _ => {
                self.query.sort_by = Some(column.to_string());
                self.query.sort_direction = SortDirection::Asc;
            }
        }
    }

    /// 当前列的排序方向（未按此列排序时为 None），供表头渲染指示箭头
    pub fn sort_indicator(&self, column: &str) -> Option<SortDirection> {
        match &self.query.sort_by {
            Some(current) if current == column => Some(self.query.sort_direction),
            _ => None,
        }
    }

    /// 搜索词变化回到第一页
    pub fn set_search(&mut self, term: String) {
        self.query.search = term;
        self.query.page = 1;
    }

    /// 设置（或替换）一个实体过滤键，回到第一页
    pub fn set_filter(&mut self, key: &str, value: String) {
        self.query.filters.retain(|(k, _)| k != key);
        self.query.filters.push((key.to_string(), value));
        self.query.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page;
    }
}

// =========================================================
// 实体接入点 (Entity Contract)
// =========================================================

#[derive(Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

/// 单元格渲染值
pub enum Cell {
    Text(String),
    /// (显示文本, badge class)，用于状态着色
    Badge(String, &'static str),
}

/// 状态过滤下拉的声明
#[derive(Clone, Copy)]
pub struct FilterSpec {
    pub key: &'static str,
    pub prompt: &'static str,
    pub options: &'static [(&'static str, &'static str)],
}

pub trait ListEntity: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static {
    /// API 资源路径（`crate::api::resources`）
    const RESOURCE: &'static str;
    const TITLE: &'static str;

    fn columns() -> &'static [Column];
    fn id(&self) -> i64;
    fn cell(&self, key: &str) -> Cell;
    /// 删除确认对话框里的行描述
    fn row_label(&self) -> String;

    fn create_route() -> Option<AppRoute> {
        None
    }
    fn detail_route(&self) -> Option<AppRoute> {
        None
    }
    fn edit_route(&self) -> Option<AppRoute> {
        None
    }
}

// =========================================================
// 组件 (Component)
// =========================================================

#[component]
pub fn ListPage<T: ListEntity>(
    /// 可选的状态过滤下拉
    #[prop(optional)]
    filter: Option<FilterSpec>,
    /// 仅用于绑定泛型参数 `T`，不影响渲染
    #[prop(optional)]
    _marker: PhantomData<T>,
) -> impl IntoView {
    let session = use_session();

    let state = RwSignal::new(ListQueryState::new());
    let rows = RwSignal::new(Vec::<T>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(Option::<String>::None);
    let last_page = RwSignal::new(1u32);
    let total = RwSignal::new(0u64);
    let notification = RwSignal::new(Option::<(String, bool)>::None);

    let pending_delete = RwSignal::new(Option::<(i64, String)>::None);
    let confirm_open = RwSignal::new(false);

    let guard = FetchGuard::new();

    // 查询状态变化（含首次挂载与手动刷新）即发一次打戳抓取
    Effect::new({
        let guard = guard.clone();
        move |_| {
            let query = state.get().query;
            let api = session.state.get_untracked().api();
            let stamp = guard.begin();
            loading.set(true);

            let guard = guard.clone();
            spawn_local(async move {
                let result = api.list::<T>(T::RESOURCE, &query).await;
                // 参数已变则整份响应作废
                if !guard.is_current(stamp) {
                    return;
                }
                match result {
                    Ok(page) => {
                        rows.try_set(page.data);
                        last_page.try_set(page.last_page.max(1));
                        total.try_set(page.total);
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

    let debounce = Rc::new(Debounce::new(300));
    let search_input = RwSignal::new(String::new());
    let on_search = {
        let debounce = debounce.clone();
        move |ev: leptos::web_sys::Event| {
            search_input.set(event_target_value(&ev));
            debounce.schedule(move || {
                state.update(|s| s.set_search(search_input.get_untracked()));
            });
        }
    };

    let on_confirm_delete = Callback::new(move |_| {
        let Some((id, _)) = pending_delete.get_untracked() else {
            return;
        };
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            match api.remove(T::RESOURCE, id).await {
                Ok(()) => {
                    // 删除成功只移除本地行，不整表重拉
                    rows.try_update(|list| list.retain(|row| row.id() != id));
                    notification.try_set(Some(("Record deleted.".to_string(), false)));
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
            .map(|(_, label)| format!("Delete \"{label}\"? This cannot be undone."))
            .unwrap_or_default()
    });

    let columns = T::columns();
    let column_count = columns.len() + 1;
    let can_create = move || session.state.get().user.as_ref().is_some_and(|u| u.can_create());
    let can_update = move || session.state.get().user.as_ref().is_some_and(|u| u.can_update());
    let can_delete = move || session.state.get().user.as_ref().is_some_and(|u| u.can_delete());

    view! {
        <div class="space-y-4">
            <Toast notification=notification />
            <ConfirmDialog
                open=confirm_open
                title=format!("Delete {}", T::TITLE.to_lowercase())
                message=confirm_message
                on_confirm=on_confirm_delete
            />

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex flex-wrap items-center justify-between gap-3 p-6 pb-2">
                        <h3 class="card-title">{T::TITLE}</h3>
                        <div class="flex items-center gap-2">
                            <label class="input input-bordered input-sm flex items-center gap-2">
                                <Search attr:class="h-4 w-4 opacity-50" />
                                <input
                                    type="text"
                                    class="grow"
                                    placeholder="Search..."
                                    prop:value=search_input
                                    on:input=on_search
                                />
                            </label>
                            {filter.map(|spec| view! {
                                <select
                                    class="select select-bordered select-sm"
                                    on:change=move |ev| {
                                        state.update(|s| s.set_filter(spec.key, event_target_value(&ev)));
                                    }
                                >
                                    <option value="">{spec.prompt}</option>
                                    {spec
                                        .options
                                        .iter()
                                        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                                        .collect_view()}
                                </select>
                            })}
                            <button
                                class="btn btn-ghost btn-sm btn-circle"
                                on:click=move |_| state.update(|_| {})
                                disabled=move || loading.get()
                            >
                                <RefreshCw attr:class=move || {
                                    if loading.get() { "h-4 w-4 animate-spin" } else { "h-4 w-4" }
                                } />
                            </button>
                            <Show when=can_create>
                                {T::create_route().map(|to| view! {
                                    <Link to=to class="btn btn-primary btn-sm gap-1">
                                        <Plus attr:class="h-4 w-4" />
                                        "New"
                                    </Link>
                                })}
                            </Show>
                        </div>
                    </div>

                    <div class="px-6">
                        <ErrorAlert message=Signal::derive(move || error.get()) />
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    {columns
                                        .iter()
                                        .map(|column| {
                                            let key = column.key;
                                            if column.sortable {
                                                view! {
                                                    <th
                                                        class="cursor-pointer select-none hover:bg-base-200"
                                                        on:click=move |_| state.update(|s| s.toggle_sort(key))
                                                    >
                                                        {column.label}
                                                        {move || match state.with(|s| s.sort_indicator(key)) {
                                                            Some(SortDirection::Asc) => " ▲",
                                                            Some(SortDirection::Desc) => " ▼",
                                                            None => "",
                                                        }}
                                                    </th>
                                                }
                                                .into_any()
                                            } else {
                                                view! { <th>{column.label}</th> }.into_any()
                                            }
                                        })
                                        .collect_view()}
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || rows.with(|r| r.is_empty()) && !loading.get()>
                                    <tr>
                                        <td colspan=column_count.to_string() class="text-center py-8 text-base-content/50">
                                            "No records found."
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || loading.get() && rows.with(|r| r.is_empty())>
                                    <tr>
                                        <td colspan=column_count.to_string() class="text-center py-8 text-base-content/50">
                                            <span class="loading loading-spinner loading-md"></span>
                                            " Loading..."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || rows.get()
                                    key=|row| row.id()
                                    children=move |row: T| {
                                        let id = row.id();
                                        let label = row.row_label();
                                        let detail_to = row.detail_route();
                                        let edit_to = row.edit_route();
                                        let cells = T::columns()
                                            .iter()
                                            .map(|column| match row.cell(column.key) {
                                                Cell::Text(text) => view! { <td>{text}</td> }.into_any(),
                                                Cell::Badge(text, class) => view! {
                                                    <td><span class=format!("badge {class}")>{text}</span></td>
                                                }
                                                .into_any(),
                                            })
                                            .collect_view();
                                        view! {
                                            <tr>
                                                {cells}
                                                <td class="text-right whitespace-nowrap">
                                                    {detail_to.map(|to| view! {
                                                        <Link to=to class="btn btn-ghost btn-xs btn-square" attr:title="View">
                                                            <Eye attr:class="h-4 w-4" />
                                                        </Link>
                                                    })}
                                                    <Show when=can_update>
                                                        {edit_to.map(|to| view! {
                                                            <Link to=to class="btn btn-ghost btn-xs btn-square" attr:title="Edit">
                                                                <Pencil attr:class="h-4 w-4" />
                                                            </Link>
                                                        })}
                                                    </Show>
                                                    <Show when=can_delete>
                                                        {
                                                            let label = label.clone();
                                                            view! {
                                                                <button
                                                                    class="btn btn-ghost btn-xs btn-square text-error"
                                                                    title="Delete"
                                                                    on:click={
                                                                        let label = label.clone();
                                                                        move |_| {
                                                                            pending_delete.set(Some((id, label.clone())));
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

                    <div class="flex items-center justify-between p-6 pt-2">
                        <span class="text-sm text-base-content/60">
                            {move || format!("{} record(s)", total.get())}
                        </span>
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_column_starts_ascending() {
        let mut state = ListQueryState::new();
        state.toggle_sort("date");
        assert_eq!(state.query.sort_by.as_deref(), Some("date"));
        assert_eq!(state.query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn same_column_flips_direction() {
        let mut state = ListQueryState::new();
        state.toggle_sort("date");
        state.toggle_sort("date");
        assert_eq!(state.query.sort_direction, SortDirection::Desc);
        state.toggle_sort("date");
        assert_eq!(state.query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn switching_column_resets_to_ascending() {
        let mut state = ListQueryState::new();
        state.toggle_sort("date");
        state.toggle_sort("date"); // date desc
        state.toggle_sort("name");
        assert_eq!(state.query.sort_by.as_deref(), Some("name"));
        assert_eq!(state.query.sort_direction, SortDirection::Asc);
        // 三态按列记忆：回到 date 仍从升序起步
        state.toggle_sort("date");
        assert_eq!(state.query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn sort_indicator_is_per_column() {
        let mut state = ListQueryState::new();
        state.toggle_sort("date");
        assert_eq!(state.sort_indicator("date"), Some(SortDirection::Asc));
        assert_eq!(state.sort_indicator("name"), None);
    }

    #[test]
    fn search_and_filter_reset_the_page() {
        let mut state = ListQueryState::new();
        state.set_page(4);
        state.set_search("pump".into());
        assert_eq!(state.query.page, 1);

        state.set_page(3);
        state.set_filter("status", "active".into());
        assert_eq!(state.query.page, 1);
        assert_eq!(
            state.query.filters,
            vec![("status".to_string(), "active".to_string())]
        );

        // 同键过滤是替换不是追加
        state.set_filter("status", "inactive".into());
        assert_eq!(state.query.filters.len(), 1);
    }
}
