//! 详情页脚手架
//!
//! 按 id 抓取单个实体，四个可渲染状态：加载中 / 未找到 / 错误 / 已加载。
//! “未找到”有专用面板，与通用错误面板区分。已加载视图由各实体页面
//! 以纯渲染函数注入，派生显示字段（货币、长日期、状态着色）都经
//! 共享格式化工具计算。

use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::de::DeserializeOwned;

use crate::api::ApiError;
use crate::auth::use_session;
use crate::components::feedback::{ErrorAlert, LoadingPanel, NotFoundPanel};
use crate::components::icons::ChevronLeft;
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[derive(Clone, PartialEq)]
pub enum DetailState<T> {
    Loading,
    NotFound,
    Error(String),
    Loaded(T),
}

#[component]
pub fn DetailPage<T>(
    /// 路由参数里的实体 id；路由变化会重建组件并重新抓取
    id: i64,
    /// API 资源路径
    resource: &'static str,
    #[prop(into)] title: String,
    /// 404 文案里的实体名（小写）
    entity_name: &'static str,
    /// 返回列表的落点
    back_to: AppRoute,
    /// 已加载实体的纯渲染函数
    render: fn(&T) -> AnyView,
) -> impl IntoView
where
    T: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static,
{
    let session = use_session();
    let state = RwSignal::new(DetailState::<T>::Loading);

    Effect::new(move |_| {
        let api = session.state.get_untracked().api();
        spawn_local(async move {
            let next = match api.fetch_one::<T>(resource, id).await {
                Ok(entity) => DetailState::Loaded(entity),
                Err(ApiError::NotFound) => DetailState::NotFound,
                Err(e) => DetailState::Error(e.to_string()),
            };
            state.try_set(next);
        });
    });

    view! {
        <div class="space-y-4">
            <div class="flex items-center gap-2">
                <Link to=back_to class="btn btn-ghost btn-sm btn-square">
                    <ChevronLeft attr:class="h-4 w-4" />
                </Link>
                <h2 class="text-xl font-bold">{title}</h2>
            </div>
            {move || match state.get() {
                DetailState::Loading => view! { <LoadingPanel /> }.into_any(),
                DetailState::NotFound => view! { <NotFoundPanel what=entity_name /> }.into_any(),
                DetailState::Error(message) => view! {
                    <ErrorAlert message=Signal::derive(move || Some(message.clone())) />
                }
                .into_any(),
                DetailState::Loaded(entity) => render(&entity),
            }}
        </div>
    }
}

/// 详情卡片里的一行字段
#[component]
pub fn DetailRow(#[prop(into)] label: String, #[prop(into)] value: String) -> impl IntoView {
    view! {
        <div class="flex justify-between border-b border-base-200 py-2 last:border-none">
            <span class="text-base-content/60">{label}</span>
            <span class="font-medium text-right">{value}</span>
        </div>
    }
}
