//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 导航流程：请求 -> 守卫（认证 + 权限）-> 处理 -> 加载。
//! 受保护页面在守卫通过前不会挂载，自然也不会发出任何受保护的数据请求。

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::auth::SessionState;

use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（用于重定向与守卫修正）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入会话快照信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 注入的会话快照（认证 + 权限判定共用）
    session: Signal<SessionState>,
}

impl RouterService {
    fn new(session: Signal<SessionState>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            session,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **守卫判定**：返回目标路由实际应落到的路由
    fn resolve(&self, target: AppRoute) -> AppRoute {
        let session = self.session.get_untracked();

        if target.should_redirect_when_authenticated() && session.is_authenticated() {
            return AppRoute::auth_success_redirect();
        }

        if !target.requires_auth() {
            return target;
        }

        // 启动回放在途：先落在目标上，会话变化的 Effect 会再次执行守卫
        if session.is_loading {
            return target;
        }

        if !session.is_authenticated() {
            web_sys::console::log_1(&"[Router] Access denied. Redirecting to login.".into());
            return AppRoute::auth_failure_redirect();
        }

        if !session.allows(target.permission()) {
            web_sys::console::log_1(
                &"[Router] Missing permission. Redirecting to dashboard.".into(),
            );
            return AppRoute::auth_success_redirect();
        }

        target
    }

    /// 导航到指定路径（经守卫）
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    /// 导航到指定路由（经守卫）
    pub fn navigate_to(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    fn navigate_to_route(&self, target: AppRoute, use_push: bool) {
        let resolved = self.resolve(target);
        let path = resolved.to_path();
        if use_push {
            push_history_state(&path);
        } else {
            replace_history_state(&path);
        }
        self.set_route.set(resolved);
    }

    /// 初始化浏览器后退/前进按钮监听；popstate 时同样执行守卫
    fn init_popstate_listener(&self) {
        let this = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            let resolved = this.resolve(target);
            if resolved != target {
                replace_history_state(&resolved.to_path());
            }
            this.set_route.set(resolved);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话变化（登录、登出、回放完成）时重新守卫当前路由
    fn setup_session_redirect(&self) {
        let this = *self;

        Effect::new(move |_| {
            // 订阅会话信号；resolve 内部用 untracked 读以免重复订阅
            let _ = this.session.get();
            let route = this.current_route.get_untracked();
            let resolved = this.resolve(route);
            if resolved != route {
                replace_history_state(&resolved.to_path());
                this.set_route.set(resolved);
            }
        });
    }

    /// 页面挂载后把守卫修正过的初始路径同步回地址栏
    fn normalize_initial_path(&self) {
        let route = self.current_route.get_untracked();
        let resolved = self.resolve(route);
        let path = resolved.to_path();
        if path != current_path() {
            replace_history_state(&path);
        }
        if resolved != route {
            self.set_route.set(resolved);
        }
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: Signal<SessionState>) -> RouterService {
    let router = RouterService::new(session);

    router.normalize_initial_path();
    router.init_popstate_listener();
    router.setup_session_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(AppRoute) + Clone {
    let router = use_router();
    move |to: AppRoute| {
        router.navigate_to(to);
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件：提供路由上下文，应在 App 根部使用
#[component]
pub fn Router(
    /// 会话快照信号
    session: Signal<SessionState>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 路由出口组件：根据当前路由状态渲染对应的组件
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 应用内链接：拦截点击走 History API，不触发整页刷新
#[component]
pub fn Link(
    /// 目标路由
    to: AppRoute,
    /// 附加 class
    #[prop(into, optional)]
    class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let href = to.to_path();
    let on_click = move |ev: leptos::web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate_to(to);
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
