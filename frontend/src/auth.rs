//! 认证模块
//!
//! 管理会话状态，与路由系统解耦；路由服务通过注入的会话信号执行守卫。
//!
//! 状态机：
//!
//! | 当前           | 事件                       | 下一状态                  |
//! |----------------|----------------------------|---------------------------|
//! | 未认证         | 登录成功                   | 已认证                    |
//! | 未认证         | 持久化 token + profile 成功 | 已认证                    |
//! | 认证中         | profile 失败               | 未认证（token 一并清除）  |
//! | 已认证         | 登出（服务端尽力而为）     | 未认证                    |
//!
//! 不变式：`token` 存在时要么 `user` 已就位，要么 profile 请求在途。
//! 启动回放只发一次 profile 请求；失败即清掉持久化 token，不变式
//! 因此跨刷新也不会被破坏。`is_loading` 仅在无缓存用户快照、
//! 回放请求在途时为真。

use leptos::prelude::*;
use leptos::task::spawn_local;

use stationops_shared::{LoginRequest, User};

use crate::api::{ApiClient, ApiError};
use crate::web::LocalStorage;
use crate::web::route::Access;

const STORAGE_TOKEN_KEY: &str = "stationops_token";
const STORAGE_USER_KEY: &str = "stationops_user";

/// 会话状态
#[derive(Clone, Default, PartialEq)]
pub struct SessionState {
    /// 当前用户（已认证的判据）
    pub user: Option<User>,
    /// Bearer token（随所有已认证请求发送）
    pub token: Option<String>,
    /// 启动回放在途且无缓存用户时为真
    pub is_loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// 以当前 token 构造 API 客户端
    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.token.clone())
    }

    /// 路由守卫与行级按钮共用的权限谓词
    pub fn allows(&self, access: Option<Access>) -> bool {
        let Some(user) = &self.user else {
            return false;
        };
        match access {
            None => true,
            Some(Access::NotStaff) => !user.is_staff(),
            Some(Access::Admin) => user.is_admin(),
            Some(Access::ManageUsers) => user.is_admin() || user.can_manage_users,
        }
    }
}

/// 会话上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct SessionContext {
    pub state: ReadSignal<SessionState>,
    pub set_state: WriteSignal<SessionState>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (state, set_state) = signal(SessionState::default());
        Self { state, set_state }
    }

    /// 供路由服务注入的快照信号
    pub fn snapshot_signal(&self) -> Signal<SessionState> {
        self.state.into()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取会话上下文
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().expect("SessionContext should be provided")
}

/// 启动回放：持久化 token 存在时，恢复缓存用户快照并发起
/// **恰好一次** profile 请求；失败则清除 token 强制登出。
pub fn init_session(ctx: &SessionContext) {
    let Some(token) = LocalStorage::get(STORAGE_TOKEN_KEY) else {
        ctx.set_state.set(SessionState::default());
        return;
    };

    let cached_user: Option<User> = LocalStorage::get_json(STORAGE_USER_KEY);
    let has_cache = cached_user.is_some();

    ctx.set_state.set(SessionState {
        user: cached_user,
        token: Some(token.clone()),
        is_loading: !has_cache,
    });

    let set_state = ctx.set_state;
    spawn_local(async move {
        match ApiClient::new(Some(token.clone())).profile().await {
            Ok(user) => {
                LocalStorage::set_json(STORAGE_USER_KEY, &user);
                set_state.set(SessionState {
                    user: Some(user),
                    token: Some(token),
                    is_loading: false,
                });
            }
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("[Auth] Session replay failed, signing out: {e}").into(),
                );
                LocalStorage::delete(STORAGE_TOKEN_KEY);
                LocalStorage::delete(STORAGE_USER_KEY);
                set_state.set(SessionState::default());
            }
        }
    });
}

/// 登录并持久化会话
pub async fn login(ctx: &SessionContext, email: String, password: String) -> Result<(), ApiError> {
    let response = ApiClient::new(None)
        .login(&LoginRequest { email, password })
        .await?;

    LocalStorage::set(STORAGE_TOKEN_KEY, &response.token);
    LocalStorage::set_json(STORAGE_USER_KEY, &response.user);

    ctx.set_state.set(SessionState {
        user: Some(response.user),
        token: Some(response.token),
        is_loading: false,
    });
    Ok(())
}

/// 登出：本地会话无条件清除，服务端调用尽力而为。
/// 导航由路由服务监听会话变化自动完成。
pub fn logout(ctx: &SessionContext) {
    let api = ctx.state.get_untracked().api();
    spawn_local(async move {
        let _ = api.logout().await;
    });

    LocalStorage::delete(STORAGE_TOKEN_KEY);
    LocalStorage::delete(STORAGE_USER_KEY);
    ctx.set_state.set(SessionState::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use stationops_shared::Role;

    fn user(role: Role, can_manage_users: bool) -> SessionState {
        SessionState {
            user: Some(User {
                id: 1,
                name: "Test".into(),
                email: "t@example.com".into(),
                role,
                can_manage_users,
            }),
            token: Some("token".into()),
            is_loading: false,
        }
    }

    #[test]
    fn anonymous_session_allows_nothing() {
        let session = SessionState::default();
        assert!(!session.allows(None));
        assert!(!session.allows(Some(Access::NotStaff)));
    }

    #[test]
    fn untagged_routes_need_only_a_user() {
        assert!(user(Role::Staff, false).allows(None));
    }

    #[test]
    fn staff_are_blocked_from_not_staff_routes() {
        assert!(!user(Role::Staff, false).allows(Some(Access::NotStaff)));
        assert!(user(Role::Manager, false).allows(Some(Access::NotStaff)));
        assert!(user(Role::Admin, false).allows(Some(Access::NotStaff)));
    }

    #[test]
    fn admin_routes_require_admin() {
        assert!(!user(Role::Manager, false).allows(Some(Access::Admin)));
        assert!(user(Role::Admin, false).allows(Some(Access::Admin)));
    }

    #[test]
    fn manage_users_honours_flag_or_admin() {
        assert!(user(Role::Admin, false).allows(Some(Access::ManageUsers)));
        assert!(user(Role::Manager, true).allows(Some(Access::ManageUsers)));
        assert!(!user(Role::Manager, false).allows(Some(Access::ManageUsers)));
    }

    #[test]
    fn row_action_predicates_follow_role() {
        let admin = user(Role::Admin, false).user.unwrap();
        let manager = user(Role::Manager, false).user.unwrap();
        let staff = user(Role::Staff, false).user.unwrap();

        assert!(admin.can_delete());
        assert!(!manager.can_delete());
        assert!(manager.can_update() && manager.can_create());
        assert!(!staff.can_create() && !staff.can_update() && !staff.can_delete());
    }
}
