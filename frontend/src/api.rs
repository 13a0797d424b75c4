//! REST API 客户端
//!
//! 所有网络请求的唯一出入口：统一加 Bearer 头、统一超时、统一信封解码。
//! 集合端点解析 `Paginated<T>`，详情/创建/更新解析裸实体，不做任何
//! 备选形状的兜底解析。错误归一到 [`ApiError`]，422 的字段错误保留
//! 键控形式，供表单直接合入自己的错误状态。

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use stationops_shared::{
    API_BASE_PATH, EarningsRow, Employee, HEADER_AUTHORIZATION, ListQuery, LoginRequest,
    LoginResponse, Paginated, PayDay, PayStubRequest, PayrollReport, ProcessReportRequest, User,
    ValidationPayload,
};

/// 客户端超时；超过即中止请求并以通用错误态呈现
pub const REQUEST_TIMEOUT_MS: u32 = 15_000;

// =========================================================
// 资源路径 (Resource Paths)
// =========================================================

pub mod resources {
    pub const SALES: &str = "/sales";
    pub const EMPLOYEES: &str = "/employees";
    pub const WORK_HOURS: &str = "/work-hours";
    pub const WORK_SCHEDULES: &str = "/work-schedules";
    pub const PAYROLL_REPORTS: &str = "/payroll-reports";
    pub const PAYROLLS: &str = "/payrolls";
    pub const PROVIDERS: &str = "/providers";
    pub const PROVIDER_BILLS: &str = "/provider-bills";
    pub const OWNERS: &str = "/owners";
    pub const OWNER_EQUITY: &str = "/owner-equity";
}

// =========================================================
// 错误分类 (Error Taxonomy)
// =========================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("The request timed out. Please try again.")]
    Timeout,
    #[error("Your session has expired. Please sign in again.")]
    Unauthorized,
    #[error("Record not found.")]
    NotFound,
    #[error("{message}")]
    Validation {
        message: String,
        errors: HashMap<String, Vec<String>>,
    },
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// 422 的字段错误；其余错误类别没有键控信息
    pub fn field_errors(&self) -> Option<&HashMap<String, Vec<String>>> {
        match self {
            ApiError::Validation { errors, .. } if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }
}

// =========================================================
// 超时守卫 (Request Timeout)
// =========================================================

/// 计时触发则 abort 对应的 fetch；正常完成时 drop 清除计时器
struct TimeoutGuard {
    fired: Rc<Cell<bool>>,
    handle: Option<i32>,
}

impl TimeoutGuard {
    fn arm(controller: &web_sys::AbortController, millis: u32) -> Self {
        let fired = Rc::new(Cell::new(false));
        let fired_flag = fired.clone();
        let controller = controller.clone();
        let closure = Closure::once(move || {
            fired_flag.set(true);
            controller.abort();
        });
        let handle = web_sys::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis as i32,
            )
            .ok()
        });
        // 计时器触发前闭包必须保活；未触发的场景由 clear_timeout 兜底
        closure.forget();
        Self { fired, handle }
    }

    fn timed_out(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
    }
}

// =========================================================
// 过期响应守卫 (Stale Response Guard)
// =========================================================

/// 代际戳：每次发起抓取前 `begin`，响应落地时用当时的戳对
/// `is_current` 比对，慢的旧响应直接丢弃，不会覆盖新结果。
#[derive(Clone, Default)]
pub struct FetchGuard {
    generation: Arc<AtomicU64>,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 宣告一次新的抓取，使所有在途响应过期
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn is_current(&self, stamp: u64) -> bool {
        self.generation.load(Ordering::Relaxed) == stamp
    }
}

// =========================================================
// 客户端 (Client)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            base_url: API_BASE_PATH.to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header(HEADER_AUTHORIZATION, &format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(&self, request: Request, guard: &TimeoutGuard) -> Result<Response, ApiError> {
        match request.send().await {
            Ok(response) => Ok(response),
            Err(_) if guard.timed_out() => Err(ApiError::Timeout),
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// 非 2xx 状态归类；422 读取键控字段错误
    async fn check_status(response: &Response) -> Result<(), ApiError> {
        if response.ok() {
            return Ok(());
        }
        match response.status() {
            401 => Err(ApiError::Unauthorized),
            404 => Err(ApiError::NotFound),
            422 => {
                let payload: ValidationPayload = response.json().await.unwrap_or_default();
                let message = if payload.message.is_empty() {
                    "The submitted data is invalid.".to_string()
                } else {
                    payload.message
                };
                Err(ApiError::Validation {
                    message,
                    errors: payload.errors,
                })
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(ApiError::Server { status, message })
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        Self::check_status(&response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Network(format!("Invalid response body: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let controller = web_sys::AbortController::new()
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
        let guard = TimeoutGuard::arm(&controller, REQUEST_TIMEOUT_MS);
        let request = self
            .authorize(Request::get(&self.url(path)))
            .abort_signal(Some(&controller.signal()))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = self.send(request, &guard).await?;
        Self::decode(response).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: fn(&str) -> RequestBuilder,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let controller = web_sys::AbortController::new()
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
        let guard = TimeoutGuard::arm(&controller, REQUEST_TIMEOUT_MS);
        let request = self
            .authorize(method(&self.url(path)))
            .abort_signal(Some(&controller.signal()))
            .json(body)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = self.send(request, &guard).await?;
        Self::decode(response).await
    }

    async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: fn(&str) -> RequestBuilder,
        path: &str,
        form: web_sys::FormData,
    ) -> Result<T, ApiError> {
        let controller = web_sys::AbortController::new()
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
        let guard = TimeoutGuard::arm(&controller, REQUEST_TIMEOUT_MS);
        // multipart 边界由浏览器生成，不手动设置 Content-Type
        let request = self
            .authorize(method(&self.url(path)))
            .abort_signal(Some(&controller.signal()))
            .body(form)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = self.send(request, &guard).await?;
        Self::decode(response).await
    }

    // =========================================================
    // 通用资源 CRUD (Generic Resource CRUD)
    // =========================================================

    /// 集合抓取，统一分页信封
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &ListQuery,
    ) -> Result<Paginated<T>, ApiError> {
        let path = format!("{resource}{}", query.to_query_string());
        self.get_json(&path).await
    }

    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: i64,
    ) -> Result<T, ApiError> {
        self.get_json(&format!("{resource}/{id}")).await
    }

    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Request::post, resource, body).await
    }

    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &str,
        id: i64,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Request::put, &format!("{resource}/{id}"), body)
            .await
    }

    pub async fn remove(&self, resource: &str, id: i64) -> Result<(), ApiError> {
        let controller = web_sys::AbortController::new()
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
        let guard = TimeoutGuard::arm(&controller, REQUEST_TIMEOUT_MS);
        let request = self
            .authorize(Request::delete(&self.url(&format!("{resource}/{id}"))))
            .abort_signal(Some(&controller.signal()))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = self.send(request, &guard).await?;
        Self::check_status(&response).await
    }

    // =========================================================
    // 认证 (Auth)
    // =========================================================

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.send_json(Request::post, "/auth/login", credentials)
            .await
    }

    /// 登出端点是尽力而为的：调用方无论结果如何都会清掉本地会话
    pub async fn logout(&self) -> Result<(), ApiError> {
        let controller = web_sys::AbortController::new()
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
        let guard = TimeoutGuard::arm(&controller, REQUEST_TIMEOUT_MS);
        let request = self
            .authorize(Request::post(&self.url("/auth/logout")))
            .abort_signal(Some(&controller.signal()))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = self.send(request, &guard).await?;
        Self::check_status(&response).await
    }

    /// 会话回放：用持久化 token 换当前用户
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get_json("/auth/me").await
    }

    // =========================================================
    // 员工动作端点 (Employee Actions)
    // =========================================================

    /// 员工创建走 multipart：字段与入职文档一次提交
    pub async fn create_employee(&self, form: web_sys::FormData) -> Result<Employee, ApiError> {
        self.send_multipart(Request::post, resources::EMPLOYEES, form)
            .await
    }

    pub async fn update_employee(
        &self,
        id: i64,
        form: web_sys::FormData,
    ) -> Result<Employee, ApiError> {
        self.send_multipart(Request::put, &format!("{}/{id}", resources::EMPLOYEES), form)
            .await
    }

    pub async fn pay_days(&self) -> Result<Vec<PayDay>, ApiError> {
        self.get_json("/employees/pay-days").await
    }

    pub async fn earnings(&self, employee_id: i64, pay_date: &str) -> Result<Vec<EarningsRow>, ApiError> {
        self.get_json(&format!(
            "/employees/earnings?employee_id={employee_id}&pay_date={pay_date}"
        ))
        .await
    }

    /// 服务端渲染工资单，返回 HTML 文档文本
    pub async fn render_pay_stub(&self, request: &PayStubRequest) -> Result<String, ApiError> {
        let controller = web_sys::AbortController::new()
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
        let guard = TimeoutGuard::arm(&controller, REQUEST_TIMEOUT_MS);
        let http_request = self
            .authorize(Request::post(&self.url("/employees/pay-stubs")))
            .abort_signal(Some(&controller.signal()))
            .json(request)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = self.send(http_request, &guard).await?;
        Self::check_status(&response).await?;
        response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    // =========================================================
    // 薪资报告动作端点 (Payroll Report Actions)
    // =========================================================

    /// PDF 上传，multipart：文件 + 期间文本
    pub async fn upload_payroll_report(
        &self,
        form: web_sys::FormData,
    ) -> Result<PayrollReport, ApiError> {
        self.send_multipart(Request::post, resources::PAYROLL_REPORTS, form)
            .await
    }

    /// 批量持久化整批解析记录；客户端视角一次请求、一个成败
    pub async fn process_payroll_report(
        &self,
        id: i64,
        request: &ProcessReportRequest,
    ) -> Result<PayrollReport, ApiError> {
        self.send_json(
            Request::post,
            &format!("{}/{id}/process", resources::PAYROLL_REPORTS),
            request,
        )
        .await
    }

    pub async fn download_payroll_report(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        let controller = web_sys::AbortController::new()
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
        let guard = TimeoutGuard::arm(&controller, REQUEST_TIMEOUT_MS);
        let request = self
            .authorize(Request::get(
                &self.url(&format!("{}/{id}/download", resources::PAYROLL_REPORTS)),
            ))
            .abort_signal(Some(&controller.signal()))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = self.send(request, &guard).await?;
        Self::check_status(&response).await?;
        response
            .binary()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_guard_discards_superseded_stamps() {
        let guard = FetchGuard::new();
        let first = guard.begin();
        let second = guard.begin();
        // 旧响应此时落地应被丢弃
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn fetch_guard_clones_share_one_generation() {
        let guard = FetchGuard::new();
        let stamp = guard.begin();
        let clone = guard.clone();
        assert!(clone.is_current(stamp));
        clone.begin();
        assert!(!guard.is_current(stamp));
    }

    #[test]
    fn field_errors_only_surface_for_validation() {
        let mut errors = HashMap::new();
        errors.insert("pay_date".to_string(), vec!["Required.".to_string()]);
        let validation = ApiError::Validation {
            message: "invalid".into(),
            errors,
        };
        assert!(validation.field_errors().is_some());
        assert!(ApiError::NotFound.field_errors().is_none());
        let empty = ApiError::Validation {
            message: "invalid".into(),
            errors: HashMap::new(),
        };
        assert!(empty.field_errors().is_none());
    }
}
