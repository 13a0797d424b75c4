//! StationOps 共享领域库
//!
//! 前端与后端契约共用的纯逻辑层，不依赖 DOM 或 web_sys：
//! - `models`: 领域实体（员工、工时、薪资、账单等）
//! - `protocol`: API 请求/响应类型与统一分页信封
//! - `hours` / `payperiod` / `money` / `date`: 派生计算与格式化工具

pub mod date;
pub mod hours;
pub mod models;
pub mod money;
pub mod payperiod;
pub mod protocol;

pub use models::*;
pub use protocol::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// API 根路径，所有资源端点挂在其下
pub const API_BASE_PATH: &str = "/api";

/// Bearer token 的请求头名称
pub const HEADER_AUTHORIZATION: &str = "Authorization";
