//! JSON 字符串序列化辅助
//!
//! LocalStorage 只能存字符串，会话快照等结构化数据经由这里编解码。
//! 使用 `serde-json-wasm` 以避免把完整的 `serde_json` 再拉进 WASM 体积。

use serde::{Serialize, de::DeserializeOwned};

/// 序列化为 JSON 字符串
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json_wasm::to_string(value).map_err(|e| e.to_string())
}

/// 从 JSON 字符串反序列化
pub fn from_json_string<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json_wasm::from_str(raw).map_err(|e| e.to_string())
}
