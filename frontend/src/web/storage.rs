//! LocalStorage 封装模块
//!
//! 会话 token 与用户快照的持久化都走这里。结构化值以 JSON 字符串落盘，
//! 编解码失败按“键不存在”处理——坏快照只会让启动多发一次 profile 请求。

use serde::{Serialize, de::DeserializeOwned};

use crate::serde_helper;

/// 本地存储操作封装
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值；键不存在或发生错误时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，返回操作是否成功
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除存储的键值对
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }

    /// 读取并反序列化 JSON 值
    pub fn get_json<T: DeserializeOwned>(key: &str) -> Option<T> {
        let raw = Self::get(key)?;
        serde_helper::from_json_string(&raw).ok()
    }

    /// 序列化并写入 JSON 值
    pub fn set_json<T: Serialize>(key: &str, value: &T) -> bool {
        match serde_helper::to_json_string(value) {
            Ok(raw) => Self::set(key, &raw),
            Err(_) => false,
        }
    }
}
