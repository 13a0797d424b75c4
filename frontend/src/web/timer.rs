//! 定时器封装模块
//!
//! 封装 `setTimeout`，为列表搜索框提供防抖：每次输入重置计时，
//! 静默一段时间后才把搜索词写进查询状态、触发一次网络请求。

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// 可重置的一次性定时器。重复 `schedule` 会取消未触发的前一次。
/// drop 时自动清除挂起的回调。
pub struct Debounce {
    millis: u32,
    handle: RefCell<Option<i32>>,
    // 回调触发前必须保活
    closure: RefCell<Option<Closure<dyn Fn()>>>,
}

impl Debounce {
    pub fn new(millis: u32) -> Self {
        Self {
            millis,
            handle: RefCell::new(None),
            closure: RefCell::new(None),
        }
    }

    /// 取消挂起的回调（若有）并重新计时
    pub fn schedule<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.cancel();

        let closure = Closure::new(callback);
        let handle = web_sys::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                self.millis as i32,
            )
            .ok()
        });

        *self.handle.borrow_mut() = handle;
        *self.closure.borrow_mut() = Some(closure);
    }

    /// 取消挂起的回调
    pub fn cancel(&self) {
        if let Some(handle) = self.handle.borrow_mut().take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
        self.closure.borrow_mut().take();
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}
