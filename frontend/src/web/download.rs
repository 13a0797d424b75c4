//! 文件下载与弹出文档窗口
//!
//! 二进制响应（报告 PDF）经临时对象 URL 触发浏览器保存，触发后立即回收。
//! 工资单是服务端渲染好的 HTML，在新标签页打开；弹窗被拦截不是请求失败，
//! 调用方据此提示用户放行弹窗。

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// 弹出窗口被浏览器拦截
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupBlocked;

fn blob_url(parts: &js_sys::Array, mime: &str) -> Result<String, String> {
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(parts, &options)
        .map_err(|e| format!("{e:?}"))?;
    web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| format!("{e:?}"))
}

/// 把字节流保存为本地文件：临时 `<a download>` + 对象 URL，点击后立即回收 URL
pub fn save_bytes(bytes: &[u8], file_name: &str) -> Result<(), String> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&array);
    let url = blob_url(&parts, "application/octet-stream")?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "no document".to_string())?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

/// 在新标签页打开一份 HTML 文档。
/// 返回 `Err(PopupBlocked)` 时文档未展示，对象 URL 已回收。
pub fn open_html_document(html: &str) -> Result<(), PopupBlocked> {
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(html));
    let Ok(url) = blob_url(&parts, "text/html") else {
        return Err(PopupBlocked);
    };

    let opened = web_sys::window()
        .and_then(|w| w.open_with_url_and_target(&url, "_blank").ok())
        .flatten();

    match opened {
        Some(_) => {
            // 新窗口尚在加载，URL 延迟回收；回调闭包泄漏一次，量级可忽略
            let url_to_revoke = url.clone();
            let closure = Closure::<dyn Fn()>::new(move || {
                let _ = web_sys::Url::revoke_object_url(&url_to_revoke);
            });
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    10_000,
                );
            }
            closure.forget();
            Ok(())
        }
        None => {
            let _ = web_sys::Url::revoke_object_url(&url);
            Err(PopupBlocked)
        }
    }
}
