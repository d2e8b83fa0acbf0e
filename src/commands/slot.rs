//! Tauri Readiness Slot
//!
//! The backend is usable once `window.__TAURI__.core.invoke` is a function.
//! The host also dispatches a one-shot DOM event on `document` when the
//! backend finished initializing.

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use js_sys::Reflect;
use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use super::TauriBackend;
use crate::backend::BackendHandle;
use crate::components::{Announcement, ReadinessSlot};

pub struct TauriSlot {
    ready: Announcement,
}

impl TauriSlot {
    /// Registers the one `document` listener for `ready_event`
    pub fn new(ready_event: impl Into<String>) -> Self {
        let ready_event = ready_event.into();
        let (tx, ready) = Announcement::channel();
        if !listen_once(&ready_event, tx) {
            debug!("[BIND] could not listen for {}", ready_event);
        }
        Self { ready }
    }
}

fn listen_once(event: &str, tx: oneshot::Sender<()>) -> bool {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return false;
    };
    let callback = Closure::once_into_js(move |_: web_sys::Event| {
        let _ = tx.send(());
    });
    let options = web_sys::AddEventListenerOptions::new();
    options.set_once(true);
    document
        .add_event_listener_with_callback_and_add_event_listener_options(event, callback.unchecked_ref(), &options)
        .is_ok()
}

fn invoke_fn() -> Option<JsValue> {
    let window = web_sys::window()?;
    let tauri = Reflect::get(&window, &JsValue::from_str("__TAURI__")).ok()?;
    let core = Reflect::get(&tauri, &JsValue::from_str("core")).ok()?;
    Reflect::get(&core, &JsValue::from_str("invoke")).ok()
}

impl ReadinessSlot for TauriSlot {
    fn probe(&self) -> Option<BackendHandle> {
        invoke_fn().filter(|f| f.is_function()).map(|_| TauriBackend::handle())
    }

    fn notified(&self) -> LocalBoxFuture<'static, ()> {
        self.ready.wait()
    }
}
