//! Platform Shims
//!
//! Timer and local-task primitives: gloo-timers / wasm-bindgen-futures in the
//! webview, tokio everywhere else. Native callers must run inside a
//! `tokio::task::LocalSet`.

use std::future::Future;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    // Fire-and-forget, same as the webview
    drop(tokio::task::spawn_local(future));
}
