//! Process-wide wheel.
//!
//! A thin layer over [`TimeWheel`] for programs that want a single shared
//! wheel reachable from anywhere. It is started explicitly, once, and after
//! [`stop`] it stays closed for the rest of the process.

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::WheelConfig;
use crate::error::WheelError;
use crate::tw::{TimeWheel, WheelHandle};

static GLOBAL: OnceLock<WheelHandle> = OnceLock::new();

/// Create and start the global wheel.
///
/// # Panics
/// Panics if called outside a Tokio runtime.
pub fn start(config: WheelConfig) -> Result<JoinHandle<()>, WheelError> {
    if GLOBAL.get().is_some() {
        return Err(WheelError::AlreadyStarted);
    }
    let (wheel, handle) = TimeWheel::new(config, CancellationToken::new())?;
    // Lost a race with another caller: the unstarted wheel is simply dropped.
    GLOBAL
        .set(handle)
        .map_err(|_| WheelError::AlreadyStarted)?;
    Ok(wheel.start())
}

pub fn handle() -> Result<&'static WheelHandle, WheelError> {
    GLOBAL.get().ok_or(WheelError::NotStarted)
}

/// Run `job` once after `delay`, replacing any pending job under `key`.
pub async fn delay<F>(delay: Duration, key: impl Into<String>, job: F) -> Result<(), WheelError>
where
    F: FnOnce() + Send + 'static,
{
    handle()?.schedule(delay, key, job).await
}

/// Spawn `job` once after `delay`, replacing any pending job under `key`.
pub async fn delay_async<Fut>(
    delay: Duration,
    key: impl Into<String>,
    job: Fut,
) -> Result<(), WheelError>
where
    Fut: Future<Output = ()> + Send + 'static,
{
    handle()?.schedule_async(delay, key, job).await
}

pub async fn remove(key: impl Into<String>) -> Result<(), WheelError> {
    handle()?.cancel(key).await
}

pub async fn stop() -> Result<(), WheelError> {
    handle()?.stop().await
}
