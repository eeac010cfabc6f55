//! Deferred and periodic work.
//!
//! - [`schedule_once`] runs a future once after a delay (vote expiry, grace
//!   removal).
//! - [`ticker`] runs a closure every period until cancelled (member
//!   directory refresh).
//!
//! Both are spawned on the tokio runtime and cancellable through a
//! [`CancellationToken`]. Scheduled work must still be idempotent: a task
//! may already be running when it is cancelled.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Ticker period must be greater than zero")]
    ZeroPeriod,
}

/// Handle to a fire-once task.
pub struct ScheduledTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Prevent the task from firing. No-op if it already fired.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Run `task` once after `delay` unless cancelled first.
pub fn schedule_once<F>(delay: Duration, task: F) -> ScheduledTask
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();
    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = child.cancelled() => {
                debug!("Scheduled task cancelled before firing");
            }
            _ = tokio::time::sleep(delay) => {
                task.await;
            }
        }
    });
    ScheduledTask { token, handle }
}

/// Handle to a periodic task. Dropping it stops the ticker.
pub struct Ticker {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Call `tick` every `period`, first after one full period.
///
/// A panicking tick is logged and the ticker keeps running.
pub fn ticker<F, Fut>(period: Duration, mut tick: F) -> Result<Ticker, SchedulerError>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if period.is_zero() {
        return Err(SchedulerError::ZeroPeriod);
    }

    let token = CancellationToken::new();
    let child = token.clone();
    let handle = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = child.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(panic) = AssertUnwindSafe(tick()).catch_unwind().await {
                        error!("Ticker function panicked: {}", panic_message(panic.as_ref()));
                    }
                }
            }
        }
        debug!("Ticker stopped");
    });

    Ok(Ticker {
        token,
        handle: Some(handle),
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
