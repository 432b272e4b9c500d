//! Tokio driver for [`Poller`].
//!
//! Round-trips run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`]. The poller sits behind a [`Mutex`];
//! a trigger that finds it locked is skipped rather than queued, so at most
//! one round-trip is ever in flight.
//!
//! # Example
//!
//! ```no_run
//! use wtpc::{AsyncPoller, DesktopNotifier, Wtpc};
//! use wtpc::display::TerminalListener;
//!
//! #[tokio::main]
//! async fn main() -> wtpc::Result<()> {
//!     let poller = AsyncPoller::build(Wtpc::builder()).await?;
//!     let mut listener = TerminalListener::new(std::io::stdout());
//!     poller
//!         .run(&mut listener, &DesktopNotifier, async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     poller.close().await
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{Result, WtpcError};
use crate::notify::Notifier;
use crate::poller::{deliver, PollListener, PollOutcome, Poller};
use crate::WtpcBuilder;

pub struct AsyncPoller {
    inner: Arc<Mutex<Poller>>,
    interval: Duration,
}

impl AsyncPoller {
    /// Build the client on the blocking pool (the HTTP client owns its own
    /// runtime and must not be created on an async worker).
    pub async fn build(builder: WtpcBuilder) -> Result<Self> {
        tokio::task::spawn_blocking(move || {
            let poller = builder.build()?.into_poller();
            let interval = poller.interval();
            Ok(AsyncPoller {
                inner: Arc::new(Mutex::new(poller)),
                interval,
            })
        })
        .await
        .map_err(|e| WtpcError::Runtime(format!("task join error: {e}")))?
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one round-trip now. Returns [`PollOutcome::Skipped`] if another
    /// round-trip holds the poller.
    pub async fn check_now(&self) -> Result<PollOutcome> {
        let poller = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = match poller.try_lock() {
                Ok(mut guard) => guard.check_now(),
                Err(TryLockError::WouldBlock) => {
                    debug!(event = "wtpc.poll.trigger_ignored");
                    PollOutcome::Skipped
                }
                Err(TryLockError::Poisoned(_)) => {
                    return Err(WtpcError::Runtime("poller lock poisoned".into()));
                }
            };
            Ok(outcome)
        })
        .await
        .map_err(|e| WtpcError::Runtime(format!("task join error: {e}")))?
    }

    /// Poll on the fixed interval until `shutdown` resolves. The first tick
    /// fires immediately; ticks missed while a round-trip is in flight are
    /// dropped, not replayed.
    pub async fn run<F>(
        &self,
        listener: &mut dyn PollListener,
        notifier: &dyn Notifier,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut shutdown = std::pin::pin!(shutdown);

        info!(event = "wtpc.poll.started", interval_ms = self.interval.as_millis() as u64);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let outcome = match self.check_now().await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(event = "wtpc.poll.round_trip_failed", error = %e);
                            PollOutcome::Failed(e)
                        }
                    };
                    deliver(&outcome, listener, notifier);
                }
            }
        }
        info!(event = "wtpc.poll.stopped");
        Ok(())
    }

    /// Current last known price, read without triggering a poll.
    pub async fn last_price(&self) -> Result<Option<u64>> {
        let poller = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let price = poller
                .lock()
                .map_err(|_| WtpcError::Runtime("poller lock poisoned".into()))?
                .last_price();
            Ok(price)
        })
        .await
        .map_err(|e| WtpcError::Runtime(format!("task join error: {e}")))?
    }

    /// Release the poller and its HTTP client on the blocking pool.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || drop(self.inner))
            .await
            .map_err(|e| WtpcError::Runtime(format!("task join error: {e}")))
    }
}
