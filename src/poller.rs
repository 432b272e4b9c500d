//! Poll scheduler: the token-refresh-and-fetch state machine.
//!
//! A [`Poller`] is either idle, waiting for its interval to elapse, or has
//! one round-trip in flight. A round-trip ensures a token, fetches the
//! price, and on a 401 forces exactly one re-authentication and retry.
//! Successful samples go through change detection before being handed to
//! the presentation layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::APP_DISPLAY_NAME;
use crate::error::{Result, WtpcError};
use crate::models::{PriceSample, PriceUpdate};
use crate::notify::{format_notification_message, should_notify, Notifier};
use crate::Wtpc;

/// Upper bound on how long [`Poller::run`] sleeps before re-checking its
/// stop flag.
const RUN_LOOP_GRANULARITY: Duration = Duration::from_millis(100);

/// Presentation callbacks.
pub trait PollListener {
    fn on_price_updated(&mut self, update: &PriceUpdate);
    fn on_error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    InFlight,
}

/// Terminal result of one trigger.
#[derive(Debug)]
pub enum PollOutcome {
    Updated(PriceUpdate),
    Failed(WtpcError),
    /// The trigger arrived while a round-trip was already in flight. Only the
    /// async driver produces this in practice.
    Skipped,
}

/// Route an outcome to the listener and, when the update asks for it, to
/// the notifier.
pub fn deliver(outcome: &PollOutcome, listener: &mut dyn PollListener, notifier: &dyn Notifier) {
    match outcome {
        PollOutcome::Updated(update) => {
            listener.on_price_updated(update);
            if let Some(message) = &update.notification {
                notifier.notify(message, APP_DISPLAY_NAME);
            }
        }
        PollOutcome::Failed(err) => listener.on_error(&err.to_string()),
        PollOutcome::Skipped => {}
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

pub struct Poller {
    client: Wtpc,
    state: PollState,
    last_price: Option<u64>,
    first_sample: bool,
    last_fired: Option<Instant>,
}

impl Poller {
    pub fn new(client: Wtpc) -> Self {
        Self {
            client,
            state: PollState::Idle,
            last_price: None,
            first_sample: true,
            last_fired: None,
        }
    }

    pub fn client(&self) -> &Wtpc {
        &self.client
    }

    /// Always [`PollState::Idle`] between calls: `check_now` holds `&mut
    /// self` for the whole round-trip, so InFlight is only observable from
    /// inside it (a listener or transport re-entering the poller).
    /// [`AsyncPoller`](crate::AsyncPoller) reports overlap as
    /// [`PollOutcome::Skipped`] through its lock instead.
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Last successfully observed price this process has seen.
    pub fn last_price(&self) -> Option<u64> {
        self.last_price
    }

    pub fn interval(&self) -> Duration {
        self.client.poll_interval()
    }

    /// Run one round-trip immediately, regardless of the timer.
    pub fn check_now(&mut self) -> PollOutcome {
        if self.state == PollState::InFlight {
            debug!(event = "wtpc.poll.trigger_ignored");
            return PollOutcome::Skipped;
        }

        self.state = PollState::InFlight;
        self.last_fired = Some(Instant::now());

        let outcome = match self.round_trip() {
            Ok(sample) => PollOutcome::Updated(self.record(sample)),
            Err(e) => {
                warn!(event = "wtpc.poll.round_trip_failed", error = %e, transient = e.is_transient());
                PollOutcome::Failed(e)
            }
        };

        self.state = PollState::Idle;
        outcome
    }

    /// Timer hook: runs a round-trip if none has run yet or the interval
    /// has elapsed since the last one started.
    pub fn tick(&mut self, now: Instant) -> Option<PollOutcome> {
        let due = match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval(),
        };
        if due {
            Some(self.check_now())
        } else {
            None
        }
    }

    /// Poll on the fixed interval until `stop` is set, delivering every
    /// outcome. The first round-trip runs immediately.
    pub fn run(&mut self, listener: &mut dyn PollListener, notifier: &dyn Notifier, stop: &AtomicBool) {
        info!(event = "wtpc.poll.started", interval_ms = self.interval().as_millis() as u64);
        while !stop.load(Ordering::Relaxed) {
            if let Some(outcome) = self.tick(Instant::now()) {
                deliver(&outcome, listener, notifier);
            }
            let wait = self
                .last_fired
                .map(|last| self.interval().saturating_sub(last.elapsed()))
                .unwrap_or_default();
            std::thread::sleep(wait.min(RUN_LOOP_GRANULARITY));
        }
        info!(event = "wtpc.poll.stopped");
    }

    fn round_trip(&self) -> Result<PriceSample> {
        let tokens = self.client.tokens();
        let prices = self.client.prices();
        let region = self.client.settings().credentials().region;

        let token = tokens.ensure_token()?;
        match prices.fetch_price(&token, region) {
            Err(WtpcError::Unauthorized) => {
                info!(event = "wtpc.poll.reauthenticating");
                let token = tokens.refresh_token()?;
                prices.fetch_price(&token, region)
            }
            other => other,
        }
    }

    fn record(&mut self, sample: PriceSample) -> PriceUpdate {
        let notify_on_change = self.client.settings().credentials().notify_on_change;
        let previous_price = self.last_price;
        let has_changed = previous_price != Some(sample.price);

        let notification = should_notify(notify_on_change, has_changed, self.first_sample)
            .then(|| format_notification_message(sample.price));

        self.first_sample = false;
        self.last_price = Some(sample.price);

        if has_changed {
            info!(
                event = "wtpc.poll.price_changed",
                price = sample.price,
                previous = ?previous_price,
                notify = notification.is_some(),
            );
        }

        PriceUpdate {
            next_expected_update: sample.next_expected_update(),
            sample,
            previous_price,
            has_changed,
            notification,
        }
    }
}
