//! Text formatting for the presentation layer, and a terminal listener that
//! renders poll results as lines of text.

use std::fmt::Display;
use std::io::Write;

use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::warn;

use crate::models::PriceUpdate;
use crate::poller::PollListener;

/// Format a gold amount with comma thousands separators (`350000` -> `350,000`).
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `Updated: <timestamp>` rendered in the given time zone.
pub fn format_updated<Tz>(observed_at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "Updated: {}",
        observed_at.with_timezone(tz).format("%Y-%m-%d %H:%M:%S")
    )
}

/// Countdown until the next expected index refresh: `[MM:SS]`, or
/// `[Waiting...]` once that time has passed.
pub fn format_countdown(next_expected_update: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = (next_expected_update - now).num_seconds();
    if remaining <= 0 {
        return "[Waiting...]".to_string();
    }
    format!("[{:02}:{:02}]", remaining / 60, remaining % 60)
}

// ---------------------------------------------------------------------------
// TerminalListener
// ---------------------------------------------------------------------------

/// [`PollListener`] that writes one line per outcome.
///
/// Price lines are only written when the price or its timestamp moves, so a
/// 2-second poll does not flood the terminal. Errors are always written,
/// and the next successful update is written even if unchanged so the user
/// can see the error has cleared.
pub struct TerminalListener<W: Write> {
    out: W,
    last_rendered: Option<(u64, DateTime<Utc>)>,
    showing_error: bool,
}

impl<W: Write> TerminalListener<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_rendered: None,
            showing_error: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!(event = "wtpc.display.write_failed", error = %e);
        }
    }
}

impl<W: Write> PollListener for TerminalListener<W> {
    fn on_price_updated(&mut self, update: &PriceUpdate) {
        let key = (update.sample.price, update.sample.observed_at);
        if self.last_rendered == Some(key) && !self.showing_error {
            return;
        }
        self.last_rendered = Some(key);
        self.showing_error = false;

        let line = format!(
            "{} {} gold | {} | next update {}",
            format_countdown(update.next_expected_update, Utc::now()),
            format_price(update.sample.price),
            format_updated(update.sample.observed_at, &Local),
            update.next_expected_update.with_timezone(&Local).format("%H:%M:%S"),
        );
        self.write_line(&line);
    }

    fn on_error(&mut self, message: &str) {
        self.showing_error = true;
        self.write_line(&format!("error: {}", message));
    }
}
