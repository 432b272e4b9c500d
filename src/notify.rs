//! Price-change notifications.
//!
//! The decision of whether to notify lives here alongside the message
//! format; delivery goes through the [`Notifier`] trait. Delivery is
//! best-effort: failures are logged but never propagate.

use crate::display::format_price;
use tracing::{info, warn};

#[cfg(not(target_os = "macos"))]
use tracing::debug;

/// Returns `true` if a change notification should be raised.
///
/// The first successful sample after start-up only populates the display,
/// so it never notifies even when the price differs from the initial value.
pub fn should_notify(notify_on_change: bool, has_changed: bool, is_first_sample: bool) -> bool {
    notify_on_change && has_changed && !is_first_sample
}

pub fn format_notification_message(price: u64) -> String {
    format!("Current Price: {}", format_price(price))
}

/// Delivers a notification to the user.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _message: &str) {}
}

/// Platform-native desktop notifications.
///
/// - macOS: `osascript` (Notification Center)
/// - Linux: `notify-send` (requires libnotify)
/// - Other: no-op
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!(event = "wtpc.notify.send_started", title = title);
        send_platform_notification(title, message);
    }
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn log_command_result(title: &str, result: std::io::Result<std::process::Output>) {
    match result {
        Ok(output) if output.status.success() => {
            info!(event = "wtpc.notify.send_completed", title = title);
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(event = "wtpc.notify.send_failed", title = title, stderr = %stderr);
        }
        Err(e) => {
            warn!(event = "wtpc.notify.send_failed", title = title, error = %e);
        }
    }
}

#[cfg(target_os = "macos")]
fn send_platform_notification(title: &str, message: &str) {
    let script = format!(
        r#"display notification "{}" with title "{}""#,
        applescript_escape(message),
        applescript_escape(title)
    );

    let result = std::process::Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output();
    log_command_result(title, result);
}

#[cfg(target_os = "macos")]
fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(target_os = "linux")]
fn send_platform_notification(title: &str, message: &str) {
    match which::which("notify-send") {
        Ok(_) => {}
        Err(which::Error::CannotFindBinaryPath) => {
            debug!(event = "wtpc.notify.send_skipped", reason = "notify-send not found");
            return;
        }
        Err(e) => {
            warn!(event = "wtpc.notify.send_failed", title = title, error = %e);
            return;
        }
    }

    let result = std::process::Command::new("notify-send")
        .arg("--app-name")
        .arg(crate::config::APP_DISPLAY_NAME)
        .arg(title)
        .arg(message)
        .output();
    log_command_result(title, result);
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn send_platform_notification(_title: &str, _message: &str) {
    debug!(event = "wtpc.notify.send_skipped", reason = "unsupported platform");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_on_change_after_first_sample() {
        assert!(should_notify(true, true, false));
    }

    #[test]
    fn first_sample_never_notifies() {
        assert!(!should_notify(true, true, true));
    }

    #[test]
    fn unchanged_price_does_not_notify() {
        assert!(!should_notify(true, false, false));
    }

    #[test]
    fn disabled_preference_suppresses() {
        assert!(!should_notify(false, true, false));
    }

    #[test]
    fn message_uses_thousands_separators() {
        assert_eq!(format_notification_message(360_000), "Current Price: 360,000");
    }

    #[test]
    fn desktop_notifier_does_not_panic() {
        DesktopNotifier.notify("Current Price: 1", "WoW Token Price Checker");
    }
}
