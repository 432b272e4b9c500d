use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Result, WtpcError};

// ---------------------------------------------------------------------------
// TokenIndexResponse: raw body of the token index endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TokenIndexResponse {
    /// Price in copper.
    pub price: u64,
    /// Milliseconds since the Unix epoch.
    pub last_updated_timestamp: i64,
}

// ---------------------------------------------------------------------------
// PriceSample: one normalized observation of the token price
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceSample {
    /// Price in gold (raw copper value divided by 10,000).
    pub price: u64,
    /// When Blizzard last updated the index, truncated to whole seconds.
    pub observed_at: DateTime<Utc>,
}

impl PriceSample {
    /// Normalize a raw copper price and a millisecond timestamp.
    pub fn from_raw(raw_price: u64, last_updated_ms: i64) -> Result<Self> {
        let secs = last_updated_ms / 1000;
        let observed_at = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            WtpcError::InvalidArgument(format!(
                "last_updated_timestamp {} is out of range",
                last_updated_ms
            ))
        })?;
        Ok(Self {
            price: raw_price / config::PRICE_DIVISOR,
            observed_at,
        })
    }

    /// When the next index refresh is expected. Display hint only.
    pub fn next_expected_update(&self) -> DateTime<Utc> {
        self.observed_at + Duration::minutes(config::NEXT_UPDATE_MINUTES)
    }
}

impl TryFrom<TokenIndexResponse> for PriceSample {
    type Error = WtpcError;

    fn try_from(raw: TokenIndexResponse) -> Result<Self> {
        PriceSample::from_raw(raw.price, raw.last_updated_timestamp)
    }
}

// ---------------------------------------------------------------------------
// PriceUpdate: a sample plus the scheduler's change detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub sample: PriceSample,
    pub previous_price: Option<u64>,
    pub has_changed: bool,
    /// Formatted notification text when a notification should be raised.
    pub notification: Option<String>,
    pub next_expected_update: DateTime<Utc>,
}

impl PriceUpdate {
    pub fn should_notify(&self) -> bool {
        self.notification.is_some()
    }
}
