use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TokenState: cached OAuth access token
// ---------------------------------------------------------------------------

/// The cached bearer token and its expiry. Both fields are optional because
/// the store may hold nothing, or a half-written record from an older run.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    /// A freshly issued token valid for `expires_in_secs` from `issued_at`.
    ///
    /// Returns `None` when the expiry does not fit in a timestamp.
    pub fn issued(
        access_token: String,
        issued_at: DateTime<Utc>,
        expires_in_secs: i64,
    ) -> Option<Self> {
        let expires_at = Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))?;
        Some(Self {
            access_token: Some(access_token),
            expires_at: Some(expires_at),
        })
    }

    /// The access token, if present and strictly unexpired at `now`.
    /// A token without an expiry is never trusted.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at)) if expires_at > now && !token.is_empty() => {
                Some(token.as_str())
            }
            _ => None,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_token(now).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.expires_at.is_none()
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
