//! OAuth client-credentials token management.

use std::cell::RefCell;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{Result, WtpcError};
use crate::models::TokenState;
use crate::settings::SettingsStore;
use crate::transport::HttpTransport;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// `Basic <base64(client_id:client_secret)>` header value.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let raw = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(raw.as_bytes()))
}

// ---------------------------------------------------------------------------
// TokenManager
// ---------------------------------------------------------------------------

/// Obtains and caches OAuth bearer tokens.
///
/// Borrows the settings store (credentials in, token out) and the transport
/// for the lifetime of the wrapper. It is the only writer of the cached
/// [`TokenState`].
pub struct TokenManager<'a> {
    store: &'a RefCell<SettingsStore>,
    transport: &'a dyn HttpTransport,
}

impl<'a> TokenManager<'a> {
    pub fn new(store: &'a RefCell<SettingsStore>, transport: &'a dyn HttpTransport) -> Self {
        Self { store, transport }
    }

    /// Return the cached token if it is still valid, otherwise exchange the
    /// stored credentials for a new one.
    pub fn ensure_token(&self) -> Result<TokenState> {
        let cached = self.store.borrow().token_state();
        if cached.is_valid_at(Utc::now()) {
            debug!(event = "wtpc.token.cache_hit", expires_at = ?cached.expires_at);
            return Ok(cached);
        }
        self.refresh_token()
    }

    /// Unconditionally perform the client-credentials exchange and persist
    /// the result. Non-200 responses are returned as [`WtpcError::Auth`]
    /// without retrying.
    pub fn refresh_token(&self) -> Result<TokenState> {
        let credentials = self.store.borrow().credentials();
        if !credentials.is_complete() {
            return Err(WtpcError::MissingCredentials);
        }

        info!(event = "wtpc.token.refresh_started", client_id = %credentials.client_id);

        let authorization = basic_auth_header(&credentials.client_id, &credentials.client_secret);
        let response = self.transport.post_form(
            config::OAUTH_URL,
            &[("Authorization", authorization.as_str())],
            config::GRANT_TYPE_BODY,
        )?;

        if !response.is_ok() {
            let message = response.error_message();
            warn!(
                event = "wtpc.token.refresh_failed",
                status = response.status,
                message = %message,
            );
            return Err(WtpcError::Auth {
                status: response.status,
                message,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body)?;
        let state = TokenState::issued(parsed.access_token, Utc::now(), parsed.expires_in)
            .ok_or_else(|| {
                warn!(
                    event = "wtpc.token.refresh_failed",
                    expires_in = parsed.expires_in,
                    message = "expires_in out of range",
                );
                WtpcError::Auth {
                    status: response.status,
                    message: format!("expires_in out of range: {}", parsed.expires_in),
                }
            })?;
        self.store.borrow_mut().set_token_state(state.clone())?;

        info!(event = "wtpc.token.refresh_completed", expires_at = ?state.expires_at);
        Ok(state)
    }

    /// Forget the cached token so the next [`ensure_token`](Self::ensure_token)
    /// re-authenticates.
    pub fn invalidate(&self) -> Result<()> {
        self.store.borrow_mut().clear_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_encodes_id_and_secret() {
        assert_eq!(basic_auth_header("id", "secret"), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn token_response_ignores_extra_fields() {
        let body = r#"{"access_token":"abc","token_type":"bearer","expires_in":86399,"sub":"x"}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, 86399);
    }
}
