//! Authenticated requests against the regional token index endpoint.

use tracing::{debug, warn};

use crate::config;
use crate::error::{Result, WtpcError};
use crate::models::{PriceSample, Region, TokenIndexResponse, TokenState};
use crate::transport::HttpTransport;

/// Full token index URL for a region.
pub fn token_index_url(region: Region) -> String {
    format!("{}{}", region.api_host(), config::TOKEN_INDEX_PATH)
}

// ---------------------------------------------------------------------------
// PriceFetcher
// ---------------------------------------------------------------------------

/// Fetches the current WoW Token price for a region.
pub struct PriceFetcher<'a> {
    transport: &'a dyn HttpTransport,
}

impl<'a> PriceFetcher<'a> {
    pub fn new(transport: &'a dyn HttpTransport) -> Self {
        Self { transport }
    }

    /// Request the token index with `token` as the bearer credential.
    ///
    /// A 401 maps to [`WtpcError::Unauthorized`] so the caller can
    /// re-authenticate; every other non-200 maps to [`WtpcError::Api`].
    /// A token state without an access token is rejected as unauthorized
    /// without touching the network.
    pub fn fetch_price(&self, token: &TokenState, region: Region) -> Result<PriceSample> {
        let access_token = match token.access_token.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(WtpcError::Unauthorized),
        };

        let url = token_index_url(region);
        let bearer = format!("Bearer {}", access_token);
        let namespace = region.namespace();

        debug!(event = "wtpc.price.fetch_started", region = %region, url = %url);

        let response = self.transport.get(
            &url,
            &[
                ("Authorization", bearer.as_str()),
                (config::NAMESPACE_HEADER, namespace.as_str()),
            ],
        )?;

        match response.status {
            200 => {
                let raw: TokenIndexResponse = serde_json::from_str(&response.body)?;
                let sample = PriceSample::try_from(raw)?;
                debug!(
                    event = "wtpc.price.fetch_completed",
                    price = sample.price,
                    observed_at = %sample.observed_at,
                );
                Ok(sample)
            }
            401 => {
                warn!(event = "wtpc.price.fetch_unauthorized", region = %region);
                Err(WtpcError::Unauthorized)
            }
            status => {
                let message = response.error_message();
                warn!(
                    event = "wtpc.price.fetch_failed",
                    status = status,
                    message = %message,
                );
                Err(WtpcError::Api { status, message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_follows_region_host() {
        assert_eq!(
            token_index_url(Region::Eu),
            "https://eu.api.blizzard.com/data/wow/token/index"
        );
        assert_eq!(
            token_index_url(Region::Na),
            "https://us.api.blizzard.com/data/wow/token/index"
        );
    }
}
