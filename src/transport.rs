//! Blocking HTTP seam used by the token manager and the price fetcher.
//!
//! Implementations only fail for connection-level problems (DNS, TLS,
//! timeouts). Any HTTP response, whatever its status, is returned as an
//! [`HttpResponse`] so that callers can apply their own status rules.

use crate::error::Result;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::trace;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Best human-readable description of a failed response.
    ///
    /// Prefers the error fields Battle.net puts in JSON bodies
    /// (`error_description`, `detail`, `error`), then the raw body, then the
    /// canonical reason phrase for the status code.
    pub fn error_message(&self) -> String {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&self.body) {
            let field = ["error_description", "detail", "error", "message"]
                .iter()
                .find_map(|key| json.get(*key).and_then(|v| v.as_str()));
            if let Some(message) = field {
                return message.to_string();
            }
        }

        let body = self.body.trim();
        if !body.is_empty() {
            return body.to_string();
        }

        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Minimal blocking HTTP client interface.
///
/// Any HTTP status is an `Ok` response. Only connection-level failures are
/// errors, reported as [`WtpcError::transport`](crate::WtpcError::transport).
pub trait HttpTransport {
    /// POST a form-encoded `body` to `url` with the given extra headers.
    fn post_form(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<HttpResponse>;

    /// GET `url` with the given extra headers.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by a blocking `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client whose requests fail with a transport error after
    /// `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wtpc/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_form(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<HttpResponse> {
        trace!(event = "wtpc.http.post", url = url);
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, crate::config::FORM_CONTENT_TYPE)
            .body(body.to_string());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send()?;
        let status = response.status().as_u16();
        Ok(HttpResponse::new(status, response.text()?))
    }

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        trace!(event = "wtpc.http.get", url = url);
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send()?;
        let status = response.status().as_u16();
        Ok(HttpResponse::new(status, response.text()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_oauth_description() {
        let response = HttpResponse::new(
            401,
            r#"{"error":"invalid_client","error_description":"Invalid client credentials"}"#,
        );
        assert_eq!(response.error_message(), "Invalid client credentials");
    }

    #[test]
    fn error_message_reads_api_detail() {
        let response = HttpResponse::new(
            404,
            r#"{"code":404,"type":"BLZWEBAPI00000404","detail":"Not Found"}"#,
        );
        assert_eq!(response.error_message(), "Not Found");
    }

    #[test]
    fn error_message_falls_back_to_body_then_reason() {
        assert_eq!(
            HttpResponse::new(502, "upstream exploded").error_message(),
            "upstream exploded"
        );
        assert_eq!(
            HttpResponse::new(503, "").error_message(),
            "Service Unavailable"
        );
    }

    #[test]
    fn only_200_is_ok() {
        assert!(HttpResponse::new(200, "").is_ok());
        assert!(!HttpResponse::new(204, "").is_ok());
    }
}
