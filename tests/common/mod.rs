//! Shared test fixtures for the wtpc integration tests.
//!
//! Provides a scripted [`FakeTransport`] that records every request it
//! receives, plus helpers that build a [`Wtpc`] client on top of it with a
//! temporary data directory.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use wtpc::{Credentials, HttpResponse, HttpTransport, Region, Result, Wtpc, WtpcError};

pub const TS_MS: i64 = 1_700_000_000_000;

/// One request seen by the fake transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A scripted answer: a response, or a connection failure with this message.
type Scripted = std::result::Result<HttpResponse, String>;

#[derive(Default)]
struct FakeState {
    token_responses: VecDeque<Scripted>,
    price_responses: VecDeque<Scripted>,
    requests: Vec<RecordedRequest>,
}

/// Transport that answers from two queues: POSTs pop the token queue and
/// GETs pop the price queue. An empty queue answers 500 so that an
/// unexpected request shows up as a failure rather than a hang.
///
/// Clones share state, so a test can keep a handle after moving one clone
/// into the client.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_token(&self, response: HttpResponse) -> &Self {
        self.state.lock().unwrap().token_responses.push_back(Ok(response));
        self
    }

    pub fn push_token_failure(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .token_responses
            .push_back(Err(message.to_string()));
        self
    }

    pub fn push_price(&self, response: HttpResponse) -> &Self {
        self.state.lock().unwrap().price_responses.push_back(Ok(response));
        self
    }

    pub fn push_price_failure(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .price_responses
            .push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn token_calls(&self) -> usize {
        self.requests().iter().filter(|r| r.method == "POST").count()
    }

    pub fn price_calls(&self) -> usize {
        self.requests().iter().filter(|r| r.method == "GET").count()
    }

    fn record(&self, request: RecordedRequest) {
        self.state.lock().unwrap().requests.push(request);
    }
}

fn owned_headers(headers: &[(&str, &str)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

fn answer(next: Option<Scripted>, missing: &str) -> Result<HttpResponse> {
    match next {
        Some(Ok(response)) => Ok(response),
        Some(Err(message)) => Err(WtpcError::transport(message)),
        None => Ok(HttpResponse::new(500, missing)),
    }
}

impl HttpTransport for FakeTransport {
    fn post_form(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<HttpResponse> {
        self.record(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            headers: owned_headers(headers),
            body: Some(body.to_string()),
        });
        let next = self.state.lock().unwrap().token_responses.pop_front();
        answer(next, "no scripted token response")
    }

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.record(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            headers: owned_headers(headers),
            body: None,
        });
        let next = self.state.lock().unwrap().price_responses.pop_front();
        answer(next, "no scripted price response")
    }
}

// -- Canned responses ---------------------------------------------------------

pub fn token_ok(access_token: &str, expires_in: i64) -> HttpResponse {
    HttpResponse::new(
        200,
        serde_json::json!({
            "access_token": access_token,
            "token_type": "bearer",
            "expires_in": expires_in,
            "sub": "client-id",
        })
        .to_string(),
    )
}

pub fn price_ok(gold: u64, last_updated_ms: i64) -> HttpResponse {
    HttpResponse::new(
        200,
        serde_json::json!({
            "_links": { "self": { "href": "https://us.api.blizzard.com/data/wow/token/?namespace=dynamic-us" } },
            "last_updated_timestamp": last_updated_ms,
            "price": gold * 10_000,
        })
        .to_string(),
    )
}

pub fn unauthorized() -> HttpResponse {
    HttpResponse::new(401, "")
}

// -- Clients ------------------------------------------------------------------

/// Build a client over `transport` with credentials for `region` stored in a
/// fresh temp dir. Keep the returned `TempDir` alive for the whole test.
pub fn setup_client_with(
    transport: &FakeTransport,
    region: Region,
    notify_on_change: bool,
) -> (Wtpc, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let client = Wtpc::builder()
        .data_dir(tmp_dir.path())
        .transport(transport.clone())
        .build()
        .unwrap();
    client
        .settings_mut()
        .set_credentials(
            Credentials::new("client-id", "client-secret")
                .with_region(region)
                .with_notify_on_change(notify_on_change),
        )
        .unwrap();
    (client, tmp_dir)
}

pub fn setup_client(transport: &FakeTransport) -> (Wtpc, tempfile::TempDir) {
    setup_client_with(transport, Region::Na, false)
}
