//! Price fetcher tests against the scripted fake transport.

mod common;

use chrono::Utc;
use common::{price_ok, setup_client_with, token_ok, unauthorized, FakeTransport, TS_MS};
use wtpc::{HttpResponse, PriceFetcher, Region, TokenState, WtpcError};

fn token() -> TokenState {
    TokenState::issued("bearer-token".into(), Utc::now(), 3600).unwrap()
}

#[test]
fn parses_price_and_timestamp() {
    let fake = FakeTransport::new();
    fake.push_price(price_ok(350_000, TS_MS));

    let sample = PriceFetcher::new(&fake)
        .fetch_price(&token(), Region::Na)
        .unwrap();
    assert_eq!(sample.price, 350_000);
    assert_eq!(sample.observed_at.timestamp(), 1_700_000_000);
}

#[test]
fn sends_bearer_and_namespace_headers() {
    let fake = FakeTransport::new();
    fake.push_price(price_ok(1, TS_MS));

    PriceFetcher::new(&fake)
        .fetch_price(&token(), Region::Eu)
        .unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "https://eu.api.blizzard.com/data/wow/token/index");
    assert_eq!(request.header("Authorization"), Some("Bearer bearer-token"));
    assert_eq!(request.header("Battlenet-Namespace"), Some("dynamic-eu"));
}

#[test]
fn each_region_uses_its_own_host() {
    for (region, host) in [
        (Region::Na, "us.api"),
        (Region::Eu, "eu.api"),
        (Region::Kr, "kr.api"),
        (Region::Tw, "tw.api"),
    ] {
        let fake = FakeTransport::new();
        fake.push_price(price_ok(1, TS_MS));
        PriceFetcher::new(&fake).fetch_price(&token(), region).unwrap();
        assert!(fake.requests()[0].url.contains(host), "{region:?}");
    }
}

#[test]
fn status_401_is_unauthorized() {
    let fake = FakeTransport::new();
    fake.push_price(unauthorized());

    let err = PriceFetcher::new(&fake)
        .fetch_price(&token(), Region::Na)
        .unwrap_err();
    assert!(matches!(err, WtpcError::Unauthorized));
}

#[test]
fn other_status_is_api_error_with_message() {
    let fake = FakeTransport::new();
    fake.push_price(HttpResponse::new(
        404,
        r#"{"code":404,"type":"BLZWEBAPI00000404","detail":"Not Found"}"#,
    ));

    let err = PriceFetcher::new(&fake)
        .fetch_price(&token(), Region::Kr)
        .unwrap_err();
    match err {
        WtpcError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn empty_token_is_rejected_without_request() {
    let fake = FakeTransport::new();

    let err = PriceFetcher::new(&fake)
        .fetch_price(&TokenState::default(), Region::Na)
        .unwrap_err();
    assert!(matches!(err, WtpcError::Unauthorized));
    assert!(fake.requests().is_empty());
}

#[test]
fn malformed_body_is_json_error() {
    let fake = FakeTransport::new();
    fake.push_price(HttpResponse::new(200, r#"{"price":"lots"}"#));

    let err = PriceFetcher::new(&fake)
        .fetch_price(&token(), Region::Na)
        .unwrap_err();
    assert!(matches!(err, WtpcError::Json(_)));
}

#[test]
fn fetch_once_obtains_token_then_price_for_stored_region() {
    let fake = FakeTransport::new();
    fake.push_token(token_ok("fresh", 86_400));
    fake.push_price(price_ok(410_000, TS_MS));
    let (client, _tmp) = setup_client_with(&fake, Region::Kr, false);

    let sample = client.fetch_once().unwrap();
    assert_eq!(sample.price, 410_000);
    assert_eq!(fake.token_calls(), 1);
    let requests = fake.requests();
    assert!(requests[1].url.starts_with("https://kr.api.blizzard.com"));
    assert_eq!(requests[1].header("Authorization"), Some("Bearer fresh"));
}
