//! Live smoke test against the real Battle.net API.
//!
//! Needs API client credentials in the environment:
//!
//! ```sh
//! WTPC_CLIENT_ID=... WTPC_CLIENT_SECRET=... cargo test --test smoke_test -- --ignored --nocapture
//! ```
//!
//! `WTPC_REGION` optionally selects the region (`us`, `eu`, `kr`, `tw`).

use wtpc::display::{format_countdown, format_price};
use wtpc::{Credentials, PollOutcome, Region, Wtpc};

#[test]
#[ignore]
fn live_round_trip() {
    let (Ok(id), Ok(secret)) = (
        std::env::var("WTPC_CLIENT_ID"),
        std::env::var("WTPC_CLIENT_SECRET"),
    ) else {
        eprintln!("WTPC_CLIENT_ID / WTPC_CLIENT_SECRET not set; skipping");
        return;
    };
    let region = std::env::var("WTPC_REGION")
        .map(|r| Region::from_setting(&r))
        .unwrap_or_default();

    let tmp = tempfile::tempdir().unwrap();
    let client = Wtpc::builder().data_dir(tmp.path()).build().unwrap();
    client
        .settings_mut()
        .set_credentials(Credentials::new(&id, &secret).with_region(region))
        .unwrap();
    eprintln!("{}", client);

    let mut poller = client.into_poller();
    let first = match poller.check_now() {
        PollOutcome::Updated(update) => update,
        other => panic!("live check failed: {other:?}"),
    };
    eprintln!(
        "  {} gold, next update {}",
        format_price(first.sample.price),
        format_countdown(first.next_expected_update, chrono::Utc::now())
    );
    assert!(first.sample.price > 0);

    // Second poll must reuse the cached token.
    let cached = poller.client().settings().token_state();
    assert!(cached.is_valid_at(chrono::Utc::now()));
    match poller.check_now() {
        PollOutcome::Updated(second) => assert!(second.sample.price > 0),
        other => panic!("second live check failed: {other:?}"),
    }
    assert_eq!(poller.client().settings().token_state(), cached);
}
