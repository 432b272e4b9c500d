use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "wtpc";
pub const APP_DISPLAY_NAME: &str = "WoW Token Price Checker";

pub const OAUTH_URL: &str = "https://oauth.battle.net/token";
pub const TOKEN_INDEX_PATH: &str = "/data/wow/token/index";
pub const GRANT_TYPE_BODY: &str = "grant_type=client_credentials";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const NAMESPACE_HEADER: &str = "Battlenet-Namespace";

pub const USER_SETTINGS_FILE: &str = "user.toml";
pub const APP_SETTINGS_FILE: &str = "app.toml";

/// Raw prices are reported in copper; one gold is 10,000 copper.
pub const PRICE_DIVISOR: u64 = 10_000;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The token index is refreshed server-side roughly every 20 minutes.
pub const NEXT_UPDATE_MINUTES: i64 = 20;

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        data.join(APP_NAME)
    } else {
        PathBuf::from(".wtpc")
    }
}
