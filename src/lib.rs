//! WoW Token price checker.
//!
//! Polls the Blizzard WoW Token index for a region, caching the OAuth
//! client-credentials token between polls, and reports each price to a
//! presentation layer. Optionally raises a desktop notification when the
//! price changes.
//!
//! # Quick start
//!
//! ```no_run
//! use wtpc::{Credentials, Region, Wtpc};
//!
//! let client = Wtpc::builder().build().unwrap();
//! client
//!     .settings_mut()
//!     .set_credentials(Credentials::new("client-id", "client-secret").with_region(Region::Eu))
//!     .unwrap();
//!
//! let mut poller = client.into_poller();
//! let outcome = poller.check_now();
//! ```

#[cfg(feature = "async")]
pub mod async_poller;
pub mod auth;
pub mod config;
pub mod display;
pub mod error;
#[cfg(feature = "cli")]
pub mod logging;
pub mod models;
pub mod notify;
pub mod poller;
pub mod price;
pub mod settings;
pub mod transport;

#[cfg(feature = "async")]
pub use async_poller::AsyncPoller;
pub use auth::TokenManager;
pub use error::{Result, WtpcError};
pub use models::{Credentials, PriceSample, PriceUpdate, Region, TokenState};
pub use notify::{DesktopNotifier, NoopNotifier, Notifier};
pub use poller::{PollListener, PollOutcome, PollState, Poller};
pub use price::PriceFetcher;
pub use settings::SettingsStore;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// WtpcBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Wtpc`] client.
///
/// Use [`Wtpc::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](WtpcBuilder::build).
pub struct WtpcBuilder {
    data_dir: Option<PathBuf>,
    timeout: Duration,
    poll_interval: Duration,
    transport: Option<Box<dyn HttpTransport + Send>>,
}

impl Default for WtpcBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            timeout: config::DEFAULT_TIMEOUT,
            poll_interval: config::DEFAULT_POLL_INTERVAL,
            transport: None,
        }
    }
}

impl WtpcBuilder {
    /// Set a custom directory for the settings files.
    ///
    /// If not set, the platform-appropriate local data directory is used
    /// (e.g. `~/.local/share/wtpc` on Linux,
    /// `~/Library/Application Support/wtpc` on macOS,
    /// `%LOCALAPPDATA%\wtpc` on Windows).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the per-request HTTP timeout. Defaults to 10 seconds.
    ///
    /// Ignored when a custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval. Defaults to 2 seconds.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Use a custom HTTP transport instead of the default `reqwest` client.
    pub fn transport<T: HttpTransport + Send + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Open the settings store and construct the HTTP transport.
    pub fn build(self) -> Result<Wtpc> {
        if self.poll_interval.is_zero() {
            return Err(WtpcError::InvalidArgument(
                "poll interval must be greater than zero".into(),
            ));
        }
        let dir = self.data_dir.unwrap_or_else(config::default_data_dir);
        let mut store = SettingsStore::open(dir)?;
        store.apply_defaults()?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new(self.timeout)?),
        };
        Ok(Wtpc {
            store: RefCell::new(store),
            transport,
            poll_interval: self.poll_interval,
        })
    }
}

// ---------------------------------------------------------------------------
// Wtpc
// ---------------------------------------------------------------------------

/// Main entry point: owns the settings store and the HTTP transport, and
/// hands out lightweight borrowing wrappers for token and price operations.
pub struct Wtpc {
    store: RefCell<SettingsStore>,
    transport: Box<dyn HttpTransport + Send>,
    poll_interval: Duration,
}

impl Wtpc {
    pub fn builder() -> WtpcBuilder {
        WtpcBuilder::default()
    }

    /// Token manager bound to this client's store and transport.
    pub fn tokens(&self) -> TokenManager<'_> {
        TokenManager::new(&self.store, self.transport.as_ref())
    }

    /// Price fetcher bound to this client's transport.
    pub fn prices(&self) -> PriceFetcher<'_> {
        PriceFetcher::new(self.transport.as_ref())
    }

    pub fn settings(&self) -> Ref<'_, SettingsStore> {
        self.store.borrow()
    }

    pub fn settings_mut(&self) -> RefMut<'_, SettingsStore> {
        self.store.borrow_mut()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Ensure a token and fetch the price once, with no 401 recovery and
    /// no change detection. [`Poller::check_now`] is the full round-trip.
    pub fn fetch_once(&self) -> Result<PriceSample> {
        let token = self.tokens().ensure_token()?;
        let region = self.settings().credentials().region;
        self.prices().fetch_price(&token, region)
    }

    /// Consume the client into a [`Poller`].
    pub fn into_poller(self) -> Poller {
        Poller::new(self)
    }
}

impl fmt::Display for Wtpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.borrow();
        let credentials = store.credentials();
        write!(
            f,
            "Wtpc(data_dir={}, region={}, notify={}, interval={:?})",
            store.data_dir.display(),
            credentials.region.namespace(),
            credentials.notify_on_change,
            self.poll_interval
        )
    }
}
