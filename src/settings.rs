//! Durable settings store for credentials and the cached access token.
//!
//! Two TOML files live in the data directory: `user.toml` holds what the
//! user entered (client id, secret, region, notification preference) and
//! `app.toml` holds the cached token and its expiry. Both are read when the
//! store is opened and rewritten on every mutation.

use crate::config;
use crate::error::{Result, WtpcError};
use crate::models::{Credentials, Region, TokenState};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// On-disk shape of `user.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_notifications: Option<bool>,
}

/// Owns the persisted [`Credentials`] and [`TokenState`].
///
/// There is a single store per process and a single writer (the token
/// manager for the token, the user for credentials), so no locking is done.
pub struct SettingsStore {
    /// Directory holding both settings files.
    pub data_dir: PathBuf,
    user: UserSettings,
    app: TokenState,
}

impl SettingsStore {
    /// Open the store rooted at `data_dir`, creating the directory if needed.
    ///
    /// Missing files are treated as empty settings; files that exist but do
    /// not parse are an error.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let user = read_toml(&dir.join(config::USER_SETTINGS_FILE))?;
        let app = read_toml(&dir.join(config::APP_SETTINGS_FILE))?;
        debug!(event = "wtpc.settings.opened", data_dir = %dir.display());
        Ok(Self {
            data_dir: dir,
            user,
            app,
        })
    }

    /// Open the store in the platform default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(config::default_data_dir())
    }

    pub fn user_settings_path(&self) -> PathBuf {
        self.data_dir.join(config::USER_SETTINGS_FILE)
    }

    pub fn app_settings_path(&self) -> PathBuf {
        self.data_dir.join(config::APP_SETTINGS_FILE)
    }

    // -- Credentials ---------------------------------------------------------

    /// Current credentials, with first-run defaults applied for anything
    /// unset (empty id/secret, North America, notifications off).
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.user.client_id.clone().unwrap_or_default(),
            client_secret: self.user.client_secret.clone().unwrap_or_default(),
            region: self.user.region.unwrap_or_default(),
            notify_on_change: self.user.send_notifications.unwrap_or(false),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_complete()
    }

    /// Replace the stored credentials.
    ///
    /// The id and secret are trimmed and must both be non-empty. Changing the
    /// client id or secret also drops the cached token, since it was issued
    /// to the previous client.
    pub fn set_credentials(&mut self, credentials: Credentials) -> Result<()> {
        let client_id = credentials.client_id.trim().to_string();
        let client_secret = credentials.client_secret.trim().to_string();
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(WtpcError::MissingCredentials);
        }

        let client_changed = self.user.client_id.as_deref() != Some(client_id.as_str())
            || self.user.client_secret.as_deref() != Some(client_secret.as_str());

        self.user = UserSettings {
            client_id: Some(client_id),
            client_secret: Some(client_secret),
            region: Some(credentials.region),
            send_notifications: Some(credentials.notify_on_change),
        };
        self.save_user()?;
        info!(
            event = "wtpc.settings.credentials_saved",
            region = %credentials.region,
            notify = credentials.notify_on_change,
        );

        if client_changed && !self.app.is_empty() {
            self.clear_token()?;
        }
        Ok(())
    }

    pub fn set_region(&mut self, region: Region) -> Result<()> {
        self.user.region = Some(region);
        self.save_user()
    }

    pub fn set_notify_on_change(&mut self, notify: bool) -> Result<()> {
        self.user.send_notifications = Some(notify);
        self.save_user()
    }

    /// Write first-run defaults (North America, notifications off) for any
    /// preference that has never been set.
    pub fn apply_defaults(&mut self) -> Result<()> {
        if self.user.region.is_some() && self.user.send_notifications.is_some() {
            return Ok(());
        }
        self.user.region.get_or_insert(Region::default());
        self.user.send_notifications.get_or_insert(false);
        self.save_user()
    }

    // -- Token ---------------------------------------------------------------

    pub fn token_state(&self) -> TokenState {
        self.app.clone()
    }

    pub fn set_token_state(&mut self, state: TokenState) -> Result<()> {
        self.app = state;
        write_toml(&self.app_settings_path(), &self.app)
    }

    pub fn clear_token(&mut self) -> Result<()> {
        self.app = TokenState::default();
        remove_if_exists(&self.app_settings_path())?;
        debug!(event = "wtpc.settings.token_cleared");
        Ok(())
    }

    /// Remove both settings files and reset everything to defaults.
    pub fn clear(&mut self) -> Result<()> {
        self.user = UserSettings::default();
        self.app = TokenState::default();
        remove_if_exists(&self.user_settings_path())?;
        remove_if_exists(&self.app_settings_path())?;
        info!(event = "wtpc.settings.cleared", data_dir = %self.data_dir.display());
        Ok(())
    }

    fn save_user(&self) -> Result<()> {
        write_toml(&self.user_settings_path(), &self.user)
    }
}

fn read_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write to a temp file in the same directory and rename it into place, so
/// an interrupted write never leaves a truncated settings file. The temp
/// file is created owner-only (0600 on Unix), which the rename preserves.
fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = toml::to_string_pretty(value)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| WtpcError::Io(e.error))?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
