#[derive(Debug, thiserror::Error)]
pub enum WtpcError {
    /// The OAuth endpoint answered with something other than 200.
    #[error("Authorization failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// The price endpoint rejected the bearer token.
    #[error("Access token was rejected (401 Unauthorized)")]
    Unauthorized,

    /// The price endpoint answered with a non-200, non-401 status.
    #[error("Price request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection-level failure: DNS, TLS, refused connection, timeout.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Client ID and client secret must be configured")]
    MissingCredentials,

    #[error("Unexpected response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read settings: {0}")]
    SettingsRead(#[from] toml::de::Error),

    #[error("Failed to write settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for WtpcError {
    fn from(err: reqwest::Error) -> Self {
        WtpcError::Transport(Box::new(err))
    }
}

impl WtpcError {
    /// Connection-level failure raised by an [`HttpTransport`] other than
    /// the reqwest one.
    ///
    /// [`HttpTransport`]: crate::transport::HttpTransport
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        WtpcError::Transport(err.into())
    }

    /// Whether the failure is likely to clear up on the next poll without
    /// user intervention (network trouble or a server-side 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            WtpcError::Transport(_) => true,
            WtpcError::Auth { status, .. } | WtpcError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, WtpcError>;
