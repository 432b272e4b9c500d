use std::fmt;

use super::region::Region;

// ---------------------------------------------------------------------------
// Credentials: user-entered API client settings
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub region: Region,
    pub notify_on_change: bool,
}

impl Credentials {
    /// Create credentials with whitespace trimmed from the id and secret.
    /// Region defaults to North America and notifications to off.
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
            region: Region::default(),
            notify_on_change: false,
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_notify_on_change(mut self, notify: bool) -> Self {
        self.notify_on_change = notify;
        self
    }

    /// Both the client id and the client secret are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Client secret with everything but the last four characters masked.
    pub fn masked_secret(&self) -> String {
        let chars: Vec<char> = self.client_secret.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

// Hand-written so the secret never ends up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.masked_secret())
            .field("region", &self.region)
            .field("notify_on_change", &self.notify_on_change)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_whitespace() {
        let creds = Credentials::new("  id \n", "\tsecret ");
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
        assert!(creds.is_complete());
    }

    #[test]
    fn blank_fields_are_incomplete() {
        assert!(!Credentials::new("id", "   ").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn debug_masks_secret() {
        let creds = Credentials::new("id", "supersecretvalue");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("supersecretvalue"));
        assert!(rendered.contains("alue"));
    }

    #[test]
    fn short_secret_is_fully_masked() {
        assert_eq!(Credentials::new("id", "abc").masked_secret(), "***");
    }
}
