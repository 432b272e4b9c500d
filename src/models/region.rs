use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WtpcError;

// ---------------------------------------------------------------------------
// Region: Battle.net API region
// ---------------------------------------------------------------------------

/// A Battle.net region. Persisted as its dynamic namespace (`dynamic-us`,
/// `dynamic-eu`, ...), which is also the value of the namespace header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    #[default]
    Na,
    Eu,
    Kr,
    Tw,
}

impl Region {
    /// Short host prefix used by the regional API (`us`, `eu`, `kr`, `tw`).
    pub fn code(self) -> &'static str {
        match self {
            Region::Na => "us",
            Region::Eu => "eu",
            Region::Kr => "kr",
            Region::Tw => "tw",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Region::Na => "North America",
            Region::Eu => "Europe",
            Region::Kr => "Korea",
            Region::Tw => "Taiwan",
        }
    }

    /// Dynamic realm namespace sent in the `Battlenet-Namespace` header.
    pub fn namespace(self) -> String {
        format!("dynamic-{}", self.code())
    }

    pub fn api_host(self) -> String {
        format!("https://{}.api.blizzard.com", self.code())
    }

    /// Lenient parse of a persisted region value. Anything unrecognized,
    /// including an empty string, resolves to North America.
    pub fn from_setting(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Region {
    type Err = WtpcError;

    /// Accepts `us`/`na`, `eu`, `kr`, `tw`, with or without the `dynamic-`
    /// prefix, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let code = lowered.strip_prefix("dynamic-").unwrap_or(&lowered);
        match code {
            "us" | "na" => Ok(Region::Na),
            "eu" => Ok(Region::Eu),
            "kr" => Ok(Region::Kr),
            "tw" => Ok(Region::Tw),
            _ => Err(WtpcError::InvalidArgument(format!(
                "unknown region '{}' (expected one of: us, eu, kr, tw)",
                s
            ))),
        }
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        Region::from_setting(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.namespace()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
