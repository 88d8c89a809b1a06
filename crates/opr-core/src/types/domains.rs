use serde::{Deserialize, Serialize};

use super::common::{null_as_default, Envelope};

/// A domain verified under the user's account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedDomain {
    /// The domain name
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,

    /// Whether fuzzed variants of this domain are being checked
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
}

impl VerifiedDomain {
    /// Human label for the monitoring status
    #[must_use]
    pub const fn status(&self) -> &'static str {
        if self.is_active {
            "active"
        } else {
            "inactive"
        }
    }
}

/// Response of `GET /v1/domains`
pub type DomainsResponse = Envelope<VerifiedDomain>;
