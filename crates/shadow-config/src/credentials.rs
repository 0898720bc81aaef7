//! Credentials handed to the shadow transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    /// Access key ID.
    #[serde(default)]
    pub access_key_id: String,

    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: String,

    /// Session token accompanying temporary credentials. Optional.
    #[serde(default)]
    pub session_token: String,

    /// Expiry of temporary credentials (RFC 3339).
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CredentialsConfig {
    /// An access key pair is present. Requests are signed with it, so a
    /// session token on its own is not enough.
    pub fn is_configured(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}
