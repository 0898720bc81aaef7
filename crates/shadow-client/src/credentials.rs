//! Connection profile and credential resolution.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shadow_config::ShadowConfig;
use shadow_core::ShadowError;

/// Opaque credential bag passed through to the transport.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Check if the credentials are expired or expire within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            expires_at <= Utc::now() + chrono::TimeDelta::seconds(buffer_secs)
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Everything a transport needs to reach the state store.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub region: String,
    /// Base URL without trailing slash.
    pub endpoint: String,
    pub shadow_name: Option<String>,
    pub request_timeout: Duration,
    pub credentials: Credentials,
}

/// Supplies region, endpoint and time-limited credentials.
///
/// Called once per client construction; there is no refresh.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self) -> impl Future<Output = Result<ConnectionProfile, ShadowError>> + Send;
}

/// Reads the connection profile from [`ShadowConfig`].
#[derive(Debug, Clone)]
pub struct ConfigCredentialProvider {
    config: ShadowConfig,
}

impl ConfigCredentialProvider {
    #[must_use]
    pub const fn new(config: ShadowConfig) -> Self {
        Self { config }
    }
}

impl CredentialProvider for ConfigCredentialProvider {
    async fn resolve(&self) -> Result<ConnectionProfile, ShadowError> {
        let creds = &self.config.credentials;
        if !creds.is_configured() {
            return Err(ShadowError::Auth(
                "no credentials configured (set [credentials] or SHADOWSYNC_CREDENTIALS__*)".into(),
            ));
        }

        let connection = &self.config.connection;
        Ok(ConnectionProfile {
            region: connection.region.clone(),
            endpoint: connection.endpoint_url(),
            shadow_name: connection.shadow_name().map(str::to_string),
            request_timeout: Duration::from_secs(connection.request_timeout_secs),
            credentials: Credentials {
                access_key_id: creds.access_key_id.clone(),
                secret_access_key: creds.secret_access_key.clone(),
                session_token: (!creds.session_token.is_empty())
                    .then(|| creds.session_token.clone()),
                expires_at: creds.expires_at,
            },
        })
    }
}
