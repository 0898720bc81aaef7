//! Provisioning gateway settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvisioningConfig {
    /// Control-plane endpoint accepting asset and policy requests.
    #[serde(default)]
    pub endpoint: String,

    /// Policy attached when a caller does not name one.
    #[serde(default)]
    pub default_policy: String,
}

impl ProvisioningConfig {
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
    }

    pub fn default_policy(&self) -> Option<&str> {
        (!self.default_policy.is_empty()).then_some(self.default_policy.as_str())
    }
}
