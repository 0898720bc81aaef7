//! State store connection settings.

use serde::{Deserialize, Serialize};

fn default_region() -> String {
    String::from("us-east-1")
}

/// Default per-request timeout in seconds.
const fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Region hosting the state store (e.g. `eu-central-1`).
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom data-plane endpoint. If empty, built from `region`.
    #[serde(default)]
    pub endpoint: String,

    /// Named shadow to address. Empty means the classic (unnamed) shadow.
    #[serde(default)]
    pub shadow_name: String,

    /// Transport timeout applied to every request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: String::new(),
            shadow_name: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ConnectionConfig {
    /// Build the data-plane endpoint URL.
    ///
    /// Returns the custom `endpoint` (without trailing slash) if set,
    /// otherwise builds one from `region`.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.is_empty() {
            format!("https://data-ats.iot.{}.amazonaws.com", self.region)
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    /// Named shadow, if one is configured.
    pub fn shadow_name(&self) -> Option<&str> {
        (!self.shadow_name.is_empty()).then_some(self.shadow_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ConnectionConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.shadow_name().is_none());
    }

    #[test]
    fn endpoint_url_built_from_region() {
        let config = ConnectionConfig {
            region: "eu-central-1".into(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint_url(),
            "https://data-ats.iot.eu-central-1.amazonaws.com"
        );
    }

    #[test]
    fn custom_endpoint_used_when_set() {
        let config = ConnectionConfig {
            endpoint: "http://localhost:8080/".into(),
            ..Default::default()
        };
        assert_eq!(config.endpoint_url(), "http://localhost:8080");
    }
}
