//! REST data-plane client.

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use shadow_core::{AssetId, RawShadowDocument, ShadowError, ShadowMap, UpdateAck};

use crate::ShadowClient;
use crate::credentials::{ConnectionProfile, CredentialProvider};
use crate::http::{check_response, transport_error};
use crate::sigv4::{DATA_PLANE_SERVICE, SigV4Signer};

/// Seconds of remaining validity required when the client is built.
const EXPIRY_BUFFER_SECS: i64 = 30;

#[derive(Serialize)]
struct UpdateRequest<'a> {
    state: UpdateState<'a>,
}

#[derive(Serialize)]
struct UpdateState<'a> {
    reported: &'a ShadowMap,
}

/// HTTP client for the shadow data plane.
///
/// `GET {endpoint}/things/{asset}/shadow` reads a document,
/// `POST` to the same path merges a reported-state patch. Every request is
/// SigV4-signed for the `iotdata` service.
#[derive(Debug, Clone)]
pub struct HttpShadowClient {
    http: reqwest::Client,
    endpoint: String,
    shadow_name: Option<String>,
    signer: SigV4Signer,
}

impl HttpShadowClient {
    /// Resolve the connection profile once and build the client.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowError::Auth`] if the provider fails or the credentials
    /// are already (nearly) expired, [`ShadowError::Transport`] if the HTTP
    /// client cannot be built.
    pub async fn connect(provider: &impl CredentialProvider) -> Result<Self, ShadowError> {
        let profile = provider.resolve().await?;
        Self::from_profile(profile)
    }

    /// Build the client from an already-resolved profile.
    ///
    /// # Errors
    ///
    /// See [`HttpShadowClient::connect`].
    pub fn from_profile(profile: ConnectionProfile) -> Result<Self, ShadowError> {
        if profile.credentials.is_near_expiry(EXPIRY_BUFFER_SECS) {
            return Err(ShadowError::Auth(
                "credentials are expired or about to expire".into(),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent("shadowsync/0.1")
            .timeout(profile.request_timeout)
            .build()
            .map_err(|e| ShadowError::Transport(e.to_string()))?;

        tracing::debug!(
            region = %profile.region,
            endpoint = %profile.endpoint,
            shadow = profile.shadow_name.as_deref().unwrap_or("classic"),
            "shadow client ready"
        );

        Ok(Self {
            http,
            endpoint: profile.endpoint,
            shadow_name: profile.shadow_name,
            signer: SigV4Signer::new(profile.credentials, profile.region, DATA_PLANE_SERVICE),
        })
    }

    fn shadow_url(&self, asset: &AssetId) -> String {
        let mut url = format!(
            "{}/things/{}/shadow",
            self.endpoint,
            urlencoding::encode(asset.as_str())
        );
        if let Some(name) = &self.shadow_name {
            url.push_str("?name=");
            url.push_str(&urlencoding::encode(name));
        }
        url
    }

    /// Build and sign a request against the asset's shadow.
    fn signed_request(
        &self,
        method: Method,
        asset: &AssetId,
        body: Option<&UpdateRequest<'_>>,
    ) -> Result<reqwest::Request, ShadowError> {
        let mut builder = self.http.request(method, self.shadow_url(asset));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder
            .build()
            .map_err(|e| ShadowError::Transport(e.to_string()))?;
        self.signer.sign(&mut request, Utc::now())?;
        Ok(request)
    }

    async fn send(
        &self,
        request: reqwest::Request,
        asset: &AssetId,
    ) -> Result<reqwest::Response, ShadowError> {
        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|e| transport_error(asset, &e))?;
        check_response(resp, asset).await
    }

    async fn read_body<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        asset: &AssetId,
    ) -> Result<T, ShadowError> {
        let body = resp.bytes().await.map_err(|e| transport_error(asset, &e))?;
        serde_json::from_slice(&body).map_err(|e| ShadowError::InvalidDocument {
            asset: asset.clone(),
            message: e.to_string(),
        })
    }
}

impl ShadowClient for HttpShadowClient {
    async fn fetch(&self, asset: &AssetId) -> Result<RawShadowDocument, ShadowError> {
        tracing::debug!(%asset, "fetching shadow");

        let request = self.signed_request(Method::GET, asset, None)?;
        let resp = self.send(request, asset).await?;
        Self::read_body(resp, asset).await
    }

    async fn update(&self, asset: &AssetId, reported: &ShadowMap) -> Result<UpdateAck, ShadowError> {
        tracing::debug!(%asset, fields = reported.len(), "updating reported state");

        let body = UpdateRequest {
            state: UpdateState { reported },
        };
        let request = self.signed_request(Method::POST, asset, Some(&body))?;
        let resp = self.send(request, asset).await?;
        Self::read_body(resp, asset).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::credentials::Credentials;

    fn profile(shadow_name: Option<&str>) -> ConnectionProfile {
        ConnectionProfile {
            region: "us-east-1".into(),
            endpoint: "https://example-ats.iot.us-east-1.amazonaws.com".into(),
            shadow_name: shadow_name.map(str::to_string),
            request_timeout: Duration::from_secs(5),
            credentials: Credentials {
                access_key_id: "AKID".into(),
                secret_access_key: "secret".into(),
                session_token: None,
                expires_at: None,
            },
        }
    }

    #[test]
    fn classic_shadow_url() {
        let client = HttpShadowClient::from_profile(profile(None)).unwrap();
        assert_eq!(
            client.shadow_url(&AssetId::new("truck-7")),
            "https://example-ats.iot.us-east-1.amazonaws.com/things/truck-7/shadow"
        );
    }

    #[test]
    fn named_shadow_url_and_encoded_asset() {
        let client = HttpShadowClient::from_profile(profile(Some("gps data"))).unwrap();
        assert_eq!(
            client.shadow_url(&AssetId::new("fleet/a b")),
            "https://example-ats.iot.us-east-1.amazonaws.com/things/fleet%2Fa%20b/shadow?name=gps%20data"
        );
    }

    #[test]
    fn expired_credentials_are_rejected_at_construction() {
        let mut expired = profile(None);
        expired.credentials.expires_at = Some(Utc::now() - chrono::TimeDelta::minutes(1));
        assert!(matches!(
            HttpShadowClient::from_profile(expired),
            Err(ShadowError::Auth(_))
        ));
    }

    #[test]
    fn requests_are_signed_and_never_carry_the_secret() {
        let client = HttpShadowClient::from_profile(profile(None)).unwrap();
        let patch = shadow_core::map_from_json(serde_json::json!({"speed": 61})).unwrap();
        let body = UpdateRequest {
            state: UpdateState { reported: &patch },
        };

        for request in [
            client.signed_request(Method::GET, &AssetId::new("truck-7"), None).unwrap(),
            client.signed_request(Method::POST, &AssetId::new("truck-7"), Some(&body)).unwrap(),
        ] {
            let headers = request.headers();
            let authorization = headers["authorization"].to_str().unwrap();
            assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKID/"));
            assert!(authorization.contains("/us-east-1/iotdata/aws4_request"));
            assert!(headers.contains_key("x-amz-date"));
            assert!(!headers.contains_key("x-amz-security-token"));
            for value in headers.values() {
                let value = value.to_str().unwrap();
                assert!(!value.contains("secret"), "secret leaked in {value}");
                assert!(!value.starts_with("Basic"));
            }
        }
    }

    #[test]
    fn update_body_wraps_patch_in_reported() {
        let patch = shadow_core::map_from_json(serde_json::json!({"speed": 61})).unwrap();
        let body = UpdateRequest {
            state: UpdateState { reported: &patch },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"state": {"reported": {"speed": 61}}})
        );
    }

    #[tokio::test]
    #[ignore] // requires network and a configured store
    async fn live_fetch_from_configured_store() {
        let config = shadow_config::ShadowConfig::load_with_dotenv().expect("config");
        let provider = crate::ConfigCredentialProvider::new(config);
        let client = HttpShadowClient::connect(&provider).await.expect("client");
        let asset = AssetId::new(std::env::var("SHADOWSYNC_LIVE_ASSET").unwrap_or_default());
        match client.fetch(&asset).await {
            Ok(doc) => println!("version {} with {} fields", doc.version, doc.state.reported.len()),
            Err(e) => println!("ERROR: {e}"),
        }
    }
}
