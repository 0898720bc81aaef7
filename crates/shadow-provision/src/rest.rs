//! REST provisioning gateway.

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use shadow_client::{CONTROL_PLANE_SERVICE, ConnectionProfile, SigV4Signer};
use shadow_core::AssetId;

use crate::{AssetAttributes, ProvisionError, ProvisioningGateway};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAssetRequest<'a> {
    thing_name: &'a str,
    attribute_payload: AttributePayload<'a>,
}

#[derive(Serialize)]
struct AttributePayload<'a> {
    attributes: &'a AssetAttributes,
}

/// HTTP client for the provisioning control plane.
///
/// - `POST {endpoint}/things/{asset}` registers an asset
/// - `PUT {endpoint}/things/{asset}/policies/{policy}` attaches a policy
///
/// Requests are SigV4-signed for the `iot` service in the profile's region.
#[derive(Debug, Clone)]
pub struct HttpProvisioningGateway {
    http: reqwest::Client,
    endpoint: String,
    signer: SigV4Signer,
}

impl HttpProvisioningGateway {
    /// Build a gateway for `endpoint`, reusing the timeout and credentials of
    /// an already-resolved connection profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, profile: &ConnectionProfile) -> Result<Self, ProvisionError> {
        let http = reqwest::Client::builder()
            .user_agent("shadowsync/0.1")
            .timeout(profile.request_timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            signer: SigV4Signer::new(
                profile.credentials.clone(),
                profile.region.clone(),
                CONTROL_PLANE_SERVICE,
            ),
        })
    }

    fn asset_url(&self, asset: &AssetId) -> String {
        format!(
            "{}/things/{}",
            self.endpoint,
            urlencoding::encode(asset.as_str())
        )
    }

    fn signed_request(
        &self,
        method: Method,
        url: String,
        body: Option<&CreateAssetRequest<'_>>,
    ) -> Result<reqwest::Request, ProvisionError> {
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build()?;
        self.signer
            .sign(&mut request, Utc::now())
            .map_err(|e| ProvisionError::Auth(e.to_string()))?;
        Ok(request)
    }
}

impl ProvisioningGateway for HttpProvisioningGateway {
    async fn create_asset(
        &self,
        asset: &AssetId,
        attributes: &AssetAttributes,
    ) -> Result<(), ProvisionError> {
        let body = CreateAssetRequest {
            thing_name: asset.as_str(),
            attribute_payload: AttributePayload { attributes },
        };
        let request = self.signed_request(Method::POST, self.asset_url(asset), Some(&body))?;
        let resp = self.http.execute(request).await?;
        check_response(resp, asset).await
    }

    async fn attach_policy(&self, asset: &AssetId, policy: &str) -> Result<(), ProvisionError> {
        let url = format!(
            "{}/policies/{}",
            self.asset_url(asset),
            urlencoding::encode(policy)
        );
        let request = self.signed_request(Method::PUT, url, None)?;
        let resp = self.http.execute(request).await?;
        check_response(resp, asset).await
    }
}

/// Map the gateway's status codes onto [`ProvisionError`].
async fn check_response(resp: reqwest::Response, asset: &AssetId) -> Result<(), ProvisionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let message = resp.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        409 => ProvisionError::AlreadyExists(asset.clone()),
        401 | 403 => ProvisionError::Auth(message),
        code => ProvisionError::Api {
            status: code,
            message,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shadow_client::Credentials;

    use super::*;

    fn mock_response(status: u16) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body("gateway says no")
                .unwrap(),
        )
    }

    fn gateway() -> HttpProvisioningGateway {
        let profile = ConnectionProfile {
            region: "us-east-1".into(),
            endpoint: "https://data.example.com".into(),
            shadow_name: None,
            request_timeout: Duration::from_secs(3),
            credentials: Credentials {
                access_key_id: "AKID".into(),
                secret_access_key: "secret".into(),
                session_token: None,
                expires_at: None,
            },
        };
        HttpProvisioningGateway::new("https://provision.example.com/", &profile).unwrap()
    }

    #[test]
    fn asset_url_is_encoded() {
        assert_eq!(
            gateway().asset_url(&AssetId::new("fleet a")),
            "https://provision.example.com/things/fleet%20a"
        );
    }

    #[test]
    fn policy_request_is_signed_for_the_control_plane() {
        let gateway = gateway();
        let url = format!("{}/policies/fleet", gateway.asset_url(&AssetId::new("van-9")));
        let request = gateway.signed_request(Method::PUT, url, None).unwrap();

        let headers = request.headers();
        let authorization = headers["authorization"].to_str().unwrap();
        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKID/"));
        assert!(authorization.contains("/us-east-1/iot/aws4_request"));
        assert!(headers.contains_key("x-amz-date"));
        assert!(
            headers
                .values()
                .all(|v| !v.to_str().unwrap().contains("secret"))
        );
    }

    #[test]
    fn create_body_uses_thing_fields() {
        let attributes = AssetAttributes::from([("model".to_string(), "e-van".to_string())]);
        let body = CreateAssetRequest {
            thing_name: "van-9",
            attribute_payload: AttributePayload {
                attributes: &attributes,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "thingName": "van-9",
                "attributePayload": {"attributes": {"model": "e-van"}}
            })
        );
    }

    #[tokio::test]
    async fn conflict_means_already_exists() {
        let err = check_response(mock_response(409), &AssetId::new("van-9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::AlreadyExists(ref a) if a.as_str() == "van-9"));
    }

    #[tokio::test]
    async fn forbidden_is_auth() {
        let err = check_response(mock_response(403), &AssetId::new("van-9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Auth(ref m) if m == "gateway says no"));
    }

    #[tokio::test]
    async fn other_failures_are_api_errors() {
        let err = check_response(mock_response(500), &AssetId::new("van-9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn success_passes() {
        assert!(check_response(mock_response(201), &AssetId::new("van-9")).await.is_ok());
    }
}
