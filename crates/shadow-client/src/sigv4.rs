//! AWS Signature Version 4 request signing.
//!
//! Both the shadow data plane and the provisioning control plane authenticate
//! requests by an `Authorization` header derived from the secret key. The
//! secret itself never leaves the process.
//!
//! Signed headers are `host`, `x-amz-date` and, for temporary credentials,
//! `x-amz-security-token`. Path segments are URI-encoded a second time on top
//! of the URL's own encoding, as required for every service except S3.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use sha2::{Digest, Sha256};
use shadow_core::ShadowError;

use crate::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signing name of the shadow data plane.
pub const DATA_PLANE_SERVICE: &str = "iotdata";
/// Signing name of the provisioning control plane.
pub const CONTROL_PLANE_SERVICE: &str = "iot";

/// Signs outgoing requests for one region and service.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Credentials,
    region: String,
    service: &'static str,
}

impl SigV4Signer {
    #[must_use]
    pub fn new(credentials: Credentials, region: impl Into<String>, service: &'static str) -> Self {
        Self {
            credentials,
            region: region.into(),
            service,
        }
    }

    /// Add `x-amz-date`, the session token if any, and the `Authorization`
    /// header to a fully built request.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowError::Auth`] if the request has no host or a
    /// credential cannot be carried in a header.
    pub fn sign(&self, request: &mut reqwest::Request, now: DateTime<Utc>) -> Result<(), ShadowError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let url = request.url();
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ShadowError::Auth("cannot sign a request without a host".into())),
        };

        let mut headers = vec![("host", host), ("x-amz-date", amz_date.clone())];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token", token.clone()));
        }
        let signed_headers = headers.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(";");
        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{}\n", value.trim()))
            .collect();

        let payload = request.body().and_then(reqwest::Body::as_bytes).unwrap_or_default();
        let canonical_request = format!(
            "{}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{}",
            request.method(),
            canonical_uri(url.path()),
            canonical_query(url),
            hex::encode(Sha256::digest(payload)),
        );

        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );
        let signing_key = self.signing_key(&date)?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.credentials.access_key_id
        );

        let request_headers = request.headers_mut();
        request_headers.insert(HeaderName::from_static("x-amz-date"), header_value(&amz_date)?);
        if let Some(token) = &self.credentials.session_token {
            let mut value = header_value(token)?;
            value.set_sensitive(true);
            request_headers.insert(HeaderName::from_static("x-amz-security-token"), value);
        }
        let mut value = header_value(&authorization)?;
        value.set_sensitive(true);
        request_headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    fn signing_key(&self, date: &str) -> Result<[u8; 32], ShadowError> {
        let secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes())?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.service.as_bytes())?;
        hmac_sha256(&k_service, b"aws4_request")
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32], ShadowError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ShadowError::Auth(format!("invalid signing key: {e}")))?;
    mac.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn header_value(value: &str) -> Result<HeaderValue, ShadowError> {
    HeaderValue::from_str(value)
        .map_err(|_| ShadowError::Auth("credentials contain characters not allowed in a header".into()))
}

fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &reqwest::Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (urlencoding::encode(&k).into_owned(), urlencoding::encode(&v).into_owned()))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
