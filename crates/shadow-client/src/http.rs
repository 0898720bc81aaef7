//! Shared HTTP response helpers for the REST shadow client.
//!
//! Centralizes status-code classification so the request code stays focused
//! on URL construction and body mapping.

use shadow_core::{AssetId, ShadowError};

/// Check an HTTP response for error statuses.
///
/// Returns the response unchanged on success. Otherwise reads the body as the
/// error message and classifies the status with [`classify_status`].
pub async fn check_response(
    resp: reqwest::Response,
    asset: &AssetId,
) -> Result<reqwest::Response, ShadowError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(classify_status(status.as_u16(), asset, message))
}

/// Map a non-success status to the shared error taxonomy.
///
/// - **404** → [`ShadowError::NotFound`]
/// - **401 / 403** → [`ShadowError::Auth`]
/// - **429 / 5xx** → [`ShadowError::Transient`]
/// - anything else → [`ShadowError::Rejected`]
pub fn classify_status(status: u16, asset: &AssetId, message: String) -> ShadowError {
    match status {
        404 => ShadowError::NotFound {
            asset: asset.clone(),
        },
        401 | 403 => ShadowError::Auth(format!(
            "store returned {status} for asset '{asset}': {message}"
        )),
        429 | 500..=599 => ShadowError::Transient {
            asset: asset.clone(),
            message: format!("HTTP {status}: {message}"),
        },
        _ => ShadowError::Rejected {
            asset: asset.clone(),
            status,
            message,
        },
    }
}

/// Wrap a transport-level failure (connect, timeout, reset) as transient.
pub fn transport_error(asset: &AssetId, err: &reqwest::Error) -> ShadowError {
    ShadowError::Transient {
        asset: asset.clone(),
        message: err.to_string(),
    }
}
