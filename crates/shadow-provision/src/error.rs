//! Provisioning error types.

use shadow_core::AssetId;
use thiserror::Error;

/// Errors returned by a provisioning gateway.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The asset is already registered.
    #[error("asset '{0}' already exists")]
    AlreadyExists(AssetId),

    /// The gateway rejected the caller's credentials.
    #[error("provisioning not authorized: {0}")]
    Auth(String),

    /// Gateway returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the gateway.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
