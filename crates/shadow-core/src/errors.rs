//! Cross-cutting error types for shadowsync.
//!
//! A single taxonomy is shared by the shadow client, the normalizer and the
//! batch orchestrator so that errors reach the caller unmodified. Provisioning
//! and configuration keep their own error types in their respective crates.

use thiserror::Error;

use crate::ids::AssetId;

/// Errors raised while fetching, updating or normalizing shadow documents.
#[derive(Debug, Error)]
pub enum ShadowError {
    /// The store holds no shadow document for the asset.
    #[error("no shadow document for asset '{asset}'")]
    NotFound { asset: AssetId },

    /// Network or service hiccup. Safe to retry.
    #[error("transient failure for asset '{asset}': {message}")]
    Transient { asset: AssetId, message: String },

    /// Credentials are missing, invalid or expired.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A reported state field has no metadata counterpart of the same shape.
    #[error("state field '{path}' does not match the reported metadata shape")]
    ShapeMismatch { path: String },

    /// Reported state contains a field named `$metadata`.
    #[error("state field '{path}' uses the reserved name `$metadata`")]
    ReservedField { path: String },

    /// The store refused the request (client-side 4xx other than auth/not-found).
    #[error("request for asset '{asset}' rejected ({status}): {message}")]
    Rejected {
        asset: AssetId,
        status: u16,
        message: String,
    },

    /// The response body could not be decoded as a shadow document.
    #[error("invalid shadow document for asset '{asset}': {message}")]
    InvalidDocument { asset: AssetId, message: String },

    /// The transport could not be constructed (TLS backend, bad endpoint).
    #[error("transport setup failed: {0}")]
    Transport(String),

    /// An asset identifier failed validation.
    #[error("invalid asset id: {0}")]
    InvalidAssetId(String),

    /// A local fixture is not a map of asset id to shadow document.
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    /// A batch worker panicked or was cancelled by the runtime.
    #[error("batch worker failed: {0}")]
    TaskFailed(String),
}

impl ShadowError {
    /// Whether a caller-side retry could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// The asset this error refers to, when it is tied to one.
    #[must_use]
    pub const fn asset(&self) -> Option<&AssetId> {
        match self {
            Self::NotFound { asset }
            | Self::Transient { asset, .. }
            | Self::Rejected { asset, .. }
            | Self::InvalidDocument { asset, .. } => Some(asset),
            _ => None,
        }
    }
}
