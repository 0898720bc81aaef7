//! # shadow-client
//!
//! Clients for the shadow state store.
//!
//! [`ShadowClient`] is the narrow contract the rest of shadowsync depends on:
//! one `fetch` or `update` against one asset, no retries. Implementations:
//! - [`HttpShadowClient`], the REST data-plane adapter
//! - [`MemoryShadowClient`], an in-process store for tests and fixtures
//!
//! Connection details come from a [`CredentialProvider`], resolved once when
//! a client is constructed. Requests are authenticated with [`SigV4Signer`].

mod credentials;
mod http;
mod memory;
mod rest;
mod sigv4;

pub use credentials::{ConfigCredentialProvider, ConnectionProfile, CredentialProvider, Credentials};
pub use memory::MemoryShadowClient;
pub use rest::HttpShadowClient;
pub use sigv4::{CONTROL_PLANE_SERVICE, DATA_PLANE_SERVICE, SigV4Signer};

use std::future::Future;

use shadow_core::{AssetId, RawShadowDocument, ShadowError, ShadowMap, UpdateAck};

/// Single-asset access to the shadow state store.
///
/// Errors follow the shared taxonomy: [`ShadowError::NotFound`] when the asset
/// has no document, [`ShadowError::Transient`] for retryable service or
/// network failures, [`ShadowError::Auth`] for rejected credentials. Retry
/// policy belongs to callers.
pub trait ShadowClient: Send + Sync {
    /// Retrieve the current shadow document for `asset`.
    fn fetch(
        &self,
        asset: &AssetId,
    ) -> impl Future<Output = Result<RawShadowDocument, ShadowError>> + Send;

    /// Merge `reported` into the asset's reported state.
    fn update(
        &self,
        asset: &AssetId,
        reported: &ShadowMap,
    ) -> impl Future<Output = Result<UpdateAck, ShadowError>> + Send;
}
