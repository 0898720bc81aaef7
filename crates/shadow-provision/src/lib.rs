//! # shadow-provision
//!
//! Pass-through boundary to the provisioning backend: register an asset and
//! attach an authorization policy to it. Calls are issued once; the outcome is
//! success or a [`ProvisionError`]. No retries, no local state.

mod error;
mod rest;

pub use error::ProvisionError;
pub use rest::HttpProvisioningGateway;

use std::collections::BTreeMap;
use std::future::Future;

use shadow_core::AssetId;

/// Free-form attributes stored alongside a registered asset.
pub type AssetAttributes = BTreeMap<String, String>;

/// Asset creation and policy attachment against the managed backend.
pub trait ProvisioningGateway: Send + Sync {
    fn create_asset(
        &self,
        asset: &AssetId,
        attributes: &AssetAttributes,
    ) -> impl Future<Output = Result<(), ProvisionError>> + Send;

    fn attach_policy(
        &self,
        asset: &AssetId,
        policy: &str,
    ) -> impl Future<Output = Result<(), ProvisionError>> + Send;
}

/// Register `asset` and, if given, attach `policy` to it.
///
/// An asset that already exists is not an error here, so re-running attaches
/// the policy to a previously created asset.
///
/// # Errors
///
/// Returns the first [`ProvisionError`] other than
/// [`ProvisionError::AlreadyExists`].
pub async fn provision<G: ProvisioningGateway>(
    gateway: &G,
    asset: &AssetId,
    attributes: &AssetAttributes,
    policy: Option<&str>,
) -> Result<(), ProvisionError> {
    match gateway.create_asset(asset, attributes).await {
        Ok(()) => tracing::info!(%asset, "asset created"),
        Err(ProvisionError::AlreadyExists(_)) => {
            tracing::info!(%asset, "asset already exists");
        }
        Err(e) => return Err(e),
    }

    if let Some(policy) = policy {
        gateway.attach_policy(asset, policy).await?;
        tracing::info!(%asset, policy, "policy attached");
    }
    Ok(())
}
