use serde::Serialize;
use shadow_client::{ConfigCredentialProvider, CredentialProvider};
use shadow_config::ShadowConfig;
use shadow_core::AssetId;
use shadow_provision::{AssetAttributes, HttpProvisioningGateway, provision};

use crate::cli::{GlobalFlags, ProvisionArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct ProvisionResponse<'a> {
    asset: &'a AssetId,
    policy: Option<&'a str>,
    attributes: &'a AssetAttributes,
}

/// Handle `shadowctl provision`.
pub async fn handle(
    args: &ProvisionArgs,
    config: &ShadowConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let provisioning = config.require_provisioning()?;
    let profile = ConfigCredentialProvider::new(config.clone()).resolve().await?;
    let gateway = HttpProvisioningGateway::new(&provisioning.endpoint, &profile)?;

    let policy = args.policy.as_deref().or_else(|| provisioning.default_policy());
    let attributes: AssetAttributes = args.attributes.iter().cloned().collect();

    provision(&gateway, &args.asset, &attributes, policy).await?;

    output(
        &ProvisionResponse {
            asset: &args.asset,
            policy,
            attributes: &attributes,
        },
        flags.format,
    )
}
