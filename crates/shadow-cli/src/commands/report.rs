use anyhow::Context;
use serde::Serialize;
use shadow_client::ShadowClient;
use shadow_config::ShadowConfig;
use shadow_core::{AssetId, ShadowMap, map_from_json};

use crate::bootstrap;
use crate::cli::{GlobalFlags, ReportArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct ReportResponse {
    asset: AssetId,
    version: u64,
    timestamp: i64,
}

/// Handle `shadowctl report`.
pub async fn handle(
    args: &ReportArgs,
    config: &ShadowConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let patch = parse_patch(&args.patch)?;
    let client = bootstrap::connect(config, flags).await?;

    let ack = client.update(&args.asset, &patch).await?;
    tracing::info!(asset = %args.asset, version = ack.version, "reported state updated");

    output(
        &ReportResponse {
            asset: args.asset.clone(),
            version: ack.version,
            timestamp: ack.timestamp,
        },
        flags.format,
    )
}

fn parse_patch(raw: &str) -> anyhow::Result<ShadowMap> {
    let value: serde_json::Value = serde_json::from_str(raw).context("--patch is not valid JSON")?;
    map_from_json(value).ok_or_else(|| anyhow::anyhow!("--patch must be a JSON object"))
}
