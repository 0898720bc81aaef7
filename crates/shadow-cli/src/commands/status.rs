use std::sync::Arc;

use serde::Serialize;
use shadow_batch::BatchFetcher;
use shadow_config::ShadowConfig;
use shadow_core::{AssetId, UnifiedAssetState};

use crate::bootstrap;
use crate::cli::{GlobalFlags, StatusArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct AssetStatus {
    asset: AssetId,
    state: UnifiedAssetState,
}

/// Handle `shadowctl status`.
pub async fn handle(
    args: &StatusArgs,
    config: &ShadowConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let client = bootstrap::connect(config, flags).await?;
    let concurrency = args.concurrency.unwrap_or(config.batch.concurrency);
    let fetcher = BatchFetcher::new(Arc::new(client), concurrency);

    let states = fetcher.fetch_all(&args.assets).await?;
    let rows = pair_with_assets(&args.assets, states);
    output(&rows, flags.format)
}

fn pair_with_assets(assets: &[AssetId], states: Vec<UnifiedAssetState>) -> Vec<AssetStatus> {
    assets
        .iter()
        .cloned()
        .zip(states)
        .map(|(asset, state)| AssetStatus { asset, state })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shadow_client::MemoryShadowClient;

    use super::*;

    #[tokio::test]
    async fn rows_are_keyed_by_requested_asset() {
        let store = MemoryShadowClient::from_fixture(json!({
            "a": {"state": {"reported": {"x": 1}}, "metadata": {"reported": {"x": {"timestamp": 5}}}},
            "b": {"state": {"reported": {"x": 2}}, "metadata": {"reported": {"x": {"timestamp": 6}}}}
        }))
        .unwrap();
        let assets = vec![AssetId::new("b"), AssetId::new("a")];
        let states = BatchFetcher::new(Arc::new(store), 2)
            .fetch_all(&assets)
            .await
            .unwrap();

        let rendered = serde_json::to_value(pair_with_assets(&assets, states)).unwrap();
        assert_eq!(rendered[0]["asset"], json!("b"));
        assert_eq!(rendered[0]["state"]["x"], json!(2));
        assert_eq!(rendered[1]["asset"], json!("a"));
        assert_eq!(rendered[1]["state"]["$metadata"]["x"], json!({"timestamp": 5}));
    }
}
