//! Configuration loading and client construction shared by commands.

use std::path::Path;

use anyhow::Context;
use shadow_client::{ConfigCredentialProvider, HttpShadowClient, MemoryShadowClient, ShadowClient};
use shadow_config::ShadowConfig;
use shadow_core::{AssetId, RawShadowDocument, ShadowError, ShadowMap, UpdateAck};

use crate::cli::GlobalFlags;

pub fn load_config() -> anyhow::Result<ShadowConfig> {
    let config = ShadowConfig::load_with_dotenv().context("failed to load configuration")?;
    config.validate()?;
    Ok(config)
}

/// The store a command talks to: the real data plane or a local fixture.
#[derive(Debug)]
pub enum StoreClient {
    Http(HttpShadowClient),
    Fixture(MemoryShadowClient),
}

impl ShadowClient for StoreClient {
    async fn fetch(&self, asset: &AssetId) -> Result<RawShadowDocument, ShadowError> {
        match self {
            Self::Http(client) => client.fetch(asset).await,
            Self::Fixture(client) => client.fetch(asset).await,
        }
    }

    async fn update(&self, asset: &AssetId, reported: &ShadowMap) -> Result<UpdateAck, ShadowError> {
        match self {
            Self::Http(client) => client.update(asset, reported).await,
            Self::Fixture(client) => client.update(asset, reported).await,
        }
    }
}

/// Build the store client once for the whole command.
pub async fn connect(config: &ShadowConfig, flags: &GlobalFlags) -> anyhow::Result<StoreClient> {
    if let Some(path) = &flags.fixture {
        tracing::debug!(path = %path.display(), "serving shadows from fixture");
        return Ok(StoreClient::Fixture(load_fixture(path)?));
    }

    let provider = ConfigCredentialProvider::new(config.clone());
    let client = HttpShadowClient::connect(&provider)
        .await
        .context("failed to connect to the shadow store")?;
    Ok(StoreClient::Http(client))
}

fn load_fixture(path: &Path) -> anyhow::Result<MemoryShadowClient> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("fixture {} is not valid JSON", path.display()))?;
    MemoryShadowClient::from_fixture(value)
        .with_context(|| format!("fixture {} is not a shadow map", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::cli::OutputFormat;

    fn flags(fixture: Option<&Path>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            fixture: fixture.map(Path::to_path_buf),
        }
    }

    #[tokio::test]
    async fn fixture_flag_selects_memory_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"bus-1": {{"state": {{"reported": {{"doors": "open"}}}},
                "metadata": {{"reported": {{"doors": {{"timestamp": 3}}}}}},
                "version": 2, "timestamp": 4}}}}"#
        )
        .unwrap();

        let client = connect(&ShadowConfig::default(), &flags(Some(file.path())))
            .await
            .unwrap();
        assert!(matches!(client, StoreClient::Fixture(_)));
        let doc = client.fetch(&AssetId::new("bus-1")).await.unwrap();
        assert_eq!(doc.version, 2);
    }

    #[tokio::test]
    async fn missing_fixture_is_reported() {
        let err = connect(
            &ShadowConfig::default(),
            &flags(Some(Path::new("/nonexistent/shadows.json"))),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("failed to read fixture"));
    }

    #[tokio::test]
    async fn store_without_credentials_fails_to_connect() {
        let err = connect(&ShadowConfig::default(), &flags(None)).await.unwrap_err();
        assert!(format!("{err:#}").contains("no credentials configured"));
    }
}
