//! In-process shadow store.
//!
//! Backs tests and the CLI's fixture mode. Updates follow the store's merge
//! semantics: objects merge recursively, `null` deletes a field, anything
//! else replaces it. Every written leaf gets a fresh `{"timestamp": now}`
//! record in `metadata.reported`.

use std::collections::HashMap;

use serde_json::json;
use shadow_core::{AssetId, RawShadowDocument, Scalar, ShadowError, ShadowMap, ShadowValue, UpdateAck};
use tokio::sync::RwLock;

use crate::ShadowClient;

#[derive(Debug, Default)]
pub struct MemoryShadowClient {
    documents: RwLock<HashMap<AssetId, RawShadowDocument>>,
}

impl MemoryShadowClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object mapping asset ids to shadow documents.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowError::InvalidDocument`] naming the first entry that is
    /// not a valid shadow document, [`ShadowError::InvalidAssetId`] for an
    /// invalid key, or [`ShadowError::InvalidFixture`] if the fixture is not
    /// an object.
    pub fn from_fixture(fixture: serde_json::Value) -> Result<Self, ShadowError> {
        let serde_json::Value::Object(entries) = fixture else {
            return Err(ShadowError::InvalidFixture(
                "expected a JSON object keyed by asset id".into(),
            ));
        };

        let mut documents = HashMap::with_capacity(entries.len());
        for (key, raw) in entries {
            let asset = AssetId::parse(&key)?;
            let doc = serde_json::from_value(raw).map_err(|e| ShadowError::InvalidDocument {
                asset: asset.clone(),
                message: e.to_string(),
            })?;
            documents.insert(asset, doc);
        }
        Ok(Self {
            documents: RwLock::new(documents),
        })
    }
}

impl ShadowClient for MemoryShadowClient {
    async fn fetch(&self, asset: &AssetId) -> Result<RawShadowDocument, ShadowError> {
        self.documents
            .read()
            .await
            .get(asset)
            .cloned()
            .ok_or_else(|| ShadowError::NotFound {
                asset: asset.clone(),
            })
    }

    async fn update(&self, asset: &AssetId, reported: &ShadowMap) -> Result<UpdateAck, ShadowError> {
        let now = chrono::Utc::now().timestamp();
        let mut documents = self.documents.write().await;
        let doc = documents.entry(asset.clone()).or_default();

        merge_reported(
            &mut doc.state.reported,
            &mut doc.metadata.reported,
            reported,
            now,
        );
        doc.version += 1;
        doc.timestamp = now;

        Ok(UpdateAck {
            version: doc.version,
            timestamp: now,
        })
    }
}

fn merge_reported(state: &mut ShadowMap, metadata: &mut ShadowMap, patch: &ShadowMap, now: i64) {
    for (key, value) in patch {
        match value {
            ShadowValue::Scalar(Scalar::Null) => {
                state.remove(key);
                metadata.remove(key);
            }
            ShadowValue::Object(nested) => {
                let mut child_state = take_object(state, key);
                let mut child_meta = take_object(metadata, key);
                merge_reported(&mut child_state, &mut child_meta, nested, now);
                state.insert(key.clone(), child_state.into());
                metadata.insert(key.clone(), child_meta.into());
            }
            ShadowValue::Scalar(_) => {
                state.insert(key.clone(), value.clone());
                metadata.insert(key.clone(), timestamp_record(now));
            }
            ShadowValue::Array(items) => {
                state.insert(key.clone(), value.clone());
                let records = items.iter().map(|_| json!({ "timestamp": now })).collect();
                metadata.insert(key.clone(), ShadowValue::Array(records));
            }
        }
    }
}

/// Remove `map[key]`, keeping it only if it is an object.
fn take_object(map: &mut ShadowMap, key: &str) -> ShadowMap {
    map.remove(key)
        .and_then(ShadowValue::into_object)
        .unwrap_or_default()
}

fn timestamp_record(now: i64) -> ShadowValue {
    ShadowValue::Object(ShadowMap::from([("timestamp".to_string(), now.into())]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use shadow_core::{map_from_json, normalize_document};

    use super::*;

    fn patch(value: Value) -> ShadowMap {
        map_from_json(value).unwrap()
    }

    #[tokio::test]
    async fn fetch_unknown_asset_is_not_found() {
        let store = MemoryShadowClient::new();
        let err = store.fetch(&AssetId::new("ghost")).await.unwrap_err();
        assert!(matches!(err, ShadowError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_creates_document_with_metadata() {
        let store = MemoryShadowClient::new();
        let asset = AssetId::new("car-1");

        let ack = store
            .update(&asset, &patch(serde_json::json!({"speed": 60, "engine": {"temp": 90}})))
            .await
            .unwrap();
        assert_eq!(ack.version, 1);

        let doc = store.fetch(&asset).await.unwrap();
        assert_eq!(doc.version, 1);
        assert!(doc.metadata.reported["speed"].is_object());
        let unified = normalize_document(&doc).unwrap();
        assert_eq!(
            unified.get(&["engine", "temp"]).and_then(ShadowValue::as_i64),
            Some(90)
        );
    }

    #[tokio::test]
    async fn update_merges_and_null_deletes() {
        let store = MemoryShadowClient::new();
        let asset = AssetId::new("car-2");
        store
            .update(&asset, &patch(serde_json::json!({"a": 1, "b": {"c": 2, "d": 3}})))
            .await
            .unwrap();
        let ack = store
            .update(&asset, &patch(serde_json::json!({"a": null, "b": {"d": 4}})))
            .await
            .unwrap();
        assert_eq!(ack.version, 2);

        let doc = store.fetch(&asset).await.unwrap();
        let state: Value = ShadowValue::Object(doc.state.reported.clone()).into();
        assert_eq!(state, serde_json::json!({"b": {"c": 2, "d": 4}}));
        assert!(!doc.metadata.reported.contains_key("a"));
        assert!(normalize_document(&doc).is_ok());
    }

    #[tokio::test]
    async fn arrays_get_one_metadata_record_per_element() {
        let store = MemoryShadowClient::new();
        let asset = AssetId::new("car-3");
        store
            .update(&asset, &patch(serde_json::json!({"tyres": [2.4, 2.5]})))
            .await
            .unwrap();
        let doc = store.fetch(&asset).await.unwrap();
        match &doc.metadata.reported["tyres"] {
            ShadowValue::Array(records) => assert_eq!(records.len(), 2),
            other => panic!("expected array metadata, got {other:?}"),
        }
    }

    #[test]
    fn fixture_must_be_object() {
        assert!(matches!(
            MemoryShadowClient::from_fixture(serde_json::json!([1])),
            Err(ShadowError::InvalidFixture(_))
        ));
    }

    #[test]
    fn fixture_entries_are_checked() {
        assert!(matches!(
            MemoryShadowClient::from_fixture(serde_json::json!({"": {}})),
            Err(ShadowError::InvalidAssetId(_))
        ));
        assert!(matches!(
            MemoryShadowClient::from_fixture(serde_json::json!({"bus-1": {"version": "new"}})),
            Err(ShadowError::InvalidDocument { ref asset, .. }) if asset.as_str() == "bus-1"
        ));
    }

    #[tokio::test]
    async fn fixture_loads_documents() {
        let store = MemoryShadowClient::from_fixture(serde_json::json!({
            "bus-1": {
                "state": {"reported": {"doors": "closed"}},
                "metadata": {"reported": {"doors": {"timestamp": 1}}},
                "version": 5,
                "timestamp": 9
            }
        }))
        .unwrap();
        let doc = store.fetch(&AssetId::new("bus-1")).await.unwrap();
        assert_eq!(doc.version, 5);
    }
}
