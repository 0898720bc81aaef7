//! Shadow documents as stored and as returned to callers.

use serde::{Deserialize, Deserializer, Serialize};

use crate::value::{ShadowMap, ShadowValue};

/// Reserved key holding the metadata subtree at every level of a
/// [`UnifiedAssetState`]. Reported state must never use it as a field name.
pub const METADATA_KEY: &str = "$metadata";

/// `state` or `metadata` section of a shadow document. Only `reported` is
/// read; `desired` and `delta` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedSection {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reported: ShadowMap,
}

/// Shadow document as retrieved from the state store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawShadowDocument {
    #[serde(default)]
    pub state: ReportedSection,
    /// Same shape as `state`, each leaf replaced by a timestamp record.
    #[serde(default)]
    pub metadata: ReportedSection,
    /// Epoch seconds at which the store produced this document.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub version: u64,
}

/// Acknowledgement returned by the store after a reported-state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub version: u64,
    pub timestamp: i64,
}

/// Reported state merged with its metadata.
///
/// Same shape as `state.reported`, plus a [`METADATA_KEY`] entry at every
/// nesting level. The root entry additionally carries the document
/// `timestamp` and `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnifiedAssetState(ShadowMap);

impl UnifiedAssetState {
    pub(crate) const fn from_tree(tree: ShadowMap) -> Self {
        Self(tree)
    }

    /// Root-level metadata subtree.
    #[must_use]
    pub fn metadata(&self) -> Option<&ShadowMap> {
        self.0.get(METADATA_KEY).and_then(ShadowValue::as_object)
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        self.metadata()?.get("timestamp")?.as_i64()
    }

    #[must_use]
    pub fn version(&self) -> Option<u64> {
        self.metadata()?.get("version")?.as_u64()
    }

    /// Look up a node by key path, e.g. `["engine", "temp"]`.
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&ShadowValue> {
        let (last, parents) = path.split_last()?;
        let mut level = &self.0;
        for key in parents {
            level = level.get(*key)?.as_object()?;
        }
        level.get(*last)
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        ShadowValue::Object(self.0.clone()).into()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<ShadowMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ShadowMap>::deserialize(deserializer)?.unwrap_or_default())
}
