//! Asset identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ShadowError;

/// Longest thing name the state store accepts.
pub const MAX_ASSET_ID_LEN: usize = 128;

/// Opaque, caller-supplied key naming one asset (thing).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Wrap an identifier without validation.
    ///
    /// Use [`AssetId::parse`] for untrusted input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validate and wrap user-supplied input.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowError::InvalidAssetId`] if the id is empty, only
    /// whitespace, or longer than [`MAX_ASSET_ID_LEN`] bytes.
    pub fn parse(id: &str) -> Result<Self, ShadowError> {
        if id.trim().is_empty() {
            return Err(ShadowError::InvalidAssetId("asset id is empty".into()));
        }
        if id.len() > MAX_ASSET_ID_LEN {
            return Err(ShadowError::InvalidAssetId(format!(
                "asset id is {} bytes, limit is {MAX_ASSET_ID_LEN}",
                id.len()
            )));
        }
        Ok(Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AssetId {
    type Err = ShadowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
