//! Merge reported state with reported metadata.
//!
//! The normalizer walks `state.reported` and the parallel
//! `metadata.reported` tree in lockstep and produces a tree of the same shape
//! as the state, with the untransformed metadata subtree attached under
//! [`METADATA_KEY`] at every object level.
//!
//! Rules:
//! - Object values recurse against the metadata entry of the same key, which
//!   must itself be an object.
//! - Scalars and arrays are copied as-is. Arrays are never descended into.
//! - Every state key needs a metadata key at the same path, otherwise the
//!   document is malformed ([`ShadowError::ShapeMismatch`]).
//! - Metadata keys with no state counterpart are not visited. They remain
//!   visible inside the level's `$metadata`.
//! - A state field named `$metadata` is rejected
//!   ([`ShadowError::ReservedField`]).

use crate::document::{METADATA_KEY, RawShadowDocument, UnifiedAssetState};
use crate::errors::ShadowError;
use crate::value::{ShadowMap, ShadowValue};

/// Normalize a `(state, metadata)` pair.
///
/// Pure and synchronous; the same input always yields the same output.
///
/// # Errors
///
/// Returns [`ShadowError::ShapeMismatch`] with the dotted path of the first
/// state field lacking matching metadata, or [`ShadowError::ReservedField`]
/// if a state field is named `$metadata`.
pub fn normalize(state: &ShadowMap, metadata: &ShadowMap) -> Result<ShadowMap, ShadowError> {
    let mut path = Vec::new();
    normalize_level(state, metadata, &mut path)
}

/// Normalize a whole document and annotate the root `$metadata` with the
/// document `timestamp` and `version`.
///
/// Those two entries replace the metadata records of top-level state fields
/// that happen to be named `timestamp` or `version`. The state values
/// themselves are kept.
///
/// # Errors
///
/// Same as [`normalize`].
pub fn normalize_document(doc: &RawShadowDocument) -> Result<UnifiedAssetState, ShadowError> {
    let mut tree = normalize(&doc.state.reported, &doc.metadata.reported)?;
    if let Some(ShadowValue::Object(root)) = tree.get_mut(METADATA_KEY) {
        root.insert("timestamp".to_string(), doc.timestamp.into());
        root.insert("version".to_string(), doc.version.into());
    }
    Ok(UnifiedAssetState::from_tree(tree))
}

fn normalize_level<'a>(
    state: &'a ShadowMap,
    metadata: &ShadowMap,
    path: &mut Vec<&'a str>,
) -> Result<ShadowMap, ShadowError> {
    let mut out = ShadowMap::new();

    for (key, value) in state {
        path.push(key);

        if key == METADATA_KEY {
            return Err(ShadowError::ReservedField {
                path: path.join("."),
            });
        }
        let Some(field_meta) = metadata.get(key) else {
            return Err(ShadowError::ShapeMismatch {
                path: path.join("."),
            });
        };

        let merged = match value {
            ShadowValue::Object(nested) => {
                let ShadowValue::Object(nested_meta) = field_meta else {
                    return Err(ShadowError::ShapeMismatch {
                        path: path.join("."),
                    });
                };
                ShadowValue::Object(normalize_level(nested, nested_meta, path)?)
            }
            ShadowValue::Scalar(_) | ShadowValue::Array(_) => value.clone(),
        };

        path.pop();
        out.insert(key.clone(), merged);
    }

    out.insert(METADATA_KEY.to_string(), ShadowValue::Object(metadata.clone()));
    Ok(out)
}
