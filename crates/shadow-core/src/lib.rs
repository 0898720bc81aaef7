//! # shadow-core
//!
//! Core types, shadow tree model and error types for shadowsync.
//!
//! This crate provides the foundational types shared across all shadowsync crates:
//! - [`AssetId`], the opaque key naming one asset/thing
//! - [`ShadowValue`], the tagged tree used for reported state and metadata
//! - [`RawShadowDocument`] as returned by the state store and
//!   [`UnifiedAssetState`] as returned to callers
//! - The state/metadata normalizer
//! - Cross-cutting error types

pub mod document;
pub mod errors;
pub mod ids;
pub mod normalize;
pub mod value;

pub use document::{METADATA_KEY, RawShadowDocument, ReportedSection, UnifiedAssetState, UpdateAck};
pub use errors::ShadowError;
pub use ids::AssetId;
pub use normalize::{normalize, normalize_document};
pub use value::{Scalar, ShadowMap, ShadowValue, map_from_json};
