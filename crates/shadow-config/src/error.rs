//! Errors raised while loading or checking shadowsync settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML file or `SHADOWSYNC_*` variable could not be read into the
    /// settings structs.
    #[error("cannot load shadowsync settings: {0}")]
    Load(#[from] figment::Error),

    /// A section the requested operation depends on has no usable values.
    #[error("[{section}] is required for this operation but is not set")]
    MissingSection { section: &'static str },

    /// A value parsed but is outside what the client or orchestrator accept.
    #[error("{field} {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}
