//! Batch fetch settings.

use serde::{Deserialize, Serialize};

/// Default number of fetches admitted concurrently.
pub const DEFAULT_CONCURRENCY: usize = 25;

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Admission slots shared by one batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(BatchConfig::default().concurrency, 25);
    }
}
