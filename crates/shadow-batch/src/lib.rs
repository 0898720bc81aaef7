//! # shadow-batch
//!
//! Bulk shadow retrieval with bounded concurrency.
//!
//! [`BatchFetcher::fetch_all`] runs one fetch+normalize unit per asset on a
//! [`JoinSet`]. The set doubles as the admission window: at most
//! `concurrency` units are spawned and not yet collected, the rest stay queued
//! until a result is collected. Results are buffered by input index and come
//! back in input order. The first failure (by completion order) fails the
//! whole batch: queued units are never started, units already talking to the
//! store are detached and left to finish, their results dropped.

mod state;

use std::sync::Arc;

use shadow_client::ShadowClient;
use shadow_core::{AssetId, ShadowError, UnifiedAssetState, normalize_document};
use tokio::task::JoinSet;

pub use state::{BatchState, ItemState};

/// Fetches and normalizes shadows for many assets through one client.
#[derive(Debug)]
pub struct BatchFetcher<C> {
    client: Arc<C>,
    concurrency: usize,
}

impl<C> Clone for BatchFetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            concurrency: self.concurrency,
        }
    }
}

impl<C: ShadowClient + 'static> BatchFetcher<C> {
    /// Wrap a client with an admission window of `concurrency` slots.
    ///
    /// A `concurrency` of zero is raised to one.
    #[must_use]
    pub fn new(client: Arc<C>, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch and normalize a single asset, outside any admission window.
    ///
    /// # Errors
    ///
    /// Returns the client's or the normalizer's [`ShadowError`] unchanged.
    pub async fn fetch_one(&self, asset: &AssetId) -> Result<UnifiedAssetState, ShadowError> {
        fetch_and_normalize(self.client.as_ref(), asset).await
    }

    /// Fetch and normalize every asset, preserving input order.
    ///
    /// Returns only once every asset has been processed. Duplicate ids are
    /// fetched once per occurrence. An empty input makes no remote calls.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShadowError`] observed, unchanged. No partial
    /// results are returned. A worker panic surfaces as
    /// [`ShadowError::TaskFailed`].
    pub async fn fetch_all(
        &self,
        assets: &[AssetId],
    ) -> Result<Vec<UnifiedAssetState>, ShadowError> {
        if assets.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            items = assets.len(),
            concurrency = self.concurrency,
            state = %BatchState::Running,
            item_state = %ItemState::Queued,
            "batch started"
        );

        let mut queue = assets.iter().cloned().enumerate();
        let mut set = JoinSet::new();
        let mut slots: Vec<Option<UnifiedAssetState>> = assets.iter().map(|_| None).collect();

        loop {
            // Admission happens only here, after the previous result was
            // observed, so nothing new starts once a failure is seen.
            while set.len() < self.concurrency {
                let Some((idx, asset)) = queue.next() else {
                    break;
                };
                let client = Arc::clone(&self.client);
                tracing::debug!(%asset, idx, state = %ItemState::InFlight, "admitted");
                set.spawn(async move {
                    let result = fetch_and_normalize(client.as_ref(), &asset).await;
                    (idx, asset, result)
                });
            }

            let Some(joined) = set.join_next().await else {
                break;
            };
            let failure = match joined {
                Ok((idx, asset, Ok(unified))) => {
                    tracing::debug!(%asset, idx, state = %ItemState::Normalized, "item done");
                    slots[idx] = Some(unified);
                    continue;
                }
                Ok((idx, asset, Err(err))) => {
                    tracing::warn!(%asset, idx, state = %ItemState::Failed, %err, "item failed");
                    err
                }
                Err(join_err) => {
                    tracing::warn!(%join_err, state = %ItemState::Failed, "batch worker failed");
                    ShadowError::TaskFailed(join_err.to_string())
                }
            };

            // Dispatched calls run to completion unobserved; queued items never start.
            set.detach_all();
            tracing::warn!(
                items = assets.len(),
                not_started = queue.len(),
                state = %BatchState::Failed,
                "batch failed"
            );
            return Err(failure);
        }

        let results = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ShadowError::TaskFailed("batch finished with missing results".into()))?;

        tracing::info!(items = results.len(), state = %BatchState::Completed, "batch completed");
        Ok(results)
    }
}

async fn fetch_and_normalize<C: ShadowClient>(
    client: &C,
    asset: &AssetId,
) -> Result<UnifiedAssetState, ShadowError> {
    let document = client.fetch(asset).await?;
    normalize_document(&document)
}
