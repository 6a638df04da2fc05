//! Batch orchestration over any [`FetchAdapter`].
//!
//! Entities are fetched one at a time, in input order. Each one gets exactly
//! one entry in the [`BatchResult`]:
//! - validated payload -> `Data`
//! - vendor soft failure -> `Empty`
//! - entity-tier error (network, HTTP, parse) -> `Failed`, and the batch continues
//!
//! Configuration-tier errors (missing credential, unsupported selector) abort
//! the batch and are returned to the caller.

use tracing::{debug, error, info, warn};

use crate::errors::IngestError;
use crate::models::{BatchResult, FetchOutcome, Validated};
use crate::provider::FetchAdapter;

/// Fetch every entity with the same selector, throttling per the adapter's
/// [`RateLimit`](crate::provider::RateLimit).
pub async fn fetch_batch<A, S>(
    adapter: &A,
    entities: &[S],
    selector: &A::Selector,
) -> Result<BatchResult, IngestError>
where
    A: FetchAdapter + ?Sized,
    S: AsRef<str> + Sync,
{
    let limit = adapter.rate_limit();
    let total = entities.len();
    let mut result = BatchResult::with_capacity(total);

    for (idx, entity) in entities.iter().enumerate() {
        let entity = entity.as_ref();
        info!(
            "{}: processing {} {} ({}/{})",
            adapter.id(),
            selector,
            entity,
            idx + 1,
            total
        );

        let outcome = match adapter.fetch(entity, selector).await {
            Ok(Validated::Payload(payload)) => FetchOutcome::Data { payload },
            Ok(Validated::NoData { reason }) => {
                warn!("{}: no data for {}: {}", adapter.id(), entity, reason);
                FetchOutcome::Empty { reason }
            }
            Err(e) if e.is_configuration() => {
                error!("{}: aborting batch at {}: {}", adapter.id(), entity, e);
                return Err(e);
            }
            Err(e) => {
                error!("{}: error fetching data for {}: {}", adapter.id(), entity, e);
                FetchOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        result.push(entity, outcome);

        if limit.should_pause_after(idx + 1) {
            debug!(
                "{}: rate limit throttle, waiting {:?}",
                adapter.id(),
                limit.pause
            );
            tokio::time::sleep(limit.pause).await;
            result.record_pause();
        }
    }

    info!(
        "{}: batch complete - {} ok, {} empty, {} failed",
        adapter.id(),
        result.succeeded(),
        result.empty(),
        result.failed()
    );

    Ok(result)
}
