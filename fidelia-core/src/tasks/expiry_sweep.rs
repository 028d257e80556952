// src/tasks/expiry_sweep.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use fidelia_common::traits::repository_traits::BenefitRepository;

use crate::cache::ResolutionCache;
use crate::Error;

/// Called on an external schedule (e.g. hourly) to batch-transition active
/// benefits whose validity window has ended to `Expired`, and to drop the
/// swept benefits from the resolution cache. The engine owns no timer of its
/// own.
pub async fn run_expiry_sweep(
    benefit_repo: &Arc<dyn BenefitRepository>,
    cache: &ResolutionCache,
) -> Result<usize, Error> {
    let now = Utc::now();
    let swept = benefit_repo.mark_expired_before(now).await?;

    if swept.is_empty() {
        info!("Expiry sweep: nothing to transition.");
        return Ok(0);
    }

    for benefit_id in &swept {
        cache.invalidate_benefit(*benefit_id);
    }
    cache.purge_expired();

    info!("Expiry sweep: transitioned {} benefit(s) to expired.", swept.len());
    Ok(swept.len())
}
