// File: src/services/catalog/validity.rs

use chrono::{DateTime, Utc};

use fidelia_common::models::benefit::{BenefitState, SourcedBenefit};

/// Keep only benefits that are currently redeemable at `at`: active state,
/// window open, and quota headroom when a global quota is set. Applied fresh
/// on every catalog call, after any cache read.
pub fn filter_valid(at: DateTime<Utc>, items: Vec<SourcedBenefit>) -> Vec<SourcedBenefit> {
    items
        .into_iter()
        .filter(|item| {
            let b = &item.benefit;
            b.state == BenefitState::Active && b.window_contains(at) && b.has_quota_headroom()
        })
        .collect()
}

/// Final catalog ordering: featured benefits first, then newest first.
pub fn rank(items: &mut [SourcedBenefit]) {
    items.sort_by(|a, b| {
        b.benefit
            .featured
            .cmp(&a.benefit.featured)
            .then(b.benefit.created_at.cmp(&a.benefit.created_at))
    });
}
