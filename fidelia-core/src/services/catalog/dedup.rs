// File: src/services/catalog/dedup.rs

use std::collections::HashSet;

use fidelia_common::models::benefit::SourcedBenefit;

/// Collapse duplicate benefit ids surfaced by multiple visibility paths.
/// First-seen-wins: the earliest occurrence keeps its origin tag, later
/// duplicates are dropped. Callers assemble path results in priority order.
pub fn merge(items: Vec<SourcedBenefit>) -> Vec<SourcedBenefit> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.benefit.benefit_id))
        .collect()
}
