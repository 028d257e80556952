// File: src/services/stats_service.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use fidelia_common::models::benefit::{Benefit, BenefitState};
use fidelia_common::models::redemption::{Redemption, RedemptionStatus};
use fidelia_common::models::stats::{
    BenefitStats, BusinessCount, CategoryCount, MonthlyUsage, TopBenefit,
};
use fidelia_common::traits::repository_traits::{BenefitRepository, RedemptionRepository};

use crate::Error;

const TOP_BENEFITS: usize = 5;
const SNAPSHOT_LIMIT: i64 = 10_000;

/// Derives usage/savings statistics from a snapshot of benefits and
/// redemption history. The derivation itself is pure and deterministic;
/// `load_and_compute` is a convenience that gathers the snapshot first.
pub struct StatsService {
    benefit_repo: Arc<dyn BenefitRepository>,
    redemption_repo: Arc<dyn RedemptionRepository>,
}

impl StatsService {
    pub fn new(
        benefit_repo: Arc<dyn BenefitRepository>,
        redemption_repo: Arc<dyn RedemptionRepository>,
    ) -> Self {
        Self { benefit_repo, redemption_repo }
    }

    pub async fn load_and_compute(
        &self,
        business_id: Option<Uuid>,
        since: Option<DateTime<Utc>>,
    ) -> Result<BenefitStats, Error> {
        let benefits = match business_id {
            Some(bid) => self.benefit_repo.list_for_owner(bid).await?,
            None => self.benefit_repo.list_all(SNAPSHOT_LIMIT).await?,
        };
        let redemptions = match (business_id, since) {
            (Some(bid), _) => self.redemption_repo.list_for_business(bid, SNAPSHOT_LIMIT).await?,
            (None, Some(cutoff)) => self.redemption_repo.list_since(cutoff, SNAPSHOT_LIMIT).await?,
            (None, None) => self.redemption_repo.list_all(SNAPSHOT_LIMIT).await?,
        };
        Ok(compute_stats(&benefits, &redemptions, Utc::now()))
    }
}

/// Deterministic aggregation over the given snapshot; `at` anchors the
/// "this month" bucket.
pub fn compute_stats(
    benefits: &[Benefit],
    redemptions: &[Redemption],
    at: DateTime<Utc>,
) -> BenefitStats {
    let used: Vec<&Redemption> = redemptions
        .iter()
        .filter(|r| r.status == RedemptionStatus::Used)
        .collect();

    let total_savings: f64 = used.iter().map(|r| r.discount_applied).sum();
    let savings_this_month: f64 = used
        .iter()
        .filter(|r| r.redeemed_at.year() == at.year() && r.redeemed_at.month() == at.month())
        .map(|r| r.discount_applied)
        .sum();

    // Month buckets, ascending by "YYYY-MM" key.
    let mut months: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for r in &used {
        let key = format!("{}-{:02}", r.redeemed_at.year(), r.redeemed_at.month());
        let slot = months.entry(key).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += r.discount_applied;
    }
    let usage_by_month = months
        .into_iter()
        .map(|(month, (redemptions, savings))| MonthlyUsage { month, redemptions, savings })
        .collect();

    // Most-redeemed benefits, title as the deterministic tie-break.
    let mut per_benefit: BTreeMap<Uuid, (String, usize, f64)> = BTreeMap::new();
    for r in &used {
        let slot = per_benefit
            .entry(r.benefit_id)
            .or_insert_with(|| (r.benefit_title.clone(), 0, 0.0));
        slot.1 += 1;
        slot.2 += r.discount_applied;
    }
    let mut top_benefits: Vec<TopBenefit> = per_benefit
        .into_iter()
        .map(|(benefit_id, (title, redemptions, savings))| TopBenefit {
            benefit_id,
            title,
            redemptions,
            savings,
        })
        .collect();
    top_benefits.sort_by(|a, b| b.redemptions.cmp(&a.redemptions).then(a.title.cmp(&b.title)));
    top_benefits.truncate(TOP_BENEFITS);

    // Per-category benefit and redemption counts.
    let mut categories: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for b in benefits {
        let key = b.category.clone().unwrap_or_else(|| "uncategorized".to_string());
        categories.entry(key).or_insert((0, 0)).0 += 1;
    }
    for r in &used {
        let category = benefits
            .iter()
            .find(|b| b.benefit_id == r.benefit_id)
            .and_then(|b| b.category.clone())
            .unwrap_or_else(|| "uncategorized".to_string());
        categories.entry(category).or_insert((0, 0)).1 += 1;
    }
    let by_category = categories
        .into_iter()
        .map(|(category, (benefits, redemptions))| CategoryCount {
            category,
            benefits,
            redemptions,
        })
        .collect();

    // Per-business rollup, keyed by id, name taken from the benefit side.
    let mut businesses: BTreeMap<Uuid, BusinessCount> = BTreeMap::new();
    for b in benefits {
        let slot = businesses.entry(b.business_id).or_insert_with(|| BusinessCount {
            business_id: b.business_id,
            business_name: b.business_name.clone(),
            benefits: 0,
            redemptions: 0,
            savings: 0.0,
        });
        slot.benefits += 1;
    }
    for r in &used {
        let slot = businesses.entry(r.business_id).or_insert_with(|| BusinessCount {
            business_id: r.business_id,
            business_name: r.business_name.clone(),
            benefits: 0,
            redemptions: 0,
            savings: 0.0,
        });
        slot.redemptions += 1;
        slot.savings += r.discount_applied;
    }
    let mut by_business: Vec<BusinessCount> = businesses.into_values().collect();
    by_business.sort_by(|a, b| {
        b.redemptions
            .cmp(&a.redemptions)
            .then(a.business_name.cmp(&b.business_name))
    });

    BenefitStats {
        total_benefits: benefits.len(),
        active_benefits: benefits.iter().filter(|b| b.state == BenefitState::Active).count(),
        used_count: used.len(),
        expired_count: benefits.iter().filter(|b| b.state == BenefitState::Expired).count(),
        total_savings,
        savings_this_month,
        usage_by_month,
        top_benefits,
        by_category,
        by_business,
    }
}
