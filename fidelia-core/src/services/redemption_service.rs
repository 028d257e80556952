// File: src/services/redemption_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use fidelia_common::models::benefit::{AccessMode, Benefit, BenefitState, DiscountKind};
use fidelia_common::models::member::{Member, MemberSnapshot};
use fidelia_common::models::redemption::{Redemption, RedemptionStatus};
use fidelia_common::traits::repository_traits::{
    BenefitRepository, BusinessRepository, MemberRepository, RedemptionRepository,
};

use crate::cache::ResolutionCache;
use crate::Error;

/// Validates a single redemption attempt against live state and performs the
/// atomic counter increment + record insert. Every read here goes to the
/// store, never the resolution cache, to minimize staleness on the write
/// path. Failures abort with a typed error and zero side effects.
pub struct RedemptionService {
    benefit_repo: Arc<dyn BenefitRepository>,
    redemption_repo: Arc<dyn RedemptionRepository>,
    member_repo: Arc<dyn MemberRepository>,
    business_repo: Arc<dyn BusinessRepository>,
    cache: Arc<ResolutionCache>,
}

impl RedemptionService {
    pub fn new(
        benefit_repo: Arc<dyn BenefitRepository>,
        redemption_repo: Arc<dyn RedemptionRepository>,
        member_repo: Arc<dyn MemberRepository>,
        business_repo: Arc<dyn BusinessRepository>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self { benefit_repo, redemption_repo, member_repo, business_repo, cache }
    }

    pub async fn redeem(
        &self,
        benefit_id: Uuid,
        member_id: Uuid,
        member_snapshot: &MemberSnapshot,
        business_id: Uuid,
        association_id: Option<Uuid>,
        original_amount: Option<f64>,
    ) -> Result<Redemption, Error> {
        let benefit = self
            .benefit_repo
            .get_benefit_by_id(benefit_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("benefit {benefit_id}")))?;

        // An exhausted benefit reports the quota reason, not a generic
        // inactive one.
        if benefit.state == BenefitState::Exhausted {
            return Err(Error::QuotaExhausted);
        }
        if benefit.state != BenefitState::Active {
            return Err(Error::NotActive);
        }

        let now = Utc::now();
        if now < benefit.valid_from {
            return Err(Error::NotYetStarted);
        }
        if now >= benefit.valid_until {
            return Err(Error::Expired);
        }

        // Fast-fail checks. The transaction below re-enforces the global
        // quota with a conditional write, so a race past this point still
        // cannot over-spend.
        if !benefit.has_quota_headroom() {
            return Err(Error::QuotaExhausted);
        }

        if let Some(limit) = benefit.per_member_limit {
            let used = self
                .redemption_repo
                .count_used_for_member(benefit_id, member_id)
                .await?;
            if used >= i64::from(limit) {
                return Err(Error::PerMemberQuotaExceeded);
            }
        }

        let member = self.member_repo.get_member_by_id(member_id).await?;
        if !self.member_qualifies(&benefit, member.as_ref()).await? {
            return Err(Error::AccessDenied { benefit_id, member_id });
        }

        let discount_applied =
            compute_discount(benefit.discount_kind, benefit.discount_value, original_amount);

        let redemption = Redemption {
            redemption_id: Uuid::new_v4(),
            benefit_id,
            benefit_title: benefit.title.clone(),
            member_id,
            member_name: member_snapshot.name.clone(),
            member_email: member_snapshot.email.clone(),
            business_id,
            business_name: benefit.business_name.clone(),
            association_id,
            // No association entity exists to resolve a name from.
            association_name: None,
            redeemed_at: now,
            discount_applied,
            original_amount,
            final_amount: original_amount.map(|amt| amt - discount_applied),
            status: RedemptionStatus::Used,
        };

        let outcome = self
            .benefit_repo
            .redeem_transaction(benefit_id, &redemption)
            .await?;

        self.cache.invalidate_benefit(benefit_id);

        info!(
            "Member {member_id} redeemed benefit '{}' (usage {}{})",
            benefit.title,
            outcome.usage_count,
            if outcome.exhausted { ", now exhausted" } else { "" },
        );
        Ok(redemption)
    }

    pub async fn get_redemption_history(
        &self,
        member_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Redemption>, Error> {
        self.redemption_repo.list_for_member(member_id, limit).await
    }

    /// Eligibility: public benefits are open to anyone; otherwise the member
    /// must hold the granted association, be directly affiliated with the
    /// owning business, or belong to an association linked to that business.
    async fn member_qualifies(
        &self,
        benefit: &Benefit,
        member: Option<&Member>,
    ) -> Result<bool, Error> {
        if benefit.access_mode == AccessMode::Public {
            return Ok(true);
        }
        let Some(member) = member else {
            debug!("unknown member attempting non-public benefit");
            return Ok(false);
        };

        if let Some(assoc) = member.association_id {
            if benefit.association_ids.contains(&assoc) {
                return Ok(true);
            }
        }

        if member.affiliated_business_ids.contains(&benefit.business_id) {
            return Ok(true);
        }

        if let Some(assoc) = member.association_id {
            let owning = self.business_repo.get_business_by_id(benefit.business_id).await?;
            if let Some(business) = owning {
                if business.association_ids.contains(&assoc) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

/// Percentage discounts apply the rate to the original amount; fixed-amount
/// discounts are capped at the original amount; free-item treats the whole
/// amount as discount. Without an original amount there is no base, so
/// percentage and free-item resolve to zero and fixed-amount to face value.
pub fn compute_discount(kind: DiscountKind, value: f64, original_amount: Option<f64>) -> f64 {
    match (kind, original_amount) {
        (DiscountKind::Percentage, Some(amount)) => amount * value / 100.0,
        (DiscountKind::Percentage, None) => 0.0,
        (DiscountKind::FixedAmount, Some(amount)) => value.min(amount),
        (DiscountKind::FixedAmount, None) => value,
        (DiscountKind::FreeItem, Some(amount)) => amount,
        (DiscountKind::FreeItem, None) => 0.0,
    }
}
