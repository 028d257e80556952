// File: fidelia-core/tests/support/mod.rs
//
// In-memory store implementing the repository traits, so engine tests run
// against the same trait surface as the Postgres repositories.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use fidelia_common::error::Error;
use fidelia_common::models::benefit::{AccessMode, Benefit, BenefitState, DiscountKind};
use fidelia_common::models::business::Business;
use fidelia_common::models::member::Member;
use fidelia_common::models::redemption::{Redemption, RedemptionStatus};
use fidelia_common::traits::repository_traits::{
    BenefitRepository, BusinessRepository, MemberRepository, RedeemOutcome,
    RedemptionRepository,
};

#[derive(Default)]
struct StoreState {
    benefits: HashMap<Uuid, Benefit>,
    redemptions: Vec<Redemption>,
    members: HashMap<Uuid, Member>,
    businesses: HashMap<Uuid, Business>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    /// When set, access-mode listings fail, for path-degradation tests.
    fail_access_mode_queries: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_benefit(&self, benefit: Benefit) {
        let mut state = self.state.lock().unwrap();
        state.benefits.insert(benefit.benefit_id, benefit);
    }

    pub fn put_member(&self, member: Member) {
        let mut state = self.state.lock().unwrap();
        state.members.insert(member.member_id, member);
    }

    pub fn put_business(&self, business: Business) {
        let mut state = self.state.lock().unwrap();
        state.businesses.insert(business.business_id, business);
    }

    pub fn benefit(&self, benefit_id: Uuid) -> Option<Benefit> {
        self.state.lock().unwrap().benefits.get(&benefit_id).cloned()
    }

    pub fn redemption_count(&self) -> usize {
        self.state.lock().unwrap().redemptions.len()
    }

    pub fn set_fail_access_mode_queries(&self, fail: bool) {
        self.fail_access_mode_queries.store(fail, Ordering::SeqCst);
    }

    fn sorted_newest_first(mut benefits: Vec<Benefit>, limit: i64) -> Vec<Benefit> {
        benefits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        benefits.truncate(limit.max(0) as usize);
        benefits
    }
}

#[async_trait]
impl BenefitRepository for InMemoryStore {
    async fn create_benefit(&self, benefit: &Benefit) -> Result<(), Error> {
        self.put_benefit(benefit.clone());
        Ok(())
    }

    async fn get_benefit_by_id(&self, benefit_id: Uuid) -> Result<Option<Benefit>, Error> {
        Ok(self.benefit(benefit_id))
    }

    async fn update_benefit(&self, benefit: &Benefit) -> Result<(), Error> {
        self.put_benefit(benefit.clone());
        Ok(())
    }

    async fn set_benefit_state(&self, benefit_id: Uuid, state: BenefitState) -> Result<(), Error> {
        let mut guard = self.state.lock().unwrap();
        if let Some(b) = guard.benefits.get_mut(&benefit_id) {
            b.state = state;
            b.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_by_access_mode(&self, mode: AccessMode, limit: i64) -> Result<Vec<Benefit>, Error> {
        if self.fail_access_mode_queries.load(Ordering::SeqCst) {
            return Err(Error::Parse("store offline".into()));
        }
        let state = self.state.lock().unwrap();
        let matching = state
            .benefits
            .values()
            .filter(|b| b.access_mode == mode)
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching, limit))
    }

    async fn list_for_association(&self, association_id: Uuid, limit: i64) -> Result<Vec<Benefit>, Error> {
        let state = self.state.lock().unwrap();
        let matching = state
            .benefits
            .values()
            .filter(|b| {
                b.access_mode == AccessMode::AssociationScoped
                    && b.association_ids.contains(&association_id)
            })
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching, limit))
    }

    async fn list_for_businesses(&self, business_ids: &[Uuid], limit: i64) -> Result<Vec<Benefit>, Error> {
        let state = self.state.lock().unwrap();
        let matching = state
            .benefits
            .values()
            .filter(|b| business_ids.contains(&b.business_id))
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching, limit))
    }

    async fn list_active(&self, limit: i64) -> Result<Vec<Benefit>, Error> {
        let state = self.state.lock().unwrap();
        let matching = state
            .benefits
            .values()
            .filter(|b| b.state == BenefitState::Active)
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching, limit))
    }

    async fn list_all(&self, limit: i64) -> Result<Vec<Benefit>, Error> {
        let state = self.state.lock().unwrap();
        let all = state.benefits.values().cloned().collect();
        Ok(Self::sorted_newest_first(all, limit))
    }

    async fn list_for_owner(&self, business_id: Uuid) -> Result<Vec<Benefit>, Error> {
        let state = self.state.lock().unwrap();
        let matching = state
            .benefits
            .values()
            .filter(|b| b.business_id == business_id)
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching, i64::MAX))
    }

    async fn redeem_transaction(
        &self,
        benefit_id: Uuid,
        redemption: &Redemption,
    ) -> Result<RedeemOutcome, Error> {
        let mut state = self.state.lock().unwrap();
        let benefit = match state.benefits.get_mut(&benefit_id) {
            Some(b) => b,
            None => return Err(Error::NotFound(format!("benefit {benefit_id}"))),
        };
        if benefit.state == BenefitState::Exhausted {
            return Err(Error::QuotaExhausted);
        }
        if benefit.state != BenefitState::Active {
            return Err(Error::NotActive);
        }
        if !benefit.has_quota_headroom() {
            return Err(Error::QuotaExhausted);
        }

        benefit.usage_count += 1;
        let exhausted = matches!(benefit.max_redemptions, Some(max) if benefit.usage_count >= max);
        if exhausted {
            benefit.state = BenefitState::Exhausted;
        }
        let usage_count = benefit.usage_count;
        state.redemptions.push(redemption.clone());
        Ok(RedeemOutcome { usage_count, exhausted })
    }

    async fn mark_expired_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>, Error> {
        let mut state = self.state.lock().unwrap();
        let mut swept = Vec::new();
        for benefit in state.benefits.values_mut() {
            if benefit.state == BenefitState::Active && benefit.valid_until <= cutoff {
                benefit.state = BenefitState::Expired;
                swept.push(benefit.benefit_id);
            }
        }
        Ok(swept)
    }
}

#[async_trait]
impl RedemptionRepository for InMemoryStore {
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<(), Error> {
        self.state.lock().unwrap().redemptions.push(redemption.clone());
        Ok(())
    }

    async fn list_for_member(&self, member_id: Uuid, limit: i64) -> Result<Vec<Redemption>, Error> {
        let state = self.state.lock().unwrap();
        let mut result: Vec<Redemption> = state
            .redemptions
            .iter()
            .filter(|r| r.member_id == member_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        result.truncate(limit.max(0) as usize);
        Ok(result)
    }

    async fn list_for_business(&self, business_id: Uuid, limit: i64) -> Result<Vec<Redemption>, Error> {
        let state = self.state.lock().unwrap();
        let mut result: Vec<Redemption> = state
            .redemptions
            .iter()
            .filter(|r| r.business_id == business_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        result.truncate(limit.max(0) as usize);
        Ok(result)
    }

    async fn list_all(&self, limit: i64) -> Result<Vec<Redemption>, Error> {
        let state = self.state.lock().unwrap();
        let mut result = state.redemptions.clone();
        result.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        result.truncate(limit.max(0) as usize);
        Ok(result)
    }

    async fn list_since(&self, since: DateTime<Utc>, limit: i64) -> Result<Vec<Redemption>, Error> {
        let state = self.state.lock().unwrap();
        let mut result: Vec<Redemption> = state
            .redemptions
            .iter()
            .filter(|r| r.redeemed_at >= since)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        result.truncate(limit.max(0) as usize);
        Ok(result)
    }

    async fn count_used_for_member(&self, benefit_id: Uuid, member_id: Uuid) -> Result<i64, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .redemptions
            .iter()
            .filter(|r| {
                r.benefit_id == benefit_id
                    && r.member_id == member_id
                    && r.status == RedemptionStatus::Used
            })
            .count() as i64)
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn get_member_by_id(&self, member_id: Uuid) -> Result<Option<Member>, Error> {
        Ok(self.state.lock().unwrap().members.get(&member_id).cloned())
    }
}

#[async_trait]
impl BusinessRepository for InMemoryStore {
    async fn get_business_by_id(&self, business_id: Uuid) -> Result<Option<Business>, Error> {
        Ok(self.state.lock().unwrap().businesses.get(&business_id).cloned())
    }

    async fn list_ids_for_association(&self, association_id: Uuid) -> Result<Vec<Uuid>, Error> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<Uuid> = state
            .businesses
            .values()
            .filter(|b| b.association_ids.contains(&association_id))
            .map(|b| b.business_id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

// ----------------------------------------------------------------------
// Builders
// ----------------------------------------------------------------------

pub fn active_benefit(title: &str, business_id: Uuid) -> Benefit {
    let now = Utc::now();
    Benefit {
        benefit_id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{title} description"),
        discount_kind: DiscountKind::Percentage,
        discount_value: 10.0,
        valid_from: now - Duration::days(1),
        valid_until: now + Duration::days(30),
        state: BenefitState::Active,
        access_mode: AccessMode::Public,
        business_id,
        business_name: "Cafe Norte".to_string(),
        business_logo_url: None,
        association_ids: vec![],
        max_redemptions: None,
        per_member_limit: None,
        usage_count: 0,
        category: None,
        tags: vec![],
        featured: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn member_with(
    association_id: Option<Uuid>,
    affiliated_business_ids: Vec<Uuid>,
) -> Member {
    Member {
        member_id: Uuid::new_v4(),
        name: "Ana Pérez".to_string(),
        email: Some("ana@example.com".to_string()),
        association_id,
        affiliated_business_ids,
        active: true,
    }
}

pub fn used_redemption(benefit: &Benefit, member_id: Uuid, discount: f64, at: DateTime<Utc>) -> Redemption {
    Redemption {
        redemption_id: Uuid::new_v4(),
        benefit_id: benefit.benefit_id,
        benefit_title: benefit.title.clone(),
        member_id,
        member_name: "Ana Pérez".to_string(),
        member_email: None,
        business_id: benefit.business_id,
        business_name: benefit.business_name.clone(),
        association_id: None,
        association_name: None,
        redeemed_at: at,
        discount_applied: discount,
        original_amount: None,
        final_amount: None,
        status: RedemptionStatus::Used,
    }
}

pub fn business_with(name: &str, association_ids: Vec<Uuid>) -> Business {
    Business {
        business_id: Uuid::new_v4(),
        name: name.to_string(),
        logo_url: None,
        association_ids,
    }
}
