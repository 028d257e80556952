// File: fidelia-common/src/traits/repository_traits.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::benefit::{AccessMode, Benefit, BenefitState};
use crate::models::business::Business;
use crate::models::member::Member;
use crate::models::redemption::Redemption;

/// Result of the atomic redemption write: the post-increment usage counter
/// and whether the benefit flipped to `Exhausted` in the same transaction.
#[derive(Debug, Clone, Copy)]
pub struct RedeemOutcome {
    pub usage_count: i32,
    pub exhausted: bool,
}

#[async_trait]
pub trait BenefitRepository: Send + Sync {
    async fn create_benefit(&self, benefit: &Benefit) -> Result<(), Error>;
    async fn get_benefit_by_id(&self, benefit_id: Uuid) -> Result<Option<Benefit>, Error>;
    async fn update_benefit(&self, benefit: &Benefit) -> Result<(), Error>;
    async fn set_benefit_state(&self, benefit_id: Uuid, state: BenefitState) -> Result<(), Error>;

    /// Benefits with the given access mode, newest first.
    async fn list_by_access_mode(&self, mode: AccessMode, limit: i64) -> Result<Vec<Benefit>, Error>;

    /// Association-scoped benefits whose granted-association set contains
    /// `association_id`.
    async fn list_for_association(&self, association_id: Uuid, limit: i64) -> Result<Vec<Benefit>, Error>;

    /// Benefits owned by any of the given businesses. Callers chunk the id
    /// list to at most 10 per call; implementations may reject longer lists.
    async fn list_for_businesses(&self, business_ids: &[Uuid], limit: i64) -> Result<Vec<Benefit>, Error>;

    /// All currently-active benefits regardless of visibility path.
    async fn list_active(&self, limit: i64) -> Result<Vec<Benefit>, Error>;

    /// All benefits in any state, newest first (stats/reporting input).
    async fn list_all(&self, limit: i64) -> Result<Vec<Benefit>, Error>;

    /// Benefits owned by one business (management surface).
    async fn list_for_owner(&self, business_id: Uuid) -> Result<Vec<Benefit>, Error>;

    /// Atomic redemption write: conditionally increment the usage counter,
    /// insert the redemption record, and flip state to exhausted when the
    /// quota is reached, all in one transaction. Fails with `QuotaExhausted`
    /// (or `NotFound`/`NotActive`) with zero side effects when the
    /// conditional increment does not apply.
    async fn redeem_transaction(
        &self,
        benefit_id: Uuid,
        redemption: &Redemption,
    ) -> Result<RedeemOutcome, Error>;

    /// Batch-transition active benefits whose window ended before `cutoff`
    /// to `Expired`. Returns the ids that were transitioned.
    async fn mark_expired_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>, Error>;
}

#[async_trait]
pub trait RedemptionRepository: Send + Sync {
    async fn insert_redemption(&self, redemption: &Redemption) -> Result<(), Error>;
    async fn list_for_member(&self, member_id: Uuid, limit: i64) -> Result<Vec<Redemption>, Error>;
    async fn list_for_business(&self, business_id: Uuid, limit: i64) -> Result<Vec<Redemption>, Error>;
    async fn list_all(&self, limit: i64) -> Result<Vec<Redemption>, Error>;
    async fn list_since(&self, since: DateTime<Utc>, limit: i64) -> Result<Vec<Redemption>, Error>;

    /// How many `Used` redemptions this member already holds on this benefit.
    async fn count_used_for_member(&self, benefit_id: Uuid, member_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// `None` for unknown members; absence of affiliation facts is a valid
    /// state, not an error.
    async fn get_member_by_id(&self, member_id: Uuid) -> Result<Option<Member>, Error>;
}

#[async_trait]
pub trait BusinessRepository: Send + Sync {
    async fn get_business_by_id(&self, business_id: Uuid) -> Result<Option<Business>, Error>;

    /// Ids of businesses whose linked-association set contains
    /// `association_id`.
    async fn list_ids_for_association(&self, association_id: Uuid) -> Result<Vec<Uuid>, Error>;
}
