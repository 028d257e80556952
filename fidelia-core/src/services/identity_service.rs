// File: src/services/identity_service.rs

use std::sync::Arc;

use uuid::Uuid;

use fidelia_common::models::member::MemberAffiliations;
use fidelia_common::traits::repository_traits::{BusinessRepository, MemberRepository};

use crate::cache::{CacheKey, CacheValue, ResolutionCache};
use crate::Error;

/// Loads affiliation facts: which association a member belongs to, which
/// businesses a member is directly affiliated with, and which businesses an
/// association brokers. Pure reads; missing entities resolve to empty facts
/// rather than errors.
pub struct IdentityService {
    member_repo: Arc<dyn MemberRepository>,
    business_repo: Arc<dyn BusinessRepository>,
    cache: Arc<ResolutionCache>,
}

impl IdentityService {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        business_repo: Arc<dyn BusinessRepository>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self { member_repo, business_repo, cache }
    }

    pub async fn resolve_member_affiliations(
        &self,
        member_id: Uuid,
    ) -> Result<MemberAffiliations, Error> {
        let key = CacheKey::MemberAffiliations(member_id);
        if let Some(CacheValue::Affiliations(facts)) = self.cache.get(&key) {
            return Ok(facts);
        }

        let facts = match self.member_repo.get_member_by_id(member_id).await? {
            Some(member) => member.affiliations(),
            None => MemberAffiliations::default(),
        };

        self.cache.insert(key, CacheValue::Affiliations(facts.clone()));
        Ok(facts)
    }

    pub async fn resolve_linked_businesses(
        &self,
        association_id: Uuid,
    ) -> Result<Vec<Uuid>, Error> {
        let key = CacheKey::LinkedBusinesses(association_id);
        if let Some(CacheValue::Ids(ids)) = self.cache.get(&key) {
            return Ok(ids);
        }

        let ids = self.business_repo.list_ids_for_association(association_id).await?;
        self.cache.insert(key, CacheValue::Ids(ids.clone()));
        Ok(ids)
    }

    pub async fn resolve_linked_associations(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<Uuid>, Error> {
        let key = CacheKey::LinkedAssociations(business_id);
        if let Some(CacheValue::Ids(ids)) = self.cache.get(&key) {
            return Ok(ids);
        }

        let ids = match self.business_repo.get_business_by_id(business_id).await? {
            Some(business) => business.association_ids,
            None => Vec::new(),
        };
        self.cache.insert(key, CacheValue::Ids(ids.clone()));
        Ok(ids)
    }
}
