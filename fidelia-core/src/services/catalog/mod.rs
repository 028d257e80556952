// File: src/services/catalog/mod.rs

pub mod dedup;
pub mod validity;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use fidelia_common::models::benefit::{
    AccessMode, Benefit, BenefitFilter, OriginPath, SourcedBenefit,
};
use fidelia_common::traits::repository_traits::BenefitRepository;

use crate::cache::{CacheKey, CacheValue, ResolutionCache};
use crate::services::identity_service::IdentityService;
use crate::Error;

/// Default number of catalog entries returned to a caller.
pub const DEFAULT_LIMIT: i64 = 50;

/// Cap on the public-path contribution, distinct from the request limit so
/// public benefits cannot crowd out targeted ones.
pub const PUBLIC_PATH_CAP: i64 = 20;

/// Maximum ids per equality-list business lookup.
pub const BUSINESS_CHUNK: usize = 10;

/// Resolves the catalog of benefits a member may see across the three
/// visibility paths (association, direct business affiliation, public),
/// deduplicates, validity-filters, and ranks the result.
pub struct CatalogService {
    benefit_repo: Arc<dyn BenefitRepository>,
    identity: Arc<IdentityService>,
    cache: Arc<ResolutionCache>,
}

impl CatalogService {
    pub fn new(
        benefit_repo: Arc<dyn BenefitRepository>,
        identity: Arc<IdentityService>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self { benefit_repo, identity, cache }
    }

    /// The primary browse entry point. The cache only memoizes the store
    /// queries; filter application, validity filtering, ranking, and
    /// truncation run fresh on every call.
    pub async fn list_available_benefits(
        &self,
        member_id: Uuid,
        association_id: Option<Uuid>,
        filter: &BenefitFilter,
        limit: i64,
    ) -> Result<Vec<SourcedBenefit>, Error> {
        let affiliations = self.identity.resolve_member_affiliations(member_id).await?;
        let association_id = association_id.or(affiliations.association_id);

        let key = CacheKey::Catalog {
            member_id,
            association_id,
            params: params_digest(filter, limit),
        };

        let gathered = match self.cache.get(&key) {
            Some(CacheValue::Catalog(items)) => {
                debug!("catalog cache hit for member {member_id}");
                items
            }
            _ => {
                let gathered = match association_id {
                    Some(assoc) => self.gather_association_paths(assoc, limit).await?,
                    None => {
                        self.gather_unaffiliated_paths(&affiliations.affiliated_business_ids, limit)
                            .await?
                    }
                };
                let gathered = dedup::merge(gathered);
                self.cache.insert(key, CacheValue::Catalog(gathered.clone()));
                gathered
            }
        };

        let now = Utc::now();
        let mut result: Vec<SourcedBenefit> = validity::filter_valid(now, gathered)
            .into_iter()
            .filter(|item| filter.matches(&item.benefit, now))
            .collect();
        validity::rank(&mut result);
        result.truncate(limit.max(0) as usize);
        Ok(result)
    }

    /// Association branch: association-scoped grants, benefits owned by the
    /// association's linked businesses, and a bounded slice of public
    /// benefits. The three sub-queries are independent and run concurrently.
    async fn gather_association_paths(
        &self,
        association_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SourcedBenefit>, Error> {
        let scoped_fut = self.benefit_repo.list_for_association(association_id, limit);
        let linked_fut = async {
            let business_ids = self.identity.resolve_linked_businesses(association_id).await?;
            self.query_business_chunks(&business_ids, limit).await
        };
        let public_fut = self
            .benefit_repo
            .list_by_access_mode(AccessMode::Public, PUBLIC_PATH_CAP);

        let (scoped, linked, public) = tokio::join!(scoped_fut, linked_fut, public_fut);

        let mut gathered = Vec::new();
        gathered.extend(tag(degrade(scoped, "association"), OriginPath::Association));
        gathered.extend(tag(degrade(linked, "linked-business"), OriginPath::LinkedBusiness));
        gathered.extend(tag(degrade(public, "public"), OriginPath::Public));
        Ok(gathered)
    }

    /// No-association branch: public benefits, direct-access benefits, and
    /// benefits owned by directly affiliated businesses. When all three come
    /// back empty, fall back to every currently-active benefit so a member is
    /// never shown an empty catalog just because no linkage exists.
    async fn gather_unaffiliated_paths(
        &self,
        affiliated_business_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<SourcedBenefit>, Error> {
        let public_fut = self.benefit_repo.list_by_access_mode(AccessMode::Public, limit);
        let direct_fut = self.benefit_repo.list_by_access_mode(AccessMode::Direct, limit);
        let affiliated_fut = self.query_business_chunks(affiliated_business_ids, limit);

        let (public, direct, affiliated) = tokio::join!(public_fut, direct_fut, affiliated_fut);

        let mut gathered = Vec::new();
        gathered.extend(tag(degrade(public, "public"), OriginPath::Public));
        gathered.extend(tag(degrade(direct, "direct"), OriginPath::Direct));
        gathered.extend(tag(degrade(affiliated, "affiliated-business"), OriginPath::LinkedBusiness));

        if gathered.is_empty() {
            let fallback = self.benefit_repo.list_active(limit).await?;
            gathered.extend(tag(fallback, OriginPath::Fallback));
        }
        Ok(gathered)
    }

    /// Chunked equality-list lookups, one query per chunk of at most
    /// `BUSINESS_CHUNK` ids, issued in parallel.
    async fn query_business_chunks(
        &self,
        business_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Benefit>, Error> {
        if business_ids.is_empty() {
            return Ok(Vec::new());
        }
        let futures = business_ids
            .chunks(BUSINESS_CHUNK)
            .map(|chunk| self.benefit_repo.list_for_businesses(chunk, limit));

        let mut benefits = Vec::new();
        for chunk_result in join_all(futures).await {
            benefits.extend(chunk_result?);
        }
        Ok(benefits)
    }
}

fn params_digest(filter: &BenefitFilter, limit: i64) -> u64 {
    let mut hasher = DefaultHasher::new();
    filter.hash(&mut hasher);
    limit.hash(&mut hasher);
    hasher.finish()
}

fn tag(benefits: Vec<Benefit>, origin: OriginPath) -> Vec<SourcedBenefit> {
    benefits
        .into_iter()
        .map(|benefit| SourcedBenefit { benefit, origin })
        .collect()
}

/// A failed path contributes nothing instead of aborting the resolution;
/// browsing favors availability over completeness.
fn degrade(result: Result<Vec<Benefit>, Error>, path: &str) -> Vec<Benefit> {
    match result {
        Ok(benefits) => benefits,
        Err(e) => {
            warn!("catalog path '{path}' failed, contributing nothing: {e}");
            Vec::new()
        }
    }
}
