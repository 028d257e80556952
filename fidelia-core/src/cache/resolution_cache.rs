// File: src/cache/resolution_cache.rs

use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use fidelia_common::models::benefit::SourcedBenefit;
use fidelia_common::models::member::MemberAffiliations;

/// Key for one memoized resolution. Tagged tuples rather than strings, so
/// invalidation is exact-match instead of substring matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Catalog resolution for (member, association, filter+limit digest).
    Catalog {
        member_id: Uuid,
        association_id: Option<Uuid>,
        params: u64,
    },
    /// A member's affiliation facts.
    MemberAffiliations(Uuid),
    /// Business ids linked to an association.
    LinkedBusinesses(Uuid),
    /// Association ids linked to a business.
    LinkedAssociations(Uuid),
}

#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Vec<SourcedBenefit>),
    Affiliations(MemberAffiliations),
    Ids(Vec<Uuid>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CacheValue,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(60) }
    }
}

/// TTL-bounded concurrent map memoizing expensive multi-query resolutions.
/// Constructed once and injected into the services; never a process-wide
/// singleton, so tests get isolated instances.
pub struct ResolutionCache {
    entries: DashMap<CacheKey, CacheEntry>,
    config: CacheConfig,
}

impl ResolutionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self { entries: DashMap::new(), config }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.expires_at > Instant::now() {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: CacheKey, value: CacheValue) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.config.ttl,
        };
        self.entries.insert(key, entry);
    }

    /// Drop every catalog entry whose contents involve the given benefit.
    /// Affiliation-fact entries are untouched; redemptions do not change
    /// affiliation facts.
    pub fn invalidate_benefit(&self, benefit_id: Uuid) {
        self.entries.retain(|_key, entry| match &entry.value {
            CacheValue::Catalog(items) => {
                !items.iter().any(|s| s.benefit.benefit_id == benefit_id)
            }
            _ => true,
        });
    }

    /// Drop all catalog entries. Used when a benefit is created, since
    /// entries that do not yet contain it are stale too.
    pub fn invalidate_catalogs(&self) {
        self.entries
            .retain(|key, _| !matches!(key, CacheKey::Catalog { .. }));
    }

    /// Drop cached affiliation facts for one member.
    pub fn invalidate_member(&self, member_id: Uuid) {
        self.entries.remove(&CacheKey::MemberAffiliations(member_id));
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
