// File: fidelia-core/tests/redemption_tests.rs

mod support;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use fidelia_common::error::Error;
use fidelia_common::models::benefit::{AccessMode, BenefitFilter, BenefitState, DiscountKind};
use fidelia_common::models::member::MemberSnapshot;
use fidelia_common::traits::repository_traits::{
    BenefitRepository, BusinessRepository, MemberRepository, RedemptionRepository,
};
use fidelia_core::cache::{CacheConfig, ResolutionCache};
use fidelia_core::services::catalog::{CatalogService, DEFAULT_LIMIT};
use fidelia_core::services::identity_service::IdentityService;
use fidelia_core::services::redemption_service::{compute_discount, RedemptionService};

use support::{active_benefit, member_with, InMemoryStore};

fn build_redemption(store: &InMemoryStore) -> (Arc<ResolutionCache>, RedemptionService) {
    let cache = Arc::new(ResolutionCache::new(CacheConfig::default()));
    let benefit_repo: Arc<dyn BenefitRepository> = Arc::new(store.clone());
    let redemption_repo: Arc<dyn RedemptionRepository> = Arc::new(store.clone());
    let member_repo: Arc<dyn MemberRepository> = Arc::new(store.clone());
    let business_repo: Arc<dyn BusinessRepository> = Arc::new(store.clone());
    let service = RedemptionService::new(
        benefit_repo,
        redemption_repo,
        member_repo,
        business_repo,
        cache.clone(),
    );
    (cache, service)
}

fn snapshot() -> MemberSnapshot {
    MemberSnapshot {
        name: "Ana Pérez".to_string(),
        email: Some("ana@example.com".to_string()),
    }
}

#[test]
fn discount_computation_covers_all_kinds() {
    assert_eq!(compute_discount(DiscountKind::Percentage, 20.0, Some(100.0)), 20.0);
    // Fixed amounts are capped at the original amount.
    assert_eq!(compute_discount(DiscountKind::FixedAmount, 50.0, Some(30.0)), 30.0);
    assert_eq!(compute_discount(DiscountKind::FreeItem, 0.0, Some(75.0)), 75.0);
    // Without a base amount only fixed discounts have a defined magnitude.
    assert_eq!(compute_discount(DiscountKind::Percentage, 20.0, None), 0.0);
    assert_eq!(compute_discount(DiscountKind::FixedAmount, 50.0, None), 50.0);
}

#[tokio::test]
async fn successful_redemption_records_usage_once() {
    let store = InMemoryStore::new();
    let benefit = active_benefit("coffee", Uuid::new_v4());
    store.put_benefit(benefit.clone());
    let member = member_with(None, vec![]);
    store.put_member(member.clone());

    let (_cache, service) = build_redemption(&store);
    let redemption = service
        .redeem(
            benefit.benefit_id,
            member.member_id,
            &snapshot(),
            benefit.business_id,
            None,
            Some(100.0),
        )
        .await
        .unwrap();

    assert_eq!(redemption.discount_applied, 10.0);
    assert_eq!(redemption.final_amount, Some(90.0));
    assert_eq!(store.redemption_count(), 1);
    assert_eq!(store.benefit(benefit.benefit_id).unwrap().usage_count, 1);
}

#[tokio::test]
async fn concurrent_redemptions_are_each_counted_exactly_once() {
    let store = InMemoryStore::new();
    let benefit = active_benefit("unlimited", Uuid::new_v4());
    store.put_benefit(benefit.clone());

    let (_cache, service) = build_redemption(&store);
    let service = Arc::new(service);

    let mut members = Vec::new();
    for _ in 0..3 {
        let m = member_with(None, vec![]);
        store.put_member(m.clone());
        members.push(m);
    }

    let snap = snapshot();
    let (a, b, c) = tokio::join!(
        service.redeem(benefit.benefit_id, members[0].member_id, &snap, benefit.business_id, None, Some(10.0)),
        service.redeem(benefit.benefit_id, members[1].member_id, &snap, benefit.business_id, None, Some(10.0)),
        service.redeem(benefit.benefit_id, members[2].member_id, &snap, benefit.business_id, None, Some(10.0)),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(store.benefit(benefit.benefit_id).unwrap().usage_count, 3);
    assert_eq!(store.redemption_count(), 3);
}

#[tokio::test]
async fn concurrent_racers_cannot_overspend_the_last_unit() {
    let store = InMemoryStore::new();
    let mut benefit = active_benefit("last one", Uuid::new_v4());
    benefit.max_redemptions = Some(1);
    store.put_benefit(benefit.clone());

    let m1 = member_with(None, vec![]);
    let m2 = member_with(None, vec![]);
    store.put_member(m1.clone());
    store.put_member(m2.clone());

    let (_cache, service) = build_redemption(&store);
    let service = Arc::new(service);

    let snap = snapshot();
    let (a, b) = tokio::join!(
        service.redeem(benefit.benefit_id, m1.member_id, &snap, benefit.business_id, None, None),
        service.redeem(benefit.benefit_id, m2.member_id, &snap, benefit.business_id, None, None),
    );

    // Exactly one racer may win the single remaining unit.
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

    let after = store.benefit(benefit.benefit_id).unwrap();
    assert_eq!(after.usage_count, 1);
    assert_eq!(after.state, BenefitState::Exhausted);
    assert_eq!(store.redemption_count(), 1);
}

#[tokio::test]
async fn quota_of_one_exhausts_after_first_redemption() {
    let store = InMemoryStore::new();
    let mut b1 = active_benefit("B1", Uuid::new_v4());
    b1.max_redemptions = Some(1);
    store.put_benefit(b1.clone());

    let m1 = member_with(None, vec![]);
    let m2 = member_with(None, vec![]);
    store.put_member(m1.clone());
    store.put_member(m2.clone());

    let (_cache, service) = build_redemption(&store);

    service
        .redeem(b1.benefit_id, m1.member_id, &snapshot(), b1.business_id, None, None)
        .await
        .unwrap();

    let err = service
        .redeem(b1.benefit_id, m2.member_id, &snapshot(), b1.business_id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QuotaExhausted));

    let after = store.benefit(b1.benefit_id).unwrap();
    assert_eq!(after.state, BenefitState::Exhausted);
    assert_eq!(after.usage_count, 1);
    assert_eq!(store.redemption_count(), 1);
}

#[tokio::test]
async fn per_member_limit_is_enforced() {
    let store = InMemoryStore::new();
    let mut benefit = active_benefit("limited per member", Uuid::new_v4());
    benefit.per_member_limit = Some(2);
    store.put_benefit(benefit.clone());
    let member = member_with(None, vec![]);
    store.put_member(member.clone());

    let (_cache, service) = build_redemption(&store);
    for _ in 0..2 {
        service
            .redeem(benefit.benefit_id, member.member_id, &snapshot(), benefit.business_id, None, None)
            .await
            .unwrap();
    }

    let err = service
        .redeem(benefit.benefit_id, member.member_id, &snapshot(), benefit.business_id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PerMemberQuotaExceeded));
    assert_eq!(store.redemption_count(), 2);
}

#[tokio::test]
async fn window_and_state_rejections_have_typed_reasons() {
    let store = InMemoryStore::new();
    let now = Utc::now();
    let member = member_with(None, vec![]);
    store.put_member(member.clone());

    let mut future = active_benefit("not yet", Uuid::new_v4());
    future.valid_from = now + Duration::days(1);
    store.put_benefit(future.clone());

    let mut past = active_benefit("over", Uuid::new_v4());
    past.valid_until = now - Duration::hours(1);
    store.put_benefit(past.clone());

    let mut inactive = active_benefit("off", Uuid::new_v4());
    inactive.state = BenefitState::Inactive;
    store.put_benefit(inactive.clone());

    let (_cache, service) = build_redemption(&store);

    let err = service
        .redeem(future.benefit_id, member.member_id, &snapshot(), future.business_id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotYetStarted));

    let err = service
        .redeem(past.benefit_id, member.member_id, &snapshot(), past.business_id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Expired));

    let err = service
        .redeem(inactive.benefit_id, member.member_id, &snapshot(), inactive.business_id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotActive));

    let err = service
        .redeem(Uuid::new_v4(), member.member_id, &snapshot(), Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // No side effects from any rejection.
    assert_eq!(store.redemption_count(), 0);
}

#[tokio::test]
async fn unaffiliated_member_is_denied_non_public_benefits() {
    let store = InMemoryStore::new();
    let mut benefit = active_benefit("members only", Uuid::new_v4());
    benefit.access_mode = AccessMode::AssociationScoped;
    benefit.association_ids = vec![Uuid::new_v4()];
    store.put_benefit(benefit.clone());

    let member = member_with(None, vec![]);
    store.put_member(member.clone());

    let (_cache, service) = build_redemption(&store);
    let err = service
        .redeem(benefit.benefit_id, member.member_id, &snapshot(), benefit.business_id, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AccessDenied { .. }));
    assert_eq!(store.redemption_count(), 0);
}

#[tokio::test]
async fn directly_affiliated_member_may_redeem_direct_benefit() {
    let store = InMemoryStore::new();
    let mut benefit = active_benefit("direct deal", Uuid::new_v4());
    benefit.access_mode = AccessMode::Direct;
    store.put_benefit(benefit.clone());

    let member = member_with(None, vec![benefit.business_id]);
    store.put_member(member.clone());

    let (_cache, service) = build_redemption(&store);
    service
        .redeem(benefit.benefit_id, member.member_id, &snapshot(), benefit.business_id, None, Some(40.0))
        .await
        .unwrap();
    assert_eq!(store.redemption_count(), 1);
}

#[tokio::test]
async fn catalog_reflects_redemption_after_invalidation() {
    let store = InMemoryStore::new();
    let mut benefit = active_benefit("one left", Uuid::new_v4());
    benefit.max_redemptions = Some(1);
    store.put_benefit(benefit.clone());

    let member = member_with(None, vec![]);
    store.put_member(member.clone());

    // Catalog and redemption service share one cache instance.
    let cache = Arc::new(ResolutionCache::new(CacheConfig::default()));
    let benefit_repo: Arc<dyn BenefitRepository> = Arc::new(store.clone());
    let member_repo: Arc<dyn MemberRepository> = Arc::new(store.clone());
    let business_repo: Arc<dyn BusinessRepository> = Arc::new(store.clone());
    let redemption_repo: Arc<dyn RedemptionRepository> = Arc::new(store.clone());
    let identity = Arc::new(IdentityService::new(
        member_repo.clone(),
        business_repo.clone(),
        cache.clone(),
    ));
    let catalog = CatalogService::new(benefit_repo.clone(), identity, cache.clone());
    let redemption = RedemptionService::new(
        benefit_repo,
        redemption_repo,
        member_repo,
        business_repo,
        cache.clone(),
    );

    // Prime the cache: the benefit is visible.
    let before = catalog
        .list_available_benefits(member.member_id, None, &BenefitFilter::default(), DEFAULT_LIMIT)
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    redemption
        .redeem(benefit.benefit_id, member.member_id, &snapshot(), benefit.business_id, None, None)
        .await
        .unwrap();

    // The exhausted benefit must not survive in a stale cached catalog.
    let after = catalog
        .list_available_benefits(member.member_id, None, &BenefitFilter::default(), DEFAULT_LIMIT)
        .await
        .unwrap();
    assert!(after.is_empty());
}

#[tokio::test]
async fn redemption_history_is_newest_first() {
    let store = InMemoryStore::new();
    let benefit = active_benefit("repeat", Uuid::new_v4());
    store.put_benefit(benefit.clone());
    let member = member_with(None, vec![]);
    store.put_member(member.clone());

    let (_cache, service) = build_redemption(&store);
    for _ in 0..3 {
        service
            .redeem(benefit.benefit_id, member.member_id, &snapshot(), benefit.business_id, None, Some(10.0))
            .await
            .unwrap();
    }

    let history = service.get_redemption_history(member.member_id, 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].redeemed_at >= history[1].redeemed_at);
}
