// File: src/services/benefit_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use fidelia_common::models::benefit::{
    Benefit, BenefitForm, BenefitState, BenefitUpdate, DiscountKind, OwnerRole,
};
use fidelia_common::models::business::Business;
use fidelia_common::traits::repository_traits::{BenefitRepository, BusinessRepository};

use crate::cache::ResolutionCache;
use crate::Error;

/// Benefit lifecycle entry points: create with role-specific validation,
/// partial update, soft deactivation, and owner listings. Benefits are never
/// hard-deleted; deletion is a transition to `Inactive`.
pub struct BenefitService {
    benefit_repo: Arc<dyn BenefitRepository>,
    business_repo: Arc<dyn BusinessRepository>,
    cache: Arc<ResolutionCache>,
}

impl BenefitService {
    pub fn new(
        benefit_repo: Arc<dyn BenefitRepository>,
        business_repo: Arc<dyn BusinessRepository>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self { benefit_repo, business_repo, cache }
    }

    pub async fn get_benefit(&self, benefit_id: Uuid) -> Result<Benefit, Error> {
        self.benefit_repo
            .get_benefit_by_id(benefit_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("benefit {benefit_id}")))
    }

    /// Validates the form, resolving the owning business for denormalized
    /// metadata, and inserts the benefit as `Active` with a zero counter.
    /// Violations are collected and reported all at once.
    pub async fn create_benefit(
        &self,
        form: &BenefitForm,
        owner_id: Uuid,
        owner_role: OwnerRole,
    ) -> Result<Uuid, Error> {
        let mut violations = validate_form_fields(form);

        let business_id = match owner_role {
            OwnerRole::Business => Some(owner_id),
            OwnerRole::Association => {
                if form.target_business_id.is_none() {
                    violations.push("target_business_id is required for association owners".into());
                }
                form.target_business_id
            }
        };

        let business = match business_id {
            Some(bid) => match self.business_repo.get_business_by_id(bid).await? {
                Some(b) => Some(b),
                None => {
                    violations.push(format!("business {bid} could not be resolved"));
                    None
                }
            },
            None => None,
        };

        if !violations.is_empty() {
            return Err(Error::Validation(violations));
        }
        // Both are present here: a missing business or id was a violation.
        let business: Business = business.ok_or_else(|| Error::Parse("business unresolved".into()))?;

        let mut association_ids = form.association_ids.clone();
        if owner_role == OwnerRole::Association && association_ids.is_empty() {
            association_ids.push(owner_id);
        }

        let now = Utc::now();
        let benefit = Benefit {
            benefit_id: Uuid::new_v4(),
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            discount_kind: form.discount_kind,
            discount_value: form.discount_value,
            valid_from: form.valid_from,
            valid_until: form.valid_until,
            state: BenefitState::Active,
            access_mode: form.access_mode,
            business_id: business.business_id,
            business_name: business.name,
            business_logo_url: business.logo_url,
            association_ids,
            max_redemptions: form.max_redemptions,
            per_member_limit: form.per_member_limit,
            usage_count: 0,
            category: form.category.clone(),
            tags: form.tags.clone(),
            featured: form.featured,
            created_at: now,
            updated_at: now,
        };

        self.benefit_repo.create_benefit(&benefit).await?;
        // Catalogs that do not yet contain the new benefit are stale now.
        self.cache.invalidate_catalogs();
        info!("Created benefit '{}' ({})", benefit.title, benefit.benefit_id);
        Ok(benefit.benefit_id)
    }

    pub async fn update_benefit(
        &self,
        benefit_id: Uuid,
        update: &BenefitUpdate,
    ) -> Result<(), Error> {
        let mut benefit = self.get_benefit(benefit_id).await?;

        if let Some(title) = &update.title {
            benefit.title = title.trim().to_string();
        }
        if let Some(description) = &update.description {
            benefit.description = description.trim().to_string();
        }
        if let Some(kind) = update.discount_kind {
            benefit.discount_kind = kind;
        }
        if let Some(value) = update.discount_value {
            benefit.discount_value = value;
        }
        if let Some(from) = update.valid_from {
            benefit.valid_from = from;
        }
        if let Some(until) = update.valid_until {
            benefit.valid_until = until;
        }
        if let Some(mode) = update.access_mode {
            benefit.access_mode = mode;
        }
        if let Some(ids) = &update.association_ids {
            benefit.association_ids = ids.clone();
        }
        if let Some(max) = update.max_redemptions {
            benefit.max_redemptions = max;
        }
        if let Some(per_member) = update.per_member_limit {
            benefit.per_member_limit = per_member;
        }
        if let Some(category) = &update.category {
            benefit.category = category.clone();
        }
        if let Some(tags) = &update.tags {
            benefit.tags = tags.clone();
        }
        if let Some(featured) = update.featured {
            benefit.featured = featured;
        }

        let mut violations = Vec::new();
        if benefit.title.is_empty() {
            violations.push("title must not be empty".into());
        }
        if benefit.valid_from >= benefit.valid_until {
            violations.push("valid_from must precede valid_until".into());
        }
        check_discount(&mut violations, benefit.discount_kind, benefit.discount_value);
        if !violations.is_empty() {
            return Err(Error::Validation(violations));
        }

        benefit.updated_at = Utc::now();
        self.benefit_repo.update_benefit(&benefit).await?;
        // An edit can change visibility paths, so drop all catalog entries.
        self.cache.invalidate_catalogs();
        Ok(())
    }

    /// Soft delete: the benefit record stays, state becomes `Inactive`.
    pub async fn deactivate_benefit(&self, benefit_id: Uuid) -> Result<(), Error> {
        // Surface NotFound before silently updating nothing.
        let _ = self.get_benefit(benefit_id).await?;
        self.benefit_repo
            .set_benefit_state(benefit_id, BenefitState::Inactive)
            .await?;
        self.cache.invalidate_benefit(benefit_id);
        info!("Deactivated benefit {benefit_id}");
        Ok(())
    }

    pub async fn list_for_owner(&self, business_id: Uuid) -> Result<Vec<Benefit>, Error> {
        self.benefit_repo.list_for_owner(business_id).await
    }
}

fn validate_form_fields(form: &BenefitForm) -> Vec<String> {
    let mut violations = Vec::new();
    if form.title.trim().is_empty() {
        violations.push("title must not be empty".to_string());
    }
    if form.description.trim().is_empty() {
        violations.push("description must not be empty".to_string());
    }
    if form.valid_from >= form.valid_until {
        violations.push("valid_from must precede valid_until".to_string());
    }
    check_discount(&mut violations, form.discount_kind, form.discount_value);
    if let Some(max) = form.max_redemptions {
        if max <= 0 {
            violations.push("max_redemptions must be positive when set".to_string());
        }
    }
    if let Some(per_member) = form.per_member_limit {
        if per_member <= 0 {
            violations.push("per_member_limit must be positive when set".to_string());
        }
    }
    violations
}

fn check_discount(violations: &mut Vec<String>, kind: DiscountKind, value: f64) {
    match kind {
        DiscountKind::Percentage => {
            if !(value > 0.0 && value <= 100.0) {
                violations.push("percentage discount must be within (0, 100]".to_string());
            }
        }
        DiscountKind::FixedAmount => {
            if value <= 0.0 {
                violations.push("fixed-amount discount must be positive".to_string());
            }
        }
        DiscountKind::FreeItem => {}
    }
}
