// File: fidelia-common/src/models/benefit.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// How a benefit's discount is computed at redemption time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
    FreeItem,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::FixedAmount => "fixed_amount",
            DiscountKind::FreeItem => "free_item",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed_amount" => Ok(DiscountKind::FixedAmount),
            "free_item" => Ok(DiscountKind::FreeItem),
            other => Err(Error::Parse(format!("unknown discount kind '{other}'"))),
        }
    }
}

/// Lifecycle state. `Inactive`, `Expired` and `Exhausted` are terminal as far
/// as this engine is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitState {
    Active,
    Inactive,
    Expired,
    Exhausted,
}

impl BenefitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BenefitState::Active => "active",
            BenefitState::Inactive => "inactive",
            BenefitState::Expired => "expired",
            BenefitState::Exhausted => "exhausted",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "active" => Ok(BenefitState::Active),
            "inactive" => Ok(BenefitState::Inactive),
            "expired" => Ok(BenefitState::Expired),
            "exhausted" => Ok(BenefitState::Exhausted),
            other => Err(Error::Parse(format!("unknown benefit state '{other}'"))),
        }
    }
}

/// Who may see a benefit: everyone, members of a granted association, or
/// members explicitly affiliated with the owning business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    Public,
    AssociationScoped,
    Direct,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Public => "public",
            AccessMode::AssociationScoped => "association_scoped",
            AccessMode::Direct => "direct",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "public" => Ok(AccessMode::Public),
            "association_scoped" => Ok(AccessMode::AssociationScoped),
            "direct" => Ok(AccessMode::Direct),
            other => Err(Error::Parse(format!("unknown access mode '{other}'"))),
        }
    }
}

/// A promotional offer owned by one business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benefit {
    pub benefit_id: Uuid,
    pub title: String,
    pub description: String,
    pub discount_kind: DiscountKind,
    /// Percentage rate (0–100) or fixed monetary amount, depending on kind.
    /// Unused for `FreeItem`.
    pub discount_value: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub state: BenefitState,
    pub access_mode: AccessMode,
    pub business_id: Uuid,
    pub business_name: String,
    pub business_logo_url: Option<String>,
    /// Associations granted access when `access_mode` is association-scoped.
    pub association_ids: Vec<Uuid>,
    /// Global quota; `None` means unlimited.
    pub max_redemptions: Option<i32>,
    /// Per-member quota; `None` means unlimited.
    pub per_member_limit: Option<i32>,
    pub usage_count: i32,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Benefit {
    /// Whether the evaluation instant falls inside `[valid_from, valid_until)`.
    pub fn window_contains(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at < self.valid_until
    }

    /// Whether the global quota still has headroom.
    pub fn has_quota_headroom(&self) -> bool {
        match self.max_redemptions {
            Some(max) => self.usage_count < max,
            None => true,
        }
    }
}

/// Which visibility path surfaced a benefit during catalog resolution.
/// Attached in memory only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginPath {
    Association,
    LinkedBusiness,
    Public,
    Direct,
    Fallback,
}

/// A catalog result item: the benefit plus the path that surfaced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcedBenefit {
    pub benefit: Benefit,
    pub origin: OriginPath,
}

/// Role of the actor creating a benefit; drives role-specific validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerRole {
    Business,
    Association,
}

/// Catalog filter options; all fields optional with documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenefitFilter {
    pub category: Option<String>,
    pub business_id: Option<Uuid>,
    pub featured_only: bool,
    pub search_text: Option<String>,
    /// Only benefits created within the last 7 days.
    pub new_only: bool,
    pub expiring_within_days: Option<i64>,
}

impl BenefitFilter {
    pub fn is_empty(&self) -> bool {
        *self == BenefitFilter::default()
    }

    pub fn matches(&self, benefit: &Benefit, at: DateTime<Utc>) -> bool {
        if let Some(cat) = &self.category {
            if benefit.category.as_deref() != Some(cat.as_str()) {
                return false;
            }
        }
        if let Some(bid) = self.business_id {
            if benefit.business_id != bid {
                return false;
            }
        }
        if self.featured_only && !benefit.featured {
            return false;
        }
        if let Some(text) = &self.search_text {
            let needle = text.to_lowercase();
            let hit = benefit.title.to_lowercase().contains(&needle)
                || benefit.description.to_lowercase().contains(&needle)
                || benefit.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.new_only && benefit.created_at < at - Duration::days(7) {
            return false;
        }
        if let Some(days) = self.expiring_within_days {
            if benefit.valid_until > at + Duration::days(days) {
                return false;
            }
        }
        true
    }
}

/// Create input. Validation enumerates every violated field at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitForm {
    pub title: String,
    pub description: String,
    pub discount_kind: DiscountKind,
    pub discount_value: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub access_mode: AccessMode,
    /// Required when the creating actor is an association.
    pub target_business_id: Option<Uuid>,
    pub association_ids: Vec<Uuid>,
    pub max_redemptions: Option<i32>,
    pub per_member_limit: Option<i32>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenefitUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub discount_kind: Option<DiscountKind>,
    pub discount_value: Option<f64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub access_mode: Option<AccessMode>,
    pub association_ids: Option<Vec<Uuid>>,
    pub max_redemptions: Option<Option<i32>>,
    pub per_member_limit: Option<Option<i32>>,
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
}
