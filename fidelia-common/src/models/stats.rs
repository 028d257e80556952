// File: fidelia-common/src/models/stats.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Usage/savings statistics derived from benefits + redemption history.
/// Pure data; computed deterministically from a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenefitStats {
    pub total_benefits: usize,
    pub active_benefits: usize,
    pub used_count: usize,
    pub expired_count: usize,
    pub total_savings: f64,
    pub savings_this_month: f64,
    pub usage_by_month: Vec<MonthlyUsage>,
    pub top_benefits: Vec<TopBenefit>,
    pub by_category: Vec<CategoryCount>,
    pub by_business: Vec<BusinessCount>,
}

/// One calendar month's redemption activity, keyed as "YYYY-MM".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyUsage {
    pub month: String,
    pub redemptions: usize,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopBenefit {
    pub benefit_id: Uuid,
    pub title: String,
    pub redemptions: usize,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub benefits: usize,
    pub redemptions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCount {
    pub business_id: Uuid,
    pub business_name: String,
    pub benefits: usize,
    pub redemptions: usize,
    pub savings: f64,
}
