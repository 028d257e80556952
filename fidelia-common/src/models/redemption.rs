// File: fidelia-common/src/models/redemption.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Used,
    Failed,
    Pending,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Used => "used",
            RedemptionStatus::Failed => "failed",
            RedemptionStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "used" => Ok(RedemptionStatus::Used),
            "failed" => Ok(RedemptionStatus::Failed),
            "pending" => Ok(RedemptionStatus::Pending),
            other => Err(Error::Parse(format!("unknown redemption status '{other}'"))),
        }
    }
}

/// Immutable record of one successful benefit use. Created exactly once per
/// successful redemption and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub redemption_id: Uuid,
    pub benefit_id: Uuid,
    pub benefit_title: String,
    pub member_id: Uuid,
    pub member_name: String,
    pub member_email: Option<String>,
    pub business_id: Uuid,
    pub business_name: String,
    pub association_id: Option<Uuid>,
    /// Associations are id-only references with no entity of their own;
    /// nothing resolves a display name, so this is currently always `None`.
    pub association_name: Option<String>,
    pub redeemed_at: DateTime<Utc>,
    pub discount_applied: f64,
    pub original_amount: Option<f64>,
    pub final_amount: Option<f64>,
    pub status: RedemptionStatus,
}
