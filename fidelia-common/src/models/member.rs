// File: fidelia-common/src/models/member.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A consumer account. Affiliation facts are owned by provisioning flows
/// elsewhere; this engine only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub member_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    /// At most one association membership.
    pub association_id: Option<Uuid>,
    /// Businesses the member is directly affiliated with.
    pub affiliated_business_ids: Vec<Uuid>,
    pub active: bool,
}

/// The affiliation facts the catalog needs about one member. Empty when the
/// member is unknown — "no affiliation" is a valid, common state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberAffiliations {
    pub association_id: Option<Uuid>,
    pub affiliated_business_ids: Vec<Uuid>,
}

impl Member {
    pub fn affiliations(&self) -> MemberAffiliations {
        MemberAffiliations {
            association_id: self.association_id,
            affiliated_business_ids: self.affiliated_business_ids.clone(),
        }
    }
}

/// Denormalized member identity captured into a redemption record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub name: String,
    pub email: Option<String>,
}
