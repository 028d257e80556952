// File: fidelia-common/src/models/business.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The entity that owns and funds benefits. The business↔association
/// many-to-many link is materialized on this side; an association's linked
/// businesses are derived by querying for its id here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub business_id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub association_ids: Vec<Uuid>,
}
