use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An offering under a vendor. Inactive services stay out of public reads
/// but remain visible to the owner for reactivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub service_name: String,
    pub description: Option<String>,
    pub price_range: Option<String>,
    pub duration: Option<String>,
    pub is_active: bool,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub service_name: String,
    pub description: Option<String>,
    pub price_range: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceUpdate {
    pub service_name: Option<String>,
    pub description: Option<String>,
    pub price_range: Option<String>,
    pub duration: Option<String>,
}
