use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display data for an actor, joined into booking listings. Carries no
/// authorization weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub phone_number: Option<i64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<i32>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: Uuid, full_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            full_name: full_name.into(),
            phone_number: None,
            address: None,
            city: None,
            state: None,
            pincode: None,
            created_at: now,
            updated_at: now,
        }
    }
}
