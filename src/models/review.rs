use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rating left by a booking's requester once the booking is completed.
/// At most one review per booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub booking_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}
