use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }

    /// The fixed transition graph. Anything outside these edges is rejected,
    /// including every edge out of a terminal status.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Accepted)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Accepted, BookingStatus::Completed)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's request for a vendor's time. Requester and vendor are fixed
/// at creation; only the status and timestamps change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub service_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub message: Option<String>,
    pub status: BookingStatus,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub vendor_id: Uuid,
    pub service_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub message: Option<String>,
}

/// A booking joined with the counterparty display data, for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSummary {
    pub booking: BookingRequest,
    pub business_name: String,
    pub vendor_city: String,
    pub vendor_state: String,
    pub requester_name: Option<String>,
    pub requester_phone: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;

    #[test]
    fn allowed_edges() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(Completed));
    }

    #[test]
    fn everything_else_is_rejected() {
        let all = [Pending, Accepted, Rejected, Completed, Cancelled];
        let allowed = [
            (Pending, Accepted),
            (Pending, Rejected),
            (Pending, Cancelled),
            (Accepted, Completed),
        ];
        for from in all {
            for to in all {
                let expected = allowed.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        let all = [Pending, Accepted, Rejected, Completed, Cancelled];
        for from in all.into_iter().filter(|s| s.is_terminal()) {
            for to in all {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }
}
