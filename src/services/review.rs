use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::models::{Actor, BookingRequest, BookingStatus, NewReview, Review, VendorProfile};
use crate::storage::{Filter, Gateway, Order};
use crate::utils::retry_with_backoff;

/// Accepts reviews for completed bookings and keeps the vendor aggregate in
/// step. The aggregate is recomputed from the full review set on every
/// write, never nudged incrementally.
#[derive(Clone)]
pub struct ReviewService<G> {
    gateway: Arc<G>,
    retry: RetryConfig,
}

impl<G: Gateway> ReviewService<G> {
    pub fn new(gateway: Arc<G>, retry: RetryConfig) -> Self {
        Self { gateway, retry }
    }

    pub async fn submit(&self, actor: &Actor, review: NewReview) -> Result<Review> {
        if !(1..=5).contains(&review.rating) {
            return Err(Error::InvalidRating(review.rating));
        }

        let booking: BookingRequest = self.gateway.get(review.booking_id).await?;
        if booking.user_id != actor.id {
            return Err(Error::forbidden(format!(
                "only the requester may review booking {}",
                booking.id
            )));
        }
        if booking.status != BookingStatus::Completed {
            return Err(Error::InvalidState {
                booking_id: booking.id,
                status: booking.status,
                expected: BookingStatus::Completed,
            });
        }

        // At most one review per booking, including resubmissions from
        // stale clients.
        let existing: Vec<Review> = self
            .gateway
            .query(Filter::new().eq("booking_id", booking.id))
            .await?;
        if !existing.is_empty() {
            return Err(Error::AlreadyReviewed(booking.id));
        }

        let record = Review {
            id: Uuid::new_v4(),
            user_id: actor.id,
            vendor_id: booking.vendor_id,
            booking_id: Some(booking.id),
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        self.gateway.insert(&record).await?;

        // Review insert and aggregate update are not one transaction. If
        // the recompute still fails after retrying, the review stays and
        // the caller retries `refresh_vendor_rating` alone.
        let refreshed = retry_with_backoff(self.retry.attempts, self.retry.base_delay_ms, || {
            self.refresh_vendor_rating(booking.vendor_id)
        })
        .await;
        if let Err(e) = refreshed {
            warn!(
                review_id = %record.id,
                vendor_id = %booking.vendor_id,
                error = %e,
                "Rating refresh failed after review insert"
            );
            return Err(Error::Integrity {
                operation: "submit_review",
                step: "refresh_vendor_rating",
                source: Box::new(e),
            });
        }

        info!(
            review_id = %record.id,
            booking_id = %booking.id,
            vendor_id = %booking.vendor_id,
            rating = record.rating,
            "Review submitted"
        );
        Ok(record)
    }

    /// Idempotent recompute of `rating_average`/`total_reviews` from the
    /// authoritative review set.
    pub async fn refresh_vendor_rating(&self, vendor_id: Uuid) -> Result<VendorProfile> {
        let reviews: Vec<Review> = self
            .gateway
            .query(Filter::new().eq("vendor_id", vendor_id))
            .await?;

        let count = reviews.len();
        let average = if count == 0 {
            0.0
        } else {
            reviews.iter().map(|r| r.rating as f64).sum::<f64>() / count as f64
        };

        self.gateway
            .update::<VendorProfile, _, _>(vendor_id, |_| true, move |profile| {
                profile.rating_average = average;
                profile.total_reviews = count as i32;
                profile.updated_at = Utc::now();
            })
            .await
    }

    /// Public read for a vendor's detail page, newest first.
    pub async fn list_for_vendor(&self, vendor_id: Uuid) -> Result<Vec<Review>> {
        self.gateway
            .query(
                Filter::new()
                    .eq("vendor_id", vendor_id)
                    .order_by("created_at", Order::Desc),
            )
            .await
    }
}
