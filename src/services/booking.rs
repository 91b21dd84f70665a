use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    Actor, BookingRequest, BookingStatus, BookingSummary, NewBooking, Service, UserProfile,
    VendorProfile,
};
use crate::storage::{Filter, Gateway, Order};

/// Owns the booking lifecycle: creation, the status state machine, and the
/// read-side projections. Who may move a booking along an edge depends on
/// their relationship to it, not just on role membership: the vendor owner
/// accepts, rejects and completes; only the original requester cancels.
#[derive(Clone)]
pub struct BookingEngine<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> BookingEngine<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn create(&self, actor: &Actor, request: NewBooking) -> Result<BookingRequest> {
        let vendor: VendorProfile = self.gateway.get(request.vendor_id).await?;

        let today = Utc::now().date_naive();
        if request.booking_date < today {
            return Err(Error::validation(
                "booking_date",
                format!("{} is in the past", request.booking_date),
            ));
        }

        if let Some(service_id) = request.service_id {
            let service: Service = self.gateway.get(service_id).await?;
            if service.vendor_id != vendor.id {
                return Err(Error::validation(
                    "service_id",
                    format!("service {} does not belong to vendor {}", service_id, vendor.id),
                ));
            }
        }

        let now = Utc::now();
        let booking = BookingRequest {
            id: Uuid::new_v4(),
            user_id: actor.id,
            vendor_id: vendor.id,
            service_id: request.service_id,
            booking_date: request.booking_date,
            booking_time: request.booking_time,
            message: request.message,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.gateway.insert(&booking).await?;

        info!(
            booking_id = %booking.id,
            user_id = %actor.id,
            vendor_id = %vendor.id,
            booking_date = %booking.booking_date,
            "Booking request created"
        );
        Ok(booking)
    }

    /// Moves a booking along one edge of the status graph. The write is
    /// conditional on the status this call read, so a losing concurrent
    /// writer gets `Conflict` instead of silently overwriting.
    pub async fn transition(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> Result<BookingRequest> {
        let booking: BookingRequest = self.gateway.get(booking_id).await?;
        let current = booking.status;

        if !current.can_transition_to(target) {
            return Err(Error::InvalidTransition {
                from: current,
                to: target,
            });
        }

        match target {
            BookingStatus::Cancelled => {
                if booking.user_id != actor.id {
                    return Err(Error::forbidden(format!(
                        "only the requester may cancel booking {booking_id}"
                    )));
                }
            }
            // Accepted, rejected and completed belong to the vendor side.
            _ => {
                let vendor: VendorProfile = self.gateway.get(booking.vendor_id).await?;
                if vendor.user_id != actor.id {
                    return Err(Error::forbidden(format!(
                        "only the vendor may mark booking {booking_id} {target}"
                    )));
                }
            }
        }

        let updated = self
            .gateway
            .update::<BookingRequest, _, _>(
                booking_id,
                move |b| b.status == current,
                move |b| {
                    b.status = target;
                    b.updated_at = Utc::now();
                },
            )
            .await?;

        info!(
            booking_id = %booking_id,
            from = %current,
            to = %target,
            actor_id = %actor.id,
            "Booking transitioned"
        );
        Ok(updated)
    }

    /// Everything the actor may see: their own requests, plus requests
    /// targeting their vendor profile if they own one. Most recent first.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<BookingRequest>> {
        let mut bookings: Vec<BookingRequest> = self
            .gateway
            .query(
                Filter::new()
                    .eq("user_id", actor.id)
                    .order_by("created_at", Order::Desc),
            )
            .await?;

        let owned: Vec<VendorProfile> = self
            .gateway
            .query(Filter::new().eq("user_id", actor.id))
            .await?;
        if let Some(vendor) = owned.first() {
            let incoming: Vec<BookingRequest> = self
                .gateway
                .query(
                    Filter::new()
                        .eq("vendor_id", vendor.id)
                        .order_by("created_at", Order::Desc),
                )
                .await?;
            let seen: HashSet<Uuid> = bookings.iter().map(|b| b.id).collect();
            bookings.extend(incoming.into_iter().filter(|b| !seen.contains(&b.id)));
            bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        Ok(bookings)
    }

    /// `list` joined with counterparty display data for dashboards.
    pub async fn list_detailed(&self, actor: &Actor) -> Result<Vec<BookingSummary>> {
        let bookings = self.list(actor).await?;
        let mut summaries = Vec::with_capacity(bookings.len());

        for booking in bookings {
            let vendor: VendorProfile = self.gateway.get(booking.vendor_id).await?;
            let requester: Option<UserProfile> = self.gateway.find(booking.user_id).await?;
            summaries.push(BookingSummary {
                business_name: vendor.business_name,
                vendor_city: vendor.city,
                vendor_state: vendor.state,
                requester_name: requester.as_ref().map(|p| p.full_name.clone()),
                requester_phone: requester.and_then(|p| p.phone_number),
                booking,
            });
        }

        Ok(summaries)
    }
}
