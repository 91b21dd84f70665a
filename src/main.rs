use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, NaiveTime, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use servicehub_core::config::Settings;
use servicehub_core::identity::IdentityContext;
use servicehub_core::models::{
    Actor, BookingStatus, DiscoveryQuery, NewBooking, NewReview, NewService, NewVendorProfile,
    Role, RoleAssignment, UserProfile, VendorCategory,
};
use servicehub_core::services::{BookingEngine, CatalogService, ReviewService};
use servicehub_core::storage::{Gateway, MemoryGateway, SnapshotStore};

/// Walks one booking through the whole marketplace: a user becomes a
/// vendor, a customer books them, the vendor completes the job, the
/// customer leaves a review. State is persisted as a JSON snapshot.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::new().unwrap_or_default();
    let snapshots = SnapshotStore::new(&settings.storage);

    let gateway = match snapshots.load().await? {
        Some(existing) => {
            info!(path = %snapshots.path().display(), "Loaded existing snapshot");
            Arc::new(existing)
        }
        None => Arc::new(MemoryGateway::new()),
    };

    let identity = IdentityContext::new(gateway.clone());
    let catalog = CatalogService::new(gateway.clone(), settings.retry);
    let bookings = BookingEngine::new(gateway.clone());
    let reviews = ReviewService::new(gateway.clone(), settings.retry);

    // Two fresh participants and an administrator for verification.
    let customer_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();
    gateway
        .insert(&UserProfile::new(customer_id, "Asha Rao"))
        .await?;
    gateway
        .insert(&UserProfile::new(owner_id, "Ravi Kulkarni"))
        .await?;
    let admin_id = Uuid::new_v4();
    gateway
        .insert(&RoleAssignment::new(admin_id, Role::Admin))
        .await?;

    let owner = identity.resolve(owner_id).await?;
    let vendor = catalog
        .become_vendor(
            &owner,
            NewVendorProfile {
                business_name: "Kulkarni Plumbing Works".to_string(),
                category: VendorCategory::HomeServices,
                description: Some("Residential plumbing and fittings".to_string()),
                phone_number: 9_876_543_210,
                email: Some("ravi@example.com".to_string()),
                address: "12 Canal Road".to_string(),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                pincode: 411_001,
            },
        )
        .await?;
    let owner = identity.resolve(owner_id).await?;
    info!(
        vendor_id = %vendor.id,
        is_vendor = owner.has_role(Role::Vendor),
        "Owner upgraded to vendor"
    );

    let service = catalog
        .add_service(
            &owner,
            vendor.id,
            NewService {
                service_name: "Leak repair".to_string(),
                description: Some("Taps, joints and concealed lines".to_string()),
                price_range: Some("Rs 500-1500".to_string()),
                duration: Some("1 hour".to_string()),
            },
        )
        .await?;

    let admin = identity.resolve(admin_id).await?;
    catalog.set_verified(&admin, vendor.id, true).await?;

    let found = catalog
        .discover(DiscoveryQuery {
            category: Some(VendorCategory::HomeServices),
            search: Some("plumbing".to_string()),
        })
        .await?;
    info!(matches = found.len(), "Discovery over verified vendors");

    let customer: Actor = identity.resolve(customer_id).await?;
    let booking = bookings
        .create(
            &customer,
            NewBooking {
                vendor_id: vendor.id,
                service_id: Some(service.id),
                booking_date: (Utc::now() + Duration::days(3)).date_naive(),
                booking_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN),
                message: Some("Kitchen sink is leaking".to_string()),
            },
        )
        .await?;

    bookings
        .transition(&owner, booking.id, BookingStatus::Accepted)
        .await?;
    bookings
        .transition(&owner, booking.id, BookingStatus::Completed)
        .await?;

    reviews
        .submit(
            &customer,
            NewReview {
                booking_id: booking.id,
                rating: 5,
                comment: Some("Fast and tidy".to_string()),
            },
        )
        .await?;

    let vendor = catalog.get_vendor(vendor.id).await?;
    let visible = bookings.list_detailed(&owner).await?;
    info!(
        vendor = %vendor.business_name,
        rating = vendor.display_rating(),
        total_reviews = vendor.total_reviews,
        bookings_visible = visible.len(),
        "Lifecycle complete"
    );

    snapshots.save(&gateway).await?;
    info!(path = %snapshots.path().display(), "Snapshot saved");

    Ok(())
}
