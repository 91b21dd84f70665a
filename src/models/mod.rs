mod actor;
mod booking;
mod review;
mod service;
mod user;
mod vendor;

pub use actor::{Actor, Role, RoleAssignment};
pub use booking::{BookingRequest, BookingStatus, BookingSummary, NewBooking};
pub use review::{NewReview, Review};
pub use service::{NewService, Service, ServiceUpdate};
pub use user::UserProfile;
pub use vendor::{
    DiscoveryQuery, NewVendorProfile, VendorCategory, VendorProfile, VendorProfileUpdate,
};
