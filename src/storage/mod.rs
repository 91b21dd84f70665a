pub mod filter;
pub mod json;
pub mod memory;

pub use filter::{Filter, Order};
pub use json::SnapshotStore;
pub use memory::MemoryGateway;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    BookingRequest, Review, RoleAssignment, Service, UserProfile, VendorProfile,
};

/// A persisted record type tied to a named collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

impl Record for VendorProfile {
    const COLLECTION: &'static str = "vendor_profiles";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Service {
    const COLLECTION: &'static str = "services";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for BookingRequest {
    const COLLECTION: &'static str = "booking_requests";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Review {
    const COLLECTION: &'static str = "reviews";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for RoleAssignment {
    const COLLECTION: &'static str = "user_roles";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for UserProfile {
    const COLLECTION: &'static str = "user_profiles";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Storage contract every component talks through. Single-record operations
/// are atomic; `update` takes a precondition so writers can key a change on
/// the state they read (a failed precondition surfaces as `Error::Conflict`).
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn insert<R: Record>(&self, record: &R) -> Result<Uuid>;

    async fn get<R: Record>(&self, id: Uuid) -> Result<R>;

    async fn find<R: Record>(&self, id: Uuid) -> Result<Option<R>>;

    async fn update<R, C, P>(&self, id: Uuid, precondition: C, patch: P) -> Result<R>
    where
        R: Record,
        C: Fn(&R) -> bool + Send,
        P: FnOnce(&mut R) + Send;

    async fn delete<R: Record>(&self, id: Uuid) -> Result<()>;

    async fn query<R: Record>(&self, filter: Filter) -> Result<Vec<R>>;
}
