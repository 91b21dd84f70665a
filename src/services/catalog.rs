use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::models::{
    Actor, DiscoveryQuery, NewService, NewVendorProfile, Role, RoleAssignment, Service,
    ServiceUpdate, VendorProfile, VendorProfileUpdate,
};
use crate::storage::{Filter, Gateway, Order};
use crate::utils::retry_with_backoff;

/// Governs vendor profiles and the services offered under them. Becoming a
/// vendor is a one-way upgrade: the profile insert and the role grant are a
/// two-phase sequence, with the grant retryable on its own.
#[derive(Clone)]
pub struct CatalogService<G> {
    gateway: Arc<G>,
    retry: RetryConfig,
}

impl<G: Gateway> CatalogService<G> {
    pub fn new(gateway: Arc<G>, retry: RetryConfig) -> Self {
        Self { gateway, retry }
    }

    pub async fn become_vendor(
        &self,
        actor: &Actor,
        fields: NewVendorProfile,
    ) -> Result<VendorProfile> {
        validate_profile(&fields)?;

        let existing: Vec<VendorProfile> = self
            .gateway
            .query(Filter::new().eq("user_id", actor.id))
            .await?;
        if !existing.is_empty() {
            return Err(Error::AlreadyVendor(actor.id));
        }

        let now = Utc::now();
        let profile = VendorProfile {
            id: Uuid::new_v4(),
            user_id: actor.id,
            business_name: fields.business_name,
            category: fields.category,
            description: fields.description,
            phone_number: fields.phone_number,
            email: fields.email,
            address: fields.address,
            city: fields.city,
            state: fields.state,
            pincode: fields.pincode,
            is_verified: false,
            rating_average: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        self.gateway.insert(&profile).await?;

        // Profile insert and role grant are not one transaction. If the
        // grant still fails after retrying, the profile stays in place and
        // the caller retries `grant_vendor_role` alone.
        let granted = retry_with_backoff(self.retry.attempts, self.retry.base_delay_ms, || {
            self.grant_vendor_role(actor.id)
        })
        .await;
        if let Err(e) = granted {
            warn!(
                user_id = %actor.id,
                vendor_id = %profile.id,
                error = %e,
                "Vendor role grant failed after profile insert"
            );
            return Err(Error::Integrity {
                operation: "become_vendor",
                step: "grant_vendor_role",
                source: Box::new(e),
            });
        }

        info!(
            vendor_id = %profile.id,
            user_id = %actor.id,
            business_name = %profile.business_name,
            "Vendor profile created"
        );
        Ok(profile)
    }

    /// Idempotent: granting an already-granted role is a no-op.
    pub async fn grant_vendor_role(&self, user_id: Uuid) -> Result<()> {
        let existing: Vec<RoleAssignment> = self
            .gateway
            .query(Filter::new().eq("user_id", user_id).eq("role", Role::Vendor))
            .await?;
        if existing.is_empty() {
            self.gateway
                .insert(&RoleAssignment::new(user_id, Role::Vendor))
                .await?;
        }
        Ok(())
    }

    pub async fn update_profile(
        &self,
        actor: &Actor,
        profile_id: Uuid,
        update: VendorProfileUpdate,
    ) -> Result<VendorProfile> {
        self.owned_profile(actor, profile_id).await?;

        self.gateway
            .update::<VendorProfile, _, _>(profile_id, |_| true, move |profile| {
                if let Some(description) = update.description {
                    profile.description = Some(description);
                }
                if let Some(phone_number) = update.phone_number {
                    profile.phone_number = phone_number;
                }
                if let Some(email) = update.email {
                    profile.email = Some(email);
                }
                if let Some(address) = update.address {
                    profile.address = address;
                }
                if let Some(city) = update.city {
                    profile.city = city;
                }
                if let Some(state) = update.state {
                    profile.state = state;
                }
                if let Some(pincode) = update.pincode {
                    profile.pincode = pincode;
                }
                profile.updated_at = Utc::now();
            })
            .await
    }

    pub async fn add_service(
        &self,
        actor: &Actor,
        vendor_id: Uuid,
        fields: NewService,
    ) -> Result<Service> {
        self.owned_profile(actor, vendor_id).await?;
        if fields.service_name.trim().is_empty() {
            return Err(Error::validation("service_name", "must not be empty"));
        }

        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            vendor_id,
            service_name: fields.service_name,
            description: fields.description,
            price_range: fields.price_range,
            duration: fields.duration,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.gateway.insert(&service).await?;

        info!(
            service_id = %service.id,
            vendor_id = %vendor_id,
            service_name = %service.service_name,
            "Service added"
        );
        Ok(service)
    }

    pub async fn update_service(
        &self,
        actor: &Actor,
        service_id: Uuid,
        update: ServiceUpdate,
    ) -> Result<Service> {
        let service: Service = self.gateway.get(service_id).await?;
        self.owned_profile(actor, service.vendor_id).await?;
        if let Some(name) = &update.service_name {
            if name.trim().is_empty() {
                return Err(Error::validation("service_name", "must not be empty"));
            }
        }

        self.gateway
            .update::<Service, _, _>(service_id, |_| true, move |service| {
                if let Some(service_name) = update.service_name {
                    service.service_name = service_name;
                }
                if let Some(description) = update.description {
                    service.description = Some(description);
                }
                if let Some(price_range) = update.price_range {
                    service.price_range = Some(price_range);
                }
                if let Some(duration) = update.duration {
                    service.duration = Some(duration);
                }
                service.updated_at = Utc::now();
            })
            .await
    }

    pub async fn delete_service(&self, actor: &Actor, service_id: Uuid) -> Result<()> {
        let service: Service = self.gateway.get(service_id).await?;
        self.owned_profile(actor, service.vendor_id).await?;
        self.gateway.delete::<Service>(service_id).await
    }

    pub async fn set_service_active(
        &self,
        actor: &Actor,
        service_id: Uuid,
        active: bool,
    ) -> Result<Service> {
        let service: Service = self.gateway.get(service_id).await?;
        self.owned_profile(actor, service.vendor_id).await?;

        self.gateway
            .update::<Service, _, _>(service_id, |_| true, move |service| {
                service.is_active = active;
                service.updated_at = Utc::now();
            })
            .await
    }

    /// Public read: only active services, for discovery and detail pages.
    pub async fn list_active_services(&self, vendor_id: Uuid) -> Result<Vec<Service>> {
        self.gateway
            .query(
                Filter::new()
                    .eq("vendor_id", vendor_id)
                    .eq("is_active", true)
                    .order_by("created_at", Order::Asc),
            )
            .await
    }

    /// Owner read: includes inactive services so they can be reactivated.
    pub async fn list_services(&self, actor: &Actor, vendor_id: Uuid) -> Result<Vec<Service>> {
        self.owned_profile(actor, vendor_id).await?;
        self.gateway
            .query(
                Filter::new()
                    .eq("vendor_id", vendor_id)
                    .order_by("created_at", Order::Asc),
            )
            .await
    }

    pub async fn get_vendor(&self, vendor_id: Uuid) -> Result<VendorProfile> {
        self.gateway.get(vendor_id).await
    }

    /// Public search over verified vendors, best-rated first.
    pub async fn discover(&self, query: DiscoveryQuery) -> Result<Vec<VendorProfile>> {
        let mut filter = Filter::new()
            .eq("is_verified", true)
            .order_by("rating_average", Order::Desc);
        if let Some(category) = query.category {
            filter = filter.eq("category", category);
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter
                .contains("business_name", search)
                .contains("description", search);
        }
        self.gateway.query(filter).await
    }

    /// Verification gates public discovery and is administrative only.
    pub async fn set_verified(
        &self,
        actor: &Actor,
        vendor_id: Uuid,
        verified: bool,
    ) -> Result<VendorProfile> {
        if !actor.has_role(Role::Admin) {
            return Err(Error::forbidden(format!(
                "actor {} is not an administrator",
                actor.id
            )));
        }

        let profile = self
            .gateway
            .update::<VendorProfile, _, _>(vendor_id, |_| true, move |profile| {
                profile.is_verified = verified;
                profile.updated_at = Utc::now();
            })
            .await?;

        info!(vendor_id = %vendor_id, verified = verified, "Vendor verification updated");
        Ok(profile)
    }

    async fn owned_profile(&self, actor: &Actor, vendor_id: Uuid) -> Result<VendorProfile> {
        let profile: VendorProfile = self.gateway.get(vendor_id).await?;
        if profile.user_id != actor.id {
            return Err(Error::forbidden(format!(
                "actor {} does not own vendor profile {}",
                actor.id, vendor_id
            )));
        }
        Ok(profile)
    }
}

fn validate_profile(fields: &NewVendorProfile) -> Result<()> {
    if fields.business_name.trim().is_empty() {
        return Err(Error::validation("business_name", "must not be empty"));
    }
    if fields.phone_number <= 0 {
        return Err(Error::validation("phone_number", "must be a positive number"));
    }
    if fields.address.trim().is_empty() {
        return Err(Error::validation("address", "must not be empty"));
    }
    if fields.city.trim().is_empty() {
        return Err(Error::validation("city", "must not be empty"));
    }
    if fields.state.trim().is_empty() {
        return Err(Error::validation("state", "must not be empty"));
    }
    if fields.pincode <= 0 {
        return Err(Error::validation("pincode", "must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VendorCategory;
    use crate::storage::MemoryGateway;

    fn catalog() -> CatalogService<MemoryGateway> {
        let retry = RetryConfig {
            attempts: 1,
            base_delay_ms: 1,
        };
        CatalogService::new(Arc::new(MemoryGateway::new()), retry)
    }

    fn user() -> Actor {
        Actor::new(Uuid::new_v4(), [])
    }

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), [Role::Admin])
    }

    fn profile_fields(name: &str) -> NewVendorProfile {
        NewVendorProfile {
            business_name: name.to_string(),
            category: VendorCategory::HomeServices,
            description: Some("Pipes and taps".to_string()),
            phone_number: 9_876_543_210,
            email: None,
            address: "12 Canal Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: 411_001,
        }
    }

    fn service_fields(name: &str) -> NewService {
        NewService {
            service_name: name.to_string(),
            description: None,
            price_range: Some("Rs 500-1500".to_string()),
            duration: Some("1 hour".to_string()),
        }
    }

    #[tokio::test]
    async fn become_vendor_creates_profile_and_grants_role() {
        let catalog = catalog();
        let actor = user();

        let profile = catalog
            .become_vendor(&actor, profile_fields("Acme Plumbing"))
            .await
            .unwrap();
        assert_eq!(profile.user_id, actor.id);
        assert!(!profile.is_verified);
        assert_eq!(profile.total_reviews, 0);

        let roles: Vec<RoleAssignment> = catalog
            .gateway
            .query(Filter::new().eq("user_id", actor.id))
            .await
            .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role, Role::Vendor);
    }

    #[tokio::test]
    async fn second_become_vendor_is_rejected() {
        let catalog = catalog();
        let actor = user();
        catalog
            .become_vendor(&actor, profile_fields("Acme Plumbing"))
            .await
            .unwrap();

        let err = catalog
            .become_vendor(&actor, profile_fields("Acme Again"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyVendor(id) if id == actor.id));
    }

    #[tokio::test]
    async fn grant_vendor_role_is_idempotent() {
        let catalog = catalog();
        let actor = user();
        catalog.grant_vendor_role(actor.id).await.unwrap();
        catalog.grant_vendor_role(actor.id).await.unwrap();

        let roles: Vec<RoleAssignment> = catalog
            .gateway
            .query(Filter::new().eq("user_id", actor.id))
            .await
            .unwrap();
        assert_eq!(roles.len(), 1);
    }

    #[tokio::test]
    async fn empty_business_name_fails_validation() {
        let catalog = catalog();
        let err = catalog
            .become_vendor(&user(), profile_fields("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "business_name", .. }));
    }

    #[tokio::test]
    async fn only_the_owner_updates_a_profile() {
        let catalog = catalog();
        let owner = user();
        let profile = catalog
            .become_vendor(&owner, profile_fields("Acme Plumbing"))
            .await
            .unwrap();

        let err = catalog
            .update_profile(&user(), profile.id, VendorProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let update = VendorProfileUpdate {
            description: Some("Emergency call-outs".to_string()),
            city: Some("Mumbai".to_string()),
            ..Default::default()
        };
        let updated = catalog.update_profile(&owner, profile.id, update).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("Emergency call-outs"));
        assert_eq!(updated.city, "Mumbai");
        // Immutable fields survive any update payload.
        assert_eq!(updated.business_name, "Acme Plumbing");
        assert_eq!(updated.category, VendorCategory::HomeServices);
    }

    #[tokio::test]
    async fn service_crud_requires_ownership() {
        let catalog = catalog();
        let owner = user();
        let stranger = user();
        let profile = catalog
            .become_vendor(&owner, profile_fields("Acme Plumbing"))
            .await
            .unwrap();

        let err = catalog
            .add_service(&stranger, profile.id, service_fields("Leak fix"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let service = catalog
            .add_service(&owner, profile.id, service_fields("Leak fix"))
            .await
            .unwrap();
        assert!(service.is_active);

        let err = catalog
            .set_service_active(&stranger, service.id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let err = catalog
            .delete_service(&stranger, service.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        catalog.delete_service(&owner, service.id).await.unwrap();
    }

    #[tokio::test]
    async fn add_service_requires_a_name() {
        let catalog = catalog();
        let owner = user();
        let profile = catalog
            .become_vendor(&owner, profile_fields("Acme Plumbing"))
            .await
            .unwrap();

        let err = catalog
            .add_service(&owner, profile.id, service_fields(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "service_name", .. }));
    }

    #[tokio::test]
    async fn inactive_services_are_hidden_from_public_reads() {
        let catalog = catalog();
        let owner = user();
        let profile = catalog
            .become_vendor(&owner, profile_fields("Acme Plumbing"))
            .await
            .unwrap();
        let keep = catalog
            .add_service(&owner, profile.id, service_fields("Leak fix"))
            .await
            .unwrap();
        let hide = catalog
            .add_service(&owner, profile.id, service_fields("Drain clean"))
            .await
            .unwrap();
        catalog
            .set_service_active(&owner, hide.id, false)
            .await
            .unwrap();

        let public = catalog.list_active_services(profile.id).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, keep.id);

        let mine = catalog.list_services(&owner, profile.id).await.unwrap();
        assert_eq!(mine.len(), 2);

        let err = catalog
            .list_services(&user(), profile.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn discovery_returns_verified_vendors_best_rated_first() {
        let catalog = catalog();
        let admin = admin();

        let a = user();
        let verified = catalog
            .become_vendor(&a, profile_fields("Acme Plumbing"))
            .await
            .unwrap();
        catalog.set_verified(&admin, verified.id, true).await.unwrap();

        let b = user();
        catalog
            .become_vendor(&b, profile_fields("Shadow Plumbing"))
            .await
            .unwrap();

        let found = catalog.discover(DiscoveryQuery::default()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, verified.id);

        let by_search = catalog
            .discover(DiscoveryQuery {
                search: Some("acme".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);

        let miss = catalog
            .discover(DiscoveryQuery {
                search: Some("bakery".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(miss.is_empty());

        let wrong_category = catalog
            .discover(DiscoveryQuery {
                category: Some(VendorCategory::Automotive),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(wrong_category.is_empty());
    }

    #[tokio::test]
    async fn verification_is_admin_only() {
        let catalog = catalog();
        let owner = user();
        let profile = catalog
            .become_vendor(&owner, profile_fields("Acme Plumbing"))
            .await
            .unwrap();

        let err = catalog
            .set_verified(&owner, profile.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let updated = catalog.set_verified(&admin(), profile.id, true).await.unwrap();
        assert!(updated.is_verified);
    }
}
