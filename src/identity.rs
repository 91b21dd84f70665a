use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Actor, Role, RoleAssignment};
use crate::storage::{Filter, Gateway};

/// Resolves actor ids into role-carrying `Actor`s and tracks who is signed
/// in. Sign-up and session handling live outside this crate; this context
/// only consumes the resulting id.
#[derive(Clone)]
pub struct IdentityContext<G> {
    gateway: Arc<G>,
    current: Option<Uuid>,
}

impl<G: Gateway> IdentityContext<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            current: None,
        }
    }

    pub fn sign_in(&mut self, user_id: Uuid) {
        debug!(user_id = %user_id, "Actor signed in");
        self.current = Some(user_id);
    }

    pub fn sign_out(&mut self) {
        self.current = None;
    }

    /// The signed-in actor, or `Unauthenticated` when no one is.
    pub async fn current_actor(&self) -> Result<Actor> {
        match self.current {
            Some(user_id) => self.resolve(user_id).await,
            None => Err(Error::Unauthenticated),
        }
    }

    /// Builds the role set for a known actor id from its `user_roles` rows.
    /// Every actor carries `Role::User` whether or not a row exists for it.
    pub async fn resolve(&self, user_id: Uuid) -> Result<Actor> {
        let assignments: Vec<RoleAssignment> = self
            .gateway
            .query(Filter::new().eq("user_id", user_id))
            .await?;
        let roles = assignments.into_iter().map(|a| a.role);
        Ok(Actor::new(user_id, roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryGateway;

    #[tokio::test]
    async fn unknown_actor_still_holds_the_user_role() {
        let gateway = Arc::new(MemoryGateway::new());
        let identity = IdentityContext::new(gateway);
        let actor = identity.resolve(Uuid::new_v4()).await.unwrap();
        assert!(actor.has_role(Role::User));
        assert!(!actor.has_role(Role::Vendor));
    }

    #[tokio::test]
    async fn granted_roles_are_added_to_the_set() {
        let gateway = Arc::new(MemoryGateway::new());
        let user_id = Uuid::new_v4();
        gateway
            .insert(&RoleAssignment::new(user_id, Role::Vendor))
            .await
            .unwrap();

        let identity = IdentityContext::new(gateway);
        let actor = identity.resolve(user_id).await.unwrap();
        assert!(actor.has_role(Role::User));
        assert!(actor.has_role(Role::Vendor));
    }

    #[tokio::test]
    async fn nobody_signed_in_is_unauthenticated() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut identity = IdentityContext::new(gateway);
        let err = identity.current_actor().await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));

        let user_id = Uuid::new_v4();
        identity.sign_in(user_id);
        assert_eq!(identity.current_actor().await.unwrap().id, user_id);

        identity.sign_out();
        assert!(identity.current_actor().await.is_err());
    }
}
