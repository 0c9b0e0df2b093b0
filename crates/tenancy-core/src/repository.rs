//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Subscription operations take a
//! `tenant_id` to keep reads and writes inside one tenant. Users and
//! sessions are looked up globally: emails are unique across tenants and
//! session ids are opaque tokens.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::TenancyResult;
use crate::models::{
    session::{CreateSession, Session},
    subscription::{CreateSubscription, Subscription, UpdateSubscription},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
};

// ---------------------------------------------------------------------------
// Tenant (root aggregate)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = TenancyResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TenancyResult<Tenant>> + Send;
    fn get_by_stripe_customer_id(
        &self,
        stripe_customer_id: &str,
    ) -> impl Future<Output = TenancyResult<Tenant>> + Send;
    /// `None` clears the link to the billing customer.
    fn set_stripe_customer_id(
        &self,
        id: Uuid,
        stripe_customer_id: Option<String>,
    ) -> impl Future<Output = TenancyResult<Tenant>> + Send;
    /// Deletes the tenant and, through cascading foreign keys, its users,
    /// sessions and subscriptions.
    fn delete(&self, id: Uuid) -> impl Future<Output = TenancyResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = TenancyResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TenancyResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = TenancyResult<User>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = TenancyResult<Vec<User>>> + Send;
    /// Deletes the user together with its sessions.
    fn delete(&self, id: Uuid) -> impl Future<Output = TenancyResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Storage adapter for the session service, bound to the `session` and
/// `users` tables.
pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = TenancyResult<Session>> + Send;
    /// Loads a session row together with the user it belongs to.
    fn get_with_user(
        &self,
        id: &str,
    ) -> impl Future<Output = TenancyResult<(Session, User)>> + Send;
    fn list_by_user(&self, user_id: Uuid)
    -> impl Future<Output = TenancyResult<Vec<Session>>> + Send;
    fn update_expiration(
        &self,
        id: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = TenancyResult<()>> + Send;
    /// Deleting an unknown id is not an error.
    fn delete(&self, id: &str) -> impl Future<Output = TenancyResult<()>> + Send;
    fn delete_by_user(&self, user_id: Uuid) -> impl Future<Output = TenancyResult<()>> + Send;
    /// Removes every session whose `expires_at` is at or before `now`.
    /// Returns the number of rows removed.
    fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = TenancyResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Subscriptions (tenant scope)
// ---------------------------------------------------------------------------

pub trait SubscriptionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateSubscription,
    ) -> impl Future<Output = TenancyResult<Subscription>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: &str,
    ) -> impl Future<Output = TenancyResult<Subscription>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = TenancyResult<Vec<Subscription>>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: &str,
        input: UpdateSubscription,
    ) -> impl Future<Output = TenancyResult<Subscription>> + Send;
    fn delete(&self, tenant_id: Uuid, id: &str) -> impl Future<Output = TenancyResult<()>> + Send;
}
