//! Integration tests for the PostgreSQL repositories.
//!
//! Run with: cargo test -p tenancy-db -- --ignored (requires Docker).

mod common;

use chrono::{Duration, SubsecRound, Utc};
use sqlx::PgPool;
use tenancy_core::error::TenancyError;
use tenancy_core::models::session::CreateSession;
use tenancy_core::models::subscription::{CreateSubscription, SubscriptionType, UpdateSubscription};
use tenancy_core::models::tenant::CreateTenant;
use tenancy_core::models::user::CreateUser;
use tenancy_core::repository::{
    SessionRepository, SubscriptionRepository, TenantRepository, UserRepository,
};
use tenancy_db::repository::{
    PgSessionRepository, PgSubscriptionRepository, PgTenantRepository, PgUserRepository,
};
use uuid::Uuid;

/// Helper: fresh database with one tenant and one user in it.
async fn setup() -> (PgPool, Uuid, Uuid) {
    let pool = common::test_pool().await;

    let tenant = PgTenantRepository::new(pool.clone())
        .create(CreateTenant::default())
        .await
        .unwrap();
    let user = PgUserRepository::new(pool.clone())
        .create(CreateUser::new(tenant.id, "alice@example.com"))
        .await
        .unwrap();

    (pool, tenant.id, user.id)
}

fn session_for(user_id: Uuid, tenant_id: Uuid, expires_in: Duration) -> CreateSession {
    CreateSession {
        id: Uuid::new_v4().simple().to_string(),
        user_id,
        expires_at: Utc::now() + expires_in,
        tenant_id,
    }
}

fn subscription_for(tenant_id: Uuid, id: &str) -> CreateSubscription {
    let start = Utc::now();
    CreateSubscription {
        id: id.into(),
        kind: SubscriptionType::Free,
        created_at: None,
        updated_at: None,
        current_period_start: start,
        current_period_end: start + Duration::days(30),
        tenant_id,
    }
}

// ---------------------------------------------------------------------------
// Tenants
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn tenant_defaults_round_trip() {
    let pool = common::test_pool().await;
    let repo = PgTenantRepository::new(pool);

    let before = Utc::now();
    let tenant = repo.create(CreateTenant::default()).await.unwrap();

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched, tenant);
    assert_eq!(fetched.verified, Some(false));
    assert_eq!(fetched.stripe_customer_id, None);

    let created_at = fetched.created_at.expect("created_at defaults to now");
    assert!((created_at - before).abs() < Duration::minutes(1));
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn tenant_explicit_values_are_kept() {
    let pool = common::test_pool().await;
    let repo = PgTenantRepository::new(pool);

    let id = Uuid::new_v4();
    let created_at = (Utc::now() - Duration::days(2)).trunc_subsecs(3);
    let tenant = repo
        .create(CreateTenant {
            id: Some(id),
            created_at: Some(created_at),
            verified: Some(true),
            stripe_customer_id: Some("cus_123".into()),
        })
        .await
        .unwrap();

    assert_eq!(tenant.id, id);
    assert_eq!(tenant.created_at, Some(created_at));
    assert_eq!(tenant.verified, Some(true));

    let by_stripe = repo.get_by_stripe_customer_id("cus_123").await.unwrap();
    assert_eq!(by_stripe.id, id);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn duplicate_stripe_customer_rejected_but_nulls_allowed() {
    let pool = common::test_pool().await;
    let repo = PgTenantRepository::new(pool);

    let first = repo.create(CreateTenant::default()).await.unwrap();
    let second = repo.create(CreateTenant::default()).await.unwrap();

    repo.set_stripe_customer_id(first.id, Some("cus_dup".into()))
        .await
        .unwrap();
    let err = repo
        .set_stripe_customer_id(second.id, Some("cus_dup".into()))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, TenancyError::UniqueViolation { constraint } if constraint == "idx_tenants_stripe_customer_id"),
        "expected UniqueViolation, got: {err:?}"
    );

    let cleared = repo.set_stripe_customer_id(first.id, None).await.unwrap();
    assert_eq!(cleared.stripe_customer_id, None);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn missing_tenant_is_not_found() {
    let pool = common::test_pool().await;
    let repo = PgTenantRepository::new(pool);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());

    let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn deleting_tenant_cascades_to_dependents() {
    let (pool, tenant_id, user_id) = setup().await;
    let tenants = PgTenantRepository::new(pool.clone());
    let users = PgUserRepository::new(pool.clone());
    let sessions = PgSessionRepository::new(pool.clone());
    let subscriptions = PgSubscriptionRepository::new(pool.clone());

    let session = sessions
        .create(session_for(user_id, tenant_id, Duration::hours(1)))
        .await
        .unwrap();
    subscriptions
        .create(subscription_for(tenant_id, "sub_cascade"))
        .await
        .unwrap();

    tenants.delete(tenant_id).await.unwrap();

    assert!(users.get_by_id(user_id).await.unwrap_err().is_not_found());
    assert!(sessions.get_with_user(&session.id).await.unwrap_err().is_not_found());
    assert!(subscriptions.list_by_tenant(tenant_id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn create_and_get_user() {
    let (pool, tenant_id, user_id) = setup().await;
    let repo = PgUserRepository::new(pool);

    let user = repo.get_by_id(user_id).await.unwrap();
    assert_eq!(user.tenant_id, tenant_id);
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.verified, Some(false));
    assert!(user.created_at.is_some());

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email, user);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn email_is_unique_across_tenants() {
    let (pool, _, _) = setup().await;
    let other_tenant = PgTenantRepository::new(pool.clone())
        .create(CreateTenant::default())
        .await
        .unwrap();
    let repo = PgUserRepository::new(pool);

    let err = repo
        .create(CreateUser::new(other_tenant.id, "alice@example.com"))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, TenancyError::UniqueViolation { constraint } if constraint == "idx_users_email"),
        "expected UniqueViolation, got: {err:?}"
    );
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn user_with_unknown_tenant_rejected() {
    let pool = common::test_pool().await;
    let repo = PgUserRepository::new(pool);

    let err = repo
        .create(CreateUser::new(Uuid::new_v4(), "ghost@example.com"))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, TenancyError::ForeignKeyViolation { constraint } if constraint == "users_tenant_id_tenants_id_fk"),
        "expected ForeignKeyViolation, got: {err:?}"
    );
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn list_users_by_tenant() {
    let (pool, tenant_id, _) = setup().await;
    let repo = PgUserRepository::new(pool.clone());

    repo.create(CreateUser::new(tenant_id, "bob@example.com"))
        .await
        .unwrap();
    let other = PgTenantRepository::new(pool)
        .create(CreateTenant::default())
        .await
        .unwrap();
    repo.create(CreateUser::new(other.id, "carol@example.com"))
        .await
        .unwrap();

    let users = repo.list_by_tenant(tenant_id).await.unwrap();
    let mut emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
    emails.sort_unstable();
    assert_eq!(emails, ["alice@example.com", "bob@example.com"]);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn deleting_user_removes_its_sessions() {
    let (pool, tenant_id, user_id) = setup().await;
    let users = PgUserRepository::new(pool.clone());
    let sessions = PgSessionRepository::new(pool);

    sessions
        .create(session_for(user_id, tenant_id, Duration::hours(1)))
        .await
        .unwrap();

    users.delete(user_id).await.unwrap();

    assert!(sessions.list_by_user(user_id).await.unwrap().is_empty());
    assert!(users.get_by_id(user_id).await.unwrap_err().is_not_found());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn session_round_trip_with_user() {
    let (pool, tenant_id, user_id) = setup().await;
    let repo = PgSessionRepository::new(pool);

    let input = session_for(user_id, tenant_id, Duration::hours(1));
    let expected_expiry = input.expires_at.trunc_subsecs(3);
    let session = repo.create(input).await.unwrap();
    assert_eq!(session.expires_at, expected_expiry);

    let (fetched, user) = repo.get_with_user(&session.id).await.unwrap();
    assert_eq!(fetched, session);
    assert_eq!(user.id, user_id);
    assert_eq!(user.tenant_id, fetched.tenant_id);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn session_expiration_can_be_extended() {
    let (pool, tenant_id, user_id) = setup().await;
    let repo = PgSessionRepository::new(pool);

    let session = repo
        .create(session_for(user_id, tenant_id, Duration::minutes(5)))
        .await
        .unwrap();
    let later = (Utc::now() + Duration::days(30)).trunc_subsecs(3);

    repo.update_expiration(&session.id, later).await.unwrap();

    let (fetched, _) = repo.get_with_user(&session.id).await.unwrap();
    assert_eq!(fetched.expires_at, later);

    let err = repo.update_expiration("missing", later).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn delete_expired_only_touches_past_sessions() {
    let (pool, tenant_id, user_id) = setup().await;
    let repo = PgSessionRepository::new(pool);

    repo.create(session_for(user_id, tenant_id, -Duration::hours(1)))
        .await
        .unwrap();
    repo.create(session_for(user_id, tenant_id, -Duration::minutes(1)))
        .await
        .unwrap();
    let live = repo
        .create(session_for(user_id, tenant_id, Duration::hours(1)))
        .await
        .unwrap();

    let removed = repo.delete_expired(Utc::now()).await.unwrap();
    assert_eq!(removed, 2);

    let remaining = repo.list_by_user(user_id).await.unwrap();
    assert_eq!(remaining, vec![live]);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn delete_session_and_user_sessions() {
    let (pool, tenant_id, user_id) = setup().await;
    let repo = PgSessionRepository::new(pool);

    let first = repo
        .create(session_for(user_id, tenant_id, Duration::hours(1)))
        .await
        .unwrap();
    repo.create(session_for(user_id, tenant_id, Duration::hours(2)))
        .await
        .unwrap();

    repo.delete(&first.id).await.unwrap();
    // Unknown ids are ignored.
    repo.delete(&first.id).await.unwrap();
    assert_eq!(repo.list_by_user(user_id).await.unwrap().len(), 1);

    repo.delete_by_user(user_id).await.unwrap();
    assert!(repo.list_by_user(user_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn session_for_unknown_user_rejected() {
    let (pool, tenant_id, _) = setup().await;
    let repo = PgSessionRepository::new(pool);

    let err = repo
        .create(session_for(Uuid::new_v4(), tenant_id, Duration::hours(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, TenancyError::ForeignKeyViolation { .. }));
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn create_get_and_list_subscriptions() {
    let (pool, tenant_id, _) = setup().await;
    let repo = PgSubscriptionRepository::new(pool);

    let created = repo
        .create(subscription_for(tenant_id, "sub_1"))
        .await
        .unwrap();
    assert_eq!(created.kind, SubscriptionType::Free);
    assert!(created.created_at.is_some());
    assert_eq!(created.updated_at, None);

    let fetched = repo.get_by_id(tenant_id, "sub_1").await.unwrap();
    assert_eq!(fetched, created);

    // Scoped to the tenant.
    let err = repo.get_by_id(Uuid::new_v4(), "sub_1").await.unwrap_err();
    assert!(err.is_not_found());

    repo.create(subscription_for(tenant_id, "sub_2"))
        .await
        .unwrap();
    assert_eq!(repo.list_by_tenant(tenant_id).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn subscription_with_inverted_period_rejected() {
    let (pool, tenant_id, _) = setup().await;
    let repo = PgSubscriptionRepository::new(pool);

    let mut input = subscription_for(tenant_id, "sub_bad");
    input.current_period_end = input.current_period_start - Duration::days(1);

    let err = repo.create(input).await.unwrap_err();
    assert!(matches!(err, TenancyError::Validation { .. }));
    assert!(repo.list_by_tenant(tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn sub_millisecond_period_rejected_before_storage() {
    let (pool, tenant_id, _) = setup().await;
    let repo = PgSubscriptionRepository::new(pool);

    let mut input = subscription_for(tenant_id, "sub_tiny");
    input.current_period_start = input.current_period_start.trunc_subsecs(3)
        + Duration::microseconds(100);
    input.current_period_end = input.current_period_start + Duration::microseconds(500);

    let err = repo.create(input).await.unwrap_err();
    assert!(matches!(err, TenancyError::Validation { .. }));
    assert!(repo.list_by_tenant(tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn update_subscription_stamps_updated_at() {
    let (pool, tenant_id, _) = setup().await;
    let repo = PgSubscriptionRepository::new(pool);

    let created = repo
        .create(subscription_for(tenant_id, "sub_up"))
        .await
        .unwrap();
    let new_end = (created.current_period_end + Duration::days(30)).trunc_subsecs(3);

    let updated = repo
        .update(
            tenant_id,
            "sub_up",
            UpdateSubscription {
                kind: Some(SubscriptionType::Paid),
                current_period_end: Some(new_end),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.kind, SubscriptionType::Paid);
    assert_eq!(updated.current_period_end, new_end);
    assert_eq!(updated.current_period_start, created.current_period_start);
    assert!(updated.updated_at.is_some());

    let err = repo
        .update(
            tenant_id,
            "sub_up",
            UpdateSubscription {
                current_period_end: Some(created.current_period_start),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TenancyError::Validation { .. }));
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL container"]
async fn delete_subscription() {
    let (pool, tenant_id, _) = setup().await;
    let repo = PgSubscriptionRepository::new(pool);

    repo.create(subscription_for(tenant_id, "sub_del"))
        .await
        .unwrap();
    repo.delete(tenant_id, "sub_del").await.unwrap();

    let err = repo.delete(tenant_id, "sub_del").await.unwrap_err();
    assert!(err.is_not_found());
}
