//! Shared PostgreSQL test infrastructure.
//!
//! One container is started per test binary; every test gets its own
//! freshly migrated database inside it.

use sqlx::PgPool;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

static POSTGRES: OnceCell<(ContainerAsync<Postgres>, String)> = OnceCell::const_new();

async fn start_postgres() -> (ContainerAsync<Postgres>, String) {
    let container = Postgres::default()
        .start()
        .await
        .expect("failed to start PostgreSQL container");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");

    let base_url = format!("postgres://postgres:postgres@{host}:{port}");
    (container, base_url)
}

/// Create an isolated, migrated database and return a pool for it.
pub async fn test_pool() -> PgPool {
    let (_, base_url) = POSTGRES.get_or_init(start_postgres).await;

    let admin = PgPool::connect(&format!("{base_url}/postgres"))
        .await
        .expect("connect to admin database");

    let name = format!("tenancy_test_{}", Uuid::new_v4().simple());
    sqlx::query(&format!("CREATE DATABASE \"{name}\""))
        .execute(&admin)
        .await
        .expect("create test database");
    admin.close().await;

    let pool = PgPool::connect(&format!("{base_url}/{name}"))
        .await
        .expect("connect to test database");

    tenancy_db::run_migrations(&pool)
        .await
        .expect("migrations apply");

    pool
}
