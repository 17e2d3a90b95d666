//! Shared fixtures for store-backed tests.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::db_migration::initialize_database;

/// Single-connection in-memory database; every pooled connection would
/// otherwise see its own empty database.
pub(crate) async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool")
}

pub(crate) async fn migrated_pool() -> SqlitePool {
    let pool = memory_pool().await;
    initialize_database(&pool).await.expect("migrations apply");
    pool
}

pub(crate) async fn insert_user(pool: &SqlitePool, id: &str, username: &str) {
    sqlx::query("INSERT INTO users (id, username, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(username)
        .bind("2024-01-01T00:00:00.000Z")
        .execute(pool)
        .await
        .expect("insert user");
}

pub(crate) async fn insert_document(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    title: &str,
    language: Option<&str>,
    created_at: &str,
) {
    sqlx::query(
        "INSERT INTO documents (id, user_id, title, language, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(language)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("insert document");
}

pub(crate) async fn insert_tag(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    name: &str,
    color: &str,
    created_at: &str,
) {
    sqlx::query("INSERT INTO tags (id, user_id, name, color, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(color)
        .bind(created_at)
        .execute(pool)
        .await
        .expect("insert tag");
}

pub(crate) async fn soft_delete_row(pool: &SqlitePool, table: &str, id: &str) {
    let sql = format!("UPDATE {} SET deleted_at = '2024-06-01T00:00:00.000Z' WHERE id = ?", table);
    sqlx::query(&sql)
        .bind(id)
        .execute(pool)
        .await
        .expect("soft delete row");
}
