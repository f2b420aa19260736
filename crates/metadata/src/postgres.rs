//! PostgreSQL-based metadata store implementation.

use crate::error::{MetadataResult, map_unique_violation};
use crate::models::*;
use crate::repos::{AdminRepo, FeedbackRepo};
use crate::store::MetadataStore;
use async_trait::async_trait;
use clientpulse_core::RatingStats;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use time::OffsetDateTime;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connect with a `postgres://` URL and run the schema migration.
    pub async fn from_url(url: &str, max_connections: u32) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // PostgreSQL doesn't allow multiple statements in a single prepared statement,
        // so we split the schema and execute each statement separately.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminRepo for PostgresStore {
    async fn create_admin(&self, admin: &NewAdmin) -> MetadataResult<AdminRow> {
        sqlx::query_as::<_, AdminRow>(
            r#"
            INSERT INTO admins (username, email, hashed_password, is_active, created_at)
            VALUES ($1, $2, $3, TRUE, $4)
            RETURNING *
            "#,
        )
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&admin.hashed_password)
        .bind(admin.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &["username", "email"]))
    }

    async fn get_admin(&self, id: i64) -> MetadataResult<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_admin_by_username(&self, username: &str) -> MetadataResult<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_admin_by_email(&self, email: &str) -> MetadataResult<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn count_admins(&self) -> MetadataResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl FeedbackRepo for PostgresStore {
    async fn create_feedback(&self, feedback: &NewFeedback) -> MetadataResult<FeedbackRow> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            r#"
            INSERT INTO feedbacks (
                name, email, rating, description, screenshot_url, client_ip, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&feedback.name)
        .bind(&feedback.email)
        .bind(feedback.rating)
        .bind(&feedback.description)
        .bind(&feedback.screenshot_url)
        .bind(&feedback.client_ip)
        .bind(feedback.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_feedback(&self, id: i64) -> MetadataResult<Option<FeedbackRow>> {
        let row = sqlx::query_as::<_, FeedbackRow>("SELECT * FROM feedbacks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn count_feedbacks(&self) -> MetadataResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn rating_stats(&self, since: Option<OffsetDateTime>) -> MetadataResult<RatingStats> {
        // AVG over INTEGER yields NUMERIC; cast so it decodes as f64.
        let (count, average): (i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), AVG(rating)::DOUBLE PRECISION
            FROM feedbacks
            WHERE $1::TIMESTAMPTZ IS NULL OR created_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(RatingStats { count, average })
    }

    async fn rating_counts(&self) -> MetadataResult<Vec<(i32, i64)>> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT rating, COUNT(*) FROM feedbacks GROUP BY rating ORDER BY rating",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_feedbacks(
        &self,
        offset: i64,
        limit: Option<i64>,
    ) -> MetadataResult<Vec<FeedbackRow>> {
        // LIMIT NULL means no limit.
        let rows = sqlx::query_as::<_, FeedbackRow>(
            "SELECT * FROM feedbacks ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
