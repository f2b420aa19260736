//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataResult, map_unique_violation};
use crate::repos::{AdminRepo, FeedbackRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: AdminRepo + FeedbackRepo + Send + Sync {
    /// Create tables and indexes if they do not exist.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) a database file.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?;
        Self::connect(opts, false).await
    }

    /// Open a database from a `sqlite:` URL, e.g. `sqlite://data/clientpulse.db`
    /// or `sqlite::memory:`.
    pub async fn from_url(url: &str) -> MetadataResult<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let opts = SqliteConnectOptions::from_str(url)?;
        if !in_memory
            && let Some(parent) = opts.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::connect(opts, in_memory).await
    }

    async fn connect(opts: SqliteConnectOptions, in_memory: bool) -> MetadataResult<Self> {
        let opts = opts
            .create_if_missing(true)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));
        let opts = if in_memory {
            opts
        } else {
            opts.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        };

        let mut pool_opts = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // "database is locked" failures under axum concurrency.
            .max_connections(1);
        if in_memory {
            // An in-memory database lives only as long as its connection.
            pool_opts = pool_opts.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_opts.connect_with(opts).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Implement the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use clientpulse_core::RatingStats;
    use time::{OffsetDateTime, UtcOffset};

    /// Fixed-width UTC text (`YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ`), so string
    /// comparison in SQL matches time order.
    pub(super) fn stored_timestamp(ts: OffsetDateTime) -> String {
        let ts = ts.to_offset(UtcOffset::UTC);
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}Z",
            ts.year(),
            u8::from(ts.month()),
            ts.day(),
            ts.hour(),
            ts.minute(),
            ts.second(),
            ts.nanosecond()
        )
    }

    #[async_trait]
    impl AdminRepo for SqliteStore {
        async fn create_admin(&self, admin: &NewAdmin) -> MetadataResult<AdminRow> {
            sqlx::query_as::<_, AdminRow>(
                r#"
                INSERT INTO admins (username, email, hashed_password, is_active, created_at)
                VALUES (?, ?, ?, 1, ?)
                RETURNING *
                "#,
            )
            .bind(&admin.username)
            .bind(&admin.email)
            .bind(&admin.hashed_password)
            .bind(stored_timestamp(admin.created_at))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &["username", "email"]))
        }

        async fn get_admin(&self, id: i64) -> MetadataResult<Option<AdminRow>> {
            let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_admin_by_username(&self, username: &str) -> MetadataResult<Option<AdminRow>> {
            let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_admin_by_email(&self, email: &str) -> MetadataResult<Option<AdminRow>> {
            let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE email = ?")
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
    impl FeedbackRepo for SqliteStore {
        async fn create_feedback(&self, feedback: &NewFeedback) -> MetadataResult<FeedbackRow> {
            let row = sqlx::query_as::<_, FeedbackRow>(
                r#"
                INSERT INTO feedbacks (
                    name, email, rating, description, screenshot_url, client_ip, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(&feedback.name)
            .bind(&feedback.email)
            .bind(feedback.rating)
            .bind(&feedback.description)
            .bind(&feedback.screenshot_url)
            .bind(&feedback.client_ip)
            .bind(stored_timestamp(feedback.created_at))
            .fetch_one(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_feedback(&self, id: i64) -> MetadataResult<Option<FeedbackRow>> {
            let row = sqlx::query_as::<_, FeedbackRow>("SELECT * FROM feedbacks WHERE id = ?")
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
            let (count, average): (i64, Option<f64>) = match since {
                Some(since) => {
                    sqlx::query_as(
                        "SELECT COUNT(*), AVG(rating) FROM feedbacks WHERE created_at >= ?",
                    )
                    .bind(stored_timestamp(since))
                    .fetch_one(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as("SELECT COUNT(*), AVG(rating) FROM feedbacks")
                        .fetch_one(&self.pool)
                        .await?
                }
            };
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
            // A negative LIMIT means "no limit" in SQLite.
            let rows = sqlx::query_as::<_, FeedbackRow>(
                "SELECT * FROM feedbacks ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            )
            .bind(limit.unwrap_or(-1))
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }
}

/// SQLite schema.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username VARCHAR(100) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    hashed_password VARCHAR(255) NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_admins_username ON admins(username);
CREATE INDEX IF NOT EXISTS idx_admins_email ON admins(email);

CREATE TABLE IF NOT EXISTS feedbacks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    rating INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
    description TEXT,
    screenshot_url VARCHAR(500),
    client_ip VARCHAR(45),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_feedbacks_email ON feedbacks(email);
CREATE INDEX IF NOT EXISTS idx_feedbacks_created_at ON feedbacks(created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetadataError;
    use crate::models::{NewAdmin, NewFeedback};
    use time::{Duration as TimeDuration, OffsetDateTime};

    async fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("nested/metadata.db"))
            .await
            .unwrap();
        (dir, store)
    }

    fn admin(username: &str, email: &str) -> NewAdmin {
        NewAdmin {
            username: username.to_string(),
            email: email.to_string(),
            hashed_password: "$argon2id$placeholder".to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn feedback(rating: i32, age: TimeDuration) -> NewFeedback {
        NewFeedback {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            rating,
            description: None,
            screenshot_url: None,
            client_ip: Some("203.0.113.7".to_string()),
            created_at: OffsetDateTime::now_utc() - age,
        }
    }

    #[tokio::test]
    async fn test_admin_crud() {
        let (_dir, store) = store().await;
        assert_eq!(store.count_admins().await.unwrap(), 0);

        let created = store
            .create_admin(&admin("root", "root@example.com"))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(created.is_active);

        let by_id = store.get_admin(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "root");
        assert!(store.get_admin_by_username("root").await.unwrap().is_some());
        assert!(
            store
                .get_admin_by_email("root@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.get_admin(created.id + 1).await.unwrap().is_none());
        assert_eq!(store.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_admin_maps_to_already_exists() {
        let (_dir, store) = store().await;
        store
            .create_admin(&admin("root", "root@example.com"))
            .await
            .unwrap();

        let err = store
            .create_admin(&admin("root", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::AlreadyExists(ref c) if c == "username"));

        let err = store
            .create_admin(&admin("other", "root@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::AlreadyExists(ref c) if c == "email"));
    }

    #[tokio::test]
    async fn test_rating_check_constraint() {
        let (_dir, store) = store().await;
        let err = store
            .create_feedback(&feedback(6, TimeDuration::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Database(_)));
        assert_eq!(store.count_feedbacks().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_windowed_stats() {
        let (_dir, store) = store().await;
        store
            .create_feedback(&feedback(5, TimeDuration::days(1)))
            .await
            .unwrap();
        store
            .create_feedback(&feedback(4, TimeDuration::days(45)))
            .await
            .unwrap();
        store
            .create_feedback(&feedback(1, TimeDuration::days(120)))
            .await
            .unwrap();

        let now = OffsetDateTime::now_utc();
        let all = store.rating_stats(None).await.unwrap();
        assert_eq!(all.count, 3);
        assert!((all.average.unwrap() - 10.0 / 3.0).abs() < 1e-9);

        let last_30 = store
            .rating_stats(Some(now - TimeDuration::days(30)))
            .await
            .unwrap();
        assert_eq!(last_30.count, 1);
        assert_eq!(last_30.average, Some(5.0));

        let last_60 = store
            .rating_stats(Some(now - TimeDuration::days(60)))
            .await
            .unwrap();
        assert_eq!(last_60.count, 2);
        assert_eq!(last_60.average, Some(4.5));

        let future = store
            .rating_stats(Some(now + TimeDuration::days(1)))
            .await
            .unwrap();
        assert_eq!(future.count, 0);
        assert_eq!(future.average, None);

        assert_eq!(store.rating_counts().await.unwrap(), vec![(1, 1), (4, 1), (5, 1)]);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_dir, store) = store().await;
        for days in [3, 1, 2] {
            store
                .create_feedback(&feedback(days as i32, TimeDuration::days(days)))
                .await
                .unwrap();
        }

        let all = store.list_feedbacks(0, None).await.unwrap();
        let ratings: Vec<_> = all.iter().map(|f| f.rating).collect();
        assert_eq!(ratings, [1, 2, 3]);

        let page = store.list_feedbacks(1, Some(1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].rating, 2);

        assert!(store.list_feedbacks(10, Some(5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sub_second_timestamps_keep_time_order() {
        let (_dir, store) = store().await;
        let since = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();

        let mut later = feedback(2, TimeDuration::ZERO);
        later.created_at = since + TimeDuration::nanoseconds(500_000_001);
        let mut earlier = feedback(1, TimeDuration::ZERO);
        earlier.created_at = since + TimeDuration::milliseconds(500);
        // Insert the later row first so the id tiebreak cannot mask the order.
        let stored = store.create_feedback(&later).await.unwrap();
        store.create_feedback(&earlier).await.unwrap();
        assert_eq!(stored.created_at, later.created_at);

        let window = store
            .rating_stats(Some(since + TimeDuration::milliseconds(400)))
            .await
            .unwrap();
        assert_eq!(window.count, 2);

        let window = store
            .rating_stats(Some(since + TimeDuration::nanoseconds(500_000_001)))
            .await
            .unwrap();
        assert_eq!(window.count, 1);
        assert_eq!(window.average, Some(2.0));

        let ratings: Vec<_> = store
            .list_feedbacks(0, None)
            .await
            .unwrap()
            .iter()
            .map(|f| f.rating)
            .collect();
        assert_eq!(ratings, [2, 1]);
    }

    #[test]
    fn test_stored_timestamp_is_fixed_width_utc() {
        let ts = OffsetDateTime::UNIX_EPOCH + TimeDuration::milliseconds(1_500);
        assert_eq!(
            sqlite_impl::stored_timestamp(ts),
            "1970-01-01T00:00:01.500000000Z"
        );
        let offset = ts.to_offset(time::UtcOffset::from_hms(2, 0, 0).unwrap());
        assert_eq!(
            sqlite_impl::stored_timestamp(offset),
            "1970-01-01T00:00:01.500000000Z"
        );
    }

    #[tokio::test]
    async fn test_in_memory_url_keeps_schema() {
        let store = SqliteStore::from_url("sqlite::memory:").await.unwrap();
        store.health_check().await.unwrap();
        store
            .create_feedback(&feedback(3, TimeDuration::ZERO))
            .await
            .unwrap();
        assert_eq!(store.count_feedbacks().await.unwrap(), 1);
    }
}
