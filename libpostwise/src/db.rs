//! Database operations for Postwise
//!
//! The store owns atomicity of individual post writes. Every status
//! transition is a conditional update guarded on the current status, which
//! serializes transitions per post: of two racing transitions, exactly one
//! observes its expected status and wins.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;

use crate::error::Result;
use crate::types::{Engagement, Platform, Post, PostStatus};

/// Filter for ordered post reads. All fields optional; results are
/// newest-first by creation time.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub platform: Option<Platform>,
    pub status: Option<PostStatus>,
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(crate::error::DbError::IoError)?;
        }

        // Use forward slashes for SQLite URL (works on both Windows and Unix)
        // Use mode=rwc to allow creating the database file if it doesn't exist
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(crate::error::DbError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Insert a new post
    pub async fn create_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, platform, content, media_ref, status, scheduled_at,
                               posted_at, failure_reason, likes, comments, shares, reach,
                               created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(post.platform.as_str())
        .bind(&post.content)
        .bind(&post.media_ref)
        .bind(post.status.as_str())
        .bind(post.scheduled_at)
        .bind(post.posted_at)
        .bind(&post.failure_reason)
        .bind(post.engagement.likes)
        .bind(post.engagement.comments)
        .bind(post.engagement.shares)
        .bind(post.engagement.reach)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, platform, content, media_ref, status, scheduled_at, posted_at,
                   failure_reason, likes, comments, shares, reach, created_at
            FROM posts WHERE id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(row.map(row_to_post))
    }

    /// Replace a draft's content
    pub async fn update_post_content(&self, post_id: &str, content: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET content = ? WHERE id = ? AND status = 'draft'
            "#,
        )
        .bind(content)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition draft -> scheduled. Returns false if the post is missing
    /// or not currently a draft.
    pub async fn mark_scheduled(&self, post_id: &str, scheduled_at: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET status = 'scheduled', scheduled_at = ?
            WHERE id = ? AND status = 'draft'
            "#,
        )
        .bind(scheduled_at)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition scheduled -> posted.
    pub async fn mark_posted(&self, post_id: &str, posted_at: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET status = 'posted', posted_at = ?
            WHERE id = ? AND status = 'scheduled'
            "#,
        )
        .bind(posted_at)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition scheduled -> failed, retaining the delivery error.
    pub async fn mark_failed(&self, post_id: &str, reason: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET status = 'failed', failure_reason = ?
            WHERE id = ? AND status = 'scheduled'
            "#,
        )
        .bind(reason)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition failed -> draft, clearing schedule and failure state.
    pub async fn mark_resubmitted(&self, post_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET status = 'draft', scheduled_at = NULL, posted_at = NULL,
                failure_reason = NULL
            WHERE id = ? AND status = 'failed'
            "#,
        )
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the engagement snapshot wholesale. Only valid while posted.
    pub async fn update_engagement(&self, post_id: &str, engagement: Engagement) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET likes = ?, comments = ?, shares = ?, reach = ?
            WHERE id = ? AND status = 'posted'
            "#,
        )
        .bind(engagement.likes)
        .bind(engagement.comments)
        .bind(engagement.shares)
        .bind(engagement.reach)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Query posts with filtering, newest first
    pub async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
        // Build the WHERE clause dynamically
        let mut where_clauses = vec!["1=1"];

        if query.platform.is_some() {
            where_clauses.push("platform = ?");
        }
        if query.status.is_some() {
            where_clauses.push("status = ?");
        }
        if query.since.is_some() {
            where_clauses.push("created_at >= ?");
        }
        if query.until.is_some() {
            where_clauses.push("created_at <= ?");
        }

        let query_str = format!(
            r#"
            SELECT id, platform, content, media_ref, status, scheduled_at, posted_at,
                   failure_reason, likes, comments, shares, reach, created_at
            FROM posts
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ?
            "#,
            where_clauses.join(" AND ")
        );

        let mut q = sqlx::query(&query_str);

        // Bind parameters in the same order as WHERE clauses
        if let Some(platform) = query.platform {
            q = q.bind(platform.as_str());
        }
        if let Some(status) = query.status {
            q = q.bind(status.as_str());
        }
        if let Some(since) = query.since {
            q = q.bind(since);
        }
        if let Some(until) = query.until {
            q = q.bind(until);
        }
        q = q.bind(query.limit.unwrap_or(1000) as i64);

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        Ok(rows.into_iter().map(row_to_post).collect())
    }

    /// Posted posts for one platform, newest first. Used by timing analysis.
    pub async fn posted_posts_for_platform(&self, platform: Platform) -> Result<Vec<Post>> {
        self.list_posts(&PostQuery {
            platform: Some(platform),
            status: Some(PostStatus::Posted),
            ..Default::default()
        })
        .await
    }
}

fn row_to_post(row: sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        platform: Platform::parse(&row.get::<String, _>("platform"))
            .unwrap_or(Platform::Twitter),
        content: row.get("content"),
        media_ref: row.get("media_ref"),
        status: PostStatus::parse(&row.get::<String, _>("status")).unwrap_or(PostStatus::Draft),
        scheduled_at: row.get("scheduled_at"),
        posted_at: row.get("posted_at"),
        failure_reason: row.get("failure_reason"),
        engagement: Engagement {
            likes: row.get("likes"),
            comments: row.get("comments"),
            shares: row.get("shares"),
            reach: row.get("reach"),
        },
        created_at: row.get("created_at"),
    }
}
