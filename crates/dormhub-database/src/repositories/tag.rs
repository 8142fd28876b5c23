//! Tag repository.

use sqlx::{PgConnection, PgPool};

use dormhub_core::error::{AppError, ErrorKind};
use dormhub_core::result::AppResult;
use dormhub_core::types::{RegistrantId, TagId};
use dormhub_entity::tag::Tag;

use super::db_error;

/// Repository for tag rows.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: TagId) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find tag"))
    }

    /// All tags, unordered. Callers sort by tag number.
    pub async fn find_all(&self) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list tags"))
    }

    /// Unassigned tags, unordered.
    pub async fn find_unassigned(&self) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE is_assigned = FALSE")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list unassigned tags"))
    }

    /// Insert a tag inside a transaction.
    pub async fn insert(conn: &mut PgConnection, tag: &Tag) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (id, tag_number, is_assigned, created_at, updated_at) \
             VALUES ($1, $2, FALSE, $3, $4) RETURNING *",
        )
        .bind(tag.id)
        .bind(&tag.tag_number)
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            let err = db_error("Failed to insert tag")(e);
            if err.kind == ErrorKind::Validation {
                AppError::validation(format!("Tag number '{}' already exists", tag.tag_number))
            } else {
                err
            }
        })
    }

    /// Assign `id` to `holder` if it is still unassigned. Returns the
    /// assigned tag, or `None` when it was taken or is missing.
    pub async fn claim(
        conn: &mut PgConnection,
        id: TagId,
        holder: RegistrantId,
    ) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET is_assigned = TRUE, assigned_user_id = $2, \
             assigned_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND is_assigned = FALSE RETURNING *",
        )
        .bind(id)
        .bind(holder)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to claim tag"))
    }

    /// Return the assigned tag `tag_number` to the pool. Returns `None`
    /// when no such assigned tag exists.
    pub async fn release(
        conn: &mut PgConnection,
        tag_number: &str,
    ) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET is_assigned = FALSE, assigned_user_id = NULL, \
             assigned_at = NULL, updated_at = NOW() \
             WHERE tag_number = $1 AND is_assigned = TRUE RETURNING *",
        )
        .bind(tag_number)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to release tag"))
    }
}
