//! Registrant repository.

use sqlx::{PgConnection, PgPool};

use dormhub_core::result::AppResult;
use dormhub_core::types::{Gender, RegistrantId};
use dormhub_entity::registrant::{AssignmentStatus, Registrant};

use super::db_error;

/// Repository for registrant rows.
#[derive(Debug, Clone)]
pub struct RegistrantRepository {
    pool: PgPool,
}

impl RegistrantRepository {
    /// Create a new registrant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a registrant by ID.
    pub async fn find_by_id(&self, id: RegistrantId) -> AppResult<Option<Registrant>> {
        sqlx::query_as::<_, Registrant>("SELECT * FROM registrants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find registrant"))
    }

    /// All registrants, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<Registrant>> {
        sqlx::query_as::<_, Registrant>("SELECT * FROM registrants ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list registrants"))
    }

    /// Registrants of `gender` waiting for a room, oldest first.
    pub async fn find_room_pending(&self, gender: Gender) -> AppResult<Vec<Registrant>> {
        sqlx::query_as::<_, Registrant>(
            "SELECT * FROM registrants WHERE gender = $1 AND room_status = $2 \
             ORDER BY created_at, id",
        )
        .bind(gender)
        .bind(AssignmentStatus::Pending)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list room-pending registrants"))
    }

    /// Registrants waiting for a tag, oldest first.
    pub async fn find_tag_pending(&self) -> AppResult<Vec<Registrant>> {
        sqlx::query_as::<_, Registrant>(
            "SELECT * FROM registrants WHERE tag_status = $1 ORDER BY created_at, id",
        )
        .bind(AssignmentStatus::Pending)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list tag-pending registrants"))
    }

    /// Lock a registrant row for the rest of the transaction.
    pub async fn lock(conn: &mut PgConnection, id: RegistrantId) -> AppResult<Option<Registrant>> {
        sqlx::query_as::<_, Registrant>("SELECT * FROM registrants WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to lock registrant"))
    }

    /// Insert a registrant inside a transaction.
    pub async fn insert(conn: &mut PgConnection, r: &Registrant) -> AppResult<Registrant> {
        sqlx::query_as::<_, Registrant>(
            "INSERT INTO registrants (id, full_name, date_of_birth, gender, phone, email, locale, \
             wing, room_number, bed_number, room_status, tag_number, tag_status, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING *",
        )
        .bind(r.id)
        .bind(&r.full_name)
        .bind(r.date_of_birth)
        .bind(r.gender)
        .bind(&r.phone)
        .bind(&r.email)
        .bind(&r.locale)
        .bind(&r.wing)
        .bind(&r.room_number)
        .bind(&r.bed_number)
        .bind(r.room_status)
        .bind(&r.tag_number)
        .bind(r.tag_status)
        .bind(r.created_at)
        .bind(r.updated_at)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to insert registrant"))
    }

    /// Record a bed assignment.
    pub async fn set_room(
        conn: &mut PgConnection,
        id: RegistrantId,
        wing: &str,
        room_number: &str,
        bed_number: &str,
    ) -> AppResult<Registrant> {
        sqlx::query_as::<_, Registrant>(
            "UPDATE registrants SET wing = $2, room_number = $3, bed_number = $4, \
             room_status = $5, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(wing)
        .bind(room_number)
        .bind(bed_number)
        .bind(AssignmentStatus::Assigned)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to record room assignment"))
    }

    /// Record a tag assignment.
    pub async fn set_tag(
        conn: &mut PgConnection,
        id: RegistrantId,
        tag_number: &str,
    ) -> AppResult<Registrant> {
        sqlx::query_as::<_, Registrant>(
            "UPDATE registrants SET tag_number = $2, tag_status = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(tag_number)
        .bind(AssignmentStatus::Assigned)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to record tag assignment"))
    }

    /// Persist identity fields of `r`. Assignment columns are untouched.
    pub async fn update_identity(
        conn: &mut PgConnection,
        r: &Registrant,
    ) -> AppResult<Registrant> {
        sqlx::query_as::<_, Registrant>(
            "UPDATE registrants SET full_name = $2, date_of_birth = $3, phone = $4, \
             email = $5, locale = $6, updated_at = $7 WHERE id = $1 RETURNING *",
        )
        .bind(r.id)
        .bind(&r.full_name)
        .bind(r.date_of_birth)
        .bind(&r.phone)
        .bind(&r.email)
        .bind(&r.locale)
        .bind(r.updated_at)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to update registrant"))
    }

    /// Delete a registrant inside a transaction.
    pub async fn delete(conn: &mut PgConnection, id: RegistrantId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM registrants WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(db_error("Failed to delete registrant"))?;
        Ok(result.rows_affected() > 0)
    }
}
