//! Room repository.

use sqlx::{PgConnection, PgPool};

use dormhub_core::error::{AppError, ErrorKind};
use dormhub_core::result::AppResult;
use dormhub_core::types::{Gender, RoomId};
use dormhub_entity::room::Room;

use super::db_error;

/// Repository for room rows.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    /// Create a new room repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a room by ID.
    pub async fn find_by_id(&self, id: RoomId) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find room"))
    }

    /// All rooms ordered by room number.
    pub async fn find_all(&self) -> AppResult<Vec<Room>> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY room_number")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list rooms"))
    }

    /// Rooms of `gender` with at least one free bed.
    pub async fn find_vacant(&self, gender: Gender) -> AppResult<Vec<Room>> {
        sqlx::query_as::<_, Room>(
            "SELECT * FROM rooms WHERE gender = $1 AND available_beds > 0 \
             ORDER BY (total_beds - available_beds) DESC, room_number ASC",
        )
        .bind(gender)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list vacant rooms"))
    }

    /// Insert a room inside a transaction.
    pub async fn insert(conn: &mut PgConnection, room: &Room) -> AppResult<Room> {
        sqlx::query_as::<_, Room>(
            "INSERT INTO rooms (id, wing, room_number, gender, total_beds, available_beds, \
             bed_numbers, is_vip_room, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(room.id)
        .bind(&room.wing)
        .bind(&room.room_number)
        .bind(room.gender)
        .bind(room.total_beds)
        .bind(room.available_beds)
        .bind(&room.bed_numbers)
        .bind(room.is_vip_room)
        .bind(room.created_at)
        .bind(room.updated_at)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            let err = db_error("Failed to insert room")(e);
            if err.kind == ErrorKind::Validation {
                AppError::validation(format!("Room number '{}' already exists", room.room_number))
            } else {
                err
            }
        })
    }

    /// Take one bed from `id` if any is free. Returns the room after the
    /// decrement, or `None` when the room is full or missing.
    ///
    /// The row lock taken by the `UPDATE` serializes concurrent claims;
    /// a waiting claim re-checks `available_beds` against the committed row.
    pub async fn claim_bed(conn: &mut PgConnection, id: RoomId) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>(
            "UPDATE rooms SET available_beds = available_beds - 1, \
             last_assigned = NOW(), updated_at = NOW() \
             WHERE id = $1 AND available_beds > 0 RETURNING *",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to claim bed"))
    }

    /// Return one bed to the room named `room_number`. Returns `None` when
    /// the room is missing or already has every bed free.
    pub async fn return_bed(conn: &mut PgConnection, room_number: &str) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>(
            "UPDATE rooms SET available_beds = available_beds + 1, updated_at = NOW() \
             WHERE room_number = $1 AND available_beds < total_beds RETURNING *",
        )
        .bind(room_number)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to return bed"))
    }
}
