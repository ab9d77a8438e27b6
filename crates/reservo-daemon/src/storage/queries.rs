//! Database queries for booking records.
//!
//! All queries return typed results; deciding whether a storage failure is
//! fatal or degrades to an empty view is the caller's policy.

use reservo_core::db::unix_timestamp_ms;

use super::db::{Database, DatabaseError};
use super::models::{Booking, NewBooking};

impl Database {
    /// Insert one booking, assigning `id` and `created_at` here, and return
    /// the persisted record including the assigned fields.
    pub async fn insert_booking(&self, input: &NewBooking) -> Result<Booking, DatabaseError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = unix_timestamp_ms();

        sqlx::query(
            r"
            INSERT INTO bookings (id, name, email, date, time, people, created_at, completion_time, booking_method, start_time)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.date)
        .bind(&input.time)
        .bind(input.people)
        .bind(now)
        .bind(input.completion_time)
        .bind(input.booking_method.map(|m| m.as_str()))
        .bind(input.start_time.as_deref())
        .execute(self.pool())
        .await?;

        self.get_booking(&id).await
    }

    /// Get a booking by ID.
    pub async fn get_booking(&self, id: &str) -> Result<Booking, DatabaseError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Booking {id}")))
    }

    /// List all bookings, newest first. `rowid` breaks ties between
    /// same-millisecond inserts so the ordering stays deterministic.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, DatabaseError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    /// Delete all bookings unconditionally (administrative/testing flows).
    /// Returns the number of deleted rows.
    pub async fn clear_bookings(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM bookings")
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// Highest rowid in the bookings table, 0 when empty. Change-feed
    /// cursor for the insert watcher.
    pub async fn max_booking_rowid(&self) -> Result<i64, DatabaseError> {
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(rowid) FROM bookings")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0.unwrap_or(0))
    }

    /// Bookings inserted after the given rowid, in insertion order.
    pub async fn bookings_after_rowid(&self, rowid: i64) -> Result<Vec<Booking>, DatabaseError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE rowid > ? ORDER BY rowid ASC",
        )
        .bind(rowid)
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::BookingMethod;

    fn sample_input(name: &str, email: &str) -> NewBooking {
        NewBooking {
            name: name.to_string(),
            email: email.to_string(),
            date: "2025-06-01".to_string(),
            time: "19:30".to_string(),
            people: 4,
            completion_time: None,
            booking_method: None,
            start_time: None,
        }
    }

    #[tokio::test]
    async fn insert_returns_server_assigned_fields() {
        let db = Database::open_in_memory().await.unwrap();

        let booking = db
            .insert_booking(&sample_input("John Doe", "a@b.com"))
            .await
            .unwrap();

        assert!(!booking.id.is_empty());
        assert!(booking.created_at > 0);
        assert_eq!(booking.name, "John Doe");
        assert_eq!(booking.email, "a@b.com");
        assert_eq!(booking.people, 4);
        assert!(booking.booking_method.is_none());
    }

    #[tokio::test]
    async fn insert_persists_optional_fields() {
        let db = Database::open_in_memory().await.unwrap();

        let mut input = sample_input("Jane", "j@d.com");
        input.completion_time = Some(42);
        input.booking_method = Some(BookingMethod::Ai);
        input.start_time = Some("2025-06-01T18:00:00Z".to_string());

        let booking = db.insert_booking(&input).await.unwrap();
        assert_eq!(booking.completion_time, Some(42));
        assert_eq!(booking.booking_method.as_deref(), Some("ai"));
        assert_eq!(booking.start_time.as_deref(), Some("2025-06-01T18:00:00Z"));
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let db = Database::open_in_memory().await.unwrap();

        let first = db.insert_booking(&sample_input("A", "a@a.com")).await.unwrap();
        let second = db.insert_booking(&sample_input("B", "b@b.com")).await.unwrap();
        let third = db.insert_booking(&sample_input("C", "c@c.com")).await.unwrap();

        let listed = db.list_bookings().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec![&third.id, &second.id, &first.id]);
    }

    #[tokio::test]
    async fn round_trip_matches_created_record() {
        let db = Database::open_in_memory().await.unwrap();

        let created = db.insert_booking(&sample_input("John", "j@b.com")).await.unwrap();
        let listed = db.list_bookings().await.unwrap();

        assert_eq!(listed.first(), Some(&created));
    }

    #[tokio::test]
    async fn people_below_one_is_rejected_by_schema() {
        let db = Database::open_in_memory().await.unwrap();

        let mut input = sample_input("Zero", "z@z.com");
        input.people = 0;

        assert!(db.insert_booking(&input).await.is_err());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_booking(&sample_input("A", "a@a.com")).await.unwrap();
        db.insert_booking(&sample_input("B", "b@b.com")).await.unwrap();

        assert_eq!(db.clear_bookings().await.unwrap(), 2);
        assert!(db.list_bookings().await.unwrap().is_empty());
        assert_eq!(db.clear_bookings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rowid_cursor_sees_only_new_rows() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_booking(&sample_input("A", "a@a.com")).await.unwrap();

        let cursor = db.max_booking_rowid().await.unwrap();
        let b = db.insert_booking(&sample_input("B", "b@b.com")).await.unwrap();
        let c = db.insert_booking(&sample_input("C", "c@c.com")).await.unwrap();

        let new_rows = db.bookings_after_rowid(cursor).await.unwrap();
        let ids: Vec<&str> = new_rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![&b.id, &c.id]);
    }

    #[tokio::test]
    async fn max_rowid_empty_table_is_zero() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(db.max_booking_rowid().await.unwrap(), 0);
    }
}
