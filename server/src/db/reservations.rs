//! Database operations for the reservations table.

use chrono::NaiveDate;
use sqlx::PgPool;

use super::ReservationRow;

const SELECT_JOINED: &str = r#"
    SELECT r.id, r.user_id, r.user_email, r.tour_id, r.date, r.pax, r.status, r.created_at,
           t.title AS tour_title, t.image_path AS tour_image_path, t.duration AS tour_duration
    FROM reservations r
    LEFT JOIN tours t ON t.id = r.tour_id
"#;

/// A validated reservation ready for insertion.
#[derive(Debug, Clone)]
pub struct InsertReservation {
    pub user_id: String,
    pub user_email: Option<String>,
    pub tour_id: String,
    pub date: NaiveDate,
    pub pax: i32,
    pub status: String,
    pub comments: Option<String>,
}

/// The owner's reservations, newest first.
pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<ReservationRow>, sqlx::Error> {
    let sql = format!("{} WHERE r.user_id = $1 ORDER BY r.created_at DESC", SELECT_JOINED);
    sqlx::query_as::<_, ReservationRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Every reservation, earliest tour date first.
pub async fn list_all(pool: &PgPool) -> Result<Vec<ReservationRow>, sqlx::Error> {
    let sql = format!("{} ORDER BY r.date ASC, r.created_at ASC", SELECT_JOINED);
    sqlx::query_as::<_, ReservationRow>(&sql).fetch_all(pool).await
}

/// Get a reservation by id.
pub async fn get_reservation(pool: &PgPool, id: &str) -> Result<Option<ReservationRow>, sqlx::Error> {
    let sql = format!("{} WHERE r.id = $1", SELECT_JOINED);
    sqlx::query_as::<_, ReservationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert a batch in one transaction. Returns the new ids in input order.
pub async fn insert_many(
    pool: &PgPool,
    rows: &[InsertReservation],
) -> Result<Vec<String>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(rows.len());

    for row in rows {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO reservations (id, user_id, user_email, tour_id, date, pax, status, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&id)
        .bind(&row.user_id)
        .bind(&row.user_email)
        .bind(&row.tour_id)
        .bind(row.date)
        .bind(row.pax)
        .bind(&row.status)
        .bind(&row.comments)
        .execute(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;
    Ok(ids)
}

/// Set the status of a reservation owned by `user_id`. Returns rows affected.
pub async fn update_status_for_owner(
    pool: &PgPool,
    id: &str,
    user_id: &str,
    status: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE reservations SET status = $3 WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Set the status of any reservation. Returns rows affected.
pub async fn set_status(pool: &PgPool, id: &str, status: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE reservations SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
