//! Tours, profiles and contact requests.

use mccoy_engine::{ContactRequest, Profile};
use sqlx::PgPool;

use super::{ProfileRow, TourRow};

/// All tours ordered by title.
pub async fn list_tours(pool: &PgPool) -> Result<Vec<TourRow>, sqlx::Error> {
    sqlx::query_as::<_, TourRow>(
        r#"
        SELECT id, slug, title, type, duration, difficulty, price, image_path, description
        FROM tours
        ORDER BY title ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Ids of the given tours that exist.
pub async fn existing_tour_ids(pool: &PgPool, ids: &[String]) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM tours WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn get_profile(pool: &PgPool, user_id: &str) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT id, role FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Insert a profile. Returns false if one already existed.
pub async fn insert_profile(pool: &PgPool, profile: &Profile) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO profiles (id, role) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
    )
    .bind(&profile.id)
    .bind(profile.role.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn insert_contact_request(
    pool: &PgPool,
    request: &ContactRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO contact_requests (name, email, message) VALUES ($1, $2, $3)")
        .bind(request.name.trim())
        .bind(request.email.trim())
        .bind(&request.message)
        .execute(pool)
        .await?;
    Ok(())
}
