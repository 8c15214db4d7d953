//! Row types read from the database and their engine counterparts.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use mccoy_engine::{Profile, ReservationRecord, Role, Tour, TourSummary};
use sqlx::Row;

/// Calendar date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A reservation row joined with its tour.
#[derive(Debug)]
pub struct ReservationRow {
    pub id: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub tour_id: String,
    pub date: NaiveDate,
    pub pax: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub tour_title: Option<String>,
    pub tour_image_path: Option<String>,
    pub tour_duration: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ReservationRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ReservationRow {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            user_email: row.try_get("user_email")?,
            tour_id: row.try_get("tour_id")?,
            date: row.try_get("date")?,
            pax: row.try_get("pax")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            tour_title: row.try_get("tour_title")?,
            tour_image_path: row.try_get("tour_image_path")?,
            tour_duration: row.try_get("tour_duration")?,
        })
    }
}

impl ReservationRow {
    /// Convert to the engine's record, as confirmed by the backend.
    pub fn to_record(&self) -> ReservationRecord {
        let tour = self.tour_title.as_ref().map(|title| TourSummary {
            id: self.tour_id.clone(),
            title: title.clone(),
            cover_image: self.tour_image_path.clone(),
            duration: self.tour_duration.clone(),
        });

        ReservationRecord {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            user_email: self.user_email.clone(),
            tour_id: self.tour_id.clone(),
            date: self.date.format(DATE_FORMAT).to_string(),
            pax: u32::try_from(self.pax).unwrap_or(0),
            status: self.status.clone().into(),
            created_at: Some(self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            local_only: false,
            tour,
        }
    }
}

/// A row of the `tours` table.
#[derive(Debug)]
pub struct TourRow {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub kind: Option<String>,
    pub duration: String,
    pub difficulty: String,
    pub price: f64,
    pub image_path: Option<String>,
    pub description: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for TourRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(TourRow {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            kind: row.try_get("type")?,
            duration: row.try_get("duration")?,
            difficulty: row.try_get("difficulty")?,
            price: row.try_get("price")?,
            image_path: row.try_get("image_path")?,
            description: row.try_get("description")?,
        })
    }
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            slug: row.slug,
            title: row.title,
            kind: row.kind,
            duration: row.duration,
            difficulty: row.difficulty,
            price: row.price,
            image_path: row.image_path,
            description: row.description,
        }
    }
}

/// A row of the `profiles` table.
#[derive(Debug)]
pub struct ProfileRow {
    pub id: String,
    pub role: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProfileRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProfileRow {
            id: row.try_get("id")?,
            role: row.try_get("role")?,
        })
    }
}

impl ProfileRow {
    /// Unknown roles read as customer.
    pub fn to_profile(&self) -> Profile {
        let role = match self.role.as_str() {
            "admin" => Role::Admin,
            "local" => Role::Local,
            _ => Role::Customer,
        };
        Profile {
            id: self.id.clone(),
            role,
        }
    }
}

/// Parse a calendar date as sent by clients.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
