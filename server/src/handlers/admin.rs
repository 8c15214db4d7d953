//! Admin reservation handlers.

use mccoy_engine::{admin, ReservationRecord, ReservationStatus};
use sqlx::PgPool;

use crate::auth::AdminUser;
use crate::db::PgBackend;
use crate::error::{AppError, Result};
use crate::websocket::ConnectionManager;

use super::{publish_change, StatusChanged, StatusUpdate};

/// Every reservation, earliest tour date first.
pub async fn handle_admin_list(
    backend: &PgBackend,
    admin: &AdminUser,
) -> Result<Vec<ReservationRecord>> {
    Ok(admin::list_reservations(&admin.capability, backend).await?)
}

/// Move a reservation to one of the known statuses.
pub async fn handle_admin_status(
    pool: &PgPool,
    conn_manager: &ConnectionManager,
    admin: &AdminUser,
    id: &str,
    update: StatusUpdate,
) -> Result<StatusChanged> {
    if !ReservationStatus::KNOWN.contains(&update.status) {
        return Err(AppError::BadRequest(format!(
            "Unknown status '{}'",
            update.status
        )));
    }

    let backend = PgBackend::new(pool.clone());
    admin::update_status(&admin.capability, &backend, &mut [], id, update.status.clone()).await?;

    Ok(StatusChanged {
        id: id.to_string(),
        reservation: publish_change(pool, conn_manager, id).await,
        status: update.status,
    })
}
