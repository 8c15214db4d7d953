//! Profile handlers.

use mccoy_engine::{ensure_profile, Profile, ProfileBackend};

use crate::auth::AuthUser;
use crate::db::PgBackend;
use crate::error::Result;

/// The caller's profile, if one exists.
pub async fn handle_get_profile(backend: &PgBackend, user: &AuthUser) -> Result<Option<Profile>> {
    Ok(backend.fetch_profile(&user.user_id).await?)
}

/// Create a customer profile for the caller unless one exists.
pub async fn handle_ensure_profile(backend: &PgBackend, user: &AuthUser) -> Result<Profile> {
    let profile = ensure_profile(backend, &user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, role = %profile.role, "Profile ensured");
    Ok(profile)
}
