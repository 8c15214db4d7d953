//! Tour catalog and contact form handlers.

use mccoy_engine::{submit_contact, CatalogBackend, ContactRequest, Tour};

use crate::db::PgBackend;
use crate::error::Result;

pub async fn handle_list_tours(backend: &PgBackend) -> Result<Vec<Tour>> {
    Ok(backend.list_tours().await?)
}

/// Validate and store a contact form submission.
pub async fn handle_contact(backend: &PgBackend, request: ContactRequest) -> Result<()> {
    submit_contact(backend, &request).await?;
    tracing::info!("Contact request stored");
    Ok(())
}
