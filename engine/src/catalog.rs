//! Tour catalog and contact form.

use crate::{
    backend::{CatalogBackend, ContactRequest, Tour},
    config::CatalogConfig,
    error::Result,
    Error,
};

/// Shown when a tour has no usable image.
pub const FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1469474968028-56623f02e42e?auto=format&fit=crop&w=900&q=60";

/// Tours to display and whether they came from the seeded fallback set
/// because the backend failed.
#[derive(Debug, Clone, PartialEq)]
pub struct TourListing {
    pub tours: Vec<Tour>,
    pub degraded: bool,
}

/// The seeded catalog used when the backend has nothing to offer.
pub fn fallback_tours() -> Vec<Tour> {
    vec![
        Tour {
            id: "rafting-extremo".into(),
            slug: Some("rafting-extremo".into()),
            title: "Rafting Extremo".into(),
            kind: Some("rafting".into()),
            duration: "1 día".into(),
            difficulty: "Alto".into(),
            price: 55.0,
            image_path: Some(FALLBACK_IMAGE.into()),
            description: Some("Atraviesa los rápidos de La Ceiba con guías certificados.".into()),
        },
        Tour {
            id: "canopy-sendero".into(),
            slug: Some("canopy-sendero".into()),
            title: "Canopy & Sendero".into(),
            kind: Some("canopy".into()),
            duration: "1 día".into(),
            difficulty: "Moderado".into(),
            price: 40.0,
            image_path: Some(
                "https://images.unsplash.com/photo-1470246973918-29a93221c455?auto=format&fit=crop&w=900&q=60"
                    .into(),
            ),
            description: Some(
                "Tirolinas entre ceibas centenarias y caminatas interpretativas.".into(),
            ),
        },
        Tour {
            id: "tour-ecologico".into(),
            slug: Some("tour-ecologico".into()),
            title: "Tour Ecológico".into(),
            kind: Some("ecotour".into()),
            duration: "Medio día".into(),
            difficulty: "Bajo".into(),
            price: 30.0,
            image_path: Some(
                "https://images.unsplash.com/photo-1500530855697-b586d89ba3ee?auto=format&fit=crop&w=900&q=60"
                    .into(),
            ),
            description: Some("Recorre manglares, aviarios y liberación de tortugas.".into()),
        },
    ]
}

/// Load tours from the backend, falling back to [`fallback_tours`].
pub async fn load_tours<B>(backend: &B) -> TourListing
where
    B: CatalogBackend + ?Sized,
{
    match backend.list_tours().await {
        Ok(tours) if !tours.is_empty() => TourListing {
            tours,
            degraded: false,
        },
        Ok(_) => TourListing {
            tours: fallback_tours(),
            degraded: false,
        },
        Err(e) => {
            tracing::warn!("falling back to seeded tours: {}", e);
            TourListing {
                tours: fallback_tours(),
                degraded: true,
            }
        }
    }
}

/// Turn a tour's `image_path` into a displayable URL.
pub fn resolve_image(path: Option<&str>, config: &CatalogConfig) -> String {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return FALLBACK_IMAGE.to_string();
    };

    let lower = path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return path.to_string();
    }

    let Some(base) = config.public_base() else {
        return FALLBACK_IMAGE.to_string();
    };

    let path = path.trim_start_matches('/');
    match config.bucket_segment() {
        Some(bucket) => format!("{}/{}/{}", base, bucket, path),
        None => format!("{}/{}", base, path),
    }
}

/// Validate and submit a contact form message.
pub async fn submit_contact<B>(backend: &B, request: &ContactRequest) -> Result<()>
where
    B: CatalogBackend + ?Sized,
{
    if request.name.trim().is_empty() {
        return Err(Error::InvalidContact("name is required".into()));
    }
    if request.message.trim().is_empty() {
        return Err(Error::InvalidContact("message is required".into()));
    }
    let email = request.email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => {}
        _ => return Err(Error::InvalidContact(format!("invalid email '{}'", email))),
    }

    backend.submit_contact(request).await?;
    tracing::info!(email, "contact request submitted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn tour(id: &str, title: &str) -> Tour {
        Tour {
            id: id.into(),
            slug: None,
            title: title.into(),
            kind: None,
            duration: "2 h".into(),
            difficulty: "Bajo".into(),
            price: 10.0,
            image_path: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn backend_tours_sorted_by_title() {
        let backend = InMemoryBackend::with_tours(vec![tour("b", "Zipline"), tour("a", "Buceo")]);
        let listing = load_tours(&backend).await;

        assert!(!listing.degraded);
        let titles: Vec<_> = listing.tours.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Buceo", "Zipline"]);
    }

    #[tokio::test]
    async fn empty_catalog_uses_fallback() {
        let listing = load_tours(&InMemoryBackend::new()).await;
        assert!(!listing.degraded);
        assert_eq!(listing.tours, fallback_tours());
    }

    #[tokio::test]
    async fn failure_uses_fallback_and_flags_it() {
        let backend = InMemoryBackend::with_tours(vec![tour("a", "Buceo")]);
        backend.set_offline(true);

        let listing = load_tours(&backend).await;
        assert!(listing.degraded);
        assert_eq!(listing.tours.len(), 3);
    }

    #[test]
    fn resolve_image_variants() {
        let config = CatalogConfig::new("https://proj.example.co/", "tours");

        assert_eq!(resolve_image(None, &config), FALLBACK_IMAGE);
        assert_eq!(resolve_image(Some(""), &config), FALLBACK_IMAGE);
        assert_eq!(
            resolve_image(Some("HTTPS://cdn.example/x.jpg"), &config),
            "HTTPS://cdn.example/x.jpg"
        );
        assert_eq!(
            resolve_image(Some("/rafting/cover.jpg"), &config),
            "https://proj.example.co/storage/v1/object/public/tours/rafting/cover.jpg"
        );
        assert_eq!(
            resolve_image(Some("cover.jpg"), &CatalogConfig::default()),
            FALLBACK_IMAGE
        );

        let no_bucket = CatalogConfig {
            storage_url: Some("https://proj.example.co".into()),
            bucket: None,
        };
        assert_eq!(
            resolve_image(Some("cover.jpg"), &no_bucket),
            "https://proj.example.co/storage/v1/object/public/cover.jpg"
        );
    }

    #[tokio::test]
    async fn contact_is_validated_before_submit() {
        let backend = InMemoryBackend::new();
        let bad = ContactRequest {
            name: "Ana".into(),
            email: "not-an-email".into(),
            message: "Hola".into(),
        };
        assert!(matches!(
            submit_contact(&backend, &bad).await,
            Err(Error::InvalidContact(_))
        ));

        let blank = ContactRequest {
            name: " ".into(),
            ..bad.clone()
        };
        assert!(submit_contact(&backend, &blank).await.is_err());
        assert!(backend.contact_requests().is_empty());

        let good = ContactRequest {
            email: "ana@example.com".into(),
            ..bad
        };
        submit_contact(&backend, &good).await.unwrap();
        assert_eq!(backend.contact_requests(), vec![good]);
    }
}
