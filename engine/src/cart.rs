//! Shopping cart persisted on the device.

use crate::{error::Result, storage::KeyValueStorage, Error, TourId};
use serde::{Deserialize, Serialize};

/// Storage key holding the cart line items.
pub const CART_KEY: &str = "mccoy_cart";

/// One tour booking waiting for checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub tour_id: TourId,
    /// Requested tour date (ISO calendar date)
    pub date: String,
    pub pax: u32,
    pub title: String,
    /// Price per participant in USD
    pub price: f64,
}

impl CartItem {
    pub fn new(
        tour_id: impl Into<TourId>,
        title: impl Into<String>,
        price: f64,
        date: impl Into<String>,
        pax: u32,
    ) -> Self {
        Self {
            tour_id: tour_id.into(),
            date: date.into(),
            pax,
            title: title.into(),
            price,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.pax)
    }

    fn validate(&self) -> Result<()> {
        if self.tour_id.trim().is_empty() {
            return Err(Error::InvalidCartItem("tour id is required".into()));
        }
        if self.date.trim().is_empty() {
            return Err(Error::InvalidCartItem("select a date to book".into()));
        }
        if self.pax == 0 {
            return Err(Error::InvalidCartItem("pax must be at least 1".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidCartItem(format!("invalid price {}", self.price)));
        }
        Ok(())
    }
}

/// The cart, loaded from and written back to a [`KeyValueStorage`].
#[derive(Debug)]
pub struct Cart<S> {
    storage: S,
    items: Vec<CartItem>,
}

impl<S: KeyValueStorage> Cart<S> {
    /// Load the persisted cart; a missing or malformed value yields an empty cart.
    pub fn load(storage: S) -> Self {
        let items = match storage.get_item(CART_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("discarding malformed cart: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("cart storage unreadable: {}", e);
                Vec::new()
            }
        };

        Self { storage, items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line item after validating it.
    pub fn add(&mut self, item: CartItem) -> Result<()> {
        item.validate()?;
        self.items.push(item);
        self.persist();
        Ok(())
    }

    /// Remove the line item at `index`.
    pub fn remove(&mut self, index: usize) -> Option<CartItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Sum of `price * pax` over all line items.
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    fn persist(&self) {
        match serde_json::to_string(&self.items) {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(CART_KEY, &json) {
                    tracing::warn!(items = self.items.len(), "cart write skipped: {}", e);
                }
            }
            Err(e) => tracing::warn!("failed to encode cart: {}", e),
        }
    }
}
