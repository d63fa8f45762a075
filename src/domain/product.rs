use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryName, ColorLabel, MediaRef, ProductDescription, ProductId, ProductName, ProductPrice,
    SizeLabel,
};

/// A product record managed by the admin panel.
///
/// `is_deleted`/`deleted_at` track the soft-delete state: an active record
/// has `deleted_at` absent, a trashed one carries the trashing timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub category: CategoryName,
    pub price: ProductPrice,
    pub description: Option<ProductDescription>,
    pub image: MediaRef,
    pub sizes: Vec<SizeLabel>,
    pub colors: Vec<ColorLabel>,
    pub is_deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Information required to create a new [`Product`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewProduct {
    pub name: ProductName,
    pub category: CategoryName,
    pub price: ProductPrice,
    pub description: Option<ProductDescription>,
    pub image: MediaRef,
    pub sizes: Vec<SizeLabel>,
    pub colors: Vec<ColorLabel>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update applied to an active [`Product`].
///
/// An outer `None` leaves the field untouched. `description` distinguishes
/// "unchanged" (`None`) from "cleared" (`Some(None)`). Provided `sizes` or
/// `colors` replace the whole set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<ProductName>,
    pub category: Option<CategoryName>,
    pub price: Option<ProductPrice>,
    pub description: Option<Option<ProductDescription>>,
    pub image: Option<MediaRef>,
    pub sizes: Option<Vec<SizeLabel>>,
    pub colors: Option<Vec<ColorLabel>>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this update into `product`, stamping `updated_at`.
    pub fn apply(&self, product: &mut Product, updated_at: NaiveDateTime) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
        if let Some(sizes) = &self.sizes {
            product.sizes = sizes.clone();
        }
        if let Some(colors) = &self.colors {
            product.colors = colors.clone();
        }
        product.updated_at = updated_at;
    }
}
