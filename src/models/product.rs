use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::types::{
    CategoryName, ColorLabel, MediaRef, ProductDescription, ProductName, ProductPrice, SizeLabel,
    TypeConstraintError,
};

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: Option<String>,
    pub image: String,
    pub is_deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Assemble the domain entity from the row plus its child-table values.
    pub fn into_domain(
        self,
        sizes: Vec<String>,
        colors: Vec<String>,
    ) -> Result<DomainProduct, TypeConstraintError> {
        Ok(DomainProduct {
            id: self.id.try_into()?,
            name: ProductName::new(self.name)?,
            category: CategoryName::new(self.category)?,
            price: ProductPrice::new(self.price)?,
            description: self.description.map(ProductDescription::new).transpose()?,
            image: MediaRef::new(self.image)?,
            sizes: sizes
                .into_iter()
                .map(SizeLabel::new)
                .collect::<Result<Vec<_>, _>>()?,
            colors: colors
                .into_iter()
                .map(ColorLabel::new)
                .collect::<Result<Vec<_>, _>>()?,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable form of [`Product`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: Option<String>,
    pub image: String,
    pub is_deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DomainNewProduct> for NewProduct {
    fn from(product: DomainNewProduct) -> Self {
        Self {
            name: product.name.into_inner(),
            category: product.category.into_inner(),
            price: product.price.get(),
            description: product.description.map(ProductDescription::into_inner),
            image: product.image.into_inner(),
            is_deleted: false,
            deleted_at: None,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Row of the `product_sizes` child table.
#[derive(Debug, Clone, Insertable, Queryable)]
#[diesel(table_name = crate::schema::product_sizes)]
pub struct ProductSize {
    pub product_id: i32,
    pub size: String,
}

/// Row of the `product_colors` child table.
#[derive(Debug, Clone, Insertable, Queryable)]
#[diesel(table_name = crate::schema::product_colors)]
pub struct ProductColor {
    pub product_id: i32,
    pub color: String,
}
