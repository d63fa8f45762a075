use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::types::{CategoryName, ColorLabel, ProductId, SizeLabel};

pub mod errors;
pub mod product;
#[cfg(test)]
pub mod test;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Which soft-delete partition a listing targets. The two partitions are
/// mutually exclusive: no filter combination can cross them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Records with `is_deleted = false`.
    #[default]
    Active,
    /// Records with `is_deleted = true` (the trash view).
    Trashed,
}

/// Query parameters used when listing or searching products.
///
/// All filters are optional and combine with AND semantics; multi-value
/// fields match when the record's set intersects the given one.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Case-insensitive substring match over the product name.
    pub search: Option<String>,
    /// Restrict to products carrying at least one of these sizes.
    pub sizes: Vec<SizeLabel>,
    /// Restrict to products carrying at least one of these colors.
    pub colors: Vec<ColorLabel>,
    /// Restrict to products in any of these categories.
    pub categories: Vec<CategoryName>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Soft-delete partition the query runs against.
    pub visibility: Visibility,
}

/// A single typed predicate clause over product fields. Store adapters
/// translate a clause list into their own query syntax; clauses always
/// combine with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
    NameContains(String),
    SizeAny(Vec<SizeLabel>),
    ColorAny(Vec<ColorLabel>),
    CategoryAny(Vec<CategoryName>),
    PriceAtLeast(f64),
    PriceAtMost(f64),
}

impl ProductListQuery {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn trashed() -> Self {
        Self {
            visibility: Visibility::Trashed,
            ..Self::default()
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sizes(mut self, sizes: Vec<SizeLabel>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn colors(mut self, colors: Vec<ColorLabel>) -> Self {
        self.colors = colors;
        self
    }

    pub fn categories(mut self, categories: Vec<CategoryName>) -> Self {
        self.categories = categories;
        self
    }

    pub fn price_between(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    /// Render the optional filters as an explicit clause list.
    ///
    /// Empty or absent inputs contribute no clause at all, so an empty query
    /// matches every record in its partition.
    pub fn clauses(&self) -> Vec<ProductFilter> {
        let mut clauses = Vec::new();
        if let Some(search) = &self.search {
            let needle = search.trim();
            if !needle.is_empty() {
                clauses.push(ProductFilter::NameContains(needle.to_string()));
            }
        }
        if !self.sizes.is_empty() {
            clauses.push(ProductFilter::SizeAny(self.sizes.clone()));
        }
        if !self.colors.is_empty() {
            clauses.push(ProductFilter::ColorAny(self.colors.clone()));
        }
        if !self.categories.is_empty() {
            clauses.push(ProductFilter::CategoryAny(self.categories.clone()));
        }
        if let Some(min_price) = self.min_price {
            clauses.push(ProductFilter::PriceAtLeast(min_price));
        }
        if let Some(max_price) = self.max_price {
            clauses.push(ProductFilter::PriceAtMost(max_price));
        }
        clauses
    }
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// List products matching the supplied query parameters, newest first
    /// (`created_at` for the active partition, `deleted_at` for the trash).
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Retrieve a product by its identifier regardless of partition.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Persist a new product and return the stored record.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Apply a partial update to an active product. Returns `None` when the
    /// id does not resolve to an active record.
    fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<Option<Product>>;
    /// Move a product to the trash. Returns the number of affected rows.
    fn soft_delete_product(
        &self,
        id: ProductId,
        deleted_at: NaiveDateTime,
    ) -> RepositoryResult<usize>;
    /// Bring a product back from the trash. Returns the number of affected rows.
    fn restore_product(&self, id: ProductId, restored_at: NaiveDateTime)
    -> RepositoryResult<usize>;
    /// Physically remove a product from either partition.
    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_produces_no_clauses() {
        assert!(ProductListQuery::active().clauses().is_empty());
        assert!(ProductListQuery::trashed().clauses().is_empty());
    }

    #[test]
    fn blank_search_is_dropped() {
        let query = ProductListQuery::active().search("   ");
        assert!(query.clauses().is_empty());
    }

    #[test]
    fn clauses_cover_every_provided_filter() {
        let query = ProductListQuery::active()
            .search("red")
            .sizes(vec![SizeLabel::new("m").unwrap()])
            .price_between(Some(100.0), Some(500.0));

        let clauses = query.clauses();
        assert_eq!(clauses.len(), 4);
        assert_eq!(clauses[0], ProductFilter::NameContains("red".to_string()));
        assert_eq!(clauses[2], ProductFilter::PriceAtLeast(100.0));
        assert_eq!(clauses[3], ProductFilter::PriceAtMost(500.0));
    }

    #[test]
    fn price_bounds_are_independently_optional() {
        let query = ProductListQuery::active().price_between(None, Some(500.0));
        assert_eq!(
            query.clauses(),
            vec![ProductFilter::PriceAtMost(500.0)]
        );
    }
}
