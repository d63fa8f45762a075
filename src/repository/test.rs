use std::cell::{Cell, RefCell};

use chrono::NaiveDateTime;

use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::types::ProductId;
use crate::repository::{
    ProductFilter, ProductListQuery, ProductReader, ProductWriter, RepositoryResult, Visibility,
};

/// Simple in-memory repository used for unit tests.
pub struct TestRepository {
    products: RefCell<Vec<Product>>,
    next_id: Cell<i32>,
}

impl Default for TestRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TestRepository {
    pub fn new(products: Vec<Product>) -> Self {
        let next_id = products.iter().map(|p| p.id.get()).max().unwrap_or(0) + 1;
        Self {
            products: RefCell::new(products),
            next_id: Cell::new(next_id),
        }
    }
}

fn clause_matches(clause: &ProductFilter, product: &Product) -> bool {
    match clause {
        ProductFilter::NameContains(needle) => product
            .name
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        ProductFilter::SizeAny(sizes) => product.sizes.iter().any(|size| sizes.contains(size)),
        ProductFilter::ColorAny(colors) => {
            product.colors.iter().any(|color| colors.contains(color))
        }
        ProductFilter::CategoryAny(categories) => categories.contains(&product.category),
        ProductFilter::PriceAtLeast(min_price) => product.price.get() >= *min_price,
        ProductFilter::PriceAtMost(max_price) => product.price.get() <= *max_price,
    }
}

impl ProductReader for TestRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        let mut items = self
            .products
            .borrow()
            .iter()
            .filter(|product| match query.visibility {
                Visibility::Active => !product.is_deleted,
                Visibility::Trashed => product.is_deleted,
            })
            .cloned()
            .collect::<Vec<_>>();

        for clause in query.clauses() {
            items.retain(|product| clause_matches(&clause, product));
        }

        match query.visibility {
            Visibility::Active => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Visibility::Trashed => items.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at)),
        }

        let total = items.len();
        Ok((total, items))
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self
            .products
            .borrow()
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }
}

impl ProductWriter for TestRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let created = Product {
            id: ProductId::new(id).expect("test ids start at 1"),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: product.created_at,
            updated_at: product.updated_at,
        };

        self.products.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<Option<Product>> {
        let mut products = self.products.borrow_mut();
        let Some(product) = products
            .iter_mut()
            .find(|product| product.id == id && !product.is_deleted)
        else {
            return Ok(None);
        };

        update.apply(product, updated_at);
        Ok(Some(product.clone()))
    }

    fn soft_delete_product(
        &self,
        id: ProductId,
        deleted_at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let mut products = self.products.borrow_mut();
        let Some(product) = products.iter_mut().find(|product| product.id == id) else {
            return Ok(0);
        };

        product.is_deleted = true;
        product.deleted_at = Some(deleted_at);
        product.updated_at = deleted_at;
        Ok(1)
    }

    fn restore_product(
        &self,
        id: ProductId,
        restored_at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let mut products = self.products.borrow_mut();
        let Some(product) = products.iter_mut().find(|product| product.id == id) else {
            return Ok(0);
        };

        product.is_deleted = false;
        product.deleted_at = None;
        product.updated_at = restored_at;
        Ok(1)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        let mut products = self.products.borrow_mut();
        let before = products.len();
        products.retain(|product| product.id != id);
        Ok(before - products.len())
    }
}
