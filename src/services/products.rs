use chrono::Utc;

use crate::domain::product::Product;
use crate::domain::types::ProductId;
use crate::forms::products::{NewProductPayload, ProductListParams, UpdateProductPayload};
use crate::repository::{ProductReader, ProductWriter, Visibility};

use super::{ServiceError, ServiceResult};

/// Create a product from a validated payload.
///
/// The image reference must already be resolved (pre-supplied URL or stored
/// upload); its presence is re-checked here because the form layer does not
/// cover it.
pub fn create_product<R>(mut payload: NewProductPayload, repo: &R) -> ServiceResult<Product>
where
    R: ProductWriter,
{
    let Some(image) = payload.image.take() else {
        return Err(ServiceError::Validation("Image is required".to_string()));
    };

    let new_product = payload.into_new_product(image);
    match repo.create_product(&new_product) {
        Ok(product) => Ok(product),
        Err(e) => {
            log::error!("Failed to create product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// List active products matching the given filters, newest first.
pub fn list_products<R>(
    params: ProductListParams,
    repo: &R,
) -> ServiceResult<(usize, Vec<Product>)>
where
    R: ProductReader,
{
    let query = params.into_query(Visibility::Active)?;
    match repo.list_products(query) {
        Ok(result) => Ok(result),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// List trashed products matching the given filters, most recently
/// trashed first.
pub fn list_trash<R>(params: ProductListParams, repo: &R) -> ServiceResult<(usize, Vec<Product>)>
where
    R: ProductReader,
{
    let query = params.into_query(Visibility::Trashed)?;
    match repo.list_products(query) {
        Ok(result) => Ok(result),
        Err(e) => {
            log::error!("Failed to list trashed products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Fetch a single active product. Trashed records are only reachable
/// through the trash listing, so a soft-deleted id reports not-found.
pub fn get_product<R>(id: i32, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_by_id(id) {
        Ok(Some(product)) if product.is_active() => Ok(product),
        Ok(_) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Apply a partial update to an active product. Trashed records must be
/// restored before they can be edited.
pub fn update_product<R>(
    id: i32,
    payload: UpdateProductPayload,
    repo: &R,
) -> ServiceResult<Product>
where
    R: ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;
    let update = payload.into_update();

    match repo.update_product(id, &update, Utc::now().naive_utc()) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to update product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Move a product to the trash. Re-trashing an already-trashed record
/// succeeds; only a missing id reports not-found.
pub fn soft_delete_product<R>(id: i32, repo: &R) -> ServiceResult<()>
where
    R: ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;

    match repo.soft_delete_product(id, Utc::now().naive_utc()) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to soft-delete product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Bring a product back from the trash.
pub fn restore_product<R>(id: i32, repo: &R) -> ServiceResult<()>
where
    R: ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;

    match repo.restore_product(id, Utc::now().naive_utc()) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to restore product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Permanently remove a product from either partition. Terminal: the id
/// stops resolving for every other operation.
pub fn destroy_product<R>(id: i32, repo: &R) -> ServiceResult<()>
where
    R: ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;

    match repo.delete_product(id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to permanently delete product: {e}");
            Err(ServiceError::Internal)
        }
    }
}
