use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_web::{HttpResponse, Responder, delete, get, patch, post, put, web};

use crate::domain::types::MediaRef;
use crate::dto::products::{ApiResponse, ProductDto};
use crate::forms::products::{
    NewProductPayload, ProductForm, ProductListParams, UpdateProductPayload,
};
use crate::repository::DieselRepository;
use crate::routes::{bad_request, error_response};
use crate::services::media::MediaStorage;
use crate::services::products::{
    create_product as create_product_service, destroy_product as destroy_product_service,
    get_product as get_product_service, list_products as list_products_service,
    list_trash as list_trash_service, restore_product as restore_product_service,
    soft_delete_product as soft_delete_product_service,
    update_product as update_product_service,
};

/// Store an attached upload, if any, and return its media reference.
/// A client-side upload problem is reported through the error envelope.
fn resolve_upload(
    file: Option<TempFile>,
    media: &MediaStorage,
) -> Result<Option<MediaRef>, HttpResponse> {
    let Some(mut file) = file else {
        return Ok(None);
    };
    if file.size == 0 {
        return Ok(None);
    }

    match media.store_upload(&mut file) {
        Ok(media_ref) => Ok(Some(media_ref)),
        Err(err) if err.is_client_error() => Err(bad_request(err.to_string())),
        Err(err) => {
            log::error!("Failed to store uploaded media: {err}");
            Err(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Internal Server Error")))
        }
    }
}

#[post("/products")]
pub async fn create_product(
    MultipartForm(form): MultipartForm<ProductForm>,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
) -> impl Responder {
    let (fields, file) = form.into_parts();

    let uploaded = match resolve_upload(file, media.get_ref()) {
        Ok(uploaded) => uploaded,
        Err(response) => return response,
    };

    let mut payload = match NewProductPayload::try_from(fields) {
        Ok(payload) => payload,
        Err(err) => return bad_request(err.to_string()),
    };
    if uploaded.is_some() {
        payload.image = uploaded;
    }

    match create_product_service(payload, repo.get_ref()) {
        Ok(product) => HttpResponse::Created().json(ApiResponse::data(ProductDto::from(product))),
        Err(err) => error_response(&err),
    }
}

#[get("/products")]
pub async fn list_products(
    params: web::Query<ProductListParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match list_products_service(params.into_inner(), repo.get_ref()) {
        Ok((_total, products)) => HttpResponse::Ok().json(ApiResponse::listing(
            products.into_iter().map(ProductDto::from).collect::<Vec<_>>(),
        )),
        Err(err) => error_response(&err),
    }
}

#[get("/products/trash")]
pub async fn list_trash(
    params: web::Query<ProductListParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match list_trash_service(params.into_inner(), repo.get_ref()) {
        Ok((_total, products)) => HttpResponse::Ok().json(ApiResponse::listing(
            products.into_iter().map(ProductDto::from).collect::<Vec<_>>(),
        )),
        Err(err) => error_response(&err),
    }
}

#[get("/products/{id}")]
pub async fn get_product(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match get_product_service(id.into_inner(), repo.get_ref()) {
        Ok(product) => HttpResponse::Ok().json(ApiResponse::data(ProductDto::from(product))),
        Err(err) => error_response(&err),
    }
}

#[put("/products/{id}")]
pub async fn update_product(
    id: web::Path<i32>,
    MultipartForm(form): MultipartForm<ProductForm>,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
) -> impl Responder {
    let (fields, file) = form.into_parts();

    let uploaded = match resolve_upload(file, media.get_ref()) {
        Ok(uploaded) => uploaded,
        Err(response) => return response,
    };

    let mut payload = match UpdateProductPayload::try_from(fields) {
        Ok(payload) => payload,
        Err(err) => return bad_request(err.to_string()),
    };
    if uploaded.is_some() {
        payload.image = uploaded;
    }

    match update_product_service(id.into_inner(), payload, repo.get_ref()) {
        Ok(product) => HttpResponse::Ok().json(ApiResponse::data(ProductDto::from(product))),
        Err(err) => error_response(&err),
    }
}

#[patch("/products/{id}/delete")]
pub async fn soft_delete_product(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match soft_delete_product_service(id.into_inner(), repo.get_ref()) {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::<()>::message("Moved to trash")),
        Err(err) => error_response(&err),
    }
}

#[patch("/products/{id}/restore")]
pub async fn restore_product(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match restore_product_service(id.into_inner(), repo.get_ref()) {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::<()>::message("Restored successfully")),
        Err(err) => error_response(&err),
    }
}

#[delete("/products/{id}")]
pub async fn destroy_product(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match destroy_product_service(id.into_inner(), repo.get_ref()) {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::<()>::message("Deleted permanently")),
        Err(err) => error_response(&err),
    }
}
