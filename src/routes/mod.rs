use actix_web::HttpResponse;

use crate::dto::products::ApiResponse;
use crate::services::ServiceError;

pub mod main;
pub mod products;

/// Render a service failure as the standard error envelope.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::Validation(message) => {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(message.clone()))
        }
        ServiceError::NotFound => HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("No product found with that ID")),
        ServiceError::Internal => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error("Internal Server Error")),
    }
}

pub fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()>::error(message))
}
