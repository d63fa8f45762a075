//! Error conversion glue between the form, domain and service layers.
//!
//! Repository errors are deliberately not converted automatically: service
//! functions match on them so the underlying failure gets logged before it
//! is reported as `Internal`.

use crate::domain::types::TypeConstraintError;
use crate::forms::products::ProductFormError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<ProductFormError> for ServiceError {
    fn from(val: ProductFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}
