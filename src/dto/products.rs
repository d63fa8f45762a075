use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::product::Product;

/// Response envelope shared by every endpoint:
/// `{ success, data?, message?, results? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            results: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            results: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            results: None,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Listing envelope carrying the result count.
    pub fn listing(items: Vec<T>) -> Self {
        let results = items.len();
        Self {
            success: true,
            data: Some(items),
            message: None,
            results: Some(results),
        }
    }
}

/// Wire representation of a [`Product`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub desc: Option<String>,
    pub image: String,
    pub size: Vec<String>,
    pub color: Vec<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            price: value.price.get(),
            category: value.category.into_inner(),
            desc: value.description.map(Into::into),
            image: value.image.into_inner(),
            size: value.sizes.into_iter().map(Into::into).collect(),
            color: value.colors.into_iter().map(Into::into).collect(),
            is_deleted: value.is_deleted,
            deleted_at: value.deleted_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
