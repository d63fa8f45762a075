use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{NewProduct, ProductUpdate};
use crate::domain::types::{
    CategoryName, ColorLabel, MediaRef, ProductDescription, ProductName, ProductPrice, SizeLabel,
    TypeConstraintError,
};
use crate::repository::{ProductListQuery, Visibility};

/// Multipart body accepted by the create and update endpoints.
///
/// `image` carries a pre-supplied media reference; `file` an actual upload.
/// Repeated `size`/`color` parts accumulate into the vectors.
#[derive(MultipartForm)]
pub struct ProductForm {
    pub name: Option<Text<String>>,
    pub price: Option<Text<String>>,
    pub category: Option<Text<String>>,
    pub desc: Option<Text<String>>,
    pub size: Vec<Text<String>>,
    pub color: Vec<Text<String>>,
    pub image: Option<Text<String>>,
    #[multipart(limit = "50MB")]
    pub file: Option<TempFile>,
}

/// The text fields of [`ProductForm`], detached from the upload so the two
/// can be processed independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFormFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub desc: Option<String>,
    pub size: Vec<String>,
    pub color: Vec<String>,
    pub image: Option<String>,
}

impl ProductForm {
    pub fn into_parts(self) -> (ProductFormFields, Option<TempFile>) {
        let fields = ProductFormFields {
            name: self.name.map(Text::into_inner),
            price: self.price.map(Text::into_inner),
            category: self.category.map(Text::into_inner),
            desc: self.desc.map(Text::into_inner),
            size: self.size.into_iter().map(Text::into_inner).collect(),
            color: self.color.into_iter().map(Text::into_inner).collect(),
            image: self.image.map(Text::into_inner),
        };
        (fields, self.file)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProductFormError {
    #[error("Product form validation failed: {0}")]
    Validation(String),
    #[error("Product form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

#[derive(Debug, Validate)]
struct NewProductData {
    #[validate(length(min = 3, max = 100))]
    name: String,
    #[validate(range(min = 0.0))]
    price: f64,
    #[validate(length(min = 1))]
    category: String,
    #[validate(length(max = 1000))]
    desc: Option<String>,
}

/// Validated data for creating a product. `image` stays optional here: the
/// route may still substitute an uploaded media reference, and the service
/// re-checks presence before persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductPayload {
    pub name: ProductName,
    pub category: CategoryName,
    pub price: ProductPrice,
    pub description: Option<ProductDescription>,
    pub image: Option<MediaRef>,
    pub sizes: Vec<SizeLabel>,
    pub colors: Vec<ColorLabel>,
}

impl NewProductPayload {
    pub fn into_new_product(self, image: MediaRef) -> NewProduct {
        let now = Utc::now().naive_utc();
        NewProduct {
            name: self.name,
            category: self.category,
            price: self.price,
            description: self.description,
            image,
            sizes: self.sizes,
            colors: self.colors,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<ProductFormFields> for NewProductPayload {
    type Error = ProductFormError;

    fn try_from(value: ProductFormFields) -> Result<Self, Self::Error> {
        let name = value.name.ok_or(ProductFormError::MissingField("name"))?;
        let price_raw = value.price.ok_or(ProductFormError::MissingField("price"))?;
        let category = value
            .category
            .ok_or(ProductFormError::MissingField("category"))?;
        // The desc field must be present on create, but may be blank; a
        // blank value is stored as no description.
        let desc = value.desc.ok_or(ProductFormError::MissingField("desc"))?;

        let price = parse_number(&price_raw, "price")?;
        let desc = {
            let trimmed = desc.trim().to_string();
            if trimmed.is_empty() { None } else { Some(trimmed) }
        };

        let data = NewProductData {
            name: name.trim().to_string(),
            price,
            category: category.trim().to_string(),
            desc: desc.clone(),
        };
        data.validate()?;

        Ok(Self {
            name: ProductName::new(name)?,
            category: CategoryName::new(category)?,
            price: ProductPrice::new(price)?,
            description: desc.map(ProductDescription::new).transpose()?,
            image: non_empty(value.image).map(MediaRef::new).transpose()?,
            sizes: size_labels(value.size)?,
            colors: color_labels(value.color)?,
        })
    }
}

/// Validated partial update. Absent fields leave the record untouched;
/// `description` set to `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProductPayload {
    pub name: Option<ProductName>,
    pub category: Option<CategoryName>,
    pub price: Option<ProductPrice>,
    pub description: Option<Option<ProductDescription>>,
    pub image: Option<MediaRef>,
    pub sizes: Option<Vec<SizeLabel>>,
    pub colors: Option<Vec<ColorLabel>>,
}

impl UpdateProductPayload {
    pub fn into_update(self) -> ProductUpdate {
        ProductUpdate {
            name: self.name,
            category: self.category,
            price: self.price,
            description: self.description,
            image: self.image,
            sizes: self.sizes,
            colors: self.colors,
        }
    }
}

impl TryFrom<ProductFormFields> for UpdateProductPayload {
    type Error = ProductFormError;

    fn try_from(value: ProductFormFields) -> Result<Self, Self::Error> {
        let price = match non_empty(value.price) {
            Some(raw) => Some(ProductPrice::new(parse_number(&raw, "price")?)?),
            None => None,
        };
        let description = value
            .desc
            .map(|desc| {
                let trimmed = desc.trim().to_string();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    ProductDescription::new(trimmed).map(Some)
                }
            })
            .transpose()?;

        Ok(Self {
            name: non_empty(value.name).map(ProductName::new).transpose()?,
            category: non_empty(value.category)
                .map(CategoryName::new)
                .transpose()?,
            price,
            description,
            image: non_empty(value.image).map(MediaRef::new).transpose()?,
            sizes: if value.size.is_empty() {
                None
            } else {
                Some(size_labels(value.size)?)
            },
            colors: if value.color.is_empty() {
                None
            } else {
                Some(color_labels(value.color)?)
            },
        })
    }
}

/// Query-string filters accepted by the listing endpoints. Multi-value
/// fields arrive comma-delimited.
#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub search: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
}

impl ProductListParams {
    pub fn into_query(self, visibility: Visibility) -> Result<ProductListQuery, ProductFormError> {
        let mut query = match visibility {
            Visibility::Active => ProductListQuery::active(),
            Visibility::Trashed => ProductListQuery::trashed(),
        };

        if let Some(search) = non_empty(self.search) {
            query = query.search(search);
        }
        if let Some(sizes) = self.size {
            query = query.sizes(size_labels(split_tokens(&sizes))?);
        }
        if let Some(colors) = self.color {
            query = query.colors(color_labels(split_tokens(&colors))?);
        }
        if let Some(categories) = self.category {
            query = query.categories(category_names(split_tokens(&categories))?);
        }

        let min_price = optional_number(self.min_price, "minPrice")?;
        let max_price = optional_number(self.max_price, "maxPrice")?;
        Ok(query.price_between(min_price, max_price))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_number(value: &str, field: &'static str) -> Result<f64, ProductFormError> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|_| ProductFormError::InvalidNumber(field))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ProductFormError::InvalidNumber(field))
    }
}

fn optional_number(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<f64>, ProductFormError> {
    match non_empty(value) {
        Some(raw) => parse_number(&raw, field).map(Some),
        None => Ok(None),
    }
}

fn size_labels(values: Vec<String>) -> Result<Vec<SizeLabel>, TypeConstraintError> {
    let mut labels: Vec<SizeLabel> = Vec::new();
    for value in values {
        let value = value.trim().to_string();
        if value.is_empty() || labels.iter().any(|label| label.as_str() == value) {
            continue;
        }
        labels.push(SizeLabel::new(value)?);
    }
    Ok(labels)
}

fn color_labels(values: Vec<String>) -> Result<Vec<ColorLabel>, TypeConstraintError> {
    let mut labels: Vec<ColorLabel> = Vec::new();
    for value in values {
        let value = value.trim().to_string();
        if value.is_empty() || labels.iter().any(|label| label.as_str() == value) {
            continue;
        }
        labels.push(ColorLabel::new(value)?);
    }
    Ok(labels)
}

fn category_names(values: Vec<String>) -> Result<Vec<CategoryName>, TypeConstraintError> {
    let mut names: Vec<CategoryName> = Vec::new();
    for value in values {
        let value = value.trim().to_string();
        if value.is_empty() || names.iter().any(|name| name.as_str() == value) {
            continue;
        }
        names.push(CategoryName::new(value)?);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ProductFilter;

    fn create_fields() -> ProductFormFields {
        ProductFormFields {
            name: Some("Acme Widget".to_string()),
            price: Some("250".to_string()),
            category: Some("electronics".to_string()),
            desc: Some("x".to_string()),
            size: vec!["m".to_string()],
            color: vec!["red".to_string()],
            image: Some("http://x/y.png".to_string()),
        }
    }

    #[test]
    fn create_payload_accepts_valid_fields() {
        let payload = NewProductPayload::try_from(create_fields()).unwrap();
        assert_eq!(payload.name.as_str(), "Acme Widget");
        assert_eq!(payload.price, 250.0);
        assert_eq!(payload.sizes.len(), 1);
        assert!(payload.image.is_some());
    }

    #[test]
    fn create_payload_requires_name_price_category_and_desc() {
        let mut fields = create_fields();
        fields.price = None;

        let err = NewProductPayload::try_from(fields).unwrap_err();
        assert_eq!(err, ProductFormError::MissingField("price"));

        let mut fields = create_fields();
        fields.desc = None;
        assert_eq!(
            NewProductPayload::try_from(fields).unwrap_err(),
            ProductFormError::MissingField("desc")
        );
    }

    #[test]
    fn create_payload_stores_blank_desc_as_absent() {
        let mut fields = create_fields();
        fields.desc = Some("  ".to_string());

        let payload = NewProductPayload::try_from(fields).unwrap();
        assert_eq!(payload.description, None);
    }

    #[test]
    fn create_payload_rejects_non_numeric_price() {
        let mut fields = create_fields();
        fields.price = Some("cheap".to_string());

        let err = NewProductPayload::try_from(fields).unwrap_err();
        assert_eq!(err, ProductFormError::InvalidNumber("price"));
    }

    #[test]
    fn create_payload_rejects_short_names() {
        let mut fields = create_fields();
        fields.name = Some("ab".to_string());

        assert!(matches!(
            NewProductPayload::try_from(fields).unwrap_err(),
            ProductFormError::Validation(_)
        ));
    }

    #[test]
    fn create_payload_drops_duplicate_and_blank_labels() {
        let mut fields = create_fields();
        fields.size = vec![
            "m".to_string(),
            " m ".to_string(),
            String::new(),
            "l".to_string(),
        ];

        let payload = NewProductPayload::try_from(fields).unwrap();
        assert_eq!(payload.sizes.len(), 2);
    }

    #[test]
    fn update_payload_treats_absent_fields_as_unchanged() {
        let payload = UpdateProductPayload::try_from(ProductFormFields::default()).unwrap();
        assert_eq!(payload, UpdateProductPayload::default());
        assert!(payload.into_update().is_empty());
    }

    #[test]
    fn update_payload_clears_description_on_empty_input() {
        let fields = ProductFormFields {
            desc: Some("   ".to_string()),
            ..ProductFormFields::default()
        };

        let payload = UpdateProductPayload::try_from(fields).unwrap();
        assert_eq!(payload.description, Some(None));
    }

    #[test]
    fn list_params_split_comma_values_and_drop_empty_tokens() {
        let params = ProductListParams {
            search: None,
            size: Some("s,,m, ".to_string()),
            color: None,
            category: None,
            min_price: None,
            max_price: None,
        };

        let query = params.into_query(Visibility::Active).unwrap();
        assert_eq!(query.sizes.len(), 2);
        assert_eq!(query.clauses().len(), 1);
    }

    #[test]
    fn list_params_reject_malformed_price_bounds() {
        let params = ProductListParams {
            search: None,
            size: None,
            color: None,
            category: None,
            min_price: Some("abc".to_string()),
            max_price: None,
        };

        let err = params.into_query(Visibility::Active).unwrap_err();
        assert_eq!(err, ProductFormError::InvalidNumber("minPrice"));
    }

    #[test]
    fn list_params_build_the_expected_clause_set() {
        let params = ProductListParams {
            search: Some("red".to_string()),
            size: None,
            color: None,
            category: None,
            min_price: Some("100".to_string()),
            max_price: Some("500".to_string()),
        };

        let clauses = params
            .into_query(Visibility::Active)
            .unwrap()
            .clauses();
        assert_eq!(
            clauses,
            vec![
                ProductFilter::NameContains("red".to_string()),
                ProductFilter::PriceAtLeast(100.0),
                ProductFilter::PriceAtMost(500.0),
            ]
        );
    }
}
