use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::propertymodel::{PropertyStatus, PropertyType};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreatePropertyDto {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5-200 characters"))]
    pub title: String,

    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,

    #[validate(length(min = 5, max = 255, message = "Address must be between 5-255 characters"))]
    pub address: String,

    #[validate(length(min = 2, max = 100, message = "City must be between 2-100 characters"))]
    pub city: String,

    pub property_type: PropertyType,

    #[validate(range(min = 0, max = 20, message = "Bedrooms must be between 0 and 20"))]
    pub bedrooms: i32,

    #[validate(range(min = 0, max = 20, message = "Bathrooms must be between 0 and 20"))]
    pub bathrooms: i32,

    // LKR cents
    #[validate(range(min = 1, message = "Rent amount is required"))]
    pub rent_amount: i64,

    #[validate(range(min = 0, message = "Security deposit cannot be negative"))]
    pub security_deposit: i64,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdatePropertyDto {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Rent amount must be positive"))]
    pub rent_amount: Option<i64>,

    #[validate(range(min = 0, message = "Security deposit cannot be negative"))]
    pub security_deposit: Option<i64>,

    pub is_available: Option<bool>,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct PropertyFilterDto {
    pub city: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_rent: Option<i64>,
    pub max_rent: Option<i64>,
    pub bedrooms: Option<i32>,

    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyStatusUpdateDto {
    pub status: PropertyStatus,
}
