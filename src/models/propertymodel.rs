use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "property_status", rename_all = "lowercase")]
pub enum PropertyStatus {
    Pending,  // Awaiting admin review
    Approved, // Listed and bookable
    Rented,
    Rejected,
}

impl PropertyStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PropertyStatus::Pending => "pending",
            PropertyStatus::Approved => "approved",
            PropertyStatus::Rented => "rented",
            PropertyStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "property_type", rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Annex,
    Room,
    Commercial,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,

    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub property_type: PropertyType,
    pub bedrooms: i32,
    pub bathrooms: i32,

    // LKR cents
    pub rent_amount: i64,
    pub security_deposit: i64,

    pub status: PropertyStatus,
    pub is_available: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
