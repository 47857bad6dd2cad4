use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Single canonical visit model; one status vocabulary for the whole
// request -> decision -> outcome lifecycle.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "visit_status", rename_all = "lowercase")]
pub enum VisitStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl VisitStatus {
    pub fn to_str(&self) -> &str {
        match self {
            VisitStatus::Pending => "pending",
            VisitStatus::Approved => "approved",
            VisitStatus::Rejected => "rejected",
            VisitStatus::Completed => "completed",
            VisitStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PropertyVisit {
    pub id: Uuid,
    pub property_id: Uuid,
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub status: VisitStatus,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WishlistItem {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub property_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
}
