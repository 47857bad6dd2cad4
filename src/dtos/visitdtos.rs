use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateVisitDto {
    pub property_id: Uuid,

    pub requested_at: DateTime<Utc>,

    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

impl CreateVisitDto {
    /// A visit can only be requested for a future time slot.
    pub fn ensure_future(&self, now: DateTime<Utc>) -> Result<(), String> {
        if self.requested_at <= now {
            return Err("Requested visit time must be in the future".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WishlistToggleDto {
    pub property_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WishlistStateDto {
    pub in_wishlist: bool,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn visit_at(requested_at: DateTime<Utc>) -> CreateVisitDto {
        CreateVisitDto {
            property_id: Uuid::new_v4(),
            requested_at,
            note: None,
        }
    }

    #[test]
    fn test_future_visit_is_accepted() {
        let now = Utc::now();
        assert!(visit_at(now + Duration::hours(2)).ensure_future(now).is_ok());
    }

    #[test]
    fn test_past_and_present_visits_are_rejected() {
        let now = Utc::now();
        assert!(visit_at(now).ensure_future(now).is_err());
        assert!(visit_at(now - Duration::minutes(1)).ensure_future(now).is_err());
    }
}
