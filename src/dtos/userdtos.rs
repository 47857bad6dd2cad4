use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::models::usermodel::{User, UserRole};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,

    pub phone: Option<String>,

    // "owner" or "customer"; admins are provisioned out of band
    pub role: Option<String>,
}

impl RegisterUserDto {
    pub fn requested_role(&self) -> Result<UserRole, ValidationError> {
        match self.role.as_deref() {
            None | Some("customer") => Ok(UserRole::Customer),
            Some("owner") => Ok(UserRole::Owner),
            Some(_) => {
                let mut error = ValidationError::new("invalid_role");
                error.message = Some(Cow::from("Role must be either 'owner' or 'customer'"));
                Err(error)
            }
        }
    }

    pub fn validate_phone_number(&self) -> Result<(), ValidationError> {
        if let Some(phone) = &self.phone {
            let phone_regex =
                regex::Regex::new(r"^(\+?[0-9]{1,3}[- ]?)?[0-9]{3}[- ]?[0-9]{3}[- ]?[0-9]{4}$")
                    .map_err(|_| ValidationError::new("Invalid phone regex"))?;

            if !phone_regex.is_match(phone) {
                let mut error = ValidationError::new("invalid_phone");
                error.message = Some(Cow::from(
                    "Phone number must be in a valid format (e.g., +94771234567 or 077-123-4567)",
                ));
                return Err(error);
            }
        }
        Ok(())
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 7, max = 20, message = "Phone number must be between 7-20 characters"))]
    pub phone: Option<String>,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            phone: user.phone.clone(),
            role: user.role.to_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub success: bool,
    pub token: String,
    pub user: FilterUserDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_role() {
        let mut dto = RegisterUserDto::default();
        assert_eq!(dto.requested_role().unwrap(), UserRole::Customer);

        dto.role = Some("owner".to_string());
        assert_eq!(dto.requested_role().unwrap(), UserRole::Owner);

        dto.role = Some("admin".to_string());
        assert!(dto.requested_role().is_err());
    }

    #[test]
    fn test_phone_validation() {
        let mut dto = RegisterUserDto::default();
        dto.phone = Some("+94771234567".to_string());
        assert!(dto.validate_phone_number().is_ok());

        dto.phone = Some("not-a-phone".to_string());
        assert!(dto.validate_phone_number().is_err());

        dto.phone = None;
        assert!(dto.validate_phone_number().is_ok());
    }
}
