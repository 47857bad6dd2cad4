use serde::{Deserialize, Serialize};

pub mod bookingdtos;
pub mod paymentdtos;
pub mod propertydtos;
pub mod userdtos;
pub mod visitdtos;

// Shared response envelope: {"success": bool, "message"?: ..., "data"?: ...}
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn message(message: &str) -> ApiResponse<()> {
        ApiResponse {
            success: true,
            message: Some(message.to_string()),
            data: None,
        }
    }
}
