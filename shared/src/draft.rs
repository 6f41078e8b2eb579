//! Draft payloads for create/update calls
//!
//! Explicit per-entity schema structs replacing the original console's
//! duck-typed form objects. Validation is a pure function from draft to
//! field errors (`validator::Validate`), callable without any UI or
//! network in sight. Drafts never carry an id: ids are issued by the
//! backend on create and addressed by path on update.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::{Validate, ValidationErrors};

/// Restaurant create/update payload
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RestaurantDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    pub cuisine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Menu item create/update payload
#[derive(Debug, Clone, Serialize, Validate)]
pub struct MenuItemDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub category: crate::models::MenuCategory,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Coupon create/update payload
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CouponDraft {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(range(min = 0.0, max = 100.0, message = "discount must be between 0 and 100"))]
    #[serde(rename = "discountPercentage")]
    pub discount_percentage: f64,
    #[validate(range(min = 0.0, message = "max discount must not be negative"))]
    #[serde(rename = "maxDiscountValue")]
    pub max_discount_value: f64,
    #[validate(range(min = 0.0, message = "min order value must not be negative"))]
    #[serde(rename = "minOrderValue")]
    pub min_order_value: f64,
    #[serde(rename = "expiryDate")]
    pub expiry_date: DateTime<Utc>,
}

/// Profile update payload (`PUT /auth/update-profile`)
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ProfileDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "profilePicture", skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Account signup payload (`POST /auth/signup`)
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Flatten field errors into one human-readable line per field.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect::<Vec<_>>()
                .join(", ");
            if detail.is_empty() {
                format!("{field}: invalid")
            } else {
                format!("{field}: {detail}")
            }
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(discount: f64) -> CouponDraft {
        CouponDraft {
            code: "SAVE10".to_string(),
            discount_percentage: discount,
            max_discount_value: 100.0,
            min_order_value: 250.0,
            expiry_date: Utc::now(),
        }
    }

    #[test]
    fn coupon_discount_bounds() {
        assert!(coupon(10.0).validate().is_ok());
        assert!(coupon(100.0).validate().is_ok());
        assert!(coupon(101.0).validate().is_err());
        assert!(coupon(-1.0).validate().is_err());
    }

    #[test]
    fn signup_password_length() {
        let draft = SignupDraft {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "12345".to_string(),
            phone: None,
        };
        let errors = draft.validate().unwrap_err();
        assert!(describe_errors(&errors).contains("at least 6 characters"));
    }

    #[test]
    fn describe_errors_is_deterministic() {
        let draft = SignupDraft {
            name: String::new(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
            phone: None,
        };
        let errors = draft.validate().unwrap_err();
        let line = describe_errors(&errors);
        assert!(line.contains("email: invalid email address"));
        assert!(line.contains("name: name is required"));
    }
}
