//! Coupon Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discount coupon entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: String,
    /// Unique coupon code, uniqueness enforced by the backend
    pub code: String,
    #[serde(rename = "discountPercentage")]
    pub discount_percentage: f64,
    /// Cap on the absolute discount in currency unit
    #[serde(rename = "maxDiscountValue")]
    pub max_discount_value: f64,
    /// Minimum cart total for the coupon to apply
    #[serde(rename = "minOrderValue")]
    pub min_order_value: f64,
    #[serde(rename = "expiryDate")]
    pub expiry_date: DateTime<Utc>,
}
