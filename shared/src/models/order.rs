//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery order status.
///
/// The backend owns the progression; the console only asks for "advance
/// to next" and reflects what comes back. `Delivered` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "preparing")]
    Preparing,
    #[serde(rename = "out for delivery")]
    OutForDelivery,
    #[serde(rename = "delivered")]
    Delivered,
}

impl OrderStatus {
    /// The single legal forward transition, or `None` once terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::OutForDelivery => write!(f, "out for delivery"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

/// Customer summary embedded in restaurant order listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderCustomer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Order entity
///
/// Line items are opaque to the console: it transports and displays
/// what the backend returns, never computes over them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Total in currency unit, computed server-side
    #[serde(rename = "finalPrice")]
    pub final_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderCustomer>,
    #[serde(default)]
    pub lines: serde_json::Value,
}
