//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Dietary category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MenuCategory {
    #[default]
    #[serde(rename = "veg")]
    Veg,
    #[serde(rename = "non-veg")]
    NonVeg,
}

/// Menu item entity, owned by exactly one restaurant (by foreign key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in currency unit, never negative
    pub price: f64,
    #[serde(default)]
    pub category: MenuCategory,
    #[serde(rename = "isAvailable", default)]
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
