//! Shared types for the Platter admin console
//!
//! Entity models, API response envelopes, and draft/validation types
//! used across the console client. Everything here is transport-agnostic:
//! plain serde types matching the backend's JSON.

pub mod draft;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use draft::{CouponDraft, MenuItemDraft, ProfileDraft, RestaurantDraft, SignupDraft};
pub use models::{
    Coupon, MenuCategory, MenuItem, Order, OrderStatus, Profile, Restaurant, RestaurantStatus,
    Role, UserStatus,
};
