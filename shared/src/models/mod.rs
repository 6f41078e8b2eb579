//! Entity models
//!
//! One module per backend entity. All ids are opaque strings issued by
//! the backend and serialized as `_id` in its JSON documents.

pub mod coupon;
pub mod menu_item;
pub mod order;
pub mod restaurant;
pub mod user;

pub use coupon::Coupon;
pub use menu_item::{MenuCategory, MenuItem};
pub use order::{Order, OrderStatus};
pub use restaurant::{Restaurant, RestaurantStatus};
pub use user::{Profile, Role, UserStatus};
