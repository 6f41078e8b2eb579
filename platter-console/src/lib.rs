//! Platter Console - client library for the delivery platform admin console
//!
//! Session management, optimistic resource caches and the order status
//! workflow that every console screen depends on. Transport goes through
//! the [`ApiGateway`] seam so screens and tests never touch HTTP directly.

pub mod app_state;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod orders;
pub mod search;
pub mod session;
pub mod store;

pub use app_state::AppState;
pub use config::ClientConfig;
pub use console::Console;
pub use error::{ApiError, ApiResult, AuthError, DeleteError, FetchError, SaveError, TransitionError};
pub use gateway::{ApiGateway, HttpGateway};
pub use notify::{Notification, NotificationBus, NotificationKind};
pub use orders::OrderWorkflow;
pub use search::filter;
pub use session::{FileFlagStore, FlagStore, MemoryFlagStore, SessionManager, SessionState};
pub use store::{Resource, ResourceRoutes, ResourceStore};

// Re-export shared types for convenience
pub use shared::models::{
    Coupon, MenuItem, Order, OrderStatus, Profile, Restaurant, Role, UserStatus,
};
