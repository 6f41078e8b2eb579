//! Console facade
//!
//! Bundles the gateway, notification bus, session manager, resource
//! stores and the order workflow into one object a UI can embed. Store
//! lifetimes are independent of any screen: a response that arrives
//! after the user navigated away still reconciles the cache here.

use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

use shared::draft::{ProfileDraft, SignupDraft, describe_errors};
use shared::models::{Coupon, MenuItem, Profile, Restaurant};
use shared::response::LoginEnvelope;

use crate::{
    ApiError, ApiGateway, AppState, ClientConfig, FetchError, FlagStore, NotificationBus,
    OrderWorkflow, ResourceRoutes, ResourceStore, SaveError, SessionManager,
};

pub struct Console {
    gateway: Arc<dyn ApiGateway>,
    pub bus: NotificationBus,
    pub app_state: AppState,
    pub session: SessionManager,
    pub restaurants: ResourceStore<Restaurant>,
    pub coupons: ResourceStore<Coupon>,
    pub users: ResourceStore<Profile>,
    pub orders: OrderWorkflow,
}

impl Console {
    /// Build a console talking HTTP to the backend.
    pub fn new(config: &ClientConfig, flags: Arc<dyn FlagStore>) -> Result<Self, ApiError> {
        Ok(Self::with_gateway(config.build_gateway()?, flags))
    }

    /// Build a console over an arbitrary gateway (tests, embedding).
    pub fn with_gateway(gateway: Arc<dyn ApiGateway>, flags: Arc<dyn FlagStore>) -> Self {
        let bus = NotificationBus::new();
        let app_state = AppState::new();
        let session = SessionManager::new(
            gateway.clone(),
            bus.clone(),
            flags,
            app_state.clone(),
        );
        Self {
            restaurants: ResourceStore::new(
                gateway.clone(),
                bus.clone(),
                ResourceRoutes::restaurants(),
            ),
            coupons: ResourceStore::new(gateway.clone(), bus.clone(), ResourceRoutes::coupons()),
            users: ResourceStore::new(gateway.clone(), bus.clone(), ResourceRoutes::users()),
            orders: OrderWorkflow::new(gateway.clone(), bus.clone()),
            session,
            app_state,
            bus,
            gateway,
        }
    }

    /// A store for one restaurant's menu. The screen that shows the menu
    /// owns the store for as long as the restaurant stays selected.
    pub fn menu_items(&self, restaurant_id: &str) -> ResourceStore<MenuItem> {
        ResourceStore::new(
            self.gateway.clone(),
            self.bus.clone(),
            ResourceRoutes::menu_items(restaurant_id),
        )
    }

    /// Ask the backend to flip one account between active and inactive.
    /// The server computes the new status; the request carries no body.
    pub async fn toggle_user_status(&self, user_id: &str) -> Result<Profile, SaveError> {
        self.users.update(user_id, Value::Null).await
    }

    /// Fetch the signed-in staff profile.
    pub async fn fetch_profile(&self) -> Result<Profile, FetchError> {
        let body = self
            .gateway
            .get("/auth/profile")
            .await
            .map_err(|source| FetchError {
                resource: "profile",
                source,
            })?;
        serde_json::from_value(body).map_err(|e| FetchError {
            resource: "profile",
            source: ApiError::from(e),
        })
    }

    /// Update the signed-in staff profile.
    pub async fn update_profile(&self, draft: &ProfileDraft) -> Result<Profile, SaveError> {
        self.validated(draft, "profile")?;
        let body = serde_json::to_value(draft).map_err(|e| self.save_error("profile", e.into()))?;
        let outcome = self
            .gateway
            .put("/auth/update-profile", Some(body))
            .await
            .and_then(|v| serde_json::from_value::<Profile>(v).map_err(ApiError::from));

        match outcome {
            Ok(profile) => {
                self.bus.success("Profile updated successfully");
                Ok(profile)
            }
            Err(source) => Err(self.save_error("profile", source)),
        }
    }

    /// Register a new account. The backend assigns the role; signing up
    /// never grants console access by itself.
    pub async fn signup(&self, draft: &SignupDraft) -> Result<Profile, SaveError> {
        self.validated(draft, "account")?;
        let body = serde_json::to_value(draft).map_err(|e| self.save_error("account", e.into()))?;
        let outcome = self
            .gateway
            .post("/auth/signup", body)
            .await
            .and_then(|v| serde_json::from_value::<LoginEnvelope>(v).map_err(ApiError::from));

        match outcome {
            Ok(envelope) => {
                self.bus.success("Account created successfully");
                Ok(envelope.user)
            }
            Err(source) => Err(self.save_error("account", source)),
        }
    }

    fn validated(&self, draft: &impl Validate, resource: &'static str) -> Result<(), SaveError> {
        if let Err(errors) = draft.validate() {
            return Err(self.save_error(resource, ApiError::Validation(describe_errors(&errors))));
        }
        Ok(())
    }

    fn save_error(&self, resource: &'static str, source: ApiError) -> SaveError {
        let err = SaveError { resource, source };
        self.bus.error(err.to_string());
        err
    }
}
