//! Order status workflow
//!
//! Orders move `pending → confirmed → preparing → out for delivery →
//! delivered`, strictly forward, one hop at a time, and the hop itself
//! is computed server-side: the console PATCHes a bodyless "advance"
//! endpoint and reconciles whatever comes back. The only client-side
//! rule is the terminal guard on `delivered`.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use shared::models::{Order, OrderStatus};
use shared::response::{OrderEnvelope, OrdersEnvelope};

use crate::{ApiError, ApiGateway, FetchError, NotificationBus, TransitionError};

#[derive(Default)]
struct WorkflowState {
    restaurant_id: Option<String>,
    orders: Vec<Order>,
}

pub struct OrderWorkflow {
    gateway: Arc<dyn ApiGateway>,
    bus: NotificationBus,
    state: Mutex<WorkflowState>,
}

impl OrderWorkflow {
    pub fn new(gateway: Arc<dyn ApiGateway>, bus: NotificationBus) -> Self {
        Self {
            gateway,
            bus,
            state: Mutex::new(WorkflowState::default()),
        }
    }

    /// Replace the cache with one restaurant's orders, in server order.
    pub async fn load_orders(&self, restaurant_id: &str) -> Result<Vec<Order>, FetchError> {
        let path = format!("/order/get-all-restaurant-orders/{restaurant_id}");
        let body = self.gateway.get(&path).await.map_err(|source| FetchError {
            resource: "orders",
            source,
        })?;
        let envelope: OrdersEnvelope = serde_json::from_value(body).map_err(|e| FetchError {
            resource: "orders",
            source: ApiError::from(e),
        })?;

        let mut state = self.state.lock().await;
        state.restaurant_id = Some(restaurant_id.to_string());
        state.orders = envelope.orders.clone();
        tracing::debug!(restaurant_id, count = state.orders.len(), "orders refreshed");
        Ok(envelope.orders)
    }

    /// Cloned view of the cached orders.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.clone()
    }

    /// Pure local projection over the cache. `None` means no filter.
    /// Derived on demand, so it can never show a status the cache has
    /// already moved past.
    pub async fn filter_by_status(&self, status: Option<OrderStatus>) -> Vec<Order> {
        let state = self.state.lock().await;
        match status {
            None => state.orders.clone(),
            Some(wanted) => state
                .orders
                .iter()
                .filter(|o| o.status == wanted)
                .cloned()
                .collect(),
        }
    }

    /// Ask the backend to advance one order to its next status, then
    /// reconcile `status` and `updated_at` from the canonical response.
    ///
    /// Short-circuits with [`TransitionError::AlreadyTerminal`] when the
    /// cached order is already delivered; no network call is made.
    pub async fn advance(&self, order_id: &str) -> Result<Order, TransitionError> {
        {
            let state = self.state.lock().await;
            let Some(order) = state.orders.iter().find(|o| o.id == order_id) else {
                drop(state);
                self.bus.error(format!("order {order_id} is not in the cached list"));
                return Err(TransitionError::UnknownOrder {
                    id: order_id.to_string(),
                });
            };
            if order.status.is_terminal() {
                drop(state);
                tracing::debug!(order_id, "advance refused: already delivered");
                self.bus.error("Order is already delivered");
                return Err(TransitionError::AlreadyTerminal {
                    id: order_id.to_string(),
                });
            }
        }

        let path = format!("/order/update-order-status/{order_id}");
        let outcome: Result<OrderEnvelope, ApiError> = self
            .gateway
            .patch(&path)
            .await
            .and_then(|v: Value| serde_json::from_value(v).map_err(ApiError::from));

        match outcome {
            Ok(envelope) => {
                let mut state = self.state.lock().await;
                let reconciled = match state.orders.iter_mut().find(|o| o.id == order_id) {
                    Some(order) => {
                        order.status = envelope.order.status;
                        order.updated_at = envelope.order.updated_at;
                        order.clone()
                    }
                    // Cache was reloaded meanwhile; the canonical order
                    // still goes back to the caller.
                    None => envelope.order,
                };
                drop(state);
                tracing::debug!(order_id, status = %reconciled.status, "order advanced");
                self.bus.success("Order updated successfully");
                Ok(reconciled)
            }
            Err(source) => {
                self.bus.error("Failed to update order status");
                Err(source.into())
            }
        }
    }
}
