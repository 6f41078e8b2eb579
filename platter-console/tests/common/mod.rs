//! Scripted in-memory gateway for integration tests.
//!
//! Replies are queued per `METHOD path` key and consumed FIFO. A gated
//! reply parks the request on a oneshot channel so tests can resolve
//! in-flight operations in a chosen order.

#![allow(dead_code)]

use async_trait::async_trait;
use http::Method;
use platter_console::{ApiError, ApiGateway, ApiResult};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

enum Reply {
    Now(Result<Value, ApiError>),
    Gated(oneshot::Receiver<Result<Value, ApiError>>),
}

#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: &Method, path: &str) -> String {
        format!("{method} {path}")
    }

    /// Queue an immediate reply for one request.
    pub fn respond(&self, method: Method, path: &str, reply: Result<Value, ApiError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(Self::key(&method, path))
            .or_default()
            .push_back(Reply::Now(reply));
    }

    /// Queue a reply the test resolves later, for racing in-flight calls.
    pub fn gate(&self, method: Method, path: &str) -> oneshot::Sender<Result<Value, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.replies
            .lock()
            .unwrap()
            .entry(Self::key(&method, path))
            .or_default()
            .push_back(Reply::Gated(rx));
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Spin until the gateway has seen `n` requests.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ApiGateway for MockGateway {
    async fn request(&self, method: Method, path: &str, _body: Option<Value>) -> ApiResult<Value> {
        let key = Self::key(&method, path);
        self.calls.lock().unwrap().push(key.clone());

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            replies.get_mut(&key).and_then(|queue| queue.pop_front())
        };

        match reply {
            Some(Reply::Now(result)) => result,
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Network("gate dropped".to_string()))),
            None => Err(ApiError::NotFound(format!("no scripted reply for {key}"))),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn restaurant_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "location": "Pune",
        "cuisine": "Indian",
        "status": "open",
    })
}

pub fn coupon_json(id: &str, code: &str) -> Value {
    json!({
        "_id": id,
        "code": code,
        "discountPercentage": 10.0,
        "maxDiscountValue": 100.0,
        "minOrderValue": 250.0,
        "expiryDate": "2026-12-31T00:00:00Z",
    })
}

pub fn profile_json(id: &str, name: &str, role: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "status": status,
        "role": role,
    })
}

pub fn order_json(id: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "restaurantId": "r-1",
        "userId": "u-1",
        "status": status,
        "createdAt": "2026-08-24T10:00:00Z",
        "updatedAt": "2026-08-24T10:00:00Z",
        "finalPrice": 499.0,
        "user": { "name": "Asha" },
    })
}
