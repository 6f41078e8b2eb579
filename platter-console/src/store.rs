//! Generic optimistic resource cache
//!
//! One [`ResourceStore`] instance holds the ordered collection of a
//! single entity type and mirrors it against the backend:
//!
//! - `load` is the only non-optimistic mutation, a full refresh
//! - `create` waits for the server (ids are server-assigned)
//! - `update` applies the merged value immediately and reconciles with
//!   the canonical response, rolling back on failure
//! - `remove` drops the entry immediately and restores it on failure
//!
//! Per-id sequencing makes reconciliation last-response-wins: a
//! fast-completing older request never overwrites a newer optimistic
//! value, and whichever canonical response arrives last is the one the
//! cache keeps.

use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;

use shared::draft::describe_errors;
use shared::models::{Coupon, MenuItem, Profile, Restaurant};
use shared::response::{CouponEnvelope, CouponsEnvelope, UserEnvelope, UsersEnvelope};

use crate::{ApiError, ApiGateway, DeleteError, FetchError, NotificationBus, SaveError};

/// A cacheable backend entity.
///
/// `decode_list`/`decode_one` absorb the backend's envelope
/// inconsistencies; the defaults handle the bare-JSON entities.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Lowercase entity name used in notifications and error messages.
    const NAME: &'static str;

    /// Backend-issued opaque identifier.
    fn id(&self) -> &str;

    fn decode_list(body: Value) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_value(body)
    }

    fn decode_one(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(body)
    }
}

impl Resource for Restaurant {
    const NAME: &'static str = "restaurant";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for MenuItem {
    const NAME: &'static str = "menu item";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Coupon {
    const NAME: &'static str = "coupon";

    fn id(&self) -> &str {
        &self.id
    }

    fn decode_list(body: Value) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_value::<CouponsEnvelope>(body).map(|e| e.coupons)
    }

    fn decode_one(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<CouponEnvelope>(body).map(|e| e.coupon)
    }
}

impl Resource for Profile {
    const NAME: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn decode_list(body: Value) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_value::<UsersEnvelope>(body).map(|e| e.users)
    }

    fn decode_one(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<UserEnvelope>(body).map(|e| e.user)
    }
}

// ============================================================================
// Routes
// ============================================================================

type PathFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// REST endpoints for one resource collection.
pub struct ResourceRoutes {
    pub list: String,
    /// Single-entity GET, where the backend has one.
    pub show: Option<PathFn>,
    /// `None` when the console has no create endpoint (users sign up
    /// through the auth flow).
    pub create: Option<String>,
    pub update: PathFn,
    pub update_method: Method,
    /// Bodyless updates let the server compute the next state (the user
    /// status toggle).
    pub update_sends_body: bool,
    pub delete: PathFn,
}

impl ResourceRoutes {
    pub fn restaurants() -> Self {
        Self {
            list: "/restaurants/all-restaurants".to_string(),
            show: Some(Box::new(|id| format!("/restaurants/{id}"))),
            create: Some("/restaurants".to_string()),
            update: Box::new(|id| format!("/restaurants/{id}")),
            update_method: Method::PUT,
            update_sends_body: true,
            delete: Box::new(|id| format!("/restaurants/{id}")),
        }
    }

    pub fn menu_items(restaurant_id: &str) -> Self {
        let rid_show = restaurant_id.to_string();
        let rid_update = restaurant_id.to_string();
        let rid_delete = restaurant_id.to_string();
        Self {
            list: format!("/restaurants/{restaurant_id}/menu"),
            show: Some(Box::new(move |id| format!("/restaurants/{rid_show}/{id}"))),
            create: Some(format!("/restaurants/{restaurant_id}/addMenu")),
            update: Box::new(move |id| format!("/restaurants/menuitems/{rid_update}/{id}")),
            update_method: Method::PUT,
            update_sends_body: true,
            delete: Box::new(move |id| format!("/restaurants/menuitems/{rid_delete}/{id}")),
        }
    }

    pub fn coupons() -> Self {
        Self {
            list: "/coupon/get-coupons".to_string(),
            show: None,
            create: Some("/coupon/create-coupon".to_string()),
            update: Box::new(|id| format!("/coupon/update-coupon/{id}")),
            update_method: Method::PUT,
            update_sends_body: true,
            delete: Box::new(|id| format!("/coupon/delete-coupon/{id}")),
        }
    }

    pub fn users() -> Self {
        Self {
            list: "/admin/get-all-users".to_string(),
            show: None,
            create: None,
            update: Box::new(|id| format!("/admin/update-user/{id}")),
            update_method: Method::PATCH,
            update_sends_body: false,
            delete: Box::new(|id| format!("/admin/delete-user/{id}")),
        }
    }
}

// ============================================================================
// Cache state
// ============================================================================

#[derive(Debug, Clone)]
struct Entry<T> {
    /// Visible value, possibly optimistic.
    value: T,
    /// Last canonical value from the backend; the rollback target.
    confirmed: T,
}

impl<T: Clone> Entry<T> {
    fn confirmed_from(value: T) -> Self {
        Self {
            confirmed: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Default)]
struct OpWindow {
    in_flight: BTreeSet<u64>,
    last_started: u64,
}

#[derive(Debug)]
struct PendingDelete<T> {
    entry: Entry<T>,
    index: usize,
}

struct StoreState<T> {
    entries: Vec<Entry<T>>,
    deletes: HashMap<String, PendingDelete<T>>,
    ops: HashMap<String, OpWindow>,
    next_seq: u64,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            deletes: HashMap::new(),
            ops: HashMap::new(),
            next_seq: 1,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

pub struct ResourceStore<T: Resource> {
    gateway: Arc<dyn ApiGateway>,
    bus: NotificationBus,
    routes: ResourceRoutes,
    state: Mutex<StoreState<T>>,
}

impl<T: Resource> ResourceStore<T> {
    pub fn new(gateway: Arc<dyn ApiGateway>, bus: NotificationBus, routes: ResourceRoutes) -> Self {
        Self {
            gateway,
            bus,
            routes,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Cloned view of the current collection, in server order.
    pub async fn snapshot(&self) -> Vec<T> {
        let state = self.state.lock().await;
        state.entries.iter().map(|e| e.value.clone()).collect()
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        let state = self.state.lock().await;
        state
            .entries
            .iter()
            .find(|e| e.value.id() == id)
            .map(|e| e.value.clone())
    }

    /// Full refresh from the source of truth. Replaces the collection,
    /// drops any unreconciled optimistic bookkeeping, and preserves the
    /// server's ordering. Failures surface through the `Result` only;
    /// refreshes do not toast.
    pub async fn load(&self) -> Result<Vec<T>, FetchError> {
        let body = self
            .gateway
            .get(&self.routes.list)
            .await
            .map_err(|source| FetchError {
                resource: T::NAME,
                source,
            })?;
        let items = T::decode_list(body).map_err(|e| FetchError {
            resource: T::NAME,
            source: ApiError::from(e),
        })?;

        let mut state = self.state.lock().await;
        state.entries = items.iter().cloned().map(Entry::confirmed_from).collect();
        state.deletes.clear();
        state.ops.clear();
        tracing::debug!(resource = T::NAME, count = items.len(), "collection refreshed");
        Ok(items)
    }

    /// Refresh a single entity from its detail endpoint. Upserts the
    /// canonical value into the collection; like [`Self::load`] this is
    /// a refresh, so failures surface through the `Result` only. While
    /// an optimistic operation for the same id is in flight, only the
    /// rollback target is refreshed.
    pub async fn fetch(&self, id: &str) -> Result<T, FetchError> {
        let Some(show) = self.routes.show.as_ref() else {
            return Err(FetchError {
                resource: T::NAME,
                source: ApiError::Internal(format!(
                    "{} has no single-item endpoint",
                    T::NAME
                )),
            });
        };
        let path = show(id);

        let body = self.gateway.get(&path).await.map_err(|source| FetchError {
            resource: T::NAME,
            source,
        })?;
        let entity = T::decode_one(body).map_err(|e| FetchError {
            resource: T::NAME,
            source: ApiError::from(e),
        })?;

        let mut state = self.state.lock().await;
        if let Some(pending) = state.deletes.get_mut(id) {
            // Optimistically removed meanwhile; the canonical value only
            // refreshes the restore target, the entry stays out.
            pending.entry.confirmed = entity.clone();
            pending.entry.value = entity.clone();
            return Ok(entity);
        }
        let pending_op = state.ops.contains_key(id);
        match state.entries.iter_mut().find(|e| e.value.id() == id) {
            Some(entry) => {
                entry.confirmed = entity.clone();
                if !pending_op {
                    entry.value = entity.clone();
                }
            }
            None => state.entries.push(Entry::confirmed_from(entity.clone())),
        }
        Ok(entity)
    }

    /// Create a new entity. Never optimistic: the id is server-assigned,
    /// so the collection is untouched until the canonical entity arrives,
    /// then appended in arrival order.
    pub async fn create(&self, draft: Value) -> Result<T, SaveError> {
        let Some(path) = self.routes.create.as_deref() else {
            let err = SaveError {
                resource: T::NAME,
                source: ApiError::Internal(format!(
                    "{} cannot be created from the console",
                    T::NAME
                )),
            };
            self.bus.error(err.to_string());
            return Err(err);
        };

        let outcome = self
            .gateway
            .post(path, draft)
            .await
            .and_then(|v| T::decode_one(v).map_err(ApiError::from));

        match outcome {
            Ok(entity) => {
                let mut state = self.state.lock().await;
                state.entries.push(Entry::confirmed_from(entity.clone()));
                drop(state);
                tracing::debug!(resource = T::NAME, id = entity.id(), "created");
                self.bus.success(format!("{} created successfully", T::NAME));
                Ok(entity)
            }
            Err(source) => {
                let err = SaveError {
                    resource: T::NAME,
                    source,
                };
                self.bus.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Validate a typed draft, then [`Self::create`] it. Field errors
    /// surface as a `Validation` save error without touching the network.
    pub async fn create_validated<D>(&self, draft: &D) -> Result<T, SaveError>
    where
        D: Validate + Serialize + Sync,
    {
        let body = self.draft_body(draft)?;
        self.create(body).await
    }

    /// Validate a typed draft, then [`Self::update`] with it.
    pub async fn update_validated<D>(&self, id: &str, draft: &D) -> Result<T, SaveError>
    where
        D: Validate + Serialize + Sync,
    {
        let body = self.draft_body(draft)?;
        self.update(id, body).await
    }

    fn draft_body<D: Validate + Serialize>(&self, draft: &D) -> Result<Value, SaveError> {
        if let Err(errors) = draft.validate() {
            let err = SaveError {
                resource: T::NAME,
                source: ApiError::Validation(describe_errors(&errors)),
            };
            self.bus.error(err.to_string());
            return Err(err);
        }
        serde_json::to_value(draft).map_err(|e| {
            let err = SaveError {
                resource: T::NAME,
                source: ApiError::from(e),
            };
            self.bus.error(err.to_string());
            err
        })
    }

    /// Optimistic update. The cached entry is replaced with the merged
    /// value before the call resolves; the canonical response supersedes
    /// the guess, and a failure rolls back to the latest authoritative
    /// value. Reconciliation is last-response-wins per id (see module
    /// docs).
    pub async fn update(&self, id: &str, patch: Value) -> Result<T, SaveError> {
        // Phase 1: capture sequencing state and apply the optimistic guess.
        let seq;
        {
            let mut state = self.state.lock().await;
            let Some(idx) = state.entries.iter().position(|e| e.value.id() == id) else {
                let err = SaveError {
                    resource: T::NAME,
                    source: ApiError::NotFound(format!("{} {id} is not in the cache", T::NAME)),
                };
                drop(state);
                self.bus.error(err.to_string());
                return Err(err);
            };

            seq = state.next_seq;
            state.next_seq += 1;
            let window = state.ops.entry(id.to_string()).or_default();
            window.in_flight.insert(seq);
            window.last_started = seq;

            match merge_patch(&state.entries[idx].value, &patch) {
                Ok(merged) => state.entries[idx].value = merged,
                Err(e) => {
                    self.forget_op(&mut state, id, seq);
                    let err = SaveError {
                        resource: T::NAME,
                        source: ApiError::from(e),
                    };
                    drop(state);
                    self.bus.error(err.to_string());
                    return Err(err);
                }
            }
        }

        // Suspension point: the lock is never held across the network.
        let path = (self.routes.update)(id);
        let body = self.routes.update_sends_body.then_some(patch);
        let outcome = self
            .gateway
            .request(self.routes.update_method.clone(), &path, body)
            .await
            .and_then(|v| T::decode_one(v).map_err(ApiError::from));

        // Phase 2: reconcile.
        let mut state = self.state.lock().await;
        let (newer_pending, was_last_started) = self.resolve_op(&mut state, id, seq);

        match outcome {
            Ok(server) => {
                if let Some(entry) = state.entries.iter_mut().find(|e| e.value.id() == id) {
                    entry.confirmed = server.clone();
                    if newer_pending {
                        tracing::debug!(
                            resource = T::NAME,
                            id,
                            seq,
                            "response superseded by newer in-flight operation"
                        );
                    } else {
                        entry.value = server.clone();
                    }
                } else if let Some(pending) = state.deletes.get_mut(id) {
                    // The entry was optimistically removed meanwhile; keep
                    // the canonical value as its restore target.
                    pending.entry.confirmed = server.clone();
                    pending.entry.value = server.clone();
                }
                drop(state);
                self.bus.success(format!("{} updated successfully", T::NAME));
                Ok(server)
            }
            Err(source) => {
                if !newer_pending && was_last_started {
                    if let Some(entry) = state.entries.iter_mut().find(|e| e.value.id() == id) {
                        entry.value = entry.confirmed.clone();
                        tracing::warn!(resource = T::NAME, id, seq, "update failed; rolled back");
                    }
                }
                drop(state);
                let err = SaveError {
                    resource: T::NAME,
                    source,
                };
                self.bus.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Optimistic delete. The entry disappears immediately; a failure
    /// restores the exact snapshot at its original index.
    pub async fn remove(&self, id: &str) -> Result<(), DeleteError> {
        {
            let mut state = self.state.lock().await;
            let Some(idx) = state.entries.iter().position(|e| e.value.id() == id) else {
                let err = DeleteError {
                    resource: T::NAME,
                    source: ApiError::NotFound(format!("{} {id} is not in the cache", T::NAME)),
                };
                drop(state);
                self.bus.error(err.to_string());
                return Err(err);
            };
            let entry = state.entries.remove(idx);
            state
                .deletes
                .insert(id.to_string(), PendingDelete { entry, index: idx });
        }

        let path = (self.routes.delete)(id);
        match self.gateway.delete(&path).await {
            Ok(_) => {
                let mut state = self.state.lock().await;
                state.deletes.remove(id);
                state.ops.remove(id);
                drop(state);
                tracing::debug!(resource = T::NAME, id, "deleted");
                self.bus.success(format!("{} deleted successfully", T::NAME));
                Ok(())
            }
            Err(source) => {
                let mut state = self.state.lock().await;
                if let Some(pending) = state.deletes.remove(id) {
                    let at = pending.index.min(state.entries.len());
                    state.entries.insert(at, pending.entry);
                    tracing::warn!(resource = T::NAME, id, index = at, "delete failed; restored");
                }
                drop(state);
                let err = DeleteError {
                    resource: T::NAME,
                    source,
                };
                self.bus.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Drop `seq` from the id's window without resolving anything.
    fn forget_op(&self, state: &mut StoreState<T>, id: &str, seq: u64) {
        let mut empty = false;
        if let Some(window) = state.ops.get_mut(id) {
            window.in_flight.remove(&seq);
            empty = window.in_flight.is_empty();
        }
        if empty {
            state.ops.remove(id);
        }
    }

    /// Resolve `seq` for `id`, returning whether a newer operation is
    /// still in flight and whether this was the most recently started one.
    fn resolve_op(&self, state: &mut StoreState<T>, id: &str, seq: u64) -> (bool, bool) {
        let mut newer_pending = false;
        let mut was_last_started = false;
        let mut empty = false;
        if let Some(window) = state.ops.get_mut(id) {
            window.in_flight.remove(&seq);
            newer_pending = window.in_flight.iter().any(|s| *s > seq);
            was_last_started = window.last_started == seq;
            empty = window.in_flight.is_empty();
        }
        if empty {
            state.ops.remove(id);
        }
        (newer_pending, was_last_started)
    }
}

/// Merge a partial JSON patch over the current entity. Non-object
/// patches (e.g. `null` for bodyless toggles) leave the value as-is.
fn merge_patch<T: Resource>(current: &T, patch: &Value) -> Result<T, serde_json::Error> {
    let mut base = serde_json::to_value(current)?;
    if let (Value::Object(base_map), Value::Object(patch_map)) = (&mut base, patch) {
        for (key, value) in patch_map {
            base_map.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(base)
}
