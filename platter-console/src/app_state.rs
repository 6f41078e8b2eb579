//! Cross-screen shared state
//!
//! Explicit, injected replacement for the ambient per-screen globals the
//! console used to rely on. A keyed JSON map with subscribe+read, owned
//! by whoever builds the [`crate::Console`] and cleared on logout.

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct AppState {
    tx: Arc<watch::Sender<Map<String, Value>>>,
}

impl AppState {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Map::new());
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.tx.borrow().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.tx.send_modify(|map| {
            map.insert(key.into(), value);
        });
    }

    /// Drop all shared state. Invoked by the session manager on logout.
    pub fn clear(&self) {
        self.tx.send_modify(|map| map.clear());
    }

    /// Watch for any change to the map. Consumers re-read what they need
    /// instead of receiving diffs.
    pub fn subscribe(&self) -> watch::Receiver<Map<String, Value>> {
        self.tx.subscribe()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_clear() {
        let state = AppState::new();
        state.set("selected_restaurant", json!("r-1"));
        assert_eq!(state.get("selected_restaurant"), Some(json!("r-1")));

        state.clear();
        assert_eq!(state.get("selected_restaurant"), None);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let state = AppState::new();
        let mut rx = state.subscribe();

        state.set("theme", json!("dark"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().get("theme"), Some(&json!("dark")));
    }
}
