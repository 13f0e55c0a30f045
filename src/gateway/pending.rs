//! # In-Flight Request Tracking
//!
//! Identical requests issued while the first one is still running are rejected. Two requests
//! are identical when their [`RequestKey`]s match: same method, same path, and the same
//! query/body once object keys are put in a canonical order.
//!
//! ## Release Guarantee
//!
//! [`PendingRequests::try_acquire`] hands back a [`PendingGuard`]. The key leaves the set when
//! the guard is dropped, and Rust drops it on every exit path: success, classified failure,
//! timeout, and even a caller that drops the dispatch future halfway through. A key can never
//! leak and block its request forever.

use crate::gateway::transport::Method;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Deduplication fingerprint of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new(method: Method, path: &str, query: Option<&Value>, body: Option<&Value>) -> Self {
        let mut key = String::with_capacity(path.len() + 32);
        key.push_str(method.as_str());
        key.push_str("::");
        key.push_str(path);
        key.push_str("::");
        write_part(&mut key, query);
        key.push_str("::");
        write_part(&mut key, body);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_part(out: &mut String, value: Option<&Value>) {
    match value {
        Some(value) => write_canonical(out, value),
        None => out.push('-'),
    }
}

/// Writes `value` as JSON with object keys sorted at every depth.
fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(out, v);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// The set of keys currently in flight. Cloning shares the same set.
#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    keys: Arc<Mutex<HashSet<RequestKey>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key`, or returns `None` when an identical request is already running.
    ///
    /// Check and insert happen under one lock, before the caller reaches any `.await`.
    pub fn try_acquire(&self, key: RequestKey) -> Option<PendingGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(PendingGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds a key in the in-flight set until dropped.
#[derive(Debug)]
pub struct PendingGuard {
    keys: Arc<Mutex<HashSet<RequestKey>>>,
    key: RequestKey,
}

impl PendingGuard {
    pub fn key(&self) -> &RequestKey {
        &self.key
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ignores_object_key_order() {
        let a = RequestKey::new(
            Method::Get,
            "/api/problems",
            Some(&json!({ "page": 1, "filter": { "tag": "dp", "level": 2 } })),
            None,
        );
        let b = RequestKey::new(
            Method::Get,
            "/api/problems",
            Some(&json!({ "filter": { "level": 2, "tag": "dp" }, "page": 1 })),
            None,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_distinguishes_method_path_and_arrays() {
        let body = json!({ "ids": [1, 2] });
        let post = RequestKey::new(Method::Post, "/api/x", None, Some(&body));
        let put = RequestKey::new(Method::Put, "/api/x", None, Some(&body));
        let other = RequestKey::new(Method::Post, "/api/y", None, Some(&body));
        let reordered = RequestKey::new(Method::Post, "/api/x", None, Some(&json!({ "ids": [2, 1] })));
        assert_ne!(post, put);
        assert_ne!(post, other);
        assert_ne!(post, reordered);
        assert!(post.as_str().starts_with("post::/api/x::-::"));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let pending = PendingRequests::new();
        let key = RequestKey::new(Method::Get, "/api/auth/me", None, None);

        let guard = pending.try_acquire(key.clone()).expect("first acquire");
        assert!(pending.contains(&key));
        assert!(pending.try_acquire(key.clone()).is_none());

        drop(guard);
        assert!(pending.is_empty());
        assert!(pending.try_acquire(key).is_some());
    }
}
