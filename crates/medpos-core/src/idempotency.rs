//! # Idempotency Guard
//!
//! Short-lived registry of request keys that blocks duplicate sale submissions
//! from retrying POS clients.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/sales  (Idempotency-Key: K)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  try_acquire(K)                                                        │
//! │       ├── K registered and younger than TTL → DuplicateRequest (409)   │
//! │       └── otherwise register K = now, continue                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN … COMMIT / ROLLBACK                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  K stays registered either way until the TTL passes                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are process-local. A restart forgets them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::types::SaleLineRequest;

/// Prefix marking keys derived by the server rather than sent by the client.
pub const FALLBACK_KEY_PREFIX: &str = "auto:";

// =============================================================================
// Store Trait
// =============================================================================

/// Key registry with time-based expiry.
///
/// Implementations must make [`IdempotencyStore::try_acquire`] atomic: two
/// concurrent calls with the same fresh key must not both succeed.
pub trait IdempotencyStore: Send + Sync {
    /// True if the key is registered and not yet expired.
    fn should_reject(&self, key: &str) -> bool;

    /// Registers the key with the current time, replacing any older entry.
    fn mark_in_flight(&self, key: &str);

    /// Check-and-set in one step. Returns false if the key is live.
    fn try_acquire(&self, key: &str) -> bool;

    /// Removes expired keys and returns how many were dropped.
    fn purge_expired(&self) -> usize;

    /// Number of registered keys, expired ones included until purged.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// `Mutex<HashMap>` store with a fixed TTL.
///
/// Expired keys are treated as absent on lookup; [`purge_expired`] reclaims
/// their memory and is driven by the engine's sweeper task.
///
/// [`purge_expired`]: IdempotencyStore::purge_expired
#[derive(Debug)]
pub struct InMemoryIdempotencyStore {
    entries: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl InMemoryIdempotencyStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // A panic while holding the lock leaves the map itself intact.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_live(&self, registered_at: &Instant, now: Instant) -> bool {
        now.duration_since(*registered_at) < self.ttl
    }
}

impl Default for InMemoryIdempotencyStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::DEFAULT_IDEMPOTENCY_TTL_SECS))
    }
}

impl IdempotencyStore for InMemoryIdempotencyStore {
    fn should_reject(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(at) if self.is_live(at, now) => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    fn mark_in_flight(&self, key: &str) {
        self.entries().insert(key.to_string(), Instant::now());
    }

    fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries();
        if let Some(at) = entries.get(key) {
            if self.is_live(at, now) {
                return false;
            }
        }
        entries.insert(key.to_string(), now);
        true
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, at| now.duration_since(*at) < self.ttl);
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

// =============================================================================
// Fallback Key
// =============================================================================

/// Derives a key for requests that did not send one.
///
/// Hashes the actor, the normalized lines and the timestamp truncated to the
/// second. Two identical submissions within the same second collide; retries
/// in a later second do not.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use medpos_core::idempotency::fallback_key;
/// use medpos_core::types::SaleLineRequest;
///
/// let lines = vec![SaleLineRequest {
///     item_id: "amox-500".to_string(),
///     quantity: 2,
///     unit_type: None,
///     unit_label: None,
///     unit_price_cents: None,
/// }];
/// let t = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
///
/// let key = fallback_key("user-1", &lines, t);
/// assert!(key.starts_with("auto:"));
/// assert_eq!(key, fallback_key("user-1", &lines, t));
/// assert_ne!(key, fallback_key("user-2", &lines, t));
/// ```
pub fn fallback_key(actor_id: &str, lines: &[SaleLineRequest], now: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hash_field(&mut hasher, Some(actor_id));
    for line in lines {
        hash_field(&mut hasher, Some(&line.item_id));
        hash_field(&mut hasher, Some(&line.quantity.to_string()));
        hash_field(&mut hasher, line.unit_type.as_deref());
        hash_field(&mut hasher, line.unit_label.as_deref());
        hash_field(&mut hasher, line.unit_price_cents.map(|p| p.to_string()).as_deref());
    }
    hash_field(&mut hasher, Some(&now.timestamp().to_string()));

    format!("{}{}", FALLBACK_KEY_PREFIX, hex::encode(hasher.finalize()))
}

/// Length-prefixed so no field value can spill into its neighbour.
/// An absent field hashes differently from an empty one.
fn hash_field(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update((v.len() as u64).to_le_bytes());
            hasher.update(v.as_bytes());
        }
        None => hasher.update(u64::MAX.to_le_bytes()),
    }
}
