//! Cache Entry Module
//!
//! Defines the wrapper holding a cached value together with its timestamps and hit count.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single cached value plus metadata.
///
/// Entries are owned by their store. Callers only ever receive clones of `data`.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    /// The stored value
    pub data: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), always after `created_at`
    pub expires_at: u64,
    /// Number of successful reads through `get`
    pub hits: u64,
}

impl<T> Entry<T> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now.
    ///
    /// TTLs shorter than one millisecond are rounded up so that `expires_at > created_at`.
    /// TTLs too long to represent saturate at the far future.
    pub fn new(data: T, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        Self {
            data,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            hits: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry stays live up to and including its expiration millisecond and is
    /// expired once the current time is strictly past `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiration check against an explicit timestamp.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was created.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = Entry::new("test_value".to_string(), Duration::from_secs(60));

        assert_eq!(entry.data, "test_value");
        assert_eq!(entry.hits, 0);
        assert!(entry.expires_at > entry.created_at);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_still_expires_after_creation() {
        let entry = Entry::new(1u32, Duration::ZERO);
        assert_eq!(entry.expires_at, entry.created_at + 1);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = Entry::new("test_value", Duration::from_millis(100));

        assert!(!entry.is_expired());

        // Wait for expiration
        sleep(Duration::from_millis(150));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = Entry::new(1u32, Duration::from_secs(1 << 61));

        assert_eq!(entry.expires_at, u64::MAX);
        sleep(Duration::from_millis(20));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = Entry {
            data: "test",
            created_at: 1_000,
            expires_at: 2_000,
            hits: 0,
        };

        // Still live at the expiration instant, expired one millisecond after
        assert!(!entry.is_expired_at(2_000));
        assert!(entry.is_expired_at(2_001));
    }

    #[test]
    fn test_age_ms() {
        let entry = Entry {
            data: (),
            created_at: 1_000,
            expires_at: 5_000,
            hits: 0,
        };
        assert_eq!(entry.age_ms(1_750), 750);
        // Clock skew never underflows
        assert_eq!(entry.age_ms(500), 0);
    }
}
