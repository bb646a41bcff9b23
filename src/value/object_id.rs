//! A MongoDB/LiteDB-shaped 12-byte object identifier.
//!
//! The expression language treats `ObjectId` as an opaque, orderable,
//! bytewise-comparable value (§6.3 places it between `Binary` and `Guid`
//! in the total order). Generation borrows the crate's existing `uuid`
//! dependency as its source of randomness rather than pulling in a
//! dedicated id-generation crate for five bytes of entropy.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A 12-byte identifier: 4-byte Unix timestamp, 5 random bytes fixed at
/// process start, 3-byte monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn new() -> Self {
        let timestamp = chrono::Utc::now().timestamp() as u32;
        let random = process_random();
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&random);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

fn process_random() -> [u8; 5] {
    let uuid = Uuid::new_v4();
    let mut out = [0u8; 5];
    out.copy_from_slice(&uuid.as_bytes()[0..5]);
    out
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_24_hex_chars() {
        let id = ObjectId::from_bytes([0u8; 12]);
        assert_eq!(id.to_string(), "0".repeat(24));
    }

    #[test]
    fn ordering_is_bytewise() {
        let a = ObjectId::from_bytes([0u8; 12]);
        let mut higher = [0u8; 12];
        higher[11] = 1;
        let b = ObjectId::from_bytes(higher);
        assert!(a < b);
    }
}
