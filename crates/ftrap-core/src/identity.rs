#![forbid(unsafe_code)]

//! Trap-instance identity.
//!
//! Engines distinguish concurrently mounted traps by an opaque token minted
//! once per trap. Identity is never reused within a process.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique trap identities.
static NEXT_TRAP_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique identity of one trap instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrapId(u64);

impl TrapId {
    /// Mint a fresh identity.
    #[must_use]
    pub fn mint() -> Self {
        Self(NEXT_TRAP_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric form, for structured log fields.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}
