//! ID types for physical objects.

use serde::{Deserialize, Serialize};

/// Opaque handle to an aggregate of physical shapes owned by the physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    /// Creates a handle from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid handle.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) handle.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out unique handles for one backend instance.
///
/// Each world owns its own allocator, so independent worlds never share state.
#[derive(Debug, Clone)]
pub struct HandleAllocator {
    next: u64,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator {
    /// Creates an allocator whose first handle is `#1`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns a fresh handle.
    pub fn next_handle(&mut self) -> ObjectHandle {
        let handle = ObjectHandle(self.next);
        self.next += 1;
        handle
    }

    /// Number of handles handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next - 1
    }
}
