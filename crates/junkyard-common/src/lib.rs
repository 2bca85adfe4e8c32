//! # Junkyard Common
//!
//! Common types, utilities, and shared abstractions for Junkyard Planet.
//!
//! This crate provides foundational types used across all Junkyard subsystems:
//! - World-space points and axis-aligned bounds
//! - Opaque physical-object handles and their allocator
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_center_of_union() {
        let a = Aabb::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(10.0, 10.0));
        let b = Aabb::new(WorldPoint::new(20.0, -10.0), WorldPoint::new(30.0, 0.0));
        let union = a.union(&b);

        assert_eq!(union.center(), WorldPoint::new(15.0, 0.0));
    }

    #[test]
    fn test_handle_allocation() {
        let mut alloc = HandleAllocator::new();
        let h1 = alloc.next_handle();
        let h2 = alloc.next_handle();
        assert_ne!(h1, h2);
        assert!(h1.is_valid());
        assert!(!ObjectHandle::NULL.is_valid());
    }

    #[test]
    fn test_world_error_converts() {
        let err: JunkyardError = WorldError::OutOfDomainChunk { index: -1, count: 100 }.into();
        assert!(err.to_string().contains("-1"));
    }
}
