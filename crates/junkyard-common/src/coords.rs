//! World-space coordinate types.
//!
//! World Y grows downward (screen convention), so "up" is negative Y.

use serde::{Deserialize, Serialize};

/// A point in world space.
pub type WorldPoint = glam::DVec2;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: WorldPoint,
    /// Maximum corner
    pub max: WorldPoint,
}

impl Aabb {
    /// Creates a new AABB from two corners.
    #[must_use]
    pub fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Creates an AABB from a center and half-extents.
    #[must_use]
    pub fn from_center(center: WorldPoint, half_extent: WorldPoint) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    /// Smallest AABB containing every point, or `None` for an empty set.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = WorldPoint>,
    {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self { min: p, max: p }),
            Some(b) => Some(Self {
                min: b.min.min(p),
                max: b.max.max(p),
            }),
        })
    }

    /// Returns the center of the AABB.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        (self.min + self.max) * 0.5
    }

    /// Returns the width of the AABB.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the height of the AABB.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns the smallest AABB containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the AABB translated by a vector.
    #[must_use]
    pub fn translated(&self, offset: WorldPoint) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Checks if a point lies inside (inclusive).
    #[must_use]
    pub fn contains(&self, p: WorldPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Checks if two boxes overlap (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}
