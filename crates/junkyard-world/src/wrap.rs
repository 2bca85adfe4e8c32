//! Cylindrical seam wrapping.
//!
//! Objects whose aggregate center leaves `[min_x, max_x]` are carried one
//! circumference across the seam (pulled inward by a small margin and lifted
//! slightly). Objects outside `[min_y, max_y]` are re-dropped just below
//! `min_y`: there is no far side of the planet vertically, so both overshoot
//! directions resolve to the same target.
//!
//! The margin is applied inward on both sides: an object at `min_x - d`
//! lands at `max_x - d - margin`, and one at `max_x + d` at
//! `min_x + d + margin`. Mirroring across the seam instead
//! (`max_x + d - margin`) would leave any object deeper than the margin past
//! the opposite edge, to be sent back on the next pass.

use junkyard_common::{ObjectHandle, WorldError, WorldPoint};
use tracing::{info, warn};

use crate::config::WorldConfig;
use crate::physics::PhysicsBackend;

/// Which edge an object crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeamCrossing {
    /// Left of `min_x`, sent to the max side
    BeyondMin,
    /// Right of `max_x`, sent to the min side
    BeyondMax,
}

/// A relocation applied to one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapMove {
    /// Object moved
    pub handle: ObjectHandle,
    /// Center before
    pub from: WorldPoint,
    /// Center after
    pub to: WorldPoint,
    /// Seam crossed, if any
    pub crossing: Option<SeamCrossing>,
    /// Whether Y was clamped
    pub clamped_y: bool,
}

/// Result of one wrap pass.
#[derive(Debug, Default)]
pub struct WrapReport {
    /// Objects that were relocated
    pub moved: Vec<WrapMove>,
    /// Objects that could not be positioned
    pub errors: Vec<WorldError>,
}

/// Keeps composite objects inside the planet bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapCoordinator {
    /// Left edge
    pub min_x: f64,
    /// Right edge
    pub max_x: f64,
    /// Top bound
    pub min_y: f64,
    /// Bottom bound
    pub max_y: f64,
    /// Inward margin after crossing
    pub margin: f64,
    /// Upward nudge after crossing
    pub lift: f64,
    /// Re-drop offset below `min_y`
    pub drop_offset: f64,
}

impl WrapCoordinator {
    /// Creates a coordinator from world configuration.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            min_x: config.planet_min_x(),
            max_x: config.planet_max_x(),
            min_y: config.planet_min_y,
            max_y: config.planet_max_y,
            margin: config.wrap_margin,
            lift: config.wrap_lift,
            drop_offset: config.clamp_drop_offset,
        }
    }

    /// Width of the X domain.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Where an object centered at `center` belongs, or `None` if it is in bounds.
    #[must_use]
    pub fn target(&self, center: WorldPoint) -> Option<(WorldPoint, Option<SeamCrossing>, bool)> {
        let mut to = center;
        let crossing = if center.x < self.min_x {
            to.x = center.x + self.span() - self.margin;
            to.y -= self.lift;
            Some(SeamCrossing::BeyondMin)
        } else if center.x > self.max_x {
            to.x = center.x - self.span() + self.margin;
            to.y -= self.lift;
            Some(SeamCrossing::BeyondMax)
        } else {
            None
        };

        let clamped_y = center.y < self.min_y || center.y > self.max_y;
        if clamped_y {
            to.y = self.min_y + self.drop_offset;
        }

        (crossing.is_some() || clamped_y).then_some((to, crossing, clamped_y))
    }

    /// Relocates every out-of-bounds object with one exact translation each.
    pub fn wrap(&self, physics: &mut dyn PhysicsBackend, objects: &[ObjectHandle]) -> WrapReport {
        let mut report = WrapReport::default();

        for &handle in objects {
            let Some(from) = physics.aggregate_position(handle) else {
                warn!("Cannot wrap {handle}: no aggregate center");
                report
                    .errors
                    .push(WorldError::MissingAggregateCenter { handle });
                continue;
            };
            let Some((to, crossing, clamped_y)) = self.target(from) else {
                continue;
            };
            if !physics.translate(handle, to - from) {
                report.errors.push(WorldError::UnknownHandle { handle });
                continue;
            }

            match crossing {
                Some(SeamCrossing::BeyondMin) => {
                    info!("{handle} beyond min x ({:.1}), sending to max", from.x);
                },
                Some(SeamCrossing::BeyondMax) => {
                    info!("{handle} beyond max x ({:.1}), sending to min", from.x);
                },
                None => {},
            }
            if clamped_y {
                info!("{handle} out of Y bounds ({:.1}), re-dropping", from.y);
            }

            report.moved.push(WrapMove {
                handle,
                from,
                to,
                crossing,
                clamped_y,
            });
        }

        report
    }
}
