//! Viewport focus and zoom.

use junkyard_common::{Aabb, WorldPoint};

use crate::physics::CameraFrame;

/// Minimum viewport scale (zoomed in).
pub const MIN_SCALE: f64 = 0.2;

/// Maximum viewport scale (zoomed out).
pub const MAX_SCALE: f64 = 1000.0;

/// Tracks the focus point and the half-extent framed around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Point the camera is centered on
    focus: WorldPoint,
    /// Zoom multiplier
    scale: f64,
    /// Half of the viewport size at scale 1.0
    base_half_extent: WorldPoint,
    /// Current half-extent
    half_extent: WorldPoint,
}

impl Viewport {
    /// Creates a viewport for a full `base_extent` at scale 1.0, focused on
    /// its own center.
    #[must_use]
    pub fn new(base_extent: (f64, f64)) -> Self {
        let base_half_extent = WorldPoint::new(base_extent.0, base_extent.1) / 2.0;
        Self {
            focus: base_half_extent,
            scale: 1.0,
            base_half_extent,
            half_extent: base_half_extent,
        }
    }

    /// Current focus point.
    #[must_use]
    pub const fn focus(&self) -> WorldPoint {
        self.focus
    }

    /// Current scale.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Current half-extent.
    #[must_use]
    pub const fn half_extent(&self) -> WorldPoint {
        self.half_extent
    }

    /// Region framed around `point` at the current scale.
    #[must_use]
    pub fn frame_around(&self, point: WorldPoint) -> Aabb {
        Aabb::from_center(point, self.half_extent)
    }

    /// Sets the scale, clamped to `[MIN_SCALE, MAX_SCALE]`, and returns it.
    ///
    /// Does not reframe the camera or stream terrain.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        self.scale = if scale.is_nan() {
            1.0
        } else {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        };
        self.half_extent = self.base_half_extent * self.scale;
        self.scale
    }

    /// Frames the camera on `point` without moving the focus.
    pub fn look_at(&self, point: WorldPoint, camera: &mut dyn CameraFrame) {
        let frame = self.frame_around(point);
        camera.frame(frame.min, frame.max);
    }

    /// Moves the focus to `point` and frames the camera on it.
    pub fn set_focus(&mut self, point: WorldPoint, camera: &mut dyn CameraFrame) {
        self.focus = point;
        self.look_at(point, camera);
    }
}

/// Camera that records every frame request.
#[derive(Debug, Clone, Default)]
pub struct RecordingCamera {
    /// Frames in request order
    pub frames: Vec<Aabb>,
}

impl CameraFrame for RecordingCamera {
    fn frame(&mut self, min: WorldPoint, max: WorldPoint) {
        self.frames.push(Aabb::new(min, max));
    }
}
