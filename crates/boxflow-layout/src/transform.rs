//! The rectangle every scene node carries, and the write-set the solver
//! claims on it each tick.

use bitflags::bitflags;
use boxflow_core::Axis;
use glam::{Affine2, Vec2};
use indexmap::IndexMap;

use crate::tree::NodeId;

/// A node's rectangle relative to its container.
///
/// Coordinates are y-up. The node's reference point (`pivot`, normalized over
/// its own size) sits at `anchor` (normalized over the container's size)
/// displaced by `anchored_position`. `offset`, `rotation` and `scale` are
/// applied on top and are never touched by the layout passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectTransform {
    pub size: Vec2,
    pub anchor: Vec2,
    pub pivot: Vec2,
    pub anchored_position: Vec2,
    pub offset: Vec2,
    /// Rotation in degrees, counter-clockwise
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for RectTransform {
    fn default() -> Self {
        Self {
            size: Vec2::ZERO,
            anchor: Vec2::splat(0.5),
            pivot: Vec2::splat(0.5),
            anchored_position: Vec2::ZERO,
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl RectTransform {
    /// A centered rectangle of the given size.
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            ..Default::default()
        }
    }

    /// Set the size along one axis.
    pub fn set_size_along(&mut self, axis: Axis, value: f32) {
        self.size = axis.with(self.size, value);
    }

    /// Lower-left and upper-right corners in the node's own space.
    pub fn local_extent(&self) -> (Vec2, Vec2) {
        let min = -self.pivot * self.size;
        (min, min + self.size)
    }

    /// Transform from this node's space into its container's space.
    ///
    /// `container_pivot` is the container's own pivot; the container's space
    /// has its origin at that point.
    pub fn local_matrix(&self, container_size: Vec2, container_pivot: Vec2) -> Affine2 {
        let translation =
            (self.anchor - container_pivot) * container_size + self.anchored_position + self.offset;
        Affine2::from_scale_angle_translation(self.scale, self.rotation.to_radians(), translation)
    }
}

bitflags! {
    /// Transform properties the solver owns for the current tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrivenProperties: u8 {
        const SIZE_X = 1 << 0;
        const SIZE_Y = 1 << 1;
        const ANCHORED_POSITION = 1 << 2;
        const PIVOT = 1 << 3;
        const ANCHORS = 1 << 4;
        /// Everything placement writes on a child.
        const PLACEMENT = Self::ANCHORED_POSITION.bits()
            | Self::PIVOT.bits()
            | Self::ANCHORS.bits();
    }
}

impl DrivenProperties {
    /// The size flag for one axis.
    pub fn size(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::SIZE_X,
            Axis::Vertical => Self::SIZE_Y,
        }
    }
}

/// Per-owner record of claimed transform properties.
///
/// Owners clear their claims at the start of every tick and reassert them as
/// each pass writes.
#[derive(Debug, Clone, Default)]
pub struct DrivenTracker {
    claims: IndexMap<NodeId, DrivenProperties>,
}

impl DrivenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every claim.
    pub fn clear(&mut self) {
        self.claims.clear();
    }

    /// Claim `properties` on `target`, merging with earlier claims.
    pub fn add(&mut self, target: NodeId, properties: DrivenProperties) {
        *self.claims.entry(target).or_default() |= properties;
    }

    /// Properties claimed on `target`.
    pub fn claims(&self, target: NodeId) -> DrivenProperties {
        self.claims.get(&target).copied().unwrap_or_default()
    }

    /// All claims in the order they were first made.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, DrivenProperties)> + '_ {
        self.claims.iter().map(|(id, props)| (*id, *props))
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_extent_uses_pivot() {
        let mut rect = RectTransform::sized(100.0, 50.0);
        rect.pivot = Vec2::new(0.0, 1.0);
        let (min, max) = rect.local_extent();
        assert_eq!(min, Vec2::new(0.0, -50.0));
        assert_eq!(max, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_local_matrix_translation() {
        let mut rect = RectTransform::sized(10.0, 10.0);
        rect.anchor = Vec2::new(0.0, 1.0);
        rect.anchored_position = Vec2::new(5.0, -5.0);
        let m = rect.local_matrix(Vec2::new(200.0, 100.0), Vec2::splat(0.5));
        let origin = m.transform_point2(Vec2::ZERO);
        assert!((origin.x - -95.0).abs() < 0.001);
        assert!((origin.y - 45.0).abs() < 0.001);
    }

    #[test]
    fn test_tracker_merges_claims() {
        let mut tracker = DrivenTracker::new();
        let a = NodeId(1);
        tracker.add(a, DrivenProperties::SIZE_X);
        tracker.add(a, DrivenProperties::PLACEMENT);
        assert_eq!(
            tracker.claims(a),
            DrivenProperties::SIZE_X | DrivenProperties::PLACEMENT
        );
        assert!(tracker.claims(NodeId(2)).is_empty());

        tracker.clear();
        assert!(tracker.is_empty());
    }
}
