//! Debug wireframes for selected nodes.

use boxflow_core::LayoutError;
use glam::Vec2;

use crate::tree::{corners, NodeId, Scene};

/// Side length of the marker drawn on each corner of a node.
pub const CORNER_MARKER_SIZE: f32 = 0.15;

/// What a gizmo outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoKind {
    /// Small box centered on one corner of the node
    CornerMarker,
    /// The node's rectangle inset by its padding
    PaddedInner,
}

/// Receives wireframe quads in surface space.
///
/// Corners arrive as bottom-left, top-left, top-right, bottom-right.
pub trait DebugDraw {
    fn draw_quad(&mut self, kind: GizmoKind, corners: [Vec2; 4]);
}

impl DebugDraw for Vec<(GizmoKind, [Vec2; 4])> {
    fn draw_quad(&mut self, kind: GizmoKind, corners: [Vec2; 4]) {
        self.push((kind, corners));
    }
}

impl Scene {
    /// Draw corner markers for `id` and, for a box, its padded inner rectangle.
    ///
    /// Has no effect on layout state.
    pub fn draw_gizmos(&self, id: NodeId, draw: &mut impl DebugDraw) -> Result<(), LayoutError> {
        let node = self.get(id).ok_or(id.missing())?;
        let matrix = self.world_matrix(id).ok_or(id.missing())?;
        let (min, max) = node.transform().local_extent();

        let half = Vec2::splat(CORNER_MARKER_SIZE / 2.0);
        for corner in corners(matrix, min, max) {
            let (lo, hi) = (corner - half, corner + half);
            draw.draw_quad(
                GizmoKind::CornerMarker,
                [lo, Vec2::new(lo.x, hi.y), hi, Vec2::new(hi.x, lo.y)],
            );
        }

        if let Some(layout) = self.box_node(id) {
            let padding = layout.rules().padding;
            let inner_min = min + Vec2::new(padding.left, padding.bottom);
            let inner_max = max - Vec2::new(padding.right, padding.top);
            draw.draw_quad(GizmoKind::PaddedInner, corners(matrix, inner_min, inner_max));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auto_layout::LayoutRules;
    use crate::root::RootOptions;
    use crate::transform::RectTransform;
    use crate::tree::{SceneNode, SceneOptions};
    use boxflow_core::Padding;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 0.001
    }

    #[test]
    fn test_gizmos_for_box() {
        let mut scene = Scene::new(SceneOptions::default().with_surface_size(100.0, 100.0));
        let id = scene.next_id();
        let mut rect = RectTransform::sized(40.0, 20.0);
        rect.anchor = Vec2::ZERO;
        rect.pivot = Vec2::ZERO;
        scene.add_root(SceneNode::new(id).with_transform(rect)).unwrap();
        scene.attach_root(id, RootOptions::default()).unwrap();
        scene
            .attach_box(
                id,
                LayoutRules::row().with_padding(Padding {
                    top: 1.0,
                    bottom: 2.0,
                    left: 3.0,
                    right: 4.0,
                }),
            )
            .unwrap();

        let mut quads = Vec::new();
        scene.draw_gizmos(id, &mut quads).unwrap();

        assert_eq!(quads.len(), 5);
        let markers: Vec<_> = quads
            .iter()
            .filter(|(kind, _)| *kind == GizmoKind::CornerMarker)
            .collect();
        assert_eq!(markers.len(), 4);
        assert!(approx(markers[0].1[0], Vec2::splat(-0.075)));

        let (kind, inner) = quads[4];
        assert_eq!(kind, GizmoKind::PaddedInner);
        assert!(approx(inner[0], Vec2::new(3.0, 2.0)));
        assert!(approx(inner[2], Vec2::new(36.0, 19.0)));
    }

    #[test]
    fn test_plain_node_only_has_markers() {
        let mut scene = Scene::default();
        let id = scene.next_id();
        scene.add_root(SceneNode::new(id).with_size(10.0, 10.0)).unwrap();

        let mut quads = Vec::new();
        scene.draw_gizmos(id, &mut quads).unwrap();
        assert_eq!(quads.len(), 4);
    }

    #[test]
    fn test_missing_node() {
        let scene = Scene::default();
        let mut quads = Vec::new();
        assert_eq!(
            scene.draw_gizmos(NodeId(3), &mut quads),
            Err(LayoutError::NodeNotFound { node: 3 })
        );
    }
}
