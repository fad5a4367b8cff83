//! Scene tree data structures.
//!
//! The scene is an arena of rectangular nodes. Layout participants (roots,
//! boxes and items) are roles attached to nodes; they refer to each other by
//! [`NodeId`] only, and every cached relationship is rebuilt from the live
//! hierarchy rather than stored as authority.

use std::collections::HashMap;

use boxflow_core::LayoutError;
use glam::{Affine2, Vec2};

use crate::box_node::BoxNode;
use crate::item::LayoutItem;
use crate::root::LayoutRoot;
use crate::transform::{DrivenProperties, RectTransform};

/// Unique identifier for a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub(crate) fn missing(self) -> LayoutError {
        LayoutError::NodeNotFound { node: self.0 }
    }
}

/// Options for a scene.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneOptions {
    /// Size of the top-level surface that parentless nodes live on
    pub surface_size: Vec2,
    /// Maximum ancestor hops when looking for a node's layout root
    pub max_depth: usize,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            surface_size: Vec2::new(800.0, 600.0),
            max_depth: 100,
        }
    }
}

impl SceneOptions {
    pub fn with_surface_size(mut self, width: f32, height: f32) -> Self {
        self.surface_size = Vec2::new(width, height);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// The layout behavior attached to a node, if any.
#[derive(Debug, Default)]
pub enum Role {
    /// A plain rectangle; sized by whoever authored it
    #[default]
    None,
    /// A container laying out its children
    Box(BoxNode),
    /// A leaf with simple per-axis sizing
    Item(LayoutItem),
}

impl Role {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Role::None => "plain",
            Role::Box(_) => "box",
            Role::Item(_) => "item",
        }
    }
}

/// A node in the scene.
#[derive(Debug)]
pub struct SceneNode {
    /// Unique ID for this node
    pub id: NodeId,
    /// Optional name for debugging
    pub name: Option<String>,
    pub(crate) transform: RectTransform,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) active: bool,
    pub(crate) ignore_layout: bool,
    pub(crate) root: Option<LayoutRoot>,
    pub(crate) role: Role,
}

impl SceneNode {
    /// Create a new, active scene node.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            name: None,
            transform: RectTransform::default(),
            parent: None,
            children: Vec::new(),
            active: true,
            ignore_layout: false,
            root: None,
            role: Role::None,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the size.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.transform.size = Vec2::new(width, height);
        self
    }

    /// Set the whole transform.
    pub fn with_transform(mut self, transform: RectTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set whether the node starts active.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Exclude the node from its parent's layout.
    pub fn with_ignore_layout(mut self, ignore: bool) -> Self {
        self.ignore_layout = ignore;
        self
    }

    pub fn transform(&self) -> &RectTransform {
        &self.transform
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The node's own active flag, regardless of its ancestors.
    pub fn active_self(&self) -> bool {
        self.active
    }

    pub fn ignores_layout(&self) -> bool {
        self.ignore_layout
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn layout_root(&self) -> Option<&LayoutRoot> {
        self.root.as_ref()
    }

    pub(crate) fn as_box(&self) -> Option<&BoxNode> {
        match &self.role {
            Role::Box(layout) => Some(layout),
            _ => None,
        }
    }

    pub(crate) fn as_box_mut(&mut self) -> Option<&mut BoxNode> {
        match &mut self.role {
            Role::Box(layout) => Some(layout),
            _ => None,
        }
    }

    pub(crate) fn as_item(&self) -> Option<&LayoutItem> {
        match &self.role {
            Role::Item(item) => Some(item),
            _ => None,
        }
    }

    pub(crate) fn as_item_mut(&mut self) -> Option<&mut LayoutItem> {
        match &mut self.role {
            Role::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// The scene: every node, plus the layout roles attached to them.
#[derive(Debug)]
pub struct Scene {
    pub(crate) nodes: HashMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    next_id: u64,
    pub(crate) options: SceneOptions,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneOptions::default())
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new(options: SceneOptions) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            next_id: 0,
            options,
        }
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    /// Generate a new unique node ID.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a top-level node.
    pub fn add_root(&mut self, mut node: SceneNode) -> Result<NodeId, LayoutError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(LayoutError::DuplicateNode { node: id.0 });
        }
        node.parent = None;
        self.nodes.insert(id, node);
        self.roots.push(id);
        Ok(id)
    }

    /// Add a node as the last child of `parent_id`.
    ///
    /// A box parent picks the new child up at its next structural check.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        mut node: SceneNode,
    ) -> Result<NodeId, LayoutError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(LayoutError::DuplicateNode { node: id.0 });
        }
        let parent = self.nodes.get_mut(&parent_id).ok_or(parent_id.missing())?;
        parent.children.push(id);
        node.parent = Some(parent_id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node and its whole subtree, running deactivation hooks first.
    pub fn remove(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.set_active(id, false)?;
        let parent = self.nodes.get(&id).and_then(|n| n.parent);

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }

        match parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|c| *c != id);
                }
                self.refresh_child_cache(parent_id)
            }
            None => {
                self.roots.retain(|r| *r != id);
                Ok(())
            }
        }
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Get the top-level nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the transform of a node.
    pub fn transform(&self, id: NodeId) -> Option<&RectTransform> {
        self.nodes.get(&id).map(|n| &n.transform)
    }

    /// All node IDs in depth-first pre-order, top-level nodes in insertion order.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.walk_from(root, false, &mut out);
        }
        out
    }

    /// Active nodes of the subtree at `id` in pre-order, not descending into
    /// inactive nodes. Does not check `id`'s ancestors.
    pub(crate) fn active_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_from(id, true, &mut out);
        out
    }

    fn walk_from(&self, id: NodeId, active_only: bool, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if active_only && !node.active {
            return;
        }
        out.push(id);
        for &child in &node.children {
            self.walk_from(child, active_only, out);
        }
    }

    /// Whether the node and all of its ancestors are active.
    pub fn is_active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            match self.nodes.get(&next) {
                Some(node) if node.active => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Activate or deactivate a node, running enable/disable hooks on every
    /// node whose effective activity changes.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), LayoutError> {
        let node = self.nodes.get(&id).ok_or(id.missing())?;
        if node.active == active {
            return Ok(());
        }
        let parent_active = node.parent.map_or(true, |p| self.is_active_in_hierarchy(p));

        if active {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.active = true;
            }
            if parent_active {
                for affected in self.active_subtree(id) {
                    self.on_enable(affected);
                }
            }
        } else {
            let affected = if parent_active {
                self.active_subtree(id)
            } else {
                Vec::new()
            };
            if let Some(node) = self.nodes.get_mut(&id) {
                node.active = false;
            }
            for affected in affected {
                self.on_disable(affected);
            }
        }
        Ok(())
    }

    fn on_enable(&mut self, id: NodeId) {
        match self.nodes.get(&id).map(|n| &n.role) {
            Some(Role::Box(_)) => self.enable_box(id),
            Some(Role::Item(_)) => self.enable_item(id),
            _ => {}
        }
    }

    fn on_disable(&mut self, id: NodeId) {
        match self.nodes.get(&id).map(|n| &n.role) {
            Some(Role::Box(_)) => self.disable_box(id),
            Some(Role::Item(_)) => self.disable_item(id),
            _ => {}
        }
    }

    /// Include or exclude a node from its parent's layout.
    ///
    /// A box parent refreshes its child cache immediately.
    pub fn set_ignore_layout(&mut self, id: NodeId, ignore: bool) -> Result<(), LayoutError> {
        let node = self.nodes.get_mut(&id).ok_or(id.missing())?;
        node.ignore_layout = ignore;
        if let Some(parent) = node.parent {
            self.refresh_child_cache(parent)?;
        }
        Ok(())
    }

    /// Properties of `id`'s transform that layout currently drives.
    ///
    /// Size is claimed by the node itself, placement by its box parent.
    pub fn driven_properties(&self, id: NodeId) -> DrivenProperties {
        let Some(node) = self.nodes.get(&id) else {
            return DrivenProperties::empty();
        };
        let mut claims = match &node.role {
            Role::Box(layout) => layout.tracker.claims(id),
            Role::Item(item) => item.tracker.claims(id),
            Role::None => DrivenProperties::empty(),
        };
        let parent_box = node
            .parent
            .and_then(|p| self.nodes.get(&p))
            .and_then(SceneNode::as_box);
        if let Some(parent) = parent_box {
            claims |= parent.tracker.claims(id);
        }
        claims
    }

    fn authored(
        &mut self,
        id: NodeId,
        property: DrivenProperties,
        name: &'static str,
    ) -> Result<&mut RectTransform, LayoutError> {
        if !self.nodes.contains_key(&id) {
            return Err(id.missing());
        }
        if self.driven_properties(id).intersects(property) {
            tracing::warn!("Rejected write to {} of node {}: driven by layout", name, id.0);
            return Err(LayoutError::DrivenProperty {
                node: id.0,
                property: name,
            });
        }
        self.nodes
            .get_mut(&id)
            .map(|n| &mut n.transform)
            .ok_or(id.missing())
    }

    /// Author a node's size. Fails if layout drives either axis.
    pub fn set_size(&mut self, id: NodeId, size: Vec2) -> Result<(), LayoutError> {
        self.authored(id, DrivenProperties::SIZE_X | DrivenProperties::SIZE_Y, "size")?.size = size;
        Ok(())
    }

    /// Author a node's anchored position. Fails if its box parent places it.
    pub fn set_anchored_position(&mut self, id: NodeId, position: Vec2) -> Result<(), LayoutError> {
        self.authored(id, DrivenProperties::ANCHORED_POSITION, "anchored position")?
            .anchored_position = position;
        Ok(())
    }

    /// Author a node's anchor. Fails if its box parent places it.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Vec2) -> Result<(), LayoutError> {
        self.authored(id, DrivenProperties::ANCHORS, "anchors")?.anchor = anchor;
        Ok(())
    }

    /// Author a node's pivot. Fails if its box parent places it.
    pub fn set_pivot(&mut self, id: NodeId, pivot: Vec2) -> Result<(), LayoutError> {
        self.authored(id, DrivenProperties::PIVOT, "pivot")?.pivot = pivot;
        Ok(())
    }

    /// Size of the rectangle `id` lives in: its parent's, or the surface.
    pub fn container_size(&self, id: NodeId) -> Vec2 {
        self.nodes
            .get(&id)
            .and_then(|n| n.parent)
            .and_then(|p| self.nodes.get(&p))
            .map_or(self.options.surface_size, |p| p.transform.size)
    }

    /// Transform from a node's space into surface space.
    pub fn world_matrix(&self, id: NodeId) -> Option<Affine2> {
        let node = self.nodes.get(&id)?;
        let (parent_matrix, container_size, container_pivot) = match node.parent {
            Some(parent_id) => {
                let parent = self.nodes.get(&parent_id)?;
                (
                    self.world_matrix(parent_id)?,
                    parent.transform.size,
                    parent.transform.pivot,
                )
            }
            None => (Affine2::IDENTITY, self.options.surface_size, Vec2::ZERO),
        };
        Some(parent_matrix * node.transform.local_matrix(container_size, container_pivot))
    }

    /// Surface-space corners: bottom-left, top-left, top-right, bottom-right.
    pub fn world_corners(&self, id: NodeId) -> Option<[Vec2; 4]> {
        let node = self.nodes.get(&id)?;
        let matrix = self.world_matrix(id)?;
        let (min, max) = node.transform.local_extent();
        Some(corners(matrix, min, max))
    }
}

pub(crate) fn corners(matrix: Affine2, min: Vec2, max: Vec2) -> [Vec2; 4] {
    [
        matrix.transform_point2(min),
        matrix.transform_point2(Vec2::new(min.x, max.y)),
        matrix.transform_point2(max),
        matrix.transform_point2(Vec2::new(max.x, min.y)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 0.001
    }

    #[test]
    fn test_scene_tree() {
        let mut scene = Scene::default();

        let root_id = scene.next_id();
        scene.add_root(SceneNode::new(root_id).with_name("root").with_size(800.0, 600.0)).unwrap();

        let child_id = scene.next_id();
        scene
            .add_child(root_id, SceneNode::new(child_id).with_name("child"))
            .unwrap();

        assert_eq!(scene.roots(), &[root_id]);
        assert_eq!(scene.get(root_id).unwrap().children(), &[child_id]);
        assert_eq!(scene.get(child_id).unwrap().parent(), Some(root_id));
        assert_eq!(scene.container_size(child_id), Vec2::new(800.0, 600.0));
        assert_eq!(scene.container_size(root_id), scene.options().surface_size);
    }

    #[test]
    fn test_add_child_to_missing_parent() {
        let mut scene = Scene::default();
        let id = scene.next_id();
        let result = scene.add_child(NodeId(42), SceneNode::new(id));
        assert_eq!(result, Err(LayoutError::NodeNotFound { node: 42 }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut scene = Scene::default();
        let a = scene.next_id();
        scene.add_root(SceneNode::new(a).with_size(50.0, 50.0)).unwrap();
        let b = scene.next_id();
        scene.add_child(a, SceneNode::new(b)).unwrap();

        assert_eq!(
            scene.add_root(SceneNode::new(a)),
            Err(LayoutError::DuplicateNode { node: a.0 })
        );
        assert_eq!(
            scene.add_child(a, SceneNode::new(b)),
            Err(LayoutError::DuplicateNode { node: b.0 })
        );
        // Adding a node under itself would make a parent cycle.
        assert_eq!(
            scene.add_child(a, SceneNode::new(a)),
            Err(LayoutError::DuplicateNode { node: a.0 })
        );

        assert_eq!(scene.roots(), &[a]);
        assert_eq!(scene.get(a).unwrap().children(), &[b]);
        assert_eq!(scene.get(a).unwrap().transform().size, Vec2::new(50.0, 50.0));
        assert!(scene.is_active_in_hierarchy(b));
    }

    #[test]
    fn test_active_in_hierarchy() {
        let mut scene = Scene::default();
        let a = scene.next_id();
        scene.add_root(SceneNode::new(a)).unwrap();
        let b = scene.next_id();
        scene.add_child(a, SceneNode::new(b)).unwrap();
        let c = scene.next_id();
        scene.add_child(b, SceneNode::new(c)).unwrap();

        assert!(scene.is_active_in_hierarchy(c));
        scene.set_active(a, false).unwrap();
        assert!(!scene.is_active_in_hierarchy(c));
        assert!(scene.get(c).unwrap().active_self());
        scene.set_active(a, true).unwrap();
        assert!(scene.is_active_in_hierarchy(c));
    }

    #[test]
    fn test_remove_subtree() {
        let mut scene = Scene::default();
        let a = scene.next_id();
        scene.add_root(SceneNode::new(a)).unwrap();
        let b = scene.next_id();
        scene.add_child(a, SceneNode::new(b)).unwrap();
        let c = scene.next_id();
        scene.add_child(b, SceneNode::new(c)).unwrap();

        scene.remove(b).unwrap();

        assert_eq!(scene.len(), 1);
        assert!(scene.get(a).unwrap().children().is_empty());
    }

    #[test]
    fn test_world_corners() {
        let mut scene = Scene::new(SceneOptions::default().with_surface_size(200.0, 100.0));
        let root_id = scene.next_id();
        let mut root = RectTransform::sized(200.0, 100.0);
        root.anchor = Vec2::ZERO;
        root.pivot = Vec2::ZERO;
        scene.add_root(SceneNode::new(root_id).with_transform(root)).unwrap();

        let child_id = scene.next_id();
        let mut child = RectTransform::sized(20.0, 10.0);
        child.anchor = Vec2::new(0.0, 1.0);
        child.pivot = Vec2::new(0.0, 1.0);
        child.anchored_position = Vec2::new(5.0, -5.0);
        scene
            .add_child(root_id, SceneNode::new(child_id).with_transform(child))
            .unwrap();

        let [bl, tl, tr, br] = scene.world_corners(child_id).unwrap();
        assert!(approx(tl, Vec2::new(5.0, 95.0)));
        assert!(approx(bl, Vec2::new(5.0, 85.0)));
        assert!(approx(tr, Vec2::new(25.0, 95.0)));
        assert!(approx(br, Vec2::new(25.0, 85.0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_from_json() {
        let options: SceneOptions =
            serde_json::from_str(r#"{"surface_size":[320.0,240.0],"max_depth":8}"#).unwrap();
        assert_eq!(options.surface_size, Vec2::new(320.0, 240.0));
        assert_eq!(options.max_depth, 8);
    }

    #[test]
    fn test_world_corners_follow_offset_and_scale() {
        let mut scene = Scene::new(SceneOptions::default().with_surface_size(100.0, 100.0));
        let id = scene.next_id();
        let mut rect = RectTransform::sized(10.0, 10.0);
        rect.anchor = Vec2::ZERO;
        rect.pivot = Vec2::ZERO;
        rect.offset = Vec2::new(3.0, 4.0);
        rect.scale = Vec2::splat(2.0);
        scene.add_root(SceneNode::new(id).with_transform(rect)).unwrap();

        let [bl, _, tr, _] = scene.world_corners(id).unwrap();
        assert!(approx(bl, Vec2::new(3.0, 4.0)));
        assert!(approx(tr, Vec2::new(23.0, 24.0)));
    }
}
