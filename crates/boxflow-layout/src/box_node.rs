//! Box nodes: containers that size themselves and lay out their children.
//!
//! A box runs three passes per tick, each driven by its layout root:
//!
//! 1. **Fit**: content size from the children's settled sizes (deepest first)
//! 2. **Grow**: take a share of the parent's leftover space (shallowest first)
//! 3. **Place**: write each child's anchor, pivot and position (shallowest first)

use std::fmt;

use boxflow_core::{Axis, Direction, LayoutError, SizingMode, SizingModes};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::auto_layout::{fit_content, grow_share, place_children, ChildSize, LayoutRules};
use crate::transform::{DrivenProperties, DrivenTracker};
use crate::tree::{NodeId, Role, Scene, SceneNode};

/// Layout state of a box.
#[derive(Debug, Clone, Default)]
pub struct BoxNode {
    pub(crate) rules: LayoutRules,
    /// The layout root this box registers with; `None` if resolution failed
    pub(crate) root: Option<NodeId>,
    /// The parent node, if it is itself a box
    pub(crate) parent_box: Option<NodeId>,
    /// Hops from this node up to its root
    pub(crate) depth: usize,
    /// Participating children in hierarchy order
    pub(crate) children: SmallVec<[NodeId; 8]>,
    pub(crate) content_size: Vec2,
    pub(crate) grow_children: usize,
    pub(crate) refresh_cache: bool,
    pub(crate) tracker: DrivenTracker,
}

impl BoxNode {
    pub fn rules(&self) -> &LayoutRules {
        &self.rules
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn parent_box(&self) -> Option<NodeId> {
        self.parent_box
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The cached participating children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn content_size(&self) -> Vec2 {
        self.content_size
    }

    pub fn grow_child_count(&self) -> usize {
        self.grow_children
    }

    /// Properties this box claimed during the current tick.
    pub fn tracker(&self) -> &DrivenTracker {
        &self.tracker
    }
}

/// Read-only snapshot of a node for property panels.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub role: &'static str,
    pub child_count: usize,
    pub grow_child_count: usize,
    pub depth: Option<usize>,
    pub direction: Option<Direction>,
    pub sizing: SizingModes,
    /// Sizing fields are locked while the node ignores layout
    pub sizing_editable: bool,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracking {} layout elements.", self.child_count)?;
        if self.grow_child_count > 0 {
            write!(f, "\n({} grow)", self.grow_child_count)?;
        }
        Ok(())
    }
}

impl Scene {
    /// Make `id` a box laying out its children by `rules`.
    ///
    /// The nearest layout root is found by walking up from the node itself.
    /// If none is found the box stays attached but inert, and the error is
    /// returned.
    pub fn attach_box(&mut self, id: NodeId, rules: LayoutRules) -> Result<(), LayoutError> {
        let node = self.nodes.get(&id).ok_or(id.missing())?;
        if !matches!(node.role, Role::None) {
            return Err(LayoutError::RoleConflict {
                node: id.0,
                existing: node.role.name(),
            });
        }
        let parent_box = node.parent.filter(|p| self.is_box(*p));
        let children = node.children.clone();
        let resolved = self.find_root(id);

        let (root, depth) = match &resolved {
            Ok((root, depth)) => (Some(*root), *depth),
            Err(_) => (None, 0),
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.role = Role::Box(BoxNode {
                rules,
                root,
                parent_box,
                depth,
                ..Default::default()
            });
        }

        for child in children {
            match self.nodes.get_mut(&child).map(|n| &mut n.role) {
                Some(Role::Box(layout)) => layout.parent_box = Some(id),
                Some(Role::Item(item)) => item.parent_box = Some(id),
                _ => {}
            }
        }

        if let Err(err) = resolved {
            error!("{}. Aborting.", err);
            return Err(err);
        }

        if self.is_active_in_hierarchy(id) {
            self.enable_box(id);
        }
        Ok(())
    }

    pub(crate) fn is_box(&self, id: NodeId) -> bool {
        self.nodes.get(&id).and_then(SceneNode::as_box).is_some()
    }

    /// Find the nearest layout root at or above `id` and the hops to reach it.
    pub(crate) fn find_root(&self, id: NodeId) -> Result<(NodeId, usize), LayoutError> {
        let max_depth = self.options.max_depth;
        let mut current = id;
        let mut depth = 0;
        loop {
            let node = self.nodes.get(&current).ok_or(current.missing())?;
            if node.root.is_some() {
                return Ok((current, depth));
            }
            let Some(parent) = node.parent else {
                return Err(LayoutError::NoScheduler { node: id.0 });
            };
            current = parent;
            depth += 1;
            if depth > max_depth {
                return Err(LayoutError::MaxDepthExceeded {
                    node: id.0,
                    max_depth,
                });
            }
        }
    }

    pub(crate) fn enable_box(&mut self, id: NodeId) {
        let has_root = self
            .nodes
            .get(&id)
            .and_then(SceneNode::as_box)
            .is_some_and(|layout| layout.root.is_some());
        if has_root {
            // Registry failures are logged where they happen.
            let _ = self.register_node(id);
        }
        let _ = self.refresh_child_cache(id);
    }

    pub(crate) fn disable_box(&mut self, id: NodeId) {
        let has_root = self
            .nodes
            .get(&id)
            .and_then(SceneNode::as_box)
            .is_some_and(|layout| layout.root.is_some());
        if has_root {
            let _ = self.unregister_node(id);
        }
        // An unregistered box no longer ticks, so nothing would reassert these.
        if let Some(layout) = self.nodes.get_mut(&id).and_then(SceneNode::as_box_mut) {
            layout.tracker.clear();
        }
    }

    /// Rebuild a box's participating children from the live hierarchy.
    ///
    /// A no-op for nodes that are not boxes.
    pub fn refresh_child_cache(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.nodes.get(&id).ok_or(id.missing())?;
        if node.as_box().is_none() {
            return Ok(());
        }
        let children: SmallVec<[NodeId; 8]> = node
            .children
            .iter()
            .copied()
            .filter(|child| self.participates(*child))
            .collect();

        if let Some(layout) = self.nodes.get_mut(&id).and_then(SceneNode::as_box_mut) {
            layout.children = children;
        }
        Ok(())
    }

    fn participates(&self, id: NodeId) -> bool {
        self.is_active_in_hierarchy(id) && self.nodes.get(&id).is_some_and(|n| !n.ignore_layout)
    }

    /// Per-frame structural check.
    ///
    /// Refreshes the cache if the raw child count changed or a previous check
    /// flagged it, then flags it if any cached child has gone inactive.
    pub(crate) fn check_structure(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let Some(layout) = node.as_box() else {
            return;
        };

        if node.children.len() != layout.children.len() || layout.refresh_cache {
            let _ = self.refresh_child_cache(id);
            if let Some(layout) = self.nodes.get_mut(&id).and_then(SceneNode::as_box_mut) {
                layout.refresh_cache = false;
            }
        }

        let stale = self
            .nodes
            .get(&id)
            .and_then(SceneNode::as_box)
            .is_some_and(|layout| {
                layout
                    .children
                    .iter()
                    .any(|child| !self.is_active_in_hierarchy(*child))
            });
        if stale {
            if let Some(layout) = self.nodes.get_mut(&id).and_then(SceneNode::as_box_mut) {
                layout.refresh_cache = true;
            }
        }
    }

    /// Fit pass: recompute content size and resize fit-content axes to it.
    pub(crate) fn compute_fit_size(&mut self, id: NodeId) {
        let Some(layout) = self.nodes.get(&id).and_then(SceneNode::as_box) else {
            return;
        };
        let rules = layout.rules;
        let children: Vec<ChildSize> = layout
            .children
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .map(|child| ChildSize {
                size: child.transform.size,
                sizing: child
                    .as_box()
                    .map_or(SizingModes::fixed(), |b| b.rules.sizing),
            })
            .collect();

        let fit = fit_content(&rules, &children);
        if children.is_empty() {
            debug!("Box {} has no children, content size is zero", id.0);
        }

        let Some(SceneNode {
            transform,
            role: Role::Box(layout),
            ..
        }) = self.nodes.get_mut(&id)
        else {
            return;
        };
        layout.tracker.clear();
        layout.content_size = fit.content;
        layout.grow_children = fit.grow_children;

        for axis in [Axis::Horizontal, Axis::Vertical] {
            if rules.sizing.get(axis) == SizingMode::FitContent {
                layout.tracker.add(id, DrivenProperties::size(axis));
                if !children.is_empty() {
                    transform.set_size_along(axis, axis.of(fit.content));
                }
            }
        }
    }

    /// Grow pass: size grow axes from the parent's leftover space.
    pub(crate) fn compute_grow_size(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let Some(layout) = node.as_box() else {
            return;
        };
        let sizing = layout.rules.sizing;
        if !sizing.grows_any() {
            return;
        }

        let mut size = node.transform.size;
        let mut claimed_share = None;
        let parent = layout.parent_box.and_then(|p| {
            let parent = self.nodes.get(&p)?;
            Some((p, parent.transform.size, parent.as_box()?))
        });

        match parent {
            Some((parent_id, parent_size, parent)) => {
                let primary = parent.rules.direction.primary_axis();
                let cross = primary.other();
                if sizing.grows(primary) {
                    let available = primary.of(parent_size);
                    let so_far = primary.of(parent.content_size);
                    match grow_share(available, so_far, parent.grow_children) {
                        Some(share) => {
                            trace!("Box {} grows {:.2} along {:?}", id.0, share, primary);
                            size = primary.with(size, share);
                            claimed_share = Some((parent_id, primary, share));
                        }
                        None => warn!(
                            "Box {} grows along {:?} but parent {} counted no grow children",
                            id.0, primary, parent_id.0
                        ),
                    }
                }
                if sizing.grows(cross) {
                    let inner = cross.of(parent_size) - parent.rules.padding.total(cross);
                    size = cross.with(size, inner);
                }
            }
            None => {
                let container = self.container_size(id);
                for axis in [Axis::Horizontal, Axis::Vertical] {
                    if sizing.grows(axis) {
                        size = axis.with(size, axis.of(container));
                    }
                }
            }
        }

        if let Some((parent_id, axis, share)) = claimed_share {
            if let Some(parent) = self.nodes.get_mut(&parent_id).and_then(SceneNode::as_box_mut) {
                let grown = axis.of(parent.content_size) + share;
                parent.content_size = axis.with(parent.content_size, grown);
            }
        }

        let Some(SceneNode {
            transform,
            role: Role::Box(layout),
            ..
        }) = self.nodes.get_mut(&id)
        else {
            return;
        };
        for axis in [Axis::Horizontal, Axis::Vertical] {
            if sizing.grows(axis) {
                layout.tracker.add(id, DrivenProperties::size(axis));
                transform.set_size_along(axis, axis.of(size));
            }
        }
    }

    /// Placement pass: position every participating child.
    pub(crate) fn compute_layout(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let Some(layout) = node.as_box() else {
            return;
        };
        if layout.children.is_empty() {
            warn!("Box {} has no children, skipping layout", id.0);
            return;
        }

        let children = layout.children.clone();
        let sizes: Vec<Vec2> = children
            .iter()
            .map(|child| self.nodes.get(child).map_or(Vec2::ZERO, |n| n.transform.size))
            .collect();
        let placements = place_children(
            &layout.rules,
            node.transform.size,
            layout.content_size,
            &sizes,
        );

        for (child, placement) in children.iter().zip(placements) {
            if let Some(node) = self.nodes.get_mut(child) {
                node.transform.anchor = placement.anchor;
                node.transform.pivot = placement.pivot;
                node.transform.anchored_position = placement.position;
            }
        }
        if let Some(layout) = self.nodes.get_mut(&id).and_then(SceneNode::as_box_mut) {
            for child in children {
                layout.tracker.add(child, DrivenProperties::PLACEMENT);
            }
        }
    }

    /// Get a node's box state.
    pub fn box_node(&self, id: NodeId) -> Option<&BoxNode> {
        self.nodes.get(&id).and_then(SceneNode::as_box)
    }

    /// Mutable access to a box's rules; takes effect on the next tick.
    pub fn rules_mut(&mut self, id: NodeId) -> Option<&mut LayoutRules> {
        self.nodes
            .get_mut(&id)
            .and_then(SceneNode::as_box_mut)
            .map(|layout| &mut layout.rules)
    }

    pub fn child_count(&self, id: NodeId) -> Option<usize> {
        self.box_node(id).map(|layout| layout.children.len())
    }

    pub fn grow_child_count(&self, id: NodeId) -> Option<usize> {
        self.box_node(id).map(BoxNode::grow_child_count)
    }

    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.box_node(id).map(BoxNode::depth)
    }

    pub fn direction(&self, id: NodeId) -> Option<Direction> {
        self.box_node(id).map(|layout| layout.rules.direction)
    }

    pub fn sizing_mode(&self, id: NodeId) -> Option<SizingModes> {
        match self.nodes.get(&id).map(|n| &n.role) {
            Some(Role::Box(layout)) => Some(layout.rules.sizing),
            Some(Role::Item(item)) => Some(item.rules.sizing),
            _ => None,
        }
    }

    pub fn content_size(&self, id: NodeId) -> Option<Vec2> {
        self.box_node(id).map(BoxNode::content_size)
    }

    /// The participating children of a box.
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.box_node(id).map(BoxNode::children)
    }

    /// Snapshot a box or item for display.
    pub fn inspect(&self, id: NodeId) -> Option<Inspection> {
        let node = self.nodes.get(&id)?;
        let sizing_editable = !node.ignore_layout;
        match &node.role {
            Role::Box(layout) => Some(Inspection {
                role: node.role.name(),
                child_count: layout.children.len(),
                grow_child_count: layout.grow_children,
                depth: layout.root.map(|_| layout.depth),
                direction: Some(layout.rules.direction),
                sizing: layout.rules.sizing,
                sizing_editable,
            }),
            Role::Item(item) => Some(Inspection {
                role: node.role.name(),
                child_count: 0,
                grow_child_count: 0,
                depth: None,
                direction: None,
                sizing: item.rules.sizing,
                sizing_editable,
            }),
            Role::None => None,
        }
    }
}
