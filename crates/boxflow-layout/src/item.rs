//! Leaf items: non-container participants, optionally carrying text.

use boxflow_core::{Axis, LayoutError, SizingMode, SizingModes};
use glam::Vec2;
use tracing::debug;

use crate::text::TextContent;
use crate::transform::{DrivenProperties, DrivenTracker};
use crate::tree::{NodeId, Role, Scene, SceneNode};

/// Rules for a leaf item.
///
/// `offset`, `rotation` and `scale` are copied onto the transform after
/// layout has settled on every refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRules {
    pub sizing: SizingModes,
    pub offset: Vec2,
    /// Degrees, counter-clockwise
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for ItemRules {
    fn default() -> Self {
        Self {
            sizing: SizingModes::default(),
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl ItemRules {
    pub fn with_sizing(mut self, sizing: SizingModes) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }
}

/// Layout state of a leaf item.
#[derive(Debug, Default)]
pub struct LayoutItem {
    pub(crate) rules: ItemRules,
    pub(crate) parent_box: Option<NodeId>,
    pub(crate) text: Option<TextContent>,
    pub(crate) tracker: DrivenTracker,
}

impl LayoutItem {
    pub fn rules(&self) -> &ItemRules {
        &self.rules
    }

    pub fn parent_box(&self) -> Option<NodeId> {
        self.parent_box
    }

    pub fn text(&self) -> Option<&TextContent> {
        self.text.as_ref()
    }

    pub fn tracker(&self) -> &DrivenTracker {
        &self.tracker
    }
}

impl Scene {
    /// Make `id` a leaf item.
    pub fn attach_item(&mut self, id: NodeId, rules: ItemRules) -> Result<(), LayoutError> {
        self.attach_leaf(id, rules, None)
    }

    /// Make `id` a leaf item sized by its text.
    pub fn attach_text(
        &mut self,
        id: NodeId,
        rules: ItemRules,
        text: TextContent,
    ) -> Result<(), LayoutError> {
        self.attach_leaf(id, rules, Some(text))
    }

    fn attach_leaf(
        &mut self,
        id: NodeId,
        rules: ItemRules,
        text: Option<TextContent>,
    ) -> Result<(), LayoutError> {
        let node = self.nodes.get_mut(&id).ok_or(id.missing())?;
        if !matches!(node.role, Role::None) {
            return Err(LayoutError::RoleConflict {
                node: id.0,
                existing: node.role.name(),
            });
        }
        node.role = Role::Item(LayoutItem {
            rules,
            text,
            ..Default::default()
        });
        if self.is_active_in_hierarchy(id) {
            self.enable_item(id);
        }
        Ok(())
    }

    pub(crate) fn enable_item(&mut self, id: NodeId) {
        let parent_box = self
            .nodes
            .get(&id)
            .and_then(|n| n.parent)
            .filter(|p| self.is_box(*p));
        if let Some(item) = self.nodes.get_mut(&id).and_then(SceneNode::as_item_mut) {
            item.parent_box = parent_box;
        }
        if let Some(parent) = parent_box {
            let _ = self.refresh_child_cache(parent);
        }
    }

    pub(crate) fn disable_item(&mut self, id: NodeId) {
        let parent_box = self
            .nodes
            .get(&id)
            .and_then(SceneNode::as_item)
            .and_then(|item| item.parent_box);
        if let Some(item) = self.nodes.get_mut(&id).and_then(SceneNode::as_item_mut) {
            item.tracker.clear();
        }
        if let Some(parent) = parent_box {
            let _ = self.refresh_child_cache(parent);
        }
    }

    /// Per-frame refresh: grow without a box parent, measure text, then apply
    /// the static transform.
    pub(crate) fn refresh_item(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let Some(item) = node.as_item() else {
            return;
        };
        let rules = item.rules;
        let mut size = node.transform.size;
        let mut claims = DrivenProperties::empty();

        if !item.parent_box.is_some_and(|p| self.is_box(p)) {
            let container = self.container_size(id);
            for axis in [Axis::Horizontal, Axis::Vertical] {
                if rules.sizing.grows(axis) {
                    size = axis.with(size, axis.of(container));
                    claims |= DrivenProperties::size(axis);
                }
            }
        }

        if let Some(text) = &item.text {
            let wrap_width = rules.sizing.grows(Axis::Horizontal).then_some(size.x);
            let measured = text.measure(wrap_width).size();
            for axis in [Axis::Horizontal, Axis::Vertical] {
                if rules.sizing.get(axis) == SizingMode::FitContent {
                    size = axis.with(size, axis.of(measured));
                    claims |= DrivenProperties::size(axis);
                }
            }
        }

        let Some(SceneNode {
            transform,
            role: Role::Item(item),
            ..
        }) = self.nodes.get_mut(&id)
        else {
            return;
        };
        transform.size = size;
        transform.offset = rules.offset;
        transform.rotation = rules.rotation;
        transform.scale = rules.scale;

        item.tracker.clear();
        if !claims.is_empty() {
            item.tracker.add(id, claims);
        }
    }

    /// Get a node's item state.
    pub fn item(&self, id: NodeId) -> Option<&LayoutItem> {
        self.nodes.get(&id).and_then(SceneNode::as_item)
    }

    /// Mutable access to an item's rules; takes effect on the next update.
    pub fn item_rules_mut(&mut self, id: NodeId) -> Option<&mut ItemRules> {
        self.nodes
            .get_mut(&id)
            .and_then(SceneNode::as_item_mut)
            .map(|item| &mut item.rules)
    }

    /// Mutable access to a text leaf's content.
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut TextContent> {
        let text = self
            .nodes
            .get_mut(&id)
            .and_then(SceneNode::as_item_mut)
            .and_then(|item| item.text.as_mut());
        if text.is_none() {
            debug!("Node {} carries no text", id.0);
        }
        text
    }
}
