//! Depth-scheduled flexbox layout for retained scene trees.
//!
//! A [`Scene`] is an arena of rectangular nodes. Nodes gain layout behavior by
//! attaching a role:
//!
//! - **Layout root**: schedules and throttles the passes for the boxes below it
//! - **Box**: sizes itself from its children and lays them out
//! - **Item**: a leaf with per-axis sizing, optionally measured from text
//!
//! # Architecture
//!
//! 1. **Update**: roots poll their tick timers, boxes check whether their
//!    child lists changed, items refresh their own size
//! 2. **Late update**: every due root runs the fit pass deepest-first, then
//!    the grow and placement passes shallowest-first
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use boxflow_layout::{LayoutRules, RootOptions, Scene, SceneNode};
//!
//! let mut scene = Scene::default();
//! let root = scene.next_id();
//! scene.add_root(SceneNode::new(root).with_size(400.0, 300.0))?;
//! scene.attach_root(root, RootOptions::default())?;
//!
//! let row = scene.next_id();
//! scene.add_child(root, SceneNode::new(row))?;
//! scene.attach_box(row, LayoutRules::row().with_gap(5.0))?;
//!
//! for (width, height) in [(10.0, 10.0), (20.0, 10.0)] {
//!     let id = scene.next_id();
//!     scene.add_child(row, SceneNode::new(id).with_size(width, height))?;
//! }
//!
//! scene.frame(Duration::ZERO);
//! assert_eq!(scene.transform(row).unwrap().size.x, 35.0);
//! # Ok::<(), boxflow_layout::LayoutError>(())
//! ```

pub mod auto_layout;
mod box_node;
mod debug;
mod item;
mod registry;
mod root;
mod text;
mod transform;
mod tree;

pub use auto_layout::{
    fit_content, grow_share, place_children, ChildSize, FitResult, LayoutRules, Placement,
};
pub use box_node::{BoxNode, Inspection};
pub use debug::{DebugDraw, GizmoKind, CORNER_MARKER_SIZE};
pub use item::{ItemRules, LayoutItem};
pub use registry::DepthRegistry;
pub use root::{LayoutRoot, PassTrace, RootOptions};
pub use text::{measure_text, EstimatedMeasure, TextContent, TextMeasure, TextMetrics, TextStyle};
pub use transform::{DrivenProperties, DrivenTracker, RectTransform};
pub use tree::{NodeId, Role, Scene, SceneNode, SceneOptions};

pub use boxflow_core::{
    Alignment, Axis, Direction, Justification, LayoutError, Padding, SizingMode, SizingModes,
};
