//! Flexbox-style sizing and placement for a single box.
//!
//! These functions are the arithmetic of the three layout passes, free of
//! any scene bookkeeping. The scene gathers child sizes, calls in here, and
//! scatters the results back onto transforms.

use boxflow_core::{Alignment, Axis, Direction, Justification, Padding, SizingMode, SizingModes};
use glam::Vec2;

/// Rules a box lays out its children by.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutRules {
    /// Direction children are arranged in
    pub direction: Direction,
    /// How the box sizes itself on each axis
    pub sizing: SizingModes,
    /// Padding inside the box
    pub padding: Padding,
    /// Gap between consecutive children
    pub gap: f32,
    /// Distribution on the primary axis
    pub justify: Justification,
    /// Placement on the cross axis
    pub align: Alignment,
}

impl LayoutRules {
    /// A left-to-right row.
    pub fn row() -> Self {
        Self {
            direction: Direction::Row,
            ..Default::default()
        }
    }

    /// A top-to-bottom column.
    pub fn column() -> Self {
        Self {
            direction: Direction::Column,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_sizing(mut self, sizing: SizingModes) -> Self {
        self.sizing = sizing;
        self
    }

    /// Set the sizing mode on both axes.
    pub fn with_sizing_mode(mut self, mode: SizingMode) -> Self {
        self.sizing = SizingModes::both(mode);
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_justify(mut self, justify: Justification) -> Self {
        self.justify = justify;
        self
    }

    pub fn with_align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

/// What the fit pass needs to know about one child.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChildSize {
    /// Current (already settled) size
    pub size: Vec2,
    /// Sizing modes if the child is itself a box; anything else reports fixed
    pub sizing: SizingModes,
}

impl ChildSize {
    pub fn fixed(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            sizing: SizingModes::fixed(),
        }
    }

    pub fn growing(sizing: SizingModes, width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            sizing,
        }
    }
}

/// Result of the fit pass for one box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitResult {
    /// Content size in x/y, padding and gaps included, grow children excluded
    pub content: Vec2,
    /// Children growing along the box's primary axis
    pub grow_children: usize,
}

/// Where one child ends up.
///
/// `pivot` always equals `anchor`: the child's own reference point is the
/// same normalized corner or edge it is anchored to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub anchor: Vec2,
    pub pivot: Vec2,
    pub position: Vec2,
}

/// Compute content size and grow-child count from the children's sizes.
pub fn fit_content(rules: &LayoutRules, children: &[ChildSize]) -> FitResult {
    if children.is_empty() {
        return FitResult::default();
    }

    let primary_axis = rules.direction.primary_axis();
    let cross_axis = rules.direction.cross_axis();

    let mut primary = rules.gap * (children.len() - 1) as f32 + rules.padding.total(primary_axis);
    let mut max_cross = 0.0_f32;
    let mut grow_children = 0;

    for child in children {
        if child.sizing.grows(primary_axis) {
            grow_children += 1;
        } else {
            primary += primary_axis.of(child.size);
        }

        if !child.sizing.grows(cross_axis) {
            max_cross = max_cross.max(cross_axis.of(child.size));
        }
    }

    let cross = rules.padding.total(cross_axis) + max_cross;

    FitResult {
        content: primary_axis.compose(primary, cross),
        grow_children,
    }
}

/// One grow child's share of its parent's leftover primary space.
///
/// The divisor stays at the total grow-child count while `content_so_far`
/// includes the shares already handed out, so later siblings receive less
/// than earlier ones. Returns `None` when the parent has no grow children.
pub fn grow_share(available: f32, content_so_far: f32, grow_children: usize) -> Option<f32> {
    if grow_children == 0 {
        return None;
    }
    Some((available - content_so_far) / grow_children as f32)
}

/// Geometry of one axis as seen from inside a box.
///
/// The start side is the left edge for the horizontal axis and the top edge
/// for the vertical axis. `inward` is the sign of moving away from the start
/// side in y-up coordinates.
#[derive(Debug, Clone, Copy)]
struct AxisFrame {
    start_anchor: f32,
    inward: f32,
    lead: f32,
    trail: f32,
}

impl AxisFrame {
    fn new(axis: Axis, padding: &Padding) -> Self {
        let (lead, trail) = padding.along(axis);
        let (start_anchor, inward) = match axis {
            Axis::Horizontal => (0.0, 1.0),
            Axis::Vertical => (1.0, -1.0),
        };
        Self {
            start_anchor,
            inward,
            lead,
            trail,
        }
    }

    /// Child's start edge `distance` in from the start side.
    fn from_start(&self, distance: f32) -> (f32, f32) {
        (self.start_anchor, self.inward * distance)
    }

    /// Child's end edge `distance` in from the end side.
    fn from_end(&self, distance: f32) -> (f32, f32) {
        (1.0 - self.start_anchor, -self.inward * distance)
    }

    /// Child's center `distance` from the box center, towards the end side.
    fn from_center(&self, distance: f32) -> (f32, f32) {
        (0.5, self.inward * distance)
    }
}

/// Compute every child's anchor, pivot and position.
///
/// `size` is the box's resolved size, `content` its content size after the
/// grow pass, and `children` the children's final sizes in cache order.
pub fn place_children(
    rules: &LayoutRules,
    size: Vec2,
    content: Vec2,
    children: &[Vec2],
) -> Vec<Placement> {
    let primary_axis = rules.direction.primary_axis();
    let cross_axis = rules.direction.cross_axis();

    let primary = place_primary(rules, primary_axis, size, content, children);

    let cross_frame = AxisFrame::new(cross_axis, &rules.padding);
    let (cross_anchor, cross_position) = match rules.align {
        Alignment::Start => cross_frame.from_start(cross_frame.lead),
        Alignment::Center => cross_frame.from_center((cross_frame.lead - cross_frame.trail) / 2.0),
        Alignment::End => cross_frame.from_end(cross_frame.trail),
    };

    primary
        .into_iter()
        .map(|(anchor, position)| {
            let anchor = primary_axis.compose(anchor, cross_anchor);
            Placement {
                anchor,
                pivot: anchor,
                position: primary_axis.compose(position, cross_position),
            }
        })
        .collect()
}

fn place_primary(
    rules: &LayoutRules,
    axis: Axis,
    size: Vec2,
    content: Vec2,
    children: &[Vec2],
) -> Vec<(f32, f32)> {
    let frame = AxisFrame::new(axis, &rules.padding);
    let reverse = rules.direction.is_reverse();
    let n = children.len();
    let extent: Vec<f32> = children.iter().map(|c| axis.of(*c)).collect();
    let content = axis.of(content);

    // Children in geometric order from the start side.
    let visual: Vec<usize> = if reverse {
        (0..n).rev().collect()
    } else {
        (0..n).collect()
    };

    let mut out = vec![(0.0, 0.0); n];
    match rules.justify {
        Justification::Start => {
            let mut distance = frame.lead;
            for &i in &visual {
                out[i] = frame.from_start(distance);
                distance += extent[i] + rules.gap;
            }
        }
        Justification::End => {
            let mut before = 0.0;
            for &i in &visual {
                out[i] = frame.from_end(content - frame.lead - before - extent[i]);
                before += extent[i] + rules.gap;
            }
        }
        Justification::Center => {
            let mut before = 0.0;
            for &i in &visual {
                let center = -content / 2.0 + frame.lead + before + extent[i] / 2.0;
                out[i] = frame.from_center(center);
                before += extent[i] + rules.gap;
            }
        }
        Justification::SpaceBetween => {
            let spacing = if n > 1 {
                (axis.of(size) - (frame.lead + frame.trail) - content) / (n - 1) as f32
            } else {
                0.0
            };

            // Flows in cache order away from the side the first child sits on.
            let mut offset = if reverse { frame.trail } else { frame.lead };
            for (index, &along) in extent.iter().enumerate() {
                if index != 0 {
                    let gaps = (n - 1) as f32;
                    offset += frame.lead / gaps + frame.trail / gaps;
                }
                out[index] = if reverse {
                    frame.from_end(offset)
                } else {
                    frame.from_start(offset)
                };
                offset += along + spacing;
            }
        }
    }
    out
}
