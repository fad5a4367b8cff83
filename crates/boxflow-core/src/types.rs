//! Core value types for layout rules.

use glam::Vec2;

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The x axis
    Horizontal,
    /// The y axis (positive is up)
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    pub fn other(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Read this axis' component of a vector.
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }

    /// Return `v` with this axis' component replaced.
    pub fn with(self, v: Vec2, value: f32) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::new(value, v.y),
            Axis::Vertical => Vec2::new(v.x, value),
        }
    }

    /// Build a vector from components along this axis and the other one.
    pub fn compose(self, along: f32, across: f32) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::new(along, across),
            Axis::Vertical => Vec2::new(across, along),
        }
    }
}

/// Direction in which a box arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Left to right
    #[default]
    Row,
    /// Top to bottom
    Column,
    /// Right to left
    RowReverse,
    /// Bottom to top
    ColumnReverse,
}

impl Direction {
    /// The axis children are arranged along.
    pub fn primary_axis(self) -> Axis {
        match self {
            Direction::Row | Direction::RowReverse => Axis::Horizontal,
            Direction::Column | Direction::ColumnReverse => Axis::Vertical,
        }
    }

    /// The axis perpendicular to the primary axis.
    pub fn cross_axis(self) -> Axis {
        self.primary_axis().other()
    }

    /// Whether children are placed in the opposite geometric order.
    pub fn is_reverse(self) -> bool {
        matches!(self, Direction::RowReverse | Direction::ColumnReverse)
    }
}

/// Distribution of children on the primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Justification {
    /// Pack children at the left (rows) or top (columns)
    #[default]
    Start,
    /// Center the packed block
    Center,
    /// Pack children at the right (rows) or bottom (columns)
    End,
    /// First and last child flush against the padding, the rest spread evenly
    SpaceBetween,
}

/// Placement of children on the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    /// Flush to the top (rows) or left (columns) padding edge
    #[default]
    Start,
    /// Centered between the padding edges
    Center,
    /// Flush to the bottom (rows) or right (columns) padding edge
    End,
}

/// How a node resolves its size along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizingMode {
    /// Derived from children plus padding and gaps
    #[default]
    FitContent,
    /// Left as authored
    Fixed,
    /// Expands into the space offered by the parent
    Grow,
}

/// Sizing mode for each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizingModes {
    pub x: SizingMode,
    pub y: SizingMode,
}

impl SizingModes {
    pub const fn new(x: SizingMode, y: SizingMode) -> Self {
        Self { x, y }
    }

    /// Same mode on both axes.
    pub const fn both(mode: SizingMode) -> Self {
        Self { x: mode, y: mode }
    }

    pub const fn fixed() -> Self {
        Self::both(SizingMode::Fixed)
    }

    pub const fn grow() -> Self {
        Self::both(SizingMode::Grow)
    }

    /// Mode on the given axis.
    pub fn get(&self, axis: Axis) -> SizingMode {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Whether the given axis grows.
    pub fn grows(&self, axis: Axis) -> bool {
        self.get(axis) == SizingMode::Grow
    }

    /// Whether any axis grows.
    pub fn grows_any(&self) -> bool {
        self.x == SizingMode::Grow || self.y == SizingMode::Grow
    }
}

/// Padding on all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Padding {
    /// Create uniform padding.
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    /// Create symmetric padding.
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            bottom: vertical,
            left: horizontal,
            right: horizontal,
        }
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical padding.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Leading and trailing padding along an axis.
    ///
    /// Leading is left for the horizontal axis and top for the vertical axis.
    pub fn along(&self, axis: Axis) -> (f32, f32) {
        match axis {
            Axis::Horizontal => (self.left, self.right),
            Axis::Vertical => (self.top, self.bottom),
        }
    }

    /// Total padding along an axis.
    pub fn total(&self, axis: Axis) -> f32 {
        let (before, after) = self.along(axis);
        before + after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_axes() {
        assert_eq!(Direction::Row.primary_axis(), Axis::Horizontal);
        assert_eq!(Direction::RowReverse.cross_axis(), Axis::Vertical);
        assert_eq!(Direction::ColumnReverse.primary_axis(), Axis::Vertical);
        assert!(Direction::ColumnReverse.is_reverse());
        assert!(!Direction::Column.is_reverse());
    }

    #[test]
    fn test_axis_components() {
        let v = Vec2::new(3.0, 7.0);
        assert_eq!(Axis::Horizontal.of(v), 3.0);
        assert_eq!(Axis::Vertical.with(v, 1.0), Vec2::new(3.0, 1.0));
        assert_eq!(Axis::Vertical.compose(10.0, 20.0), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_padding_along() {
        let padding = Padding { top: 1.0, bottom: 2.0, left: 3.0, right: 4.0 };
        assert_eq!(padding.along(Axis::Horizontal), (3.0, 4.0));
        assert_eq!(padding.along(Axis::Vertical), (1.0, 2.0));
        assert_eq!(padding.total(Axis::Vertical), 3.0);
    }

    #[test]
    fn test_sizing_modes() {
        let modes = SizingModes::new(SizingMode::Grow, SizingMode::Fixed);
        assert!(modes.grows(Axis::Horizontal));
        assert!(!modes.grows(Axis::Vertical));
        assert!(modes.grows_any());
        assert!(!SizingModes::default().grows_any());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_sizing_modes_from_json() {
        let modes: SizingModes = serde_json::from_str(r#"{"x":"Grow","y":"FitContent"}"#).unwrap();
        assert_eq!(modes, SizingModes::new(SizingMode::Grow, SizingMode::FitContent));
    }
}
