//! Text measurement for text leaves.
//!
//! Measurement goes through the [`TextMeasure`] trait so a host with real font
//! metrics can plug in; [`EstimatedMeasure`] is a character-advance estimate
//! good enough for headless layout and tests.

use std::fmt::Debug;

use glam::Vec2;

/// Font settings a text leaf is measured with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    /// Font family
    pub font_family: String,
    /// Font size in scene units
    pub font_size: f32,
    /// Line height as a multiplier of the font size
    pub line_height: f32,
    /// Extra advance per character
    pub letter_spacing: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            line_height: 1.2,
            letter_spacing: 0.0,
        }
    }
}

impl TextStyle {
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }
}

/// Measured extent of a block of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    /// Width of the widest line
    pub width: f32,
    /// Sum of all line heights
    pub height: f32,
    /// Number of lines
    pub lines: u32,
}

impl TextMetrics {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Measures text for layout.
pub trait TextMeasure: Debug {
    /// Preferred size of `text`. With `max_width` set, words wrap onto new
    /// lines instead of overflowing it.
    fn measure(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMetrics;
}

/// Estimates glyph advances from the font size.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMeasure;

impl TextMeasure for EstimatedMeasure {
    fn measure(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMetrics {
        measure_text(text, style, max_width)
    }
}

/// Measure text by estimating every character at the same advance.
pub fn measure_text(text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMetrics {
    let line_height = style.font_size * style.line_height;
    if text.is_empty() {
        return TextMetrics {
            width: 0.0,
            height: line_height,
            lines: 1,
        };
    }

    let advance = style.font_size * 0.55 + style.letter_spacing;
    let lines: Vec<f32> = match max_width {
        Some(max_width) if max_width > 0.0 => wrap_lines(text, advance, max_width),
        _ => text
            .lines()
            .map(|line| line.chars().count() as f32 * advance)
            .collect(),
    };

    let count = lines.len().max(1) as u32;
    TextMetrics {
        width: lines.iter().copied().fold(0.0_f32, f32::max),
        height: count as f32 * line_height,
        lines: count,
    }
}

/// Greedy word wrap; returns the width of every line.
fn wrap_lines(text: &str, advance: f32, max_width: f32) -> Vec<f32> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = 0.0;
        for word in paragraph.split_whitespace() {
            let width = word.chars().count() as f32 * advance;
            if current == 0.0 {
                current = width;
            } else if current + advance + width <= max_width {
                current += advance + width;
            } else {
                lines.push(current);
                current = width;
            }
        }
        lines.push(current);
    }
    lines
}

/// Text carried by a text leaf.
#[derive(Debug)]
pub struct TextContent {
    pub text: String,
    pub style: TextStyle,
    /// Upper bound on the font size; zero disables it
    pub max_font_size: f32,
    measurer: Box<dyn TextMeasure>,
}

impl TextContent {
    /// Text measured with [`EstimatedMeasure`].
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            max_font_size: 0.0,
            measurer: Box::new(EstimatedMeasure),
        }
    }

    pub fn with_max_font_size(mut self, max_font_size: f32) -> Self {
        self.max_font_size = max_font_size.max(0.0);
        self
    }

    pub fn with_measurer(mut self, measurer: impl TextMeasure + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    /// Style actually measured with, font size clamped to `max_font_size`.
    pub fn effective_style(&self) -> TextStyle {
        let mut style = self.style.clone();
        if self.max_font_size > 0.0 {
            style.font_size = style.font_size.min(self.max_font_size);
        }
        style
    }

    /// Measure the text, wrapping at `wrap_width` if given.
    pub fn measure(&self, wrap_width: Option<f32>) -> TextMetrics {
        self.measurer
            .measure(&self.text, &self.effective_style(), wrap_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_text() {
        let style = TextStyle::default();
        let metrics = measure_text("", &style, None);
        assert_eq!(metrics.width, 0.0);
        assert_eq!(metrics.lines, 1);
        assert!((metrics.height - 19.2).abs() < 0.001);
    }

    #[test]
    fn test_measure_single_line() {
        let style = TextStyle::default().with_font_size(10.0).with_line_height(1.0);
        let metrics = measure_text("Hello", &style, None);
        assert!((metrics.width - 27.5).abs() < 0.001);
        assert_eq!(metrics.height, 10.0);
        assert_eq!(metrics.lines, 1);
    }

    #[test]
    fn test_measure_wrapped() {
        let style = TextStyle::default().with_font_size(10.0).with_line_height(1.0);
        // Each character is 5.5 wide; "aaaa" is 22, so two words plus a space overflow 40.
        let metrics = measure_text("aaaa bbbb cccc", &style, Some(40.0));
        assert_eq!(metrics.lines, 3);
        assert!((metrics.width - 22.0).abs() < 0.001);
        assert_eq!(metrics.height, 30.0);
    }

    #[test]
    fn test_explicit_newlines() {
        let style = TextStyle::default().with_font_size(10.0).with_line_height(1.0);
        let metrics = measure_text("ab\nabcd", &style, None);
        assert_eq!(metrics.lines, 2);
        assert!((metrics.width - 22.0).abs() < 0.001);
    }

    #[test]
    fn test_max_font_size_clamps() {
        let content = TextContent::new("x", TextStyle::default().with_font_size(40.0))
            .with_max_font_size(20.0);
        assert_eq!(content.effective_style().font_size, 20.0);

        let unclamped = TextContent::new("x", TextStyle::default().with_font_size(40.0));
        assert_eq!(unclamped.effective_style().font_size, 40.0);
    }

    #[derive(Debug)]
    struct FixedMeasure(Vec2);

    impl TextMeasure for FixedMeasure {
        fn measure(&self, _: &str, _: &TextStyle, _: Option<f32>) -> TextMetrics {
            TextMetrics {
                width: self.0.x,
                height: self.0.y,
                lines: 1,
            }
        }
    }

    #[test]
    fn test_custom_measurer() {
        let content = TextContent::new("anything", TextStyle::default())
            .with_measurer(FixedMeasure(Vec2::new(12.0, 34.0)));
        assert_eq!(content.measure(None).size(), Vec2::new(12.0, 34.0));
    }
}
