//! # FlexKit Layout
//!
//! Flexbox layout engine for FlexKit.
//! Implements the CSS Flexible Box Layout algorithm over a layout-box tree.
//!
//! ## Design Goals
//!
//! 1. **Flex layout**: Line breaking, flexible length resolution, main- and
//!    cross-axis placement, baselines
//! 2. **Writing modes**: Axis mapping for horizontal and vertical flows
//! 3. **Arena tree**: A container owns its children; the algorithm works
//!    through indices, never through long-lived references
//! 4. **Measure seam**: Child layout is reached only through the
//!    [`ChildLayout`] capability so the algorithm never depends on concrete
//!    child kinds

use flexkit_css::{ComputedStyle, Length};
use thiserror::Error;

pub mod axis;
pub mod flex;
pub mod order;

pub use axis::FlexFlow;
pub use flex::{intrinsic_inline_extents, layout_flex_container};
pub use order::OrderIterator;

/// Errors that can occur in layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Layout failed: {0}")]
    LayoutFailed(String),

    #[error("Not a flex container: {0}")]
    NotAFlexContainer(String),
}

/// A 2D rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Edge sizes (margin, padding, border).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Box dimensions including content, padding, border, and margin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    /// Content area.
    pub content: Rect,
    /// Padding.
    pub padding: EdgeSizes,
    /// Border.
    pub border: EdgeSizes,
    /// Margin.
    pub margin: EdgeSizes,
}

impl Dimensions {
    /// Get the padding box (content + padding).
    pub fn padding_box(&self) -> Rect {
        Rect {
            x: self.content.x - self.padding.left,
            y: self.content.y - self.padding.top,
            width: self.content.width + self.padding.horizontal(),
            height: self.content.height + self.padding.vertical(),
        }
    }

    /// Get the border box (content + padding + border).
    pub fn border_box(&self) -> Rect {
        let pb = self.padding_box();
        Rect {
            x: pb.x - self.border.left,
            y: pb.y - self.border.top,
            width: pb.width + self.border.horizontal(),
            height: pb.height + self.border.vertical(),
        }
    }

    /// Get the margin box (content + padding + border + margin).
    pub fn margin_box(&self) -> Rect {
        let bb = self.border_box();
        Rect {
            x: bb.x - self.margin.left,
            y: bb.y - self.margin.top,
            width: bb.width + self.margin.horizontal(),
            height: bb.height + self.margin.vertical(),
        }
    }
}

/// Type of layout box.
#[derive(Debug, Clone)]
pub enum BoxType {
    /// Block-level box.
    Block,
    /// Text run.
    Text(String),
}

/// A layout box in the layout tree.
///
/// The tree is an arena: a box owns its children in a contiguous vector and
/// the flex algorithm addresses them by index.
#[derive(Debug)]
pub struct LayoutBox {
    /// Box type.
    pub box_type: BoxType,
    /// Computed dimensions.
    pub dimensions: Dimensions,
    /// Computed style.
    pub style: ComputedStyle,
    /// Child boxes.
    pub children: Vec<LayoutBox>,
    /// First-line baseline, measured from the content-box top, set by this
    /// box's own layout. `None` when the box has no baseline of its own.
    pub baseline: Option<f32>,
    /// Static position `(main, cross)` recorded for out-of-flow children of
    /// a flex container, consumed by the absolute-positioning pass.
    pub static_position: Option<(f32, f32)>,
}

impl LayoutBox {
    /// Create a new layout box.
    pub fn new(box_type: BoxType, style: ComputedStyle) -> Self {
        Self {
            box_type,
            dimensions: Dimensions::default(),
            style,
            children: Vec::new(),
            baseline: None,
            static_position: None,
        }
    }

    /// The box's own first-line baseline, if it reported one.
    pub fn first_line_baseline(&self) -> Option<f32> {
        self.baseline
    }

    /// Perform layout within the given containing block.
    pub fn layout(&mut self, containing_block: &Dimensions) {
        if self.style.display.is_flex() {
            let mut child_layout = BlockChildLayout;
            // Display was checked above, so the container contract holds.
            let result = flex::layout_flex_container(self, containing_block, &mut child_layout);
            debug_assert!(result.is_ok());
        } else {
            let mut child_layout = BlockChildLayout;
            let constraints = ChildConstraints {
                containing_width: containing_block.content.width,
                containing_height: containing_block.content.height,
                override_content_width: None,
                override_content_height: None,
            };
            child_layout.layout(self, &constraints);
            self.dimensions.content.x = containing_block.content.x
                + self.dimensions.margin.left
                + self.dimensions.border.left
                + self.dimensions.padding.left;
            self.dimensions.content.y = containing_block.content.y
                + self.dimensions.margin.top
                + self.dimensions.border.top
                + self.dimensions.padding.top;
        }
    }

    /// Convert a Length to pixels against this box's font size.
    pub(crate) fn length_to_px(&self, length: Length, container_size: f32) -> f32 {
        let font_size = match self.style.font_size {
            Length::Px(px) => px,
            _ => 16.0,
        };
        length.to_px(font_size, 16.0, container_size)
    }
}

/// Sizing constraints handed to a child's own layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildConstraints {
    /// Width of the containing block's content box.
    pub containing_width: f32,
    /// Height of the containing block's content box.
    pub containing_height: f32,
    /// Content-box width imposed by the parent, overriding the child's own.
    pub override_content_width: Option<f32>,
    /// Content-box height imposed by the parent, overriding the child's own.
    pub override_content_height: Option<f32>,
}

/// Capability interface through which the flex algorithm measures and lays
/// out children. Implemented per concrete child renderer kind; the flex
/// algorithm depends only on this seam.
pub trait ChildLayout {
    /// Measure the child's intrinsic content extent along one physical axis
    /// (`horizontal` selects width vs. height) given the available extent.
    fn measure_intrinsic_extent(
        &mut self,
        child: &mut LayoutBox,
        horizontal: bool,
        available: f32,
    ) -> f32;

    /// Lay out the child, honoring any override content sizes, and leave its
    /// resulting content size, edges, and baseline on the box.
    fn layout(&mut self, child: &mut LayoutBox, constraints: &ChildConstraints);
}

/// Default [`ChildLayout`]: the simple block model. Width from style or the
/// containing block, height from style or stacked children, text runs
/// measured with approximate metrics.
pub struct BlockChildLayout;

/// Approximate text metrics (a production engine would shape the run).
fn measure_text(text: &str, font_size: f32) -> (f32, f32, f32) {
    let avg_char_width = font_size * 0.5;
    let width = text.chars().count() as f32 * avg_char_width;
    let ascent = font_size * 0.8;
    let descent = font_size * 0.2;
    (width, ascent, descent)
}

/// Resolve a box's margin, border and padding edges against the containing
/// block's width. `auto` margins resolve to zero here; flex layout tracks
/// them separately.
pub(crate) fn resolve_box_edges(
    child: &LayoutBox,
    containing_width: f32,
) -> (EdgeSizes, EdgeSizes, EdgeSizes) {
    let s = &child.style;
    let margin = EdgeSizes {
        top: child.length_to_px(s.margin_top, containing_width),
        right: child.length_to_px(s.margin_right, containing_width),
        bottom: child.length_to_px(s.margin_bottom, containing_width),
        left: child.length_to_px(s.margin_left, containing_width),
    };
    let border = EdgeSizes {
        top: child.length_to_px(s.border_top_width, containing_width),
        right: child.length_to_px(s.border_right_width, containing_width),
        bottom: child.length_to_px(s.border_bottom_width, containing_width),
        left: child.length_to_px(s.border_left_width, containing_width),
    };
    let padding = EdgeSizes {
        top: child.length_to_px(s.padding_top, containing_width),
        right: child.length_to_px(s.padding_right, containing_width),
        bottom: child.length_to_px(s.padding_bottom, containing_width),
        left: child.length_to_px(s.padding_left, containing_width),
    };
    (margin, border, padding)
}

impl ChildLayout for BlockChildLayout {
    fn measure_intrinsic_extent(
        &mut self,
        child: &mut LayoutBox,
        horizontal: bool,
        available: f32,
    ) -> f32 {
        // A definite own size wins.
        let own = if horizontal {
            child.style.width
        } else {
            child.style.height
        };
        if let Length::Px(px) = own {
            return px.max(0.0);
        }

        match &child.box_type {
            BoxType::Text(text) => {
                let font_size = match child.style.font_size {
                    Length::Px(px) => px,
                    _ => 16.0,
                };
                let (width, ascent, descent) = measure_text(text, font_size);
                if horizontal {
                    width.min(available)
                } else {
                    ascent + descent
                }
            }
            BoxType::Block => {
                // Content-derived: widest child / stacked heights.
                let mut extent = 0.0f32;
                for grandchild in &mut child.children {
                    let child_extent =
                        self.measure_intrinsic_extent(grandchild, horizontal, available);
                    if horizontal {
                        extent = extent.max(child_extent);
                    } else {
                        extent += child_extent;
                    }
                }
                extent
            }
        }
    }

    fn layout(&mut self, child: &mut LayoutBox, constraints: &ChildConstraints) {
        let (margin, border, padding) = resolve_box_edges(child, constraints.containing_width);
        child.dimensions.margin = margin;
        child.dimensions.border = border;
        child.dimensions.padding = padding;

        let content_width = match constraints.override_content_width {
            Some(w) => w.max(0.0),
            None => match child.style.width {
                Length::Auto => {
                    let consumed = margin.horizontal() + border.horizontal() + padding.horizontal();
                    (constraints.containing_width - consumed).max(0.0)
                }
                w => child.length_to_px(w, constraints.containing_width).max(0.0),
            },
        };
        child.dimensions.content.width = content_width;

        // Text runs set their own height and baseline; blocks stack children.
        let mut baseline = None;
        let content_height = match constraints.override_content_height {
            Some(h) => {
                if let BoxType::Text(text) = &child.box_type {
                    let font_size = match child.style.font_size {
                        Length::Px(px) => px,
                        _ => 16.0,
                    };
                    let (_, ascent, _) = measure_text(text, font_size);
                    baseline = Some(ascent);
                }
                h.max(0.0)
            }
            None => match (&child.box_type, child.style.height) {
                (BoxType::Text(text), _) => {
                    let font_size = match child.style.font_size {
                        Length::Px(px) => px,
                        _ => 16.0,
                    };
                    let (_, ascent, descent) = measure_text(text, font_size);
                    baseline = Some(ascent);
                    ascent + descent
                }
                (BoxType::Block, Length::Auto) => {
                    let mut cursor_y = 0.0;
                    for grandchild in &mut child.children {
                        let mut cb = Dimensions::default();
                        cb.content.width = content_width;
                        cb.content.y = cursor_y;
                        grandchild.layout(&cb);
                        cursor_y += grandchild.dimensions.margin_box().height;
                        if baseline.is_none() {
                            baseline = grandchild
                                .first_line_baseline()
                                .map(|b| grandchild.dimensions.content.y + b);
                        }
                    }
                    cursor_y
                }
                (BoxType::Block, h) => child
                    .length_to_px(h, constraints.containing_height)
                    .max(0.0),
            },
        };
        child.dimensions.content.height = content_height;
        child.baseline = baseline;
    }
}
