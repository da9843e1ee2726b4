//! Main/cross axis resolution for flex containers.
//!
//! Maps the abstract main and cross axes onto physical width/height and
//! left/top coordinates, given flex-direction, writing-mode and text
//! direction. Every other phase of the flex algorithm consults this mapping
//! instead of touching physical fields directly.

use flexkit_css::{ComputedStyle, Direction, FlexDirection, WritingMode};

use crate::{Dimensions, EdgeSizes};

/// Resolved flow for one flex container, fixed for the whole layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexFlow {
    direction: FlexDirection,
    writing_mode: WritingMode,
    text_direction: Direction,
}

impl FlexFlow {
    /// Build the flow from a container's computed style.
    pub fn from_style(style: &ComputedStyle) -> Self {
        Self {
            direction: style.flex_direction,
            writing_mode: style.writing_mode,
            text_direction: style.direction,
        }
    }

    pub fn direction(&self) -> FlexDirection {
        self.direction
    }

    pub fn text_direction(&self) -> Direction {
        self.text_direction
    }

    /// True for `column`/`column-reverse`.
    pub fn is_column_flow(&self) -> bool {
        self.direction.is_column()
    }

    /// True when the main axis is physically horizontal.
    ///
    /// A row container in a horizontal document flows horizontally, but so
    /// does a column container in a vertical writing mode: the block axis of
    /// `vertical-rl`/`vertical-lr` is horizontal, so the axes rotate again.
    pub fn is_horizontal_flow(&self) -> bool {
        if self.writing_mode.is_horizontal() {
            !self.is_column_flow()
        } else {
            self.is_column_flow()
        }
    }

    /// True when the main axis runs in the direction of increasing physical
    /// coordinates (left-to-right or top-to-bottom).
    ///
    /// Rows follow the text direction, flipped by `row-reverse`. Columns
    /// follow the writing mode's block progression; `column-reverse` is not
    /// folded in here — it is handled by a dedicated second placement pass
    /// once the container's main extent is known.
    pub fn is_left_to_right_flow(&self) -> bool {
        if self.is_column_flow() {
            matches!(
                self.writing_mode,
                WritingMode::HorizontalTb | WritingMode::VerticalLr
            )
        } else {
            (self.text_direction == Direction::Ltr)
                != (self.direction == FlexDirection::RowReverse)
        }
    }

    /// Whether main-axis placement must mirror coordinates. Column flows are
    /// never mirrored here (see [`Self::is_left_to_right_flow`]).
    pub fn should_flip_main_axis(&self) -> bool {
        !self.is_column_flow() && !self.is_left_to_right_flow()
    }

    // ==================== Extent / position accessors ====================

    /// Content-box extent along the main axis.
    pub fn main_extent(&self, d: &Dimensions) -> f32 {
        if self.is_horizontal_flow() {
            d.content.width
        } else {
            d.content.height
        }
    }

    /// Content-box extent along the cross axis.
    pub fn cross_extent(&self, d: &Dimensions) -> f32 {
        if self.is_horizontal_flow() {
            d.content.height
        } else {
            d.content.width
        }
    }

    pub fn set_main_extent(&self, d: &mut Dimensions, extent: f32) {
        if self.is_horizontal_flow() {
            d.content.width = extent;
        } else {
            d.content.height = extent;
        }
    }

    pub fn set_cross_extent(&self, d: &mut Dimensions, extent: f32) {
        if self.is_horizontal_flow() {
            d.content.height = extent;
        } else {
            d.content.width = extent;
        }
    }

    /// Content-box position along the main axis.
    pub fn main_position(&self, d: &Dimensions) -> f32 {
        if self.is_horizontal_flow() {
            d.content.x
        } else {
            d.content.y
        }
    }

    /// Content-box position along the cross axis.
    pub fn cross_position(&self, d: &Dimensions) -> f32 {
        if self.is_horizontal_flow() {
            d.content.y
        } else {
            d.content.x
        }
    }

    pub fn set_main_position(&self, d: &mut Dimensions, position: f32) {
        if self.is_horizontal_flow() {
            d.content.x = position;
        } else {
            d.content.y = position;
        }
    }

    pub fn set_cross_position(&self, d: &mut Dimensions, position: f32) {
        if self.is_horizontal_flow() {
            d.content.y = position;
        } else {
            d.content.x = position;
        }
    }

    // ==================== Flow-aware edges ====================

    /// Edge pair `(start, end)` along the main axis, in physical order
    /// (left/right for horizontal main axis, top/bottom otherwise).
    pub fn main_edges(&self, e: &EdgeSizes) -> (f32, f32) {
        if self.is_horizontal_flow() {
            (e.left, e.right)
        } else {
            (e.top, e.bottom)
        }
    }

    /// Edge pair `(start, end)` along the cross axis.
    pub fn cross_edges(&self, e: &EdgeSizes) -> (f32, f32) {
        if self.is_horizontal_flow() {
            (e.top, e.bottom)
        } else {
            (e.left, e.right)
        }
    }

    /// Sum of both edges along the main axis.
    pub fn main_edge_sum(&self, e: &EdgeSizes) -> f32 {
        if self.is_horizontal_flow() {
            e.horizontal()
        } else {
            e.vertical()
        }
    }

    /// Sum of both edges along the cross axis.
    pub fn cross_edge_sum(&self, e: &EdgeSizes) -> f32 {
        if self.is_horizontal_flow() {
            e.vertical()
        } else {
            e.horizontal()
        }
    }

    /// Set a margin edge pair `(start, end)` along the main axis.
    pub fn set_main_margins(&self, e: &mut EdgeSizes, start: f32, end: f32) {
        if self.is_horizontal_flow() {
            e.left = start;
            e.right = end;
        } else {
            e.top = start;
            e.bottom = end;
        }
    }

    /// Set a margin edge pair `(start, end)` along the cross axis.
    pub fn set_cross_margins(&self, e: &mut EdgeSizes, start: f32, end: f32) {
        if self.is_horizontal_flow() {
            e.top = start;
            e.bottom = end;
        } else {
            e.left = start;
            e.right = end;
        }
    }

    /// Whether an item's main-axis margins `(start, end)` are `auto`, in the
    /// same physical order as [`Self::main_edges`].
    pub fn main_margins_auto(&self, style: &ComputedStyle) -> (bool, bool) {
        if self.is_horizontal_flow() {
            (style.margin_left.is_auto(), style.margin_right.is_auto())
        } else {
            (style.margin_top.is_auto(), style.margin_bottom.is_auto())
        }
    }

    /// Whether an item's cross-axis margins `(start, end)` are `auto`.
    pub fn cross_margins_auto(&self, style: &ComputedStyle) -> (bool, bool) {
        if self.is_horizontal_flow() {
            (style.margin_top.is_auto(), style.margin_bottom.is_auto())
        } else {
            (style.margin_left.is_auto(), style.margin_right.is_auto())
        }
    }

    /// Main-axis gap between adjacent items (`column-gap` when the main axis
    /// is the inline axis, `row-gap` otherwise).
    pub fn main_gap(&self, style: &ComputedStyle, container_main: f32) -> f32 {
        let gap = if self.is_column_flow() {
            style.row_gap
        } else {
            style.column_gap
        };
        gap.to_px(16.0, 16.0, container_main.max(0.0)).max(0.0)
    }

    /// Cross-axis gap between adjacent lines.
    pub fn cross_gap(&self, style: &ComputedStyle, container_cross: f32) -> f32 {
        let gap = if self.is_column_flow() {
            style.column_gap
        } else {
            style.row_gap
        };
        gap.to_px(16.0, 16.0, container_cross.max(0.0)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexkit_css::ComputedStyle;

    fn flow(
        direction: FlexDirection,
        writing_mode: WritingMode,
        text_direction: Direction,
    ) -> FlexFlow {
        let mut style = ComputedStyle::new();
        style.flex_direction = direction;
        style.writing_mode = writing_mode;
        style.direction = text_direction;
        FlexFlow::from_style(&style)
    }

    #[test]
    fn test_horizontal_flow_matrix() {
        // Row in a horizontal document: main axis horizontal.
        assert!(flow(FlexDirection::Row, WritingMode::HorizontalTb, Direction::Ltr)
            .is_horizontal_flow());
        // Column in a horizontal document: main axis vertical.
        assert!(!flow(FlexDirection::Column, WritingMode::HorizontalTb, Direction::Ltr)
            .is_horizontal_flow());
        // Row in a vertical writing mode: inline axis is vertical.
        assert!(!flow(FlexDirection::Row, WritingMode::VerticalRl, Direction::Ltr)
            .is_horizontal_flow());
        // Column in a vertical writing mode: block axis is horizontal.
        assert!(flow(FlexDirection::Column, WritingMode::VerticalRl, Direction::Ltr)
            .is_horizontal_flow());
    }

    #[test]
    fn test_left_to_right_flow() {
        assert!(flow(FlexDirection::Row, WritingMode::HorizontalTb, Direction::Ltr)
            .is_left_to_right_flow());
        assert!(!flow(FlexDirection::Row, WritingMode::HorizontalTb, Direction::Rtl)
            .is_left_to_right_flow());
        assert!(!flow(FlexDirection::RowReverse, WritingMode::HorizontalTb, Direction::Ltr)
            .is_left_to_right_flow());
        // row-reverse in rtl cancels out.
        assert!(flow(FlexDirection::RowReverse, WritingMode::HorizontalTb, Direction::Rtl)
            .is_left_to_right_flow());
        // Columns follow the block progression, not the text direction.
        assert!(flow(FlexDirection::Column, WritingMode::HorizontalTb, Direction::Rtl)
            .is_left_to_right_flow());
        assert!(!flow(FlexDirection::Column, WritingMode::VerticalRl, Direction::Ltr)
            .is_left_to_right_flow());
        assert!(flow(FlexDirection::Column, WritingMode::VerticalLr, Direction::Ltr)
            .is_left_to_right_flow());
    }

    #[test]
    fn test_flip_main_axis_only_for_rows() {
        assert!(flow(FlexDirection::RowReverse, WritingMode::HorizontalTb, Direction::Ltr)
            .should_flip_main_axis());
        assert!(!flow(FlexDirection::ColumnReverse, WritingMode::HorizontalTb, Direction::Ltr)
            .should_flip_main_axis());
    }

    #[test]
    fn test_extent_accessors() {
        let row = flow(FlexDirection::Row, WritingMode::HorizontalTb, Direction::Ltr);
        let column = flow(FlexDirection::Column, WritingMode::HorizontalTb, Direction::Ltr);

        let mut d = Dimensions::default();
        d.content.width = 100.0;
        d.content.height = 40.0;
        assert_eq!(row.main_extent(&d), 100.0);
        assert_eq!(row.cross_extent(&d), 40.0);
        assert_eq!(column.main_extent(&d), 40.0);
        assert_eq!(column.cross_extent(&d), 100.0);

        column.set_main_extent(&mut d, 60.0);
        assert_eq!(d.content.height, 60.0);
        row.set_main_position(&mut d, 7.0);
        assert_eq!(d.content.x, 7.0);
        row.set_cross_position(&mut d, 9.0);
        assert_eq!(d.content.y, 9.0);
    }

    #[test]
    fn test_flow_aware_edges() {
        let row = flow(FlexDirection::Row, WritingMode::HorizontalTb, Direction::Ltr);
        let column = flow(FlexDirection::Column, WritingMode::HorizontalTb, Direction::Ltr);
        let e = EdgeSizes {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        assert_eq!(row.main_edges(&e), (4.0, 2.0));
        assert_eq!(row.cross_edges(&e), (1.0, 3.0));
        assert_eq!(column.main_edges(&e), (1.0, 3.0));
        assert_eq!(column.cross_edges(&e), (4.0, 2.0));
        assert_eq!(row.main_edge_sum(&e), 6.0);
        assert_eq!(column.main_edge_sum(&e), 4.0);
    }

    #[test]
    fn test_gap_selection() {
        let mut style = ComputedStyle::new();
        style.column_gap = flexkit_css::Length::Px(10.0);
        style.row_gap = flexkit_css::Length::Px(4.0);

        style.flex_direction = FlexDirection::Row;
        let row = FlexFlow::from_style(&style);
        assert_eq!(row.main_gap(&style, 100.0), 10.0);
        assert_eq!(row.cross_gap(&style, 100.0), 4.0);

        style.flex_direction = FlexDirection::Column;
        let column = FlexFlow::from_style(&style);
        assert_eq!(column.main_gap(&style, 100.0), 4.0);
        assert_eq!(column.cross_gap(&style, 100.0), 10.0);
    }
}
