//! Flexbox layout for FlexKit.
//!
//! Implements the CSS Flexible Box Layout Module Level 1:
//! https://www.w3.org/TR/css-flexbox-1/
//!
//! The flexbox algorithm is multi-step:
//! 1. Determine main/cross axes from flex-direction and writing mode
//! 2. Visit children in `order` (stable within equal values)
//! 3. Break children into flex lines (if wrapping)
//! 4. Resolve flexible lengths per line (grow/shrink with min/max freezing)
//! 5. Lay out and place children on the main axis (justify-content,
//!    auto margins, reverse flows)
//! 6. Distribute lines and align items on the cross axis (align-content,
//!    align-self, baselines, wrap-reverse)
//! 7. Report the container's resolved extents and first-line baseline
//!
//! All per-pass scratch lives in [`FlexLayoutPass`]; nothing is cached across
//! layout calls, so re-running layout with unchanged inputs reproduces the
//! same output exactly.

use std::ops::Range;

use flexkit_css::{
    AlignContent, AlignItems, Direction, FlexBasis, FlexWrap, JustifyContent, Length, WritingMode,
};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::axis::FlexFlow;
use crate::order::OrderIterator;
use crate::{ChildConstraints, ChildLayout, Dimensions, LayoutBox, LayoutError};

/// Whether a line wants to grow or shrink, decided once per line before any
/// item is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlexSign {
    Positive,
    Negative,
}

/// Per-item scratch for one layout pass. Margin, border and padding values
/// are stored in physical start/end order (left/right for a horizontal main
/// axis, top/bottom otherwise); `auto` margins resolve to zero here and are
/// flagged separately.
#[derive(Debug)]
struct FlexItem {
    /// Index into the container's `children`.
    child: usize,
    /// Absolutely positioned: carried in the line for static positioning,
    /// contributes nothing to size aggregates.
    out_of_flow: bool,

    // Main axis
    preferred_extent: f32,
    target_extent: f32,
    min_extent: f32,
    max_extent: f32,
    flex_grow: f32,
    flex_shrink: f32,
    frozen: bool,
    main_border_padding_start: f32,
    main_border_padding_end: f32,
    main_margin_start: f32,
    main_margin_end: f32,
    main_margin_start_auto: bool,
    main_margin_end_auto: bool,

    // Cross axis
    cross_border_padding_start: f32,
    cross_border_padding_end: f32,
    cross_margin_start: f32,
    cross_margin_end: f32,
    cross_margin_start_auto: bool,
    cross_margin_end_auto: bool,
    min_cross_extent: f32,
    max_cross_extent: f32,
    cross_extent: f32,
    align: AlignItems,
    /// Margin-box ascent for baseline alignment; set during placement.
    ascent: Option<f32>,

    // Placement
    /// Margin-box start along the main axis, from the flow's logical start.
    outer_main_start: f32,
    /// Margin-box start along the cross axis, from the container's
    /// cross-start once alignment has run.
    cross_start: f32,
}

impl FlexItem {
    fn positioned(child: usize) -> Self {
        Self {
            child,
            out_of_flow: true,
            preferred_extent: 0.0,
            target_extent: 0.0,
            min_extent: 0.0,
            max_extent: f32::INFINITY,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            frozen: true,
            main_border_padding_start: 0.0,
            main_border_padding_end: 0.0,
            main_margin_start: 0.0,
            main_margin_end: 0.0,
            main_margin_start_auto: false,
            main_margin_end_auto: false,
            cross_border_padding_start: 0.0,
            cross_border_padding_end: 0.0,
            cross_margin_start: 0.0,
            cross_margin_end: 0.0,
            cross_margin_start_auto: false,
            cross_margin_end_auto: false,
            min_cross_extent: 0.0,
            max_cross_extent: f32::INFINITY,
            cross_extent: 0.0,
            align: AlignItems::FlexStart,
            ascent: None,
            outer_main_start: 0.0,
            cross_start: 0.0,
        }
    }

    fn main_border_padding(&self) -> f32 {
        self.main_border_padding_start + self.main_border_padding_end
    }

    fn main_margins(&self) -> f32 {
        self.main_margin_start + self.main_margin_end
    }

    /// Margin-box extent for a given main content extent.
    fn outer_extent_for(&self, content_extent: f32) -> f32 {
        content_extent + self.main_border_padding() + self.main_margins()
    }

    fn outer_preferred_extent(&self) -> f32 {
        self.outer_extent_for(self.preferred_extent)
    }

    fn outer_target_extent(&self) -> f32 {
        self.outer_extent_for(self.target_extent)
    }

    fn clamp_main(&self, extent: f32) -> f32 {
        extent.max(self.min_extent).min(self.max_extent)
    }

    fn cross_border_padding(&self) -> f32 {
        self.cross_border_padding_start + self.cross_border_padding_end
    }

    fn cross_margins(&self) -> f32 {
        self.cross_margin_start + self.cross_margin_end
    }

    fn outer_cross_extent(&self) -> f32 {
        self.cross_extent + self.cross_border_padding() + self.cross_margins()
    }

    fn has_auto_cross_margin(&self) -> bool {
        self.cross_margin_start_auto || self.cross_margin_end_auto
    }
}

/// One wrapped row or column of items. Discarded at the end of the pass.
#[derive(Debug)]
struct FlexLine {
    items: Range<usize>,
    in_flow_count: usize,
    total_flex_grow: f32,
    total_weighted_flex_shrink: f32,
    /// Sum of preferred margin-box extents plus gaps.
    preferred_outer_extent: f32,
    /// Same sum with each item clamped to its own min/max first.
    clamped_outer_extent: f32,
    /// Free space left after resolution (consumed by auto margins and
    /// justify-content during placement).
    remaining_free_space: f32,
    cross_offset: f32,
    cross_extent: f32,
    max_ascent: f32,
}

impl FlexLine {
    fn new(start: usize) -> Self {
        Self {
            items: start..start,
            in_flow_count: 0,
            total_flex_grow: 0.0,
            total_weighted_flex_shrink: 0.0,
            preferred_outer_extent: 0.0,
            clamped_outer_extent: 0.0,
            remaining_free_space: 0.0,
            cross_offset: 0.0,
            cross_extent: 0.0,
            max_ascent: 0.0,
        }
    }
}

/// Per-layout-call context threaded through every phase. Rebuilt from
/// scratch on each call, which keeps layout re-entrant.
struct FlexLayoutPass {
    flow: FlexFlow,
    wrap: FlexWrap,
    justify: JustifyContent,
    align_items: AlignItems,
    align_content: AlignContent,
    container_writing_mode: WritingMode,
    /// Main-axis content extent; `f32::INFINITY` while the main size is
    /// itself being measured (auto-height column flows).
    container_main: f32,
    /// Cross-axis content extent; `None` until this pass resolves it.
    container_cross: Option<f32>,
    /// Content-box width, for percentage resolution of margins and padding.
    container_width: f32,
    container_height_hint: f32,
    main_gap: f32,
    cross_gap: f32,
    items: Vec<FlexItem>,
    lines: Vec<FlexLine>,
    /// Item constructed by the line breaker that did not fit its line; it
    /// starts the next line on the following call.
    pending: Option<FlexItem>,
}

/// Lay out a flex container and its children within the containing block.
///
/// Writes each in-flow child's final content rect and margins, records
/// static positions for out-of-flow children, resolves the container's own
/// auto main/cross extent, and reports the container's first-line baseline.
pub fn layout_flex_container(
    container: &mut LayoutBox,
    containing_block: &Dimensions,
    child_layout: &mut dyn ChildLayout,
) -> Result<(), LayoutError> {
    if !container.style.display.is_flex() {
        return Err(LayoutError::NotAFlexContainer(format!(
            "{:?}",
            container.style.display
        )));
    }

    resolve_container_box(container, containing_block);
    let flow = FlexFlow::from_style(&container.style);

    let container_width = container.dimensions.content.width;
    let definite_height = match container.style.height {
        Length::Auto => None,
        h => Some(
            container
                .length_to_px(h, containing_block.content.height)
                .max(0.0),
        ),
    };
    let container_main = if flow.is_horizontal_flow() {
        container_width
    } else {
        definite_height.unwrap_or(f32::INFINITY)
    };
    let container_cross = if flow.is_horizontal_flow() {
        definite_height
    } else {
        Some(container_width)
    };

    let gap_basis = if container_main.is_finite() {
        container_main
    } else {
        0.0
    };
    let mut pass = FlexLayoutPass {
        flow,
        wrap: container.style.flex_wrap,
        justify: container.style.justify_content,
        align_items: container.style.align_items,
        align_content: container.style.align_content,
        container_writing_mode: container.style.writing_mode,
        container_main,
        container_cross,
        container_width,
        container_height_hint: definite_height.unwrap_or(0.0),
        main_gap: flow.main_gap(&container.style, gap_basis),
        cross_gap: flow.cross_gap(&container.style, container_cross.unwrap_or(0.0)),
        items: Vec::with_capacity(container.children.len()),
        lines: Vec::new(),
        pending: None,
    };

    let mut order = OrderIterator::new();
    order.set_order_values(container.children.iter().map(|c| c.style.order));

    while let Some(mut line) = pass.compute_next_flex_line(&mut order, container, child_layout) {
        pass.resolve_flexible_lengths(&mut line);
        pass.layout_and_place_children(&mut line, container, child_layout);
        pass.lines.push(line);
    }
    debug_assert!(pass.pending.is_none());
    debug_assert_eq!(pass.items.len(), container.children.len());

    // Resolve the container's own extents that were left intrinsic.
    if !pass.container_main.is_finite() {
        let used = pass
            .lines
            .iter()
            .map(|line| pass.line_used_main_extent(line))
            .fold(0.0f32, f32::max);
        pass.container_main = used.max(0.0);
    }
    pass.flow
        .set_main_extent(&mut container.dimensions, pass.container_main);

    let lines_cross_total = pass.lines_cross_total();
    let container_cross = pass.container_cross.unwrap_or(lines_cross_total).max(0.0);
    pass.container_cross = Some(container_cross);
    pass.flow
        .set_cross_extent(&mut container.dimensions, container_cross);

    // A single non-wrapping line always spans the container's cross axis.
    if !pass.wrap.is_wrapping() {
        if let Some(line) = pass.lines.first_mut() {
            line.cross_extent = container_cross;
        }
    }

    pass.align_flex_lines(container_cross);
    pass.align_children(container, child_layout);
    if pass.wrap == FlexWrap::WrapReverse {
        pass.flip_for_wrap_reverse(container_cross);
    }
    pass.flip_for_right_to_left_column(container_cross);
    if pass.flow.is_column_flow() && pass.flow.direction().is_reverse() {
        pass.layout_column_reverse();
    }
    pass.apply_positions(container);
    let baseline = pass.first_line_box_baseline(container);
    container.baseline = baseline;

    debug!(
        lines = pass.lines.len(),
        main = pass.container_main,
        cross = container_cross,
        "Flex container laid out"
    );
    Ok(())
}

/// Min-/max-content inline extents of a flex container, for ancestors that
/// size themselves before this box is laid out.
///
/// Row flows sum their items' preferred outer extents for max-content; the
/// min-content extent is that same sum when wrapping is disabled, else the
/// largest single item. Column flows report the widest item for both.
pub fn intrinsic_inline_extents(
    container: &mut LayoutBox,
    child_layout: &mut dyn ChildLayout,
) -> (f32, f32) {
    let flow = FlexFlow::from_style(&container.style);
    let wrapping = container.style.flex_wrap.is_wrapping();
    let main_gap = flow.main_gap(&container.style, 0.0);

    let pass = FlexLayoutPass::measuring(flow, container);
    let mut min_content = 0.0f32;
    let mut max_content = 0.0f32;
    let mut in_flow_seen = 0usize;
    for index in 0..container.children.len() {
        if container.children[index].style.position.is_out_of_flow() {
            continue;
        }
        if flow.is_horizontal_flow() {
            // Main axis is the inline axis: preferred main extents apply.
            let item = pass.construct_flex_item(index, &mut container.children[index], child_layout);
            let outer = item.outer_preferred_extent();
            if in_flow_seen > 0 {
                max_content += main_gap;
            }
            max_content += outer;
            min_content = if wrapping {
                min_content.max(outer)
            } else {
                max_content
            };
        } else {
            // The inline axis is the cross axis: report the widest item.
            let child = &mut container.children[index];
            let margins = child.length_to_px(child.style.margin_left, 0.0).max(0.0)
                + child.length_to_px(child.style.margin_right, 0.0).max(0.0);
            let extent =
                child_layout.measure_intrinsic_extent(child, true, f32::INFINITY) + margins;
            min_content = min_content.max(extent);
            max_content = max_content.max(extent);
        }
        in_flow_seen += 1;
    }
    (min_content.max(0.0), max_content.max(0.0))
}

impl FlexLayoutPass {
    /// A minimal pass used only for intrinsic measurement.
    fn measuring(flow: FlexFlow, container: &LayoutBox) -> Self {
        Self {
            flow,
            wrap: container.style.flex_wrap,
            justify: container.style.justify_content,
            align_items: container.style.align_items,
            align_content: container.style.align_content,
            container_writing_mode: container.style.writing_mode,
            container_main: f32::INFINITY,
            container_cross: None,
            container_width: 0.0,
            container_height_hint: 0.0,
            main_gap: 0.0,
            cross_gap: 0.0,
            items: Vec::new(),
            lines: Vec::new(),
            pending: None,
        }
    }

    // ==================== Line breaking ====================

    /// Accumulate the next flex line, resuming from the iterator position
    /// left by the previous call. Returns `None` once all children have been
    /// assigned to a line.
    fn compute_next_flex_line(
        &mut self,
        order: &mut OrderIterator,
        container: &mut LayoutBox,
        child_layout: &mut dyn ChildLayout,
    ) -> Option<FlexLine> {
        let start = self.items.len();
        let mut line = FlexLine::new(start);
        let wrapping = self.wrap.is_wrapping() && self.container_main.is_finite();

        loop {
            let item = match self.pending.take() {
                Some(pending) => pending,
                None => {
                    let Some(child_index) = order.next() else {
                        break;
                    };
                    if container.children[child_index]
                        .style
                        .position
                        .is_out_of_flow()
                    {
                        // Carried in the line for static positioning only.
                        self.items.push(FlexItem::positioned(child_index));
                        continue;
                    }
                    self.construct_flex_item(
                        child_index,
                        &mut container.children[child_index],
                        child_layout,
                    )
                }
            };

            let outer = item.outer_preferred_extent();
            let gap = if line.in_flow_count > 0 {
                self.main_gap
            } else {
                0.0
            };
            if wrapping
                && line.in_flow_count > 0
                && line.preferred_outer_extent + gap + outer > self.container_main
            {
                // This item starts the next line.
                self.pending = Some(item);
                break;
            }

            line.in_flow_count += 1;
            line.preferred_outer_extent += gap + outer;
            line.total_flex_grow += item.flex_grow;
            line.total_weighted_flex_shrink += item.flex_shrink * item.preferred_extent;
            line.clamped_outer_extent +=
                gap + item.outer_extent_for(item.clamp_main(item.preferred_extent));
            self.items.push(item);
        }

        line.items = start..self.items.len();
        if line.items.is_empty() {
            return None;
        }
        trace!(
            items = line.items.len(),
            in_flow = line.in_flow_count,
            preferred = line.preferred_outer_extent,
            "Flex line collected"
        );
        Some(line)
    }

    /// Resolve an in-flow child's style into per-pass scratch, measuring the
    /// child when its flex basis cannot be resolved directly.
    fn construct_flex_item(
        &self,
        child_index: usize,
        child: &mut LayoutBox,
        child_layout: &mut dyn ChildLayout,
    ) -> FlexItem {
        let flow = self.flow;
        let horizontal = flow.is_horizontal_flow();
        let main_definite = self.container_main.is_finite();
        let percent_main = if main_definite { self.container_main } else { 0.0 };

        let (margin, border, padding) = crate::resolve_box_edges(child, self.container_width);
        let (main_margin_start, main_margin_end) = flow.main_edges(&margin);
        let (cross_margin_start, cross_margin_end) = flow.cross_edges(&margin);
        let (main_bp_start, main_bp_end) = {
            let (bs, be) = flow.main_edges(&border);
            let (ps, pe) = flow.main_edges(&padding);
            (bs + ps, be + pe)
        };
        let (cross_bp_start, cross_bp_end) = {
            let (bs, be) = flow.cross_edges(&border);
            let (ps, pe) = flow.cross_edges(&padding);
            (bs + ps, be + pe)
        };
        let (main_margin_start_auto, main_margin_end_auto) = flow.main_margins_auto(&child.style);
        let (cross_margin_start_auto, cross_margin_end_auto) =
            flow.cross_margins_auto(&child.style);

        // Effective flex basis: `auto` falls back to the main size property.
        let own_main_size = if horizontal {
            child.style.width
        } else {
            child.style.height
        };
        let basis = match child.style.flex_basis {
            FlexBasis::Auto => match own_main_size {
                Length::Px(px) => FlexBasis::Length(px),
                Length::Percent(pct) => FlexBasis::Percent(pct),
                Length::Zero => FlexBasis::Length(0.0),
                _ => FlexBasis::Content,
            },
            other => other,
        };
        let preferred_extent = match basis {
            // A zero fixed basis under infinite line length means "size to
            // content" for intrinsic measurement purposes.
            FlexBasis::Length(px) if px != 0.0 || main_definite => px,
            FlexBasis::Percent(pct) if main_definite => pct / 100.0 * self.container_main,
            _ => child_layout.measure_intrinsic_extent(child, horizontal, self.container_main),
        }
        .max(0.0);

        let (min_len, max_len, min_cross_len, max_cross_len) = if horizontal {
            (
                child.style.min_width,
                child.style.max_width,
                child.style.min_height,
                child.style.max_height,
            )
        } else {
            (
                child.style.min_height,
                child.style.max_height,
                child.style.min_width,
                child.style.max_width,
            )
        };
        let min_extent = match min_len {
            Length::Auto => 0.0,
            len => child.length_to_px(len, percent_main).max(0.0),
        };
        let max_extent = match max_len {
            Length::Auto => f32::INFINITY,
            len => child.length_to_px(len, percent_main).max(0.0),
        };
        let cross_basis = self.container_cross.unwrap_or(0.0);
        let min_cross_extent = match min_cross_len {
            Length::Auto => 0.0,
            len => child.length_to_px(len, cross_basis).max(0.0),
        };
        let max_cross_extent = match max_cross_len {
            Length::Auto => f32::INFINITY,
            len => child.length_to_px(len, cross_basis).max(0.0),
        };

        FlexItem {
            child: child_index,
            out_of_flow: false,
            preferred_extent,
            target_extent: preferred_extent,
            min_extent,
            max_extent,
            flex_grow: child.style.flex_grow.max(0.0),
            flex_shrink: child.style.flex_shrink.max(0.0),
            frozen: false,
            main_border_padding_start: main_bp_start,
            main_border_padding_end: main_bp_end,
            main_margin_start,
            main_margin_end,
            main_margin_start_auto,
            main_margin_end_auto,
            cross_border_padding_start: cross_bp_start,
            cross_border_padding_end: cross_bp_end,
            cross_margin_start,
            cross_margin_end,
            cross_margin_start_auto,
            cross_margin_end_auto,
            min_cross_extent,
            max_cross_extent,
            cross_extent: 0.0,
            align: child.style.align_self.resolve(self.align_items),
            ascent: None,
            outer_main_start: 0.0,
            cross_start: 0.0,
        }
    }

    // ==================== Flexible length resolution ====================

    /// Distribute the line's free space across its items, iteratively
    /// freezing items that violate their min/max constraints and
    /// redistributing among the rest. Each round freezes at least one item,
    /// so the loop runs at most once per item.
    fn resolve_flexible_lengths(&mut self, line: &mut FlexLine) {
        if line.in_flow_count == 0 {
            line.remaining_free_space = 0.0;
            return;
        }

        let sign = if line.clamped_outer_extent < self.container_main {
            FlexSign::Positive
        } else {
            FlexSign::Negative
        };
        let mut available = if self.container_main.is_finite() {
            self.container_main - line.preferred_outer_extent
        } else {
            0.0
        };
        let mut grow_total = line.total_flex_grow;
        let mut shrink_total = line.total_weighted_flex_shrink;

        loop {
            let mut total_violation = 0.0f32;
            let mut used_free_space = 0.0f32;
            let mut min_violations: SmallVec<[usize; 8]> = SmallVec::new();
            let mut max_violations: SmallVec<[usize; 8]> = SmallVec::new();
            let mut unfrozen = 0usize;

            for index in line.items.clone() {
                let item = &mut self.items[index];
                if item.out_of_flow || item.frozen {
                    continue;
                }
                unfrozen += 1;

                let mut extra = 0.0f32;
                if sign == FlexSign::Positive
                    && available > 0.0
                    && grow_total > 0.0
                    && grow_total.is_finite()
                {
                    extra = available * item.flex_grow / grow_total;
                } else if sign == FlexSign::Negative
                    && available < 0.0
                    && shrink_total > 0.0
                    && shrink_total.is_finite()
                {
                    extra = available * item.flex_shrink * item.preferred_extent / shrink_total;
                }

                let tentative = item.preferred_extent + extra.round();
                let adjusted = item.clamp_main(tentative).max(0.0);
                item.target_extent = adjusted;
                let violation = adjusted - tentative;
                if violation > 0.0 {
                    min_violations.push(index);
                } else if violation < 0.0 {
                    max_violations.push(index);
                }
                total_violation += violation;
                used_free_space += adjusted - item.preferred_extent;
            }

            if unfrozen == 0 {
                break;
            }
            if total_violation == 0.0 {
                available -= used_free_space;
                for index in line.items.clone() {
                    self.items[index].frozen = true;
                }
                break;
            }

            // Freeze whichever violation set matches the total's sign and
            // redistribute the rest next round.
            let violators = if total_violation > 0.0 {
                &min_violations
            } else {
                &max_violations
            };
            for &index in violators {
                let item = &mut self.items[index];
                item.frozen = true;
                available -= item.target_extent - item.preferred_extent;
                grow_total -= item.flex_grow;
                shrink_total -= item.flex_shrink * item.preferred_extent;
            }
            trace!(
                total_violation,
                frozen = violators.len(),
                available,
                "Flex resolution round froze violators"
            );
        }

        line.remaining_free_space = available;
    }

    // ==================== Main-axis placement ====================

    /// Lay each in-flow child out at its resolved main size, then assign
    /// main-axis positions: auto margins absorb leftover space first, then
    /// justify-content distributes what remains. Out-of-flow items record
    /// the running cursor as their static main position.
    fn layout_and_place_children(
        &mut self,
        line: &mut FlexLine,
        container: &mut LayoutBox,
        child_layout: &mut dyn ChildLayout,
    ) {
        let mut available = if line.in_flow_count == 0 {
            0.0
        } else {
            line.remaining_free_space
        };

        // Auto margins split any positive free space evenly and starve
        // justify-content.
        let auto_margin_count: usize = line
            .items
            .clone()
            .filter(|&i| !self.items[i].out_of_flow)
            .map(|i| {
                let item = &self.items[i];
                usize::from(item.main_margin_start_auto) + usize::from(item.main_margin_end_auto)
            })
            .sum();
        if available > 0.0 && auto_margin_count > 0 {
            let share = available / auto_margin_count as f32;
            for index in line.items.clone() {
                let item = &mut self.items[index];
                if item.out_of_flow {
                    continue;
                }
                if item.main_margin_start_auto {
                    item.main_margin_start += share;
                }
                if item.main_margin_end_auto {
                    item.main_margin_end += share;
                }
            }
            available = 0.0;
        }

        let (initial_offset, between) =
            justify_content_offsets(self.justify, available, line.in_flow_count);

        let mut cursor = initial_offset;
        let mut placed = 0usize;
        let mut max_outer_cross = 0.0f32;
        let mut max_ascent = 0.0f32;
        let mut max_descent = 0.0f32;
        let mut any_baseline = false;

        for index in line.items.clone() {
            if self.items[index].out_of_flow {
                self.items[index].outer_main_start = cursor;
                continue;
            }

            let (target_extent, child_index) = {
                let item = &self.items[index];
                (item.target_extent, item.child)
            };
            let child = &mut container.children[child_index];
            let constraints = ChildConstraints {
                containing_width: self.container_width,
                containing_height: self.container_height_hint,
                override_content_width: self
                    .flow
                    .is_horizontal_flow()
                    .then_some(target_extent),
                override_content_height: (!self.flow.is_horizontal_flow())
                    .then_some(target_extent),
            };
            child_layout.layout(child, &constraints);

            let item = &mut self.items[index];
            item.cross_extent = if self.flow.is_horizontal_flow() {
                child.dimensions.content.height
            } else {
                child.dimensions.content.width
            };
            item.outer_main_start = cursor;
            placed += 1;
            cursor += item.outer_target_extent();
            if placed < line.in_flow_count {
                cursor += self.main_gap + between;
            }

            if item.align == AlignItems::Baseline
                && !item.has_auto_cross_margin()
                && self.flow.is_horizontal_flow()
            {
                let ascent = margin_box_ascent_for_child(item, child);
                item.ascent = Some(ascent);
                max_ascent = max_ascent.max(ascent);
                max_descent = max_descent.max(item.outer_cross_extent() - ascent);
                any_baseline = true;
            }
            max_outer_cross = max_outer_cross.max(item.outer_cross_extent());
        }

        line.max_ascent = max_ascent;
        line.cross_extent = if any_baseline {
            max_outer_cross.max(max_ascent + max_descent)
        } else {
            max_outer_cross
        }
        .max(0.0);
    }

    /// Sum of final margin-box extents and gaps for a line; the container's
    /// main extent when it is intrinsic.
    fn line_used_main_extent(&self, line: &FlexLine) -> f32 {
        let mut used = 0.0f32;
        let mut in_flow = 0usize;
        for index in line.items.clone() {
            let item = &self.items[index];
            if item.out_of_flow {
                continue;
            }
            if in_flow > 0 {
                used += self.main_gap;
            }
            used += item.outer_target_extent();
            in_flow += 1;
        }
        used
    }

    /// Second placement pass for `column-reverse`: main positions are
    /// re-derived from the container's final main extent, which is unknown
    /// during the first walk when the height is intrinsic.
    fn layout_column_reverse(&mut self) {
        let container_main = self.container_main;
        for item in &mut self.items {
            let outer = if item.out_of_flow {
                0.0
            } else {
                item.outer_target_extent()
            };
            item.outer_main_start = container_main - item.outer_main_start - outer;
        }
    }

    // ==================== Cross-axis alignment ====================

    fn lines_cross_total(&self) -> f32 {
        let gaps = self.cross_gap * self.lines.len().saturating_sub(1) as f32;
        self.lines.iter().map(|l| l.cross_extent).sum::<f32>() + gaps
    }

    /// Distribute leftover cross-axis space across lines per align-content.
    /// `stretch` grows every line's recorded extent by an equal share.
    fn align_flex_lines(&mut self, container_cross: f32) {
        if self.lines.is_empty() {
            return;
        }
        let multiline = self.wrap.is_wrapping();
        let mut free = container_cross - self.lines_cross_total();

        if multiline
            && self.align_content == AlignContent::Stretch
            && free > 0.0
        {
            let share = free / self.lines.len() as f32;
            for line in &mut self.lines {
                line.cross_extent += share;
            }
            free = 0.0;
        }

        let (initial, between) = if multiline {
            align_content_offsets(self.align_content, free, self.lines.len())
        } else {
            (0.0, 0.0)
        };

        let mut cursor = initial;
        let line_count = self.lines.len();
        for (i, line) in self.lines.iter_mut().enumerate() {
            line.cross_offset = cursor;
            cursor += line.cross_extent + between;
            if i + 1 < line_count {
                cursor += self.cross_gap;
            }
        }
    }

    /// Position each item on the cross axis within its line: auto margins
    /// absorb the leftover space when present, otherwise align-self decides.
    fn align_children(&mut self, container: &mut LayoutBox, child_layout: &mut dyn ChildLayout) {
        let wrap_reverse = self.wrap == FlexWrap::WrapReverse;
        for line_index in 0..self.lines.len() {
            let (line_cross, line_offset, line_ascent) = {
                let line = &self.lines[line_index];
                (line.cross_extent, line.cross_offset, line.max_ascent)
            };
            let mut min_descent_slack = f32::INFINITY;
            let mut baseline_items: SmallVec<[usize; 8]> = SmallVec::new();

            for index in self.lines[line_index].items.clone() {
                if self.items[index].out_of_flow {
                    // Static cross position: the line's leading edge.
                    self.items[index].cross_start = line_offset;
                    continue;
                }

                // Cross-axis auto margins consume the alignment space and
                // bypass align-self entirely.
                if self.items[index].has_auto_cross_margin() {
                    let item = &mut self.items[index];
                    let space = (line_cross - item.outer_cross_extent()).max(0.0);
                    if item.cross_margin_start_auto && item.cross_margin_end_auto {
                        item.cross_margin_start += space / 2.0;
                        item.cross_margin_end += space / 2.0;
                    } else if item.cross_margin_start_auto {
                        item.cross_margin_start += space;
                    } else {
                        item.cross_margin_end += space;
                    }
                    item.cross_start = line_offset;
                    continue;
                }

                if self.items[index].align == AlignItems::Stretch {
                    self.apply_stretch_alignment_to_child(
                        index,
                        line_cross,
                        container,
                        child_layout,
                    );
                }

                let item = &mut self.items[index];
                let available = line_cross - item.outer_cross_extent();
                let offset_within = match item.align {
                    AlignItems::FlexStart | AlignItems::Stretch => 0.0,
                    AlignItems::FlexEnd => available,
                    AlignItems::Center => available / 2.0,
                    AlignItems::Baseline => match item.ascent {
                        Some(ascent) => {
                            let offset = (line_ascent - ascent).max(0.0);
                            min_descent_slack = min_descent_slack.min(available - offset);
                            baseline_items.push(index);
                            offset
                        }
                        // Baseline degrades to flex-start off the inline axis.
                        None => 0.0,
                    },
                };
                item.cross_start = line_offset + offset_within;
            }

            // In a wrap-reversed line, baseline items shift as a group so the
            // deepest one sits flush with the line's after edge.
            if wrap_reverse && min_descent_slack.is_finite() && min_descent_slack > 0.0 {
                for index in baseline_items {
                    self.items[index].cross_start += min_descent_slack;
                }
            }
        }
    }

    /// Grow a stretch-aligned item with an auto cross size to fill its line,
    /// re-laying it out when the size actually changes. Orthogonal-flow
    /// children already carry an override size and are left alone.
    fn apply_stretch_alignment_to_child(
        &mut self,
        index: usize,
        line_cross: f32,
        container: &mut LayoutBox,
        child_layout: &mut dyn ChildLayout,
    ) {
        let child_index = self.items[index].child;
        let child = &mut container.children[child_index];

        let cross_size_auto = if self.flow.is_horizontal_flow() {
            child.style.height.is_auto()
        } else {
            child.style.width.is_auto()
        };
        if !cross_size_auto {
            return;
        }
        if child.style.writing_mode.is_horizontal() != self.container_writing_mode.is_horizontal() {
            return;
        }

        let item = &self.items[index];
        let desired = (line_cross - item.cross_margins() - item.cross_border_padding())
            .max(item.min_cross_extent)
            .min(item.max_cross_extent)
            .max(0.0);
        if (desired - item.cross_extent).abs() <= f32::EPSILON {
            return;
        }

        let constraints = ChildConstraints {
            containing_width: self.container_width,
            containing_height: self.container_height_hint,
            override_content_width: if self.flow.is_horizontal_flow() {
                Some(item.target_extent)
            } else {
                Some(desired)
            },
            override_content_height: if self.flow.is_horizontal_flow() {
                Some(desired)
            } else {
                Some(item.target_extent)
            },
        };
        child_layout.layout(child, &constraints);
        self.items[index].cross_extent = desired;
    }

    /// Mirror each line about the container's cross-axis midpoint.
    fn flip_for_wrap_reverse(&mut self, container_cross: f32) {
        for line in &mut self.lines {
            let flipped = container_cross - line.cross_offset - line.cross_extent;
            let delta = flipped - line.cross_offset;
            for index in line.items.clone() {
                self.items[index].cross_start += delta;
            }
            line.cross_offset = flipped;
        }
    }

    /// Mirror item cross positions for right-to-left column flows, whose
    /// cross axis is the inline axis running right to left.
    fn flip_for_right_to_left_column(&mut self, container_cross: f32) {
        if !self.flow.is_column_flow() || self.flow.text_direction() == Direction::Ltr {
            return;
        }
        for item in &mut self.items {
            let outer = if item.out_of_flow {
                0.0
            } else {
                item.outer_cross_extent()
            };
            item.cross_start = container_cross - item.cross_start - outer;
        }
    }

    // ==================== Final position application ====================

    /// Convert logical main/cross offsets into physical coordinates and
    /// write them (and the effective margins) back onto the children.
    fn apply_positions(&self, container: &mut LayoutBox) {
        let flip_rows = self.flow.should_flip_main_axis();
        let container_main = self.container_main;
        let origin_main = self.flow.main_position(&container.dimensions);
        let origin_cross = self.flow.cross_position(&container.dimensions);

        for item in &self.items {
            let outer_extent = if item.out_of_flow {
                0.0
            } else {
                item.outer_target_extent()
            };
            let outer_main = if flip_rows {
                container_main - item.outer_main_start - outer_extent
            } else {
                item.outer_main_start
            };
            let outer_cross = item.cross_start;

            let child = &mut container.children[item.child];
            if item.out_of_flow {
                let (x, y) = if self.flow.is_horizontal_flow() {
                    (origin_main + outer_main, origin_cross + outer_cross)
                } else {
                    (origin_cross + outer_cross, origin_main + outer_main)
                };
                child.static_position = Some((x, y));
                continue;
            }

            let content_main =
                outer_main + item.main_margin_start + item.main_border_padding_start;
            let content_cross =
                outer_cross + item.cross_margin_start + item.cross_border_padding_start;
            self.flow
                .set_main_position(&mut child.dimensions, origin_main + content_main);
            self.flow
                .set_cross_position(&mut child.dimensions, origin_cross + content_cross);
            self.flow.set_main_margins(
                &mut child.dimensions.margin,
                item.main_margin_start,
                item.main_margin_end,
            );
            self.flow.set_cross_margins(
                &mut child.dimensions.margin,
                item.cross_margin_start,
                item.cross_margin_end,
            );
        }
    }

    // ==================== Baselines ====================

    /// The container's reported first-line baseline: a pass-through from a
    /// representative child of the first line.
    fn first_line_box_baseline(&self, container: &LayoutBox) -> Option<f32> {
        if container.style.writing_mode != WritingMode::HorizontalTb {
            return None;
        }
        let line = self.lines.first()?;
        let mut fallback = None;
        let mut representative = None;
        for index in line.items.clone() {
            let item = &self.items[index];
            if item.out_of_flow {
                continue;
            }
            if fallback.is_none() {
                fallback = Some(item);
            }
            if item.align == AlignItems::Baseline && !item.has_auto_cross_margin() {
                representative = Some(item);
                break;
            }
        }
        let item = representative.or(fallback)?;
        let child = &container.children[item.child];
        let baseline_in_border_box = child
            .first_line_baseline()
            .map(|b| b + child.dimensions.border.top + child.dimensions.padding.top)
            .unwrap_or_else(|| child.dimensions.border_box().height);
        let top = child.dimensions.border_box().y - container.dimensions.content.y;
        Some(top + baseline_in_border_box)
    }
}

/// Margin-box ascent of a child for baseline alignment: its own first-line
/// baseline (border-box relative), synthesized from the border-box bottom
/// when the child reports none, plus its leading cross margin.
fn margin_box_ascent_for_child(item: &FlexItem, child: &LayoutBox) -> f32 {
    let baseline = child
        .first_line_baseline()
        .map(|b| b + child.dimensions.border.top + child.dimensions.padding.top)
        .unwrap_or_else(|| child.dimensions.border_box().height);
    item.cross_margin_start + baseline
}

/// Initial offset and between-children spacing for justify-content.
fn justify_content_offsets(justify: JustifyContent, free: f32, count: usize) -> (f32, f32) {
    let initial = match justify {
        JustifyContent::FlexEnd => free,
        JustifyContent::Center => free / 2.0,
        JustifyContent::SpaceAround => {
            if free > 0.0 && count > 0 {
                free / (2.0 * count as f32)
            } else {
                free / 2.0
            }
        }
        _ => 0.0,
    };
    let between = match justify {
        JustifyContent::SpaceBetween if free > 0.0 && count > 1 => free / (count - 1) as f32,
        JustifyContent::SpaceAround if free > 0.0 && count > 0 => free / count as f32,
        _ => 0.0,
    };
    (initial, between)
}

/// Initial offset and between-lines spacing for align-content.
fn align_content_offsets(align: AlignContent, free: f32, count: usize) -> (f32, f32) {
    let initial = match align {
        AlignContent::FlexEnd => free,
        AlignContent::Center => free / 2.0,
        AlignContent::SpaceAround => {
            if free > 0.0 && count > 0 {
                free / (2.0 * count as f32)
            } else {
                free / 2.0
            }
        }
        _ => 0.0,
    };
    let between = match align {
        AlignContent::SpaceBetween if free > 0.0 && count > 1 => free / (count - 1) as f32,
        AlignContent::SpaceAround if free > 0.0 && count > 0 => free / count as f32,
        _ => 0.0,
    };
    (initial, between)
}

/// Resolve the container's own edges and content width against its
/// containing block (content height stays pending when auto).
fn resolve_container_box(container: &mut LayoutBox, containing_block: &Dimensions) {
    let (margin, border, padding) =
        crate::resolve_box_edges(container, containing_block.content.width);
    container.dimensions.margin = margin;
    container.dimensions.border = border;
    container.dimensions.padding = padding;

    let content_width = match container.style.width {
        Length::Auto => {
            let consumed = margin.horizontal() + border.horizontal() + padding.horizontal();
            (containing_block.content.width - consumed).max(0.0)
        }
        w => container
            .length_to_px(w, containing_block.content.width)
            .max(0.0),
    };
    container.dimensions.content.width = content_width;
    container.dimensions.content.x =
        containing_block.content.x + margin.left + border.left + padding.left;
    container.dimensions.content.y =
        containing_block.content.y + margin.top + border.top + padding.top;
}
