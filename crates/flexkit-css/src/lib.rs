//! # FlexKit CSS
//!
//! Resolved CSS style values for the FlexKit layout engine.
//!
//! ## Design Goals
//!
//! 1. **Value types**: Resolved property values layout can consume directly
//! 2. **Flex properties**: The full flexbox container/item property set
//! 3. **Value parsing**: Parse individual flex-relevant property values
//!
//! Cascade, inheritance and selector matching live outside this crate; layout
//! only ever sees a [`ComputedStyle`].

use thiserror::Error;
use tracing::debug;

/// Errors that can occur when parsing style values.
#[derive(Error, Debug)]
pub enum CssError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// A CSS length value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Pixels.
    Px(f32),
    /// Em (relative to font size).
    Em(f32),
    /// Rem (relative to root font size).
    Rem(f32),
    /// Percentage.
    Percent(f32),
    /// Auto.
    Auto,
    /// Zero.
    #[default]
    Zero,
}

impl Length {
    /// Compute the absolute pixel value.
    pub fn to_px(&self, font_size: f32, root_font_size: f32, container_size: f32) -> f32 {
        match self {
            Length::Px(px) => *px,
            Length::Em(em) => em * font_size,
            Length::Rem(rem) => rem * root_font_size,
            Length::Percent(pct) => pct / 100.0 * container_size,
            Length::Auto => 0.0, // Context-dependent
            Length::Zero => 0.0,
        }
    }

    /// Check if this is the `auto` keyword.
    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    /// Whether the value can be resolved without a definite container size.
    pub fn is_definite(&self) -> bool {
        !matches!(self, Length::Auto | Length::Percent(_))
    }
}

/// Display property values (flex-relevant subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    Flex,
    InlineFlex,
    None,
}

impl Display {
    /// Check if this is a flex container.
    pub fn is_flex(self) -> bool {
        matches!(self, Display::Flex | Display::InlineFlex)
    }
}

/// Position property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Check if boxes with this position are taken out of normal flow.
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }
}

// ==================== Flexbox Types ====================

/// Flex direction property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    /// Check if this direction is reversed.
    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }

    /// Check if this is a row direction.
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    /// Check if this is a column direction.
    pub fn is_column(self) -> bool {
        matches!(self, FlexDirection::Column | FlexDirection::ColumnReverse)
    }
}

/// Flex wrap property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

impl FlexWrap {
    /// Check if wrapping into multiple lines is enabled.
    pub fn is_wrapping(self) -> bool {
        !matches!(self, FlexWrap::NoWrap)
    }
}

/// Justify content property (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
}

/// Align items property (cross axis alignment for all items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
}

/// Align content property (multi-line cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignContent {
    #[default]
    Stretch,
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
}

/// Align self property (cross axis alignment for an individual item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignSelf {
    #[default]
    Auto,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
    Stretch,
}

impl AlignSelf {
    /// Resolve against the container's `align-items` (`auto` inherits it).
    pub fn resolve(self, align_items: AlignItems) -> AlignItems {
        match self {
            AlignSelf::Auto => align_items,
            AlignSelf::FlexStart => AlignItems::FlexStart,
            AlignSelf::FlexEnd => AlignItems::FlexEnd,
            AlignSelf::Center => AlignItems::Center,
            AlignSelf::Baseline => AlignItems::Baseline,
            AlignSelf::Stretch => AlignItems::Stretch,
        }
    }
}

/// Flex basis property.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FlexBasis {
    /// Use the item's main size property (width or height).
    #[default]
    Auto,
    /// Size based on content.
    Content,
    /// Explicit length.
    Length(f32),
    /// Percentage of the container's main size.
    Percent(f32),
}

/// Writing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
    #[default]
    HorizontalTb,
    VerticalRl,
    VerticalLr,
}

impl WritingMode {
    /// Check if the inline axis is horizontal.
    pub fn is_horizontal(self) -> bool {
        matches!(self, WritingMode::HorizontalTb)
    }
}

/// Direction for bidi text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Computed style for an element (flex-relevant subset).
#[derive(Debug, Clone, Default)]
pub struct ComputedStyle {
    // Box model
    pub display: Display,
    pub position: Position,
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    pub max_width: Length,
    pub max_height: Length,

    // Margin
    pub margin_top: Length,
    pub margin_right: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,

    // Padding
    pub padding_top: Length,
    pub padding_right: Length,
    pub padding_bottom: Length,
    pub padding_left: Length,

    // Border
    pub border_top_width: Length,
    pub border_right_width: Length,
    pub border_bottom_width: Length,
    pub border_left_width: Length,

    // Writing mode and direction
    pub writing_mode: WritingMode,
    pub direction: Direction,

    // Flexbox Container
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,
    pub row_gap: Length,
    pub column_gap: Length,

    // Flexbox Item
    pub order: i32,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: FlexBasis,
    pub align_self: AlignSelf,

    // Typography (needed to resolve em units)
    pub font_size: Length,
}

impl ComputedStyle {
    /// Create default style.
    pub fn new() -> Self {
        Self {
            // Sizing properties start out as `auto`; margins, padding,
            // borders and gaps start at zero.
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Auto,
            min_height: Length::Auto,
            max_width: Length::Auto,
            max_height: Length::Auto,
            font_size: Length::Px(16.0),
            // Flexbox item defaults
            flex_shrink: 1.0, // Default is 1, not 0
            ..Default::default()
        }
    }
}

// ==================== Value Parsing ====================

/// Parse a length value.
pub fn parse_length(value: &str) -> Option<Length> {
    let value = value.trim();

    if value == "auto" {
        return Some(Length::Auto);
    }
    if value == "0" {
        return Some(Length::Zero);
    }

    if value.ends_with("px") {
        let num = value.trim_end_matches("px").parse::<f32>().ok()?;
        return Some(Length::Px(num));
    }
    if value.ends_with("rem") {
        let num = value.trim_end_matches("rem").parse::<f32>().ok()?;
        return Some(Length::Rem(num));
    }
    if value.ends_with("em") {
        let num = value.trim_end_matches("em").parse::<f32>().ok()?;
        return Some(Length::Em(num));
    }
    if value.ends_with('%') {
        let num = value.trim_end_matches('%').parse::<f32>().ok()?;
        return Some(Length::Percent(num));
    }

    // Try plain number (treated as px)
    if let Ok(num) = value.parse::<f32>() {
        return Some(Length::Px(num));
    }

    None
}

/// Parse a flex-direction value.
pub fn parse_flex_direction(value: &str) -> Option<FlexDirection> {
    match value.trim().to_lowercase().as_str() {
        "row" => Some(FlexDirection::Row),
        "row-reverse" => Some(FlexDirection::RowReverse),
        "column" => Some(FlexDirection::Column),
        "column-reverse" => Some(FlexDirection::ColumnReverse),
        _ => None,
    }
}

/// Parse a flex-wrap value.
pub fn parse_flex_wrap(value: &str) -> Option<FlexWrap> {
    match value.trim().to_lowercase().as_str() {
        "nowrap" => Some(FlexWrap::NoWrap),
        "wrap" => Some(FlexWrap::Wrap),
        "wrap-reverse" => Some(FlexWrap::WrapReverse),
        _ => None,
    }
}

/// Parse a justify-content value.
pub fn parse_justify_content(value: &str) -> Option<JustifyContent> {
    match value.trim().to_lowercase().as_str() {
        "flex-start" | "start" => Some(JustifyContent::FlexStart),
        "flex-end" | "end" => Some(JustifyContent::FlexEnd),
        "center" => Some(JustifyContent::Center),
        "space-between" => Some(JustifyContent::SpaceBetween),
        "space-around" => Some(JustifyContent::SpaceAround),
        _ => None,
    }
}

/// Parse an align-items value.
pub fn parse_align_items(value: &str) -> Option<AlignItems> {
    match value.trim().to_lowercase().as_str() {
        "stretch" => Some(AlignItems::Stretch),
        "flex-start" | "start" => Some(AlignItems::FlexStart),
        "flex-end" | "end" => Some(AlignItems::FlexEnd),
        "center" => Some(AlignItems::Center),
        "baseline" => Some(AlignItems::Baseline),
        _ => None,
    }
}

/// Parse an align-content value.
pub fn parse_align_content(value: &str) -> Option<AlignContent> {
    match value.trim().to_lowercase().as_str() {
        "stretch" => Some(AlignContent::Stretch),
        "flex-start" | "start" => Some(AlignContent::FlexStart),
        "flex-end" | "end" => Some(AlignContent::FlexEnd),
        "center" => Some(AlignContent::Center),
        "space-between" => Some(AlignContent::SpaceBetween),
        "space-around" => Some(AlignContent::SpaceAround),
        _ => None,
    }
}

/// Parse an align-self value.
pub fn parse_align_self(value: &str) -> Option<AlignSelf> {
    match value.trim().to_lowercase().as_str() {
        "auto" => Some(AlignSelf::Auto),
        "stretch" => Some(AlignSelf::Stretch),
        "flex-start" | "start" => Some(AlignSelf::FlexStart),
        "flex-end" | "end" => Some(AlignSelf::FlexEnd),
        "center" => Some(AlignSelf::Center),
        "baseline" => Some(AlignSelf::Baseline),
        _ => None,
    }
}

/// Parse a flex-basis value.
pub fn parse_flex_basis(value: &str) -> Option<FlexBasis> {
    let value = value.trim();
    match value.to_lowercase().as_str() {
        "auto" => return Some(FlexBasis::Auto),
        "content" => return Some(FlexBasis::Content),
        _ => {}
    }
    match parse_length(value)? {
        Length::Px(px) => Some(FlexBasis::Length(px)),
        Length::Percent(pct) => Some(FlexBasis::Percent(pct)),
        Length::Zero => Some(FlexBasis::Length(0.0)),
        _ => None,
    }
}

/// Parse the `flex` shorthand into `(grow, shrink, basis)`.
///
/// Handles the keyword forms (`none`, `auto`, `initial`) and the
/// one/two/three-value numeric forms.
pub fn parse_flex_shorthand(value: &str) -> Result<(f32, f32, FlexBasis), CssError> {
    let value = value.trim();
    debug!(value, "Parsing flex shorthand");

    match value.to_lowercase().as_str() {
        "none" => return Ok((0.0, 0.0, FlexBasis::Auto)),
        "auto" => return Ok((1.0, 1.0, FlexBasis::Auto)),
        "initial" => return Ok((0.0, 1.0, FlexBasis::Auto)),
        _ => {}
    }

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [grow] => {
            let grow = parse_flex_factor(grow)?;
            Ok((grow, 1.0, FlexBasis::Length(0.0)))
        }
        [grow, second] => {
            let grow = parse_flex_factor(grow)?;
            // Second value is shrink if a plain number, basis otherwise.
            if let Ok(shrink) = second.parse::<f32>() {
                validate_flex_factor(shrink, second)?;
                Ok((grow, shrink, FlexBasis::Length(0.0)))
            } else {
                let basis = parse_flex_basis(second)
                    .ok_or_else(|| CssError::InvalidValue(second.to_string()))?;
                Ok((grow, 1.0, basis))
            }
        }
        [grow, shrink, basis] => {
            let grow = parse_flex_factor(grow)?;
            let shrink = parse_flex_factor(shrink)?;
            let basis =
                parse_flex_basis(basis).ok_or_else(|| CssError::InvalidValue(basis.to_string()))?;
            Ok((grow, shrink, basis))
        }
        _ => Err(CssError::ParseError(value.to_string())),
    }
}

fn parse_flex_factor(value: &str) -> Result<f32, CssError> {
    let factor = value
        .parse::<f32>()
        .map_err(|_| CssError::InvalidValue(value.to_string()))?;
    validate_flex_factor(factor, value)?;
    Ok(factor)
}

fn validate_flex_factor(factor: f32, raw: &str) -> Result<(), CssError> {
    if factor < 0.0 || !factor.is_finite() {
        return Err(CssError::InvalidValue(raw.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("10px"), Some(Length::Px(10.0)));
        assert_eq!(parse_length("1.5em"), Some(Length::Em(1.5)));
        assert_eq!(parse_length("2rem"), Some(Length::Rem(2.0)));
        assert_eq!(parse_length("50%"), Some(Length::Percent(50.0)));
        assert_eq!(parse_length("auto"), Some(Length::Auto));
        assert_eq!(parse_length("0"), Some(Length::Zero));
        assert_eq!(parse_length("bogus"), None);
    }

    #[test]
    fn test_length_to_px() {
        assert_eq!(Length::Px(12.0).to_px(16.0, 16.0, 100.0), 12.0);
        assert_eq!(Length::Em(2.0).to_px(10.0, 16.0, 100.0), 20.0);
        assert_eq!(Length::Percent(25.0).to_px(16.0, 16.0, 200.0), 50.0);
        assert_eq!(Length::Auto.to_px(16.0, 16.0, 100.0), 0.0);
    }

    #[test]
    fn test_parse_flex_direction() {
        assert_eq!(parse_flex_direction("row"), Some(FlexDirection::Row));
        assert_eq!(
            parse_flex_direction("row-reverse"),
            Some(FlexDirection::RowReverse)
        );
        assert_eq!(parse_flex_direction("column"), Some(FlexDirection::Column));
        assert_eq!(
            parse_flex_direction("column-reverse"),
            Some(FlexDirection::ColumnReverse)
        );
        assert_eq!(parse_flex_direction("diagonal"), None);
    }

    #[test]
    fn test_parse_alignment_keywords() {
        assert_eq!(
            parse_justify_content("space-between"),
            Some(JustifyContent::SpaceBetween)
        );
        assert_eq!(parse_align_items("baseline"), Some(AlignItems::Baseline));
        assert_eq!(
            parse_align_content("space-around"),
            Some(AlignContent::SpaceAround)
        );
        assert_eq!(parse_align_self("auto"), Some(AlignSelf::Auto));
        assert_eq!(parse_flex_wrap("wrap-reverse"), Some(FlexWrap::WrapReverse));
    }

    #[test]
    fn test_parse_flex_basis() {
        assert_eq!(parse_flex_basis("auto"), Some(FlexBasis::Auto));
        assert_eq!(parse_flex_basis("content"), Some(FlexBasis::Content));
        assert_eq!(parse_flex_basis("120px"), Some(FlexBasis::Length(120.0)));
        assert_eq!(parse_flex_basis("30%"), Some(FlexBasis::Percent(30.0)));
    }

    #[test]
    fn test_parse_flex_shorthand() {
        assert_eq!(
            parse_flex_shorthand("none").unwrap(),
            (0.0, 0.0, FlexBasis::Auto)
        );
        assert_eq!(
            parse_flex_shorthand("auto").unwrap(),
            (1.0, 1.0, FlexBasis::Auto)
        );
        assert_eq!(
            parse_flex_shorthand("2").unwrap(),
            (2.0, 1.0, FlexBasis::Length(0.0))
        );
        assert_eq!(
            parse_flex_shorthand("2 3").unwrap(),
            (2.0, 3.0, FlexBasis::Length(0.0))
        );
        assert_eq!(
            parse_flex_shorthand("1 100px").unwrap(),
            (1.0, 1.0, FlexBasis::Length(100.0))
        );
        assert_eq!(
            parse_flex_shorthand("1 0 50%").unwrap(),
            (1.0, 0.0, FlexBasis::Percent(50.0))
        );
        assert!(parse_flex_shorthand("-1").is_err());
        assert!(parse_flex_shorthand("").is_err());
    }

    #[test]
    fn test_align_self_resolution() {
        assert_eq!(
            AlignSelf::Auto.resolve(AlignItems::Center),
            AlignItems::Center
        );
        assert_eq!(
            AlignSelf::FlexEnd.resolve(AlignItems::Center),
            AlignItems::FlexEnd
        );
        assert_eq!(
            AlignSelf::Stretch.resolve(AlignItems::Baseline),
            AlignItems::Stretch
        );
    }

    #[test]
    fn test_computed_style_defaults() {
        let style = ComputedStyle::new();
        assert_eq!(style.flex_shrink, 1.0);
        assert_eq!(style.flex_grow, 0.0);
        assert_eq!(style.flex_basis, FlexBasis::Auto);
        assert_eq!(style.order, 0);
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.flex_wrap, FlexWrap::NoWrap);
        assert_eq!(style.align_items, AlignItems::Stretch);
        assert_eq!(style.width, Length::Auto);
        assert_eq!(style.height, Length::Auto);
        assert_eq!(style.max_width, Length::Auto);
        assert_eq!(style.margin_left, Length::Zero);
    }
}
