use egui::Color32;
use serde::{Deserialize, Serialize};

/// Dash pattern of a pen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PenStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    /// Outline is not drawn at all
    NoPen,
}

impl PenStyle {
    /// Alternating on/off lengths in units of the pen width. `None` for solid lines.
    pub fn dash_pattern(self) -> Option<&'static [f32]> {
        match self {
            PenStyle::Solid | PenStyle::NoPen => None,
            PenStyle::Dash => Some(&[4.0, 2.0]),
            PenStyle::Dot => Some(&[1.0, 2.0]),
            PenStyle::DashDot => Some(&[4.0, 2.0, 1.0, 2.0]),
            PenStyle::DashDotDot => Some(&[4.0, 2.0, 1.0, 2.0, 1.0, 2.0]),
        }
    }
}

/// How open line ends are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapStyle {
    Flat,
    Square,
    #[default]
    Round,
}

/// How consecutive segments meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoinStyle {
    Miter,
    Bevel,
    #[default]
    Round,
}

/// Outline style of a shape or brush segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub color: Color32,
    pub width: f32,
    pub style: PenStyle,
    pub cap: CapStyle,
    pub join: JoinStyle,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 1.0,
            style: PenStyle::Solid,
            cap: CapStyle::Round,
            join: JoinStyle::Round,
        }
    }
}

impl Pen {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            color,
            width,
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: PenStyle, cap: CapStyle, join: JoinStyle) -> Self {
        self.style = style;
        self.cap = cap;
        self.join = join;
        self
    }

    /// Zero-width pens still draw a single pixel wide line.
    pub fn effective_width(&self) -> f32 {
        self.width.max(1.0)
    }

    pub fn is_visible(&self) -> bool {
        self.style != PenStyle::NoPen && self.color.a() > 0
    }
}

/// Fill pattern of a closed shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillStyle {
    #[default]
    NoFill,
    Solid,
    Horizontal,
    Vertical,
    Cross,
    BackwardDiagonal,
    ForwardDiagonal,
    DiagonalCross,
}

/// Spacing of hatch lines in pixels
const HATCH_SPACING: i64 = 8;

impl FillStyle {
    /// Whether the pattern paints the pixel at image coordinates `(x, y)`.
    pub fn covers(self, x: i64, y: i64) -> bool {
        let on = |v: i64| v.rem_euclid(HATCH_SPACING) == 0;
        match self {
            FillStyle::NoFill => false,
            FillStyle::Solid => true,
            FillStyle::Horizontal => on(y),
            FillStyle::Vertical => on(x),
            FillStyle::Cross => on(x) || on(y),
            FillStyle::BackwardDiagonal => on(x + y),
            FillStyle::ForwardDiagonal => on(x - y),
            FillStyle::DiagonalCross => on(x + y) || on(x - y),
        }
    }
}

/// Interior of a closed shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub style: FillStyle,
    pub color: Color32,
}

impl Default for Fill {
    fn default() -> Self {
        Self::none()
    }
}

impl Fill {
    pub fn none() -> Self {
        Self {
            style: FillStyle::NoFill,
            color: Color32::TRANSPARENT,
        }
    }

    pub fn solid(color: Color32) -> Self {
        Self {
            style: FillStyle::Solid,
            color,
        }
    }

    pub fn is_none(&self) -> bool {
        self.style == FillStyle::NoFill
    }
}

/// What the fill selector in the toolbar asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillChoice {
    #[default]
    None,
    /// Pattern painted with the first color
    Pattern(FillStyle),
    /// Solid fill with the second color
    SecondColor,
}

/// Font of a text shape. `size` is in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
}

pub const MONOSPACE_FAMILY: &str = "Monospace";
pub const PROPORTIONAL_FAMILY: &str = "Proportional";

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: PROPORTIONAL_FAMILY.to_owned(),
            size: 16.0,
        }
    }
}

impl FontSpec {
    pub fn is_monospace(&self) -> bool {
        self.family.eq_ignore_ascii_case(MONOSPACE_FAMILY)
    }
}

impl std::fmt::Display for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}px", self.family, self.size)
    }
}

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 300;

/// Opacity of the brush outline preview relative to the brush opacity
const PREVIEW_ALPHA_RATIO: f32 = 0.31;

/// Style state published by the toolbar into the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolStyle {
    pub first_color: Color32,
    pub second_color: Color32,
    pub text_color: Color32,
    pub brush_size: u32,
    /// 0.0 (transparent) ..= 1.0 (opaque)
    pub brush_opacity: f32,
    pub pen_style: PenStyle,
    pub pen_cap: CapStyle,
    pub pen_join: JoinStyle,
    pub fill: FillChoice,
    pub font: FontSpec,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            first_color: Color32::BLACK,
            second_color: Color32::WHITE,
            text_color: Color32::BLACK,
            brush_size: 20,
            brush_opacity: 1.0,
            pen_style: PenStyle::Solid,
            pen_cap: CapStyle::Round,
            pen_join: JoinStyle::Round,
            fill: FillChoice::None,
            font: FontSpec::default(),
        }
    }
}

impl ToolStyle {
    /// Outline pen for committed shapes.
    pub fn shape_pen(&self) -> Pen {
        Pen::new(self.first_color, self.brush_size as f32).with_style(
            self.pen_style,
            self.pen_cap,
            self.pen_join,
        )
    }

    /// Brush pen in the given color with the brush opacity applied.
    pub fn brush_pen(&self, color: Color32) -> Pen {
        Pen::new(with_opacity(color, self.brush_opacity), self.brush_size as f32).with_style(
            self.pen_style,
            self.pen_cap,
            self.pen_join,
        )
    }

    pub fn shape_fill(&self) -> Fill {
        match self.fill {
            FillChoice::None => Fill::none(),
            FillChoice::SecondColor => Fill::solid(self.second_color),
            FillChoice::Pattern(style) => Fill {
                style,
                color: self.first_color,
            },
        }
    }

    pub fn brush_preview_color(&self) -> Color32 {
        with_opacity(self.first_color, self.brush_opacity * PREVIEW_ALPHA_RATIO)
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn adjust_brush_size(&mut self, amount: i32) {
        let size = (self.brush_size as i64 + amount as i64)
            .clamp(MIN_BRUSH_SIZE as i64, MAX_BRUSH_SIZE as i64);
        self.brush_size = size as u32;
    }

    /// Opacity given in percent, as the toolbar reports it.
    pub fn set_brush_opacity_percent(&mut self, percent: f32) {
        self.brush_opacity = (percent / 100.0).clamp(0.0, 1.0);
    }

    /// Exchanges first and second color. The text color follows the new first color.
    pub fn swap_colors(&mut self) {
        std::mem::swap(&mut self.first_color, &mut self.second_color);
        self.text_color = self.first_color;
    }
}

/// Replaces the alpha of `color` with `opacity` (0.0 ..= 1.0).
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}
