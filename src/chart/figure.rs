//! Backend-neutral figure model
//!
//! A [`Figure`] owns exactly one [`Axes`]. Renderers fill the axes with plain
//! data; drawing backends such as [`crate::chart::widget::FigureWidget`] turn
//! it into pixels or terminal cells.

use chrono::{Datelike, NaiveDate};

/// Converts a calendar date to the x coordinate used by every element.
pub fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesColor {
    Primary,
    Secondary,
    Highlight,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub width: f32,
    pub color: SeriesColor,
}

/// Area between `points` and a horizontal baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaFill {
    pub points: Vec<(f64, f64)>,
    pub baseline: f64,
    pub alpha: f32,
    pub color: SeriesColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub color: SeriesColor,
}

/// Text placed at a fraction of the axes span away from the point it
/// describes, optionally joined to it by an arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub text_offset: (f64, f64),
    pub arrow: bool,
}

impl Annotation {
    /// Where the text sits, clamped into the given bounds.
    pub fn text_position(&self, x_bounds: [f64; 2], y_bounds: [f64; 2]) -> (f64, f64) {
        let x = self.x + self.text_offset.0 * (x_bounds[1] - x_bounds[0]);
        let y = self.y + self.text_offset.1 * (y_bounds[1] - y_bounds[0]);
        (
            x.clamp(x_bounds[0], x_bounds[1]),
            y.clamp(y_bounds[0], y_bounds[1]),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    pub bounds: [f64; 2],
    pub ticks: Vec<Tick>,
    /// Extra context for concise tick labels, e.g. the year.
    pub offset_label: Option<String>,
    pub tick_rotation: f32,
    pub tick_align: HAlign,
}

impl Default for Axis {
    fn default() -> Self {
        Axis {
            label: String::new(),
            bounds: [0.0, 1.0],
            ticks: Vec::new(),
            offset_label: None,
            tick_rotation: 0.0,
            tick_align: HAlign::Center,
        }
    }
}

impl Axis {
    pub fn span(&self) -> f64 {
        self.bounds[1] - self.bounds[0]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axes {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub lines: Vec<LineSeries>,
    pub fills: Vec<AreaFill>,
    pub markers: Vec<Marker>,
    pub annotations: Vec<Annotation>,
    pub hover: Vec<HoverLabel>,
    pub legend: bool,
    pub grid: bool,
}

impl Axes {
    pub fn clear(&mut self) {
        *self = Axes::default();
    }

    pub fn is_blank(&self) -> bool {
        self.lines.is_empty() && self.fills.is_empty() && self.markers.is_empty()
    }

    /// Index of the hover label nearest to `x`.
    pub fn nearest_hover(&self, x: f64) -> Option<usize> {
        self.hover
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
            .map(|(i, _)| i)
    }
}

/// A drawing surface holding a single set of axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Figure {
    axes: Axes,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut Axes {
        &mut self.axes
    }

    pub fn clear(&mut self) {
        self.axes.clear();
    }
}
