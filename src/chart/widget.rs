//! Terminal drawing of a [`Figure`]

use crate::chart::figure::{Axes, Figure, HAlign, SeriesColor};
use crate::chart::renderer::Presenter;
use anyhow::Context;
use crossterm::style::Print;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker as CanvasMarker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context as CanvasContext, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Widget};
use ratatui::{TerminalOptions, Viewport};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

const Y_LABEL_GAP: u16 = 1;

/// Size in cells of a chart written by [`save_figure`].
pub const SAVED_FIGURE_WIDTH: u16 = 100;
pub const SAVED_FIGURE_HEIGHT: u16 = 30;

fn color(series: SeriesColor) -> Color {
    match series {
        SeriesColor::Primary => Color::Cyan,
        SeriesColor::Secondary => Color::Yellow,
        SeriesColor::Highlight => Color::LightRed,
        SeriesColor::Muted => Color::DarkGray,
    }
}

/// Low-opacity fills have no terminal equivalent; a dim variant stands in.
fn fill_color(series: SeriesColor) -> Color {
    match series {
        SeriesColor::Primary => Color::Rgb(0, 70, 80),
        SeriesColor::Secondary => Color::Rgb(80, 70, 0),
        SeriesColor::Highlight => Color::Rgb(90, 30, 30),
        SeriesColor::Muted => Color::Rgb(40, 40, 40),
    }
}

/// Draws a figure: title and legend on top, y labels on the left, date
/// labels below, plot in a braille canvas.
pub struct FigureWidget<'a> {
    figure: &'a Figure,
    cursor: Option<usize>,
}

impl<'a> FigureWidget<'a> {
    pub fn new(figure: &'a Figure) -> Self {
        FigureWidget {
            figure,
            cursor: None,
        }
    }

    /// Highlights the hover label at `index`.
    pub fn cursor(mut self, index: Option<usize>) -> Self {
        self.cursor = index;
        self
    }
}

impl Widget for FigureWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let axes = self.figure.axes();
        let title = Line::from(axes.title.clone())
            .style(Style::default().add_modifier(Modifier::BOLD));
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        if axes.is_blank() || inner.width < 12 || inner.height < 6 {
            return;
        }

        let mut top = inner.y;
        if axes.legend {
            buf.set_line(inner.x, top, &legend_line(axes), inner.width);
            top += 1;
        }

        let y_label_width = axes
            .y_axis
            .ticks
            .iter()
            .map(|t| t.label.chars().count() as u16)
            .max()
            .unwrap_or(0)
            + Y_LABEL_GAP;
        let bottom_rows = 2;
        let plot = Rect {
            x: inner.x + y_label_width,
            y: top,
            width: inner.width.saturating_sub(y_label_width),
            height: (inner.y + inner.height).saturating_sub(top + bottom_rows),
        };
        if plot.width < 4 || plot.height < 2 {
            return;
        }

        draw_y_labels(axes, plot, inner.x, buf);
        draw_x_labels(axes, plot, inner, buf);

        let cursor = self.cursor.and_then(|i| axes.hover.get(i));
        let pixel_height = axes.y_axis.span() / f64::from(plot.height * 4);
        Canvas::default()
            .marker(CanvasMarker::Braille)
            .x_bounds(axes.x_axis.bounds)
            .y_bounds(axes.y_axis.bounds)
            .paint(|ctx| {
                paint_axes(ctx, axes, plot.width, pixel_height);
                if let Some(label) = cursor {
                    ctx.layer();
                    ctx.draw(&CanvasLine::new(
                        label.x,
                        axes.y_axis.bounds[0],
                        label.x,
                        axes.y_axis.bounds[1],
                        Color::Gray,
                    ));
                    ctx.print(
                        axes.x_axis.bounds[0],
                        axes.y_axis.bounds[1],
                        Span::styled(label.text.clone(), Style::default().fg(Color::White)),
                    );
                }
            })
            .render(plot, buf);
    }
}

fn legend_line(axes: &Axes) -> Line<'static> {
    let mut spans = Vec::new();
    for line in &axes.lines {
        spans.push(Span::styled("━━ ", Style::default().fg(color(line.color))));
        spans.push(Span::raw(format!("{}   ", line.label)));
    }
    Line::from(spans)
}

fn draw_y_labels(axes: &Axes, plot: Rect, left: u16, buf: &mut Buffer) {
    let span = axes.y_axis.span();
    for tick in &axes.y_axis.ticks {
        let frac = (tick.value - axes.y_axis.bounds[0]) / span;
        let offset = (frac * f64::from(plot.height - 1)).round() as u16;
        let row = plot.y + plot.height - 1 - offset.min(plot.height - 1);
        let width = plot.x - left - Y_LABEL_GAP;
        let label = format!("{:>width$}", tick.label, width = width as usize);
        buf.set_string(left, row, label, Style::default().fg(Color::Gray));
    }
}

fn draw_x_labels(axes: &Axes, plot: Rect, inner: Rect, buf: &mut Buffer) {
    let row = plot.y + plot.height;
    let span = axes.x_axis.span();
    let right_edge = inner.x + inner.width;
    for tick in &axes.x_axis.ticks {
        let frac = (tick.value - axes.x_axis.bounds[0]) / span;
        let col = plot.x + (frac * f64::from(plot.width - 1)).round() as u16;
        let len = tick.label.chars().count() as u16;
        let start = match axes.x_axis.tick_align {
            HAlign::Left => col,
            HAlign::Center => col.saturating_sub(len / 2),
            HAlign::Right => col.saturating_sub(len.saturating_sub(1)),
        }
        .max(inner.x)
        .min(right_edge.saturating_sub(len));
        buf.set_string(start, row, &tick.label, Style::default().fg(Color::Gray));
    }

    let caption = match &axes.x_axis.offset_label {
        Some(offset) => format!("{} ({})", axes.x_axis.label, offset),
        None => axes.x_axis.label.clone(),
    };
    let len = caption.chars().count() as u16;
    let start = plot.x + plot.width.saturating_sub(len) / 2;
    buf.set_string(start, row + 1, caption, Style::default().fg(Color::DarkGray));
}

fn paint_axes(ctx: &mut CanvasContext<'_>, axes: &Axes, columns: u16, pixel_height: f64) {
    let [x0, x1] = axes.x_axis.bounds;
    let [y0, y1] = axes.y_axis.bounds;

    if axes.grid {
        for tick in &axes.x_axis.ticks {
            ctx.draw(&CanvasLine::new(tick.value, y0, tick.value, y1, Color::DarkGray));
        }
        for tick in &axes.y_axis.ticks {
            ctx.draw(&CanvasLine::new(x0, tick.value, x1, tick.value, Color::DarkGray));
        }
        ctx.layer();
    }

    // Vertical strokes at braille resolution approximate the shaded area.
    let samples = usize::from(columns) * 2;
    for fill in &axes.fills {
        let fill_color = fill_color(fill.color);
        for s in 0..=samples {
            let x = x0 + (x1 - x0) * s as f64 / samples.max(1) as f64;
            if let Some(y) = interpolate(&fill.points, x) {
                ctx.draw(&CanvasLine::new(x, fill.baseline, x, y, fill_color));
            }
        }
    }
    if !axes.fills.is_empty() {
        ctx.layer();
    }

    for line in &axes.lines {
        let line_color = color(line.color);
        // Wider lines get extra strokes one pixel apart.
        let strokes = line.width.round().max(1.0) as i32;
        for stroke in 0..strokes {
            let dy = f64::from(stroke) * pixel_height;
            for pair in line.points.windows(2) {
                let ((xa, ya), (xb, yb)) = (pair[0], pair[1]);
                ctx.draw(&CanvasLine::new(xa, ya + dy, xb, yb + dy, line_color));
            }
            if line.points.len() == 1 {
                ctx.draw(&Points {
                    coords: &line.points,
                    color: line_color,
                });
            }
        }
    }
    ctx.layer();

    for marker in &axes.markers {
        ctx.draw(&Points {
            coords: &[(marker.x, marker.y)],
            color: color(marker.color),
        });
    }
    for note in &axes.annotations {
        let (tx, ty) = note.text_position(axes.x_axis.bounds, axes.y_axis.bounds);
        if note.arrow {
            ctx.draw(&CanvasLine::new(tx, ty, note.x, note.y, Color::White));
        }
        ctx.print(
            tx,
            ty,
            Span::styled(
                note.text.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        );
    }
}

/// Linear interpolation over points sorted by x.
fn interpolate(points: &[(f64, f64)], x: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if x < first.0 || x > last.0 {
        return None;
    }
    if points.len() == 1 {
        return Some(first.1);
    }
    points.windows(2).find_map(|pair| {
        let ((xa, ya), (xb, yb)) = (pair[0], pair[1]);
        if x < xa || x > xb {
            return None;
        }
        if xb == xa {
            return Some(yb);
        }
        Some(ya + (yb - ya) * (x - xa) / (xb - xa))
    })
}

/// Draws `figure` into an off-screen buffer of `width` by `height` cells
/// and returns the rows as plain text without trailing blanks.
pub fn figure_text(figure: &Figure, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    FigureWidget::new(figure).render(area, &mut buf);

    let mut text = String::new();
    for y in 0..height {
        let row: String = (0..width).map(|x| buf[(x, y)].symbol()).collect();
        text.push_str(row.trim_end());
        text.push('\n');
    }
    text
}

/// Writes the text drawing of `figure` to `path`, logging instead of failing.
pub fn save_figure(figure: &Figure, path: &Path) {
    let text = figure_text(figure, SAVED_FIGURE_WIDTH, SAVED_FIGURE_HEIGHT);
    match fs::write(path, text).with_context(|| format!("Failed to write {}", path.display())) {
        Ok(()) => info!("Saved chart to {}", path.display()),
        Err(e) => warn!("Failed to save chart; continuing without saving: {e:#}"),
    }
}

/// Draws a stand-alone figure once into an inline terminal viewport and
/// returns straight away.
pub struct InlinePresenter {
    height: u16,
}

impl InlinePresenter {
    pub fn new(height: u16) -> Self {
        InlinePresenter { height }
    }
}

impl Presenter for InlinePresenter {
    fn present(&self, figure: &Figure) -> anyhow::Result<()> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(self.height),
            },
        )
        .context("Failed to open inline terminal viewport")?;

        terminal
            .draw(|frame| frame.render_widget(FigureWidget::new(figure), frame.area()))
            .context("Failed to draw chart")?;
        crossterm::execute!(io::stdout(), Print("\n")).context("Failed to finish chart")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::renderer::ChartRenderer;
    use crate::core::currency::{RateResult, RateSource};
    use crate::core::history::ConvertedSeries;
    use crate::core::symbol::Symbol;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn figure() -> Figure {
        let dates = (1..=10)
            .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
            .collect();
        let prices = vec![
            13000.0, 13130.0, 12870.0, 12990.0, 13210.0, 13300.0, 13150.0, 13420.0, 13380.0,
            13510.0,
        ];
        let series = ConvertedSeries::from_parts(dates, prices).unwrap();
        let rate = RateResult {
            value: 130.0,
            source: RateSource::Live,
        };
        let mut figure = Figure::new();
        ChartRenderer::default()
            .render(&Symbol::parse("AAPL").unwrap(), &series, rate, Some(&mut figure))
            .unwrap();
        figure
    }

    #[test]
    fn test_widget_draws_title_legend_and_labels() {
        let figure = figure();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(FigureWidget::new(&figure), frame.area()))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("AAPL Stock Price Trend — Prices in NPR"));
        assert!(text.contains("AAPL Close (NPR)"));
        assert!(text.contains("7-day MA"));
        assert!(text.contains("Rs 13,"));
        assert!(text.contains("Mar 01"));
        assert!(text.contains("Date (2024)"));
        assert!(text.contains("Rs 13,510.00"));
    }

    #[test]
    fn test_widget_shows_hover_label_under_cursor() {
        let figure = figure();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_widget(FigureWidget::new(&figure).cursor(Some(2)), frame.area())
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("2024-03-03: Rs 12,870"));
    }

    #[test]
    fn test_tiny_area_draws_only_frame() {
        let figure = figure();
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(FigureWidget::new(&figure), frame.area()))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(!text.contains("Rs"));
    }

    #[test]
    fn test_interpolate() {
        let points = [(0.0, 0.0), (2.0, 4.0), (4.0, 0.0)];
        assert_eq!(interpolate(&points, 1.0), Some(2.0));
        assert_eq!(interpolate(&points, 3.0), Some(2.0));
        assert_eq!(interpolate(&points, 5.0), None);
        assert_eq!(interpolate(&[(1.0, 7.0)], 1.0), Some(7.0));
    }

    #[test]
    fn test_figure_text_trims_rows() {
        let text = figure_text(&figure(), 100, 24);
        assert_eq!(text.lines().count(), 24);
        assert!(text.lines().all(|line| !line.ends_with(' ')));
        assert!(text.contains("AAPL Stock Price Trend — Prices in NPR"));
        assert!(text.contains("Rs 13,510.00"));
    }

    #[test]
    fn test_save_figure_writes_text_drawing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("aapl.txt");

        save_figure(&figure(), &path);

        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(saved.lines().count(), usize::from(SAVED_FIGURE_HEIGHT));
        assert!(saved.contains("AAPL Stock Price Trend — Prices in NPR"));
        assert!(saved.contains("7-day MA"));
        assert!(saved.contains("Date (2024)"));
    }

    #[test]
    fn test_save_figure_into_missing_directory_is_not_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("aapl.txt");

        save_figure(&figure(), &path);

        assert!(!path.exists());
    }
}
