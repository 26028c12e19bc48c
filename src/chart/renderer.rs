use crate::chart::figure::{
    Annotation, AreaFill, Axes, Axis, Figure, HAlign, HoverLabel, LineSeries, Marker,
    SeriesColor, Tick, date_to_x,
};
use crate::chart::format::{format_rupees, format_rupees_precise};
use crate::chart::locator;
use crate::core::analytics::{finite_bounds, moving_average};
use crate::core::config::{ChartConfig, DEFAULT_MOVING_AVERAGE_WINDOW};
use crate::core::currency::RateResult;
use crate::core::error::{TrackerError, TrackerResult};
use crate::core::history::ConvertedSeries;
use crate::core::symbol::Symbol;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_X_TICKS: usize = 6;
const Y_TICKS: usize = 5;
const PRIMARY_LINE_WIDTH: f32 = 2.2;
const FILL_ALPHA: f32 = 0.12;

/// Shows a stand-alone figure without waiting for the viewer.
pub trait Presenter: Send + Sync {
    fn present(&self, figure: &Figure) -> anyhow::Result<()>;
}

/// The figure a render call drew into.
#[derive(Debug)]
pub enum FigureHandle<'a> {
    /// The caller's own figure, cleared and redrawn.
    Embedded(&'a mut Figure),
    /// A figure created for this call.
    Standalone(Figure),
}

impl Deref for FigureHandle<'_> {
    type Target = Figure;

    fn deref(&self) -> &Figure {
        match self {
            FigureHandle::Embedded(figure) => figure,
            FigureHandle::Standalone(figure) => figure,
        }
    }
}

#[derive(Debug)]
pub struct Rendered<'a> {
    pub rate: RateResult,
    pub figure: FigureHandle<'a>,
}

impl Rendered<'_> {
    pub fn axes(&self) -> &Axes {
        self.figure.axes()
    }
}

/// Draws the NPR price chart for one symbol.
pub struct ChartRenderer {
    window: usize,
    hover: bool,
    presenter: Option<Arc<dyn Presenter>>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        ChartRenderer {
            window: DEFAULT_MOVING_AVERAGE_WINDOW,
            hover: true,
            presenter: None,
        }
    }
}

impl ChartRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        ChartRenderer {
            window: config.moving_average_window.max(1),
            hover: config.hover,
            presenter: None,
        }
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Renders into `target` when given; otherwise creates a figure and hands
    /// it to the presenter, if any.
    pub fn render<'a>(
        &self,
        symbol: &Symbol,
        series: &ConvertedSeries,
        rate: RateResult,
        target: Option<&'a mut Figure>,
    ) -> TrackerResult<Rendered<'a>> {
        info!("Plotting data for {}", symbol);
        if series.is_empty() {
            return Err(TrackerError::NoData(symbol.to_string()));
        }
        if let Some(i) = series.prices().iter().position(|p| !p.is_finite()) {
            return Err(TrackerError::PlotError(format!(
                "non-finite price at index {i} for {symbol}"
            )));
        }

        let figure = match target {
            Some(figure) => {
                figure.clear();
                self.draw(figure.axes_mut(), symbol, series, rate);
                FigureHandle::Embedded(figure)
            }
            None => {
                let mut figure = Figure::new();
                self.draw(figure.axes_mut(), symbol, series, rate);
                if let Some(presenter) = &self.presenter {
                    if let Err(e) = presenter.present(&figure) {
                        warn!("Non-blocking show failed: {e:#}");
                    }
                }
                FigureHandle::Standalone(figure)
            }
        };

        Ok(Rendered { rate, figure })
    }

    fn draw(&self, axes: &mut Axes, symbol: &Symbol, series: &ConvertedSeries, rate: RateResult) {
        let xs: Vec<f64> = series.dates().iter().map(|d| date_to_x(*d)).collect();
        let prices = series.prices();
        let averages = moving_average(prices, self.window);

        let points: Vec<(f64, f64)> = xs.iter().copied().zip(prices.iter().copied()).collect();
        let avg_points: Vec<(f64, f64)> =
            xs.iter().copied().zip(averages.iter().copied()).collect();

        axes.title = format!("{symbol} Stock Price Trend — Prices in NPR");
        axes.x_axis = self.date_axis(series);
        axes.y_axis = price_axis(prices.iter().chain(averages.iter()));

        axes.fills.push(AreaFill {
            points: points.clone(),
            baseline: axes.y_axis.bounds[0],
            alpha: FILL_ALPHA,
            color: SeriesColor::Primary,
        });
        axes.lines.push(LineSeries {
            label: format!("{symbol} Close (NPR)"),
            points: points.clone(),
            width: PRIMARY_LINE_WIDTH,
            color: SeriesColor::Primary,
        });
        axes.lines.push(LineSeries {
            label: format!("{}-day MA", self.window),
            points: avg_points,
            width: 1.2,
            color: SeriesColor::Secondary,
        });

        if let Some(&(x, y)) = points.last() {
            axes.markers.push(Marker {
                x,
                y,
                color: SeriesColor::Highlight,
            });
            axes.annotations.push(Annotation {
                text: format_rupees_precise(y),
                x,
                y,
                text_offset: (-0.3, 0.12),
                arrow: true,
            });
        }

        if self.hover {
            axes.hover = series
                .dates()
                .iter()
                .zip(&points)
                .map(|(date, &(x, y))| HoverLabel {
                    x,
                    y,
                    text: format!("{}: {}", date.format("%Y-%m-%d"), format_rupees(y)),
                })
                .collect();
        }

        axes.legend = true;
        axes.grid = true;
        debug!(
            "Drew {} points for {} at {}",
            points.len(),
            symbol,
            rate.banner()
        );
    }

    fn date_axis(&self, series: &ConvertedSeries) -> Axis {
        let dates = series.dates();
        let (first, last) = (dates[0], dates[dates.len() - 1]);
        let unit = locator::choose_unit(first, last, MAX_X_TICKS);

        let (lo, hi) = (date_to_x(first), date_to_x(last));
        let bounds = if hi > lo { [lo, hi] } else { [lo - 1.0, hi + 1.0] };

        Axis {
            label: "Date".to_string(),
            bounds,
            ticks: locator::tick_dates(first, last, unit)
                .into_iter()
                .map(|date| Tick {
                    value: date_to_x(date),
                    label: locator::concise_label(date, unit),
                })
                .collect(),
            offset_label: locator::offset_label(first, last, unit),
            tick_rotation: 30.0,
            tick_align: HAlign::Right,
        }
    }
}

fn price_axis<'a>(values: impl IntoIterator<Item = &'a f64>) -> Axis {
    let (lo, hi) = finite_bounds(values).unwrap_or((0.0, 1.0));
    let pad = if hi > lo {
        (hi - lo) * 0.05
    } else {
        (hi.abs() * 0.01).max(1.0)
    };
    let bounds = [lo - pad, hi + pad];

    let step = (bounds[1] - bounds[0]) / (Y_TICKS - 1) as f64;
    let ticks = (0..Y_TICKS)
        .map(|i| {
            let value = bounds[0] + step * i as f64;
            Tick {
                value,
                label: format_rupees(value),
            }
        })
        .collect();

    Axis {
        label: "Price (NPR)".to_string(),
        bounds,
        ticks,
        offset_label: None,
        tick_rotation: 0.0,
        tick_align: HAlign::Right,
    }
}
