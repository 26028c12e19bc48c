//! Chart model, formatting and terminal drawing

pub mod figure;
pub mod format;
pub mod locator;
pub mod renderer;
pub mod widget;

pub use figure::{Axes, Figure};
pub use renderer::{ChartRenderer, FigureHandle, Presenter, Rendered};
pub use widget::{FigureWidget, InlinePresenter};
