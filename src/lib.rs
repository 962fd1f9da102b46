pub mod align;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod log;
pub mod raster;
pub mod render;
pub mod surface;
pub mod symbol;
pub mod text_metrics;
pub mod theme;
pub mod transform;

#[cfg(feature = "cli")]
pub use cli::run;
pub use color::Color;
pub use config::{Config, load_config};
pub use error::RenderError;
pub use raster::PixmapSurface;
pub use render::{RenderOptions, SymbolRenderer, render_symbol};
pub use surface::{DrawCall, Fill, RecordingSurface, Surface};
pub use symbol::{Ellipse, Hexagon, HumanReadableAlignment, Rectangle, Symbol, TextBox};
pub use text_metrics::{FixedAdvanceMeasurer, Font, FontBook, TextBounds, TextMeasurer};
pub use theme::Palette;
