use crate::align::{JustifyMode, layout_text};
use crate::color::Color;
use crate::error::RenderError;
use crate::log::{debug, warn};
use crate::surface::{Fill, Surface, SurfaceGuard};
use crate::symbol::Symbol;
use crate::text_metrics::{Font, TextMeasurer};
use crate::transform::{DeviceRect, TargetGeometry, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub justify: JustifyMode,
    pub target_geometry: TargetGeometry,
}

/// Draws symbols onto a surface with one fixed visual style.
///
/// If `paper` is `None` the background is left untouched, so symbols can be
/// composited over whatever the caller already drew.
pub struct SymbolRenderer<S, M> {
    surface: S,
    measurer: M,
    magnification: f64,
    paper: Option<Color>,
    ink: Color,
    options: RenderOptions,
}

impl<S: Surface, M: TextMeasurer> SymbolRenderer<S, M> {
    pub fn new(
        surface: S,
        measurer: M,
        magnification: f64,
        paper: Option<Color>,
        ink: Color,
    ) -> Result<Self, RenderError> {
        if !magnification.is_finite() || magnification < 0.0 {
            return Err(RenderError::InvalidMagnification(magnification));
        }
        Ok(Self {
            surface,
            measurer,
            magnification,
            paper,
            ink,
            options: RenderOptions::default(),
        })
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Access for caller-side placement, e.g. translating between symbols.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Draws background, modules, text, hexagons and target rings, in that
    /// order. Surface state is saved on entry and restored on exit, including
    /// when an error is returned.
    pub fn render(&mut self, symbol: &Symbol) -> Result<(), RenderError> {
        let mag = self.magnification;
        let transform = Transform::new(
            mag,
            symbol.quiet_zone_horizontal,
            symbol.quiet_zone_vertical,
        );
        let font = Font::new(symbol.font_name.as_str(), symbol.font_size * mag);
        debug!(
            magnification = mag,
            margin_x = transform.margin_x,
            margin_y = transform.margin_y,
            rectangles = symbol.rectangles.len(),
            texts = symbol.texts.len(),
            hexagons = symbol.hexagons.len(),
            rings = symbol.target.len(),
            "rendering symbol"
        );

        let mut surface = SurfaceGuard::new(&mut self.surface);

        if let Some(paper) = self.paper {
            let bounds = DeviceRect::new(0.0, 0.0, symbol.width * mag, symbol.height * mag);
            surface.clear_rect(bounds, paper);
        }
        surface.set_fill(Fill::Solid(self.ink));

        for rect in &symbol.rectangles {
            surface.fill_rect(transform.rect(rect));
        }

        for text in &symbol.texts {
            let placement =
                layout_text(text, &transform, &font, &self.measurer, self.options.justify)?;
            surface.set_font(&placement.font);
            surface.fill_text(&text.text, placement.x, placement.y)?;
        }

        for hexagon in &symbol.hexagons {
            surface.fill_polygon(&transform.hexagon(hexagon));
        }

        for (idx, ring) in symbol.target.iter().enumerate() {
            surface.set_fill(ring_fill(idx, self.ink, self.paper));
            surface.fill_oval(transform.ellipse(ring, self.options.target_geometry));
        }
        if self.paper.is_none() && symbol.target.len() > 1 {
            warn!("target rings drawn without paper color; odd rings left unpainted");
        }

        Ok(())
    }
}

/// Ring fills alternate ink, paper, ink, ... from the outermost ring.
pub fn ring_fill(index: usize, ink: Color, paper: Option<Color>) -> Fill {
    if index % 2 == 0 {
        Fill::Solid(ink)
    } else {
        paper.map(Fill::Solid).unwrap_or(Fill::Background)
    }
}

/// Renders a single symbol without keeping a renderer around.
pub fn render_symbol<S: Surface, M: TextMeasurer>(
    surface: S,
    measurer: M,
    symbol: &Symbol,
    magnification: f64,
    paper: Option<Color>,
    ink: Color,
    options: RenderOptions,
) -> Result<S, RenderError> {
    let mut renderer =
        SymbolRenderer::new(surface, measurer, magnification, paper, ink)?.with_options(options);
    renderer.render(symbol)?;
    Ok(renderer.into_surface())
}
