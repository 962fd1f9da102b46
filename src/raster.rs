use crate::color::Color;
use crate::error::RenderError;
use crate::surface::{Fill, Surface};
use crate::text_metrics::{Font, FontBook, glyph_advance};
use crate::transform::{DevicePoint, DeviceRect};
use resvg::tiny_skia::{self, BlendMode, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};
use std::path::Path;

#[derive(Debug, Clone)]
struct State {
    transform: Transform,
    fill: Fill,
    font: Option<Font>,
}

/// Raster surface backed by a tiny-skia pixmap.
pub struct PixmapSurface<'f> {
    pixmap: Pixmap,
    fonts: Option<&'f FontBook>,
    state: State,
    stack: Vec<State>,
    anti_alias: bool,
}

impl<'f> PixmapSurface<'f> {
    /// A transparent `width` x `height` pixmap.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let (width, height) = (width.max(1), height.max(1));
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })?;
        Ok(Self {
            pixmap,
            fonts: None,
            state: State {
                transform: Transform::identity(),
                fill: Fill::Solid(Color::BLACK),
                font: None,
            },
            stack: Vec::new(),
            anti_alias: true,
        })
    }

    /// Fonts used to draw text; without them `fill_text` fails.
    pub fn with_fonts(mut self, fonts: &'f FontBook) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Crisp module edges at integral magnifications.
    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Fills the whole pixmap, ignoring the current transform.
    pub fn fill_background(&mut self, color: Color) {
        self.pixmap.fill(skia_color(color));
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Un-premultiplied color of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(px.red(), px.green(), px.blue(), px.alpha()))
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap()
            .encode_png()
            .map_err(|err| RenderError::PngEncode(err.to_string()))
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// `None` for `Fill::Background`, which leaves pixels alone.
    fn paint(&self) -> Option<Paint<'static>> {
        let Fill::Solid(color) = self.state.fill else {
            return None;
        };
        let mut paint = Paint::default();
        paint.anti_alias = self.anti_alias;
        paint.set_color(skia_color(color));
        Some(paint)
    }

    fn fill_path(&mut self, path: &tiny_skia::Path) {
        if let Some(paint) = self.paint() {
            self.pixmap.fill_path(path, &paint, FillRule::Winding, self.state.transform, None);
        }
    }
}

impl Surface for PixmapSurface<'_> {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform.pre_translate(dx as f32, dy as f32);
    }

    fn set_fill(&mut self, fill: Fill) {
        self.state.fill = fill;
    }

    fn set_font(&mut self, font: &Font) {
        self.state.font = Some(font.clone());
    }

    fn clear_rect(&mut self, rect: DeviceRect, color: Color) {
        let Some(rect) = skia_rect(rect) else {
            return;
        };
        let mut paint = Paint::default();
        paint.anti_alias = self.anti_alias;
        paint.set_color(skia_color(color));
        paint.blend_mode = BlendMode::Source;
        self.pixmap.fill_rect(rect, &paint, self.state.transform, None);
    }

    fn fill_rect(&mut self, rect: DeviceRect) {
        let (Some(rect), Some(paint)) = (skia_rect(rect), self.paint()) else {
            return;
        };
        self.pixmap.fill_rect(rect, &paint, self.state.transform, None);
    }

    fn fill_polygon(&mut self, points: &[DevicePoint]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for point in rest {
            pb.line_to(point.x as f32, point.y as f32);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill_path(&path);
        }
    }

    fn fill_oval(&mut self, bounds: DeviceRect) {
        let Some(path) = skia_rect(bounds).and_then(PathBuilder::from_oval) else {
            return;
        };
        self.fill_path(&path);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError> {
        let font = self.state.font.clone().ok_or(RenderError::NoFont)?;
        let fonts = self.fonts.ok_or_else(|| RenderError::FontNotFound {
            family: font.family.clone(),
        })?;
        let path = fonts.with_face(&font.family, |face| text_path(face, &font, text, x, y))?;
        if let Some(path) = path {
            self.fill_path(&path);
        }
        Ok(())
    }
}

/// Glyph outlines for `text` laid out on one baseline.
fn text_path(
    face: &ttf_parser::Face<'_>,
    font: &Font,
    text: &str,
    x: f64,
    y: f64,
) -> Option<tiny_skia::Path> {
    let scale = (font.size / face.units_per_em().max(1) as f64) as f32;
    let gap = font.tracking * font.size;
    let mut builder = GlyphPathBuilder {
        pb: PathBuilder::new(),
        origin_x: 0.0,
        origin_y: y as f32,
        scale,
    };
    let mut pen_x = x;
    for (idx, ch) in text.chars().filter(|ch| *ch != '\n').enumerate() {
        if idx > 0 {
            pen_x += gap;
        }
        if let Some(glyph) = face.glyph_index(ch) {
            builder.origin_x = pen_x as f32;
            let _ = face.outline_glyph(glyph, &mut builder);
        }
        pen_x += glyph_advance(face, ch, font.size);
    }
    builder.pb.finish()
}

struct GlyphPathBuilder {
    pb: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.pb.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.pb.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn skia_rect(rect: DeviceRect) -> Option<Rect> {
    Rect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}
