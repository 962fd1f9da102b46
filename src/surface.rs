use crate::color::Color;
use crate::error::RenderError;
use crate::text_metrics::Font;
use crate::transform::{DevicePoint, DeviceRect};
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Solid(Color),
    /// Paints nothing; whatever is already on the surface stays visible.
    Background,
}

/// The drawing primitives a symbol needs. Coordinates are device units,
/// relative to the surface's current translation.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn set_fill(&mut self, fill: Fill);
    fn set_font(&mut self, font: &Font);
    /// Overwrites `rect` with `color`, ignoring the current fill.
    fn clear_rect(&mut self, rect: DeviceRect, color: Color);
    fn fill_rect(&mut self, rect: DeviceRect);
    fn fill_polygon(&mut self, points: &[DevicePoint]);
    fn fill_oval(&mut self, bounds: DeviceRect);
    /// Draws `text` with its baseline starting at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn save(&mut self) {
        (**self).save()
    }

    fn restore(&mut self) {
        (**self).restore()
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        (**self).translate(dx, dy)
    }

    fn set_fill(&mut self, fill: Fill) {
        (**self).set_fill(fill)
    }

    fn set_font(&mut self, font: &Font) {
        (**self).set_font(font)
    }

    fn clear_rect(&mut self, rect: DeviceRect, color: Color) {
        (**self).clear_rect(rect, color)
    }

    fn fill_rect(&mut self, rect: DeviceRect) {
        (**self).fill_rect(rect)
    }

    fn fill_polygon(&mut self, points: &[DevicePoint]) {
        (**self).fill_polygon(points)
    }

    fn fill_oval(&mut self, bounds: DeviceRect) {
        (**self).fill_oval(bounds)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError> {
        (**self).fill_text(text, x, y)
    }
}

/// Saves surface state on creation and restores it when dropped.
pub struct SurfaceGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> SurfaceGuard<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for SurfaceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SurfaceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SurfaceGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Save,
    Restore,
    Translate { dx: f64, dy: f64 },
    SetFill(Fill),
    SetFont(Font),
    ClearRect { rect: DeviceRect, color: Color },
    FillRect { rect: DeviceRect, fill: Fill },
    FillPolygon { points: Vec<DevicePoint>, fill: Fill },
    FillOval { bounds: DeviceRect, fill: Fill },
    FillText { text: String, x: f64, y: f64, font: Option<Font>, fill: Fill },
}

impl DrawCall {
    /// True for calls that put paint on the surface.
    pub fn is_paint(&self) -> bool {
        matches!(
            self,
            DrawCall::ClearRect { .. }
                | DrawCall::FillRect { .. }
                | DrawCall::FillPolygon { .. }
                | DrawCall::FillOval { .. }
                | DrawCall::FillText { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct RecordedState {
    fill: Fill,
    font: Option<Font>,
}

/// Surface that records every call instead of drawing, with the fill and
/// font in effect resolved onto each paint call.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
    state: RecordedState,
    stack: Vec<RecordedState>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            state: RecordedState {
                fill: Fill::Solid(Color::BLACK),
                font: None,
            },
            stack: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<DrawCall> {
        self.calls
    }

    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn paint_calls(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|call| call.is_paint())
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.calls.push(DrawCall::Translate { dx, dy });
    }

    fn set_fill(&mut self, fill: Fill) {
        self.state.fill = fill;
        self.calls.push(DrawCall::SetFill(fill));
    }

    fn set_font(&mut self, font: &Font) {
        self.state.font = Some(font.clone());
        self.calls.push(DrawCall::SetFont(font.clone()));
    }

    fn clear_rect(&mut self, rect: DeviceRect, color: Color) {
        self.calls.push(DrawCall::ClearRect { rect, color });
    }

    fn fill_rect(&mut self, rect: DeviceRect) {
        self.calls.push(DrawCall::FillRect {
            rect,
            fill: self.state.fill,
        });
    }

    fn fill_polygon(&mut self, points: &[DevicePoint]) {
        self.calls.push(DrawCall::FillPolygon {
            points: points.to_vec(),
            fill: self.state.fill,
        });
    }

    fn fill_oval(&mut self, bounds: DeviceRect) {
        self.calls.push(DrawCall::FillOval {
            bounds,
            fill: self.state.fill,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError> {
        self.calls.push(DrawCall::FillText {
            text: text.to_string(),
            x,
            y,
            font: self.state.font.clone(),
            fill: self.state.fill,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_restores_on_early_return() {
        fn fails(surface: &mut RecordingSurface) -> Result<(), RenderError> {
            let mut guard = SurfaceGuard::new(surface);
            guard.set_fill(Fill::Solid(Color::WHITE));
            Err(RenderError::NoFont)
        }

        let mut surface = RecordingSurface::new();
        assert!(fails(&mut surface).is_err());
        assert_eq!(surface.save_depth(), 0);
        assert_eq!(
            surface.calls(),
            &[
                DrawCall::Save,
                DrawCall::SetFill(Fill::Solid(Color::WHITE)),
                DrawCall::Restore
            ]
        );
    }

    #[test]
    fn restore_brings_back_previous_fill() {
        let mut surface = RecordingSurface::new();
        surface.set_fill(Fill::Solid(Color::WHITE));
        surface.save();
        surface.set_fill(Fill::Background);
        surface.restore();
        surface.fill_rect(DeviceRect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(
            surface.calls().last(),
            Some(&DrawCall::FillRect {
                rect: DeviceRect::new(0.0, 0.0, 1.0, 1.0),
                fill: Fill::Solid(Color::WHITE),
            })
        );
    }
}
