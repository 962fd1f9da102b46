use crate::symbol::{Ellipse, Hexagon, Rectangle};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DeviceRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// How target ring extents are mapped to device space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetGeometry {
    /// Ring width/height also receive the quiet-zone margins, matching the
    /// established output of existing renderers pixel for pixel.
    #[default]
    Legacy,
    /// Ring extents are scaled like every other primitive.
    Corrected,
}

/// Symbol-space to device-space mapping for one render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub magnification: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Transform {
    pub fn new(magnification: f64, quiet_zone_horizontal: f64, quiet_zone_vertical: f64) -> Self {
        Self {
            magnification,
            margin_x: (quiet_zone_horizontal * magnification).round(),
            margin_y: (quiet_zone_vertical * magnification).round(),
        }
    }

    pub fn x(&self, sx: f64) -> f64 {
        sx * self.magnification + self.margin_x
    }

    pub fn y(&self, sy: f64) -> f64 {
        sy * self.magnification + self.margin_y
    }

    pub fn extent(&self, s: f64) -> f64 {
        s * self.magnification
    }

    pub fn rect(&self, rect: &Rectangle) -> DeviceRect {
        DeviceRect::new(
            self.x(rect.x),
            self.y(rect.y),
            self.extent(rect.width),
            self.extent(rect.height),
        )
    }

    pub fn hexagon(&self, hexagon: &Hexagon) -> [DevicePoint; 6] {
        let mut out = [DevicePoint { x: 0.0, y: 0.0 }; 6];
        for (slot, (x, y)) in out.iter_mut().zip(hexagon.points()) {
            *slot = DevicePoint {
                x: self.x(x),
                y: self.y(y),
            };
        }
        out
    }

    pub fn ellipse(&self, ellipse: &Ellipse, geometry: TargetGeometry) -> DeviceRect {
        let (pad_w, pad_h) = match geometry {
            TargetGeometry::Legacy => (self.margin_x, self.margin_y),
            TargetGeometry::Corrected => (0.0, 0.0),
        };
        DeviceRect::new(
            self.x(ellipse.x),
            self.y(ellipse.y),
            self.extent(ellipse.width) + pad_w,
            self.extent(ellipse.height) + pad_h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margins_follow_quiet_zone() {
        let t = Transform::new(4.0, 10.0, 10.0);
        assert_eq!(t.margin_x, 40.0);
        assert_eq!(t.margin_y, 40.0);
        assert_eq!(
            t.rect(&Rectangle::new(0.0, 0.0, 1.0, 1.0)),
            DeviceRect::new(40.0, 40.0, 4.0, 4.0)
        );
    }

    #[test]
    fn margins_are_rounded() {
        let t = Transform::new(1.5, 3.0, 1.0);
        assert_eq!(t.margin_x, 5.0);
        assert_eq!(t.margin_y, 2.0);
        let t = Transform::new(0.3, 1.0, 4.0);
        assert_eq!(t.margin_x, 0.0);
        assert_eq!(t.margin_y, 1.0);
    }

    #[test]
    fn extents_carry_no_margin() {
        let t = Transform::new(2.0, 5.0, 7.0);
        assert_eq!(t.extent(3.0), 6.0);
        assert_eq!(t.x(3.0), 16.0);
        assert_eq!(t.y(3.0), 20.0);
    }

    #[test]
    fn ring_extent_depends_on_geometry() {
        let t = Transform::new(2.0, 1.0, 2.0);
        let ring = Ellipse::new(1.0, 1.0, 10.0, 10.0);
        assert_eq!(
            t.ellipse(&ring, TargetGeometry::Legacy),
            DeviceRect::new(4.0, 6.0, 22.0, 24.0)
        );
        assert_eq!(
            t.ellipse(&ring, TargetGeometry::Corrected),
            DeviceRect::new(4.0, 6.0, 20.0, 20.0)
        );
    }

    #[test]
    fn hexagon_vertices_are_transformed() {
        let t = Transform::new(3.0, 1.0, 0.0);
        let hex = Hexagon::new([0.0, 1.0, 2.0, 3.0, 4.0, 5.0], [5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
        let points = t.hexagon(&hex);
        assert_eq!(points[0], DevicePoint { x: 3.0, y: 15.0 });
        assert_eq!(points[5], DevicePoint { x: 18.0, y: 0.0 });
    }
}
