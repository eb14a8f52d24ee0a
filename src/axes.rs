//! Data-to-pixel mapping and frame drawing for 2D and 3D subplots.

use crate::canvas::{BLACK, Canvas, FRAME, GRID, Rect, text_width};

const LABEL_SCALE: usize = 2;
const TICK_SCALE: usize = 1;
const GRID_LINES: usize = 4;

/// Axis limits. Zero-width or non-finite ranges are widened so that the
/// mapping stays invertible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub lo: f64,
    pub hi: f64,
}

impl Limits {
    pub fn new(a: f64, b: f64) -> Self {
        if !a.is_finite() || !b.is_finite() {
            tracing::warn!(a, b, "non-finite axis range, using [0, 1]");
            return Limits { lo: 0.0, hi: 1.0 };
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi {
            let pad = if lo == 0.0 { 0.5 } else { lo.abs() * 0.05 };
            return Limits { lo: lo - pad, hi: hi + pad };
        }
        Limits { lo, hi }
    }

    /// Range grown by `fraction` of its span on both sides.
    pub fn padded(self, fraction: f64) -> Self {
        let pad = (self.hi - self.lo) * fraction;
        Limits { lo: self.lo - pad, hi: self.hi + pad }
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    /// Position in `[0, 1]` for values inside the limits.
    pub fn normalize(&self, v: f64) -> f64 {
        (v - self.lo) / self.span()
    }
}

fn tick_label(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1e4 || v.abs() < 1e-2) {
        format!("{:.1e}", v)
    } else {
        format!("{:.2}", v)
    }
}

pub struct Axes2D {
    pub rect: Rect,
    pub x: Limits,
    pub y: Limits,
    pub xlabel: String,
    pub ylabel: String,
}

impl Axes2D {
    pub fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let (w, h) = (self.rect.w.saturating_sub(1), self.rect.h.saturating_sub(1));
        let px = self.rect.x as f64 + self.x.normalize(x) * w as f64;
        let py = (self.rect.y + h) as f64 - self.y.normalize(y) * h as f64;
        (px.round() as i64, py.round() as i64)
    }

    pub fn contains(&self, px: i64, py: i64) -> bool {
        px >= self.rect.x as i64
            && py >= self.rect.y as i64
            && px < self.rect.right() as i64
            && py < self.rect.bottom() as i64
    }

    pub fn draw_frame(&self, canvas: &mut Canvas) {
        let r = self.rect;
        for i in 1..=GRID_LINES {
            let t = i as f64 / (GRID_LINES + 1) as f64;
            let gx = r.x as i64 + (t * r.w as f64) as i64;
            let gy = r.y as i64 + (t * r.h as f64) as i64;
            canvas.line(gx, r.y as i64, gx, r.bottom() as i64 - 1, GRID);
            canvas.line(r.x as i64, gy, r.right() as i64 - 1, gy, GRID);
        }
        canvas.outline(r, FRAME);

        let below = r.bottom() + 4;
        canvas.text(r.x, below, &tick_label(self.x.lo), BLACK, TICK_SCALE);
        let hi = tick_label(self.x.hi);
        canvas.text(r.right().saturating_sub(text_width(&hi, TICK_SCALE)), below, &hi, BLACK, TICK_SCALE);

        let lo = tick_label(self.y.lo);
        let left = r.x.saturating_sub(text_width(&lo, TICK_SCALE) + 4);
        canvas.text(left, r.bottom().saturating_sub(5), &lo, BLACK, TICK_SCALE);
        let hi = tick_label(self.y.hi);
        let left = r.x.saturating_sub(text_width(&hi, TICK_SCALE) + 4);
        canvas.text(left, r.y, &hi, BLACK, TICK_SCALE);

        let xw = text_width(&self.xlabel, LABEL_SCALE);
        canvas.text(r.x + (r.w.saturating_sub(xw)) / 2, below + 10, &self.xlabel, BLACK, LABEL_SCALE);
        canvas.text(r.x, r.y.saturating_sub(14), &self.ylabel, BLACK, LABEL_SCALE);
    }
}

/// Orthographic view of a box spanning the three axis limits.
pub struct Axes3D {
    pub rect: Rect,
    pub x: Limits,
    pub y: Limits,
    pub z: Limits,
    pub labels: [String; 3],
    right: [f64; 3],
    up: [f64; 3],
    scale: f64,
}

const CORNERS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

const EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

impl Axes3D {
    /// `azimuth` and `elevation` in degrees, matplotlib convention.
    pub fn new(
        rect: Rect,
        limits: [Limits; 3],
        labels: [String; 3],
        azimuth: f64,
        elevation: f64,
    ) -> Self {
        let (sa, ca) = azimuth.to_radians().sin_cos();
        let (se, ce) = elevation.to_radians().sin_cos();
        let right = [-sa, ca, 0.0];
        let up = [-se * ca, -se * sa, ce];

        let mut axes = Axes3D {
            rect,
            x: limits[0],
            y: limits[1],
            z: limits[2],
            labels,
            right,
            up,
            scale: 1.0,
        };

        let (mut max_u, mut max_v) = (0.0f64, 0.0f64);
        for c in CORNERS {
            let (u, v) = axes.view(c);
            max_u = max_u.max(u.abs());
            max_v = max_v.max(v.abs());
        }
        let fit_u = rect.w as f64 / (2.0 * max_u);
        let fit_v = rect.h as f64 / (2.0 * max_v);
        axes.scale = 0.85 * fit_u.min(fit_v);
        axes
    }

    /// Screen-plane coordinates of a point in the unit box, centered.
    fn view(&self, unit: [f64; 3]) -> (f64, f64) {
        let p = [unit[0] - 0.5, unit[1] - 0.5, unit[2] - 0.5];
        let dot = |a: [f64; 3]| a[0] * p[0] + a[1] * p[1] + a[2] * p[2];
        (dot(self.right), dot(self.up))
    }

    fn unit_to_pixel(&self, unit: [f64; 3]) -> (i64, i64) {
        let (u, v) = self.view(unit);
        let cx = self.rect.x as f64 + self.rect.w as f64 / 2.0;
        let cy = self.rect.y as f64 + self.rect.h as f64 / 2.0;
        ((cx + u * self.scale).round() as i64, (cy - v * self.scale).round() as i64)
    }

    pub fn project(&self, x: f64, y: f64, z: f64) -> (i64, i64) {
        self.unit_to_pixel([self.x.normalize(x), self.y.normalize(y), self.z.normalize(z)])
    }

    pub fn contains(&self, px: i64, py: i64) -> bool {
        px >= self.rect.x as i64
            && py >= self.rect.y as i64
            && px < self.rect.right() as i64
            && py < self.rect.bottom() as i64
    }

    pub fn draw_frame(&self, canvas: &mut Canvas) {
        for (a, b) in EDGES {
            let (x0, y0) = self.unit_to_pixel(CORNERS[a]);
            let (x1, y1) = self.unit_to_pixel(CORNERS[b]);
            canvas.line(x0, y0, x1, y1, GRID);
        }

        // axis labels sit just past the midpoint of one edge per axis
        let anchors = [
            ([0.5, -0.15, 0.0], &self.labels[0], (self.x.lo, self.x.hi), [0.0, -0.05, 0.0], [1.0, -0.05, 0.0]),
            ([1.15, 0.5, 0.0], &self.labels[1], (self.y.lo, self.y.hi), [1.05, 0.0, 0.0], [1.05, 1.0, 0.0]),
            ([-0.1, 1.1, 0.5], &self.labels[2], (self.z.lo, self.z.hi), [-0.05, 1.05, 0.0], [-0.05, 1.05, 1.0]),
        ];
        for (at, label, (lo, hi), lo_at, hi_at) in anchors {
            let (lx, ly) = self.unit_to_pixel(at);
            let lw = text_width(label, LABEL_SCALE) as i64;
            canvas.text((lx - lw / 2).max(0) as usize, ly.max(0) as usize, label, BLACK, LABEL_SCALE);

            let (tx, ty) = self.unit_to_pixel(lo_at);
            canvas.text(tx.max(0) as usize, ty.max(0) as usize, &tick_label(lo), FRAME, TICK_SCALE);
            let (tx, ty) = self.unit_to_pixel(hi_at);
            canvas.text(tx.max(0) as usize, ty.max(0) as usize, &tick_label(hi), FRAME, TICK_SCALE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_widen_degenerate_ranges() {
        let l = Limits::new(2.0, 2.0);
        assert!(l.lo < 2.0 && l.hi > 2.0);
        let l = Limits::new(0.0, 0.0);
        assert_eq!((l.lo, l.hi), (-0.5, 0.5));
        let l = Limits::new(5.0, 1.0);
        assert_eq!((l.lo, l.hi), (1.0, 5.0));
        assert_eq!(Limits::new(f64::NAN, 1.0), Limits { lo: 0.0, hi: 1.0 });
    }

    #[test]
    fn axes_2d_corners() {
        let axes = Axes2D {
            rect: Rect::new(10, 20, 101, 51),
            x: Limits::new(0.0, 1.0),
            y: Limits::new(-1.0, 1.0),
            xlabel: "r".into(),
            ylabel: "x_n".into(),
        };
        assert_eq!(axes.to_pixel(0.0, -1.0), (10, 70));
        assert_eq!(axes.to_pixel(1.0, 1.0), (110, 20));
        assert!(axes.contains(10, 20));
        assert!(!axes.contains(111, 20));
    }

    #[test]
    fn empty_rect_maps_without_overflow() {
        let axes = Axes2D {
            rect: Rect::new(3, 4, 0, 0),
            x: Limits::new(0.0, 1.0),
            y: Limits::new(0.0, 1.0),
            xlabel: "r".into(),
            ylabel: "x_n".into(),
        };
        assert_eq!(axes.to_pixel(1.0, 1.0), (3, 4));
        assert!(!axes.contains(3, 4));
    }

    #[test]
    fn projected_box_fits_rect() {
        let axes = Axes3D::new(
            Rect::new(0, 0, 300, 200),
            [Limits::new(0.0, 1.0), Limits::new(0.0, 1.0), Limits::new(0.0, 1.0)],
            ["a".into(), "b".into(), "x_n".into()],
            -60.0,
            30.0,
        );
        for c in CORNERS {
            let (px, py) = axes.project(c[0], c[1], c[2]);
            assert!(axes.contains(px, py), "corner {:?} -> {:?}", c, (px, py));
        }
        // higher z is drawn higher on screen
        let (_, low) = axes.project(0.5, 0.5, 0.0);
        let (_, high) = axes.project(0.5, 0.5, 1.0);
        assert!(high < low);
    }
}
