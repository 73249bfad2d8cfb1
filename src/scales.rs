/// One-dimensional affine mapping from a data domain onto a pixel range.
///
/// `pixel = value * m + c`. A degenerate domain (`lo == hi`, or any
/// non-finite bound) maps every value to the left edge of the range and
/// inverts every pixel back to `lo`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineScale {
    domain: (f64, f64),
    range: (f32, f32),
    m: f64,
    c: f64,
}

impl AffineScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        let (lo, hi) = domain;
        let (r0, r1) = (range.0 as f64, range.1 as f64);
        let width = hi - lo;
        let (m, c) = if width != 0.0 && width.is_finite() && lo.is_finite() {
            let m = (r1 - r0) / width;
            (m, r0 - m * lo)
        } else {
            (0.0, r0)
        };
        Self { domain, range, m, c }
    }

    pub fn is_degenerate(&self) -> bool {
        self.m == 0.0
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    /// Maps without rounding to `f32`.
    pub fn map_f64(&self, value: f64) -> f64 {
        value * self.m + self.c
    }

    pub fn invert_f64(&self, pixel: f64) -> f64 {
        if self.is_degenerate() {
            return self.domain.0;
        }
        (pixel - self.c) / self.m
    }

    pub fn map(&self, value: f64) -> f32 {
        let res = self.map_f64(value) as f32;
        if res.is_nan() || res.is_infinite() {
            self.range.0
        } else {
            res
        }
    }

    pub fn invert(&self, pixel: f32) -> f64 {
        self.invert_f64(pixel as f64)
    }

    pub fn map_series<'a>(&'a self, values: &'a [f64]) -> impl Iterator<Item = f32> + 'a {
        values.iter().map(move |v| self.map(*v))
    }

    /// Returns (m, c) such that screen = value * m + c
    pub fn coefficients(&self) -> (f64, f64) {
        (self.m, self.c)
    }

    /// Pixels per domain unit; zero for a degenerate domain.
    pub fn pixels_per_unit(&self) -> f64 {
        self.m
    }

    /// Domain units per pixel; zero for a degenerate domain.
    pub fn units_per_pixel(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            1.0 / self.m
        }
    }
}

/// Time axis mapping for a panel: `[visible_start, visible_end]` onto
/// `[margin_left, margin_left + panel_width]`.
pub fn time_scale(
    panel_width: f32,
    visible_start: f64,
    visible_end: f64,
    margin_left: f32,
) -> AffineScale {
    AffineScale::new(
        (visible_start, visible_end),
        (margin_left, margin_left + panel_width.max(0.0)),
    )
}

/// Value axis mapping for a panel row: larger values sit higher, so the
/// domain maps onto `[height, 0]`.
pub fn value_scale(lo: f64, hi: f64, panel_height: f32) -> AffineScale {
    AffineScale::new((lo, hi), (panel_height.max(0.0), 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_endpoints() {
        let s = AffineScale::new((10.0, 20.0), (30.0, 130.0));
        assert_eq!(s.map(10.0), 30.0);
        assert_eq!(s.map(20.0), 130.0);
        assert_eq!(s.map(15.0), 80.0);
    }

    #[test]
    fn degenerate_domain_maps_to_left_edge() {
        let s = AffineScale::new((5.0, 5.0), (30.0, 130.0));
        assert!(s.is_degenerate());
        assert_eq!(s.map(5.0), 30.0);
        assert_eq!(s.map(-1000.0), 30.0);
        assert_eq!(s.invert(99.0), 5.0);
        assert_eq!(s.units_per_pixel(), 0.0);
    }

    #[test]
    fn coefficients_reproduce_map() {
        let s = time_scale(200.0, 0.0, 10.0, 50.0);
        let (m, c) = s.coefficients();
        assert_eq!((m, c), (20.0, 50.0));
        assert_eq!(s.map_f64(5.0), 5.0 * m + c);
    }

    #[test]
    fn inverted_range_for_values() {
        let s = value_scale(0.0, 1.0, 50.0);
        assert_eq!(s.map(0.0), 50.0);
        assert_eq!(s.map(1.0), 0.0);
    }
}
