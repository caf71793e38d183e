use super::Vec2;

/// Axis-aligned rectangle in surface pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.size.x * 0.5,
            self.origin.y + self.size.y * 0.5,
        )
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Closed containment: [min, max]. Page edges count as inside so a touch
    /// on the very last pixel column still lands on the page.
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Nearest point inside the rectangle.
    #[inline]
    pub fn clamp(self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left(), self.right().max(self.left())),
            p.y.clamp(self.top(), self.bottom().max(self.top())),
        )
    }

    /// Splits the rectangle into equal left and right halves.
    #[inline]
    pub fn split_halves(self) -> (Rect, Rect) {
        let half = self.size.x * 0.5;
        (
            Rect::new(self.origin.x, self.origin.y, half, self.size.y),
            Rect::new(self.origin.x + half, self.origin.y, half, self.size.y),
        )
    }

    /// Maps `p` into `[0, 1]²` relative to this rectangle.
    #[inline]
    pub fn normalize_point(self, p: Vec2) -> Vec2 {
        let w = if self.size.x.abs() > f32::EPSILON { self.size.x } else { 1.0 };
        let h = if self.size.y.abs() > f32::EPSILON { self.size.y } else { 1.0 };
        Vec2::new((p.x - self.origin.x) / w, (p.y - self.origin.y) / h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_interior_point() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn contains_edges_inclusive() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn contains_outside() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(-1.0, 5.0)));
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(5.0, 10.5)));
    }

    // ── clamp ─────────────────────────────────────────────────────────────

    #[test]
    fn clamp_pulls_outside_points_to_edge() {
        let rect = r(0.0, 0.0, 800.0, 600.0);
        assert_eq!(rect.clamp(Vec2::new(-50.0, 700.0)), Vec2::new(0.0, 600.0));
        assert_eq!(rect.clamp(Vec2::new(900.0, -1.0)), Vec2::new(800.0, 0.0));
    }

    #[test]
    fn clamp_keeps_inside_points() {
        let rect = r(0.0, 0.0, 800.0, 600.0);
        let p = Vec2::new(12.5, 300.0);
        assert_eq!(rect.clamp(p), p);
    }

    // ── split / normalize ─────────────────────────────────────────────────

    #[test]
    fn split_halves_share_the_spine() {
        let (left, right) = r(0.0, 0.0, 800.0, 600.0).split_halves();
        assert_eq!(left, r(0.0, 0.0, 400.0, 600.0));
        assert_eq!(right, r(400.0, 0.0, 400.0, 600.0));
        assert_eq!(left.right(), right.left());
    }

    #[test]
    fn normalize_point_maps_corners() {
        let rect = r(400.0, 0.0, 400.0, 600.0);
        assert_eq!(rect.normalize_point(Vec2::new(400.0, 0.0)), Vec2::new(0.0, 0.0));
        assert_eq!(rect.normalize_point(Vec2::new(800.0, 600.0)), Vec2::new(1.0, 1.0));
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
