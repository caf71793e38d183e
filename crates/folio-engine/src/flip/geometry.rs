//! Half-cylinder curl model.
//!
//! A page corner (`origin`) is lifted and carried to `touch`. The curl
//! direction `n` points from `touch` back to `origin`; the sheet wraps around
//! a cylinder whose axis runs perpendicular to `n`. Page points are measured
//! by their signed distance `s` past the axis (positive toward `origin`):
//!
//! - `s <= 0` stays flat on the table
//! - `0 < s < πr` wraps the cylinder
//! - `s >= πr` lies flat again, face down, on top of the sheet
//!
//! The axis sits `(L + πr) / 2` from `origin` (with `L = |origin - touch|`),
//! which is exactly what carries the corner onto `touch`.

use std::f32::consts::PI;

use crate::coords::{Rect, Vec2};

use super::layout::Page;

pub const MIN_CURL_DEGREES: f32 = 5.0;
pub const MAX_CURL_DEGREES: f32 = 65.0;

/// Below this length the fold is treated as flat.
const FLAT_EPSILON: f32 = 0.5;
/// Points this close to the axis count as flat.
const AXIS_EPSILON: f32 = 1e-3;

/// Where a page point ends up after curling.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Region {
    Flat,
    Curled,
    /// Past the cylinder, lying face down.
    Back,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurlPoint {
    pub pos: Vec2,
    /// Height above the table.
    pub lift: f32,
    /// Position around the cylinder, `0` flat and `1` fully turned over.
    pub turn: f32,
    pub region: Region,
}

/// Fold parameters for one pose of the lifted corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FoldGeometry {
    pub page: Rect,
    /// Lifted corner at rest.
    pub origin: Vec2,
    /// Where the corner currently is.
    pub touch: Vec2,
    /// Unit curl direction, from `touch` toward `origin`.
    pub direction: Vec2,
    /// A point on the cylinder axis; the fold line origin.
    pub axis_point: Vec2,
    pub radius: f32,
    pub semi_perimeter_ratio: f32,
    pub mesh_resolution: u32,
}

impl FoldGeometry {
    /// An unfolded page.
    pub fn flat(page: Rect, origin: Vec2, semi_perimeter_ratio: f32, mesh_resolution: u32) -> Self {
        Self {
            page,
            origin,
            touch: origin,
            direction: Vec2::new(1.0, 0.0),
            axis_point: origin,
            radius: 0.0,
            semi_perimeter_ratio,
            mesh_resolution,
        }
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        self.origin.distance(self.touch) < FLAT_EPSILON
    }

    /// Angle of the fold line against the +X axis, in radians.
    #[inline]
    pub fn fold_angle(&self) -> f32 {
        let dir = self.direction.perp();
        dir.y.atan2(dir.x)
    }

    /// Signed distance of `p` past the cylinder axis (positive toward `origin`).
    #[inline]
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        (p - self.axis_point).dot(self.direction)
    }

    /// Maps an unfolded page point onto the curled sheet.
    pub fn map(&self, p: Vec2) -> CurlPoint {
        if self.is_flat() {
            return CurlPoint { pos: p, lift: 0.0, turn: 0.0, region: Region::Flat };
        }

        let s = self.signed_distance(p);
        if s <= AXIS_EPSILON {
            return CurlPoint { pos: p, lift: 0.0, turn: 0.0, region: Region::Flat };
        }

        let r = self.radius;
        let half_turn = PI * r;
        if r > f32::EPSILON && s < half_turn {
            let theta = s / r;
            let projected = r * theta.sin();
            CurlPoint {
                pos: p + self.direction * (projected - s),
                lift: r * (1.0 - theta.cos()),
                turn: theta / PI,
                region: Region::Curled,
            }
        } else {
            let projected = half_turn - s;
            CurlPoint {
                pos: p + self.direction * (projected - s),
                lift: 2.0 * r,
                turn: 1.0,
                region: Region::Back,
            }
        }
    }

    /// The visible crease (top of the cylinder) as a segment across the page.
    ///
    /// `None` when the page is flat or the crease misses the page.
    pub fn crease(&self) -> Option<(Vec2, Vec2)> {
        if self.is_flat() {
            return None;
        }
        let crease_s = PI * self.radius * 0.5;
        let (a, b) = self.page_cut(crease_s)?;
        let shift = self.direction * (self.radius - crease_s);
        Some((a + shift, b + shift))
    }

    /// Segment where the page rectangle crosses the line `s = offset`.
    pub fn page_cut(&self, offset: f32) -> Option<(Vec2, Vec2)> {
        let corners = rect_corners(self.page);
        let mut hits = [Vec2::zero(); 4];
        let mut count = 0;

        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let sa = self.signed_distance(a) - offset;
            let sb = self.signed_distance(b) - offset;
            if (sa <= 0.0 && sb >= 0.0) || (sa >= 0.0 && sb <= 0.0) {
                let denom = sa - sb;
                let t = if denom.abs() > f32::EPSILON { sa / denom } else { 0.0 };
                let hit = a.lerp(b, t.clamp(0.0, 1.0));
                if hits[..count].iter().all(|h| h.distance(hit) > 1e-3) {
                    hits[count] = hit;
                    count += 1;
                }
            }
        }

        if count < 2 {
            return None;
        }

        // With a corner hit there may be three candidates; keep the widest pair.
        let mut best = (hits[0], hits[1]);
        let mut best_len = hits[0].distance(hits[1]);
        for i in 0..count {
            for j in (i + 1)..count {
                let len = hits[i].distance(hits[j]);
                if len > best_len {
                    best = (hits[i], hits[j]);
                    best_len = len;
                }
            }
        }
        Some(best)
    }

    /// Outline of the face-down flap after mapping, as a convex polygon.
    ///
    /// `out` is cleared first; it stays empty when no part of the page lies
    /// past the cylinder.
    pub fn flap_outline(&self, out: &mut Vec<Vec2>) {
        out.clear();
        if self.is_flat() {
            return;
        }

        let cut = PI * self.radius;
        let corners = rect_corners(self.page);
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let sa = self.signed_distance(a) - cut;
            let sb = self.signed_distance(b) - cut;

            if sa >= 0.0 {
                out.push(self.map(a).pos);
            }
            if (sa >= 0.0) != (sb >= 0.0) {
                let t = sa / (sa - sb);
                out.push(self.map(a.lerp(b, t)).pos);
            }
        }

        if out.len() < 3 {
            out.clear();
        }
    }
}

#[inline]
fn rect_corners(r: Rect) -> [Vec2; 4] {
    [
        Vec2::new(r.left(), r.top()),
        Vec2::new(r.right(), r.top()),
        Vec2::new(r.right(), r.bottom()),
        Vec2::new(r.left(), r.bottom()),
    ]
}

/// Steepest allowed curl for a drag that started `dy` pixels (vertically)
/// away from the lifted corner, as a tangent.
///
/// Starting close to the corner allows up to 65°; the allowance falls
/// linearly to 5° as the start moves a full page height away.
pub fn max_curl_tan(dy: f32, page_height: f32) -> f32 {
    let ratio = (dy.abs() / page_height.max(f32::EPSILON)).clamp(0.0, 1.0);
    let degrees = MAX_CURL_DEGREES - (MAX_CURL_DEGREES - MIN_CURL_DEGREES) * ratio;
    degrees.to_radians().tan()
}

/// Keeps the carried corner in a physically sensible range.
///
/// - horizontal travel runs from the free edge to one page width past the
///   spine (a fully turned sheet)
/// - vertical offset is bounded by `travel * max_tan`
/// - the corner may only move into the page vertically
pub fn constrain_touch(page: &Page, origin: Vec2, touch: Vec2, max_tan: f32) -> Vec2 {
    let out = page.outward();
    let travel = ((origin.x - touch.x) * out).clamp(0.0, 2.0 * page.width());
    let x = origin.x - travel * out;

    let max_dy = travel * max_tan.max(0.0);
    let mut dy = (touch.y - origin.y).clamp(-max_dy, max_dy);

    let top = (origin.y - page.bounds.top()).abs() <= (origin.y - page.bounds.bottom()).abs();
    dy = if top { dy.max(0.0) } else { dy.min(0.0) };

    Vec2::new(x, origin.y + dy)
}

/// Computes the fold that carries `origin` to `touch` on `page`.
///
/// The radius is `ratio × min(L/π, long_edge/2)`; the cylinder axis is never
/// allowed past the spine, shrinking the radius instead so the sheet stays
/// bound.
pub fn compute_fold(
    page: &Page,
    origin: Vec2,
    touch: Vec2,
    semi_perimeter_ratio: f32,
    mesh_resolution: u32,
) -> FoldGeometry {
    let d = origin - touch;
    let len = d.length();
    let Some(n) = d.normalized().filter(|_| len >= FLAT_EPSILON) else {
        return FoldGeometry::flat(page.bounds, origin, semi_perimeter_ratio, mesh_resolution);
    };

    let long_edge = page.width().max(page.height());
    let mut radius = semi_perimeter_ratio * (len / PI).min(long_edge * 0.5);
    let mut axis = (len + PI * radius) * 0.5;

    // Spine endpoints must stay at s <= 0.
    let spine_top = Vec2::new(page.spine_x(), page.bounds.top());
    let spine_bottom = Vec2::new(page.spine_x(), page.bounds.bottom());
    let limit = (-(spine_top - origin).dot(n)).min(-(spine_bottom - origin).dot(n));
    if axis > limit {
        axis = limit.max(0.0);
        radius = ((2.0 * axis - len) / PI).clamp(0.0, radius);
    }

    FoldGeometry {
        page: page.bounds,
        origin,
        touch,
        direction: n,
        axis_point: origin - n * axis,
        radius,
        semi_perimeter_ratio,
        mesh_resolution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::layout::{PageSide, SurfaceConfig};

    fn right_page() -> Page {
        *SurfaceConfig::new(800.0, 600.0, true).unwrap().page(PageSide::Right).unwrap()
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 0.05
    }

    // ── compute_fold ──────────────────────────────────────────────────────

    #[test]
    fn untouched_corner_is_flat() {
        let page = right_page();
        let o = page.corner(false);
        let g = compute_fold(&page, o, o, 0.8, 10);
        assert!(g.is_flat());
        assert_eq!(g.radius, 0.0);
        assert_eq!(g.map(Vec2::new(500.0, 300.0)).region, Region::Flat);
    }

    #[test]
    fn origin_corner_lands_on_touch() {
        let page = right_page();
        let o = page.corner(false);
        let t = Vec2::new(650.0, 560.0);
        let g = compute_fold(&page, o, t, 0.8, 10);
        assert!(g.radius > 0.0);
        let m = g.map(o);
        assert_eq!(m.region, Region::Back);
        assert!(close(m.pos, t), "{:?} vs {:?}", m.pos, t);
    }

    #[test]
    fn radius_is_bounded_by_half_long_edge() {
        let page = right_page();
        let o = page.corner(false);
        let bound = 0.8 * page.width().max(page.height()) * 0.5;
        for i in 0..=40 {
            let x = 900.0 - i as f32 * 30.0;
            for y in [-200.0, 0.0, 300.0, 600.0, 900.0] {
                let t = constrain_touch(&page, o, Vec2::new(x, y), max_curl_tan(10.0, 600.0));
                let g = compute_fold(&page, o, t, 0.8, 10);
                assert!(g.radius <= bound + 1e-3, "r={} at ({x},{y})", g.radius);
                assert!(g.radius >= 0.0);
            }
        }
    }

    #[test]
    fn spine_never_curls() {
        let page = right_page();
        let o = page.corner(true);
        for i in 0..=32 {
            let t = constrain_touch(
                &page,
                o,
                Vec2::new(800.0 - i as f32 * 25.0, 120.0),
                max_curl_tan(0.0, 600.0),
            );
            let g = compute_fold(&page, o, t, 0.8, 10);
            for y in [0.0, 300.0, 600.0] {
                let p = Vec2::new(page.spine_x(), y);
                assert_eq!(g.map(p).region, Region::Flat, "touch {:?}", t);
            }
        }
    }

    #[test]
    fn fully_turned_pose_mirrors_the_sheet() {
        let page = right_page();
        let o = page.corner(false);
        let t = Vec2::new(o.x - 2.0 * page.width(), o.y);
        let g = compute_fold(&page, o, t, 0.8, 10);
        assert!(g.radius.abs() < 1e-3);
        let m = g.map(Vec2::new(700.0, 100.0));
        assert_eq!(m.region, Region::Back);
        assert!(close(m.pos, Vec2::new(100.0, 100.0)), "{:?}", m.pos);
    }

    #[test]
    fn fold_angle_is_vertical_for_horizontal_drag() {
        let page = right_page();
        let o = page.corner(false);
        let g = compute_fold(&page, o, Vec2::new(600.0, o.y), 0.8, 10);
        assert!((g.fold_angle().abs() - PI * 0.5).abs() < 1e-4);
    }

    // ── constrain_touch ───────────────────────────────────────────────────

    #[test]
    fn constrain_limits_travel_and_slope() {
        let page = right_page();
        let o = page.corner(false);
        let t = constrain_touch(&page, o, Vec2::new(-500.0, 0.0), 0.5);
        assert_eq!(t.x, o.x - 2.0 * page.width());
        assert_eq!(t.y, o.y - 0.5 * 2.0 * page.width());

        let back = constrain_touch(&page, o, Vec2::new(900.0, 300.0), 1.0);
        assert_eq!(back, o);
    }

    #[test]
    fn constrain_keeps_corner_inside_vertically() {
        let page = right_page();
        let bottom = page.corner(false);
        let t = constrain_touch(&page, bottom, Vec2::new(700.0, 650.0), 1.0);
        assert_eq!(t.y, bottom.y);

        let top = page.corner(true);
        let t = constrain_touch(&page, top, Vec2::new(700.0, -20.0), 1.0);
        assert_eq!(t.y, top.y);
    }

    #[test]
    fn max_curl_tan_range() {
        let steep = max_curl_tan(0.0, 600.0);
        let shallow = max_curl_tan(600.0, 600.0);
        assert!((steep - MAX_CURL_DEGREES.to_radians().tan()).abs() < 1e-5);
        assert!((shallow - MIN_CURL_DEGREES.to_radians().tan()).abs() < 1e-5);
        assert!(max_curl_tan(300.0, 600.0) < steep);
    }

    // ── crease / flap ─────────────────────────────────────────────────────

    #[test]
    fn crease_spans_page_for_vertical_fold() {
        let page = right_page();
        let o = page.corner(false);
        let g = compute_fold(&page, o, Vec2::new(600.0, o.y), 0.8, 10);
        let (a, b) = g.crease().unwrap();
        assert!((a.x - b.x).abs() < 1e-3);
        assert!(((a.y - b.y).abs() - 600.0).abs() < 1e-2);
    }

    #[test]
    fn flap_outline_contains_touch() {
        let page = right_page();
        let o = page.corner(false);
        let t = Vec2::new(560.0, 520.0);
        let g = compute_fold(&page, o, t, 0.8, 10);
        let mut outline = Vec::new();
        g.flap_outline(&mut outline);
        assert!(outline.len() >= 3);
        assert!(outline.iter().any(|p| close(*p, t)));
    }

    #[test]
    fn flat_page_has_no_flap() {
        let page = right_page();
        let o = page.corner(false);
        let g = compute_fold(&page, o, o, 0.8, 10);
        let mut outline = vec![Vec2::zero()];
        g.flap_outline(&mut outline);
        assert!(outline.is_empty());
        assert!(g.crease().is_none());
    }
}
