use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::{Color, LinearRamp};

use super::config::{ShadowSpec, ShadowWidth};
use super::geometry::FoldGeometry;

/// Radii at or below this cast no shadow.
const RADIUS_EPSILON: f32 = 1e-3;
/// Mapped flap points this close to the axis belong to the hinge.
const HINGE_EPSILON: f32 = 0.05;

/// Shadow width for a curl of `radius`: zero for a flat page, otherwise
/// `clamp(radius * ratio, min, max)`.
pub fn shadow_width(width: &ShadowWidth, radius: f32) -> f32 {
    if radius <= RADIUS_EPSILON || !radius.is_finite() {
        return 0.0;
    }
    (radius * width.ratio).clamp(width.min, width.max.max(width.min))
}

/// Evaluated shadow: strip width and the colors at its inner and outer edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowRamp {
    pub width: f32,
    pub start: Color,
    pub end: Color,
}

impl ShadowRamp {
    pub const fn none() -> Self {
        Self { width: 0.0, start: Color::transparent(), end: Color::transparent() }
    }

    /// Evaluates `spec` for a curl of `radius`. Alpha scales with
    /// `width / max`, so the shadow fades out together with its width.
    pub fn from_spec(spec: &ShadowSpec, radius: f32) -> Self {
        let width = shadow_width(&spec.width, radius);
        if width <= 0.0 {
            return Self::none();
        }
        let fade = if spec.width.max > 0.0 { (width / spec.width.max).clamp(0.0, 1.0) } else { 0.0 };
        let c = spec.color;
        Self {
            width,
            start: Color::gray(c.start_gray, c.start_alpha * fade),
            end: Color::gray(c.end_gray, c.end_alpha * fade),
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && (self.start.a > 0.0 || self.end.a > 0.0)
    }

    #[inline]
    pub fn ramp(&self) -> LinearRamp {
        LinearRamp::between(self.start, self.end)
    }
}

impl Default for ShadowRamp {
    fn default() -> Self {
        Self::none()
    }
}

/// Both shadows for one fold pose.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Shadows {
    /// Thrown by the face-down flap onto the sheet beneath it.
    pub edge: ShadowRamp,
    /// Cast by the curl onto the revealed page.
    pub base: ShadowRamp,
}

pub fn compute_shadows(geom: &FoldGeometry, edge: &ShadowSpec, base: &ShadowSpec) -> Shadows {
    if geom.is_flat() {
        return Shadows::default();
    }
    Shadows {
        edge: ShadowRamp::from_spec(edge, geom.radius),
        base: ShadowRamp::from_spec(base, geom.radius),
    }
}

/// Shadow vertex in surface px with a premultiplied color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShadowVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

/// Triangle lists for the two shadow strips. Buffers are reused across
/// rebuilds.
#[derive(Debug, Default, Clone)]
pub struct ShadowStrips {
    edge: Vec<ShadowVertex>,
    base: Vec<ShadowVertex>,
    outline: Vec<Vec2>,
}

impl ShadowStrips {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge(&self) -> &[ShadowVertex] {
        &self.edge
    }

    pub fn base(&self) -> &[ShadowVertex] {
        &self.base
    }

    pub fn clear(&mut self) {
        self.edge.clear();
        self.base.clear();
        self.outline.clear();
    }

    pub fn rebuild(&mut self, geom: &FoldGeometry, shadows: &Shadows) {
        self.clear();
        if geom.is_flat() {
            return;
        }

        if shadows.base.is_visible()
            && let Some((a, b)) = geom.crease()
        {
            push_quad(&mut self.base, a, b, geom.direction * shadows.base.width, &shadows.base.ramp());
        }

        if shadows.edge.is_visible() {
            geom.flap_outline(&mut self.outline);
            let count = self.outline.len();
            if count < 3 {
                return;
            }

            let centroid = self.outline.iter().fold(Vec2::zero(), |acc, p| acc + *p) / count as f32;
            let ramp = shadows.edge.ramp();
            for i in 0..count {
                let a = self.outline[i];
                let b = self.outline[(i + 1) % count];
                if on_hinge(geom, a) && on_hinge(geom, b) {
                    continue;
                }
                let Some(mut normal) = (b - a).perp().normalized() else {
                    continue;
                };
                if ((a + b) * 0.5 - centroid).dot(normal) < 0.0 {
                    normal = -normal;
                }
                push_quad(&mut self.edge, a, b, normal * shadows.edge.width, &ramp);
            }
        }
    }
}

#[inline]
fn on_hinge(geom: &FoldGeometry, p: Vec2) -> bool {
    geom.signed_distance(p).abs() <= HINGE_EPSILON
}

/// Quad from segment `a`-`b` extruded by `offset`, colored `ramp(0)` on the
/// segment and `ramp(1)` on the far side.
fn push_quad(out: &mut Vec<ShadowVertex>, a: Vec2, b: Vec2, offset: Vec2, ramp: &LinearRamp) {
    let inner = ramp.sample(0.0).to_array();
    let outer = ramp.sample(1.0).to_array();
    let a2 = a + offset;
    let b2 = b + offset;
    let v = |p: Vec2, color: [f32; 4]| ShadowVertex { pos: [p.x, p.y], color };
    out.extend_from_slice(&[
        v(a, inner),
        v(b, inner),
        v(b2, outer),
        v(a, inner),
        v(b2, outer),
        v(a2, outer),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::geometry::compute_fold;
    use crate::flip::layout::{Page, PageSide, SurfaceConfig};

    fn right_page() -> Page {
        *SurfaceConfig::new(800.0, 600.0, true).unwrap().page(PageSide::Right).unwrap()
    }

    // ── width ─────────────────────────────────────────────────────────────

    #[test]
    fn zero_radius_casts_nothing() {
        for spec in [ShadowSpec::edge_default(), ShadowSpec::base_default()] {
            assert_eq!(shadow_width(&spec.width, 0.0), 0.0);
            let ramp = ShadowRamp::from_spec(&spec, 0.0);
            assert_eq!(ramp.width, 0.0);
            assert_eq!(ramp.start.a, 0.0);
            assert!(!ramp.is_visible());
        }
    }

    #[test]
    fn width_is_clamped_and_monotonic() {
        let w = ShadowSpec::edge_default().width;
        assert_eq!(shadow_width(&w, 1.0), 5.0);
        assert_eq!(shadow_width(&w, 1_000.0), 30.0);

        let mut last = 0.0;
        for i in 0..200 {
            let width = shadow_width(&w, i as f32);
            assert!(width >= last);
            last = width;
        }
    }

    #[test]
    fn alpha_fades_with_width() {
        let spec = ShadowSpec::base_default();
        let small = ShadowRamp::from_spec(&spec, 5.0);
        let large = ShadowRamp::from_spec(&spec, 500.0);
        assert!(small.start.a < large.start.a);
        assert!((large.start.a - 0.4).abs() < 1e-6);
    }

    // ── strips ────────────────────────────────────────────────────────────

    #[test]
    fn flat_fold_has_no_strips() {
        let page = right_page();
        let o = page.corner(false);
        let g = compute_fold(&page, o, o, 0.8, 10);
        let shadows = compute_shadows(&g, &ShadowSpec::edge_default(), &ShadowSpec::base_default());
        assert_eq!(shadows, Shadows::default());

        let mut strips = ShadowStrips::new();
        strips.rebuild(&g, &shadows);
        assert!(strips.edge().is_empty() && strips.base().is_empty());
    }

    #[test]
    fn mid_turn_builds_both_strips() {
        let page = right_page();
        let g = compute_fold(&page, page.corner(false), Vec2::new(560.0, 520.0), 0.8, 10);
        let shadows = compute_shadows(&g, &ShadowSpec::edge_default(), &ShadowSpec::base_default());
        let mut strips = ShadowStrips::new();
        strips.rebuild(&g, &shadows);

        assert_eq!(strips.base().len(), 6);
        assert!(!strips.edge().is_empty());
        assert_eq!(strips.edge().len() % 6, 0);
    }

    #[test]
    fn base_strip_extends_toward_origin() {
        let page = right_page();
        let g = compute_fold(&page, page.corner(false), Vec2::new(600.0, 600.0), 0.8, 10);
        let shadows = compute_shadows(&g, &ShadowSpec::edge_default(), &ShadowSpec::base_default());
        let mut strips = ShadowStrips::new();
        strips.rebuild(&g, &shadows);

        let base = strips.base();
        let inner = base[0].pos[0];
        let outer = base[2].pos[0];
        assert!((outer - inner - shadows.base.width).abs() < 1e-3);
        assert!(base[0].color[3] > base[2].color[3]);
    }

    #[test]
    fn edge_strip_skips_the_hinge() {
        let page = right_page();
        let g = compute_fold(&page, page.corner(false), Vec2::new(600.0, 600.0), 0.8, 10);
        let shadows = compute_shadows(&g, &ShadowSpec::edge_default(), &ShadowSpec::base_default());
        let mut strips = ShadowStrips::new();
        strips.rebuild(&g, &shadows);

        // Vertical fold: the flap is a rectangle with one hinge edge.
        assert_eq!(strips.edge().len(), 3 * 6);
    }
}
