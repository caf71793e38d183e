use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2, Viewport};

use super::geometry::{FoldGeometry, Region};

/// Uniform segments laid over the whole page in each axis.
const COARSE_SEGMENTS: u32 = 8;
/// Lower bound on the dense segments over the curl band.
const MIN_DENSE_SEGMENTS: u32 = 20;
/// Breakpoints closer than this are merged.
const MERGE_EPSILON: f32 = 1e-3;

/// One mesh vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CurlVertex {
    /// Surface px; `z` is the lift above the table.
    pub pos: [f32; 3],
    /// Texture coordinate of the unfolded point.
    pub uv: [f32; 2],
    /// Analytic light factor in `[0, 1]`.
    pub shade: f32,
    /// Position around the cylinder, used to sample the gradient light.
    pub turn: f32,
}

/// Dense segment budget for a surface: `min(w, h) / resolution`.
pub fn max_segments(viewport: Viewport, mesh_resolution: u32) -> u32 {
    let side = viewport.width.min(viewport.height).max(0.0);
    ((side / mesh_resolution.max(1) as f32).floor() as u32).max(2)
}

/// Number of dense segments spanning `band` px, even and within budget.
fn dense_segments(band: f32, mesh_resolution: u32, max_segments: u32) -> u32 {
    let wanted = (band.max(0.0) / mesh_resolution.max(1) as f32).ceil() as u32;
    let n = wanted.max(MIN_DENSE_SEGMENTS).min(max_segments.max(2));
    if n % 2 == 1 { n - 1 } else { n }
}

/// Tessellated page sheet for one fold pose.
///
/// Vertices are shared by three index lists: `flat` (still on the table),
/// `curled_front` (on the cylinder, face up) and `back` (face down, either on
/// the far side of the cylinder or lying over the sheet). Buffers are reused
/// across rebuilds.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    vertices: Vec<CurlVertex>,
    flat: Vec<u32>,
    curled_front: Vec<u32>,
    back: Vec<u32>,
    xs: Vec<f32>,
    ys: Vec<f32>,
    regions: Vec<Region>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[CurlVertex] {
        &self.vertices
    }

    pub fn flat(&self) -> &[u32] {
        &self.flat
    }

    pub fn curled_front(&self) -> &[u32] {
        &self.curled_front
    }

    pub fn back(&self) -> &[u32] {
        &self.back
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.flat.clear();
        self.curled_front.clear();
        self.back.clear();
        self.regions.clear();
    }

    /// Re-tessellates the sheet for `geom`.
    ///
    /// `max_segments` caps the dense breakpoints per axis (see
    /// [`max_segments`]), which bounds the vertex count.
    pub fn rebuild(&mut self, geom: &FoldGeometry, max_segments: u32) {
        self.clear();
        let page = geom.page;
        if page.is_empty() {
            return;
        }

        self.fill_breakpoints(geom, max_segments);

        let cols = self.xs.len();
        for &y in &self.ys {
            for &x in &self.xs {
                let p = Vec2::new(x, y);
                let curl = geom.map(p);
                let uv = page.normalize_point(p);
                self.vertices.push(CurlVertex {
                    pos: [curl.pos.x, curl.pos.y, curl.lift],
                    uv: [uv.x.clamp(0.0, 1.0), uv.y.clamp(0.0, 1.0)],
                    shade: shade_for(curl.turn),
                    turn: curl.turn,
                });
                self.regions.push(curl.region);
            }
        }

        for row in 0..self.ys.len().saturating_sub(1) {
            for col in 0..cols.saturating_sub(1) {
                let i0 = (row * cols + col) as u32;
                let i1 = i0 + 1;
                let i2 = i0 + cols as u32;
                let i3 = i2 + 1;
                self.push_triangle(geom, [i0, i2, i1]);
                self.push_triangle(geom, [i1, i2, i3]);
            }
        }

        log::trace!(
            "mesh rebuilt: {} vertices, {}/{}/{} flat/curled/back indices",
            self.vertices.len(),
            self.flat.len(),
            self.curled_front.len(),
            self.back.len()
        );
    }

    fn fill_breakpoints(&mut self, geom: &FoldGeometry, max_segments: u32) {
        let page = geom.page;
        self.xs.clear();
        self.ys.clear();
        push_uniform(&mut self.xs, page.left(), page.right(), COARSE_SEGMENTS);
        push_uniform(&mut self.ys, page.top(), page.bottom(), COARSE_SEGMENTS);

        if let Some(band) = curl_band(geom) {
            let res = geom.mesh_resolution;
            let nx = dense_segments(band.width(), res, max_segments);
            let ny = dense_segments(band.height(), res, max_segments);
            push_uniform(&mut self.xs, band.left(), band.right(), nx);
            push_uniform(&mut self.ys, band.top(), band.bottom(), ny);
        }

        sort_and_merge(&mut self.xs);
        sort_and_merge(&mut self.ys);
    }

    fn push_triangle(&mut self, geom: &FoldGeometry, tri: [u32; 3]) {
        let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
        let regions = tri.map(|i| self.regions[i as usize]);

        let unfolded = signed_area(
            unfold(geom.page, a.uv),
            unfold(geom.page, b.uv),
            unfold(geom.page, c.uv),
        );
        let folded = signed_area(xy(a.pos), xy(b.pos), xy(c.pos));

        let list = if folded * unfolded < 0.0 || regions.iter().all(|r| *r == Region::Back) {
            &mut self.back
        } else if regions.iter().all(|r| *r == Region::Flat) {
            &mut self.flat
        } else {
            &mut self.curled_front
        };
        list.extend_from_slice(&tri);
    }
}

/// Light factor for a point `turn` of the way around the cylinder. Darkest
/// where the surface stands vertical.
#[inline]
fn shade_for(turn: f32) -> f32 {
    0.6 + 0.4 * (turn * PI).cos().abs()
}

#[inline]
fn xy(p: [f32; 3]) -> Vec2 {
    Vec2::new(p[0], p[1])
}

#[inline]
fn unfold(page: Rect, uv: [f32; 2]) -> Vec2 {
    Vec2::new(page.left() + uv[0] * page.width(), page.top() + uv[1] * page.height())
}

#[inline]
fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) * 0.5
}

fn push_uniform(out: &mut Vec<f32>, from: f32, to: f32, segments: u32) {
    let segments = segments.max(1);
    let step = (to - from) / segments as f32;
    for i in 0..=segments {
        out.push(from + step * i as f32);
    }
}

fn sort_and_merge(v: &mut Vec<f32>) {
    v.sort_by(f32::total_cmp);
    v.dedup_by(|a, b| (*a - *b).abs() < MERGE_EPSILON);
}

/// Axis-aligned extent of the page area that wraps the cylinder.
///
/// For a zero-radius fold this is the extent of the fold line itself.
fn curl_band(geom: &FoldGeometry) -> Option<Rect> {
    if geom.is_flat() {
        return None;
    }

    let half_turn = PI * geom.radius;
    let page = geom.page;
    let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    let mut grow = |p: Vec2| {
        min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
        max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
    };

    for corner in [
        Vec2::new(page.left(), page.top()),
        Vec2::new(page.right(), page.top()),
        Vec2::new(page.right(), page.bottom()),
        Vec2::new(page.left(), page.bottom()),
    ] {
        let s = geom.signed_distance(corner);
        if (0.0..=half_turn).contains(&s) {
            grow(corner);
        }
    }
    for offset in [0.0, half_turn] {
        if let Some((a, b)) = geom.page_cut(offset) {
            grow(a);
            grow(b);
        }
    }

    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::geometry::compute_fold;
    use crate::flip::layout::{Page, PageSide, SurfaceConfig};

    fn right_page() -> Page {
        *SurfaceConfig::new(800.0, 600.0, true).unwrap().page(PageSide::Right).unwrap()
    }

    fn budget() -> u32 {
        max_segments(Viewport::new(800.0, 600.0), 10)
    }

    // ── segment budget ────────────────────────────────────────────────────

    #[test]
    fn budget_follows_short_side() {
        assert_eq!(budget(), 60);
        assert_eq!(max_segments(Viewport::new(0.0, 0.0), 10), 2);
    }

    #[test]
    fn dense_segments_are_even_and_bounded() {
        assert_eq!(dense_segments(5.0, 10, 60), 20);
        assert_eq!(dense_segments(250.0, 10, 60), 24);
        assert_eq!(dense_segments(10_000.0, 10, 60), 60);
        assert_eq!(dense_segments(10_000.0, 10, 41), 40);
    }

    // ── rebuild ───────────────────────────────────────────────────────────

    #[test]
    fn flat_fold_is_a_coarse_flat_grid() {
        let page = right_page();
        let o = page.corner(false);
        let g = compute_fold(&page, o, o, 0.8, 10);
        let mut mesh = Mesh::new();
        mesh.rebuild(&g, budget());

        let side = (COARSE_SEGMENTS + 1) as usize;
        assert_eq!(mesh.vertices().len(), side * side);
        assert_eq!(mesh.flat().len(), (side - 1) * (side - 1) * 6);
        assert!(mesh.curled_front().is_empty());
        assert!(mesh.back().is_empty());
    }

    #[test]
    fn mid_turn_has_all_three_classes() {
        let page = right_page();
        let o = page.corner(false);
        let g = compute_fold(&page, o, Vec2::new(560.0, 520.0), 0.8, 10);
        let mut mesh = Mesh::new();
        mesh.rebuild(&g, budget());

        assert!(!mesh.flat().is_empty());
        assert!(!mesh.curled_front().is_empty());
        assert!(!mesh.back().is_empty());

        let n = mesh.vertices().len() as u32;
        for &i in mesh.flat().iter().chain(mesh.curled_front()).chain(mesh.back()) {
            assert!(i < n);
        }
    }

    #[test]
    fn uvs_stay_in_unit_square() {
        let page = right_page();
        let g = compute_fold(&page, page.corner(true), Vec2::new(450.0, 200.0), 0.8, 10);
        let mut mesh = Mesh::new();
        mesh.rebuild(&g, budget());
        for v in mesh.vertices() {
            assert!((0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1]), "{v:?}");
            assert!((0.0..=1.0).contains(&v.shade));
        }
    }

    #[test]
    fn vertex_count_is_bounded_by_budget() {
        let page = right_page();
        let g = compute_fold(&page, page.corner(false), Vec2::new(300.0, 450.0), 0.8, 1);
        let mut mesh = Mesh::new();
        mesh.rebuild(&g, budget());

        let per_axis = (COARSE_SEGMENTS + 1 + budget() + 1) as usize;
        assert!(mesh.vertices().len() <= per_axis * per_axis);
    }

    #[test]
    fn rebuild_reuses_allocations() {
        let page = right_page();
        let g = compute_fold(&page, page.corner(false), Vec2::new(600.0, 560.0), 0.8, 10);
        let mut mesh = Mesh::new();
        mesh.rebuild(&g, budget());
        let ptr = mesh.vertices().as_ptr();
        let len = mesh.vertices().len();

        mesh.rebuild(&g, budget());
        assert_eq!(mesh.vertices().len(), len);
        assert_eq!(mesh.vertices().as_ptr(), ptr);
    }

    #[test]
    fn clear_empties_every_list() {
        let page = right_page();
        let g = compute_fold(&page, page.corner(false), Vec2::new(600.0, 560.0), 0.8, 10);
        let mut mesh = Mesh::new();
        mesh.rebuild(&g, budget());
        mesh.clear();
        assert!(mesh.is_empty());
        assert!(mesh.flat().is_empty() && mesh.back().is_empty());
    }
}
