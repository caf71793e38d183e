use crate::coords::{Rect, Vec2, Viewport};

/// Which page of a spread. A single-page layout only has `Right`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PageSide {
    Left,
    Right,
}

impl PageSide {
    pub const ALL: [PageSide; 2] = [PageSide::Left, PageSide::Right];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            PageSide::Left => 0,
            PageSide::Right => 1,
        }
    }

    #[inline]
    pub fn other(self) -> PageSide {
        match self {
            PageSide::Left => PageSide::Right,
            PageSide::Right => PageSide::Left,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PageLayout {
    /// One page covering the whole surface; its spine is the left edge.
    Single,
    /// Two pages side by side sharing a spine at the surface center.
    Double,
}

/// A page's placement on the surface.
///
/// The *free edge* is the vertical edge opposite the spine; forward turns
/// lift a corner from it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Page {
    pub side: PageSide,
    pub bounds: Rect,
}

impl Page {
    #[inline]
    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    /// `+1` when the free edge lies right of the spine, `-1` otherwise.
    #[inline]
    pub fn outward(&self) -> f32 {
        match self.side {
            PageSide::Right => 1.0,
            PageSide::Left => -1.0,
        }
    }

    #[inline]
    pub fn free_edge_x(&self) -> f32 {
        match self.side {
            PageSide::Right => self.bounds.right(),
            PageSide::Left => self.bounds.left(),
        }
    }

    #[inline]
    pub fn spine_x(&self) -> f32 {
        match self.side {
            PageSide::Right => self.bounds.left(),
            PageSide::Left => self.bounds.right(),
        }
    }

    /// Free-edge corner at the top or bottom of the page.
    #[inline]
    pub fn corner(&self, top: bool) -> Vec2 {
        let y = if top { self.bounds.top() } else { self.bounds.bottom() };
        Vec2::new(self.free_edge_x(), y)
    }

    /// Distance of `x` from the free edge, in page widths.
    #[inline]
    pub fn free_edge_ratio(&self, x: f32) -> f32 {
        let w = self.width().max(f32::EPSILON);
        (x - self.free_edge_x()).abs() / w
    }

    /// Whether `x` lies within `ratio` page widths of the free edge.
    #[inline]
    pub fn in_free_edge_band(&self, x: f32, ratio: f32) -> bool {
        self.free_edge_ratio(x) <= ratio
    }

    /// Whether `x` lies within `ratio` page widths of the spine.
    #[inline]
    pub fn in_spine_band(&self, x: f32, ratio: f32) -> bool {
        let w = self.width().max(f32::EPSILON);
        (x - self.spine_x()).abs() / w <= ratio
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.bounds.contains(p)
    }
}

/// Surface size and the page rectangles derived from it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceConfig {
    pub viewport: Viewport,
    pub layout: PageLayout,
    pages: [Option<Page>; 2],
}

impl SurfaceConfig {
    /// Lays out pages for a `width × height` surface.
    ///
    /// Returns `None` for an empty or non-finite surface.
    pub fn new(width: f32, height: f32, auto_page: bool) -> Option<Self> {
        let viewport = Viewport::new(width, height);
        if !viewport.is_valid() {
            return None;
        }

        let bounds = viewport.bounds();
        let (layout, pages) = if auto_page && viewport.is_landscape() {
            let (left, right) = bounds.split_halves();
            (
                PageLayout::Double,
                [
                    Some(Page { side: PageSide::Left, bounds: left }),
                    Some(Page { side: PageSide::Right, bounds: right }),
                ],
            )
        } else {
            (
                PageLayout::Single,
                [None, Some(Page { side: PageSide::Right, bounds })],
            )
        };

        Some(Self { viewport, layout, pages })
    }

    #[inline]
    pub fn page(&self, side: PageSide) -> Option<&Page> {
        self.pages[side.index()].as_ref()
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().flatten()
    }

    /// Page under `p`, preferring the right page on the shared spine.
    pub fn page_at(&self, p: Vec2) -> Option<&Page> {
        self.pages.iter().rev().flatten().find(|page| page.contains(p))
    }

    #[inline]
    pub fn has_second_page(&self) -> bool {
        self.layout == PageLayout::Double
    }

    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        self.viewport.bounds().clamp(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn landscape_with_auto_page_is_double() {
        let s = SurfaceConfig::new(800.0, 600.0, true).unwrap();
        assert_eq!(s.layout, PageLayout::Double);
        assert!(s.has_second_page());
        assert_eq!(s.page(PageSide::Left).unwrap().bounds, Rect::new(0.0, 0.0, 400.0, 600.0));
        assert_eq!(s.page(PageSide::Right).unwrap().bounds, Rect::new(400.0, 0.0, 400.0, 600.0));
    }

    #[test]
    fn portrait_is_single_right_page() {
        let s = SurfaceConfig::new(600.0, 800.0, true).unwrap();
        assert_eq!(s.layout, PageLayout::Single);
        assert!(s.page(PageSide::Left).is_none());
        assert_eq!(s.page(PageSide::Right).unwrap().bounds, Rect::new(0.0, 0.0, 600.0, 800.0));
    }

    #[test]
    fn auto_page_disabled_is_single() {
        let s = SurfaceConfig::new(800.0, 600.0, false).unwrap();
        assert_eq!(s.layout, PageLayout::Single);
    }

    #[test]
    fn empty_surface_is_rejected() {
        assert!(SurfaceConfig::new(0.0, 600.0, true).is_none());
        assert!(SurfaceConfig::new(f32::NAN, 600.0, true).is_none());
    }

    // ── page geometry ─────────────────────────────────────────────────────

    #[test]
    fn free_edge_and_spine() {
        let s = SurfaceConfig::new(800.0, 600.0, true).unwrap();
        let right = s.page(PageSide::Right).unwrap();
        let left = s.page(PageSide::Left).unwrap();
        assert_eq!(right.free_edge_x(), 800.0);
        assert_eq!(right.spine_x(), 400.0);
        assert_eq!(left.free_edge_x(), 0.0);
        assert_eq!(left.spine_x(), 400.0);
        assert_eq!(right.corner(false), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn edge_bands() {
        let s = SurfaceConfig::new(800.0, 600.0, true).unwrap();
        let right = s.page(PageSide::Right).unwrap();
        assert!(right.in_free_edge_band(790.0, 0.25));
        assert!(!right.in_free_edge_band(600.0, 0.25));
        assert!(right.in_spine_band(410.0, 0.25));
    }

    #[test]
    fn page_at_prefers_right_on_spine() {
        let s = SurfaceConfig::new(800.0, 600.0, true).unwrap();
        assert_eq!(s.page_at(Vec2::new(400.0, 10.0)).unwrap().side, PageSide::Right);
        assert_eq!(s.page_at(Vec2::new(10.0, 10.0)).unwrap().side, PageSide::Left);
        assert!(s.page_at(Vec2::new(900.0, 10.0)).is_none());
    }
}
