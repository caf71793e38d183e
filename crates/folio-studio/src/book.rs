use std::path::Path;

use anyhow::{Context, Result};
use folio_engine::flip::{FlipDirection, PageBitmap, PageLayout, PageSide, Permissions, TextureSlot};

/// Longest side a loaded image is scaled down to.
const MAX_PAGE_SIDE: u32 = 2048;
const PAPER: [u8; 4] = [246, 241, 228, 255];

/// The pages of the demo book, already decoded.
pub struct Book {
    pages: Vec<PageBitmap>,
    blank: PageBitmap,
}

impl Book {
    /// `count` generated pages of `width × height` px.
    pub fn procedural(count: usize, width: u32, height: u32) -> Result<Self> {
        let pages = (0..count)
            .map(|i| paint_page(i, width, height))
            .collect::<Result<Vec<_>, _>>()
            .context("failed to generate pages")?;
        Self::from_pages(pages)
    }

    /// Every PNG/JPEG in `dir`, in file-name order.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("cannot read page directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
            })
            .collect::<Vec<_>>();
        paths.sort();
        anyhow::ensure!(!paths.is_empty(), "no PNG or JPEG pages in {}", dir.display());

        let pages = paths.iter().map(|p| load_page(p)).collect::<Result<Vec<_>>>()?;
        log::info!("book: loaded {} pages from {}", pages.len(), dir.display());
        Self::from_pages(pages)
    }

    fn from_pages(pages: Vec<PageBitmap>) -> Result<Self> {
        let (w, h) = pages.first().map_or((4, 4), |p| (p.width(), p.height()));
        let blank = PageBitmap::solid(w, h, PAPER).context("failed to build blank page")?;
        Ok(Self { pages, blank })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Page `index`, or blank paper past either end.
    pub fn page_or_blank(&self, index: Option<usize>) -> &PageBitmap {
        index.and_then(|i| self.pages.get(i)).unwrap_or(&self.blank)
    }
}

fn load_page(path: &Path) -> Result<PageBitmap> {
    let mut img = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    if img.width() > MAX_PAGE_SIDE || img.height() > MAX_PAGE_SIDE {
        img = img.resize(MAX_PAGE_SIDE, MAX_PAGE_SIDE, image::imageops::FilterType::Triangle);
    }
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    PageBitmap::from_rgba8(w, h, rgba.into_raw()).with_context(|| format!("unusable page {}", path.display()))
}

/// Ruled paper with a colored header band and one marker per page number.
fn paint_page(index: usize, width: u32, height: u32) -> Result<PageBitmap, folio_engine::flip::TextureError> {
    let hue = (index as f32 * 0.13).fract();
    let band = hue_to_rgb(hue);
    let band_h = height / 10;
    let margin = width / 12;
    let marker = (width / 24).max(2);
    let markers = (index + 1) as u32;

    let mut bytes = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let px = if y < band_h {
                band
            } else if is_marker(x, y, band_h, margin, marker, markers) {
                [60, 60, 70, 255]
            } else if y > band_h * 2 && (y - band_h) % (height / 24).max(4) == 0 && x > margin && x < width - margin {
                [180, 200, 225, 255]
            } else {
                PAPER
            };
            bytes.extend_from_slice(&px);
        }
    }
    PageBitmap::from_rgba8(width, height, bytes)
}

fn is_marker(x: u32, y: u32, band_h: u32, margin: u32, size: u32, count: u32) -> bool {
    let top = band_h + size;
    if y < top || y >= top + size || x < margin {
        return false;
    }
    let slot = (x - margin) / (size * 2);
    slot < count && (x - margin) % (size * 2) < size
}

fn hue_to_rgb(h: f32) -> [u8; 4] {
    let f = |n: f32| {
        let k = (n + h * 6.0) % 6.0;
        let v = 1.0 - k.min(4.0 - k).clamp(0.0, 1.0);
        (90.0 + v * 140.0) as u8
    };
    [f(5.0), f(3.0), f(1.0), 255]
}

// ── reading position ──────────────────────────────────────────────────────

/// Where the reader is. `index` is the page on the right-hand side; on a
/// spread the left-hand page is `index - 1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Position {
    pub index: usize,
    pub page_count: usize,
}

impl Position {
    pub fn new(page_count: usize) -> Self {
        Self { index: 0, page_count }
    }

    /// Spreads start on even pages: the cover stands alone on the right.
    pub fn normalized(self, layout: PageLayout) -> Self {
        match layout {
            PageLayout::Single => self,
            PageLayout::Double => Self { index: self.index & !1, ..self },
        }
    }

    fn step(layout: PageLayout) -> usize {
        match layout {
            PageLayout::Single => 1,
            PageLayout::Double => 2,
        }
    }

    pub fn permissions(self, layout: PageLayout) -> Permissions {
        match layout {
            PageLayout::Single => Permissions::for_book(self.index, self.page_count),
            PageLayout::Double => Permissions {
                forward: self.index + 1 < self.page_count,
                backward: self.index > 0,
            },
        }
    }

    /// Position after a completed turn.
    pub fn advanced(self, layout: PageLayout, direction: FlipDirection) -> Self {
        let step = Self::step(layout);
        let index = match direction {
            FlipDirection::Forward => (self.index + step).min(self.page_count.saturating_sub(1)),
            FlipDirection::Backward => self.index.saturating_sub(step),
        };
        Self { index, ..self }.normalized(layout)
    }

    /// Book page bound to `slot` of `side`. `direction` only matters for a
    /// single page, whose second slot holds the next or previous page.
    pub fn page_for(self, layout: PageLayout, direction: FlipDirection, side: PageSide, slot: TextureSlot) -> Option<usize> {
        let i = self.index as isize;
        let page = match (layout, side, slot) {
            (PageLayout::Single, PageSide::Right, TextureSlot::First) => i,
            (PageLayout::Single, PageSide::Right, TextureSlot::Second) => match direction {
                FlipDirection::Forward => i + 1,
                FlipDirection::Backward => i - 1,
            },
            (PageLayout::Single, _, _) => return None,
            (PageLayout::Double, PageSide::Right, TextureSlot::First) => i,
            (PageLayout::Double, PageSide::Right, TextureSlot::Back) => i + 1,
            (PageLayout::Double, PageSide::Right, TextureSlot::Second) => i + 2,
            (PageLayout::Double, PageSide::Left, TextureSlot::First) => i - 1,
            (PageLayout::Double, PageSide::Left, TextureSlot::Back) => i - 2,
            (PageLayout::Double, PageSide::Left, TextureSlot::Second) => i - 3,
        };
        usize::try_from(page).ok().filter(|p| *p < self.page_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── book ──────────────────────────────────────────────────────────────

    #[test]
    fn procedural_pages_have_the_requested_size() {
        let book = Book::procedural(3, 64, 96).unwrap();
        assert_eq!(book.len(), 3);
        let page = book.page_or_blank(Some(2));
        assert_eq!((page.width(), page.height()), (64, 96));
    }

    #[test]
    fn out_of_range_is_blank_paper() {
        let book = Book::procedural(1, 32, 32).unwrap();
        let blank = book.page_or_blank(Some(5));
        assert_eq!(&blank.bytes()[..4], &PAPER);
        assert_eq!(book.page_or_blank(None), blank);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = std::env::temp_dir().join(format!("folio-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(Book::load_dir(&dir).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    // ── position ──────────────────────────────────────────────────────────

    #[test]
    fn spread_slots_follow_the_turn() {
        let pos = Position { index: 2, page_count: 10 };
        let at = |side, slot| pos.page_for(PageLayout::Double, FlipDirection::Forward, side, slot);
        assert_eq!(at(PageSide::Right, TextureSlot::First), Some(2));
        assert_eq!(at(PageSide::Right, TextureSlot::Back), Some(3));
        assert_eq!(at(PageSide::Right, TextureSlot::Second), Some(4));
        assert_eq!(at(PageSide::Left, TextureSlot::First), Some(1));
        assert_eq!(at(PageSide::Left, TextureSlot::Back), Some(0));
        assert_eq!(at(PageSide::Left, TextureSlot::Second), None);
    }

    #[test]
    fn single_second_slot_depends_on_direction() {
        let pos = Position { index: 3, page_count: 5 };
        let second = |d| pos.page_for(PageLayout::Single, d, PageSide::Right, TextureSlot::Second);
        assert_eq!(second(FlipDirection::Forward), Some(4));
        assert_eq!(second(FlipDirection::Backward), Some(2));
        assert_eq!(pos.page_for(PageLayout::Single, FlipDirection::Forward, PageSide::Right, TextureSlot::Back), None);
    }

    #[test]
    fn advancing_stays_in_the_book() {
        let pos = Position::new(5);
        assert!(!pos.permissions(PageLayout::Single).backward);

        let end = pos
            .advanced(PageLayout::Double, FlipDirection::Forward)
            .advanced(PageLayout::Double, FlipDirection::Forward)
            .advanced(PageLayout::Double, FlipDirection::Forward);
        assert_eq!(end.index, 4);
        assert!(!end.permissions(PageLayout::Double).forward);
        assert_eq!(end.advanced(PageLayout::Single, FlipDirection::Backward).index, 3);
    }

    #[test]
    fn spreads_normalize_to_even_pages() {
        let pos = Position { index: 3, page_count: 8 };
        assert_eq!(pos.normalized(PageLayout::Double).index, 2);
        assert_eq!(pos.normalized(PageLayout::Single).index, 3);
    }
}
