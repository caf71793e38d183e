use std::borrow::Cow;
use std::f32::consts::PI;
use std::fmt;

use crate::paint::Color;

pub const DEFAULT_MAX_TEXTURE_SIDE: u32 = 8192;

/// Upper bound on pixels visited when averaging a bitmap.
const AVERAGE_SAMPLES_PER_AXIS: u32 = 64;

// ── errors ────────────────────────────────────────────────────────────────

/// Why a bitmap could not become a page texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    ZeroSize,
    TooLarge { width: u32, height: u32, max_side: u32 },
    BadLength { expected: usize, actual: usize },
    UnsupportedFormat { bytes_per_pixel: usize },
    Upload(String),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::ZeroSize => f.write_str("texture error: bitmap has zero size"),
            TextureError::TooLarge { width, height, max_side } => {
                write!(f, "texture error: {width}x{height} exceeds max side {max_side}")
            }
            TextureError::BadLength { expected, actual } => {
                write!(f, "texture error: expected {expected} bytes, got {actual}")
            }
            TextureError::UnsupportedFormat { bytes_per_pixel } => {
                write!(f, "texture error: unsupported format ({bytes_per_pixel} bytes per pixel)")
            }
            TextureError::Upload(msg) => write!(f, "texture upload error: {msg}"),
        }
    }
}

impl std::error::Error for TextureError {}

// ── bitmaps ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelFormat {
    /// Straight-alpha RGBA, one byte per channel.
    Rgba8,
    /// Little-endian 5-6-5 packed RGB, opaque.
    Rgb565,
}

impl PixelFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb565 => 2,
        }
    }

    pub fn from_bytes_per_pixel(bytes_per_pixel: usize) -> Result<Self, TextureError> {
        match bytes_per_pixel {
            4 => Ok(PixelFormat::Rgba8),
            2 => Ok(PixelFormat::Rgb565),
            _ => Err(TextureError::UnsupportedFormat { bytes_per_pixel }),
        }
    }
}

/// A validated page image, tightly packed, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    bytes: Vec<u8>,
}

impl PageBitmap {
    pub fn new(width: u32, height: u32, format: PixelFormat, bytes: Vec<u8>) -> Result<Self, TextureError> {
        Self::with_max_side(width, height, format, bytes, DEFAULT_MAX_TEXTURE_SIDE)
    }

    pub fn with_max_side(
        width: u32,
        height: u32,
        format: PixelFormat,
        bytes: Vec<u8>,
        max_side: u32,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize);
        }
        let bitmap = Self { width, height, format, bytes };
        bitmap.ensure_fits(max_side)?;

        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if bitmap.bytes.len() != expected {
            return Err(TextureError::BadLength { expected, actual: bitmap.bytes.len() });
        }
        Ok(bitmap)
    }

    #[inline]
    pub fn from_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, TextureError> {
        Self::new(width, height, PixelFormat::Rgba8, bytes)
    }

    /// Builds a bitmap from a raw buffer described only by its pixel size.
    pub fn from_raw(width: u32, height: u32, bytes_per_pixel: usize, bytes: Vec<u8>) -> Result<Self, TextureError> {
        let format = PixelFormat::from_bytes_per_pixel(bytes_per_pixel)?;
        Self::new(width, height, format, bytes)
    }

    /// A single-color bitmap.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, TextureError> {
        let count = width as usize * height as usize;
        Self::from_rgba8(width, height, rgba.repeat(count))
    }

    /// The default light ramp for curled triangles: a `size × 1` strip indexed
    /// by how far around the cylinder a point has turned.
    pub fn gradient_light(size: u32) -> Self {
        let size = size.clamp(2, DEFAULT_MAX_TEXTURE_SIDE);
        let mut bytes = Vec::with_capacity(size as usize * 4);
        for i in 0..size {
            let t = i as f32 / (size - 1) as f32;
            let shade = 0.6 + 0.4 * (t * PI).cos().abs();
            let highlight = 0.15 * (-((t - 0.3) / 0.08).powi(2)).exp();
            let v = ((shade + highlight).clamp(0.0, 1.0) * 255.0).round() as u8;
            bytes.extend_from_slice(&[v, v, v, 255]);
        }
        Self { width: size, height: 1, format: PixelFormat::Rgba8, bytes }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn ensure_fits(&self, max_side: u32) -> Result<(), TextureError> {
        if self.width > max_side || self.height > max_side {
            return Err(TextureError::TooLarge { width: self.width, height: self.height, max_side });
        }
        Ok(())
    }

    /// Pixels as straight RGBA8, converting when needed.
    pub fn to_rgba8(&self) -> Cow<'_, [u8]> {
        match self.format {
            PixelFormat::Rgba8 => Cow::Borrowed(&self.bytes),
            PixelFormat::Rgb565 => {
                let mut out = Vec::with_capacity(self.bytes.len() * 2);
                for px in self.bytes.chunks_exact(2) {
                    out.extend_from_slice(&rgb565_to_rgba8(u16::from_le_bytes([px[0], px[1]])));
                }
                Cow::Owned(out)
            }
        }
    }

    /// Mean color over a sparse sample grid. Tints the back of the fold
    /// when no back texture is bound.
    pub fn average_color(&self) -> Color {
        let step_x = (self.width / AVERAGE_SAMPLES_PER_AXIS).max(1);
        let step_y = (self.height / AVERAGE_SAMPLES_PER_AXIS).max(1);
        let mut sum = [0u64; 4];
        let mut count = 0u64;

        for y in (0..self.height).step_by(step_y as usize) {
            for x in (0..self.width).step_by(step_x as usize) {
                let px = self.pixel(x, y);
                for (acc, c) in sum.iter_mut().zip(px) {
                    *acc += u64::from(c);
                }
                count += 1;
            }
        }

        if count == 0 {
            return Color::transparent();
        }
        let [r, g, b, a] = sum.map(|c| (c / count) as u8);
        Color::from_rgba8(r, g, b, a)
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let bpp = self.format.bytes_per_pixel();
        let i = (y as usize * self.width as usize + x as usize) * bpp;
        match self.format {
            PixelFormat::Rgba8 => [self.bytes[i], self.bytes[i + 1], self.bytes[i + 2], self.bytes[i + 3]],
            PixelFormat::Rgb565 => rgb565_to_rgba8(u16::from_le_bytes([self.bytes[i], self.bytes[i + 1]])),
        }
    }
}

#[inline]
fn rgb565_to_rgba8(v: u16) -> [u8; 4] {
    let r = u32::from((v >> 11) & 0x1f);
    let g = u32::from((v >> 5) & 0x3f);
    let b = u32::from(v & 0x1f);
    [
        ((r * 255 + 15) / 31) as u8,
        ((g * 255 + 31) / 63) as u8,
        ((b * 255 + 15) / 31) as u8,
        255,
    ]
}

// ── uploads ───────────────────────────────────────────────────────────────

/// Turns a validated bitmap into a renderer-owned handle.
///
/// Dropping the handle must release its backing memory.
pub trait TextureUploader {
    type Handle;

    fn upload(&mut self, bitmap: &PageBitmap) -> Result<Self::Handle, TextureError>;
}

// ── slots ─────────────────────────────────────────────────────────────────

/// Binding point on one page.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureSlot {
    /// Front of the sheet currently shown.
    First = 0,
    /// Page revealed under the sheet.
    Second = 1,
    /// Back face of the turning sheet.
    Back = 2,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::First, TextureSlot::Second, TextureSlot::Back];
}

/// A texture binding with the mask color derived from its bitmap.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    pub handle: Option<T>,
    pub mask: Color,
}

impl<T> Slot<T> {
    pub const fn empty() -> Self {
        Self { handle: None, mask: Color::transparent() }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.handle.is_some()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// The three texture bindings of one page plus handles awaiting release.
#[derive(Debug)]
pub struct PageTextures<T> {
    slots: [Slot<T>; 3],
    unused: Vec<T>,
}

impl<T> Default for PageTextures<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageTextures<T> {
    pub fn new() -> Self {
        Self { slots: [Slot::empty(), Slot::empty(), Slot::empty()], unused: Vec::new() }
    }

    /// Uploads `bitmap` into `slot`. On failure the slot keeps its prior
    /// content.
    pub fn set<U>(&mut self, slot: TextureSlot, bitmap: &PageBitmap, uploader: &mut U) -> Result<(), TextureError>
    where
        U: TextureUploader<Handle = T> + ?Sized,
    {
        let handle = uploader.upload(bitmap)?;
        self.put(slot, Slot { handle: Some(handle), mask: bitmap.average_color() });
        Ok(())
    }

    #[inline]
    pub fn is_set(&self, slot: TextureSlot) -> bool {
        self.slots[slot as usize].is_set()
    }

    #[inline]
    pub fn get(&self, slot: TextureSlot) -> Option<&T> {
        self.slots[slot as usize].handle.as_ref()
    }

    #[inline]
    pub fn mask(&self, slot: TextureSlot) -> Color {
        self.slots[slot as usize].mask
    }

    /// Binds `binding` to `slot`, retiring whatever was there.
    pub fn put(&mut self, slot: TextureSlot, binding: Slot<T>) {
        let old = std::mem::replace(&mut self.slots[slot as usize], binding);
        if let Some(handle) = old.handle {
            self.unused.push(handle);
        }
    }

    /// Unbinds `slot` without retiring its handle.
    pub fn take(&mut self, slot: TextureSlot) -> Slot<T> {
        std::mem::take(&mut self.slots[slot as usize])
    }

    /// Moves `from` into `to`, retiring the old `to` handle.
    pub fn move_slot(&mut self, from: TextureSlot, to: TextureSlot) {
        if from == to {
            return;
        }
        let binding = self.take(from);
        self.put(to, binding);
    }

    pub fn retire(&mut self, slot: TextureSlot) {
        self.put(slot, Slot::empty());
    }

    pub fn retire_all(&mut self) {
        for slot in TextureSlot::ALL {
            self.retire(slot);
        }
    }

    #[inline]
    pub fn unused_len(&self) -> usize {
        self.unused.len()
    }

    /// Drops retired handles. Returns how many were released.
    pub fn delete_unused(&mut self) -> usize {
        let n = self.unused.len();
        self.unused.clear();
        n
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Hands out sequential ids; fails on demand.
    #[derive(Default)]
    pub(crate) struct FakeUploader {
        pub next: u32,
        pub fail: bool,
    }

    impl TextureUploader for FakeUploader {
        type Handle = u32;

        fn upload(&mut self, _bitmap: &PageBitmap) -> Result<u32, TextureError> {
            if self.fail {
                return Err(TextureError::Upload("device lost".into()));
            }
            self.next += 1;
            Ok(self.next)
        }
    }

    pub(crate) fn bitmap() -> PageBitmap {
        PageBitmap::solid(4, 4, [200, 100, 50, 255]).unwrap()
    }

    // ── bitmap validation ─────────────────────────────────────────────────

    #[test]
    fn rejects_zero_size() {
        assert_eq!(PageBitmap::from_rgba8(0, 4, Vec::new()), Err(TextureError::ZeroSize));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = PageBitmap::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err, TextureError::BadLength { expected: 16, actual: 15 });
    }

    #[test]
    fn rejects_oversized() {
        let err = PageBitmap::with_max_side(9, 1, PixelFormat::Rgba8, vec![0; 36], 8).unwrap_err();
        assert!(matches!(err, TextureError::TooLarge { max_side: 8, .. }));
        assert!(bitmap().ensure_fits(2).is_err());
    }

    #[test]
    fn rejects_unknown_pixel_size() {
        let err = PageBitmap::from_raw(1, 1, 3, vec![0; 3]).unwrap_err();
        assert_eq!(err, TextureError::UnsupportedFormat { bytes_per_pixel: 3 });
        assert!(err.to_string().contains("3 bytes per pixel"));
    }

    // ── pixel access ──────────────────────────────────────────────────────

    #[test]
    fn rgb565_expands_to_full_range() {
        let white = PageBitmap::from_raw(1, 1, 2, 0xffffu16.to_le_bytes().to_vec()).unwrap();
        assert_eq!(&*white.to_rgba8(), &[255, 255, 255, 255]);
        let red = PageBitmap::from_raw(1, 1, 2, 0xf800u16.to_le_bytes().to_vec()).unwrap();
        assert_eq!(&*red.to_rgba8(), &[255, 0, 0, 255]);
    }

    #[test]
    fn average_of_solid_is_the_color() {
        assert_eq!(bitmap().average_color(), Color::from_rgba8(200, 100, 50, 255));
    }

    #[test]
    fn gradient_light_is_a_strip() {
        let g = PageBitmap::gradient_light(256);
        assert_eq!((g.width(), g.height()), (256, 1));
        assert_eq!(g.bytes()[3], 255);
        // Darkest where the sheet stands vertical.
        let mid = g.bytes()[128 * 4];
        assert!(mid < g.bytes()[0]);
    }

    // ── slots ─────────────────────────────────────────────────────────────

    #[test]
    fn set_binds_and_records_mask() {
        let mut up = FakeUploader::default();
        let mut page = PageTextures::new();
        page.set(TextureSlot::First, &bitmap(), &mut up).unwrap();
        assert!(page.is_set(TextureSlot::First));
        assert_eq!(page.get(TextureSlot::First), Some(&1));
        assert_eq!(page.mask(TextureSlot::First), bitmap().average_color());
        assert!(!page.is_set(TextureSlot::Back));
    }

    #[test]
    fn failed_upload_leaves_slot_untouched() {
        let mut up = FakeUploader::default();
        let mut page = PageTextures::new();
        page.set(TextureSlot::Second, &bitmap(), &mut up).unwrap();

        up.fail = true;
        let err = page.set(TextureSlot::Second, &bitmap(), &mut up).unwrap_err();
        assert!(matches!(err, TextureError::Upload(_)));
        assert_eq!(page.get(TextureSlot::Second), Some(&1));
        assert_eq!(page.unused_len(), 0);

        assert!(page.set(TextureSlot::First, &bitmap(), &mut up).is_err());
        assert!(!page.is_set(TextureSlot::First));
    }

    #[test]
    fn replaced_handles_wait_for_delete_unused() {
        let mut up = FakeUploader::default();
        let mut page = PageTextures::new();
        page.set(TextureSlot::First, &bitmap(), &mut up).unwrap();
        page.set(TextureSlot::First, &bitmap(), &mut up).unwrap();
        assert_eq!(page.unused_len(), 1);
        assert_eq!(page.delete_unused(), 1);
        assert_eq!(page.delete_unused(), 0);
    }

    #[test]
    fn move_slot_retires_destination() {
        let mut up = FakeUploader::default();
        let mut page = PageTextures::new();
        page.set(TextureSlot::First, &bitmap(), &mut up).unwrap();
        page.set(TextureSlot::Second, &bitmap(), &mut up).unwrap();

        page.move_slot(TextureSlot::Second, TextureSlot::First);
        assert_eq!(page.get(TextureSlot::First), Some(&2));
        assert!(!page.is_set(TextureSlot::Second));
        assert_eq!(page.unused_len(), 1);
    }

    #[test]
    fn retire_all_empties_page() {
        let mut up = FakeUploader::default();
        let mut page = PageTextures::new();
        for slot in TextureSlot::ALL {
            page.set(slot, &bitmap(), &mut up).unwrap();
        }
        page.retire_all();
        assert!(TextureSlot::ALL.iter().all(|s| !page.is_set(*s)));
        assert_eq!(page.delete_unused(), 3);
    }
}
