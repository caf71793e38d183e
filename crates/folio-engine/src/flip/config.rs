use std::time::Duration;

use super::scroller::Easing;

// ── shadow spec ───────────────────────────────────────────────────────────

/// Gray levels and alphas at the inner (`start`) and outer (`end`) edge of a
/// shadow strip. All values live in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowColor {
    pub start_gray: f32,
    pub start_alpha: f32,
    pub end_gray: f32,
    pub end_alpha: f32,
}

/// Shadow width as a function of curl radius: `clamp(radius * ratio, min, max)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowWidth {
    pub min: f32,
    pub max: f32,
    pub ratio: f32,
}

/// One shadow's configuration (fold edge or fold base).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowSpec {
    pub color: ShadowColor,
    pub width: ShadowWidth,
}

impl ShadowSpec {
    /// Shadow thrown by the folded flap onto the page below it.
    pub const fn edge_default() -> Self {
        Self {
            color: ShadowColor { start_gray: 0.1, start_alpha: 0.25, end_gray: 0.3, end_alpha: 0.0 },
            width: ShadowWidth { min: 5.0, max: 30.0, ratio: 0.25 },
        }
    }

    /// Shadow cast by the curled sheet onto the revealed page.
    pub const fn base_default() -> Self {
        Self {
            color: ShadowColor { start_gray: 0.05, start_alpha: 0.4, end_gray: 0.3, end_alpha: 0.0 },
            width: ShadowWidth { min: 2.0, max: 40.0, ratio: 0.4 },
        }
    }

    fn sanitized(self, name: &str) -> Self {
        let c = self.color;
        let color = ShadowColor {
            start_gray: clamp_field(name, "start_gray", c.start_gray, 0.0, 1.0, 0.0),
            start_alpha: clamp_field(name, "start_alpha", c.start_alpha, 0.0, 1.0, 0.0),
            end_gray: clamp_field(name, "end_gray", c.end_gray, 0.0, 1.0, 0.0),
            end_alpha: clamp_field(name, "end_alpha", c.end_alpha, 0.0, 1.0, 0.0),
        };

        let w = self.width;
        let min = clamp_field(name, "width.min", w.min, 0.0, f32::MAX, 0.0);
        let mut max = clamp_field(name, "width.max", w.max, 0.0, f32::MAX, min);
        if max < min {
            log::warn!("{name}: width.max {max} below width.min {min}; raised to min");
            max = min;
        }
        let ratio = clamp_field(name, "width.ratio", w.ratio, 0.0, 1.0, 0.0);

        Self { color, width: ShadowWidth { min, max, ratio } }
    }
}

// ── completion ────────────────────────────────────────────────────────────

/// Velocity rule that can complete a short but fast drag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fling {
    /// Minimum horizontal speed, in surface pixels per millisecond.
    pub velocity_px_per_ms: f32,
    /// The drag must still cover at least this fraction of the page width.
    pub min_ratio: f32,
}

/// Decides on finger-up whether a drag completes the turn or springs back.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CompletionThreshold {
    /// Fraction of the page width the sheet must have travelled.
    pub distance_ratio: f32,
    pub fling: Option<Fling>,
}

impl Default for CompletionThreshold {
    fn default() -> Self {
        Self {
            distance_ratio: 0.5,
            fling: Some(Fling { velocity_px_per_ms: 1.5, min_ratio: 0.25 }),
        }
    }
}

impl CompletionThreshold {
    /// `progress` is in page widths, `velocity` in px/ms along the flip direction.
    pub fn is_met(&self, progress: f32, velocity: f32) -> bool {
        if progress >= self.distance_ratio {
            return true;
        }
        match self.fling {
            Some(f) => velocity >= f.velocity_px_per_ms && progress >= f.min_ratio,
            None => false,
        }
    }

    fn sanitized(self) -> Self {
        let distance_ratio =
            clamp_field("completion", "distance_ratio", self.distance_ratio, 0.01, 1.0, 0.5);
        let fling = self.fling.map(|f| Fling {
            velocity_px_per_ms: clamp_field(
                "completion",
                "fling.velocity_px_per_ms",
                f.velocity_px_per_ms,
                0.01,
                f32::MAX,
                1.5,
            ),
            min_ratio: clamp_field("completion", "fling.min_ratio", f.min_ratio, 0.0, 1.0, 0.25),
        });
        Self { distance_ratio, fling }
    }
}

// ── flip config ───────────────────────────────────────────────────────────

pub const MIN_SEMI_PERIMETER_RATIO: f32 = 0.01;
pub const MAX_CLICK_WIDTH_RATIO: f32 = 0.5;
pub const MIN_ANIMATION_DURATION: Duration = Duration::from_millis(1);
pub const MAX_ANIMATION_DURATION: Duration = Duration::from_secs(10);

/// Tunable surface of the page-flip engine.
///
/// Passed to `PageFlip::new` and later adjusted through the engine's narrow
/// setters. Out-of-range values are clamped by [`FlipConfig::sanitized`],
/// never rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipConfig {
    /// Target pixels per curl segment; smaller means a denser mesh.
    pub mesh_resolution: u32,
    /// Bounds the curl radius; in `(0, 1]`.
    pub semi_perimeter_ratio: f32,
    pub click_to_flip: bool,
    /// Width of the clickable edge band as a fraction of page width; in `(0, 0.5]`.
    pub click_width_ratio: f32,
    pub edge_shadow: ShadowSpec,
    pub base_shadow: ShadowSpec,
    /// Alpha of the mask tint on the back of the fold.
    pub mask_alpha: f32,
    /// Use two pages side by side on landscape surfaces.
    pub auto_page: bool,
    pub completion: CompletionThreshold,
    pub animation_duration: Duration,
    pub easing: Easing,
    /// Horizontal travel before a drag picks a direction.
    pub drag_slop: f32,
    /// Largest accepted bitmap side, in pixels.
    pub max_texture_side: u32,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            mesh_resolution: 10,
            semi_perimeter_ratio: 0.8,
            click_to_flip: true,
            click_width_ratio: 0.5,
            edge_shadow: ShadowSpec::edge_default(),
            base_shadow: ShadowSpec::base_default(),
            mask_alpha: 0.6,
            auto_page: true,
            completion: CompletionThreshold::default(),
            animation_duration: Duration::from_millis(400),
            easing: Easing::EaseOutCubic,
            drag_slop: 4.0,
            max_texture_side: 8192,
        }
    }
}

impl FlipConfig {
    /// Returns a copy with every field clamped into its valid range.
    ///
    /// Each adjustment is reported with `log::warn!`.
    pub fn sanitized(self) -> Self {
        let mesh_resolution = if self.mesh_resolution == 0 {
            log::warn!("flip config: mesh_resolution 0 raised to 1");
            1
        } else {
            self.mesh_resolution
        };

        let semi_perimeter_ratio = clamp_field(
            "flip config",
            "semi_perimeter_ratio",
            self.semi_perimeter_ratio,
            MIN_SEMI_PERIMETER_RATIO,
            1.0,
            0.8,
        );
        let click_width_ratio = clamp_field(
            "flip config",
            "click_width_ratio",
            self.click_width_ratio,
            0.01,
            MAX_CLICK_WIDTH_RATIO,
            MAX_CLICK_WIDTH_RATIO,
        );
        let mask_alpha = clamp_field("flip config", "mask_alpha", self.mask_alpha, 0.0, 1.0, 0.6);
        let drag_slop = clamp_field("flip config", "drag_slop", self.drag_slop, 0.0, 64.0, 4.0);

        let animation_duration = self
            .animation_duration
            .clamp(MIN_ANIMATION_DURATION, MAX_ANIMATION_DURATION);
        if animation_duration != self.animation_duration {
            log::warn!(
                "flip config: animation_duration {:?} clamped to {:?}",
                self.animation_duration,
                animation_duration
            );
        }

        let max_texture_side = self.max_texture_side.clamp(1, 16_384);
        if max_texture_side != self.max_texture_side {
            log::warn!(
                "flip config: max_texture_side {} clamped to {}",
                self.max_texture_side,
                max_texture_side
            );
        }

        Self {
            mesh_resolution,
            semi_perimeter_ratio,
            click_width_ratio,
            edge_shadow: self.edge_shadow.sanitized("edge_shadow"),
            base_shadow: self.base_shadow.sanitized("base_shadow"),
            mask_alpha,
            completion: self.completion.sanitized(),
            animation_duration,
            drag_slop,
            max_texture_side,
            ..self
        }
    }
}

/// Clamps `value` into `[lo, hi]`, substituting `fallback` for NaN.
fn clamp_field(scope: &str, field: &str, value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        log::warn!("{scope}: {field} is NaN; using {fallback}");
        return fallback;
    }
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        log::warn!("{scope}: {field} {value} clamped to {clamped}");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── sanitize ──────────────────────────────────────────────────────────

    #[test]
    fn defaults_survive_sanitize() {
        assert_eq!(FlipConfig::default().sanitized(), FlipConfig::default());
    }

    #[test]
    fn semi_perimeter_ratio_is_clamped_into_unit_range() {
        let high = FlipConfig { semi_perimeter_ratio: 3.0, ..FlipConfig::default() }.sanitized();
        assert_eq!(high.semi_perimeter_ratio, 1.0);

        let low = FlipConfig { semi_perimeter_ratio: -1.0, ..FlipConfig::default() }.sanitized();
        assert_eq!(low.semi_perimeter_ratio, MIN_SEMI_PERIMETER_RATIO);

        let nan = FlipConfig { semi_perimeter_ratio: f32::NAN, ..FlipConfig::default() }.sanitized();
        assert_eq!(nan.semi_perimeter_ratio, 0.8);
    }

    #[test]
    fn click_width_ratio_is_capped_at_half() {
        let cfg = FlipConfig { click_width_ratio: 0.9, ..FlipConfig::default() }.sanitized();
        assert_eq!(cfg.click_width_ratio, MAX_CLICK_WIDTH_RATIO);
    }

    #[test]
    fn zero_mesh_resolution_becomes_one() {
        let cfg = FlipConfig { mesh_resolution: 0, ..FlipConfig::default() }.sanitized();
        assert_eq!(cfg.mesh_resolution, 1);
    }

    #[test]
    fn shadow_spec_out_of_range_is_repaired() {
        let spec = ShadowSpec {
            color: ShadowColor { start_gray: 2.0, start_alpha: -1.0, end_gray: 0.3, end_alpha: 0.0 },
            width: ShadowWidth { min: 10.0, max: 4.0, ratio: 0.5 },
        };
        let cfg = FlipConfig { edge_shadow: spec, ..FlipConfig::default() }.sanitized();
        assert_eq!(cfg.edge_shadow.color.start_gray, 1.0);
        assert_eq!(cfg.edge_shadow.color.start_alpha, 0.0);
        assert_eq!(cfg.edge_shadow.width.min, 10.0);
        assert_eq!(cfg.edge_shadow.width.max, 10.0);
    }

    #[test]
    fn animation_duration_is_clamped() {
        let cfg = FlipConfig { animation_duration: Duration::ZERO, ..FlipConfig::default() }
            .sanitized();
        assert_eq!(cfg.animation_duration, MIN_ANIMATION_DURATION);
    }

    // ── completion ────────────────────────────────────────────────────────

    #[test]
    fn completion_by_distance() {
        let c = CompletionThreshold::default();
        assert!(c.is_met(0.5, 0.0));
        assert!(!c.is_met(0.49, 0.0));
    }

    #[test]
    fn completion_by_fling_needs_min_travel() {
        let c = CompletionThreshold::default();
        assert!(c.is_met(0.3, 2.0));
        assert!(!c.is_met(0.2, 10.0));
        assert!(!c.is_met(0.3, 1.0));
    }

    #[test]
    fn completion_without_fling_is_distance_only() {
        let c = CompletionThreshold { distance_ratio: 0.5, fling: None };
        assert!(!c.is_met(0.4, 100.0));
    }
}
