use std::time::Duration;

use crate::coords::Vec2;

/// Shape of the settle animation after the finger lifts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Easing {
    Linear,
    /// Starts fast and decelerates into the terminal pose.
    #[default]
    EaseOutCubic,
    /// Smooth S-curve.
    EaseInOutCubic,
    /// Starts slow and speeds up (quadratic).
    Accelerate,
}

impl Easing {
    /// Applies the curve to a normalized time `t` in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::Accelerate => t * t,
        }
    }
}

/// Interpolates the lifted corner from a start pose to a terminal pose.
///
/// Time is fed in explicitly through [`Scroller::advance`], so the same
/// sequence of `dt` values always yields the same poses.
#[derive(Debug, Clone)]
pub struct Scroller {
    from: Vec2,
    to: Vec2,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Scroller {
    pub fn new(from: Vec2, to: Vec2, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.as_secs_f32(),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advances by `dt` seconds and returns the new pose.
    ///
    /// Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f32) -> Vec2 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.current()
    }

    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn current(&self) -> Vec2 {
        let p = self.progress();
        if p >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.apply(p))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn target(&self) -> Vec2 {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroller(easing: Easing) -> Scroller {
        Scroller::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Duration::from_millis(200),
            easing,
        )
    }

    // ── easing ────────────────────────────────────────────────────────────

    #[test]
    fn easings_fix_endpoints() {
        for e in [Easing::Linear, Easing::EaseOutCubic, Easing::EaseInOutCubic, Easing::Accelerate] {
            assert_eq!(e.apply(0.0), 0.0, "{e:?}");
            assert_eq!(e.apply(1.0), 1.0, "{e:?}");
        }
    }

    #[test]
    fn ease_out_leads_linear() {
        assert!(Easing::EaseOutCubic.apply(0.3) > Easing::Linear.apply(0.3));
        assert!(Easing::Accelerate.apply(0.3) < Easing::Linear.apply(0.3));
    }

    // ── scroller ──────────────────────────────────────────────────────────

    #[test]
    fn advance_reaches_target_exactly() {
        let mut s = scroller(Easing::EaseOutCubic);
        s.advance(0.1);
        assert!(!s.is_finished());
        let end = s.advance(0.5);
        assert!(s.is_finished());
        assert_eq!(end, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn linear_midpoint() {
        let mut s = scroller(Easing::Linear);
        let mid = s.advance(0.1);
        assert!((mid.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn bad_dt_is_ignored() {
        let mut s = scroller(Easing::Linear);
        s.advance(-1.0);
        s.advance(f32::NAN);
        assert_eq!(s.progress(), 0.0);
    }
}
