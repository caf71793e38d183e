use super::Color;

/// A single gradient stop.
///
/// `t` is expected in [0, 1]; ramps clamp samples to their end stops.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Two-stop linear ramp across a strip, padded outside its stops.
///
/// Shadows are drawn as strips whose inner edge takes `from` and outer edge
/// takes `to`; the GPU interpolates in between.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearRamp {
    pub from: ColorStop,
    pub to: ColorStop,
}

impl LinearRamp {
    #[inline]
    pub const fn new(from: ColorStop, to: ColorStop) -> Self {
        Self { from, to }
    }

    /// Ramp spanning the whole `[0, 1]` range.
    #[inline]
    pub const fn between(from: Color, to: Color) -> Self {
        Self::new(ColorStop::new(0.0, from), ColorStop::new(1.0, to))
    }

    /// Color at `t`. Values before `from.t` or after `to.t` pad to the edge stop.
    pub fn sample(&self, t: f32) -> Color {
        let span = self.to.t - self.from.t;
        if span.abs() <= f32::EPSILON {
            return if t < self.from.t { self.from.color } else { self.to.color };
        }
        let local = ((t - self.from.t) / span).clamp(0.0, 1.0);
        self.from.color.lerp(self.to.color, local)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.from.t.is_finite()
            && self.to.t.is_finite()
            && self.from.color.is_finite()
            && self.to.color.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_pads_outside_stops() {
        let ramp = LinearRamp::new(
            ColorStop::new(0.25, Color::gray(0.0, 1.0)),
            ColorStop::new(0.75, Color::white()),
        );
        assert_eq!(ramp.sample(0.0), Color::gray(0.0, 1.0));
        assert_eq!(ramp.sample(1.0), Color::white());
        assert_eq!(ramp.sample(0.5), Color::gray(0.5, 1.0));
    }

    #[test]
    fn degenerate_span_is_a_step() {
        let ramp = LinearRamp::new(
            ColorStop::new(0.5, Color::transparent()),
            ColorStop::new(0.5, Color::white()),
        );
        assert_eq!(ramp.sample(0.4), Color::transparent());
        assert_eq!(ramp.sample(0.6), Color::white());
    }
}
