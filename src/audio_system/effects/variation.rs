/// Random variation ranges
///
/// One-shot effects pick their volume and pitch uniformly from a range so
/// repeated sounds don't all sound identical.
use rand::Rng;

/// Closed range `[min, max]` sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomRange {
    min: f32,
    max: f32,
}

impl RandomRange {
    /// Create a range; bounds given in either order are normalised
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Range that always yields `value`
    pub fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Pick a value; a degenerate range returns its bound without touching `rng`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.is_fixed() || !(self.min.is_finite() && self.max.is_finite()) {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    /// Restrict both bounds to `[lo, hi]`
    pub fn clamped(self, lo: f32, hi: f32) -> Self {
        Self::new(self.min.clamp(lo, hi), self.max.clamp(lo, hi))
    }
}

impl From<f32> for RandomRange {
    fn from(value: f32) -> Self {
        Self::fixed(value)
    }
}

impl From<(f32, f32)> for RandomRange {
    fn from((min, max): (f32, f32)) -> Self {
        Self::new(min, max)
    }
}
