//! Min/max scaling for continuous attributes (age, price).

/// Maps `value` into `[0, 1]` relative to `[min, max]`.
///
/// A zero-width range is treated as width 1, so the result degenerates to
/// `value - min`. Values outside the range are not clamped.
#[inline]
pub fn normalize(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    let range = if range == 0.0 { 1.0 } else { range };
    (value - min) / range
}

/// Observed range of a continuous attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns `None` for an empty input, where min/max are undefined.
    pub fn from_values(values: impl IntoIterator<Item = f32>) -> Option<Self> {
        values.into_iter().fold(None, |bounds, value| match bounds {
            None => Some(Bounds::new(value, value)),
            Some(b) => Some(Bounds::new(b.min.min(value), b.max.max(value))),
        })
    }

    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        normalize(value, self.min, self.max)
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }
}
