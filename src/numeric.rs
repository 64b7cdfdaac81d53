//! Scalar helpers shared by every layout strategy
//!
//! Everything that enters the engine from caller data passes through
//! [`finite_or`] or [`coerce`], so positions computed downstream never see
//! NaN or infinity.

/// Return `value` if it is finite, otherwise `default`
#[inline]
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// Coerce a possibly non-finite value to `0.0`
#[inline]
pub fn coerce(value: f64) -> f64 {
    finite_or(value, 0.0)
}

/// Clamp `value` into `[lo, hi]`
///
/// Bounds given in reverse order are swapped. A non-finite value clamps to
/// the lower bound.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if !value.is_finite() {
        return lo;
    }
    value.clamp(lo, hi)
}

/// Min/max over the finite values of an iterator
///
/// Returns `None` if no finite value was seen.
pub fn extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

/// Linear mapping from a numeric domain to a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Build a scale over `extent`, widening a zero-width domain to `[v-1, v+1]`
    pub fn padded(extent: (f64, f64), range: (f64, f64)) -> Self {
        let (min, max) = extent;
        let domain = if min == max {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        };
        Self::new(domain, range)
    }

    /// Map a domain value into the range
    ///
    /// A zero-width domain maps everything to the start of the range rather
    /// than dividing by zero. Non-finite input yields a non-finite output,
    /// which callers use to drop the value.
    ///
    /// Offsets are taken on halved values so a domain spanning most of the
    /// `f64` range does not overflow to infinity.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let half_span = d1 / 2.0 - d0 / 2.0;
        if half_span == 0.0 {
            return r0;
        }
        let t = (value / 2.0 - d0 / 2.0) / half_span;
        r0 + t * (r1 - r0)
    }
}
