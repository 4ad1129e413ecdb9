//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
///
/// Used for linear interpolation along polylines. A degenerate source range maps to the start
/// of the target range.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    let span = source_range.1 - source_range.0;
    if span == T::zero() {
        return target_range.0;
    }

    target_range.0 + ((value - source_range.0) * (target_range.1 - target_range.0) / span)
}

/// Clamp a value into `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    value.max(min).min(max)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// Taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into `[-pi, pi)`.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t = pi_t + pi_t;

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Returns true if `value` lies between `a` and `b` (in any order), inclusive of `tol`.
pub fn is_between<T>(value: T, a: T, b: T, tol: T) -> bool
where
    T: Float,
{
    value >= a.min(b) - tol && value <= a.max(b) + tol
}
