//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a f64 to the f32 range and downcast, returning 0.0 for non-finite values.
#[must_use]
pub fn clamp_f64_to_f32(value: f64) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let min = cast::<f32, f64>(f32::MIN).unwrap_or(f64::MIN);
    let max = cast::<f32, f64>(f32::MAX).unwrap_or(f64::MAX);
    cast::<f64, f32>(value.clamp(min, max)).unwrap_or(0.0)
}

/// Floor a f32 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn floor_f32_to_i32(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = f64::from(value).clamp(min, max).floor();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Convert a collection length to f32, saturating on absurd sizes.
#[must_use]
pub fn len_to_f32(len: usize) -> f32 {
    cast::<usize, f32>(len).unwrap_or(f32::MAX)
}

/// Convert a signed integer into f32 in a single location.
#[must_use]
pub fn i32_to_f32(value: i32) -> f32 {
    cast::<i32, f32>(value).unwrap_or(0.0)
}

/// Map a unit roll in `[0, 1)` onto an index in `0..len`.
///
/// Returns `None` when `len` is zero.
#[must_use]
pub fn unit_to_index(roll: f64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let scaled = (roll.clamp(0.0, 1.0) * cast::<usize, f64>(len).unwrap_or(0.0)).floor();
    let idx = cast::<f64, usize>(scaled).unwrap_or(0);
    Some(idx.min(len - 1))
}
