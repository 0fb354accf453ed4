//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Map a uniform draw in `[0, 1)` onto a die face in `[1, sides]`.
///
/// Computes `floor(unit * sides) + 1`. Draws outside `[0, 1)` and non-finite
/// draws are clamped onto the nearest valid face.
#[must_use]
pub fn unit_to_face(unit: f64, sides: u32) -> i32 {
    let max_face = cast::<u32, i32>(sides.max(1)).unwrap_or(i32::MAX);
    if !unit.is_finite() {
        return 1;
    }
    let scaled = (unit * f64::from(sides)).floor();
    let face = cast::<f64, i64>(scaled).unwrap_or(0).saturating_add(1);
    let clamped = face.clamp(1, i64::from(max_face));
    cast::<i64, i32>(clamped).unwrap_or(1)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert a collection length to f64.
#[must_use]
pub fn len_to_f64(len: usize) -> f64 {
    cast::<usize, f64>(len).unwrap_or(0.0)
}

/// Mean of `sum` over `len` items, 0 for an empty collection.
#[must_use]
pub fn mean(sum: i64, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    i64_to_f64(sum) / len_to_f64(len)
}
