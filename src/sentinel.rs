//! Sentinel normalization
//!
//! The Uncle instrument writes `-1` wherever a measurement is absent. Raw
//! numeric values go through [`normalize`] before they reach a record so the
//! store sees `NULL` instead of a fake reading.

/// Reserved "no measurement" marker written by the instrument
pub const SENTINEL: i8 = -1;

/// Numeric types that can carry the instrument's sentinel.
pub trait Sentinel: Copy + PartialEq {
    /// True when the value is the reserved `-1` marker.
    fn is_sentinel(self) -> bool;
}

macro_rules! impl_sentinel {
    ($($ty:ty => $marker:expr),* $(,)?) => {
        $(
            impl Sentinel for $ty {
                #[allow(clippy::float_cmp)]
                fn is_sentinel(self) -> bool {
                    self == $marker
                }
            }
        )*
    };
}

impl_sentinel!(
    i8 => -1,
    i16 => -1,
    i32 => -1,
    i64 => -1,
    f32 => -1.0,
    f64 => -1.0,
);

/// Map the sentinel to `None`, pass every other value through.
///
/// # Example
///
/// ```rust
/// use uncle_db::sentinel::normalize;
///
/// assert_eq!(normalize(-1_i64), None);
/// assert_eq!(normalize(42.5_f64), Some(42.5));
/// ```
#[must_use]
pub fn normalize<T: Sentinel>(value: T) -> Option<T> {
    if value.is_sentinel() {
        None
    } else {
        Some(value)
    }
}

/// [`normalize`] lifted over an already-optional value.
///
/// Idempotent: `normalize_opt(normalize_opt(x)) == normalize_opt(x)`.
#[must_use]
pub fn normalize_opt<T: Sentinel>(value: Option<T>) -> Option<T> {
    value.and_then(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_becomes_missing() {
        assert_eq!(normalize(-1_i32), None);
        assert_eq!(normalize(-1.0_f64), None);
        assert_eq!(normalize(i64::from(SENTINEL)), None);
    }

    #[test]
    fn test_other_values_pass_through() {
        assert_eq!(normalize(0_i64), Some(0));
        assert_eq!(normalize(-2_i32), Some(-2));
        assert_eq!(normalize(-0.999_f64), Some(-0.999));
    }

    #[test]
    fn test_normalize_idempotent() {
        assert_eq!(normalize_opt(normalize(-1_i64)), None);
        assert_eq!(normalize_opt(normalize(7_i64)), Some(7));
        assert_eq!(normalize_opt::<f64>(None), None);
    }

    #[test]
    fn test_nan_is_not_sentinel() {
        assert!(normalize(f64::NAN).is_some_and(f64::is_nan));
    }
}
