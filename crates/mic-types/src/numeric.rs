/// Round `value` half away from zero to `decimals` places.
///
/// Ledger amounts use 2 places; integrity scores, accuracy and GII use 4.
/// Receipt verifiers must apply the same rounding.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Whether `value` is finite and within `[0, 1]`.
pub fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_requested_places() {
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(0.876_54, 4), 0.876_5);
        assert_eq!(round_to(-3.333, 2), -3.33);
        assert_eq!(round_to(119.0, 2), 119.0);
    }

    #[test]
    fn unit_interval_rejects_nan_and_out_of_range() {
        assert!(is_unit_interval(0.0));
        assert!(is_unit_interval(1.0));
        assert!(!is_unit_interval(1.000_1));
        assert!(!is_unit_interval(-0.1));
        assert!(!is_unit_interval(f64::NAN));
    }
}
