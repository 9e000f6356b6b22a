/// Rounds to 2 decimal places, half away from zero. All calculator amounts
/// (averages, bases, fees) go through here.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    // 8500.005 * 100.0 lands on 850000.4999..; nudge by the scale's ulp first
    let nudged = scaled + scaled.signum() * scaled.abs() * f64::EPSILON;
    nudged.round() / 100.0
}

/// Fixed two-decimal rendering used by exports.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", round2(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(-2.675), -2.68);
        assert_eq!(round2(792.6), 792.6);
    }

    #[test]
    fn keeps_exact_values() {
        assert_eq!(round2(8500.0), 8500.0);
        assert_eq!(round2(1275.0), 1275.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn truncates_below_half() {
        assert_eq!(round2(8333.3333), 8333.33);
        assert_eq!(round2(10.004), 10.0);
    }

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_amount(792.6), "792.60");
        assert_eq!(format_amount(8500.0), "8500.00");
    }
}
