/// Clamp `x` into `[low, high]`.
///
/// Never panics: an inverted range (`low > high`) yields `low`.
#[inline]
pub fn limit_range(x: f64, low: f64, high: f64) -> f64 {
    x.min(high).max(low)
}

#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_range_is_unchanged() {
        assert_eq!(limit_range(0.25, 0.0, 1.0), 0.25);
        assert_eq!(limit_range(-3.5, -10.0, 10.0), -3.5);
    }

    #[test]
    fn boundaries_are_exact() {
        assert_eq!(limit_range(0.0, 0.0, 1.0), 0.0);
        assert_eq!(limit_range(1.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn outside_range_is_clamped() {
        for x in [-100.0, -1.0, 1.5, 42.0, f64::INFINITY, f64::NEG_INFINITY] {
            let r = limit_range(x, -1.0, 1.0);
            assert!((-1.0..=1.0).contains(&r), "{x} clamped to {r}");
        }
        assert_eq!(limit_range(3.0, 0.0, 2.0), 2.0);
        assert_eq!(limit_range(-3.0, 0.0, 2.0), 0.0);
    }

    #[test]
    fn power_of_two_detection() {
        assert!(!is_power_of_two(0));
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(2));
        assert!(is_power_of_two(1024));
        assert!(!is_power_of_two(7));
        assert!(!is_power_of_two(12));
    }
}
