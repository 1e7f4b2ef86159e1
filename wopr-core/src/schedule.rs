//! Active-window evaluation
//!
//! Decides whether the display window is open at a given local hour.
//! The window `[start_hour, end_hour)` may wrap past midnight.

use crate::config::Config;

/// Returns true when the window is open at `hour`.
///
/// `start_hour < end_hour` is a plain same-day window. Otherwise the
/// window wraps across midnight; equal bounds are the degenerate wrap
/// case and mean always open. `hour` must be in 0..=23.
pub fn is_active(config: &Config, hour: u8) -> bool {
    if config.start_hour < config.end_hour {
        config.start_hour <= hour && hour < config.end_hour
    } else {
        hour >= config.start_hour || hour < config.end_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn window(start: u8, end: u8) -> Config {
        Config {
            start_hour: start,
            end_hour: end,
            ..Config::default()
        }
    }

    #[test]
    fn same_day_window_boundaries() {
        let config = window(9, 17);
        assert!(!is_active(&config, 8));
        assert!(is_active(&config, 9));
        assert!(is_active(&config, 16));
        assert!(!is_active(&config, 17));
        assert!(!is_active(&config, 23));
    }

    #[test]
    fn overnight_window_boundaries() {
        // The default 7 -> 1 window: evening through 00:59.
        let config = window(7, 1);
        assert!(is_active(&config, 0));
        assert!(!is_active(&config, 1));
        assert!(!is_active(&config, 6));
        assert!(is_active(&config, 7));
        assert!(is_active(&config, 23));
    }

    #[test]
    fn equal_bounds_mean_always_open() {
        let config = window(5, 5);
        for hour in 0..24 {
            assert!(is_active(&config, hour), "hour {hour}");
        }
    }

    proptest! {
        /// The branchy evaluator agrees with a brute-force membership
        /// model of the (possibly wrapping) hour span.
        #[test]
        fn matches_membership_model(start in 0u8..24, end in 0u8..24, hour in 0u8..24) {
            let config = window(start, end);
            let expected = if start < end {
                (start..end).contains(&hour)
            } else {
                (start..24).contains(&hour) || (0..end).contains(&hour)
            };
            prop_assert_eq!(is_active(&config, hour), expected);
        }
    }
}
