use std::fmt;

use crate::{error::TrackError, normalize::NormFactor, window::*};

/// Value used in place of a zero count
pub const COUNT_FLOOR: f64 = 0.001;

/// Replace counts < 1 with COUNT_FLOOR.  Never fails.
pub fn guard_count(raw: u64) -> f64 {
    if raw < 1 {
        COUNT_FLOOR
    } else {
        raw as f64
    }
}

/// Ratio between the adjusted counts for a window.  Displayed with 3 decimal
/// places (rounded to nearest).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioRecord(f64);

impl RatioRecord {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for RatioRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:4.3}", self.0)
    }
}

/// Calculate ratio of guarded count A to guarded and scaled count B for
/// window `w` of `ctg`.
///
/// The adjusted count for B can only be zero if the normalization factor is
/// zero (no mapped reads in the first dataset).  This aborts the run.
pub fn calc_ratio(
    obs: WindowObservation,
    norm: NormFactor,
    ctg: &str,
    w: Window,
) -> Result<RatioRecord, TrackError> {
    let adj_a = guard_count(obs.count_a);
    let adj_b = norm.scale(guard_count(obs.count_b));
    if adj_b == 0.0 {
        warn!("{}:{}-{} had a strange ratio!", ctg, w.start, w.end);
        Err(TrackError::DegenerateRatio {
            ctg: ctg.into(),
            start: w.start,
            end: w.end,
        })
    } else {
        Ok(RatioRecord(adj_a / adj_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: Window = Window {
        start: 2500,
        end: 5000,
    };

    fn obs(count_a: u64, count_b: u64) -> WindowObservation {
        WindowObservation { count_a, count_b }
    }

    #[test]
    fn guard() {
        let v: Vec<_> = [0, 1, 1000].into_iter().map(guard_count).collect();
        assert_eq!(v, [0.001, 1.0, 1000.0]);
    }

    #[test]
    fn format_three_decimals() {
        assert_eq!(RatioRecord(1.0).to_string(), "1.000");
        assert_eq!(RatioRecord(2.0).to_string(), "2.000");
        assert_eq!(RatioRecord(1000000.0).to_string(), "1000000.000");
        assert_eq!(RatioRecord(0.0).to_string(), "0.000");
    }

    #[test]
    fn format_rounds_to_nearest() {
        // Rounded, not truncated
        assert_eq!(RatioRecord(0.8471).to_string(), "0.847");
        assert_eq!(RatioRecord(0.8476).to_string(), "0.848");
        assert_eq!(RatioRecord(2.0 / 3.0).to_string(), "0.667");
        assert_eq!(RatioRecord(0.0004).to_string(), "0.000");
    }

    #[test]
    fn ratio_with_factor() {
        let norm = NormFactor::new(1_000_000, 500_000).unwrap();
        let r = calc_ratio(obs(10, 5), norm, "chr1", W).unwrap();
        assert_eq!(r.value(), 1.0);
        let r = calc_ratio(obs(10, 1), norm, "chr1", W).unwrap();
        assert_eq!(r.value(), 5.0);
    }

    #[test]
    fn zero_counts_are_guarded() {
        let norm = NormFactor::new(100, 100).unwrap();
        assert_eq!(calc_ratio(obs(0, 0), norm, "chr1", W).unwrap().to_string(), "1.000");
        assert_eq!(
            calc_ratio(obs(5, 0), norm, "chr1", W).unwrap().to_string(),
            "5000.000"
        );
        assert_eq!(calc_ratio(obs(0, 5), norm, "chr1", W).unwrap().to_string(), "0.000");
    }

    #[test]
    fn zero_factor_is_fatal() {
        // Aborts the whole run rather than skipping the window; kept for compatibility
        let norm = NormFactor::new(0, 100).unwrap();
        assert_eq!(
            calc_ratio(obs(3, 4), norm, "chr2", W),
            Err(TrackError::DegenerateRatio {
                ctg: "chr2".into(),
                start: 2500,
                end: 5000
            })
        );
    }
}
