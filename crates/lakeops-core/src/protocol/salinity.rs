//! Estuary salinity outlook.

use smallvec::SmallVec;

use crate::config::SalinityPolicy;
use crate::error::{SimError, SimResult};

/// Days of forecast examined ahead of the current day, the day included.
pub const LOOKAHEAD_DAYS: usize = 13;

/// What is known about estuary salinity on one day.
#[derive(Debug, Clone, PartialEq)]
pub enum SalinityOutlook {
    /// Externally decided need for lake water.
    Flag(bool),
    /// 30-day moving-average salinity forecasts [psu] for the lookahead window.
    ///
    /// Not produced by [`SalinityOutlook::for_day`] yet; held for the
    /// `ValI75NoBaseflow` and `FortMyersNoBaseflow` forecast policies.
    MovingAverages(SmallVec<[f64; 16]>),
}

impl SalinityOutlook {
    /// Outlook for `day` under `policy`.
    ///
    /// Only the externally flagged policy defines a forecast; the others
    /// report `UnimplementedPolicy`.
    pub fn for_day(policy: SalinityPolicy, day: usize, flags: &[bool]) -> SimResult<Self> {
        match policy {
            SalinityPolicy::EstuaryFlag => {
                Ok(SalinityOutlook::Flag(flags.get(day).copied().unwrap_or(false)))
            }
            SalinityPolicy::ValI75NoBaseflow | SalinityPolicy::FortMyersNoBaseflow => {
                Err(SimError::UnimplementedPolicy {
                    policy: format!("{policy:?} salinity forecast"),
                })
            }
        }
    }

    /// Outlook from a moving-average forecast series, truncated at its end.
    ///
    /// Held for the forecast policies, which `for_day` still rejects.
    pub fn from_forecast(series: &[f64], day: usize) -> Self {
        let end = (day + LOOKAHEAD_DAYS).min(series.len());
        let window = series.get(day..end).unwrap_or(&[]);
        SalinityOutlook::MovingAverages(window.iter().copied().collect())
    }

    /// Whether the estuary needs lake water.
    ///
    /// Non-finite forecasts never exceed the threshold.
    pub fn needs_water(&self, threshold: f64) -> bool {
        match self {
            SalinityOutlook::Flag(flag) => *flag,
            SalinityOutlook::MovingAverages(window) => window
                .iter()
                .filter(|v| v.is_finite())
                .any(|&v| v > threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_policy_reads_the_day() {
        let flags = [false, true, false];
        let o = SalinityOutlook::for_day(SalinityPolicy::EstuaryFlag, 1, &flags).unwrap();
        assert!(o.needs_water(5.0));
        let o = SalinityOutlook::for_day(SalinityPolicy::EstuaryFlag, 2, &flags).unwrap();
        assert!(!o.needs_water(5.0));
    }

    #[test]
    fn forecast_policies_are_unimplemented() {
        for policy in [
            SalinityPolicy::ValI75NoBaseflow,
            SalinityPolicy::FortMyersNoBaseflow,
        ] {
            let err = SalinityOutlook::for_day(policy, 0, &[]).unwrap_err();
            assert!(matches!(err, SimError::UnimplementedPolicy { .. }));
        }
    }

    #[test]
    fn window_covers_thirteen_days() {
        let mut series = vec![1.0; 40];
        series[12] = 9.0;
        series[13] = 20.0;
        assert!(SalinityOutlook::from_forecast(&series, 0).needs_water(5.0));
        series[12] = 1.0;
        assert!(!SalinityOutlook::from_forecast(&series, 0).needs_water(5.0));
        assert!(SalinityOutlook::from_forecast(&series, 1).needs_water(5.0));
    }

    #[test]
    fn window_truncates_at_series_end() {
        let series = vec![6.0; 5];
        match SalinityOutlook::from_forecast(&series, 3) {
            SalinityOutlook::MovingAverages(w) => assert_eq!(w.len(), 2),
            other => panic!("unexpected outlook {other:?}"),
        }
        assert!(!SalinityOutlook::from_forecast(&series, 9).needs_water(5.0));
    }

    #[test]
    fn nan_forecast_does_not_trigger() {
        let series = vec![f64::NAN; 20];
        assert!(!SalinityOutlook::from_forecast(&series, 0).needs_water(5.0));
    }
}
