//! Calendar and demand series derived once before the daily loop.

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::SimulationConfig;
use crate::inputs::SimulationInputs;
use crate::outlets::Outlet;
use crate::tables::{ReferenceTables, WeeklyDemand, DEMAND_WEEKS};

/// Operating season used by the release multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Season {
    /// November to February.
    #[default]
    Winter = 1,
    /// March to May.
    Spring = 2,
    /// June and July.
    EarlySummer = 3,
    /// August to October.
    LateSummer = 4,
}

impl Season {
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6 | 7 => Season::EarlySummer,
            8..=10 => Season::LateSummer,
            _ => Season::Winter,
        }
    }

    pub fn is_dry(self) -> bool {
        matches!(self, Season::Winter | Season::Spring)
    }
}

/// April and May.
pub fn is_late_dry_season(date: NaiveDate) -> bool {
    matches!(date.month(), 4 | 5)
}

/// Most recent anniversary of `start` on or before `date`.
///
/// A Feb 29 start falls back to Feb 28 in common years.
fn last_anniversary(start: NaiveDate, date: NaiveDate) -> NaiveDate {
    let in_year = |year: i32| {
        start
            .with_year(year)
            .or_else(|| NaiveDate::from_ymd_opt(year, start.month(), 28))
            .unwrap_or(start)
    };
    let candidate = in_year(date.year());
    if candidate <= date {
        candidate
    } else {
        in_year(date.year() - 1)
    }
}

/// Whether a row starts a simulation year.
///
/// In continuous runs only the start date itself qualifies; otherwise every
/// anniversary of it does.
pub fn is_first_day(date: NaiveDate, start: NaiveDate, continuous: bool) -> bool {
    date.month() == start.month()
        && date.day() == start.day()
        && (!continuous || date.year() == start.year())
}

/// Daily water supply demand from the weekly table [acre-ft/day].
///
/// Weeks are counted from the latest anniversary of the start date; the
/// last one or two days of a year fold into week 52.
pub fn daily_demand(
    date: NaiveDate,
    start: NaiveDate,
    weekly: &WeeklyDemand,
    scenario: usize,
    multiplier_pct: f64,
) -> f64 {
    let count = (date - last_anniversary(start, date)).num_days().max(0) as usize;
    let week = if count > 363 {
        DEMAND_WEEKS
    } else {
        (count / 7 + 1).min(DEMAND_WEEKS)
    };
    weekly.week(scenario, week) / 7.0 * multiplier_pct / 100.0
}

/// Shortfall of monthly basin runoff against a baseflow target [cfs].
pub fn baseflow_shortfall(target: f64, monthly_runoff: f64) -> f64 {
    (target - monthly_runoff).max(0.0)
}

/// Series computed once per run.
#[derive(Debug, Clone)]
pub struct Precomputed {
    /// Calendar date of every row.
    pub dates: Vec<NaiveDate>,
    /// Calendar date of every day, `start_date` first.
    pub days: Vec<NaiveDate>,
    /// Season of every day.
    pub seasons: Vec<Season>,
    /// Late dry season flag of every day.
    pub late_dry_season: Vec<bool>,
    pub first_day: Vec<bool>,
    /// Water supply demand of every day [acre-ft/day].
    pub demand: Vec<f64>,
    /// Scaled lake-side demand [acre-ft/day].
    pub losa_demand: Vec<f64>,
    pub east_shortfall: Vec<f64>,
    pub west_shortfall: Vec<f64>,
    pub east_pulse_mean: [f64; 3],
    pub west_pulse_mean: [f64; 3],
}

impl Precomputed {
    /// Derive the row-aligned and day-aligned series for a validated
    /// configuration.
    pub fn new(
        config: &SimulationConfig,
        inputs: &SimulationInputs,
        tables: &ReferenceTables,
    ) -> Self {
        let start = config.start_date;
        let first_row = start - Duration::days(1);
        let dates: Vec<NaiveDate> = (0..config.n_rows())
            .map(|r| first_row + Duration::days(r as i64))
            .collect();
        let days: Vec<NaiveDate> = dates.iter().skip(1).copied().collect();

        let seasons = days.iter().map(|&d| Season::of(d)).collect();
        let late_dry_season = days.iter().map(|&d| is_late_dry_season(d)).collect();
        let first_day = dates
            .iter()
            .map(|&d| is_first_day(d, start, config.continuous))
            .collect();
        let demand = days
            .iter()
            .map(|&d| {
                daily_demand(
                    d,
                    start,
                    &tables.weekly_demand,
                    config.supply.demand_scenario,
                    config.supply.demand_multiplier,
                )
            })
            .collect();
        let losa_demand = inputs
            .losa_demand
            .iter()
            .map(|v| v * config.supply.losa_multiplier / 100.0)
            .collect();

        // Row 0 may sit in the month before the start; it reuses the first month.
        let month_index = |d: NaiveDate| {
            let k = (d.year() - start.year()) * 12 + d.month() as i32 - start.month() as i32;
            k.max(0) as usize
        };
        let shortfall = |target: f64, monthly: &[f64]| -> Vec<f64> {
            dates
                .iter()
                .map(|&d| {
                    let runoff = monthly.get(month_index(d)).copied().unwrap_or(0.0);
                    baseflow_shortfall(target, runoff)
                })
                .collect()
        };
        let east_shortfall = shortfall(config.east.baseflow_target, &inputs.monthly_east_runoff);
        let west_shortfall = shortfall(config.west.baseflow_target, &inputs.monthly_west_runoff);

        let east_pulse_mean = tables.pulses.averages(Outlet::East);
        let west_pulse_mean = tables.pulses.averages(Outlet::West);
        tracing::debug!(
            rows = dates.len(),
            ?east_pulse_mean,
            ?west_pulse_mean,
            "precomputed calendar and demand series"
        );

        Self {
            dates,
            days,
            seasons,
            late_dry_season,
            first_day,
            demand,
            losa_demand,
            east_shortfall,
            west_shortfall,
            east_pulse_mean,
            west_pulse_mean,
        }
    }

    pub fn pulse_mean(&self, outlet: Outlet) -> [f64; 3] {
        match outlet {
            Outlet::East => self.east_pulse_mean,
            Outlet::West => self.west_pulse_mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- Seasons --

    #[test]
    fn seasons_by_month() {
        assert_eq!(Season::of(date(2008, 1, 15)), Season::Winter);
        assert_eq!(Season::of(date(2008, 11, 1)), Season::Winter);
        assert_eq!(Season::of(date(2008, 3, 1)), Season::Spring);
        assert_eq!(Season::of(date(2008, 7, 31)), Season::EarlySummer);
        assert_eq!(Season::of(date(2008, 10, 31)), Season::LateSummer);
        assert!(Season::Spring.is_dry());
        assert!(!Season::LateSummer.is_dry());
    }

    #[test]
    fn late_dry_season_is_april_and_may() {
        assert!(!is_late_dry_season(date(2008, 3, 31)));
        assert!(is_late_dry_season(date(2008, 4, 1)));
        assert!(is_late_dry_season(date(2008, 5, 31)));
        assert!(!is_late_dry_season(date(2008, 6, 1)));
    }

    // -- Day flags --

    #[test]
    fn first_day_continuous_only_once() {
        let start = date(2008, 1, 1);
        assert!(is_first_day(start, start, true));
        assert!(!is_first_day(date(2009, 1, 1), start, true));
        assert!(is_first_day(date(2009, 1, 1), start, false));
        assert!(!is_first_day(date(2009, 1, 2), start, false));
    }

    // -- Demand --

    #[test]
    fn demand_follows_weeks_from_anniversary() {
        let weekly = WeeklyDemand((1..=52).map(|w| vec![7.0 * w as f64]).collect());
        let start = date(2008, 1, 1);
        assert_relative_eq!(daily_demand(start, start, &weekly, 0, 100.0), 1.0);
        assert_relative_eq!(daily_demand(date(2008, 1, 8), start, &weekly, 0, 100.0), 2.0);
        assert_relative_eq!(daily_demand(date(2008, 12, 30), start, &weekly, 0, 100.0), 52.0);
        assert_relative_eq!(daily_demand(date(2008, 12, 31), start, &weekly, 0, 100.0), 52.0);
        assert_relative_eq!(daily_demand(date(2009, 1, 1), start, &weekly, 0, 50.0), 0.5);
    }

    #[test]
    fn day_before_start_counts_from_previous_year() {
        let weekly = WeeklyDemand((1..=52).map(|w| vec![7.0 * w as f64]).collect());
        let start = date(2008, 6, 1);
        assert_relative_eq!(daily_demand(date(2008, 5, 31), start, &weekly, 0, 100.0), 52.0);
    }

    #[test]
    fn leap_day_start_falls_back_to_feb_28() {
        assert_eq!(last_anniversary(date(2008, 2, 29), date(2009, 3, 1)), date(2009, 2, 28));
    }

    // -- Alignment --

    #[test]
    fn calendar_series_are_day_aligned() {
        let mut s = Scenario::steady(3);
        s.config.start_date = date(2008, 3, 31);
        s.config.end_date = date(2008, 4, 2);
        let pre = Precomputed::new(&s.config, &s.inputs, &s.tables);
        assert_eq!(pre.dates.len(), 4);
        assert_eq!(pre.dates[0], date(2008, 3, 30));
        assert_eq!(pre.days, vec![date(2008, 3, 31), date(2008, 4, 1), date(2008, 4, 2)]);
        assert_eq!(pre.late_dry_season, vec![false, true, true]);
        assert_eq!(pre.seasons.len(), 3);
        assert_eq!(pre.demand.len(), 3);
    }

    // -- Baseflow shortfall --

    #[test]
    fn shortfall_never_negative() {
        assert_relative_eq!(baseflow_shortfall(450.0, 100.0), 350.0);
        assert_relative_eq!(baseflow_shortfall(450.0, 900.0), 0.0);
    }
}
