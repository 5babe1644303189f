//! Outflow and inflow structures around the lake.
//!
//! The east and west outlets carry regulatory releases and baseflow to the
//! two estuaries; the south outlets release to the conservation areas.
//! Supply, augmentation and evapotranspiration terms also live here since
//! they feed the same daily water balance.
pub mod east;
pub mod south;
pub mod supply;
pub mod west;

use serde::{Deserialize, Serialize};

use crate::config::{BaseflowOption, LevelCoefficients, MultiplierConfig, MultiplierMode};
use crate::dectree::ReleaseLevel;
use crate::precompute::Season;
use crate::tables::LevelRates;

/// Conversion from a daily mean flow [cfs] to a daily volume [acre-ft].
pub const CFS_TO_ACFT_PER_DAY: f64 = 1.9835;

/// Primary outlet towards an estuary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlet {
    East,
    West,
}

/// Release multiplier for the applied level.
///
/// In the dry season, when the lake has risen by no more than the level's
/// `dstar` over seven days, releases scale with the position in the zone:
/// `clamp(astar * fraction + bstar, 0, 1)`. Otherwise the multiplier is 1.
pub fn release_multiplier(
    season: Season,
    stage_rise: f64,
    level: ReleaseLevel,
    fraction: f64,
    config: &MultiplierConfig,
    bstar: &LevelCoefficients,
) -> f64 {
    if config.mode == MultiplierMode::Off {
        return 1.0;
    }
    let coefficients = (
        level.coefficient(&config.dstar),
        level.coefficient(&config.astar),
        level.coefficient(bstar),
    );
    match coefficients {
        (Some(dstar), Some(astar), Some(bstar)) if season.is_dry() && stage_rise <= dstar => {
            (astar * fraction + bstar).clamp(0.0, 1.0)
        }
        _ => 1.0,
    }
}

/// Multiplier to apply on `row`, holding the value from the day before the
/// pulse started in pulse-held mode.
pub fn applied_multiplier(history: &[f64], row: usize, pulse_day: u32, mode: MultiplierMode) -> f64 {
    let today = history.get(row).copied().unwrap_or(1.0);
    if mode != MultiplierMode::PulseHeld || pulse_day == 0 {
        return today;
    }
    row.checked_sub(pulse_day as usize)
        .and_then(|r| history.get(r))
        .copied()
        .unwrap_or(today)
}

/// Scheduled release for a level [cfs].
///
/// D-levels follow the pulse shape normalised by its mean; C is scaled by
/// the multiplier; B and C take the estuary's turn; A releases the full rate.
pub fn scheduled_release(
    level: ReleaseLevel,
    rates: &LevelRates,
    pulse: [f64; 3],
    pulse_mean: [f64; 3],
    multiplier: f64,
    turn: f64,
) -> f64 {
    let shaped = |rate: f64, k: usize| {
        if pulse_mean[k] > 0.0 {
            rate * pulse[k] / pulse_mean[k] * multiplier * turn
        } else {
            0.0
        }
    };
    match level {
        ReleaseLevel::NoRelease | ReleaseLevel::Baseflow => 0.0,
        ReleaseLevel::D1 => shaped(rates.d1, 0),
        ReleaseLevel::D2 => shaped(rates.d2, 1),
        ReleaseLevel::D3 => shaped(rates.d3, 2),
        ReleaseLevel::C => rates.c * multiplier * turn,
        ReleaseLevel::B => rates.b * turn,
        ReleaseLevel::A => rates.a,
    }
}

/// Scheduled release net of basin runoff when the target is set downstream.
pub fn upstream_need(scheduled: f64, runoff: f64, downstream_target: bool) -> f64 {
    if downstream_target {
        (scheduled - runoff).max(0.0)
    } else {
        scheduled
    }
}

/// Month-to-date sum, restarting on the first of the month.
pub fn month_to_date(day_of_month: u32, previous: f64, today: f64) -> f64 {
    if day_of_month == 1 {
        today
    } else {
        previous + today
    }
}

/// Baseflow needed at the downstream structure [cfs].
///
/// Released from the baseflow level upward, as long as no regulatory
/// release has gone out earlier in the month.
pub fn downstream_baseflow(
    level: ReleaseLevel,
    month_regulatory: f64,
    shortfall: f64,
    option: BaseflowOption,
) -> f64 {
    if option == BaseflowOption::Off {
        return 0.0;
    }
    if level >= ReleaseLevel::Baseflow && month_regulatory <= 0.0 {
        shortfall
    } else {
        0.0
    }
}

/// Baseflow released from the lake [cfs].
pub fn upstream_baseflow(option: BaseflowOption, downstream: f64, net_runoff: f64) -> f64 {
    match option {
        BaseflowOption::Off => 0.0,
        BaseflowOption::MonthlyShortfall => downstream,
        BaseflowOption::DailyShortfall => (downstream - net_runoff.max(0.0)).max(0.0),
    }
}
