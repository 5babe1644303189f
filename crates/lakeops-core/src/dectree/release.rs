//! Release levels, pulse-day tracking and the stage-rise ceiling.

use serde::{Deserialize, Serialize};

use super::codes::ReleaseCodeTables;
use super::indicators::BranchCodes;
use crate::config::LevelCoefficients;
use crate::zones::ZoneCode;

/// Ordinal release level, no release first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ReleaseLevel {
    #[default]
    NoRelease = 0,
    Baseflow = 1,
    D1 = 2,
    D2 = 3,
    D3 = 4,
    C = 5,
    B = 6,
    A = 7,
}

impl ReleaseLevel {
    const ALL: [ReleaseLevel; 8] = [
        ReleaseLevel::NoRelease,
        ReleaseLevel::Baseflow,
        ReleaseLevel::D1,
        ReleaseLevel::D2,
        ReleaseLevel::D3,
        ReleaseLevel::C,
        ReleaseLevel::B,
        ReleaseLevel::A,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// D-levels are released as pulses.
    pub fn is_pulse(self) -> bool {
        matches!(self, ReleaseLevel::D1 | ReleaseLevel::D2 | ReleaseLevel::D3)
    }

    /// Step `steps` levels up, saturating at A.
    pub fn raise(self, steps: u8) -> Self {
        let code = self.code().saturating_add(steps).min(ReleaseLevel::A.code());
        Self::ALL[usize::from(code)]
    }

    /// Per-level coefficient; `None` for levels without one.
    pub fn coefficient(self, coefficients: &LevelCoefficients) -> Option<f64> {
        match self {
            ReleaseLevel::D1 => Some(coefficients.d1),
            ReleaseLevel::D2 => Some(coefficients.d2),
            ReleaseLevel::D3 => Some(coefficients.d3),
            ReleaseLevel::C => Some(coefficients.c),
            ReleaseLevel::B => Some(coefficients.b),
            ReleaseLevel::NoRelease | ReleaseLevel::Baseflow | ReleaseLevel::A => None,
        }
    }
}

/// Steps looked up for each branch on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BranchDeltas {
    pub zone_d: u8,
    pub zone_c: u8,
    pub zone_b: u8,
}

impl BranchDeltas {
    pub fn lookup(codes: &BranchCodes, tables: &ReleaseCodeTables) -> Self {
        Self {
            zone_d: tables.zone_d.step(codes.zone_d),
            zone_c: tables.zone_c.step(codes.zone_c),
            zone_b: tables.zone_b.step(codes.zone_b),
        }
    }
}

/// Release level suggested by the tree for the lake's zone.
pub fn dec_tree_level(zone: ZoneCode, deltas: BranchDeltas) -> ReleaseLevel {
    match zone {
        ZoneCode::WaterShortage | ZoneCode::BeneficialUse => ReleaseLevel::NoRelease,
        ZoneCode::Baseflow => ReleaseLevel::Baseflow,
        ZoneCode::D1 | ZoneCode::D2 | ZoneCode::D3 => ReleaseLevel::D1.raise(deltas.zone_d),
        ZoneCode::C => ReleaseLevel::D3.raise(deltas.zone_c),
        ZoneCode::B => ReleaseLevel::C.raise(deltas.zone_b),
        ZoneCode::A => ReleaseLevel::A,
    }
}

/// Highest level a zone may release.
pub fn zone_ceiling(zone: ZoneCode) -> ReleaseLevel {
    match zone {
        ZoneCode::WaterShortage | ZoneCode::BeneficialUse => ReleaseLevel::NoRelease,
        ZoneCode::Baseflow => ReleaseLevel::Baseflow,
        ZoneCode::D1 | ZoneCode::D2 | ZoneCode::D3 => ReleaseLevel::D3,
        ZoneCode::C => ReleaseLevel::C,
        ZoneCode::B => ReleaseLevel::B,
        ZoneCode::A => ReleaseLevel::A,
    }
}

/// Day of the current release pulse, 0 outside a pulse.
///
/// A pulse starts on the first D-level day (or on a first simulation day)
/// and restarts after `pulse_len` days.
pub fn pulse_day(
    previous: u32,
    first_day: bool,
    level: ReleaseLevel,
    previous_level: ReleaseLevel,
    enabled: bool,
    pulse_len: usize,
) -> u32 {
    if !enabled || !level.is_pulse() {
        return 0;
    }
    if first_day || !previous_level.is_pulse() || previous as usize >= pulse_len {
        return 1;
    }
    previous + 1
}

/// Release level actually applied.
///
/// A 7-day stage rise above `max_rise` in Zone D or above lifts the release
/// to the zone ceiling. Otherwise a running pulse keeps its level until the
/// pulse ends.
pub fn release_level(
    previous: ReleaseLevel,
    pulse_day: u32,
    decided: ReleaseLevel,
    zone: ZoneCode,
    stage_rise: f64,
    max_rise: f64,
) -> ReleaseLevel {
    if zone >= ZoneCode::D1 && stage_rise > max_rise {
        return zone_ceiling(zone).max(decided);
    }
    if pulse_day > 1 && previous.is_pulse() && decided.is_pulse() {
        return previous;
    }
    decided
}
