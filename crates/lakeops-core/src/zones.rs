//! Operational zone and supply tier classification.
//!
//! The regulation schedule is a ladder of stage lines. A stage lying exactly
//! on a line belongs to the zone below it.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Daily regulation schedule lines [ft NGVD].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleLines {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d3: f64,
    pub d2: f64,
    pub d1: f64,
    pub d0: f64,
    pub wsm1: f64,
    pub wsm2: f64,
    pub wsm3: f64,
    pub wsm4: f64,
}

impl ScheduleLines {
    /// Zone ladder in ascending order: WSM1, D0, D1, D2, D3, C, B, A.
    pub fn ladder(&self) -> [f64; 8] {
        [
            self.wsm1, self.d0, self.d1, self.d2, self.d3, self.c, self.b, self.a,
        ]
    }

    /// Water shortage lines, shallowest first.
    pub fn shortage_lines(&self) -> [f64; 4] {
        [self.wsm1, self.wsm2, self.wsm3, self.wsm4]
    }

    /// Check the ladder ascends and the shortage lines descend.
    pub fn validate(&self, row: usize) -> SimResult<()> {
        let ladder = self.ladder();
        let shortage = self.shortage_lines();
        if ladder.iter().chain(&shortage).any(|v| !v.is_finite()) {
            return Err(SimError::config(
                "schedule",
                format!("non-finite line at row {row}"),
            ));
        }
        if ladder.windows(2).any(|w| w[1] < w[0]) {
            return Err(SimError::config(
                "schedule",
                format!("zone lines must ascend WSM1 <= D0 <= ... <= A at row {row}"),
            ));
        }
        if shortage.windows(2).any(|w| w[1] > w[0]) {
            return Err(SimError::config(
                "schedule",
                format!("shortage lines must descend WSM1 >= ... >= WSM4 at row {row}"),
            ));
        }
        Ok(())
    }
}

/// Ordinal operational zone, driest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ZoneCode {
    WaterShortage = 1,
    #[default]
    BeneficialUse = 2,
    Baseflow = 3,
    D1 = 4,
    D2 = 5,
    D3 = 6,
    C = 7,
    B = 8,
    A = 9,
}

impl ZoneCode {
    const ALL: [ZoneCode; 9] = [
        ZoneCode::WaterShortage,
        ZoneCode::BeneficialUse,
        ZoneCode::Baseflow,
        ZoneCode::D1,
        ZoneCode::D2,
        ZoneCode::D3,
        ZoneCode::C,
        ZoneCode::B,
        ZoneCode::A,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    /// Zone D sub-bands (D1, D2, D3).
    pub fn is_zone_d(self) -> bool {
        matches!(self, ZoneCode::D1 | ZoneCode::D2 | ZoneCode::D3)
    }

    /// Broad schedule band label.
    pub fn band(self) -> ScheduleBand {
        match self {
            ZoneCode::WaterShortage => ScheduleBand::WaterShortage,
            ZoneCode::BeneficialUse => ScheduleBand::BeneficialUse,
            ZoneCode::Baseflow => ScheduleBand::Baseflow,
            ZoneCode::D1 | ZoneCode::D2 | ZoneCode::D3 => ScheduleBand::D,
            ZoneCode::C => ScheduleBand::C,
            ZoneCode::B => ScheduleBand::B,
            ZoneCode::A => ScheduleBand::A,
        }
    }
}

/// Coarse schedule band reported alongside the zone code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleBand {
    WaterShortage,
    BeneficialUse,
    Baseflow,
    D,
    C,
    B,
    A,
}

/// Classify a stage against the ascending zone ladder.
pub fn classify(stage: f64, ladder: &[f64; 8]) -> ZoneCode {
    let above = ladder.iter().filter(|&&line| stage > line).count();
    // `above` is in 0..=8, so the lookup always succeeds.
    ZoneCode::ALL[above]
}

/// Lower and upper line of a zone, `None` for the open-ended outer zones.
pub fn zone_bounds(zone: ZoneCode, ladder: &[f64; 8]) -> (Option<f64>, Option<f64>) {
    let k = usize::from(zone.code());
    let lower = k.checked_sub(2).map(|i| ladder[i]);
    let upper = ladder.get(k - 1).copied();
    (lower, upper)
}

/// Position of the stage within its zone, 0 at the lower line and 1 at the
/// upper line. The driest zone reports 0, the wettest 1, and a zone of zero
/// height reports 0.
pub fn zone_fraction(stage: f64, zone: ZoneCode, ladder: &[f64; 8]) -> f64 {
    match zone_bounds(zone, ladder) {
        (None, _) => 0.0,
        (_, None) => 1.0,
        (Some(lower), Some(upper)) => {
            let height = upper - lower;
            if height <= 0.0 {
                0.0
            } else {
                ((stage - lower) / height).clamp(0.0, 1.0)
            }
        }
    }
}

/// Water shortage management tier: 0 above WSM1, 1 to 4 deeper.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SupplyTier(u8);

impl SupplyTier {
    pub const NONE: SupplyTier = SupplyTier(0);

    pub fn new(tier: u8) -> Option<Self> {
        (tier <= 4).then_some(SupplyTier(tier))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_shortage(self) -> bool {
        self.0 > 0
    }

    /// Look up a per-tier value; `None` when no shortage applies.
    pub fn select<T: Copy>(self, per_tier: &[T; 4]) -> Option<T> {
        usize::from(self.0)
            .checked_sub(1)
            .map(|i| per_tier[i])
    }
}

/// Classify a stage against the descending shortage lines. A stage on a
/// line falls into the deeper tier.
pub fn supply_tier(stage: f64, shortage_lines: &[f64; 4]) -> SupplyTier {
    let below = shortage_lines.iter().filter(|&&line| stage <= line).count();
    SupplyTier(below as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lines() -> ScheduleLines {
        ScheduleLines {
            a: 17.5,
            b: 17.0,
            c: 16.5,
            d3: 16.0,
            d2: 15.5,
            d1: 15.0,
            d0: 14.0,
            wsm1: 12.0,
            wsm2: 11.5,
            wsm3: 11.0,
            wsm4: 10.5,
        }
    }

    // -- Zone classification --

    #[test]
    fn classifies_each_band() {
        let ladder = lines().ladder();
        assert_eq!(classify(11.0, &ladder), ZoneCode::WaterShortage);
        assert_eq!(classify(13.0, &ladder), ZoneCode::BeneficialUse);
        assert_eq!(classify(14.5, &ladder), ZoneCode::Baseflow);
        assert_eq!(classify(15.2, &ladder), ZoneCode::D1);
        assert_eq!(classify(15.7, &ladder), ZoneCode::D2);
        assert_eq!(classify(16.2, &ladder), ZoneCode::D3);
        assert_eq!(classify(16.7, &ladder), ZoneCode::C);
        assert_eq!(classify(17.2, &ladder), ZoneCode::B);
        assert_eq!(classify(18.0, &ladder), ZoneCode::A);
    }

    #[test]
    fn boundary_stage_goes_to_lower_zone() {
        let ladder = lines().ladder();
        assert_eq!(classify(15.0, &ladder), ZoneCode::Baseflow);
        assert_eq!(classify(12.0, &ladder), ZoneCode::WaterShortage);
        assert_eq!(classify(17.5, &ladder), ZoneCode::B);
    }

    #[test]
    fn zone_is_monotone_in_stage() {
        let ladder = lines().ladder();
        let mut previous = ZoneCode::WaterShortage;
        for k in 0..=1000 {
            let stage = 9.0 + k as f64 * 0.01;
            let zone = classify(stage, &ladder);
            assert!(zone >= previous, "zone decreased at stage {stage}");
            previous = zone;
        }
        assert_eq!(previous, ZoneCode::A);
    }

    #[test]
    fn zone_codes_round_trip() {
        for code in 1..=9 {
            assert_eq!(ZoneCode::from_code(code).map(ZoneCode::code), Some(code));
        }
        assert_eq!(ZoneCode::from_code(0), None);
        assert_eq!(ZoneCode::from_code(10), None);
    }

    // -- Zone fraction --

    #[test]
    fn fraction_within_zone() {
        let ladder = lines().ladder();
        assert_relative_eq!(zone_fraction(15.25, ZoneCode::D1, &ladder), 0.5);
        assert_relative_eq!(zone_fraction(14.0, ZoneCode::Baseflow, &ladder), 0.0);
    }

    #[test]
    fn fraction_at_open_ends() {
        let ladder = lines().ladder();
        assert_eq!(zone_fraction(5.0, ZoneCode::WaterShortage, &ladder), 0.0);
        assert_eq!(zone_fraction(20.0, ZoneCode::A, &ladder), 1.0);
    }

    #[test]
    fn fraction_of_zero_height_zone() {
        let mut l = lines();
        l.d2 = l.d1;
        assert_eq!(zone_fraction(15.0, ZoneCode::D1, &l.ladder()), 0.0);
    }

    #[test]
    fn bounds_of_middle_zone() {
        let ladder = lines().ladder();
        assert_eq!(zone_bounds(ZoneCode::C, &ladder), (Some(16.5), Some(17.0)));
        assert_eq!(zone_bounds(ZoneCode::WaterShortage, &ladder), (None, Some(12.0)));
        assert_eq!(zone_bounds(ZoneCode::A, &ladder), (Some(17.5), None));
    }

    // -- Supply tiers --

    #[test]
    fn supply_tiers() {
        let wsm = lines().shortage_lines();
        assert_eq!(supply_tier(13.0, &wsm).get(), 0);
        assert_eq!(supply_tier(12.0, &wsm).get(), 1);
        assert_eq!(supply_tier(11.2, &wsm).get(), 2);
        assert_eq!(supply_tier(10.9, &wsm).get(), 3);
        assert_eq!(supply_tier(8.0, &wsm).get(), 4);
    }

    #[test]
    fn tier_selects_per_tier_values() {
        let cutbacks = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(SupplyTier::NONE.select(&cutbacks), None);
        assert_eq!(SupplyTier::new(3).and_then(|t| t.select(&cutbacks)), Some(0.3));
        assert!(SupplyTier::new(5).is_none());
    }

    // -- Validation --

    #[test]
    fn rejects_descending_ladder() {
        let mut l = lines();
        l.c = 15.9;
        assert!(l.validate(4).is_err());
        assert!(lines().validate(0).is_ok());
    }
}
