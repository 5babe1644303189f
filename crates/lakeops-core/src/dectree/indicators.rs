//! Branch sub-indicators and composite codes.

use serde::{Deserialize, Serialize};

use crate::config::{DecisionTreeConfig, MetForecastIndicator};
use crate::zones::ScheduleLines;

/// Tributary condition class upper bounds for codes 1 and 2.
const TRIBUTARY_BREAKS_LEGACY: [f64; 2] = [3.0, 4.0];
const TRIBUTARY_BREAKS_REVISED: [f64; 2] = [2.0, 4.0];

/// Climate class at or below which the outlook counts as normal or drier.
const SEASONAL_NORMAL_LEGACY: u8 = 3;
const SEASONAL_NORMAL_REVISED: u8 = 2;

/// Climate class from which the outlook counts as very wet.
const VERY_WET_CLASS: u8 = 5;

/// Combine four decimal digits into a branch code.
pub fn composite(tributary: u8, stage_or_met: u8, seasonal: u8, multi_seasonal: u8) -> u16 {
    1000 * u16::from(tributary)
        + 100 * u16::from(stage_or_met)
        + 10 * u16::from(seasonal)
        + u16::from(multi_seasonal)
}

/// Split a branch code back into its digits.
pub fn digits(code: u16) -> [u8; 4] {
    [
        (code / 1000 % 10) as u8,
        (code / 100 % 10) as u8,
        (code / 10 % 10) as u8,
        (code % 10) as u8,
    ]
}

/// Tributary code 1 (normal or drier) to 3 (very wet).
pub fn tributary_code(condition: f64, revised: bool) -> u8 {
    let breaks = if revised {
        TRIBUTARY_BREAKS_REVISED
    } else {
        TRIBUTARY_BREAKS_LEGACY
    };
    1 + breaks.iter().filter(|&&b| condition > b).count() as u8
}

/// 1 in the lower half of Zone D, 2 in the upper half.
pub fn zone_d_stage_code(stage: f64, lines: &ScheduleLines) -> u8 {
    if stage <= lines.d2 {
        1
    } else {
        2
    }
}

/// 1 for a normal or drier outlook, 2 for a wet one.
pub fn seasonal_code(class: u8, revised: bool) -> u8 {
    let normal = if revised {
        SEASONAL_NORMAL_REVISED
    } else {
        SEASONAL_NORMAL_LEGACY
    };
    if class > normal {
        2
    } else {
        1
    }
}

/// Zone D seasonal digit. The legacy tree ignores the outlook (digit 0)
/// when tributaries are normal or drier.
pub fn zone_d_seasonal_code(class: u8, tributary: u8, revised: bool) -> u8 {
    if !revised && tributary == 1 {
        0
    } else {
        seasonal_code(class, revised)
    }
}

/// Zone C meteorological forecast digit.
pub fn zone_c_met_code(indicator: MetForecastIndicator, seasonal: u8, class: u8) -> u8 {
    match indicator {
        MetForecastIndicator::Ignored => 0,
        MetForecastIndicator::SeasonalCode => seasonal,
        MetForecastIndicator::WetOutlook => u8::from(class >= VERY_WET_CLASS),
    }
}

/// 1 in the lower half of Zone B, 2 in the upper half.
pub fn zone_b_stage_code(stage: f64, lines: &ScheduleLines) -> u8 {
    if stage <= (lines.b + lines.a) / 2.0 {
        1
    } else {
        2
    }
}

/// Zone B seasonal digit: 1 normal or drier, 2 wet, 3 very wet.
pub fn zone_b_seasonal_code(class: u8) -> u8 {
    match class {
        0..=3 => 1,
        4 => 2,
        _ => 3,
    }
}

/// Indicators observed on one day.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub tributary_condition: f64,
    pub seasonal_class: u8,
    pub multi_seasonal_class: u8,
    pub stage: f64,
    pub lines: &'a ScheduleLines,
}

/// Composite codes of the three branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BranchCodes {
    pub zone_d: u16,
    pub zone_c: u16,
    pub zone_b: u16,
}

/// Score every branch for one day.
pub fn branch_codes(inputs: &DecisionInputs<'_>, config: &DecisionTreeConfig) -> BranchCodes {
    let revised = config.revised_indicators;
    let tributary = tributary_code(inputs.tributary_condition, revised);
    let multi = seasonal_code(inputs.multi_seasonal_class, revised);
    let seasonal = seasonal_code(inputs.seasonal_class, revised);

    let zone_d = composite(
        tributary,
        zone_d_stage_code(inputs.stage, inputs.lines),
        zone_d_seasonal_code(inputs.seasonal_class, tributary, revised),
        multi,
    );
    let zone_c = composite(
        tributary,
        zone_c_met_code(config.zone_c_met_forecast, seasonal, inputs.seasonal_class),
        seasonal,
        multi,
    );
    let zone_b = composite(
        tributary,
        zone_b_stage_code(inputs.stage, inputs.lines),
        zone_b_seasonal_code(inputs.seasonal_class),
        multi,
    );
    BranchCodes {
        zone_d,
        zone_c,
        zone_b,
    }
}
