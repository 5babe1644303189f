//! Stage-storage-area converter.
//!
//! Piecewise-linear interpolation over a monotonic table of lake stage
//! [ft NGVD], storage [acre-ft], open-water area [acres] and littoral marsh
//! area [acres]. Requests outside the table clamp to the nearest boundary
//! row; nothing is extrapolated.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// One row of the stage-storage-area table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypsometryRow {
    pub stage: f64,
    pub storage: f64,
    pub area: f64,
    pub marsh: f64,
}

/// Validated, monotonic stage-storage-area curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<HypsometryRow>", into = "Vec<HypsometryRow>")]
pub struct StageStorageCurve {
    pub(crate) rows: Vec<HypsometryRow>,
}

impl StageStorageCurve {
    /// Build a curve, checking that stage and storage strictly increase and
    /// that areas are non-negative.
    pub fn new(rows: Vec<HypsometryRow>) -> SimResult<Self> {
        if rows.len() < 2 {
            return Err(SimError::config(
                "hypsometry",
                format!("needs at least 2 rows, got {}", rows.len()),
            ));
        }
        for (k, row) in rows.iter().enumerate() {
            let values = [row.stage, row.storage, row.area, row.marsh];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SimError::config(
                    "hypsometry",
                    format!("non-finite value at row {k}"),
                ));
            }
            if row.area < 0.0 || row.marsh < 0.0 {
                return Err(SimError::config(
                    "hypsometry",
                    format!("negative area at row {k}"),
                ));
            }
        }
        for (k, pair) in rows.windows(2).enumerate() {
            if pair[1].stage <= pair[0].stage || pair[1].storage <= pair[0].storage {
                return Err(SimError::config(
                    "hypsometry",
                    format!(
                        "stage and storage must strictly increase (rows {} and {})",
                        k,
                        k + 1
                    ),
                ));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[HypsometryRow] {
        &self.rows
    }

    /// Lowest and highest stage covered by the table.
    pub fn stage_range(&self) -> (f64, f64) {
        (self.first().stage, self.last().stage)
    }

    /// Lowest and highest storage covered by the table.
    pub fn storage_range(&self) -> (f64, f64) {
        (self.first().storage, self.last().storage)
    }

    /// Storage at a stage, clamped to the table.
    pub fn storage_at(&self, stage: f64) -> f64 {
        interpolate(&self.rows, stage, |r| r.stage, |r| r.storage)
    }

    /// Stage at a storage, clamped to the table.
    pub fn stage_at(&self, storage: f64) -> f64 {
        interpolate(&self.rows, storage, |r| r.storage, |r| r.stage)
    }

    /// Open-water area at a stage.
    pub fn area_at(&self, stage: f64) -> f64 {
        interpolate(&self.rows, stage, |r| r.stage, |r| r.area)
    }

    /// Littoral marsh area at a stage.
    pub fn marsh_at(&self, stage: f64) -> f64 {
        interpolate(&self.rows, stage, |r| r.stage, |r| r.marsh)
    }

    /// Largest wetted footprint (open water plus marsh) in the table.
    pub fn footprint(&self) -> f64 {
        self.rows
            .iter()
            .map(|r| r.area + r.marsh)
            .fold(0.0, f64::max)
    }

    /// Storage at a stage, rejecting stages outside the table.
    ///
    /// Used during setup where a value beyond the table means the inputs
    /// do not belong to this lake.
    pub fn checked_storage_at(&self, stage: f64) -> SimResult<f64> {
        let (min, max) = self.stage_range();
        if !(min..=max).contains(&stage) {
            return Err(SimError::domain("stage", stage, min, max));
        }
        Ok(self.storage_at(stage))
    }

    fn first(&self) -> &HypsometryRow {
        &self.rows[0]
    }

    fn last(&self) -> &HypsometryRow {
        &self.rows[self.rows.len() - 1]
    }
}

impl TryFrom<Vec<HypsometryRow>> for StageStorageCurve {
    type Error = SimError;

    fn try_from(rows: Vec<HypsometryRow>) -> SimResult<Self> {
        Self::new(rows)
    }
}

impl From<StageStorageCurve> for Vec<HypsometryRow> {
    fn from(curve: StageStorageCurve) -> Self {
        curve.rows
    }
}

/// Linear interpolation of `y` against a strictly increasing `x` column.
fn interpolate(
    rows: &[HypsometryRow],
    x: f64,
    key: impl Fn(&HypsometryRow) -> f64,
    value: impl Fn(&HypsometryRow) -> f64,
) -> f64 {
    let first = &rows[0];
    let last = &rows[rows.len() - 1];
    if x.is_nan() || x <= key(first) {
        return value(first);
    }
    if x >= key(last) {
        return value(last);
    }
    // First row whose key exceeds x; guaranteed to be in 1..len.
    let upper = rows.partition_point(|r| key(r) <= x);
    let lo = &rows[upper - 1];
    let hi = &rows[upper];
    let t = (x - key(lo)) / (key(hi) - key(lo));
    value(lo) + t * (value(hi) - value(lo))
}
