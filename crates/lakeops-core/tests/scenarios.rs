//! End-to-end runs of synthetic scenarios.

use approx::assert_relative_eq;
use chrono::NaiveDate;

use lakeops_core::config::{OperatingMode, StageSource};
use lakeops_core::dectree::ReleaseLevel;
use lakeops_core::outlets::CFS_TO_ACFT_PER_DAY;
use lakeops_core::scenario::{Scenario, STEADY_STAGE};
use lakeops_core::{simulate, ReferenceTables, SimulationConfig, SimulationInputs};

// -- Steady state --

#[test]
fn zero_forcing_keeps_stage_and_storage_constant() {
    let result = Scenario::steady(10).run().unwrap();
    assert_eq!(result.len(), 10);
    let first = result.days.storage[0];
    for d in 0..result.len() {
        assert_relative_eq!(result.days.storage[d], first);
        assert_relative_eq!(result.days.stage[d], STEADY_STAGE, epsilon = 1e-12);
        assert_eq!(result.days.east_regulatory[d], 0.0);
        assert_eq!(result.days.west_ews[d], 0.0);
    }
}

#[test]
fn day_table_starts_on_start_date() {
    let result = Scenario::steady(10).run().unwrap();
    assert_eq!(result.days.date[0], NaiveDate::from_ymd_opt(2008, 1, 1).unwrap());
    assert_eq!(result.days.date[9], NaiveDate::from_ymd_opt(2008, 1, 10).unwrap());
}

// -- Regulatory releases --

#[test]
fn zone_d_releases_hold_through_the_pulse() {
    let mut s = Scenario::steady(6);
    s.config.beginning_stage = 15.4;
    let result = s.run().unwrap();
    let st = &result.state;

    assert!(st.release_level[2].is_pulse());
    assert_eq!(&st.pulse_day[2..7], &[1, 2, 3, 4, 5]);
    assert!(st.release_level[2..7].iter().all(|&l| l == st.release_level[2]));
    assert!(st.east.regulatory[2] > 0.0);
    assert!(st.west.regulatory[2] > 0.0);
    assert!(st.stage[6] < st.stage[1]);
}

#[test]
fn beneficial_use_zone_releases_nothing() {
    let result = Scenario::steady(10).run().unwrap();
    assert!(result.state.release_level[2..]
        .iter()
        .all(|&l| l == ReleaseLevel::NoRelease));
}

// -- Operating modes --

#[test]
fn parametric_mode_releases_monthly_value() {
    let mut s = Scenario::steady(10);
    s.config.mode = OperatingMode::Parametric;
    s.config.parametric.west_monthly[0] = 500.0;
    s.inputs.lake_tp = Some(vec![0.05; 10]);
    let result = s.run().unwrap();
    let st = &result.state;
    assert_relative_eq!(st.west.regulatory[2], 500.0);
    assert_eq!(st.east.regulatory[2], 0.0);
    assert_relative_eq!(st.storage[2] - st.storage[1], -500.0 * CFS_TO_ACFT_PER_DAY);
}

#[test]
fn observed_stage_is_injected() {
    let mut s = Scenario::steady(10);
    s.config.stage_source = StageSource::Observed;
    for (r, obs) in s.inputs.observed.iter_mut().enumerate() {
        obs.stage = 13.0 + 0.01 * r as f64;
    }
    let result = s.run().unwrap();
    let st = &result.state;
    for r in 2..st.n_rows() {
        assert_relative_eq!(st.stage[r], 13.0 + 0.01 * r as f64);
        assert_relative_eq!(st.storage[r], st.storage[1]);
    }
}

// -- Annual reset --

#[test]
fn non_continuous_run_resets_storage_each_year() {
    let mut s = Scenario::steady(10).with_days(400);
    s.config.continuous = false;
    s.inputs.net_inflow.iter_mut().for_each(|q| *q = 100.0);
    let result = s.run().unwrap();
    let st = &result.state;
    // 2008 is a leap year, so 2009-01-01 sits on row 367.
    assert_eq!(result.days.date[366], NaiveDate::from_ymd_opt(2009, 1, 1).unwrap());
    assert_relative_eq!(st.storage[366] - st.storage[1], 100.0 * 365.0, epsilon = 1e-6);
    assert_relative_eq!(st.storage[367], st.storage[1]);
    assert_relative_eq!(st.storage[368] - st.storage[1], 100.0);
}

#[test]
fn continuous_run_never_resets() {
    let mut s = Scenario::steady(10).with_days(400);
    s.inputs.net_inflow.iter_mut().for_each(|q| *q = 100.0);
    let result = s.run().unwrap();
    assert_relative_eq!(
        result.state.storage[367] - result.state.storage[1],
        100.0 * 366.0,
        epsilon = 1e-6
    );
}

// -- JSON documents --

#[test]
fn runs_from_json_documents() {
    let s = Scenario::steady(10);
    let config = SimulationConfig::from_json_str(
        r#"{"start_date": "2008-01-01", "end_date": "2008-01-10", "beginning_stage": 13.0}"#,
    )
    .unwrap();
    let inputs = SimulationInputs::from_json_str(&serde_json::to_string(&s.inputs).unwrap()).unwrap();
    let tables = ReferenceTables::from_json_str(&serde_json::to_string(&s.tables).unwrap()).unwrap();

    let result = simulate(&config, &inputs, &tables).unwrap();
    assert_eq!(result.days.stage, s.run().unwrap().days.stage);
}

#[test]
fn unknown_option_value_is_rejected() {
    let err = SimulationConfig::from_json_str(
        r#"{"start_date": "2008-01-01", "end_date": "2008-01-10", "beginning_stage": 13.0,
            "protocol": {"salinity": "tomorrow"}}"#,
    );
    assert!(err.is_err());
}
