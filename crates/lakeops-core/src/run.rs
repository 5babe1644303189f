//! Daily mass-balance simulation.
//!
//! - `simulate()`: validate everything, then run the fixed-order daily loop
//!
//! Loop step `i` writes row `i + 2`, reads the previous row `i + 1` and the
//! day-aligned index `i`. Stage, zone, zone fraction and the 7-day stage
//! rise are always taken from the previous row; every flow and the new
//! storage belong to the row being written.

use chrono::Datelike;

use crate::config::{EwsSource, LowChanceLine, SimulationConfig, StageSource};
use crate::dectree::{self, BranchDeltas, DecisionInputs, ReleaseCodeTables};
use crate::error::SimResult;
use crate::inputs::SimulationInputs;
use crate::outlets::supply::{self, AugmentationDay, EtDepths};
use crate::outlets::{self, east, south, west, Outlet, CFS_TO_ACFT_PER_DAY};
use crate::outputs::SimulationResult;
use crate::precompute::Precomputed;
use crate::protocol::{self, ProtocolInputs, SalinityOutlook};
use crate::state::{today, yesterday, SimulationState};
use crate::tables::ReferenceTables;
use crate::traits::{release_policy, OutletDay, ReleasePolicy};
use crate::zones::{self, SupplyTier};

/// Days before the end of the horizon on which the protocol does not run.
const PROTOCOL_TAIL_DAYS: usize = 2;

/// Run a full simulation.
///
/// Fails before the first step when the configuration, inputs or tables
/// are inconsistent, when the beginning stage lies outside the
/// stage-storage table, or when an unimplemented salinity policy is
/// selected. Once the loop starts it cannot fail.
pub fn simulate(
    config: &SimulationConfig,
    inputs: &SimulationInputs,
    tables: &ReferenceTables,
) -> SimResult<SimulationResult> {
    config.validate()?;
    inputs.validate(config)?;
    tables.validate(config)?;

    let start_storage = tables.hypsometry.checked_storage_at(config.beginning_stage)?;
    if config.protocol.enabled {
        SalinityOutlook::for_day(config.protocol.salinity, 0, &inputs.estuary_needs_water)?;
    }
    if config.stage_source == StageSource::Observed {
        let (lo, hi) = tables.hypsometry.stage_range();
        let outside = inputs
            .observed
            .iter()
            .filter(|o| !(lo..=hi).contains(&o.stage))
            .count();
        if outside > 0 {
            tracing::warn!(
                rows = outside,
                min_stage = lo,
                max_stage = hi,
                "observed stages outside the stage-storage table are clamped for areas"
            );
        }
    }

    let pre = Precomputed::new(config, inputs, tables);
    let codes = tables
        .release_codes
        .clone()
        .unwrap_or_else(|| ReleaseCodeTables::for_version(config.decision_tree.table_version));
    let policy = release_policy(config);
    let n_days = config.n_days();

    tracing::info!(
        start = %config.start_date,
        end = %config.end_date,
        days = n_days,
        policy = policy.name(),
        beginning_stage = config.beginning_stage,
        "starting simulation"
    );

    let mut state = SimulationState::initialize(n_days, config.beginning_stage, start_storage);
    let daily = DailyLoop {
        config,
        inputs,
        tables,
        pre: &pre,
        codes: &codes,
        policy: policy.as_ref(),
        start_storage,
        footprint: tables.hypsometry.footprint(),
        n_days,
    };
    for i in 0..n_days - 1 {
        daily.step(i, &mut state);
    }

    let last = state.n_rows() - 1;
    tracing::info!(
        final_stage = state.stage[last],
        final_storage = state.storage[last],
        "simulation finished"
    );
    Ok(SimulationResult::from_state(state, &pre.dates))
}

/// Everything one step reads, borrowed for the length of the run.
struct DailyLoop<'a> {
    config: &'a SimulationConfig,
    inputs: &'a SimulationInputs,
    tables: &'a ReferenceTables,
    pre: &'a Precomputed,
    codes: &'a ReleaseCodeTables,
    policy: &'a dyn ReleasePolicy,
    start_storage: f64,
    footprint: f64,
    n_days: usize,
}

impl DailyLoop<'_> {
    fn step(&self, i: usize, s: &mut SimulationState) {
        let r = today(i);
        let y = yesterday(i);

        // 1. Water supply
        let tier = self.supply(i, s);

        // 2. Zone of the previous row
        let ladder = self.inputs.schedule[y].ladder();
        s.zone[y] = zones::classify(s.stage[y], &ladder);
        s.fraction[y] = zones::zone_fraction(s.stage[y], s.zone[y], &ladder);
        s.stage_rise[y] = if y >= 7 { s.stage[y] - s.stage[y - 7] } else { 0.0 };

        // 3. Release level
        self.release_level(i, s);

        // 4. Outlets
        self.multipliers(i, s);
        self.east_outlet(i, s);
        self.west_schedule(i, s);
        self.protocol(i, tier, s);
        self.west_release(i, s);
        self.south_outlets(r, s);

        // 5. Water balance
        self.balance(i, s);
    }

    fn supply(&self, i: usize, s: &mut SimulationState) -> SupplyTier {
        let (r, y, d) = (today(i), yesterday(i), i);
        let cfg = &self.config.supply;
        let tier = zones::supply_tier(s.stage[y], &self.inputs.schedule[y].shortage_lines());
        let demand = self.pre.losa_demand[r];
        let max = supply::max_supply(tier, self.pre.demand[d], &cfg.cutbacks);
        let delivered = supply::losa_supply(tier, demand, max, cfg.losa_option);

        s.supply_tier[r] = tier;
        s.max_supply[r] = max;
        s.losa_supply[r] = delivered;
        s.net_inflow_after_supply[r] = self.inputs.net_inflow[r] - delivered;
        s.cutback[r] = demand - delivered;
        s.demand_not_supplied[r] = supply::demand_not_supplied(demand, delivered);
        tier
    }

    fn release_level(&self, i: usize, s: &mut SimulationState) {
        let (r, y, d) = (today(i), yesterday(i), i);
        let cfg = &self.config.decision_tree;
        let decision = DecisionInputs {
            tributary_condition: self.inputs.tributary_condition[d],
            seasonal_class: self.inputs.seasonal_class[d],
            multi_seasonal_class: self.inputs.multi_seasonal_class[d],
            stage: s.stage[y],
            lines: &self.inputs.schedule[y],
        };
        s.branches[d] = dectree::branch_codes(&decision, cfg);
        let deltas = BranchDeltas::lookup(&s.branches[d], self.codes);
        s.dec_tree_level[r] = dectree::dec_tree_level(s.zone[y], deltas);

        s.pulse_day[r] = dectree::pulse_day(
            s.pulse_day[y],
            self.pre.first_day[r],
            s.dec_tree_level[r],
            s.release_level[y],
            cfg.pulse_days,
            self.tables.pulses.len(),
        );
        s.release_level[r] = dectree::release_level(
            s.release_level[y],
            s.pulse_day[r],
            s.dec_tree_level[r],
            s.zone[y],
            s.stage_rise[y],
            cfg.max_stage_rise,
        );
    }

    fn multipliers(&self, i: usize, s: &mut SimulationState) {
        let (r, y, d) = (today(i), yesterday(i), i);
        let cfg = &self.config.multipliers;
        let season = self.pre.seasons[d];
        let (level, rise, fraction, pulse_day) =
            (s.release_level[r], s.stage_rise[y], s.fraction[y], s.pulse_day[r]);
        for (series, bstar) in [(&mut s.east, &cfg.bstar_east), (&mut s.west, &cfg.bstar_west)] {
            series.multiplier[r] =
                outlets::release_multiplier(season, rise, level, fraction, cfg, bstar);
            series.applied_multiplier[r] =
                outlets::applied_multiplier(&series.multiplier, r, pulse_day, cfg.mode);
        }
    }

    /// Scheduled release at an outlet for row `r`.
    fn scheduled(&self, outlet: Outlet, r: usize, s: &SimulationState) -> f64 {
        let series = match outlet {
            Outlet::East => &s.east,
            Outlet::West => &s.west,
        };
        // Pulse day 0 reads index -1, the last pulse row.
        let pulse = self.tables.pulses.row(outlet, i64::from(s.pulse_day[r]) - 1);
        outlets::scheduled_release(
            s.release_level[r],
            self.tables.rates.for_outlet(outlet),
            pulse,
            self.pre.pulse_mean(outlet),
            series.applied_multiplier[r],
            self.tables.turn(self.pre.dates[r].year(), outlet),
        )
    }

    fn lake_tp(&self, d: usize) -> Option<f64> {
        self.inputs.lake_tp.as_ref().and_then(|tp| tp.get(d).copied())
    }

    fn east_outlet(&self, i: usize, s: &mut SimulationState) {
        let (r, y, d) = (today(i), yesterday(i), i);
        let cfg = &self.config.east;
        let obs = &self.inputs.observed[r];
        let runoff = self.inputs.east_runoff[r];
        let date = self.pre.dates[r];

        let scheduled = self.scheduled(Outlet::East, r, s);
        let need = outlets::upstream_need(scheduled, runoff, cfg.downstream_target);
        let month_need = outlets::month_to_date(date.day(), s.east.month_need[y], need);
        let downstream_baseflow = outlets::downstream_baseflow(
            s.release_level[r],
            month_need,
            self.pre.east_shortfall[r],
            cfg.baseflow,
        );
        let backflow = east::backflow(
            cfg.backflow,
            obs.east_backflow,
            s.stage[y],
            self.inputs.schedule[y].d1,
            s.east.regulatory[y],
            runoff,
            cfg.backflow_fraction,
            cfg.backflow_threshold,
        );
        let net_runoff = runoff - backflow;
        let upstream_baseflow = outlets::upstream_baseflow(cfg.baseflow, downstream_baseflow, net_runoff);
        let regulatory = self.policy.regulatory_release(&OutletDay {
            outlet: Outlet::East,
            date,
            stage: s.stage[y],
            computed: need + upstream_baseflow,
            observed: obs.east_regulatory,
            observed_test: obs.east_test,
            lake_tp: self.lake_tp(d),
        });

        let e = &mut s.east;
        e.scheduled[r] = scheduled;
        e.need[r] = need;
        e.month_need[r] = month_need;
        e.downstream_baseflow[r] = downstream_baseflow;
        e.backflow[r] = backflow;
        e.net_runoff[r] = net_runoff;
        e.upstream_baseflow[r] = upstream_baseflow;
        e.regulatory[r] = regulatory;
        e.downstream[r] = east::downstream_flow(cfg.downstream, net_runoff, regulatory, obs.east_downstream);
    }

    /// West outlet up to the scheduled baseflow the protocol works on.
    fn west_schedule(&self, i: usize, s: &mut SimulationState) {
        let (r, y) = (today(i), yesterday(i));
        let cfg = &self.config.west;
        let obs = &self.inputs.observed[r];
        let runoff = self.inputs.west_runoff[r];

        let scheduled = self.scheduled(Outlet::West, r, s);
        let need = outlets::upstream_need(scheduled, runoff, cfg.downstream_target);
        let month_need = outlets::month_to_date(self.pre.dates[r].day(), s.west.month_need[y], need);
        let backflow = west::backflow(
            cfg.backflow,
            obs.west_backflow,
            s.stage[y],
            need,
            s.west_baseflow[y],
            s.west_ews[y],
            runoff,
            cfg.backflow_fraction,
            cfg.backflow_threshold,
        );
        let net_runoff = runoff - backflow;
        let downstream_baseflow = outlets::downstream_baseflow(
            s.release_level[r],
            month_need,
            self.pre.west_shortfall[r],
            cfg.baseflow,
        );

        let w = &mut s.west;
        w.scheduled[r] = scheduled;
        w.need[r] = need;
        w.month_need[r] = month_need;
        w.backflow[r] = backflow;
        w.net_runoff[r] = net_runoff;
        w.downstream_baseflow[r] = downstream_baseflow;
        w.upstream_baseflow[r] = outlets::upstream_baseflow(cfg.baseflow, downstream_baseflow, net_runoff);
    }

    fn protocol(&self, i: usize, tier: SupplyTier, s: &mut SimulationState) {
        let cfg = &self.config.protocol;
        if !cfg.enabled || i >= self.n_days - PROTOCOL_TAIL_DAYS {
            return;
        }
        let (r, y, d) = (today(i), yesterday(i), i);
        let date = self.pre.days[d];
        let target_stage = match cfg.low_chance {
            LowChanceLine::Percentile(p) => self.tables.target_stages.stage(cfg.target_date, date, p),
            LowChanceLine::WaterShortage | LowChanceLine::Disabled => None,
        };
        // The policy was checked before the loop started.
        let outlook = SalinityOutlook::for_day(cfg.salinity, d, &self.inputs.estuary_needs_water)
            .unwrap_or(SalinityOutlook::Flag(false));
        let inputs = ProtocolInputs {
            date,
            tributary_condition: self.inputs.tributary_condition[d],
            stage: s.stage[y],
            zone: s.zone[y],
            wsm1: self.inputs.schedule[y].wsm1,
            target_stage,
            scheduled_release: s.west.need[r],
            scheduled_baseflow: s.west.upstream_baseflow[r],
            outlook,
            late_dry_season: self.pre.late_dry_season[d],
            supply_tier: tier,
        };
        s.protocol[d] = protocol::evaluate(&inputs, cfg);
    }

    fn west_release(&self, i: usize, s: &mut SimulationState) {
        let (r, y, d) = (today(i), yesterday(i), i);
        let cfg = &self.config.west;
        let obs = &self.inputs.observed[r];
        let day = &s.protocol[d];

        let baseflow = if self.config.protocol.enabled {
            day.post_baseflow
        } else {
            s.west.upstream_baseflow[r]
        };
        let ews = match cfg.ews {
            EwsSource::Observed => obs.west_ews,
            EwsSource::Protocol => day.post_ews,
        };
        let regulatory = self.policy.regulatory_release(&OutletDay {
            outlet: Outlet::West,
            date: self.pre.dates[r],
            stage: s.stage[y],
            computed: s.west.need[r] + baseflow,
            observed: obs.west_regulatory,
            observed_test: 0.0,
            lake_tp: self.lake_tp(d),
        });

        s.west_baseflow[r] = baseflow;
        s.west_ews[r] = ews;
        s.west.regulatory[r] = regulatory;
        s.west.downstream[r] =
            west::downstream_flow(cfg.downstream, regulatory, ews, s.west.net_runoff[r], obs.west_downstream);
        s.total_east_west[r] = (s.east.regulatory[r] + regulatory) * CFS_TO_ACFT_PER_DAY;
    }

    fn south_outlets(&self, r: usize, s: &mut SimulationState) {
        let obs = &self.inputs.observed[r];
        let cfg = &self.config.south;
        s.south_wca[r] = south::release(&cfg.wca, obs.wca);
        s.south_l8c51[r] = south::release(&cfg.l8c51, obs.l8c51);
        s.total_south[r] = (s.south_wca[r] + s.south_l8c51[r]) * CFS_TO_ACFT_PER_DAY;
    }

    fn balance(&self, i: usize, s: &mut SimulationState) {
        let (r, y, d) = (today(i), yesterday(i), i);
        let hyps = &self.tables.hypsometry;
        let obs = &self.inputs.observed[r];
        let stage = s.stage[y];

        let area = hyps.area_at(stage);
        let marsh = hyps.marsh_at(stage);
        let depths = EtDepths {
            open: obs.et_open,
            littoral: obs.et_littoral,
            dry: obs.et_dry,
        };
        let et = supply::evapotranspiration(
            self.config.evapotranspiration,
            self.inputs.et_volume[r],
            depths,
            area,
            marsh,
            self.footprint,
        );

        let wsa = &self.config.wsa;
        let (upper_trigger, lower_trigger) =
            supply::augmentation_triggers(self.inputs.schedule[r].wsm1, wsa);
        let day = AugmentationDay {
            stage,
            upper_trigger,
            lower_trigger,
            wca_stages_low: self.inputs.wca_stages_low[d],
            seasonal_class: self.inputs.seasonal_class[d],
        };
        let aug = &self.inputs.augmentation[d];
        let mia = supply::augmentation(&day, aug.mia_runoff, aug.mia_pump, wsa.mia_cap1, wsa.mia_cap2, wsa);
        let nnr = supply::augmentation(&day, aug.nnr_runoff, aug.nnr_pump, wsa.nnr_cap1, wsa.nnr_cap2, wsa);

        let rainfall = self.inputs.rainfall[r];
        let pumped_in = s.east.backflow[r] + s.west.backflow[r] + mia + nnr - s.west_ews[r];
        let delta = s.net_inflow_after_supply[r] + rainfall - et
            + pumped_in * CFS_TO_ACFT_PER_DAY
            - s.total_east_west[r]
            - s.total_south[r]
            + self.inputs.storage_deviation[r];

        s.area[r] = area;
        s.marsh[r] = marsh;
        s.rainfall[r] = rainfall;
        s.evapotranspiration[r] = et;
        s.wsa_mia[r] = mia;
        s.wsa_nnr[r] = nnr;
        s.delta_storage[r] = delta;
        s.storage[r] = if self.pre.first_day[r] {
            self.start_storage
        } else {
            s.storage[y] + delta
        };
        s.stage[r] = match self.config.stage_source {
            StageSource::Computed => hyps.stage_at(s.storage[r]),
            StageSource::Observed => obs.stage,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackflowSource, ProtocolConfig, SalinityPolicy, WsaOption};
    use crate::error::SimError;
    use crate::scenario::Scenario;
    use crate::tables::WeeklyDemand;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn starting_on(y: i32, m: u32, d: u32, n_days: usize) -> Scenario {
        let mut s = Scenario::steady(n_days);
        s.config.start_date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        s.with_days(n_days)
    }

    /// Rows 2 onward put the steady stage of 13 ft inside supply tier 3.
    fn raise_shortage_lines_after_row_1(s: &mut Scenario) {
        for lines in &mut s.inputs.schedule[2..] {
            lines.wsm1 = 14.0;
            lines.wsm2 = 13.5;
            lines.wsm3 = 13.0;
            lines.wsm4 = 12.5;
        }
    }

    // -- Setup failures --

    #[test]
    fn beginning_stage_outside_table_fails() {
        let mut s = Scenario::steady(10);
        s.config.beginning_stage = 25.0;
        assert!(matches!(s.run(), Err(SimError::NumericDomain { .. })));
    }

    #[test]
    fn unimplemented_salinity_policy_fails_before_loop() {
        let mut s = Scenario::steady(10);
        s.config.protocol = ProtocolConfig {
            salinity: SalinityPolicy::FortMyersNoBaseflow,
            ..ProtocolConfig::default()
        };
        assert!(matches!(s.run(), Err(SimError::UnimplementedPolicy { .. })));
    }

    #[test]
    fn misaligned_inputs_fail() {
        let mut s = Scenario::steady(10);
        s.inputs.tributary_condition.push(3.0);
        assert!(matches!(s.run(), Err(SimError::DataAlignment { .. })));
    }

    // -- Steps --

    #[test]
    fn zone_is_recorded_on_previous_row() {
        let result = Scenario::steady(10).run().unwrap();
        let st = &result.state;
        assert!(st.zone[1..10].iter().all(|&z| z == zones::ZoneCode::BeneficialUse));
    }

    #[test]
    fn inflow_raises_storage_by_its_volume() {
        let mut s = Scenario::steady(5);
        s.inputs.net_inflow = vec![1000.0; 6];
        let result = s.run().unwrap();
        let st = &result.state;
        assert_relative_eq!(st.storage[2] - st.storage[1], 1000.0);
        assert_relative_eq!(st.storage[5] - st.storage[1], 4000.0);
        assert_relative_eq!(st.stage[5], 13.0 + 4000.0 / 400_000.0, epsilon = 1e-12);
    }

    #[test]
    fn rule_backflow_enters_the_balance() {
        let mut s = Scenario::steady(5);
        s.config.beginning_stage = 11.0;
        s.inputs.observed.iter_mut().for_each(|o| o.stage = 11.0);
        s.config.east.backflow = BackflowSource::Rule;
        s.inputs.east_runoff = vec![100.0; 6];
        let result = s.run().unwrap();
        let st = &result.state;
        assert_relative_eq!(st.east.backflow[2], 100.0);
        assert_relative_eq!(st.delta_storage[2], 100.0 * CFS_TO_ACFT_PER_DAY);
    }

    #[test]
    fn protocol_skips_last_two_days() {
        let mut s = Scenario::steady(10);
        s.config.start_date = chrono::NaiveDate::from_ymd_opt(2008, 4, 1).unwrap();
        s.config.end_date = chrono::NaiveDate::from_ymd_opt(2008, 4, 10).unwrap();
        s.inputs.estuary_needs_water = vec![true; 10];
        let result = s.run().unwrap();
        let ews = &result.state.west_ews;
        assert_relative_eq!(ews[2], 650.0);
        assert_relative_eq!(ews[9], 650.0);
        assert_eq!(ews[10], 0.0);
        assert!(result.protocol[7].tributary_normal_or_above);
        assert!(!result.protocol[8].tributary_normal_or_above);
    }

    // -- Lags --

    #[test]
    fn late_dry_season_follows_the_day_not_the_row() {
        let mut s = starting_on(2008, 3, 31, 10);
        s.inputs.estuary_needs_water = vec![true; 10];
        let result = s.run().unwrap();
        let ews = &result.state.west_ews;
        // Day 0 is March 31.
        assert!(!result.protocol[0].late_dry_low_chance);
        assert_eq!(result.protocol[0].post_ews, 0.0);
        assert_eq!(ews[2], 0.0);
        assert!(result.protocol[1].late_dry_low_chance);
        assert_relative_eq!(ews[3], 650.0);
    }

    #[test]
    fn season_follows_the_day_not_the_row() {
        let mut s = starting_on(2008, 10, 31, 10);
        s.config.beginning_stage = 15.4;
        let result = s.run().unwrap();
        let st = &result.state;
        // October 31 is in the wet season, November 1 in the dry season.
        assert!(st.release_level[2].is_pulse());
        assert_eq!(st.east.multiplier[2], 1.0);
        assert_eq!(st.west.multiplier[2], 1.0);
        assert!(st.release_level[3].is_pulse());
        assert!(st.fraction[2] < 1.0);
        assert_relative_eq!(st.east.multiplier[3], st.fraction[2]);
        assert_relative_eq!(st.west.multiplier[3], st.fraction[2]);
    }

    #[test]
    fn demand_week_follows_the_day_not_the_row() {
        let mut s = Scenario::steady(10);
        s.tables.weekly_demand = WeeklyDemand((1..=52).map(|w| vec![7.0 * f64::from(w)]).collect());
        let result = s.run().unwrap();
        let st = &result.state;
        // Rows 8 and 9 take days 6 and 7, the last day of week 1 and the first of week 2.
        assert_relative_eq!(st.max_supply[8], 1.0);
        assert_relative_eq!(st.max_supply[9], 2.0);
    }

    #[test]
    fn supply_tier_reads_previous_row_lines() {
        let mut s = Scenario::steady(10);
        raise_shortage_lines_after_row_1(&mut s);
        let result = s.run().unwrap();
        let st = &result.state;
        assert_eq!(st.supply_tier[2].get(), 0);
        assert_eq!(st.supply_tier[3].get(), 3);
    }

    #[test]
    fn augmentation_triggers_read_current_row_wsm1() {
        let mut s = Scenario::steady(10);
        raise_shortage_lines_after_row_1(&mut s);
        s.config.wsa.option = WsaOption::Trigger;
        s.inputs.wca_stages_low = vec![true; 10];
        s.inputs.augmentation.iter_mut().for_each(|a| a.mia_runoff = 100.0);
        let result = s.run().unwrap();
        // Stage 13 sits below row 2's lower trigger (WSM1 = 14) but above row 1's upper one.
        assert_relative_eq!(result.state.wsa_mia[2], 100.0);
    }
}
