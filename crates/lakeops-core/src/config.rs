//! Run configuration.
//!
//! A `SimulationConfig` is immutable once validated and is passed by
//! reference to every component. Every policy switch is a typed enum; numeric
//! options carry defaults through `#[serde(default = "...")]` functions so a
//! JSON document only needs to name what differs from the standard run.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// First simulated day.
    pub start_date: NaiveDate,
    /// Last simulated day (inclusive).
    pub end_date: NaiveDate,
    /// Lake stage on the day before `start_date` [ft NGVD].
    pub beginning_stage: f64,
    /// When `false`, storage resets to the starting storage on every
    /// anniversary of `start_date`.
    #[serde(default = "default_true")]
    pub continuous: bool,
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default)]
    pub stage_source: StageSource,
    #[serde(default)]
    pub supply: SupplyConfig,
    #[serde(default)]
    pub decision_tree: DecisionTreeConfig,
    #[serde(default)]
    pub multipliers: MultiplierConfig,
    #[serde(default)]
    pub east: EastOutletConfig,
    #[serde(default)]
    pub west: WestOutletConfig,
    #[serde(default)]
    pub south: SouthConfig,
    #[serde(default)]
    pub evapotranspiration: EtSource,
    #[serde(default)]
    pub wsa: WsaConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub parametric: ParametricConfig,
}

/// How the two primary outlets decide their regulatory releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Run the regulation schedule (or replay observed releases where selected).
    #[default]
    ObservedReplay,
    /// Replace the schedule with stage and phosphorus driven monthly decisions.
    Parametric,
}

/// Where the end-of-day lake stage comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSource {
    /// Derived from simulated storage through the stage-storage curve.
    #[default]
    Computed,
    /// Injected from the observed end-of-day stage series.
    Observed,
}

// -- Water supply --

/// Lake-side water supply (LOSA) delivery rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosaSupplyOption {
    /// Deliver the full demand regardless of the supply tier.
    Unrestricted,
    /// Limit delivery to the tier's maximum supply once a cutback applies.
    #[default]
    Cutback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyConfig {
    /// Column of the weekly demand table to use.
    #[serde(default)]
    pub demand_scenario: usize,
    /// Scale applied to the weekly demand table [%].
    #[serde(default = "default_percent")]
    pub demand_multiplier: f64,
    /// Scale applied to the daily LOSA demand series [%].
    #[serde(default = "default_percent")]
    pub losa_multiplier: f64,
    #[serde(default)]
    pub losa_option: LosaSupplyOption,
    /// Fraction of demand cut back in supply tiers 1 to 4.
    #[serde(default = "default_cutbacks")]
    pub cutbacks: [f64; 4],
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            demand_scenario: 0,
            demand_multiplier: default_percent(),
            losa_multiplier: default_percent(),
            losa_option: LosaSupplyOption::default(),
            cutbacks: default_cutbacks(),
        }
    }
}

fn default_cutbacks() -> [f64; 4] {
    [0.15, 0.30, 0.45, 0.60]
}

// -- Decision tree --

/// Which release-code table resolves decision-tree branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableVersion {
    #[default]
    Legacy,
    Revised,
}

/// How the meteorological forecast digit of the Zone C branch is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetForecastIndicator {
    /// Digit is always 0.
    Ignored,
    /// Digit repeats the Zone C seasonal code.
    #[default]
    SeasonalCode,
    /// Digit is 1 when the seasonal outlook is very wet, else 0.
    WetOutlook,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeConfig {
    /// Use the revised indicator definitions.
    #[serde(default)]
    pub revised_indicators: bool,
    #[serde(default)]
    pub table_version: TableVersion,
    #[serde(default)]
    pub zone_c_met_forecast: MetForecastIndicator,
    /// Track pulse days for D-level releases.
    #[serde(default = "default_true")]
    pub pulse_days: bool,
    /// 7-day stage rise [ft] above which releases jump to the zone maximum.
    #[serde(default = "default_max_stage_rise")]
    pub max_stage_rise: f64,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self {
            revised_indicators: false,
            table_version: TableVersion::default(),
            zone_c_met_forecast: MetForecastIndicator::default(),
            pulse_days: true,
            max_stage_rise: default_max_stage_rise(),
        }
    }
}

fn default_max_stage_rise() -> f64 {
    0.5
}

// -- Release multipliers --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierMode {
    /// Multipliers are fixed at 1.
    Off,
    /// Multiplier recomputed every day.
    #[default]
    Daily,
    /// Multiplier held at its value from the day the current pulse started.
    PulseHeld,
}

/// One coefficient per release level that supports a multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelCoefficients {
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub c: f64,
    pub b: f64,
}

impl LevelCoefficients {
    pub const fn uniform(value: f64) -> Self {
        Self {
            d1: value,
            d2: value,
            d3: value,
            c: value,
            b: value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplierConfig {
    #[serde(default)]
    pub mode: MultiplierMode,
    /// 7-day stage change [ft] at or below which the multiplier applies.
    #[serde(default = "default_dstar")]
    pub dstar: LevelCoefficients,
    /// Slope on the zone height fraction.
    #[serde(default = "default_astar")]
    pub astar: LevelCoefficients,
    /// Intercept for the east outlet.
    #[serde(default = "default_bstar")]
    pub bstar_east: LevelCoefficients,
    /// Intercept for the west outlet.
    #[serde(default = "default_bstar")]
    pub bstar_west: LevelCoefficients,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            mode: MultiplierMode::default(),
            dstar: default_dstar(),
            astar: default_astar(),
            bstar_east: default_bstar(),
            bstar_west: default_bstar(),
        }
    }
}

fn default_dstar() -> LevelCoefficients {
    LevelCoefficients::uniform(0.05)
}

fn default_astar() -> LevelCoefficients {
    LevelCoefficients::uniform(1.0)
}

fn default_bstar() -> LevelCoefficients {
    LevelCoefficients::uniform(0.0)
}

// -- Primary outlets --

/// Source of the regulatory release actually applied at an outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulatorySource {
    /// Scheduled release plus upstream baseflow.
    #[default]
    Computed,
    /// Observed regulatory release.
    Observed,
    /// Observed test-release series (east outlet only).
    ObservedTest,
    /// The outlet's `constant_release`.
    Constant,
}

/// Source of a downstream structure flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSource {
    #[default]
    Computed,
    Observed,
}

/// Upstream baseflow rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseflowOption {
    Off,
    /// Release the full monthly shortfall.
    #[default]
    MonthlyShortfall,
    /// Release the monthly shortfall less the day's basin runoff.
    DailyShortfall,
}

/// Backflow (back-pumping into the lake) rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackflowSource {
    #[default]
    Observed,
    /// Back-pump a fraction of basin runoff while the lake is low.
    Rule,
}

/// East outlet (St. Lucie side) options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EastOutletConfig {
    #[serde(default)]
    pub regulatory: RegulatorySource,
    #[serde(default)]
    pub constant_release: f64,
    #[serde(default)]
    pub downstream: FlowSource,
    /// Subtract basin runoff from the scheduled release.
    #[serde(default = "default_true")]
    pub downstream_target: bool,
    #[serde(default)]
    pub baseflow: BaseflowOption,
    /// Target monthly baseflow at the downstream structure [cfs].
    #[serde(default = "default_east_baseflow")]
    pub baseflow_target: f64,
    #[serde(default)]
    pub backflow: BackflowSource,
    #[serde(default = "default_one")]
    pub backflow_fraction: f64,
    /// Stage [ft] below which rule-based backflow may occur.
    #[serde(default = "default_backflow_threshold")]
    pub backflow_threshold: f64,
}

impl Default for EastOutletConfig {
    fn default() -> Self {
        Self {
            regulatory: RegulatorySource::default(),
            constant_release: 0.0,
            downstream: FlowSource::default(),
            downstream_target: true,
            baseflow: BaseflowOption::default(),
            baseflow_target: default_east_baseflow(),
            backflow: BackflowSource::default(),
            backflow_fraction: default_one(),
            backflow_threshold: default_backflow_threshold(),
        }
    }
}

fn default_east_baseflow() -> f64 {
    0.0
}

/// Environmental water supply source for the west outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EwsSource {
    Observed,
    /// Protocol output, or zero when the protocol is disabled.
    #[default]
    Protocol,
}

/// West outlet (Caloosahatchee side) options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WestOutletConfig {
    #[serde(default)]
    pub regulatory: RegulatorySource,
    #[serde(default)]
    pub constant_release: f64,
    #[serde(default)]
    pub downstream: FlowSource,
    #[serde(default)]
    pub downstream_target: bool,
    #[serde(default)]
    pub baseflow: BaseflowOption,
    #[serde(default = "default_west_baseflow")]
    pub baseflow_target: f64,
    #[serde(default)]
    pub backflow: BackflowSource,
    #[serde(default = "default_one")]
    pub backflow_fraction: f64,
    #[serde(default = "default_backflow_threshold")]
    pub backflow_threshold: f64,
    #[serde(default)]
    pub ews: EwsSource,
}

impl Default for WestOutletConfig {
    fn default() -> Self {
        Self {
            regulatory: RegulatorySource::default(),
            constant_release: 0.0,
            downstream: FlowSource::default(),
            downstream_target: false,
            baseflow: BaseflowOption::default(),
            baseflow_target: default_west_baseflow(),
            backflow: BackflowSource::default(),
            backflow_fraction: default_one(),
            backflow_threshold: default_backflow_threshold(),
            ews: EwsSource::default(),
        }
    }
}

fn default_west_baseflow() -> f64 {
    450.0
}

fn default_backflow_threshold() -> f64 {
    11.1
}

// -- South outlets --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SouthSource {
    #[default]
    Observed,
    Constant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SouthOutletConfig {
    #[serde(default)]
    pub source: SouthSource,
    #[serde(default)]
    pub constant: f64,
    #[serde(default = "default_one")]
    pub multiplier: f64,
    /// Upper bound on the daily release [cfs].
    #[serde(default = "default_south_capacity")]
    pub capacity: f64,
}

impl Default for SouthOutletConfig {
    fn default() -> Self {
        Self {
            source: SouthSource::default(),
            constant: 0.0,
            multiplier: default_one(),
            capacity: default_south_capacity(),
        }
    }
}

fn default_south_capacity() -> f64 {
    f64::MAX
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SouthConfig {
    /// Regulatory releases to the conservation areas.
    #[serde(default)]
    pub wca: SouthOutletConfig,
    /// Regulatory releases through the L-8 / C-51 route.
    #[serde(default)]
    pub l8c51: SouthOutletConfig,
}

// -- Evapotranspiration --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtSource {
    /// Use the supplied ET volume series.
    #[default]
    Volume,
    /// Compute ET from daily depths over the converter's surface areas.
    Depths,
}

// -- Water supply augmentation --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WsaOption {
    #[default]
    Off,
    /// Trigger stages are WSM1 plus the `trigger` offsets.
    Trigger,
    /// Trigger stages are WSM1 plus the `offset` values.
    Offset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsaConfig {
    #[serde(default)]
    pub option: WsaOption,
    #[serde(default = "default_wsa_trigger1")]
    pub trigger1: f64,
    #[serde(default = "default_wsa_trigger2")]
    pub trigger2: f64,
    #[serde(default)]
    pub offset1: f64,
    #[serde(default = "default_wsa_offset2")]
    pub offset2: f64,
    /// Augmentation only runs when the seasonal class is at most this value.
    #[serde(default = "default_wsa_class")]
    pub max_seasonal_class: u8,
    #[serde(default = "default_wsa_cap")]
    pub mia_cap1: f64,
    #[serde(default = "default_wsa_cap")]
    pub mia_cap2: f64,
    #[serde(default = "default_wsa_cap")]
    pub nnr_cap1: f64,
    #[serde(default = "default_wsa_cap")]
    pub nnr_cap2: f64,
}

impl Default for WsaConfig {
    fn default() -> Self {
        Self {
            option: WsaOption::default(),
            trigger1: default_wsa_trigger1(),
            trigger2: default_wsa_trigger2(),
            offset1: 0.0,
            offset2: default_wsa_offset2(),
            max_seasonal_class: default_wsa_class(),
            mia_cap1: default_wsa_cap(),
            mia_cap2: default_wsa_cap(),
            nnr_cap1: default_wsa_cap(),
            nnr_cap2: default_wsa_cap(),
        }
    }
}

fn default_wsa_trigger1() -> f64 {
    0.0
}

fn default_wsa_trigger2() -> f64 {
    0.5
}

fn default_wsa_offset2() -> f64 {
    1.0
}

fn default_wsa_class() -> u8 {
    3
}

fn default_wsa_cap() -> f64 {
    860.0
}

// -- Adaptive protocol --

/// Stage line the low-chance test compares against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowChanceLine {
    /// WSM1 in June to September, WSM1 + 0.5 ft otherwise.
    WaterShortage,
    /// A target-stage percentile curve (10, 20, 25, 30, 40, 45, 50 or 60).
    Percentile(u8),
    /// The test always passes.
    Disabled,
}

impl Default for LowChanceLine {
    fn default() -> Self {
        LowChanceLine::Percentile(50)
    }
}

/// Date the target-stage curves aim for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDate {
    #[default]
    MayFirst,
    JuneFirst,
}

/// Salinity forecast used to decide whether the estuary needs lake water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalinityPolicy {
    /// Forecast at the I-75 station without baseflow or EWS.
    ValI75NoBaseflow,
    /// Forecast at Fort Myers without baseflow or EWS.
    FortMyersNoBaseflow,
    /// Externally supplied "estuary needs water" flags.
    #[default]
    EstuaryFlag,
}

/// Gate deciding when the pre-protocol baseflow passes unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseflowGate {
    /// All protocol conditions hold and the stage is above the baseflow band.
    #[default]
    AllConditions,
    /// Baseflow is positive and the stage lies in Zone D.
    StageSubband,
}

/// Environmental water supply while the lake is in a water shortage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortageEws {
    /// No releases unless the stage is above the water shortage band.
    #[default]
    None,
    /// Cut back the calibrated estuary release.
    Calibrated,
    /// Cut back a fixed 300 cfs release.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tributary condition class above which conditions count as normal or wetter.
    #[serde(default = "default_thc_threshold")]
    pub thc_threshold: f64,
    #[serde(default)]
    pub low_chance: LowChanceLine,
    #[serde(default)]
    pub target_date: TargetDate,
    /// Restrict the low-chance test to the late dry season.
    #[serde(default = "default_true")]
    pub late_dry_season_only: bool,
    #[serde(default)]
    pub salinity: SalinityPolicy,
    /// 30-day average salinity threshold [psu].
    #[serde(default = "default_salinity_threshold")]
    pub salinity_threshold: f64,
    #[serde(default)]
    pub baseflow_gate: BaseflowGate,
    /// Upper bound on baseflow while the stage sits in the baseflow band [cfs].
    #[serde(default = "default_west_baseflow")]
    pub baseflow_cap: f64,
    #[serde(default)]
    pub shortage_ews: ShortageEws,
    /// Calibrated estuary environmental release [cfs].
    #[serde(default = "default_calibrated_ews")]
    pub calibrated_ews: f64,
    /// EWS cutback in supply tiers 1 to 4 [%].
    #[serde(default = "default_ews_cutbacks")]
    pub ews_cutbacks: [f64; 4],
    /// Let the late dry season stand in for normal tributary conditions.
    #[serde(default)]
    pub thc_bypass_late_dry_season: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thc_threshold: default_thc_threshold(),
            low_chance: LowChanceLine::default(),
            target_date: TargetDate::default(),
            late_dry_season_only: true,
            salinity: SalinityPolicy::default(),
            salinity_threshold: default_salinity_threshold(),
            baseflow_gate: BaseflowGate::default(),
            baseflow_cap: default_west_baseflow(),
            shortage_ews: ShortageEws::default(),
            calibrated_ews: default_calibrated_ews(),
            ews_cutbacks: default_ews_cutbacks(),
            thc_bypass_late_dry_season: false,
        }
    }
}

fn default_thc_threshold() -> f64 {
    2.0
}

fn default_salinity_threshold() -> f64 {
    5.0
}

fn default_calibrated_ews() -> f64 {
    650.0
}

fn default_ews_cutbacks() -> [f64; 4] {
    [15.0, 30.0, 45.0, 60.0]
}

// -- Parametric mode --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParametricConfig {
    /// Lake TP threshold for the dry months [mg/L].
    #[serde(default = "default_p1")]
    pub p1: f64,
    /// Lake TP threshold for the wet months [mg/L].
    #[serde(default = "default_p2")]
    pub p2: f64,
    /// Monthly decision values for the west outlet [cfs].
    #[serde(default = "default_monthly")]
    pub west_monthly: [f64; 12],
    /// Monthly decision values for the east outlet [cfs].
    #[serde(default = "default_monthly")]
    pub east_monthly: [f64; 12],
    #[serde(default = "default_parametric_max_stage")]
    pub max_stage: f64,
    #[serde(default = "default_parametric_min_stage")]
    pub min_stage: f64,
    #[serde(default = "default_west_max")]
    pub west_max: f64,
    #[serde(default = "default_east_max")]
    pub east_max: f64,
}

impl Default for ParametricConfig {
    fn default() -> Self {
        Self {
            p1: default_p1(),
            p2: default_p2(),
            west_monthly: default_monthly(),
            east_monthly: default_monthly(),
            max_stage: default_parametric_max_stage(),
            min_stage: default_parametric_min_stage(),
            west_max: default_west_max(),
            east_max: default_east_max(),
        }
    }
}

fn default_p1() -> f64 {
    0.1
}

fn default_p2() -> f64 {
    0.1
}

fn default_monthly() -> [f64; 12] {
    [0.0; 12]
}

fn default_parametric_max_stage() -> f64 {
    18.0
}

fn default_parametric_min_stage() -> f64 {
    8.0
}

fn default_west_max() -> f64 {
    7800.0
}

fn default_east_max() -> f64 {
    7200.0
}

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

fn default_percent() -> f64 {
    100.0
}

// -- Loading and validation --

impl SimulationConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of simulated days, `end_date` inclusive.
    pub fn n_days(&self) -> usize {
        let days = (self.end_date - self.start_date).num_days() + 1;
        usize::try_from(days).unwrap_or(0)
    }

    /// Number of rows in row-aligned series: the simulated days plus the
    /// day before `start_date`.
    pub fn n_rows(&self) -> usize {
        self.n_days() + 1
    }

    /// Years spanned by the horizon, first year first.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start_date.year()..=self.end_date.year()
    }

    /// Check every option for internal consistency.
    ///
    /// Fails with `UnimplementedPolicy` when a salinity forecast without a
    /// defined computation is selected.
    pub fn validate(&self) -> SimResult<()> {
        if self.end_date < self.start_date {
            return Err(SimError::config(
                "end_date",
                format!("{} is before start_date {}", self.end_date, self.start_date),
            ));
        }
        if self.n_days() < 3 {
            return Err(SimError::config(
                "end_date",
                "the horizon must cover at least 3 days",
            ));
        }
        if !self.beginning_stage.is_finite() {
            return Err(SimError::config("beginning_stage", "must be finite"));
        }

        check_percent("supply.demand_multiplier", self.supply.demand_multiplier)?;
        check_percent("supply.losa_multiplier", self.supply.losa_multiplier)?;
        for (k, &c) in self.supply.cutbacks.iter().enumerate() {
            check_fraction(&format!("supply.cutbacks[{k}]"), c)?;
        }
        if self.decision_tree.max_stage_rise.is_nan() {
            return Err(SimError::config("decision_tree.max_stage_rise", "must be a number"));
        }

        check_non_negative("east.backflow_fraction", self.east.backflow_fraction)?;
        check_non_negative("west.backflow_fraction", self.west.backflow_fraction)?;
        check_non_negative("east.baseflow_target", self.east.baseflow_target)?;
        check_non_negative("west.baseflow_target", self.west.baseflow_target)?;
        if self.west.regulatory == RegulatorySource::ObservedTest {
            return Err(SimError::config(
                "west.regulatory",
                "the test-release series only exists for the east outlet",
            ));
        }
        check_non_negative("south.wca.capacity", self.south.wca.capacity)?;
        check_non_negative("south.l8c51.capacity", self.south.l8c51.capacity)?;

        if self.protocol.enabled {
            match self.protocol.salinity {
                SalinityPolicy::ValI75NoBaseflow => {
                    return Err(SimError::UnimplementedPolicy {
                        policy: "salinity forecast at I-75 without baseflow".to_string(),
                    })
                }
                SalinityPolicy::FortMyersNoBaseflow => {
                    return Err(SimError::UnimplementedPolicy {
                        policy: "salinity forecast at Fort Myers without baseflow".to_string(),
                    })
                }
                SalinityPolicy::EstuaryFlag => {}
            }
            if let LowChanceLine::Percentile(p) = self.protocol.low_chance {
                if !crate::tables::TARGET_PERCENTILES.contains(&p) {
                    return Err(SimError::config(
                        "protocol.low_chance",
                        format!(
                            "percentile {p} is not one of {:?}",
                            crate::tables::TARGET_PERCENTILES
                        ),
                    ));
                }
            }
            for (k, &c) in self.protocol.ews_cutbacks.iter().enumerate() {
                check_percent(&format!("protocol.ews_cutbacks[{k}]"), c)?;
                if c > 100.0 {
                    return Err(SimError::domain(
                        format!("protocol.ews_cutbacks[{k}]"),
                        c,
                        0.0,
                        100.0,
                    ));
                }
            }
        }

        if self.parametric.min_stage >= self.parametric.max_stage {
            return Err(SimError::config(
                "parametric.min_stage",
                "must be below parametric.max_stage",
            ));
        }
        Ok(())
    }
}

fn check_fraction(key: &str, value: f64) -> SimResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::domain(key, value, 0.0, 1.0));
    }
    Ok(())
}

fn check_percent(key: &str, value: f64) -> SimResult<()> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(SimError::domain(key, value, 0.0, f64::INFINITY));
    }
    Ok(())
}

fn check_non_negative(key: &str, value: f64) -> SimResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(SimError::domain(key, value, 0.0, f64::INFINITY));
    }
    Ok(())
}
