//! West outlet: lake releases through the west structure, including the
//! environmental water supply decided by the adaptive protocol.

use crate::config::{BackflowSource, FlowSource};

/// Back-pumped inflow from the west basin into the lake [cfs].
///
/// The rule back-pumps a fraction of basin runoff while the lake is below
/// the threshold and the outlet released nothing today (scheduled) or
/// yesterday (baseflow and environmental supply).
#[allow(clippy::too_many_arguments)]
pub fn backflow(
    source: BackflowSource,
    observed: f64,
    stage: f64,
    scheduled_today: f64,
    previous_baseflow: f64,
    previous_ews: f64,
    runoff: f64,
    fraction: f64,
    threshold: f64,
) -> f64 {
    match source {
        BackflowSource::Observed => observed,
        BackflowSource::Rule => {
            let idle = scheduled_today <= 0.0 && previous_baseflow <= 0.0 && previous_ews <= 0.0;
            if stage < threshold && idle {
                (runoff * fraction).max(0.0)
            } else {
                0.0
            }
        }
    }
}

/// Flow at the downstream estuary structure [cfs].
pub fn downstream_flow(
    source: FlowSource,
    release: f64,
    ews: f64,
    net_runoff: f64,
    observed: f64,
) -> f64 {
    match source {
        FlowSource::Computed => release + ews + net_runoff,
        FlowSource::Observed => observed,
    }
}
