//! East outlet: lake releases through the east structure and the
//! downstream estuary structure.

use crate::config::{BackflowSource, FlowSource};

/// Back-pumped inflow from the east basin into the lake [cfs].
///
/// The rule back-pumps a fraction of basin runoff while the lake sits below
/// both the threshold and the D1 line and nothing was released the day
/// before.
#[allow(clippy::too_many_arguments)]
pub fn backflow(
    source: BackflowSource,
    observed: f64,
    stage: f64,
    d1_line: f64,
    previous_release: f64,
    runoff: f64,
    fraction: f64,
    threshold: f64,
) -> f64 {
    match source {
        BackflowSource::Observed => observed,
        BackflowSource::Rule => {
            if stage < threshold && stage < d1_line && previous_release <= 0.0 {
                (runoff * fraction).max(0.0)
            } else {
                0.0
            }
        }
    }
}

/// Flow at the downstream estuary structure [cfs].
pub fn downstream_flow(source: FlowSource, net_runoff: f64, release: f64, observed: f64) -> f64 {
    match source {
        FlowSource::Computed => net_runoff + release,
        FlowSource::Observed => observed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_backflow_when_low_and_idle() {
        let q = backflow(BackflowSource::Rule, 99.0, 10.5, 13.0, 0.0, 400.0, 0.5, 11.1);
        assert_eq!(q, 200.0);
    }

    #[test]
    fn no_rule_backflow_after_release_or_when_high() {
        assert_eq!(backflow(BackflowSource::Rule, 0.0, 10.5, 13.0, 50.0, 400.0, 0.5, 11.1), 0.0);
        assert_eq!(backflow(BackflowSource::Rule, 0.0, 11.5, 13.0, 0.0, 400.0, 0.5, 11.1), 0.0);
        assert_eq!(backflow(BackflowSource::Rule, 0.0, 10.5, 13.0, 0.0, -40.0, 0.5, 11.1), 0.0);
    }

    #[test]
    fn observed_backflow_and_downstream() {
        assert_eq!(backflow(BackflowSource::Observed, 42.0, 20.0, 13.0, 1.0, 0.0, 1.0, 0.0), 42.0);
        assert_eq!(downstream_flow(FlowSource::Computed, 100.0, 250.0, 7.0), 350.0);
        assert_eq!(downstream_flow(FlowSource::Observed, 100.0, 250.0, 7.0), 7.0);
    }
}
