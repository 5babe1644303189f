//! South outlets towards the conservation areas.

use crate::config::{SouthOutletConfig, SouthSource};

/// Regulatory release to the south [cfs]: the chosen flow scaled by the
/// multiplier and capped at the outlet capacity.
pub fn release(config: &SouthOutletConfig, observed: f64) -> f64 {
    let chosen = match config.source {
        SouthSource::Observed => observed,
        SouthSource::Constant => config.constant,
    };
    (config.multiplier * chosen).min(config.capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_and_capped() {
        let config = SouthOutletConfig {
            source: SouthSource::Observed,
            constant: 0.0,
            multiplier: 2.0,
            capacity: 1500.0,
        };
        assert_eq!(release(&config, 500.0), 1000.0);
        assert_eq!(release(&config, 900.0), 1500.0);
    }

    #[test]
    fn constant_source_ignores_observed() {
        let config = SouthOutletConfig {
            source: SouthSource::Constant,
            constant: 250.0,
            ..SouthOutletConfig::default()
        };
        assert_eq!(release(&config, 9999.0), 250.0);
    }
}
