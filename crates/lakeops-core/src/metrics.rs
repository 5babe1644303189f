//! Goodness-of-fit scores for comparing simulated and observed stage.
//!
//! Every score pairs the two slices element by element and drops pairs in
//! which either value is not finite, so gaps in an observed record can be
//! passed as NaN.

use serde::Serialize;

fn finite_pairs(observed: &[f64], simulated: &[f64]) -> (Vec<f64>, Vec<f64>) {
    observed
        .iter()
        .zip(simulated)
        .filter(|(o, s)| o.is_finite() && s.is_finite())
        .map(|(&o, &s)| (o, s))
        .unzip()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn nse(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = finite_pairs(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let mean_obs = mean(&obs);
    let numerator: f64 = obs.iter().zip(&sim).map(|(o, s)| (o - s).powi(2)).sum();
    let denominator: f64 = obs.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if denominator == 0.0 {
        return f64::NEG_INFINITY;
    }
    1.0 - numerator / denominator
}

/// Kling-Gupta Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn kge(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = finite_pairs(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let n = obs.len() as f64;
    let mean_o = mean(&obs);
    let mean_s = mean(&sim);
    let std_o = (obs.iter().map(|o| (o - mean_o).powi(2)).sum::<f64>() / n).sqrt();
    let std_s = (sim.iter().map(|s| (s - mean_s).powi(2)).sum::<f64>() / n).sqrt();

    let r = if std_o == 0.0 || std_s == 0.0 {
        0.0
    } else {
        obs.iter()
            .zip(&sim)
            .map(|(o, s)| (o - mean_o) * (s - mean_s))
            .sum::<f64>()
            / (n * std_o * std_s)
    };
    let alpha = if std_o == 0.0 { 0.0 } else { std_s / std_o };
    let beta = if mean_o == 0.0 { 0.0 } else { mean_s / mean_o };

    1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt()
}

/// Percent Bias. Optimal = 0. Positive = overestimation.
pub fn pbias(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = finite_pairs(observed, simulated);
    let sum_obs: f64 = obs.iter().sum();
    if sum_obs == 0.0 {
        return f64::INFINITY;
    }
    let diff_sum: f64 = sim.iter().zip(&obs).map(|(s, o)| s - o).sum();
    100.0 * diff_sum / sum_obs
}

/// Root Mean Square Error [ft]. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = finite_pairs(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let squared: Vec<f64> = obs.iter().zip(&sim).map(|(o, s)| (o - s).powi(2)).collect();
    mean(&squared).sqrt()
}

/// Mean Absolute Error [ft]. Range: [0, inf), 0 = perfect.
pub fn mae(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = finite_pairs(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let abs: Vec<f64> = obs.iter().zip(&sim).map(|(o, s)| (o - s).abs()).collect();
    mean(&abs)
}

/// Summary fit of a simulated stage trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageFit {
    pub nse: f64,
    pub kge: f64,
    pub rmse: f64,
    pub mae: f64,
    pub pbias: f64,
    /// Number of pairs with both values finite.
    pub n: usize,
}

impl StageFit {
    pub fn compute(observed: &[f64], simulated: &[f64]) -> Self {
        Self {
            nse: nse(observed, simulated),
            kge: kge(observed, simulated),
            rmse: rmse(observed, simulated),
            mae: mae(observed, simulated),
            pbias: pbias(observed, simulated),
            n: finite_pairs(observed, simulated).0.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const OBS: [f64; 5] = [12.0, 12.5, 13.0, 13.5, 14.0];

    // --- NSE ---

    #[test]
    fn nse_perfect_match() {
        assert_relative_eq!(nse(&OBS, &OBS), 1.0);
    }

    #[test]
    fn nse_mean_simulation_gives_zero() {
        assert_relative_eq!(nse(&OBS, &[13.0; 5]), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn nse_constant_observed_returns_neg_inf() {
        assert_eq!(nse(&[13.0; 5], &OBS), f64::NEG_INFINITY);
    }

    #[test]
    fn nse_known_value() {
        // num = 0.01 + 0.04 + 0.04 + 0.01 + 0.01 = 0.11, den = 2.5
        let sim = [12.1, 12.7, 12.8, 13.6, 13.9];
        assert_relative_eq!(nse(&OBS, &sim), 1.0 - 0.11 / 2.5, epsilon = 1e-10);
    }

    // --- KGE ---

    #[test]
    fn kge_perfect_match() {
        assert_relative_eq!(kge(&OBS, &OBS), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn kge_bias_reduces_score() {
        let sim = OBS.map(|o| o + 1.0);
        assert!(kge(&OBS, &sim) < 1.0);
    }

    #[test]
    fn kge_zero_variance_observed_is_finite() {
        assert!(kge(&[13.0; 5], &OBS).is_finite());
    }

    // --- PBIAS, RMSE, MAE ---

    #[test]
    fn pbias_sign_follows_bias() {
        assert!(pbias(&OBS, &OBS.map(|o| o + 0.5)) > 0.0);
        assert!(pbias(&OBS, &OBS.map(|o| o - 0.5)) < 0.0);
        assert_eq!(pbias(&[0.0; 3], &[1.0; 3]), f64::INFINITY);
    }

    #[test]
    fn constant_error_scores() {
        let sim = OBS.map(|o| o + 0.25);
        assert_relative_eq!(rmse(&OBS, &sim), 0.25, epsilon = 1e-10);
        assert_relative_eq!(mae(&OBS, &sim), 0.25, epsilon = 1e-10);
    }

    // --- Gaps ---

    #[test]
    fn non_finite_pairs_are_skipped() {
        let obs = [12.0, f64::NAN, 13.0, 13.5];
        let sim = [12.0, 12.2, f64::INFINITY, 13.5];
        assert_relative_eq!(rmse(&obs, &sim), 0.0);
        let fit = StageFit::compute(&obs, &sim);
        assert_eq!(fit.n, 2);
        assert_relative_eq!(fit.nse, 1.0);
    }

    #[test]
    fn no_pairs_gives_nan() {
        let fit = StageFit::compute(&[f64::NAN], &[1.0]);
        assert_eq!(fit.n, 0);
        assert!(fit.nse.is_nan());
        assert!(fit.rmse.is_nan());
    }
}
