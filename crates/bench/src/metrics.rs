//! Regression accuracy metrics computed from test targets and predicted
//! means/variances.

use ndarray::Array1;

/// Variance floor avoiding degenerate log-likelihoods at interpolated points
const VAR_FLOOR: f64 = 1e-12;

/// Accuracy scores of one model on one test set
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Scores {
    /// Coefficient of determination
    pub r2: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean negative log-likelihood of the targets under the predicted
    /// per-point Gaussian
    pub mnll: f64,
}

impl Scores {
    /// Arithmetic mean of a set of scores
    pub fn mean(scores: &[Scores]) -> Scores {
        let n = scores.len() as f64;
        let mut acc = Scores::default();
        for s in scores {
            acc.r2 += s.r2;
            acc.rmse += s.rmse;
            acc.mnll += s.mnll;
        }
        Scores {
            r2: acc.r2 / n,
            rmse: acc.rmse / n,
            mnll: acc.mnll / n,
        }
    }
}

/// Compute R², RMSE and MNLL from test targets and per-point predicted
/// means and variances.
///
/// *Panics* if the arrays are empty or of mismatched lengths.
pub fn score(targets: &Array1<f64>, means: &Array1<f64>, variances: &Array1<f64>) -> Scores {
    assert!(!targets.is_empty());
    assert_eq!(targets.len(), means.len());
    assert_eq!(targets.len(), variances.len());
    let n = targets.len() as f64;

    let residuals = targets - means;
    let ss_res = residuals.mapv(|v| v * v).sum();
    let y_mean = targets.mean().unwrap();
    let ss_tot = targets.mapv(|v| (v - y_mean) * (v - y_mean)).sum();
    let r2 = 1. - ss_res / ss_tot;

    let rmse = (ss_res / n).sqrt();

    let two_pi = 2. * std::f64::consts::PI;
    let mnll = residuals
        .iter()
        .zip(variances.iter())
        .map(|(r, v)| {
            let v = v.max(VAR_FLOOR);
            0.5 * ((two_pi * v).ln() + r * r / v)
        })
        .sum::<f64>()
        / n;

    Scores { r2, rmse, mnll }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_perfect_prediction() {
        let y = array![1., 2., 3., 4.];
        let v = Array1::from_elem(4, 1.);
        let s = score(&y, &y.clone(), &v);
        assert_abs_diff_eq!(s.r2, 1., epsilon = 1e-12);
        assert_abs_diff_eq!(s.rmse, 0., epsilon = 1e-12);
        // residuals are null: mnll reduces to the entropy term
        assert_abs_diff_eq!(
            s.mnll,
            0.5 * (2. * std::f64::consts::PI).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_mean_predictor_has_null_r2() {
        let y = array![1., 2., 3., 4.];
        let pred = Array1::from_elem(4, 2.5);
        let v = Array1::from_elem(4, 1.);
        let s = score(&y, &pred, &v);
        assert_abs_diff_eq!(s.r2, 0., epsilon = 1e-12);
        assert_abs_diff_eq!(s.rmse, (1.25f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_mnll_penalizes_overconfidence() {
        let y = array![0., 0.];
        let pred = array![1., 1.];
        let confident = Array1::from_elem(2, 1e-4);
        let honest = Array1::from_elem(2, 1.);
        let s_confident = score(&y, &pred, &confident);
        let s_honest = score(&y, &pred, &honest);
        assert!(s_confident.mnll > s_honest.mnll);
    }

    #[test]
    fn test_null_variance_is_floored() {
        let y = array![0., 1.];
        let pred = array![0., 1.];
        let v = array![0., 0.];
        let s = score(&y, &pred, &v);
        assert!(s.mnll.is_finite());
    }

    #[test]
    fn test_scores_mean() {
        let scores = [
            Scores {
                r2: 1.,
                rmse: 0.,
                mnll: 2.,
            },
            Scores {
                r2: 0.,
                rmse: 2.,
                mnll: 4.,
            },
        ];
        let mean = Scores::mean(&scores);
        assert_abs_diff_eq!(mean.r2, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mean.rmse, 1., epsilon = 1e-12);
        assert_abs_diff_eq!(mean.mnll, 3., epsilon = 1e-12);
    }
}
