use crate::dataset::{split_fidelity, MultiFidelityDataset};
use crate::errors::Result;
use mfbox_gp::correlation_models::SquaredExponentialCorr;
use mfbox_gp::mean_models::ConstantMean;
use mfbox_gp::GaussianProcess;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// The GP model used as building block of every multi-fidelity surrogate
pub(crate) type GpModel = GaussianProcess<f64, ConstantMean, SquaredExponentialCorr>;

/// A trait for a trained multi-fidelity surrogate.
///
/// Query points are given as a (n, nx + 1) matrix whose trailing column is
/// the fidelity index of each row; rows may mix levels. Surrogates unaware
/// of fidelity levels check the column and ignore it.
pub trait MfSurrogate: std::fmt::Display + Send + Sync {
    /// Input dimension (without the fidelity column)
    fn dim(&self) -> usize;

    /// Number of fidelity levels this surrogate was trained on
    fn n_levels(&self) -> usize;

    /// Predict output values at the given points, one per row
    fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.predict_valvar(x)?.0)
    }

    /// Predict output variances at the given points, one per row
    fn predict_var(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.predict_valvar(x)?.1)
    }

    /// Predict both output values and variances at the given points
    fn predict_valvar(&self, x: &ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)>;
}

/// A trait for surrogate parameters used to train a boxed [MfSurrogate].
///
/// Training fits the underlying GP hyperparameters, restarting their
/// internal likelihood optimization several times.
pub trait MfSurrogateParams {
    /// Train a surrogate on the given multi-fidelity dataset
    fn train(&self, data: &MultiFidelityDataset) -> Result<Box<dyn MfSurrogate>>;
}

/// GP fit settings shared by the multi-fidelity surrogates
#[derive(Clone, Copy, Debug)]
pub(crate) struct GpSettings {
    pub n_start: usize,
    pub max_eval: usize,
    pub nugget: f64,
}

impl Default for GpSettings {
    fn default() -> Self {
        GpSettings {
            n_start: mfbox_gp::GP_OPTIM_N_START,
            max_eval: mfbox_gp::GP_COBYLA_MAX_EVAL,
            nugget: 100.0 * f64::EPSILON,
        }
    }
}

impl GpSettings {
    /// Fit a kriging model on the given training set with these settings
    pub fn fit_kriging(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<GpModel> {
        use linfa::prelude::{Dataset, Fit};
        let gp = mfbox_gp::Kriging::params()
            .n_start(self.n_start)
            .max_eval(self.max_eval)
            .nugget(self.nugget)
            .fit(&Dataset::new(x.to_owned(), y.to_owned()))?;
        Ok(gp)
    }
}

/// Group the rows of a fidelity-tagged query by level, evaluate each group
/// with `eval(level, plain_x)` and scatter results back in row order.
pub(crate) fn predict_grouped_by_level(
    x: &ArrayView2<f64>,
    n_levels: usize,
    mut eval: impl FnMut(usize, &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>)>,
) -> Result<(Array1<f64>, Array1<f64>)> {
    let (plain, levels) = split_fidelity(x, n_levels)?;
    let mut mean = Array1::zeros(x.nrows());
    let mut var = Array1::zeros(x.nrows());
    for level in 0..n_levels {
        let rows: Vec<usize> = levels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == level)
            .map(|(i, _)| i)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let xl = plain.select(Axis(0), &rows);
        let (m, v) = eval(level, &xl)?;
        for (k, &i) in rows.iter().enumerate() {
            mean[i] = m[k];
            var[i] = v[k];
        }
    }
    Ok((mean, var))
}
