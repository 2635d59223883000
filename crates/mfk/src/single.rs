use crate::dataset::MultiFidelityDataset;
use crate::errors::Result;
use crate::surrogate::{predict_grouped_by_level, GpModel, GpSettings, MfSurrogate, MfSurrogateParams};
use ndarray::{Array1, Array2, ArrayView2};
use std::fmt;

/// Parameters of the [HighFidelityGp] surrogate
#[derive(Clone, Debug, Default)]
pub struct HighFidelityGpParams {
    settings: GpSettings,
}

impl HighFidelityGpParams {
    /// Constructor with default GP settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of likelihood optimization restarts
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.settings.n_start = n_start;
        self
    }

    /// Set the max number of likelihood evaluations per optimization
    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.settings.max_eval = max_eval;
        self
    }

    /// Set the nugget added to the correlation diagonal
    pub fn nugget(mut self, nugget: f64) -> Self {
        self.settings.nugget = nugget;
        self
    }
}

impl MfSurrogateParams for HighFidelityGpParams {
    fn train(&self, data: &MultiFidelityDataset) -> Result<Box<dyn MfSurrogate>> {
        let (x, y) = data.highest();
        let gp = self.settings.fit_kriging(x, y)?;
        Ok(Box::new(HighFidelityGp {
            gp,
            dim: data.dim(),
            n_levels: data.n_levels(),
        }))
    }
}

/// A plain GP trained on the highest-fidelity data only, the baseline every
/// multi-fidelity surrogate is compared against. The fidelity column of the
/// query is checked then ignored: the model answers the same whatever the
/// requested level.
pub struct HighFidelityGp {
    gp: GpModel,
    dim: usize,
    n_levels: usize,
}

impl HighFidelityGp {
    /// Parameters constructor
    pub fn params() -> HighFidelityGpParams {
        HighFidelityGpParams::new()
    }
}

impl MfSurrogate for HighFidelityGp {
    fn dim(&self) -> usize {
        self.dim
    }

    fn n_levels(&self) -> usize {
        self.n_levels
    }

    fn predict_valvar(&self, x: &ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        predict_grouped_by_level(x, self.n_levels, |_, xl: &Array2<f64>| {
            Ok(self.gp.predict_valvar(xl)?)
        })
    }
}

impl fmt::Display for HighFidelityGp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HighFidelityGp({})", self.gp)
    }
}
