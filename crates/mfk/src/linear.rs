use crate::dataset::MultiFidelityDataset;
use crate::errors::Result;
use crate::surrogate::{predict_grouped_by_level, GpModel, GpSettings, MfSurrogate, MfSurrogateParams};
use ndarray::{Array1, Array2, ArrayView2};
use std::fmt;

/// Parameters of the [LinearAutoRegressive] surrogate
#[derive(Clone, Debug, Default)]
pub struct LinearAutoRegressiveParams {
    settings: GpSettings,
}

impl LinearAutoRegressiveParams {
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

impl MfSurrogateParams for LinearAutoRegressiveParams {
    fn train(&self, data: &MultiFidelityDataset) -> Result<Box<dyn MfSurrogate>> {
        let (x0, y0) = data.level(0);
        let base = self.settings.fit_kriging(x0, y0)?;
        let mut model = LinearAutoRegressive {
            base,
            upper: Vec::with_capacity(data.n_levels() - 1),
            dim: data.dim(),
            n_levels: data.n_levels(),
        };
        for t in 1..data.n_levels() {
            let (xt, yt) = data.level(t);
            // posterior mean of the chain built so far, at this level inputs
            let (mu, _) = model.chain_valvar(t - 1, xt)?;

            let mu_mean = mu.mean().unwrap();
            let y_mean = yt.mean().unwrap();
            let centered = mu.mapv(|v| v - mu_mean);
            let den = centered.mapv(|v| v * v).sum();
            let rho = if den > f64::EPSILON {
                (&centered * &yt.mapv(|v| v - y_mean)).sum() / den
            } else {
                log::warn!("constant low-fidelity posterior at level {t}, scaling dropped");
                0.
            };
            let residual = yt - &mu.mapv(|v| rho * v);
            let delta = self.settings.fit_kriging(xt, &residual)?;
            model.upper.push(ArLevel { rho, delta });
        }
        Ok(Box::new(model))
    }
}

/// One auto-regressive step: f_t(x) = rho * f_{t-1}(x) + delta(x)
struct ArLevel {
    rho: f64,
    delta: GpModel,
}

/// Linear auto-regressive co-kriging after Kennedy & O'Hagan: each fidelity
/// level is a scalar scaling of the previous one plus an independent GP
/// discrepancy. The scaling `rho` is estimated by least squares against the
/// previous level posterior mean; means and variances then propagate in
/// closed form through the chain
/// (`var_t = rho^2 * var_{t-1} + var_delta`).
pub struct LinearAutoRegressive {
    base: GpModel,
    upper: Vec<ArLevel>,
    dim: usize,
    n_levels: usize,
}

impl LinearAutoRegressive {
    /// Parameters constructor
    pub fn params() -> LinearAutoRegressiveParams {
        LinearAutoRegressiveParams::new()
    }

    /// Closed-form mean and variance of the chain at the given level
    fn chain_valvar(&self, level: usize, x: &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        let (mut mean, mut var) = self.base.predict_valvar(x)?;
        for step in self.upper.iter().take(level) {
            let (dm, dv) = step.delta.predict_valvar(x)?;
            mean = mean.mapv(|v| step.rho * v) + dm;
            var = var.mapv(|v| step.rho * step.rho * v) + dv;
        }
        Ok((mean, var))
    }
}

impl MfSurrogate for LinearAutoRegressive {
    fn dim(&self) -> usize {
        self.dim
    }

    fn n_levels(&self) -> usize {
        self.n_levels
    }

    fn predict_valvar(&self, x: &ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        predict_grouped_by_level(x, self.n_levels, |level, xl| self.chain_valvar(level, xl))
    }
}

impl fmt::Display for LinearAutoRegressive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhos: Vec<String> = self.upper.iter().map(|l| format!("{:.3}", l.rho)).collect();
        write!(f, "LinearAutoRegressive(rho=[{}])", rhos.join(", "))
    }
}
