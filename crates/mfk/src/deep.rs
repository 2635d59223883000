use crate::dataset::MultiFidelityDataset;
use crate::errors::Result;
use crate::surrogate::{predict_grouped_by_level, GpModel, GpSettings, MfSurrogate, MfSurrogateParams};
use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256Plus;
use std::fmt;

/// Default number of per-layer GP ensemble members
pub const DEEP_DEFAULT_N_REALIZATIONS: usize = 5;
/// Default number of Monte-Carlo trajectories used at prediction
pub const DEEP_DEFAULT_N_SAMPLES: usize = 100;

/// Parameters of the [DeepMultiFidelityGp] surrogate
#[derive(Clone, Debug)]
pub struct DeepMultiFidelityGpParams {
    settings: GpSettings,
    n_realizations: usize,
    n_samples: usize,
    seed: Option<u64>,
}

impl Default for DeepMultiFidelityGpParams {
    fn default() -> Self {
        DeepMultiFidelityGpParams {
            settings: GpSettings::default(),
            n_realizations: DEEP_DEFAULT_N_REALIZATIONS,
            n_samples: DEEP_DEFAULT_N_SAMPLES,
            seed: None,
        }
    }
}

impl DeepMultiFidelityGpParams {
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

    /// Set the number of sampled link realizations, i.e. of GP ensemble
    /// members trained per layer
    pub fn n_realizations(mut self, n_realizations: usize) -> Self {
        self.n_realizations = n_realizations.max(1);
        self
    }

    /// Set the number of Monte-Carlo trajectories used at prediction
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Set the random generator seed used for link sampling and prediction
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl MfSurrogateParams for DeepMultiFidelityGpParams {
    fn train(&self, data: &MultiFidelityDataset) -> Result<Box<dyn MfSurrogate>> {
        let mut rng = match self.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        let (x0, y0) = data.level(0);
        let base = self.settings.fit_kriging(x0, y0)?;

        let mut layers: Vec<Vec<GpModel>> = Vec::with_capacity(data.n_levels() - 1);
        for t in 1..data.n_levels() {
            let (xt, yt) = data.level(t);
            let mut members = Vec::with_capacity(self.n_realizations);
            for k in 0..self.n_realizations {
                // one sampled trajectory of the chain built so far, so the
                // upstream uncertainty enters the layer training set
                let mut z = column(base.sample_using(xt, 1, &mut rng)?);
                for layer in layers.iter() {
                    let member = &layer[k % layer.len()];
                    let xa = augment(xt, &z);
                    z = column(member.sample_using(&xa, 1, &mut rng)?);
                }
                let xa = augment(xt, &z);
                members.push(self.settings.fit_kriging(&xa, yt)?);
            }
            layers.push(members);
        }
        Ok(Box::new(DeepMultiFidelityGp {
            base,
            layers,
            n_samples: self.n_samples,
            seed: self.seed,
            dim: data.dim(),
            n_levels: data.n_levels(),
        }))
    }
}

fn augment(x: &Array2<f64>, prev: &Array1<f64>) -> Array2<f64> {
    concatenate![Axis(1), x.to_owned(), prev.to_owned().insert_axis(Axis(1))]
}

fn column(x: Array2<f64>) -> Array1<f64> {
    x.remove_axis(Axis(1))
}

/// A multi-fidelity deep GP approximation: the fidelity levels form a chain
/// of GP layers, each layer taking the input space augmented with the
/// previous layer output. Instead of a joint variational optimization, each
/// layer is an ensemble of GPs trained on full-covariance trajectories
/// sampled from the previous layer posterior, and predictions mix random
/// ensemble members along Monte-Carlo trajectories. Compared with
/// [NARGP](crate::NonLinearAutoRegressive) the upstream uncertainty is seen
/// during training, not only at prediction.
pub struct DeepMultiFidelityGp {
    base: GpModel,
    layers: Vec<Vec<GpModel>>,
    n_samples: usize,
    seed: Option<u64>,
    dim: usize,
    n_levels: usize,
}

impl DeepMultiFidelityGp {
    /// Parameters constructor
    pub fn params() -> DeepMultiFidelityGpParams {
        DeepMultiFidelityGpParams::new()
    }

    fn chain_valvar(&self, level: usize, x: &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        let (mean0, var0) = self.base.predict_valvar(x)?;
        if level == 0 {
            return Ok((mean0, var0));
        }
        let mut rng = match self.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        let n = x.nrows();
        let m = self.n_samples;

        let mut z = Array2::zeros((n, m));
        for j in 0..m {
            z.column_mut(j).assign(&draw(&mean0, &var0, &mut rng));
        }

        let mut mus = Array2::zeros((n, m));
        let mut vars = Array2::zeros((n, m));
        for (t, layer) in self.layers.iter().take(level).enumerate() {
            let last = t + 1 == level;
            for j in 0..m {
                let member = &layer[j % layer.len()];
                let xa = augment(x, &z.column(j).to_owned());
                let (mu, var) = member.predict_valvar(&xa)?;
                if last {
                    mus.column_mut(j).assign(&mu);
                    vars.column_mut(j).assign(&var);
                } else {
                    z.column_mut(j).assign(&draw(&mu, &var, &mut rng));
                }
            }
        }

        // trajectories mix both the ensemble spread and the layer variances
        let mean = mus.mean_axis(Axis(1)).unwrap();
        let spread = mus.var_axis(Axis(1), 0.);
        let var = vars.mean_axis(Axis(1)).unwrap() + spread;
        Ok((mean, var))
    }
}

fn draw<R: Rng>(mean: &Array1<f64>, var: &Array1<f64>, rng: &mut R) -> Array1<f64> {
    let mut out = Array1::zeros(mean.len());
    for (o, (m, v)) in out.iter_mut().zip(mean.iter().zip(var.iter())) {
        let eps: f64 = rng.sample(StandardNormal);
        *o = m + v.max(0.).sqrt() * eps;
    }
    out
}

impl MfSurrogate for DeepMultiFidelityGp {
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

impl fmt::Display for DeepMultiFidelityGp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeepMultiFidelityGp(levels={}, realizations={}, samples={})",
            self.n_levels,
            self.layers.first().map(|l| l.len()).unwrap_or(0),
            self.n_samples
        )
    }
}
