use crate::correlation_models::{CorrelationModel, SquaredExponentialCorr};
use crate::errors::{GpError, Result};
use crate::mean_models::{ConstantMean, RegressionModel};
use crate::optimization::{optimize_params, prepare_multistart, CobylaParams};
use crate::parameters::{GpParams, GpValidParams, ThetaTuning};
use crate::utils::{pairwise_differences, DiffMatrix, NormalizedData};

use linfa::prelude::{DatasetBase, Fit, Float};
use linfa_linalg::{cholesky::*, eigh::*, qr::*, svd::*, triangular::*};
use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use ndarray_stats::QuantileExt;

use log::debug;
use rayon::prelude::*;
use std::fmt;
use std::time::Instant;

/// Default number of multistarts for hyperparameter optimization
pub const GP_OPTIM_N_START: usize = 10;
/// Minimum number of function evaluations for the COBYLA optimizer
pub const GP_COBYLA_MIN_EVAL: usize = 25;
/// Maximum number of function evaluations for the COBYLA optimizer
pub const GP_COBYLA_MAX_EVAL: usize = 1000;

/// Internal parameters computed during training, used later on in predictions
#[derive(Default, Debug)]
pub(crate) struct GpInnerParams<F: Float> {
    /// Gaussian process variance
    sigma2: F,
    /// Generalized least-squares regression weights
    beta: Array2<F>,
    /// Gaussian process weights
    gamma: Array2<F>,
    /// Cholesky decomposition of the correlation matrix \[R\]
    r_chol: Array2<F>,
    /// Solution of the linear equation system : \[R\] x Ft = F
    ft: Array2<F>,
    /// R upper triangle matrix of the QR decomposition of Ft
    ft_qr_r: Array2<F>,
}

impl<F: Float> Clone for GpInnerParams<F> {
    fn clone(&self) -> Self {
        Self {
            sigma2: self.sigma2,
            beta: self.beta.to_owned(),
            gamma: self.gamma.to_owned(),
            r_chol: self.r_chol.to_owned(),
            ft: self.ft.to_owned(),
            ft_qr_r: self.ft_qr_r.to_owned(),
        }
    }
}

/// A GP regression is an interpolation method where the interpolated values
/// are modeled by a Gaussian process with a mean, governed by a prior
/// covariance kernel which depends on some parameters to be determined.
///
/// The interpolated output is modeled as a stochastic process:
///
/// `Y(x) = mu(x) + Z(x)`
///
/// where:
/// * `mu(x)` is the trend, i.e. the mean of the gaussian process
/// * `Z(x)` the realization of a stochastic gaussian process ~ `Normal(0, sigma^2)`
///
/// which in turn is written as:
///
/// `Y(x) = betas.regr(x) + sigma^2 * corr(x, x')`
///
/// where:
/// * `betas` is a vector of linear regression parameters to be determined
/// * `regr(x)` a vector of polynomial basis functions
/// * `sigma^2` is the process variance
/// * `corr(x, x')` is a correlation function which depends on `distance(x, x')`
///   and a set of unknown parameters `thetas` to be determined
///
/// `thetas` are estimated by maximising the reduced likelihood with a
/// multistart COBYLA optimizer; a restart whose likelihood evaluation fails
/// (ill-conditioned correlation matrix) is silently discarded.
///
/// # Example
///
/// ```no_run
/// use mfbox_gp::Kriging;
/// use linfa::prelude::*;
/// use ndarray::{arr2, array, Array, Axis};
///
/// // training data
/// let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
/// let yt = array![0.0, 0.9, 1.5, 0.9, 0.5, 0.2, -0.3];
///
/// // GP with constant mean model and squared exponential correlation model
/// // aka Ordinary Kriging model
/// let kriging = Kriging::params()
///     .fit(&Dataset::new(xt, yt))
///     .expect("Kriging fitted");
///
/// let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
/// let ypred = kriging.predict(&xtest).expect("Kriging prediction");
/// let yvariances = kriging.predict_var(&xtest).expect("Kriging prediction");
/// ```
///
/// # Reference
///
/// Mohamed Amine Bouhlel, John T. Hwang, Nathalie Bartoli, Rémi Lafage,
/// Joseph Morlier, Joaquim R.R.A. Martins,
/// [A Python surrogate modeling framework with derivatives](https://doi.org/10.1016/j.advengsoft.2019.03.005),
/// Advances in Engineering Software, Volume 135, 2019.
#[derive(Debug)]
pub struct GaussianProcess<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> {
    /// Parameters of the correlation model, the inverse of the length scales
    theta: Array1<F>,
    /// Reduced likelihood value (result of the internal optimization)
    /// May be used to compare trained models
    likelihood: F,
    /// Gaussian process internal fitted params
    inner_params: GpInnerParams<F>,
    /// Training inputs
    xt_norm: NormalizedData<F>,
    /// Training outputs
    yt_norm: NormalizedData<F>,
    /// Parameters used to fit this model
    pub(crate) params: GpValidParams<F, Mean, Corr>,
}

/// Kriging as GP special case when using a constant mean and a squared
/// exponential correlation model
pub type Kriging<F> = GpParams<F, ConstantMean, SquaredExponentialCorr>;

impl<F: Float> Kriging<F> {
    /// Kriging parameters constructor
    pub fn params() -> GpParams<F, ConstantMean, SquaredExponentialCorr> {
        GpParams::new(ConstantMean(), SquaredExponentialCorr())
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> Clone
    for GaussianProcess<F, Mean, Corr>
{
    fn clone(&self) -> Self {
        Self {
            theta: self.theta.to_owned(),
            likelihood: self.likelihood,
            inner_params: self.inner_params.clone(),
            xt_norm: self.xt_norm.clone(),
            yt_norm: self.yt_norm.clone(),
            params: self.params.clone(),
        }
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> fmt::Display
    for GaussianProcess<F, Mean, Corr>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(mean={}, corr={}, theta={}, variance={}, likelihood={})",
            self.params.mean(),
            self.params.corr(),
            self.theta,
            self.inner_params.sigma2,
            self.likelihood,
        )
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> GaussianProcess<F, Mean, Corr> {
    /// Gp parameters constructor
    pub fn params<NewMean: RegressionModel<F>, NewCorr: CorrelationModel<F>>(
        mean: NewMean,
        corr: NewCorr,
    ) -> GpParams<F, NewMean, NewCorr> {
        GpParams::new(mean, corr)
    }

    /// Predict output values at n given `x` points of nx components specified
    /// as a (n, nx) matrix. Returns n scalar output values as a (n,) vector.
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let xnorm = (x - &self.xt_norm.mean) / &self.xt_norm.std;
        // Compute the mean term at x
        let f = self.params.mean().value(&xnorm);
        // Compute the correlation term at x
        let corr = self.compute_correlation(&xnorm);
        // Scaled predictor
        let y_ = &f.dot(&self.inner_params.beta) + &corr.dot(&self.inner_params.gamma);
        // Predictor
        Ok((&y_ * &self.yt_norm.std + &self.yt_norm.mean).remove_axis(Axis(1)))
    }

    /// Predict variance values at n given `x` points specified as a (n, nx)
    /// matrix. Returns n variance values as a (n,) vector.
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let xnorm = (x - &self.xt_norm.mean) / &self.xt_norm.std;
        let corr = self.compute_correlation(&xnorm);
        let (rt, u) = self.compute_rt_u(&xnorm, &corr)?;

        let mut mse = Array::ones(rt.ncols()) - rt.mapv(|v| v * v).sum_axis(Axis(0))
            + u.mapv(|v: F| v * v).sum_axis(Axis(0));
        mse.mapv_inplace(|v| self.inner_params.sigma2 * v);

        // Mean squared error might be slightly negative depending on
        // machine precision: set to zero in that case
        Ok(mse.mapv(|v| if v < F::zero() { F::zero() } else { v }))
    }

    /// Predict both output values and variances at n given `x` points
    pub fn predict_valvar(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        let xnorm = (x - &self.xt_norm.mean) / &self.xt_norm.std;
        let f = self.params.mean().value(&xnorm);
        let corr = self.compute_correlation(&xnorm);
        let y_ = &f.dot(&self.inner_params.beta) + &corr.dot(&self.inner_params.gamma);
        let yp = (&y_ * &self.yt_norm.std + &self.yt_norm.mean).remove_axis(Axis(1));

        let (rt, u) = self.compute_rt_u(&xnorm, &corr)?;
        let mut mse = Array::ones(rt.ncols()) - rt.mapv(|v| v * v).sum_axis(Axis(0))
            + u.mapv(|v: F| v * v).sum_axis(Axis(0));
        mse.mapv_inplace(|v| self.inner_params.sigma2 * v);
        let vmse = mse.mapv(|v| if v < F::zero() { F::zero() } else { v });

        Ok((yp, vmse))
    }

    /// Sample the gaussian process at the `x` points for `n_traj` trajectories
    /// using the given random generator; the conditioned covariance matrix is
    /// decomposed through its eigenvalues as Cholesky may fail on the
    /// ill-conditioned matrices occurring with close x locations.
    /// Returns a (n, n_traj) matrix, one trajectory per column.
    pub fn sample_using<R: Rng>(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        n_traj: usize,
        rng: &mut R,
    ) -> Result<Array2<F>> {
        let mean = self.predict(x)?.insert_axis(Axis(1));
        let cov = self.compute_covariance(x)?;
        let (v, w) = cov.eigh_into()?;
        let v = v.mapv(|x| {
            // eigenvalues are floored to keep the scale matrix real
            if x < F::cast(1e-9) {
                return F::zero();
            }
            x.sqrt()
        });
        let c = w.dot(&Array2::from_diag(&v));
        let normal = Normal::new(0., 1.).unwrap();
        let ary = Array::random_using((x.nrows(), n_traj), normal, rng).mapv(F::cast);
        Ok(mean + c.dot(&ary))
    }

    /// Compute the conditioned covariance matrix at the given x points
    fn compute_covariance(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        let xnorm = (x - &self.xt_norm.mean) / &self.xt_norm.std;
        let corr = self.compute_correlation(&xnorm);
        let (rt, u) = self.compute_rt_u(&xnorm, &corr)?;

        let cross_dx = pairwise_differences(&xnorm, &xnorm);
        let k = self.params.corr().value(&cross_dx, &self.theta);
        let k = k.into_shape((xnorm.nrows(), xnorm.nrows())).unwrap();

        let mut cov_matrix = k - rt.t().to_owned().dot(&rt) + u.t().dot(&u);
        cov_matrix.mapv_inplace(|v| self.inner_params.sigma2 * v);
        Ok(cov_matrix)
    }

    /// Compute `rt` and `u` matrices, the computations shared by variance
    /// and covariance predictions
    fn compute_rt_u(
        &self,
        xnorm: &ArrayBase<impl Data<Elem = F>, Ix2>,
        corr: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array2<F>, Array2<F>)> {
        let inners = &self.inner_params;

        let corr_t = corr.t().to_owned();
        let rt = inners.r_chol.solve_triangular(&corr_t, UPLO::Lower)?;

        let rhs = inners.ft.t().dot(&rt) - self.params.mean().value(xnorm).t();
        let u = inners.ft_qr_r.t().solve_triangular(&rhs, UPLO::Lower)?;
        Ok((rt, u))
    }

    /// Compute the correlation factors between normalized x points and the
    /// normalized training set as a (n, nt) matrix
    fn compute_correlation(&self, xnorm: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        // Get pairwise componentwise L1-distances to the input training set
        let dx = pairwise_differences(xnorm, &self.xt_norm.data);
        // Compute the correlation function
        let r = self.params.corr().value(&dx, &self.theta);
        let n_obs = xnorm.nrows();
        let nt = self.xt_norm.data.nrows();
        r.into_shape((n_obs, nt)).unwrap()
    }

    /// Retrieve optimized hyperparameters theta
    pub fn theta(&self) -> &Array1<F> {
        &self.theta
    }

    /// Estimated process variance
    pub fn variance(&self) -> F {
        self.inner_params.sigma2
    }

    /// Retrieve the reduced likelihood value
    pub fn likelihood(&self) -> F {
        self.likelihood
    }

    /// Retrieve input and output dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.xt_norm.ncols(), self.yt_norm.ncols())
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GpValidParams<F, Mean, Corr>
{
    type Object = GaussianProcess<F, Mean, Corr>;

    /// Fit GP parameters using maximum reduced likelihood
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.targets().to_owned().insert_axis(Axis(1));
        if x.nrows() != y.nrows() {
            return Err(GpError::InvalidValueError(format!(
                "{} training points but {} output values",
                x.nrows(),
                y.nrows()
            )));
        }
        if x.nrows() < 2 {
            return Err(GpError::InvalidValueError(
                "at least 2 training points are required".to_string(),
            ));
        }

        let dim = x.ncols();
        let init = self.theta_tuning().init();
        let theta0 = if init.len() == 1 {
            Array1::from_elem(dim, init[0])
        } else if init.len() == dim {
            init.to_owned()
        } else {
            return Err(GpError::InvalidValueError(format!(
                "initial theta should be either 1-dim or xtrain dim ({}), got {}",
                dim,
                init.len()
            )));
        };

        let xtrain = NormalizedData::new(x);
        let ytrain = NormalizedData::new(&y);

        let x_distances = DiffMatrix::new(&xtrain.data);
        let sums = x_distances
            .d
            .mapv(|v| num_traits::float::Float::abs(v))
            .sum_axis(Axis(1));
        if *sums.min().unwrap() == F::zero() {
            log::warn!("multiple x input features have the same value (same row at least twice)");
        }
        let fx = self.mean().value(&xtrain.data);

        let opt_theta = match self.theta_tuning() {
            ThetaTuning::Fixed(_) => {
                // Easy path, no optimization
                theta0.to_owned()
            }
            ThetaTuning::Optimized { init: _, bounds } => {
                let base: f64 = 10.;
                let objfn = |x: &[f64], _gradient: Option<&mut [f64]>, _params: &mut ()| -> f64 {
                    let theta = Array1::from_iter(x.iter().map(|v| F::cast(base.powf(*v))));
                    for v in theta.iter() {
                        // check theta as the optimizer may try nan values
                        if v.is_nan() {
                            // shortcut with the worst value wrt minimization
                            return f64::INFINITY;
                        }
                    }
                    let rxx = self.corr().value(&x_distances.d, &theta);
                    match reduced_likelihood(&fx, rxx, &x_distances, &ytrain, self.nugget()) {
                        Ok(r) => unsafe { -(*(&r.0 as *const F as *const f64)) },
                        Err(_) => f64::INFINITY,
                    }
                };

                let bounds = if bounds.len() == 1 {
                    vec![bounds[0]; dim]
                } else {
                    bounds.to_vec()
                };
                let (theta_inits, bounds) =
                    prepare_multistart(self.n_start(), &theta0, &bounds);
                debug!("multistart theta inits = {theta_inits:?}, bounds = {bounds:?}");

                let now = Instant::now();
                let opt_params = (0..theta_inits.nrows())
                    .into_par_iter()
                    .map(|i| {
                        optimize_params(
                            objfn,
                            &theta_inits.row(i).to_owned(),
                            &bounds,
                            CobylaParams {
                                maxeval: (10 * theta_inits.ncols())
                                    .clamp(GP_COBYLA_MIN_EVAL, self.max_eval()),
                                ..CobylaParams::default()
                            },
                        )
                    })
                    .reduce(
                        || (f64::INFINITY, Array::ones((theta_inits.ncols(),))),
                        |a, b| if b.0 < a.0 { b } else { a },
                    );
                debug!("elapsed optim = {:?} ms", now.elapsed().as_millis());
                if opt_params.0.is_infinite() {
                    return Err(GpError::LikelihoodComputationError(
                        "all theta optimization restarts failed".to_string(),
                    ));
                }
                opt_params.1.mapv(|v| F::cast(base.powf(v)))
            }
        };

        let rxx = self.corr().value(&x_distances.d, &opt_theta);
        let (lkh, inner_params) =
            reduced_likelihood(&fx, rxx, &x_distances, &ytrain, self.nugget())?;
        Ok(GaussianProcess {
            theta: opt_theta,
            likelihood: lkh,
            inner_params,
            xt_norm: xtrain,
            yt_norm: ytrain,
            params: self.clone(),
        })
    }
}

/// Compute the reduced likelihood function
/// fx: mean factors at x samples,
/// rxx: correlation factors at x samples,
/// x_distances: pairwise distances between x samples,
/// ytrain: normalized output training values,
/// nugget: factor to improve numerical stability
fn reduced_likelihood<F: Float>(
    fx: &ArrayBase<impl Data<Elem = F>, Ix2>,
    rxx: ArrayBase<impl Data<Elem = F>, Ix2>,
    x_distances: &DiffMatrix<F>,
    ytrain: &NormalizedData<F>,
    nugget: F,
) -> Result<(F, GpInnerParams<F>)> {
    // Set up R
    let mut r_mx: Array2<F> = Array2::<F>::eye(x_distances.n_obs).mapv(|v| v + v * nugget);
    for (i, ij) in x_distances.d_indices.outer_iter().enumerate() {
        r_mx[[ij[0], ij[1]]] = rxx[[i, 0]];
        r_mx[[ij[1], ij[0]]] = rxx[[i, 0]];
    }
    // R cholesky decomposition
    let r_chol = r_mx.cholesky()?;
    // Solve the generalized least squares problem
    let ft = r_chol.solve_triangular(fx, UPLO::Lower)?;
    let (ft_qr_q, ft_qr_r) = ft.qr()?.into_decomp();

    // Check whether we have an ill-conditioned problem
    let (_, sv_qr_r, _) = ft_qr_r.svd(false, false)?;
    let cond_ft = sv_qr_r[sv_qr_r.len() - 1] / sv_qr_r[0];
    if cond_ft < F::cast(1e-10) {
        let (_, sv_f, _) = fx.svd(false, false)?;
        let cond_fx = sv_f[0] / sv_f[sv_f.len() - 1];
        if cond_fx > F::cast(1e15) {
            return Err(GpError::LikelihoodComputationError(
                "F is too ill conditioned. Poor combination \
                of regression model and observations."
                    .to_string(),
            ));
        } else {
            // ft is too ill conditioned, get out (try another theta)
            return Err(GpError::LikelihoodComputationError(
                "ft is too ill conditioned, try another theta".to_string(),
            ));
        }
    }
    let yt = r_chol.solve_triangular(&ytrain.data, UPLO::Lower)?;

    let beta = ft_qr_r.solve_triangular_into(ft_qr_q.t().dot(&yt), UPLO::Upper)?;
    let rho = yt - ft.dot(&beta);
    let rho_sqr = rho.mapv(|v| v * v).sum_axis(Axis(0));

    let gamma = r_chol.t().solve_triangular_into(rho, UPLO::Upper)?;

    // The determinant of R equals the squared product of the diagonal
    // elements of its Cholesky decomposition r_chol
    let n_obs: F = F::cast(x_distances.n_obs);
    let logdet = r_chol.diag().mapv(|v: F| v.log10()).sum() * F::cast(2.) / n_obs;

    // Reduced likelihood
    let sigma2 = rho_sqr / n_obs;
    let reduced_likelihood = -n_obs * (sigma2.sum().log10() + logdet);

    Ok((
        reduced_likelihood,
        GpInnerParams {
            sigma2: sigma2[0] * ytrain.std[0] * ytrain.std[0],
            beta,
            gamma,
            r_chol,
            ft,
            ft_qr_r,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation_models::*;
    use crate::mean_models::*;
    use approx::assert_abs_diff_eq;
    use argmin_testfunctions::rosenbrock;
    use linfa::prelude::Dataset;
    use linfa_linalg::norm::Norm;
    use mfbox_doe::{Lhs, SamplingMethod};
    use ndarray::{arr2, array, Array, Zip};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_stats::DeviationExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn xsinx(x: &Array2<f64>) -> Array1<f64> {
        ((x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())).remove_axis(Axis(1))
    }

    macro_rules! test_gp {
        ($regr:ident, $corr:ident) => {
            paste::paste! {
                #[test]
                fn [<test_gp_ $regr:snake _ $corr:snake >]() {
                    let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
                    let yt = xsinx(&xt);
                    let gp = GaussianProcess::<f64, [<$regr Mean>], [<$corr Corr>]>::params(
                        [<$regr Mean>]::default(),
                        [<$corr Corr>]::default(),
                    )
                    .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
                    .expect("GP fitted");

                    // interpolating model: training points are recovered
                    let yvals = gp.predict(&xt).expect("prediction");
                    assert_abs_diff_eq!(yt, yvals, epsilon = 1e-2);
                    // with an almost null variance
                    let yvars = gp.predict_var(&xt).expect("prediction");
                    assert_abs_diff_eq!(Array1::<f64>::zeros(xt.nrows()), yvars, epsilon = 1e-2);

                    // in between, predictions track the true function
                    let xv = arr2(&[[7.5], [16.]]);
                    let yv = gp.predict(&xv).expect("prediction");
                    assert_abs_diff_eq!(xsinx(&xv), yv, epsilon = 1.);

                    let (valvar_y, valvar_v) = gp.predict_valvar(&xv).expect("prediction");
                    assert_abs_diff_eq!(yv, valvar_y, epsilon = 1e-10);
                    assert!(valvar_v.iter().all(|v| *v >= 0.));
                }
            }
        };
    }

    test_gp!(Constant, SquaredExponential);
    test_gp!(Constant, AbsoluteExponential);
    test_gp!(Constant, Matern32);
    test_gp!(Constant, Matern52);

    test_gp!(Linear, SquaredExponential);
    test_gp!(Linear, Matern52);

    test_gp!(Quadratic, SquaredExponential);
    test_gp!(Quadratic, Matern32);

    #[test]
    fn test_kriging_shortcut() {
        let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .fit(&Dataset::new(xt.to_owned(), yt))
            .expect("Kriging fitted");
        assert_eq!((1, 1), gp.dims());
        assert!(gp.theta()[0] > 0.);
        assert!(gp.variance() > 0.);
    }

    #[test]
    fn test_fixed_theta() {
        let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .theta_tuning(ThetaTuning::Fixed(array![0.5]))
            .fit(&Dataset::new(xt, yt))
            .expect("Kriging fitted");
        assert_abs_diff_eq!(&array![0.5], gp.theta(), epsilon = 1e-12);
    }

    fn rosenb(x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array1<f64> {
        let mut y: Array1<f64> = Array1::zeros(x.nrows());
        Zip::from(&mut y)
            .and(x.rows())
            .for_each(|yi, xi| *yi = rosenbrock(&xi.to_vec()));
        y
    }

    #[test]
    fn test_gp_rosenbrock_2d() {
        let xlimits = array![[-1., 1.], [-1., 1.]];
        let xt = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(60);
        let yt = rosenb(&xt);

        let gp = GaussianProcess::<f64, ConstantMean, Matern52Corr>::params(
            ConstantMean::default(),
            Matern52Corr::default(),
        )
        .fit(&Dataset::new(xt, yt))
        .expect("GP fitted");

        let xv = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(0))
            .sample(50);
        let yv = rosenb(&xv);
        let ypred = gp.predict(&xv).expect("prediction");
        let err = ypred.l2_dist(&yv).unwrap() / yv.norm_l2();
        assert_abs_diff_eq!(err, 0., epsilon = 2e-1);
    }

    #[test]
    fn test_sample_reproducible() {
        let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .fit(&Dataset::new(xt, yt))
            .expect("Kriging fitted");

        let x = Array::linspace(0., 25., 30).insert_axis(Axis(1));
        let t1 = gp
            .sample_using(&x, 10, &mut Xoshiro256Plus::seed_from_u64(42))
            .expect("trajectories");
        let t2 = gp
            .sample_using(&x, 10, &mut Xoshiro256Plus::seed_from_u64(42))
            .expect("trajectories");
        assert_eq!((30, 10), t1.dim());
        assert_abs_diff_eq!(t1, t2, epsilon = 0.);
        assert!(t1.iter().all(|v| v.is_finite()));
    }
}
