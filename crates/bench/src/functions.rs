//! Synthetic multi-fidelity test functions and the benchmark registry.
//!
//! Each benchmark function comes with at least one published low-fidelity
//! companion; levels are ordered cheapest first and the last level is the
//! reference used for testing.

use ndarray::{array, Array1, Array2, ArrayView2, Zip};

/// A vectorized fidelity level: maps (n, nx) inputs to n output values
pub type FidelityFn = fn(&ArrayView2<f64>) -> Array1<f64>;

/// One fidelity level of a benchmark function
pub struct FidelityLevel {
    /// The function evaluated at this level
    pub f: FidelityFn,
    /// Number of training points drawn at this level
    pub n_train: usize,
    /// Standard deviation of the additive Gaussian noise applied to the
    /// scaled training outputs
    pub noise_std: f64,
}

/// The immutable configuration of one benchmark function
pub struct FunctionDescriptor {
    /// Benchmark name
    pub name: &'static str,
    /// Design space as a (nx, 2) matrix of [lower, upper] bounds
    pub xlimits: Array2<f64>,
    /// Fidelity levels, cheapest first; the last one is ground truth
    pub levels: Vec<FidelityLevel>,
    /// Scale dividing the raw outputs
    pub y_scale: f64,
    /// Whether to scale inputs by the standard deviation of the
    /// lowest-fidelity training draw
    pub scale_input: bool,
    /// Number of held-out test points
    pub n_test: usize,
}

impl FunctionDescriptor {
    /// Number of fidelity levels
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Input dimension
    pub fn dim(&self) -> usize {
        self.xlimits.nrows()
    }
}

/// The five benchmark functions with their sampling configurations
pub fn suite() -> Vec<FunctionDescriptor> {
    vec![
        FunctionDescriptor {
            name: "currin",
            xlimits: array![[0., 1.], [0., 1.]],
            levels: vec![
                FidelityLevel {
                    f: currin_lo,
                    n_train: 12,
                    noise_std: 0.05,
                },
                FidelityLevel {
                    f: currin,
                    n_train: 5,
                    noise_std: 0.,
                },
            ],
            y_scale: 1.,
            scale_input: false,
            n_test: 400,
        },
        FunctionDescriptor {
            name: "branin",
            xlimits: array![[-5., 10.], [0., 15.]],
            levels: vec![
                FidelityLevel {
                    f: branin_lo,
                    n_train: 80,
                    noise_std: 0.,
                },
                FidelityLevel {
                    f: branin_mid,
                    n_train: 30,
                    noise_std: 0.,
                },
                FidelityLevel {
                    f: branin,
                    n_train: 10,
                    noise_std: 0.,
                },
            ],
            y_scale: 100.,
            scale_input: true,
            n_test: 400,
        },
        FunctionDescriptor {
            name: "park",
            xlimits: array![[0., 1.], [0., 1.], [0., 1.], [0., 1.]],
            levels: vec![
                FidelityLevel {
                    f: park_lo,
                    n_train: 30,
                    noise_std: 0.,
                },
                FidelityLevel {
                    f: park,
                    n_train: 10,
                    noise_std: 0.,
                },
            ],
            y_scale: 10.,
            scale_input: false,
            n_test: 400,
        },
        FunctionDescriptor {
            name: "hartmann3",
            xlimits: array![[0., 1.], [0., 1.], [0., 1.]],
            levels: vec![
                FidelityLevel {
                    f: hartmann3_lo,
                    n_train: 60,
                    noise_std: 0.01,
                },
                FidelityLevel {
                    f: hartmann3,
                    n_train: 20,
                    noise_std: 0.,
                },
            ],
            y_scale: 1.,
            scale_input: false,
            n_test: 400,
        },
        FunctionDescriptor {
            name: "borehole",
            xlimits: array![
                [0.05, 0.15],
                [100., 50000.],
                [63070., 115600.],
                [990., 1110.],
                [63.1, 116.],
                [700., 820.],
                [1120., 1680.],
                [9855., 12045.]
            ],
            levels: vec![
                FidelityLevel {
                    f: borehole_lo,
                    n_train: 60,
                    noise_std: 0.,
                },
                FidelityLevel {
                    f: borehole,
                    n_train: 10,
                    noise_std: 0.,
                },
            ],
            y_scale: 100.,
            scale_input: true,
            n_test: 400,
        },
    ]
}

fn vectorize(x: &ArrayView2<f64>, f: impl Fn(&[f64]) -> f64) -> Array1<f64> {
    let mut y = Array1::zeros(x.nrows());
    Zip::from(&mut y).and(x.rows()).for_each(|yi, xi| {
        let row = xi.to_vec();
        *yi = f(&row);
    });
    y
}

// -- Currin exponential function (2d) --------------------------------------

fn currin_scalar(x1: f64, x2: f64) -> f64 {
    let factor = if x2 <= 0. {
        1.
    } else {
        1. - (-1. / (2. * x2)).exp()
    };
    let num = 2300. * x1.powi(3) + 1900. * x1.powi(2) + 2092. * x1 + 60.;
    let den = 100. * x1.powi(3) + 500. * x1.powi(2) + 4. * x1 + 20.;
    factor * num / den
}

/// Currin exponential function, the high-fidelity reference
pub fn currin(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| currin_scalar(xi[0], xi[1]))
}

/// Low-fidelity Currin: average of four high-fidelity evaluations shifted
/// by +-0.05 in each coordinate
pub fn currin_lo(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| {
        let (x1, x2) = (xi[0], xi[1]);
        let x2m = (x2 - 0.05).max(0.);
        0.25 * (currin_scalar(x1 + 0.05, x2 + 0.05)
            + currin_scalar(x1 + 0.05, x2m)
            + currin_scalar(x1 - 0.05, x2 + 0.05)
            + currin_scalar(x1 - 0.05, x2m))
    })
}

// -- Branin function (2d, three fidelity levels) ---------------------------

fn branin_scalar(x1: f64, x2: f64) -> f64 {
    use std::f64::consts::PI;
    let b = 5.1 / (4. * PI * PI);
    let c = 5. / PI;
    let t = 1. / (8. * PI);
    (x2 - b * x1 * x1 + c * x1 - 6.).powi(2) + 10. * (1. - t) * x1.cos() + 10.
}

fn branin_mid_scalar(x1: f64, x2: f64) -> f64 {
    10. * branin_scalar(x1, x2).sqrt() + 2. * (x1 - 0.5) - 3. * (3. * x2 - 1.) - 1.
}

/// Branin function, the high-fidelity reference
pub fn branin(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| branin_scalar(xi[0], xi[1]))
}

/// Medium-fidelity Branin after Perdikaris et al.
pub fn branin_mid(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| branin_mid_scalar(xi[0], xi[1]))
}

/// Low-fidelity Branin: medium fidelity at a shifted rescaled point
pub fn branin_lo(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| {
        branin_mid_scalar(1.2 * (xi[0] + 2.), 1.2 * (xi[1] + 2.)) - 3. * xi[1] + 1.
    })
}

// -- Park function (4d) ----------------------------------------------------

fn park_scalar(x: &[f64]) -> f64 {
    let x1 = x[0].max(1e-10);
    let (x2, x3, x4) = (x[1], x[2], x[3]);
    let a = x1 / 2. * ((1. + (x2 + x3 * x3) * x4 / (x1 * x1)).sqrt() - 1.);
    let b = (x1 + 3. * x4) * (1. + x3.sin()).exp();
    a + b
}

/// Park function, the high-fidelity reference
pub fn park(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, park_scalar)
}

/// Low-fidelity Park: a biased modulation of the high-fidelity output
pub fn park_lo(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| {
        (1. + xi[0].sin() / 10.) * park_scalar(xi) - 2. * xi[0] + xi[1] * xi[1] + xi[2] * xi[2]
            + 0.5
    })
}

// -- Hartmann function (3d) ------------------------------------------------

const HARTMANN3_A: [[f64; 3]; 4] = [
    [3., 10., 30.],
    [0.1, 10., 35.],
    [3., 10., 30.],
    [0.1, 10., 35.],
];

const HARTMANN3_P: [[f64; 3]; 4] = [
    [0.3689, 0.1170, 0.2673],
    [0.4699, 0.4387, 0.7470],
    [0.1091, 0.8732, 0.5547],
    [0.0381, 0.5743, 0.8828],
];

fn hartmann3_scalar(x: &[f64], alpha: &[f64; 4]) -> f64 {
    let mut sum = 0.;
    for i in 0..4 {
        let mut inner = 0.;
        for j in 0..3 {
            let d = x[j] - HARTMANN3_P[i][j];
            inner += HARTMANN3_A[i][j] * d * d;
        }
        sum += alpha[i] * (-inner).exp();
    }
    -sum
}

/// Hartmann 3d function, the high-fidelity reference
pub fn hartmann3(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| hartmann3_scalar(xi, &[1.0, 1.2, 3.0, 3.2]))
}

/// Low-fidelity Hartmann 3d with perturbed alpha coefficients
pub fn hartmann3_lo(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| hartmann3_scalar(xi, &[1.01, 1.19, 2.9, 3.3]))
}

// -- Borehole function (8d) ------------------------------------------------

/// Borehole water-flow function, the high-fidelity reference
pub fn borehole(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| {
        let (rw, r, tu, hu, tl, hl, l, kw) =
            (xi[0], xi[1], xi[2], xi[3], xi[4], xi[5], xi[6], xi[7]);
        let lg = (r / rw).ln();
        let num = 2. * std::f64::consts::PI * tu * (hu - hl);
        let den = lg * (1. + 2. * l * tu / (lg * rw * rw * kw) + tu / tl);
        num / den
    })
}

/// Low-fidelity borehole approximation
pub fn borehole_lo(x: &ArrayView2<f64>) -> Array1<f64> {
    vectorize(x, |xi| {
        let (rw, r, tu, hu, tl, hl, l, kw) =
            (xi[0], xi[1], xi[2], xi[3], xi[4], xi[5], xi[6], xi[7]);
        let lg = (r / rw).ln();
        let num = 5. * tu * (hu - hl);
        let den = lg * (1.5 + 2. * l * tu / (lg * rw * rw * kw) + tu / tl);
        num / den
    })
}
