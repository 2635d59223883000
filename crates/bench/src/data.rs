//! Training/test data generation for the benchmark.
//!
//! For each fidelity level an independent Latin hypercube design is drawn;
//! the function is always evaluated at the raw (unscaled) inputs while the
//! stored training inputs may be scaled by the standard deviation of the
//! lowest-fidelity draw. Outputs are divided by the configured scale and
//! perturbed by per-level Gaussian noise; the held-out test set is
//! noise-free and tagged with the highest fidelity index.

use crate::functions::FunctionDescriptor;
use mfbox_doe::{Lhs, SamplingMethod};
use mfbox_mfk::{append_fidelity, MultiFidelityDataset, Result};
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256Plus;

/// One benchmark run dataset: per-fidelity training sets plus a held-out
/// test set at the highest fidelity
pub struct BenchmarkData {
    /// Per-fidelity training sets, inputs scaled when requested
    pub train: MultiFidelityDataset,
    /// Scaled test inputs with the trailing highest-fidelity index column
    pub x_test: Array2<f64>,
    /// Scaled noise-free test outputs
    pub y_test: Array1<f64>,
}

/// Generate the training and test data of one benchmark run.
///
/// The seed drives every random draw: designs, noise and the test set.
pub fn generate(desc: &FunctionDescriptor, seed: u64) -> Result<BenchmarkData> {
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);

    // one independent design per fidelity level
    let mut raw: Vec<Array2<f64>> = Vec::with_capacity(desc.n_levels());
    for level in &desc.levels {
        let design_rng = rng.clone();
        rng.jump();
        raw.push(
            Lhs::new(&desc.xlimits)
                .with_rng(design_rng)
                .sample(level.n_train),
        );
    }
    let test_rng = rng.clone();
    rng.jump();
    let x_test_raw = Lhs::new(&desc.xlimits).with_rng(test_rng).sample(desc.n_test);

    // input scaling factors from the lowest-fidelity draw, applied to every
    // level and to the test inputs
    let x_std = if desc.scale_input {
        let mut std = raw[0].std_axis(Axis(0), 1.);
        std.mapv_inplace(|v| if v == 0. { 1. } else { v });
        Some(std)
    } else {
        None
    };
    let scale = |x: &Array2<f64>| match &x_std {
        Some(std) => x / std,
        None => x.to_owned(),
    };

    let mut levels = Vec::with_capacity(desc.n_levels());
    for (level, x_raw) in desc.levels.iter().zip(raw.iter()) {
        // evaluate at the raw inputs, store the scaled ones
        let mut y = (level.f)(&x_raw.view()).mapv(|v| v / desc.y_scale);
        if level.noise_std > 0. {
            y.mapv_inplace(|v| {
                let eps: f64 = rng.sample(StandardNormal);
                v + level.noise_std * eps
            });
        }
        levels.push((scale(x_raw), y));
    }
    let train = MultiFidelityDataset::new(levels)?;

    let highest = desc.n_levels() - 1;
    let y_test = (desc.levels[highest].f)(&x_test_raw.view()).mapv(|v| v / desc.y_scale);
    let x_test = append_fidelity(&scale(&x_test_raw).view(), highest);

    Ok(BenchmarkData {
        train,
        x_test,
        y_test,
    })
}
