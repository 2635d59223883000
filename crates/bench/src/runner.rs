//! The benchmark driver: per-seed data regeneration, model training,
//! scoring and running-average reporting.

use crate::data::generate;
use crate::functions::FunctionDescriptor;
use crate::metrics::{score, Scores};
use mfbox_mfk::{
    DeepMultiFidelityGp, HighFidelityGp, LinearAutoRegressive, MfSurrogateParams,
    NonLinearAutoRegressive, Result,
};

/// The fixed seeds every benchmark function is repeated over
pub const BENCH_SEEDS: [u64; 5] = [0, 1, 2, 3, 4];

/// The four competing surrogates, rebuilt for each run so the Monte-Carlo
/// models are seeded with the run seed
pub fn competitors(seed: u64) -> Vec<(&'static str, Box<dyn MfSurrogateParams>)> {
    vec![
        ("high-fidelity-gp", Box::new(HighFidelityGp::params())),
        ("linear-ar", Box::new(LinearAutoRegressive::params())),
        (
            "nargp",
            Box::new(NonLinearAutoRegressive::params().seed(Some(seed))),
        ),
        (
            "mf-deep-gp",
            Box::new(DeepMultiFidelityGp::params().seed(Some(seed))),
        ),
    ]
}

/// Run one benchmark function over the standard seeds, printing running
/// averages, and return the final per-model average scores.
///
/// There is no retry: any model training failure propagates and halts
/// the benchmark.
pub fn run_function(desc: &FunctionDescriptor) -> Result<Vec<(&'static str, Scores)>> {
    run_function_seeds(desc, &BENCH_SEEDS)
}

/// Same as [run_function] with explicit seeds.
pub fn run_function_seeds(
    desc: &FunctionDescriptor,
    seeds: &[u64],
) -> Result<Vec<(&'static str, Scores)>> {
    println!(
        "\n=== {} ({}d, {} fidelity levels, {} test points) ===",
        desc.name,
        desc.dim(),
        desc.n_levels(),
        desc.n_test
    );
    let names: Vec<&'static str> = competitors(0).into_iter().map(|(name, _)| name).collect();
    let mut history: Vec<Vec<Scores>> = vec![Vec::with_capacity(seeds.len()); names.len()];

    for (done, &seed) in seeds.iter().enumerate() {
        let data = generate(desc, seed)?;
        for (k, (name, params)) in competitors(seed).into_iter().enumerate() {
            let model = params.train(&data.train)?;
            let (mean, var) = model.predict_valvar(&data.x_test.view())?;
            let s = score(&data.y_test, &mean, &var);
            log::info!(
                "{}/seed {}: {} r2={:.4} rmse={:.4} mnll={:.4}",
                desc.name,
                seed,
                name,
                s.r2,
                s.rmse,
                s.mnll
            );
            history[k].push(s);
        }
        let averages: Vec<(&'static str, Scores)> = names
            .iter()
            .zip(history.iter())
            .map(|(name, scores)| (*name, Scores::mean(scores)))
            .collect();
        print_table(done + 1, &averages);
    }

    Ok(names
        .iter()
        .zip(history.iter())
        .map(|(name, scores)| (*name, Scores::mean(scores)))
        .collect())
}

/// Print the running per-model averages as an aligned table
fn print_table(n_seeds: usize, rows: &[(&'static str, Scores)]) {
    println!("-- averages over {n_seeds} seed(s)");
    println!(
        "{:<20} {:>10} {:>10} {:>10}",
        "model", "R2", "RMSE", "MNLL"
    );
    for (name, s) in rows {
        println!(
            "{:<20} {:>10.4} {:>10.4} {:>10.4}",
            name, s.r2, s.rmse, s.mnll
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{FidelityLevel, FunctionDescriptor};
    use ndarray::{array, Array1, ArrayView2, Axis};

    fn forrester_hi(x: &ArrayView2<f64>) -> Array1<f64> {
        x.mapv(|v| (6. * v - 2.).powi(2) * (12. * v - 4.).sin())
            .remove_axis(Axis(1))
            .to_owned()
    }

    fn forrester_lo(x: &ArrayView2<f64>) -> Array1<f64> {
        let a = forrester_hi(x);
        let b = x
            .mapv(|v| 10. * (v - 0.5) - 5.)
            .remove_axis(Axis(1))
            .to_owned();
        a.mapv(|v| 0.5 * v) + b
    }

    fn forrester_descriptor() -> FunctionDescriptor {
        FunctionDescriptor {
            name: "forrester",
            xlimits: array![[0., 1.]],
            levels: vec![
                FidelityLevel {
                    f: forrester_lo,
                    n_train: 11,
                    noise_std: 0.,
                },
                FidelityLevel {
                    f: forrester_hi,
                    n_train: 6,
                    noise_std: 0.,
                },
            ],
            y_scale: 1.,
            scale_input: false,
            n_test: 30,
        }
    }

    #[test]
    fn test_single_seed_benchmark() {
        let desc = forrester_descriptor();
        let report = run_function_seeds(&desc, &[0]).expect("benchmark run");
        assert_eq!(4, report.len());
        for (name, s) in &report {
            assert!(s.r2.is_finite(), "{name} r2 not finite");
            assert!(s.rmse.is_finite() && s.rmse >= 0., "{name} bad rmse");
            assert!(s.mnll.is_finite(), "{name} mnll not finite");
        }
        // the multi-fidelity chain sees the low-fidelity trend and
        // dominates randomness-free on this classic pair
        let linear = report.iter().find(|(n, _)| *n == "linear-ar").unwrap().1;
        assert!(linear.r2 > 0.5, "linear-ar r2 = {}", linear.r2);
    }

    #[test]
    fn test_competitor_lineup() {
        let lineup = competitors(0);
        let names: Vec<_> = lineup.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            vec!["high-fidelity-gp", "linear-ar", "nargp", "mf-deep-gp"],
            names
        );
    }
}
