use crate::utils::{cdist, pdist};
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{s, Array, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::{
    rand::seq::SliceRandom, rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt,
};
use ndarray_stats::QuantileExt;
use rand_xoshiro::Xoshiro256Plus;
use std::cmp;

/// Kinds of Latin Hypercube Design
#[derive(Clone, Copy, Debug, Default)]
pub enum LhsKind {
    /// sample is chosen randomly within its latin hypercube interval
    Classic,
    /// sample is the middle of its latin hypercube interval
    Centered,
    /// minimal distance between points is maximized over random designs
    Maximin,
    /// middle of the intervals and minimal distance between points maximized
    CenteredMaximin,
    /// point locations optimized with the Enhanced Stochastic Evolutionary algorithm (ESE).
    /// See Jin, R. and Chen, W. and Sudjianto, A. (2005), "An efficient algorithm for constructing
    /// optimal design of computer experiments." Journal of Statistical Planning and Inference, 134:268-287.
    #[default]
    Optimized,
}

/// The LHS design is built as follows: each dimension space is divided into
/// ns sections where ns is the number of sampling points, and one point is
/// selected in each section. The selection method gives the kind of LHS (see [LhsKind]).
pub struct Lhs<F: Float, R: Rng + Clone> {
    /// Sampling space definition as a (nx, 2) matrix
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of x
    xlimits: Array2<F>,
    /// The requested kind of LHS
    kind: LhsKind,
    /// Random generator used for reproducibility (not used by Centered LHS)
    rng: R,
}

/// LHS with default random generator
impl<F: Float> Lhs<F, Xoshiro256Plus> {
    /// Constructor given a (nx, 2) design space \[\[lower bound, upper bound\], ...\]
    ///
    /// ```
    /// use mfbox_doe::Lhs;
    /// use ndarray::arr2;
    ///
    /// let doe = Lhs::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        Self::new_with_rng(xlimits, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> SamplingMethod<F> for Lhs<F, R> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let mut rng = self.rng.clone();
        match &self.kind {
            LhsKind::Classic => self.classic_lhs(ns, &mut rng),
            LhsKind::Centered => self.centered_lhs(ns, &mut rng),
            LhsKind::Maximin => self.maximin_lhs(ns, &mut rng, false, 5),
            LhsKind::CenteredMaximin => self.maximin_lhs(ns, &mut rng, true, 5),
            LhsKind::Optimized => {
                let doe = self.classic_lhs(ns, &mut rng);
                let nx = self.xlimits.nrows();
                let outer_loop = cmp::min((1.5 * nx as f64) as usize, 30);
                let inner_loop = cmp::min(20 * nx, 100);
                self.maximin_ese(&doe, outer_loop, inner_loop, &mut rng)
            }
        }
    }
}

impl<F: Float, R: Rng + Clone> Lhs<F, R> {
    /// Constructor with given design space and random generator.
    /// * `xlimits`: (nx, 2) matrix where the ith row is the definition
    ///   interval of the ith component of x.
    /// * `rng`: random generator used by all kinds but [LhsKind::Centered]
    pub fn new_with_rng(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, rng: R) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        Lhs {
            xlimits: xlimits.to_owned(),
            kind: LhsKind::default(),
            rng,
        }
    }

    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Lhs<F, R2> {
        Lhs {
            xlimits: self.xlimits,
            kind: self.kind,
            rng,
        }
    }

    fn classic_lhs(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let cut = Array::linspace(0., 1., ns + 1);

        let rnd = Array::random_using((ns, nx), Uniform::new(0., 1.), rng);
        let a = cut.slice(s![..ns]).to_owned();
        let b = cut.slice(s![1..(ns + 1)]);
        let c = &b - &a;
        let mut lhs = Array::zeros((ns, nx));
        for j in 0..nx {
            // one point drawn uniformly in each stratum, then strata shuffled
            let mut colj = (rnd.column(j).to_owned() * &c + &a).to_vec();
            colj.shuffle(rng);
            lhs.column_mut(j).assign(&Array::from_vec(colj));
        }
        lhs.mapv(F::cast)
    }

    fn centered_lhs(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let cut = Array::linspace(0., 1., ns + 1);

        let a = cut.slice(s![..ns]).to_owned();
        let b = cut.slice(s![1..(ns + 1)]);
        let c = (a + b) / 2.;
        let mut lhs = Array::zeros((ns, nx));
        for j in 0..nx {
            let mut colj = c.to_vec();
            colj.shuffle(rng);
            lhs.column_mut(j).assign(&Array::from_vec(colj));
        }
        lhs.mapv(F::cast)
    }

    fn maximin_lhs(&self, ns: usize, rng: &mut R, centered: bool, n_iter: usize) -> Array2<F> {
        let mut max_dist = F::zero();
        let mut best = self.classic_lhs(ns, rng);
        for _ in 0..n_iter {
            let lhs = if centered {
                self.centered_lhs(ns, rng)
            } else {
                self.classic_lhs(ns, rng)
            };
            let d_min = F::cast(*pdist(&lhs).min().unwrap());
            if max_dist < d_min {
                max_dist = d_min;
                best = lhs;
            }
        }
        best
    }

    fn maximin_ese(
        &self,
        lhs: &Array2<F>,
        outer_loop: usize,
        inner_loop: usize,
        rng: &mut R,
    ) -> Array2<F> {
        // ESE hyperparameters from Jin et al.
        let j_range = 20;
        let p = F::cast(10.);
        let t0 = F::cast(0.005) * self.phip(lhs, p);
        let tol = F::cast(1e-3);

        let mut t = t0;
        let mut lhs_own = lhs.to_owned();
        let mut lhs_best = lhs_own.to_owned();
        let nx = lhs.ncols();
        let mut phip = self.phip(&lhs_best, p);
        let mut phip_best = phip;

        for _ in 0..outer_loop {
            let mut n_acpt = 0.;
            let mut n_imp = 0.;

            for i in 0..inner_loop {
                let modulo = (i + 1) % nx;
                let mut l_x: Vec<Array2<F>> = Vec::with_capacity(j_range);
                let mut l_phip: Vec<F> = Vec::with_capacity(j_range);

                // build j_range candidate plans, each differing by a single column swap
                for j in 0..j_range {
                    l_x.push(lhs_own.to_owned());
                    let phi = self.phip_swap(&mut l_x[j], modulo, phip, p, rng);
                    l_phip.push(phi);
                }
                let lphip = Array::from_vec(l_phip);
                let k = lphip.argmin().unwrap();
                let phip_try = lphip[k];
                // simulated-annealing style acceptance threshold
                if phip_try - phip <= t * F::cast(rng.gen::<f64>()) {
                    phip = phip_try;
                    n_acpt += 1.;
                    lhs_own = l_x[k].to_owned();

                    if phip < phip_best {
                        lhs_best = lhs_own.to_owned();
                        phip_best = phip;
                        n_imp += 1.;
                    }
                }
            }
            let p_accpt = n_acpt / (inner_loop as f64); // probability of acceptance
            let p_imp = n_imp / (inner_loop as f64); // probability of improvement

            if phip_best - phip < tol {
                if p_accpt >= 0.1 && p_imp < p_accpt {
                    t *= F::cast(0.8)
                } else if p_accpt >= 0.1 && (p_imp - p_accpt).abs() < f64::EPSILON {
                } else {
                    t /= F::cast(0.8)
                }
            } else if p_accpt <= 0.1 {
                t /= F::cast(0.7)
            } else {
                t *= F::cast(0.9)
            }
        }
        lhs_best
    }

    fn phip(&self, lhs: &ArrayBase<impl Data<Elem = F>, Ix2>, p: F) -> F {
        F::powf(pdist(lhs).mapv(|v| F::powf(v, -p)).sum(), F::one() / p)
    }

    fn phip_swap(&self, x: &mut Array2<F>, k: usize, phip: F, p: F, rng: &mut R) -> F {
        // Choose two distinct random rows
        let i1 = rng.gen_range(0..x.nrows());
        let mut i2 = rng.gen_range(0..x.nrows());
        while i2 == i1 {
            i2 = rng.gen_range(0..x.nrows());
        }
        // Incremental phip update: only distances involving rows i1, i2 change
        let mut x_rest = Array2::zeros((x.nrows() - 2, x.ncols()));
        let mut row_i = 0;
        for (i, row) in x.axis_iter(Axis(0)).enumerate() {
            if i != i1 && i != i2 {
                x_rest.slice_mut(s![row_i, ..]).assign(&row);
                row_i += 1;
            }
        }

        let mut dist1 = cdist(&x.slice(s![i1..i1 + 1, ..]), &x_rest);
        let mut dist2 = cdist(&x.slice(s![i2..i2 + 1, ..]), &x_rest);

        let m1 = (x_rest.slice(s![.., k]).to_owned() - x.slice(s![i1..i1 + 1, k])).map(|v| *v * *v);
        let m2 = (x_rest.slice(s![.., k]).to_owned() - x.slice(s![i2..i2 + 1, k])).map(|v| *v * *v);

        let two = F::cast(2.);
        let mut d1 = dist1.mapv(|v| v * v) - &m1 + &m2;
        d1.mapv_inplace(|v| F::powf(v, -p / two));
        let mut d2 = dist2.mapv(|v| v * v) + &m1 - &m2;
        d2.mapv_inplace(|v| F::powf(v, -p / two));

        dist1.mapv_inplace(|v| F::powf(v, -p));
        dist2.mapv_inplace(|v| F::powf(v, -p));
        let mut res = (d1 - dist1).sum();
        res += (d2 - dist2).sum();
        res = F::powf(F::powf(phip, p) + res, F::one() / p);

        // swap points
        x.swap([i1, k], [i2, k]);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, Array1};
    use ndarray_rand::rand::SeedableRng;

    fn assert_latin(samples: &Array2<f64>, xlimits: &Array2<f64>) {
        let ns = samples.nrows();
        for j in 0..samples.ncols() {
            let (lo, up) = (xlimits[[j, 0]], xlimits[[j, 1]]);
            let width = (up - lo) / ns as f64;
            let mut strata: Vec<usize> = samples
                .column(j)
                .iter()
                .map(|v| (((v - lo) / width) as usize).min(ns - 1))
                .collect();
            strata.sort_unstable();
            // one point per stratum in every dimension
            assert_eq!((0..ns).collect::<Vec<_>>(), strata);
        }
    }

    #[test]
    fn test_classic_lhs_is_latin() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        let samples = Lhs::new(&xlimits)
            .kind(LhsKind::Classic)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(10);
        assert_latin(&samples, &xlimits);
    }

    #[test]
    fn test_centered_lhs_midpoints() {
        let xlimits = arr2(&[[0., 1.], [5., 10.]]);
        let samples = Lhs::new(&xlimits)
            .kind(LhsKind::Centered)
            .with_rng(Xoshiro256Plus::seed_from_u64(0))
            .sample(5);
        for j in 0..2 {
            let mut col = samples.column(j).to_vec();
            col.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let (lo, up) = (xlimits[[j, 0]], xlimits[[j, 1]]);
            let expected = Array1::linspace(lo + 0.1 * (up - lo), up - 0.1 * (up - lo), 5);
            assert_abs_diff_eq!(expected, Array1::from_vec(col), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_optimized_lhs_is_latin() {
        let xlimits = arr2(&[[0., 1.], [0., 1.]]);
        let samples = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(8);
        assert_latin(&samples, &xlimits);
    }

    #[test]
    fn test_same_seed_same_design() {
        let xlimits = arr2(&[[-2., 2.], [3., 4.], [0., 1.]]);
        let s1 = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(7))
            .sample(6);
        let s2 = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(7))
            .sample(6);
        assert_abs_diff_eq!(s1, s2, epsilon = 0.);
    }

    #[test]
    fn test_maximin_lhs_is_latin() {
        let xlimits = arr2(&[[0., 1.], [0., 1.]]);
        let samples = Lhs::new(&xlimits)
            .kind(LhsKind::Maximin)
            .with_rng(Xoshiro256Plus::seed_from_u64(1))
            .sample(10);
        assert_latin(&samples, &xlimits);
    }

    #[test]
    #[should_panic]
    fn test_bad_xlimits() {
        let xlimits = arr2(&[[0.], [1.]]);
        let _ = Lhs::new(&xlimits).sample(5);
    }
}
