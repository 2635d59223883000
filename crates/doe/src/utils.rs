use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix2, NdFloat};
use ndarray_stats::DeviationExt;
use num_traits::Signed;

/// Pairwise euclidean distances between the rows of `x`, flattened in
/// row-major upper-triangle order as a `(n * (n - 1) / 2,)` vector.
pub fn pdist<F: NdFloat + Signed>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
    let nrows = x.nrows();
    let size: usize = (nrows - 1) * nrows / 2;
    let mut res: Array1<F> = Array1::zeros(size);
    let mut k = 0;
    for i in 0..nrows {
        for j in (i + 1)..nrows {
            let a = x.slice(s![i, ..]);
            let b = x.slice(s![j, ..]);
            res[k] = F::from(a.l2_dist(&b).unwrap()).unwrap();
            k += 1;
        }
    }
    res
}

/// Euclidean distances between each row of `xa` and each row of `xb`
/// as a `(nrows(xa), nrows(xb))` matrix.
pub fn cdist<F: NdFloat + Signed>(
    xa: &ArrayBase<impl Data<Elem = F>, Ix2>,
    xb: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array2<F> {
    let ma = xa.nrows();
    let mb = xb.nrows();
    if xa.ncols() != xb.ncols() {
        panic!(
            "cdist: operands should have same nb of columns. Found {} and {}",
            xa.ncols(),
            xb.ncols()
        );
    }
    let mut res = Array2::zeros((ma, mb));
    for i in 0..ma {
        for j in 0..mb {
            let a = xa.slice(s![i, ..]);
            let b = xb.slice(s![j, ..]);
            res[[i, j]] = F::from(a.l2_dist(&b).unwrap()).unwrap();
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pdist() {
        let x = array![[0., 0.], [3., 4.], [3., 0.]];
        let d = pdist(&x);
        assert_abs_diff_eq!(array![5., 3., 4.], d, epsilon = 1e-12);
    }

    #[test]
    fn test_cdist() {
        let xa = array![[0., 0.], [1., 1.]];
        let xb = array![[0., 1.], [0., 0.]];
        let d = cdist(&xa, &xb);
        assert_abs_diff_eq!(array![[1., 0.], [1., f64::sqrt(2.)]], d, epsilon = 1e-12);
    }
}
