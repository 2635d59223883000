use crate::errors::{MfkError, Result};
use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};

/// A multi-fidelity training set: one (inputs, outputs) pair per fidelity
/// level, ordered by increasing fidelity. The last level is the most
/// accurate one and is the reference when testing.
#[derive(Clone, Debug)]
pub struct MultiFidelityDataset {
    levels: Vec<(Array2<f64>, Array1<f64>)>,
}

impl MultiFidelityDataset {
    /// Build a dataset from per-level training sets, cheapest fidelity first.
    ///
    /// All levels must share the input dimension and pair each input row
    /// with one output value.
    pub fn new(levels: Vec<(Array2<f64>, Array1<f64>)>) -> Result<Self> {
        if levels.is_empty() {
            return Err(MfkError::InvalidValueError(
                "at least one fidelity level is required".to_string(),
            ));
        }
        let dim = levels[0].0.ncols();
        for (i, (x, y)) in levels.iter().enumerate() {
            if x.nrows() == 0 {
                return Err(MfkError::InvalidValueError(format!(
                    "fidelity level {i} has no training point"
                )));
            }
            if x.ncols() != dim {
                return Err(MfkError::InvalidValueError(format!(
                    "fidelity level {i} has dimension {} instead of {dim}",
                    x.ncols()
                )));
            }
            if x.nrows() != y.len() {
                return Err(MfkError::InvalidValueError(format!(
                    "fidelity level {i} has {} inputs for {} outputs",
                    x.nrows(),
                    y.len()
                )));
            }
        }
        Ok(MultiFidelityDataset { levels })
    }

    /// Number of fidelity levels
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Input dimension (without any fidelity column)
    pub fn dim(&self) -> usize {
        self.levels[0].0.ncols()
    }

    /// Training set of the given level
    pub fn level(&self, level: usize) -> (&Array2<f64>, &Array1<f64>) {
        let (x, y) = &self.levels[level];
        (x, y)
    }

    /// Training set of the highest fidelity level
    pub fn highest(&self) -> (&Array2<f64>, &Array1<f64>) {
        self.level(self.n_levels() - 1)
    }

    /// Iterate over the per-level training sets, cheapest first
    pub fn iter(&self) -> impl Iterator<Item = (&Array2<f64>, &Array1<f64>)> {
        self.levels.iter().map(|(x, y)| (x, y))
    }
}

/// Append the fidelity `level` index as a trailing column of `x`.
pub fn append_fidelity(x: &ArrayView2<f64>, level: usize) -> Array2<f64> {
    let tag = Array2::from_elem((x.nrows(), 1), level as f64);
    concatenate![Axis(1), x.to_owned(), tag]
}

/// Split the trailing fidelity column off `x`, returning the plain inputs
/// and the per-row fidelity levels checked against `n_levels`.
pub fn split_fidelity(x: &ArrayView2<f64>, n_levels: usize) -> Result<(Array2<f64>, Vec<usize>)> {
    if x.ncols() < 2 {
        return Err(MfkError::InvalidValueError(
            "expected at least one input column and the fidelity column".to_string(),
        ));
    }
    let plain = x.slice(ndarray::s![.., ..x.ncols() - 1]).to_owned();
    let mut levels = Vec::with_capacity(x.nrows());
    for v in x.column(x.ncols() - 1).iter() {
        let level = v.round();
        if level < 0. || (level - v).abs() > 1e-9 || level as usize >= n_levels {
            return Err(MfkError::InvalidValueError(format!(
                "bad fidelity index {v}, expected an integer in [0, {})",
                n_levels
            )));
        }
        levels.push(level as usize);
    }
    Ok((plain, levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_levels() -> MultiFidelityDataset {
        MultiFidelityDataset::new(vec![
            (array![[0.], [0.5], [1.]], array![1., 2., 3.]),
            (array![[0.], [1.]], array![1.5, 3.5]),
        ])
        .unwrap()
    }

    #[test]
    fn test_dataset_accessors() {
        let data = two_levels();
        assert_eq!(2, data.n_levels());
        assert_eq!(1, data.dim());
        assert_eq!(3, data.level(0).0.nrows());
        assert_eq!(2, data.highest().0.nrows());
        assert_eq!(2, data.iter().count());
    }

    #[test]
    fn test_dataset_dim_mismatch() {
        let res = MultiFidelityDataset::new(vec![
            (array![[0., 1.]], array![1.]),
            (array![[0.]], array![1.]),
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_dataset_xy_mismatch() {
        let res = MultiFidelityDataset::new(vec![(array![[0.], [1.]], array![1.])]);
        assert!(res.is_err());
    }

    #[test]
    fn test_fidelity_column_roundtrip() {
        let x = array![[0.1, 0.2], [0.3, 0.4]];
        let tagged = append_fidelity(&x.view(), 1);
        assert_eq!(3, tagged.ncols());
        let (plain, levels) = split_fidelity(&tagged.view(), 2).unwrap();
        assert_eq!(x, plain);
        assert_eq!(vec![1, 1], levels);
    }

    #[test]
    fn test_bad_fidelity_index() {
        let x = array![[0.1, 2.]];
        assert!(split_fidelity(&x.view(), 2).is_err());
        let x = array![[0.1, 0.5]];
        assert!(split_fidelity(&x.view(), 2).is_err());
    }
}
