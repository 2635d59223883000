/*!
This library implements the [Latin Hypercube sampling](https://en.wikipedia.org/wiki/Latin_hypercube_sampling)
design-of-experiments method used to generate training and test sets for
surrogate model benchmarking.

A sampling method generates a set of points (a DoE) within a design space
`xlimits` given as a 2D ndarray `(nx, 2)` specifying the lower and upper
bound of each of the `nx` components of a sample `x`.

Example:
```
use mfbox_doe::{Lhs, LhsKind, SamplingMethod};
use ndarray::arr2;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// Design space is [5., 10.] x [0., 1.], samples are 2-dimensional.
let xlimits = arr2(&[[5., 10.], [0., 1.]]);
// Five samples using centered Latin hypercube sampling with a seeded generator.
let samples = Lhs::new(&xlimits)
    .kind(LhsKind::Centered)
    .with_rng(Xoshiro256Plus::seed_from_u64(42))
    .sample(5);
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod lhs;
mod traits;
mod utils;

pub use lhs::*;
pub use traits::*;
