//! This library implements [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process)
//! regression also known as [Kriging](https://en.wikipedia.org/wiki/Kriging),
//! the building block of the multi-fidelity surrogates of `mfbox-mfk`.
//!
//! GP models are implemented by [GaussianProcess] parameterized by [GpParams]:
//! the mean term is a small polynomial regression model and the error term a
//! stationary correlation kernel whose `theta` hyperparameters are estimated
//! by maximising the reduced likelihood with a multistart COBYLA optimizer.
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
pub mod correlation_models;
mod errors;
pub mod mean_models;

mod optimization;
mod parameters;
mod utils;

pub use algorithm::*;
pub use errors::*;
pub use parameters::*;
pub use utils::{normalize, DiffMatrix, NormalizedData};
