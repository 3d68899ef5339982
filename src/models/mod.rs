//! Classifier implementations.
//!
//! - `knn`: distance-based model (unscaled inputs)
//! - `forest`: tree-ensemble model (unscaled inputs)
//! - `network`: neural network behind its training-time min-max scaler
//!
//! All three implement `Classifier` so the ensemble runner can stay generic.

pub mod forest;
pub mod knn;
pub mod model;
pub mod network;

#[cfg(test)]
pub(crate) mod fixtures;

pub use forest::*;
pub use knn::*;
pub use model::*;
pub use network::*;
