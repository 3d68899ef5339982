//! Numeric building blocks: feature scaling, activations, distances.

pub mod activation;
pub mod distance;
pub mod scaler;

pub use activation::*;
pub use distance::*;
pub use scaler::*;
