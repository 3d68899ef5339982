//! Feature preparation: raw form values -> validated vector -> model order.

pub mod normalize;
pub mod order;

pub use normalize::*;
pub use order::*;
