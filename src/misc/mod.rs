//! Numeric helpers
mod func;

pub use func::*;
