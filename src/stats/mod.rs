pub mod correlation;
pub mod histogram;

pub use correlation::*;
pub use histogram::*;
