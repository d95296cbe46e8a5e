pub mod routine;

pub use routine::*;
