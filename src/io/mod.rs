pub mod input;
pub mod output;
pub mod table;

pub use input::*;
pub use output::*;
pub use table::*;
