pub mod debate;
pub mod metrics;
pub mod series;
pub mod task;
pub mod turn;

pub use debate::*;
pub use metrics::*;
pub use series::*;
pub use task::*;
pub use turn::*;
