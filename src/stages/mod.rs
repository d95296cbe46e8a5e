pub mod stage0_load;
pub mod stage1_extract;
pub mod stage2_aggregate;
pub mod stage3_render;

pub use stage0_load::*;
pub use stage1_extract::*;
pub use stage2_aggregate::*;
pub use stage3_render::*;
