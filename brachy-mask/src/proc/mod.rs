//! 掩膜处理流水线.
//!
//! 各阶段依次为: 校验 -> 清洗 -> 重采样 -> 视野 -> 裁剪 -> 粗化 -> 针模板.
//! 每个阶段都是对上一阶段输出的纯变换, 可以单独调用,
//! 也可以通过 [`MaskProcessor`] 一次性完成.

mod clean;
mod coarsen;
mod fov;
mod needle;
mod pipeline;
mod refine;
mod validate;

pub use clean::clean;
pub use coarsen::{block_votes, coarsen, crop, VoteCounts, VotePolicy, VoteRule};
pub use fov::{field_of_view, padded_extent, FieldOfView};
pub use needle::{needle_positions, needle_template, NeedleLattice};
pub use pipeline::{MaskProcessor, ProcessParams};
pub use refine::{boundary_index, is_distorting, refine, refined_dim, TargetPitch};
pub use validate::validate;
