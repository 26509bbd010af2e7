//! 运行时错误.

use thiserror::Error;

use crate::data::{DType, Organ};

/// 掩膜处理流水线的结构性错误.
///
/// 这类错误意味着调用者违反了输入约定, 流水线会立即终止, 不做任何重试.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ArrayError {
    /// 掩膜不是三维的.
    #[error("{organ} 掩膜为 {ndim} 维, 期望 3 维")]
    DimensionMismatch {
        /// 出错的器官.
        organ: Organ,
        /// 实际维数.
        ndim: usize,
    },

    /// 掩膜形状与前列腺掩膜不一致.
    #[error("{organ} 掩膜形状为 {found:?}, 与 {expected:?} 不一致")]
    ShapeMismatch {
        /// 出错的器官.
        organ: Organ,
        /// 期望形状 (以前列腺掩膜为准).
        expected: Vec<usize>,
        /// 实际形状.
        found: Vec<usize>,
    },

    /// 掩膜元素不是布尔值.
    #[error("{organ} 掩膜元素类型为 {dtype}, 期望 bool")]
    TypeMismatch {
        /// 出错的器官.
        organ: Organ,
        /// 实际元素类型.
        dtype: DType,
    },

    /// 切片的行数或列数为 0.
    #[error("掩膜形状 {shape:?} 的切片为空")]
    EmptyGrid {
        /// 实际形状.
        shape: Vec<usize>,
    },

    /// 网格尺寸不是有限正数.
    #[error("{axis} 方向网格尺寸 {value} cm 无效")]
    InvalidPitch {
        /// 出错的方向, `'x'`, `'y'` 或 `'z'`.
        axis: char,
        /// 实际值.
        value: f64,
    },

    /// 所有掩膜均不含任何器官体素, 视野无法定义.
    #[error("掩膜中没有任何器官体素")]
    NoContent,

    /// 粗化因子为 0.
    #[error("粗化因子不能为 0")]
    ZeroFactor,

    /// 投票策略中某个器官没有对应的规则.
    #[error("投票策略缺少 {organ} 的规则")]
    MissingRule {
        /// 缺少规则的器官.
        organ: Organ,
    },

    /// 针道间距为 0.
    #[error("针道间距不能为 0")]
    ZeroNeedlePitch,
}
