#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 将超声切片上手工勾画的器官掩膜 (前列腺, 尿道, 边缘, 直肠)
//! 转换为可供下游剂量优化算法使用的、空间归一化的体素表示.
//!
//! 该 crate 只负责掩膜处理流水线本身, 不负责交互式勾画、图像文件读取或结果落盘.
//! 调用者提供已解析的三维布尔掩膜与网格尺寸 (厘米), 并自行保存输出.
//!
//! # 流水线
//!
//! ### 结构校验 ✅
//!
//! 四个掩膜必须均为三维、形状一致且元素为布尔值. 失败即终止.
//!
//! 实现位于 `brachy-mask/src/proc/validate.rs`.
//!
//! ### 掩膜清洗 ✅
//!
//! 按 **尿道 > 直肠 > 前列腺/边缘** 的优先级去除重叠标签.
//! 尿道与直肠之间的重叠不做处理, 这是刻意保留的已知行为.
//!
//! 实现位于 `brachy-mask/src/proc/clean.rs`.
//!
//! ### 重采样 (精化) ✅
//!
//! 以最近邻盒式采样的方式, 将任意像素尺寸映射到 0.01 cm 的标准精细网格.
//! 原始像素在两个方向上都比目标更精细时输出 "失真" 警告, 但不阻断流程.
//!
//! 实现位于 `brachy-mask/src/proc/refine.rs`.
//!
//! ### 视野 (FOV) ✅
//!
//! 求包含任意器官体素的最小包围盒, 并在高端补齐到粗化因子的整数倍.
//! 全空输入返回 [`ArrayError::NoContent`].
//!
//! 实现位于 `brachy-mask/src/proc/fov.rs`.
//!
//! ### 粗化 ✅
//!
//! 裁剪到视野后, 以 10 x 10 的块为单位投票, 得到 0.1 cm 的粒子尺度体素.
//!
//! 实现位于 `brachy-mask/src/proc/coarsen.rs`.
//!
//! ### 针模板 ✅
//!
//! 与粗网格对齐的 0.5 cm 间距插针格点.
//!
//! 实现位于 `brachy-mask/src/proc/needle.rs`.
//!
//! # 坐标约定
//!
//! 所有三维网格按 `(z, h, w)` 即 (切片, 行, 列) 访问. 网格尺寸 `MeshSpec`
//! 中的 `x` 对应列方向 (`w`), `y` 对应行方向 (`h`), `z` 对应切片方向.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 器官掩膜基础数据结构.
mod data;

pub use data::{MeshSpec, Organ, OrganLabel, OrganMasks, OrganSlice, PosIter};
pub use data::{DType, RawGrid, RawOrganGrids};

pub mod consts;

mod error;

pub use error::ArrayError;

pub mod proc;

pub mod prelude;
