use std::ops::Range;

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::data::{OrganMasks, OrganSlice};
use crate::error::ArrayError;
use crate::Idx2d;

/// 精细网格上的视野, 行/列均为左闭右开区间.
///
/// 由 [`field_of_view`] 产生时, 两个区间的长度都是粗化因子的整数倍.
/// 区间的高端可能超出精细网格, 超出部分在裁剪时视为不属于任何器官.
/// 手工构造时起点大于终点的区间长度视为 0.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldOfView {
    /// 行 (`h`) 方向区间.
    pub rows: Range<usize>,

    /// 列 (`w`) 方向区间.
    pub cols: Range<usize>,
}

impl FieldOfView {
    /// 行数.
    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// 列数.
    #[inline]
    pub fn width(&self) -> usize {
        self.cols.len()
    }

    /// 视野形状 `(h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        (self.height(), self.width())
    }

    /// 以 `factor` 粗化后的形状. `factor` 为 0 时 panic.
    #[inline]
    pub fn coarse_shape(&self, factor: usize) -> Idx2d {
        (self.height() / factor, self.width() / factor)
    }

    /// 精细网格上的 `(h, w)` 是否在视野内?
    #[inline]
    pub fn contains(&self, (h, w): Idx2d) -> bool {
        self.rows.contains(&h) && self.cols.contains(&w)
    }
}

/// 将长度 `extent` 补齐到 `factor` 的整数倍: 余数非零时补 `factor - 余数`, 否则不变.
///
/// `factor` 为 0 时 panic.
#[inline]
pub fn padded_extent(extent: usize, factor: usize) -> usize {
    match extent % factor {
        0 => extent,
        r => extent + factor - r,
    }
}

/// 包含器官体素的最小闭区间包围盒, `(h_min, h_max, w_min, w_max)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Bounds {
    h_min: usize,
    h_max: usize,
    w_min: usize,
    w_max: usize,
}

impl Bounds {
    #[inline]
    fn point((h, w): Idx2d) -> Self {
        Self {
            h_min: h,
            h_max: h,
            w_min: w,
            w_max: w,
        }
    }

    #[inline]
    fn merge(self, other: Self) -> Self {
        Self {
            h_min: self.h_min.min(other.h_min),
            h_max: self.h_max.max(other.h_max),
            w_min: self.w_min.min(other.w_min),
            w_max: self.w_max.max(other.w_max),
        }
    }

    #[inline]
    fn merge_opt(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// 单个切片上器官体素的包围盒. 切片不含器官时返回 `None`.
fn slice_bounds(sli: &OrganSlice) -> Option<Bounds> {
    sli.pos_iter()
        .filter(|pos| sli.any_at(*pos))
        .map(Bounds::point)
        .reduce(Bounds::merge)
}

/// 借助 `rayon` 并行地求各切片包围盒并合并.
#[cfg(feature = "rayon")]
fn volume_bounds(masks: &OrganMasks) -> Option<Bounds> {
    use rayon::iter::{IntoParallelIterator, ParallelIterator};

    (0..masks.len_z())
        .into_par_iter()
        .map(|z| slice_bounds(&masks.slice_at(z)))
        .reduce(|| None, Bounds::merge_opt)
}

#[cfg(not(feature = "rayon"))]
fn volume_bounds(masks: &OrganMasks) -> Option<Bounds> {
    masks
        .slice_iter()
        .map(|s| slice_bounds(&s))
        .fold(None, Bounds::merge_opt)
}

/// 计算所有切片上包含任一器官体素的最小 (行, 列) 包围盒,
/// 并在高端把两个方向的长度都补齐到 `factor` 的整数倍.
///
/// # 返回值
///
/// - `factor` 为 0 时, 返回 `Err(ArrayError::ZeroFactor)`;
/// - 掩膜中没有任何器官体素时, 返回 `Err(ArrayError::NoContent)`;
/// - 其他情况下返回 `Ok(FieldOfView)`. 补齐后的区间可能越过网格边界.
pub fn field_of_view(masks: &OrganMasks, factor: usize) -> Result<FieldOfView, ArrayError> {
    if factor == 0 {
        return Err(ArrayError::ZeroFactor);
    }
    let b = volume_bounds(masks).ok_or(ArrayError::NoContent)?;
    let height = padded_extent(b.h_max - b.h_min + 1, factor);
    let width = padded_extent(b.w_max - b.w_min + 1, factor);
    let fov = FieldOfView {
        rows: b.h_min..b.h_min + height,
        cols: b.w_min..b.w_min + width,
    };
    debug!("视野: {fov:?}, 精细网格切片形状 {:?}", masks.slice_shape());
    Ok(fov)
}
