use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::needle::{NEEDLE_OFFSET, NEEDLE_PITCH};
use crate::data::PosIter;
#[cfg(feature = "serde")]
use crate::error::ArrayError;
use crate::Idx2d;

/// 针模板格点: 从 `(offset, offset)` 出发, 行列均以 `pitch` 个粗体素为间距.
///
/// `pitch` 总是正数, 反序列化时同样检查.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LatticeDef"))]
pub struct NeedleLattice {
    pitch: usize,
    offset: usize,
}

impl Default for NeedleLattice {
    /// 间距 5, 偏移 2. 粗体素为 0.1 cm 时即 0.5 cm 的标准模板.
    fn default() -> Self {
        Self {
            pitch: NEEDLE_PITCH,
            offset: NEEDLE_OFFSET,
        }
    }
}

impl NeedleLattice {
    /// 构建格点. `pitch` 为 0 时返回 `None`.
    pub fn new(pitch: usize, offset: usize) -> Option<Self> {
        (pitch > 0).then_some(Self { pitch, offset })
    }

    /// 间距.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// 偏移.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `(r, c)` 是否为针道位置?
    #[inline]
    pub fn contains(&self, (r, c): Idx2d) -> bool {
        let on = |v: usize| v >= self.offset && (v - self.offset) % self.pitch == 0;
        on(r) && on(c)
    }

    /// 给定粗体素边长 (厘米), 求相邻针道的物理间距.
    #[inline]
    pub fn spacing_cm(&self, coarse_voxel_cm: f64) -> f64 {
        self.pitch as f64 * coarse_voxel_cm
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct LatticeDef {
    pitch: usize,
    offset: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<LatticeDef> for NeedleLattice {
    type Error = ArrayError;

    fn try_from(value: LatticeDef) -> Result<Self, Self::Error> {
        NeedleLattice::new(value.pitch, value.offset).ok_or(ArrayError::ZeroNeedlePitch)
    }
}

/// 生成形状为 `shape` (粗网格水平切片形状) 的针模板.
///
/// 模板只取决于形状, 与器官内容无关.
pub fn needle_template(shape: Idx2d, lattice: &NeedleLattice) -> Array2<bool> {
    let mut ans = Array2::from_elem(shape, false);
    for pos in needle_positions(shape, lattice) {
        ans[pos] = true;
    }
    ans
}

/// 按行优先序列出形状 `shape` 内的全部针道位置.
pub fn needle_positions(shape: Idx2d, lattice: &NeedleLattice) -> Vec<Idx2d> {
    let start = (lattice.offset, lattice.offset);
    PosIter::strided(shape, start, (lattice.pitch, lattice.pitch)).collect()
}
