use std::fmt::{Display, Formatter};
use std::ops::Index;

use itertools::izip;
use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::label::*;
use crate::error::ArrayError;
use crate::{Idx2d, Idx3d};

mod iter;
mod mesh;
mod raw;

pub use iter::PosIter;
pub use mesh::MeshSpec;
pub(crate) use mesh::check_pitch;
pub use raw::{DType, RawGrid, RawOrganGrids};

/// 参与处理的器官.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Organ {
    /// 前列腺.
    Prostate,

    /// 尿道.
    Urethra,

    /// 边缘.
    Margin,

    /// 直肠.
    Rectum,
}

impl Organ {
    /// 全部器官, 顺序即存储顺序, 也是粗化时块内计票的检查顺序.
    pub const ALL: [Organ; 4] = [Organ::Prostate, Organ::Urethra, Organ::Margin, Organ::Rectum];

    /// 在 [`Organ::ALL`] 中的下标.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Organ::Prostate => 0,
            Organ::Urethra => 1,
            Organ::Margin => 2,
            Organ::Rectum => 3,
        }
    }

    /// 在复合标签图中的取值.
    #[inline]
    pub const fn label(self) -> u8 {
        match self {
            Organ::Prostate => LABEL_PROSTATE,
            Organ::Urethra => LABEL_URETHRA,
            Organ::Margin => LABEL_MARGIN,
            Organ::Rectum => LABEL_RECTUM,
        }
    }

    /// 器官名.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Organ::Prostate => "prostate",
            Organ::Urethra => "urethra",
            Organ::Margin => "margin",
            Organ::Rectum => "rectum",
        }
    }
}

impl Display for Organ {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 单个体素的器官归属. 与 `Option<Organ>` 等价, 但可以直接参与数组运算.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OrganLabel {
    /// 不属于任何器官.
    #[default]
    None,

    /// 前列腺.
    Prostate,

    /// 尿道.
    Urethra,

    /// 边缘.
    Margin,

    /// 直肠.
    Rectum,
}

impl OrganLabel {
    /// 对应的器官.
    #[inline]
    pub const fn organ(self) -> Option<Organ> {
        match self {
            OrganLabel::None => None,
            OrganLabel::Prostate => Some(Organ::Prostate),
            OrganLabel::Urethra => Some(Organ::Urethra),
            OrganLabel::Margin => Some(Organ::Margin),
            OrganLabel::Rectum => Some(Organ::Rectum),
        }
    }

}

impl From<Organ> for OrganLabel {
    #[inline]
    fn from(value: Organ) -> Self {
        match value {
            Organ::Prostate => OrganLabel::Prostate,
            Organ::Urethra => OrganLabel::Urethra,
            Organ::Margin => OrganLabel::Margin,
            Organ::Rectum => OrganLabel::Rectum,
        }
    }
}

impl From<Option<Organ>> for OrganLabel {
    #[inline]
    fn from(value: Option<Organ>) -> Self {
        value.map_or(OrganLabel::None, OrganLabel::from)
    }
}

/// 四个器官的三维布尔掩膜, 按 `(z, h, w)` 访问.
///
/// 四个数组的形状始终一致. 该结构不保证器官之间互斥,
/// 互斥性由 [`crate::proc::clean`] 建立, 可用 [`OrganMasks::is_exclusive`] 检查.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrganMasks {
    prostate: Array3<bool>,
    urethra: Array3<bool>,
    margin: Array3<bool>,
    rectum: Array3<bool>,
}

impl OrganMasks {
    /// 由四个三维布尔数组创建.
    ///
    /// 若形状不一致, 返回 `Err(ArrayError::ShapeMismatch)`.
    pub fn new(
        prostate: Array3<bool>,
        urethra: Array3<bool>,
        margin: Array3<bool>,
        rectum: Array3<bool>,
    ) -> Result<Self, ArrayError> {
        let expected = prostate.shape().to_vec();
        for (organ, a) in [
            (Organ::Urethra, &urethra),
            (Organ::Margin, &margin),
            (Organ::Rectum, &rectum),
        ] {
            if a.shape() != expected.as_slice() {
                return Err(ArrayError::ShapeMismatch {
                    organ,
                    expected,
                    found: a.shape().to_vec(),
                });
            }
        }
        Ok(Self {
            prostate,
            urethra,
            margin,
            rectum,
        })
    }

    /// 创建形状为 `shape` 的全空掩膜.
    pub fn zeros(shape: Idx3d) -> Self {
        Self {
            prostate: Array3::from_elem(shape, false),
            urethra: Array3::from_elem(shape, false),
            margin: Array3::from_elem(shape, false),
            rectum: Array3::from_elem(shape, false),
        }
    }

    /// 由逐体素的器官归属创建. 结果中每个体素至多属于一个器官.
    pub fn from_labels(labels: ArrayView3<OrganLabel>) -> Self {
        let pick = |organ: Organ| labels.map(|l| l.organ() == Some(organ));
        Self {
            prostate: pick(Organ::Prostate),
            urethra: pick(Organ::Urethra),
            margin: pick(Organ::Margin),
            rectum: pick(Organ::Rectum),
        }
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.prostate.dim()
    }

    /// 获取数据水平切片形状大小.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取单个器官的体素个数 (即数组长度).
    #[inline]
    pub fn size(&self) -> usize {
        self.prostate.len()
    }

    /// 获得 `organ` 掩膜的一份不可变 shallow copy.
    #[inline]
    pub fn get(&self, organ: Organ) -> ArrayView3<'_, bool> {
        self.array(organ).view()
    }

    /// 获得 `organ` 掩膜的一份可变 shallow copy. 视图无法改变形状, 因此不会破坏形状一致性.
    #[inline]
    pub fn get_mut(&mut self, organ: Organ) -> ArrayViewMut3<'_, bool> {
        self.array_mut(organ).view_mut()
    }

    #[inline]
    pub(crate) fn array(&self, organ: Organ) -> &Array3<bool> {
        match organ {
            Organ::Prostate => &self.prostate,
            Organ::Urethra => &self.urethra,
            Organ::Margin => &self.margin,
            Organ::Rectum => &self.rectum,
        }
    }

    #[inline]
    pub(crate) fn array_mut(&mut self, organ: Organ) -> &mut Array3<bool> {
        match organ {
            Organ::Prostate => &mut self.prostate,
            Organ::Urethra => &mut self.urethra,
            Organ::Margin => &mut self.margin,
            Organ::Rectum => &mut self.rectum,
        }
    }

    /// 同时获得四个器官掩膜的可变引用, 顺序同 [`Organ::ALL`].
    #[inline]
    pub(crate) fn arrays_mut(&mut self) -> [&mut Array3<bool>; 4] {
        [
            &mut self.prostate,
            &mut self.urethra,
            &mut self.margin,
            &mut self.rectum,
        ]
    }

    /// 获取 3D 掩膜 z 空间的第 `z_index` 层不可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> OrganSlice<'_> {
        OrganSlice {
            prostate: self.prostate.index_axis(Axis(0), z_index),
            urethra: self.urethra.index_axis(Axis(0), z_index),
            margin: self.margin.index_axis(Axis(0), z_index),
            rectum: self.rectum.index_axis(Axis(0), z_index),
        }
    }

    /// 获取能按升序迭代 3D 掩膜水平不可变切片的迭代器.
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = OrganSlice<'_>> {
        izip!(
            self.prostate.axis_iter(Axis(0)),
            self.urethra.axis_iter(Axis(0)),
            self.margin.axis_iter(Axis(0)),
            self.rectum.axis_iter(Axis(0))
        )
        .map(|(prostate, urethra, margin, rectum)| OrganSlice {
            prostate,
            urethra,
            margin,
            rectum,
        })
    }

    /// 位置 `pos` 是否属于任一器官?
    #[inline]
    pub fn any_at(&self, pos: Idx3d) -> bool {
        Organ::ALL.iter().any(|o| self.array(*o)[pos])
    }

    /// 位置 `pos` 所属的全部器官, 顺序同 [`Organ::ALL`].
    pub fn labels_at(&self, pos: Idx3d) -> Vec<Organ> {
        Organ::ALL
            .into_iter()
            .filter(|o| self.array(*o)[pos])
            .collect()
    }

    /// 获取 `organ` 的体素个数.
    #[inline]
    pub fn count(&self, organ: Organ) -> usize {
        self.array(organ).iter().filter(|p| **p).count()
    }

    /// 获取各器官体素个数, 顺序同 [`Organ::ALL`].
    pub fn numeric_statistics(&self) -> [usize; 4] {
        Organ::ALL.map(|o| self.count(o))
    }

    /// 同时属于两个及以上器官的体素个数.
    pub fn overlap_count(&self) -> usize {
        let mut cnt = 0usize;
        Zip::from(&self.prostate)
            .and(&self.urethra)
            .and(&self.margin)
            .and(&self.rectum)
            .for_each(|&p, &u, &m, &r| {
                if (p as u8 + u as u8 + m as u8 + r as u8) > 1 {
                    cnt += 1;
                }
            });
        cnt
    }

    /// 每个体素是否至多属于一个器官?
    #[inline]
    pub fn is_exclusive(&self) -> bool {
        self.overlap_count() == 0
    }

    /// 复合标签图, 取值见 [`crate::consts::label`].
    ///
    /// 重叠体素取优先级最高的器官 (尿道 > 直肠 > 边缘 > 前列腺).
    pub fn label_map(&self) -> Array3<u8> {
        let mut ans = Array3::from_elem(self.shape(), LABEL_BACKGROUND);
        Zip::from(&mut ans)
            .and(&self.prostate)
            .and(&self.urethra)
            .and(&self.margin)
            .and(&self.rectum)
            .for_each(|v, &p, &u, &m, &r| {
                *v = if u {
                    LABEL_URETHRA
                } else if r {
                    LABEL_RECTUM
                } else if m {
                    LABEL_MARGIN
                } else if p {
                    LABEL_PROSTATE
                } else {
                    LABEL_BACKGROUND
                };
            });
        ans
    }
}

impl Index<(Organ, Idx3d)> for OrganMasks {
    type Output = bool;

    #[inline]
    fn index(&self, (organ, pos): (Organ, Idx3d)) -> &Self::Output {
        &self.array(organ)[pos]
    }
}

/// 不可变、借用的二维水平掩膜切片, 同时包含四个器官.
#[derive(Clone)]
pub struct OrganSlice<'a> {
    prostate: ArrayView2<'a, bool>,
    urethra: ArrayView2<'a, bool>,
    margin: ArrayView2<'a, bool>,
    rectum: ArrayView2<'a, bool>,
}

impl<'a> OrganSlice<'a> {
    /// 获得 `organ` 切片的视图.
    #[inline]
    pub fn get(&self, organ: Organ) -> ArrayView2<'a, bool> {
        match organ {
            Organ::Prostate => self.prostate.clone(),
            Organ::Urethra => self.urethra.clone(),
            Organ::Margin => self.margin.clone(),
            Organ::Rectum => self.rectum.clone(),
        }
    }

    /// 切片形状 `(h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.prostate.dim()
    }

    /// 位置 `pos` 是否属于任一器官?
    #[inline]
    pub fn any_at(&self, pos: Idx2d) -> bool {
        self.prostate[pos] || self.urethra[pos] || self.margin[pos] || self.rectum[pos]
    }

    /// 位置 `pos` 按 [`Organ::ALL`] 顺序检查到的第一个器官.
    #[inline]
    pub fn first_at(&self, pos: Idx2d) -> Option<Organ> {
        Organ::ALL.into_iter().find(|o| self.get(*o)[pos])
    }

    /// 获取能按行优先序迭代切片索引的迭代器.
    #[inline]
    pub fn pos_iter(&self) -> PosIter {
        PosIter::new(self.shape())
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 对三维数组每个水平可变切片实施 `op` 操作, 同时携带 z 方向索引信息.
///
/// 开启 `rayon` 特性时各切片并行处理. 各切片写入互不重叠, 无需加锁.
#[cfg(feature = "rayon")]
pub(crate) fn for_each_indexed_slice_mut<A, F>(data: &mut Array3<A>, op: F)
where
    A: Send + Sync,
    F: Fn(usize, ArrayViewMut2<A>) + Sync + Send,
{
    data.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, v)| op(i, v));
}

/// 对三维数组每个水平可变切片依次实施 `op` 操作, 同时携带 z 方向索引信息.
#[cfg(not(feature = "rayon"))]
pub(crate) fn for_each_indexed_slice_mut<A, F>(data: &mut Array3<A>, op: F)
where
    A: Send + Sync,
    F: Fn(usize, ArrayViewMut2<A>) + Sync + Send,
{
    data.axis_iter_mut(Axis(0))
        .enumerate()
        .for_each(|(i, v)| op(i, v));
}

/// 将二维布尔数组转为字符画, 便于在测试失败时对照.
#[cfg(test)]
pub(crate) fn ascii(a: &ndarray::Array2<bool>) -> String {
    a.rows()
        .into_iter()
        .map(|r| r.iter().map(|&b| if b { '#' } else { '.' }).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
