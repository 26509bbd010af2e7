use std::fmt::{Display, Formatter};

use ndarray::{Array3, ArrayD};

use super::Organ;

/// 原始掩膜的元素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DType {
    /// 布尔值. 流水线只接受这一种.
    Bool,

    /// 8 位无符号整数, 常见于直接从图像文件读出的掩膜.
    U8,

    /// 32 位浮点数.
    F32,
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DType::Bool => "bool",
            DType::U8 => "u8",
            DType::F32 => "f32",
        })
    }
}

/// 由外部协作者 (图像加载器, 勾画工具) 交来的、尚未校验的动态形状掩膜.
///
/// 维数和元素类型都只在运行时可知, 由 [`crate::proc::validate`] 负责检查.
#[derive(Clone, Debug, PartialEq)]
pub enum RawGrid {
    /// 布尔掩膜.
    Bool(ArrayD<bool>),

    /// 整数掩膜.
    U8(ArrayD<u8>),

    /// 浮点掩膜.
    F32(ArrayD<f32>),
}

impl RawGrid {
    /// 维数.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// 形状.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        match self {
            RawGrid::Bool(a) => a.shape(),
            RawGrid::U8(a) => a.shape(),
            RawGrid::F32(a) => a.shape(),
        }
    }

    /// 元素类型.
    #[inline]
    pub fn dtype(&self) -> DType {
        match self {
            RawGrid::Bool(_) => DType::Bool,
            RawGrid::U8(_) => DType::U8,
            RawGrid::F32(_) => DType::F32,
        }
    }
}

impl From<ArrayD<bool>> for RawGrid {
    #[inline]
    fn from(value: ArrayD<bool>) -> Self {
        RawGrid::Bool(value)
    }
}

impl From<Array3<bool>> for RawGrid {
    #[inline]
    fn from(value: Array3<bool>) -> Self {
        RawGrid::Bool(value.into_dyn())
    }
}

impl From<ArrayD<u8>> for RawGrid {
    #[inline]
    fn from(value: ArrayD<u8>) -> Self {
        RawGrid::U8(value)
    }
}

impl From<ArrayD<f32>> for RawGrid {
    #[inline]
    fn from(value: ArrayD<f32>) -> Self {
        RawGrid::F32(value)
    }
}

/// 四个器官的原始掩膜.
///
/// 该结构完全透明, 字段顺序即 [`Organ::ALL`] 的顺序.
#[derive(Clone, Debug, PartialEq)]
pub struct RawOrganGrids {
    /// 前列腺.
    pub prostate: RawGrid,

    /// 尿道.
    pub urethra: RawGrid,

    /// 边缘.
    pub margin: RawGrid,

    /// 直肠.
    pub rectum: RawGrid,
}

impl RawOrganGrids {
    /// 直接由四个三维布尔数组创建.
    pub fn from_bool(
        prostate: Array3<bool>,
        urethra: Array3<bool>,
        margin: Array3<bool>,
        rectum: Array3<bool>,
    ) -> Self {
        Self {
            prostate: prostate.into(),
            urethra: urethra.into(),
            margin: margin.into(),
            rectum: rectum.into(),
        }
    }

    /// 获取 `organ` 的原始掩膜.
    #[inline]
    pub fn get(&self, organ: Organ) -> &RawGrid {
        match organ {
            Organ::Prostate => &self.prostate,
            Organ::Urethra => &self.urethra,
            Organ::Margin => &self.margin,
            Organ::Rectum => &self.rectum,
        }
    }

    /// 按 [`Organ::ALL`] 的顺序迭代 `(器官, 原始掩膜)`.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Organ, &RawGrid)> {
        Organ::ALL.into_iter().map(move |o| (o, self.get(o)))
    }

    /// 拆成按 [`Organ::ALL`] 排列的数组.
    #[inline]
    pub fn into_array(self) -> [RawGrid; 4] {
        [self.prostate, self.urethra, self.margin, self.rectum]
    }
}
