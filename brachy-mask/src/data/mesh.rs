use crate::error::ArrayError;

/// 原始掩膜单个像素 (体素) 的物理尺寸, 单位厘米.
///
/// `x` 对应列方向, `y` 对应行方向, `z` 对应相邻切片间距.
/// `z` 只做记录, 流水线不会在切片方向重采样.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshSpec {
    x_cm: f64,
    y_cm: f64,
    z_cm: f64,
}

impl MeshSpec {
    /// 构建网格尺寸.
    ///
    /// 任一方向的尺寸不是有限正数时, 返回 `Err(ArrayError::InvalidPitch)`.
    pub fn new(x_cm: f64, y_cm: f64, z_cm: f64) -> Result<Self, ArrayError> {
        check_pitch('x', x_cm)?;
        check_pitch('y', y_cm)?;
        check_pitch('z', z_cm)?;
        Ok(Self { x_cm, y_cm, z_cm })
    }

    /// 列方向像素尺寸.
    #[inline]
    pub fn x_cm(&self) -> f64 {
        self.x_cm
    }

    /// 行方向像素尺寸.
    #[inline]
    pub fn y_cm(&self) -> f64 {
        self.y_cm
    }

    /// 切片间距.
    #[inline]
    pub fn z_cm(&self) -> f64 {
        self.z_cm
    }

    /// 像素在水平方向上是否是各向同的?
    #[inline]
    pub fn is_square(&self) -> bool {
        self.x_cm == self.y_cm
    }

    /// 列方向 `n` 个像素的 `n + 1` 条边界, 第 `k` 条位于 `k * x_cm`.
    #[inline]
    pub fn x_boundaries(&self, n: usize) -> Vec<f64> {
        boundaries(self.x_cm, n)
    }

    /// 行方向 `n` 个像素的 `n + 1` 条边界, 第 `k` 条位于 `k * y_cm`.
    #[inline]
    pub fn y_boundaries(&self, n: usize) -> Vec<f64> {
        boundaries(self.y_cm, n)
    }
}

/// 网格尺寸必须是有限正数.
#[inline]
pub(crate) fn check_pitch(axis: char, value: f64) -> Result<(), ArrayError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArrayError::InvalidPitch { axis, value })
    }
}

/// 按乘法而非累加生成边界, 避免误差随下标累积.
fn boundaries(pitch: f64, n: usize) -> Vec<f64> {
    (0..=n).map(|k| k as f64 * pitch).collect()
}
