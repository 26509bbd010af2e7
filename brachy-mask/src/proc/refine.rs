use log::{debug, warn};
use ndarray::Axis;
use num::ToPrimitive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::pitch::{CEIL_TOLERANCE, TARGET_X_CM, TARGET_Y_CM};
use crate::data::{check_pitch, for_each_indexed_slice_mut, MeshSpec, Organ, OrganMasks};
use crate::error::ArrayError;

/// 重采样目标网格尺寸, 单位厘米.
///
/// 字段公开, 直接构造时不做检查; [`TargetPitch::new`] 与反序列化都要求有限正数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TargetPitchDef"))]
pub struct TargetPitch {
    /// 列方向.
    pub x_cm: f64,

    /// 行方向.
    pub y_cm: f64,
}

impl Default for TargetPitch {
    /// 0.01 cm x 0.01 cm.
    fn default() -> Self {
        Self {
            x_cm: TARGET_X_CM,
            y_cm: TARGET_Y_CM,
        }
    }
}

impl TargetPitch {
    /// 构建目标尺寸. 任一方向不是有限正数时, 返回 `Err(ArrayError::InvalidPitch)`.
    pub fn new(x_cm: f64, y_cm: f64) -> Result<Self, ArrayError> {
        let ans = Self { x_cm, y_cm };
        ans.check()?;
        Ok(ans)
    }

    /// 检查两个方向的尺寸是否都是有限正数.
    pub fn check(&self) -> Result<(), ArrayError> {
        check_pitch('x', self.x_cm)?;
        check_pitch('y', self.y_cm)
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct TargetPitchDef {
    x_cm: f64,
    y_cm: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<TargetPitchDef> for TargetPitch {
    type Error = ArrayError;

    fn try_from(value: TargetPitchDef) -> Result<Self, Self::Error> {
        TargetPitch::new(value.x_cm, value.y_cm)
    }
}

/// 原始像素在两个方向上是否都比目标更精细?
///
/// 此时重采样会损失分辨率 (造成 "失真"), 但流水线仍会继续.
#[inline]
pub fn is_distorting(mesh: &MeshSpec, target: &TargetPitch) -> bool {
    mesh.x_cm() < target.x_cm && mesh.y_cm() < target.y_cm
}

/// 原始 `n` 个尺寸为 `native` 的像素, 在目标尺寸 `target` 下需要的像素个数,
/// 即 `ceil(n * native / target)`.
///
/// `ceil` 带有 [`CEIL_TOLERANCE`] 的相对容差, 以免浮点误差多出一行/列.
/// 容差只按比例缩小 `exact`, 因此正的物理长度至少对应 1 个像素.
pub fn refined_dim(n: usize, native: f64, target: f64) -> usize {
    let exact = n as f64 * native / target;
    (exact * (1.0 - CEIL_TOLERANCE))
        .ceil()
        .max(0.0)
        .to_usize()
        .unwrap_or(0)
}

/// 在升序边界数组 `boundaries` (长度为像素数 + 1) 中查找包含 `center` 的像素下标.
///
/// 取不超过 `center` 的最右边界对应的像素. 超出最大边界时钳制到最后一个合法下标,
/// 低于最小边界时钳制到 0.
#[inline]
pub fn boundary_index(boundaries: &[f64], center: f64) -> usize {
    let last = boundaries.len().saturating_sub(2);
    boundaries
        .partition_point(|b| *b <= center)
        .saturating_sub(1)
        .min(last)
}

/// 目标网格第 `0..len` 个像素中心各自对应的原始像素下标.
fn lookup_table(boundaries: &[f64], len: usize, pitch: f64) -> Vec<usize> {
    (0..len)
        .map(|j| boundary_index(boundaries, j as f64 * pitch + pitch / 2.0))
        .collect()
}

/// 将 `masks` 从原始像素尺寸 `mesh` 重采样到 `target`.
///
/// 对目标网格的每个像素, 求其物理中心, 找到包含该中心的原始像素,
/// 并复制其标签. 这是最近邻盒式采样而非插值: 不会凭空产生边界形状,
/// 但会改变等效分辨率. 切片方向不做重采样.
///
/// 原始像素与目标尺寸相同时, 结果与输入逐像素相同.
pub fn refine(masks: &OrganMasks, mesh: &MeshSpec, target: &TargetPitch) -> OrganMasks {
    if is_distorting(mesh, target) {
        warn!(
            "像素尺寸 ({} cm x {} cm) 比目标 ({} cm x {} cm) 更精细, 重采样将导致失真",
            mesh.x_cm(),
            mesh.y_cm(),
            target.x_cm,
            target.y_cm
        );
    }

    let (z, h, w) = masks.shape();
    let refined_h = refined_dim(h, mesh.y_cm(), target.y_cm);
    let refined_w = refined_dim(w, mesh.x_cm(), target.x_cm);
    let rows = lookup_table(&mesh.y_boundaries(h), refined_h, target.y_cm);
    let cols = lookup_table(&mesh.x_boundaries(w), refined_w, target.x_cm);

    let mut ans = OrganMasks::zeros((z, refined_h, refined_w));
    for organ in Organ::ALL {
        let src = masks.array(organ);
        for_each_indexed_slice_mut(ans.array_mut(organ), |k, mut dst| {
            let src = src.index_axis(Axis(0), k);
            for (j, &raw_j) in rows.iter().enumerate() {
                for (i, &raw_i) in cols.iter().enumerate() {
                    dst[(j, i)] = src[(raw_j, raw_i)];
                }
            }
        });
    }
    debug!("重采样: {:?} -> {:?}", (z, h, w), ans.shape());
    ans
}
