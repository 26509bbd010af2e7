use log::debug;
use ndarray::{Array2, ArrayView3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    clean, coarsen, crop, field_of_view, needle_template, refine, validate, FieldOfView,
    NeedleLattice, TargetPitch, VotePolicy,
};
use crate::consts::COARSEN_FACTOR;
use crate::data::{MeshSpec, Organ, OrganMasks, RawOrganGrids};
use crate::error::ArrayError;

/// 流水线参数. 默认值即标准的 0.01 cm 精细网格, 10 倍粗化,
/// 默认投票策略与 0.5 cm 针模板.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProcessParams {
    /// 精细网格尺寸.
    pub target: TargetPitch,

    /// 粗化因子.
    pub factor: usize,

    /// 粗体素分类策略.
    pub policy: VotePolicy,

    /// 针模板格点.
    pub lattice: NeedleLattice,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            target: TargetPitch::default(),
            factor: COARSEN_FACTOR,
            policy: VotePolicy::default(),
            lattice: NeedleLattice::default(),
        }
    }
}

impl ProcessParams {
    /// 粗体素的水平尺寸 `(x, y)`, 单位厘米.
    #[inline]
    pub fn coarse_voxel_cm(&self) -> (f64, f64) {
        let f = self.factor as f64;
        (self.target.x_cm * f, self.target.y_cm * f)
    }
}

/// 一次完整的掩膜处理结果.
///
/// 依次执行校验, 清洗, 重采样, 视野计算, 裁剪, 粗化和针模板生成,
/// 并保存下游需要的全部输出. 每次处理都从原始输入重新创建所有网格.
#[derive(Clone, Debug)]
pub struct MaskProcessor {
    mesh: MeshSpec,
    params: ProcessParams,
    fov: FieldOfView,
    fov_masks: OrganMasks,
    coarse_masks: OrganMasks,
    needle_template: Array2<bool>,
}

impl MaskProcessor {
    /// 使用 `params` 处理原始掩膜. 标准参数见 `ProcessParams::default()`.
    ///
    /// # 返回值
    ///
    /// - `params.target` 不是有限正数时, 返回 `Err(ArrayError::InvalidPitch)`;
    /// - 原始掩膜结构不一致时, 返回校验错误 (见 [`validate`]);
    /// - 掩膜中没有任何器官体素时, 返回 `Err(ArrayError::NoContent)`;
    /// - `params.factor` 为 0 时, 返回 `Err(ArrayError::ZeroFactor)`.
    ///
    /// 像素过于精细只会输出警告, 不会返回错误.
    pub fn new(
        raw: RawOrganGrids,
        mesh: MeshSpec,
        params: ProcessParams,
    ) -> Result<Self, ArrayError> {
        params.target.check()?;
        let masks = validate(raw)?;
        debug!("原始掩膜形状: {:?}, 网格尺寸: {mesh:?}", masks.shape());

        let cleaned = clean(masks);
        let refined = refine(&cleaned, &mesh, &params.target);
        drop(cleaned);

        let fov = field_of_view(&refined, params.factor)?;
        let fov_masks = crop(&refined, &fov);
        drop(refined);

        let coarse_masks = coarsen(&fov_masks, params.factor, &params.policy)?;
        let needle_template = needle_template(fov.coarse_shape(params.factor), &params.lattice);

        Ok(Self {
            mesh,
            params,
            fov,
            fov_masks,
            coarse_masks,
            needle_template,
        })
    }

    /// 原始网格尺寸.
    #[inline]
    pub fn mesh(&self) -> &MeshSpec {
        &self.mesh
    }

    /// 处理所用参数.
    #[inline]
    pub fn params(&self) -> &ProcessParams {
        &self.params
    }

    /// 精细网格上的视野.
    #[inline]
    pub fn fov(&self) -> &FieldOfView {
        &self.fov
    }

    /// 裁剪到视野的清洗后精细掩膜.
    #[inline]
    pub fn fov_masks(&self) -> &OrganMasks {
        &self.fov_masks
    }

    /// 裁剪到视野的单个器官精细掩膜.
    #[inline]
    pub fn fov_mask(&self, organ: Organ) -> ArrayView3<'_, bool> {
        self.fov_masks.get(organ)
    }

    /// 粗化后的掩膜.
    #[inline]
    pub fn coarse_masks(&self) -> &OrganMasks {
        &self.coarse_masks
    }

    /// 单个器官的粗化掩膜.
    #[inline]
    pub fn coarse_mask(&self, organ: Organ) -> ArrayView3<'_, bool> {
        self.coarse_masks.get(organ)
    }

    /// 针模板, 形状与粗网格水平切片一致.
    #[inline]
    pub fn needle_template(&self) -> &Array2<bool> {
        &self.needle_template
    }

    /// 拆成 `(视野, 精细掩膜, 粗化掩膜, 针模板)`.
    #[inline]
    pub fn into_parts(self) -> (FieldOfView, OrganMasks, OrganMasks, Array2<bool>) {
        (self.fov, self.fov_masks, self.coarse_masks, self.needle_template)
    }
}
