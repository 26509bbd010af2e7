use std::ops::Range;

use log::debug;
use ndarray::{s, Array3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::vote::*;
use crate::data::{for_each_indexed_slice_mut, Organ, OrganLabel, OrganMasks, OrganSlice, PosIter};
use crate::error::ArrayError;
use crate::proc::FieldOfView;
use crate::Idx2d;

/// 将 `masks` 裁剪到视野 `fov`, 返回新分配的掩膜 (不与输入共享数据).
///
/// 视野越过网格边界的部分填充为不属于任何器官.
/// 起点大于终点的区间视为空区间, 对应方向的输出长度为 0.
pub fn crop(masks: &OrganMasks, fov: &FieldOfView) -> OrganMasks {
    let (z, h, w) = masks.shape();
    let rows = clamp_range(&fov.rows, h);
    let cols = clamp_range(&fov.cols, w);
    let (rh, rw) = (rows.len(), cols.len());

    let mut ans = OrganMasks::zeros((z, fov.height(), fov.width()));
    for organ in Organ::ALL {
        ans.array_mut(organ)
            .slice_mut(s![.., ..rh, ..rw])
            .assign(&masks.array(organ).slice(s![.., rows.clone(), cols.clone()]));
    }
    ans
}

/// 将 `range` 限制在 `0..n` 内, 结果总满足 `start <= end`.
#[inline]
fn clamp_range(range: &Range<usize>, n: usize) -> Range<usize> {
    let start = range.start.min(n);
    start..range.end.clamp(start, n)
}

/// 一个粗化块内各器官的票数.
///
/// 每个精细体素至多投一票, 投给按 [`Organ::ALL`] 顺序检查到的第一个器官.
/// 清洗后的掩膜只在尿道重叠处才会用到这一顺序.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct VoteCounts {
    /// 前列腺票数.
    pub prostate: usize,

    /// 尿道票数.
    pub urethra: usize,

    /// 边缘票数.
    pub margin: usize,

    /// 直肠票数.
    pub rectum: usize,
}

impl VoteCounts {
    /// 获取 `organ` 的票数.
    #[inline]
    pub fn get(&self, organ: Organ) -> usize {
        match organ {
            Organ::Prostate => self.prostate,
            Organ::Urethra => self.urethra,
            Organ::Margin => self.margin,
            Organ::Rectum => self.rectum,
        }
    }

    /// 为 `organ` 投一票.
    #[inline]
    pub fn vote(&mut self, organ: Organ) {
        match organ {
            Organ::Prostate => self.prostate += 1,
            Organ::Urethra => self.urethra += 1,
            Organ::Margin => self.margin += 1,
            Organ::Rectum => self.rectum += 1,
        }
    }

    /// 总票数, 即块内属于任一器官的体素数.
    #[inline]
    pub fn total(&self) -> usize {
        self.prostate + self.urethra + self.margin + self.rectum
    }
}

/// 单条投票规则: `organ` 的票数严格大于 `threshold` 时采纳.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoteRule {
    /// 器官.
    pub organ: Organ,

    /// 门限.
    pub threshold: usize,
}

/// 粗体素分类策略: 按优先级排列的投票规则, 第一条满足的规则决定分类.
///
/// 默认优先级与门限 (每块 100 个精细体素) 为:
///
/// 1. 尿道 > 28;
/// 2. 直肠 > 40;
/// 3. 边缘 > 40;
/// 4. 前列腺 > 40.
///
/// 都不满足时粗体素不属于任何器官.
///
/// 序列化为按优先级排列的规则列表; 反序列化时与 [`VotePolicy::new`] 做同样的检查.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "[VoteRule; 4]", into = "[VoteRule; 4]")
)]
pub struct VotePolicy {
    rules: [VoteRule; 4],
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            rules: [
                VoteRule {
                    organ: Organ::Urethra,
                    threshold: URETHRA_THRESHOLD,
                },
                VoteRule {
                    organ: Organ::Rectum,
                    threshold: RECTUM_THRESHOLD,
                },
                VoteRule {
                    organ: Organ::Margin,
                    threshold: MARGIN_THRESHOLD,
                },
                VoteRule {
                    organ: Organ::Prostate,
                    threshold: PROSTATE_THRESHOLD,
                },
            ],
        }
    }
}

impl VotePolicy {
    /// 以自定义的优先级和门限构建策略.
    ///
    /// 每个器官必须恰好出现一次, 否则返回 `None`.
    pub fn new(rules: [VoteRule; 4]) -> Option<Self> {
        Self::try_from(rules).ok()
    }

    /// 按优先级排列的规则.
    #[inline]
    pub fn rules(&self) -> &[VoteRule; 4] {
        &self.rules
    }

    /// `organ` 的门限.
    #[inline]
    pub fn threshold(&self, organ: Organ) -> usize {
        self.rule(organ).threshold
    }

    /// 修改 `organ` 的门限, 不改变优先级.
    pub fn with_threshold(mut self, organ: Organ, threshold: usize) -> Self {
        self.rule_mut(organ).threshold = threshold;
        self
    }

    /// 对一个块的票数进行分类.
    #[inline]
    pub fn classify(&self, counts: &VoteCounts) -> OrganLabel {
        self.rules
            .iter()
            .find(|r| counts.get(r.organ) > r.threshold)
            .map(|r| r.organ)
            .into()
    }

    #[inline]
    fn rule(&self, organ: Organ) -> &VoteRule {
        // 所有构造途径都经过 `TryFrom`, 每个器官恰好出现一次.
        let idx = self.rules.iter().position(|r| r.organ == organ);
        &self.rules[idx.unwrap_or_default()]
    }

    #[inline]
    fn rule_mut(&mut self, organ: Organ) -> &mut VoteRule {
        let idx = self.rules.iter().position(|r| r.organ == organ);
        &mut self.rules[idx.unwrap_or_default()]
    }
}

impl TryFrom<[VoteRule; 4]> for VotePolicy {
    type Error = ArrayError;

    /// 四条规则必须覆盖全部四个器官, 否则返回 `Err(ArrayError::MissingRule)`.
    fn try_from(rules: [VoteRule; 4]) -> Result<Self, Self::Error> {
        let missing = Organ::ALL.into_iter().find(|o| !rules.iter().any(|r| r.organ == *o));
        match missing {
            Some(organ) => Err(ArrayError::MissingRule { organ }),
            None => Ok(Self { rules }),
        }
    }
}

impl From<VotePolicy> for [VoteRule; 4] {
    #[inline]
    fn from(value: VotePolicy) -> Self {
        value.rules
    }
}

/// 统计切片 `sli` 上第 `(bh, bw)` 个 `factor x factor` 块的票数.
///
/// 块越过切片边界时 panic.
pub fn block_votes(sli: &OrganSlice, (bh, bw): Idx2d, factor: usize) -> VoteCounts {
    let mut ans = VoteCounts::default();
    for (dh, dw) in PosIter::new((factor, factor)) {
        if let Some(organ) = sli.first_at((bh * factor + dh, bw * factor + dw)) {
            ans.vote(organ);
        }
    }
    ans
}

/// 以 `factor x factor` 的水平块为单位粗化 `fine`, 切片方向不做粗化.
///
/// 输出形状为 `(z, h / factor, w / factor)`. 输入通常已由 [`crop`]
/// 裁剪为 `factor` 的整数倍; 否则末尾不足一块的行/列被忽略.
/// 每个粗体素至多属于一个器官, 见 [`VotePolicy`].
///
/// `factor` 为 0 时返回 `Err(ArrayError::ZeroFactor)`.
pub fn coarsen(
    fine: &OrganMasks,
    factor: usize,
    policy: &VotePolicy,
) -> Result<OrganMasks, ArrayError> {
    if factor == 0 {
        return Err(ArrayError::ZeroFactor);
    }
    let (z, h, w) = fine.shape();
    let coarse_shape = (h / factor, w / factor);

    let mut labels = Array3::from_elem((z, coarse_shape.0, coarse_shape.1), OrganLabel::None);
    for_each_indexed_slice_mut(&mut labels, |k, mut out| {
        let sli = fine.slice_at(k);
        for pos in PosIter::new(coarse_shape) {
            out[pos] = policy.classify(&block_votes(&sli, pos, factor));
        }
    });

    let ans = OrganMasks::from_labels(labels.view());
    debug!(
        "粗化: {:?} -> {:?}, 各器官粗体素数: {:?}",
        (z, h, w),
        ans.shape(),
        ans.numeric_statistics()
    );
    Ok(ans)
}
