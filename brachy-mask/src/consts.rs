//! 通用常量.
//!
//! 这里的数值都是策略常量 (而非推导结果), 它们是 [`crate::proc`]
//! 中各参数结构 `Default` 实现的来源. 调整临床策略时应修改参数结构,
//! 而不是修改这里.

/// 复合标签图中各器官的取值.
pub mod label {
    /// 不属于任何器官.
    pub const LABEL_BACKGROUND: u8 = 0;

    /// 尿道.
    pub const LABEL_URETHRA: u8 = 1;

    /// 前列腺.
    pub const LABEL_PROSTATE: u8 = 2;

    /// 边缘 (前列腺外扩的治疗边界).
    pub const LABEL_MARGIN: u8 = 3;

    /// 直肠.
    pub const LABEL_RECTUM: u8 = 4;

    /// 像素是否属于某个器官?
    #[inline]
    pub const fn is_organ(p: u8) -> bool {
        matches!(
            p,
            LABEL_URETHRA | LABEL_PROSTATE | LABEL_MARGIN | LABEL_RECTUM
        )
    }
}

/// 标准精细网格的尺寸.
pub mod pitch {
    /// 精细网格列方向尺寸, 单位厘米.
    pub const TARGET_X_CM: f64 = 0.01;

    /// 精细网格行方向尺寸, 单位厘米.
    pub const TARGET_Y_CM: f64 = 0.01;

    /// 计算精细网格维度时 `ceil` 的相对容差.
    ///
    /// `7 * 0.01 / 0.01` 在 `f64` 下为 `7.000000000000001`.
    pub const CEIL_TOLERANCE: f64 = 1e-9;
}

/// 粗化因子: 一个粗体素在水平面上覆盖 `10 x 10` 个精细体素.
pub const COARSEN_FACTOR: usize = 10;

/// 粗化投票门限. 块内该器官体素数 **严格大于** 门限时才会被采纳.
pub mod vote {
    /// 尿道门限. 尿道不能漏判, 因此门限最低.
    pub const URETHRA_THRESHOLD: usize = 28;

    /// 直肠门限.
    pub const RECTUM_THRESHOLD: usize = 40;

    /// 边缘门限.
    pub const MARGIN_THRESHOLD: usize = 40;

    /// 前列腺门限.
    pub const PROSTATE_THRESHOLD: usize = 40;
}

/// 针模板格点.
pub mod needle {
    /// 相邻针道之间的粗体素个数. 粗体素为 0.1 cm 时对应 0.5 cm.
    pub const NEEDLE_PITCH: usize = 5;

    /// 第一个针道相对原点的粗体素偏移.
    pub const NEEDLE_OFFSET: usize = 2;
}
