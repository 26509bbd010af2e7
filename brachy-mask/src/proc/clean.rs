use log::{debug, warn};
use ndarray::Zip;

use crate::data::OrganMasks;

/// 去除器官标签之间的重叠. 优先级为 **尿道 > 直肠 > 前列腺/边缘**.
///
/// 对每个体素:
///
/// - `边缘 := 边缘 && !前列腺 && !直肠`;
/// - `前列腺 := 前列腺 && !尿道 && !直肠`.
///
/// 边缘使用的是清洗 **前** 的前列腺. 尿道和直肠之间不互相扣除
/// (勾画阶段被假定不会产生这种重叠), 尿道和边缘之间同样不扣除.
/// 若清洗后仍有重叠体素, 会输出警告但不做修改.
///
/// 该操作幂等, 并获取 `masks` 的所有权以避免调用者继续持有清洗前的数据.
pub fn clean(mut masks: OrganMasks) -> OrganMasks {
    let [prostate, urethra, margin, rectum] = masks.arrays_mut();
    let zip = Zip::from(prostate).and(&*urethra).and(margin).and(&*rectum);

    #[cfg(feature = "rayon")]
    zip.par_for_each(clean_voxel);
    #[cfg(not(feature = "rayon"))]
    zip.for_each(clean_voxel);

    let overlap = masks.overlap_count();
    if overlap > 0 {
        warn!("清洗后仍有 {overlap} 个体素同时属于多个器官 (尿道与直肠/边缘的重叠不做处理)");
    }
    debug!("掩膜清洗完成, 各器官体素数: {:?}", masks.numeric_statistics());
    masks
}

#[inline]
fn clean_voxel(prostate: &mut bool, urethra: &bool, margin: &mut bool, rectum: &bool) {
    *margin = *margin && !*prostate && !*rectum;
    *prostate = *prostate && !*urethra && !*rectum;
}
