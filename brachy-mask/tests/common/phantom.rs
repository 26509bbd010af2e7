use brachy_mask::RawOrganGrids;
use ndarray::Array3;

/// `(h, w)` 是否落在以 `(ch, cw)` 为中心, 半轴为 `(rh, rw)` 的椭圆内.
fn in_ellipse((h, w): (usize, usize), (ch, cw): (f64, f64), (rh, rw): (f64, f64)) -> bool {
    let dh = (h as f64 - ch) / rh;
    let dw = (w as f64 - cw) / rw;
    dh * dh + dw * dw <= 1.0
}

fn ellipse(shape: (usize, usize, usize), center: (f64, f64), radii: (f64, f64)) -> Array3<bool> {
    Array3::from_shape_fn(shape, |(_, h, w)| in_ellipse((h, w), center, radii))
}

/// 一个简化的前列腺体模: 前列腺椭圆, 中心的尿道, 外扩的边缘, 下方的直肠.
///
/// 尿道完全位于前列腺内, 且与直肠不相交, 因此清洗后各器官互斥.
pub fn prostate_phantom(shape: (usize, usize, usize)) -> RawOrganGrids {
    let (_, h, w) = shape;
    let center = (h as f64 * 0.45, w as f64 * 0.5);
    let prostate_r = (h as f64 * 0.25, w as f64 * 0.25);
    let margin_r = (h as f64 * 0.33, w as f64 * 0.33);
    let urethra_r = (h as f64 * 0.08, h as f64 * 0.08);
    let rectum_c = (h as f64 * 0.85, w as f64 * 0.5);
    let rectum_r = (h as f64 * 0.12, w as f64 * 0.3);

    RawOrganGrids::from_bool(
        ellipse(shape, center, prostate_r),
        ellipse(shape, center, urethra_r),
        ellipse(shape, center, margin_r),
        ellipse(shape, rectum_c, rectum_r),
    )
}
