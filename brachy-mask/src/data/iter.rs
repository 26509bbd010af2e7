use crate::Idx2d;

/// 行优先的二维格点索引迭代器.
///
/// 从 `start` 出发, 行/列分别以 `step` 为步长前进, 直到越过 `(h, w)`.
/// 普通的逐像素遍历只是 `start = (0, 0)`, `step = (1, 1)` 的特例.
///
/// 虽然如下函数也能实现逐像素遍历:
///
/// ```
/// type Idx2d = (usize, usize);
///
/// fn pos_iter_auto((h, w): Idx2d) -> impl Iterator<Item = Idx2d> {
///     (0..h).flat_map(move |first| (0..w).map(move |second| (first, second)))
/// }
/// ```
///
/// 但该迭代器对象占用的空间更大, 且不便表达带偏移的格点.
#[derive(Debug, Clone)]
pub struct PosIter {
    cur_h: usize,
    cur_w: usize,
    start_w: usize,
    step_h: usize,
    step_w: usize,
    h: usize,
    w: usize,
}

impl PosIter {
    /// 遍历 `(h, w)` 范围内的全部位置.
    #[inline]
    pub fn new(shape: Idx2d) -> Self {
        Self::strided(shape, (0, 0), (1, 1))
    }

    /// 遍历 `(h, w)` 范围内, 从 `start` 起以 `step` 为间距的格点.
    ///
    /// 任一步长为 0 时, 迭代器为空.
    #[inline]
    pub fn strided((h, w): Idx2d, (start_h, start_w): Idx2d, (step_h, step_w): Idx2d) -> Self {
        Self {
            cur_h: start_h,
            cur_w: start_w,
            start_w,
            step_h,
            step_w,
            h,
            w,
        }
    }
}

impl Iterator for PosIter {
    type Item = Idx2d;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step_h == 0 || self.step_w == 0 || self.cur_h >= self.h || self.start_w >= self.w
        {
            return None;
        }
        let ret_pos = (self.cur_h, self.cur_w);
        self.cur_w += self.step_w;
        if self.cur_w >= self.w {
            self.cur_w = self.start_w;
            self.cur_h += self.step_h;
        }
        Some(ret_pos)
    }
}
