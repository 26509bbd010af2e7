use log::error;
use ndarray::{Array3, Ix3};

use crate::data::{DType, Organ, OrganMasks, RawGrid, RawOrganGrids};
use crate::error::ArrayError;

/// 检查四个原始掩膜的结构一致性, 通过后转换为 [`OrganMasks`].
///
/// 检查顺序如下, 返回第一个失败项:
///
/// 1. 每个掩膜均为三维, 否则 `Err(ArrayError::DimensionMismatch)`;
/// 2. 每个掩膜形状与前列腺掩膜一致, 否则 `Err(ArrayError::ShapeMismatch)`;
/// 3. 每个掩膜元素均为布尔值, 否则 `Err(ArrayError::TypeMismatch)`;
/// 4. 切片的行数和列数均不为 0, 否则 `Err(ArrayError::EmptyGrid)`.
///
/// 后续阶段无条件依赖这些性质, 因此任何失败都是致命的.
pub fn validate(raw: RawOrganGrids) -> Result<OrganMasks, ArrayError> {
    check(&raw).map_err(|e| {
        error!("掩膜校验失败: {e}");
        e
    })?;
    let [prostate, urethra, margin, rectum] = raw.into_array();
    let ans = OrganMasks::new(
        into_bool3(Organ::Prostate, prostate)?,
        into_bool3(Organ::Urethra, urethra)?,
        into_bool3(Organ::Margin, margin)?,
        into_bool3(Organ::Rectum, rectum)?,
    )?;
    Ok(ans)
}

fn check(raw: &RawOrganGrids) -> Result<(), ArrayError> {
    for (organ, grid) in raw.iter() {
        if grid.ndim() != 3 {
            return Err(ArrayError::DimensionMismatch {
                organ,
                ndim: grid.ndim(),
            });
        }
    }

    let expected = raw.prostate.shape();
    for (organ, grid) in raw.iter().skip(1) {
        if grid.shape() != expected {
            return Err(ArrayError::ShapeMismatch {
                organ,
                expected: expected.to_vec(),
                found: grid.shape().to_vec(),
            });
        }
    }

    for (organ, grid) in raw.iter() {
        if grid.dtype() != DType::Bool {
            return Err(ArrayError::TypeMismatch {
                organ,
                dtype: grid.dtype(),
            });
        }
    }

    if expected[1] == 0 || expected[2] == 0 {
        return Err(ArrayError::EmptyGrid {
            shape: expected.to_vec(),
        });
    }
    Ok(())
}

/// 经过 `check` 后该转换不会失败, 但仍然传播错误而不是 unwrap.
fn into_bool3(organ: Organ, grid: RawGrid) -> Result<Array3<bool>, ArrayError> {
    match grid {
        RawGrid::Bool(a) => {
            let ndim = a.ndim();
            a.into_dimensionality::<Ix3>()
                .map_err(|_| ArrayError::DimensionMismatch { organ, ndim })
        }
        other => Err(ArrayError::TypeMismatch {
            organ,
            dtype: other.dtype(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::{ArrayError, DType, Organ, RawGrid, RawOrganGrids};
    use ndarray::{Array3, ArrayD, IxDyn};

    fn bool3(shape: (usize, usize, usize)) -> RawGrid {
        Array3::from_elem(shape, false).into()
    }

    fn grids(p: RawGrid, u: RawGrid, m: RawGrid, r: RawGrid) -> RawOrganGrids {
        RawOrganGrids {
            prostate: p,
            urethra: u,
            margin: m,
            rectum: r,
        }
    }

    #[test]
    fn test_validate_ok() {
        let g = grids(bool3((2, 3, 4)), bool3((2, 3, 4)), bool3((2, 3, 4)), bool3((2, 3, 4)));
        let m = validate(g).unwrap();
        assert_eq!(m.shape(), (2, 3, 4));
    }

    #[test]
    fn test_validate_dimension() {
        let flat: RawGrid = ArrayD::from_elem(IxDyn(&[3, 4]), false).into();
        let g = grids(bool3((2, 3, 4)), bool3((2, 3, 4)), flat, bool3((2, 3, 4)));
        assert_eq!(
            validate(g).unwrap_err(),
            ArrayError::DimensionMismatch {
                organ: Organ::Margin,
                ndim: 2
            }
        );
    }

    #[test]
    fn test_validate_shape() {
        let g = grids(bool3((2, 3, 4)), bool3((3, 3, 4)), bool3((2, 3, 4)), bool3((2, 3, 4)));
        assert_eq!(
            validate(g).unwrap_err(),
            ArrayError::ShapeMismatch {
                organ: Organ::Urethra,
                expected: vec![2, 3, 4],
                found: vec![3, 3, 4],
            }
        );
    }

    #[test]
    fn test_validate_type() {
        let ints: RawGrid = ArrayD::<u8>::zeros(IxDyn(&[2, 3, 4])).into();
        let g = grids(bool3((2, 3, 4)), bool3((2, 3, 4)), bool3((2, 3, 4)), ints);
        assert_eq!(
            validate(g).unwrap_err(),
            ArrayError::TypeMismatch {
                organ: Organ::Rectum,
                dtype: DType::U8
            }
        );
    }

    /// 维度错误优先于形状和类型错误.
    #[test]
    fn test_validate_order() {
        let floats: RawGrid = ArrayD::<f32>::zeros(IxDyn(&[2, 3])).into();
        let g = grids(bool3((2, 3, 4)), bool3((9, 9, 9)), bool3((2, 3, 4)), floats);
        assert!(matches!(
            validate(g),
            Err(ArrayError::DimensionMismatch {
                organ: Organ::Rectum,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_empty() {
        let g = grids(bool3((2, 0, 4)), bool3((2, 0, 4)), bool3((2, 0, 4)), bool3((2, 0, 4)));
        assert_eq!(
            validate(g).unwrap_err(),
            ArrayError::EmptyGrid {
                shape: vec![2, 0, 4]
            }
        );
    }
}
