mod common;

use brachy_mask::prelude::*;
use brachy_mask::proc::{block_votes, clean, refine, validate};
use common::{capture_warnings, init_logger};
use common::phantom::prostate_phantom;
use ndarray::{s, Array3, ArrayD, IxDyn};

/// 原始超声图像常见的像素尺寸.
const US_PITCH_CM: f64 = 0.018150;

fn single_block_input() -> RawOrganGrids {
    let mut prostate = Array3::from_elem((1, 20, 20), false);
    prostate.slice_mut(s![0, 0..10, 0..10]).fill(true);
    let empty = Array3::from_elem((1, 20, 20), false);
    RawOrganGrids::from_bool(prostate, empty.clone(), empty.clone(), empty)
}

#[test]
fn single_prostate_block_scenario() {
    init_logger();
    let raw = single_block_input();
    let mesh = MeshSpec::new(0.01, 0.01, 0.5).unwrap();

    // 清洗不改变无重叠的输入, 重采样为 1:1.
    let validated = validate(raw.clone()).unwrap();
    let cleaned = clean(validated.clone());
    assert_eq!(cleaned, validated);
    assert_eq!(refine(&cleaned, &mesh, &TargetPitch::default()), cleaned);

    let proc = MaskProcessor::new(raw, mesh, ProcessParams::default()).unwrap();
    assert_eq!(proc.mesh(), &mesh);
    assert_eq!(proc.params(), &ProcessParams::default());
    assert_eq!(
        proc.fov(),
        &FieldOfView {
            rows: 0..10,
            cols: 0..10
        }
    );
    assert_eq!(proc.fov_masks().shape(), (1, 10, 10));
    assert_eq!(proc.fov_masks().count(Organ::Prostate), 100);

    let coarse = proc.coarse_masks();
    assert_eq!(coarse.shape(), (1, 1, 1));
    assert!(coarse[(Organ::Prostate, (0, 0, 0))]);
    for organ in [Organ::Urethra, Organ::Margin, Organ::Rectum] {
        assert!(!coarse[(organ, (0, 0, 0))], "{organ}");
    }

    assert_eq!(proc.needle_template().dim(), (1, 1));
    assert!(!proc.needle_template().iter().any(|v| *v));
}

#[test]
fn ultrasound_phantom_invariants() {
    init_logger();
    let raw = prostate_phantom((3, 60, 80));
    let mesh = MeshSpec::new(US_PITCH_CM, US_PITCH_CM, 0.5).unwrap();
    let params = ProcessParams::default();
    let proc = MaskProcessor::new(raw, mesh, params).unwrap();

    // 视野对齐.
    let fov = proc.fov();
    assert_eq!(fov.height() % 10, 0);
    assert_eq!(fov.width() % 10, 0);
    assert!(fov.rows.end <= 109 + 9 && fov.cols.end <= 146 + 9);

    // 精细掩膜互斥, 且各器官都有内容.
    let fine = proc.fov_masks();
    assert_eq!(fine.shape(), (3, fov.height(), fov.width()));
    assert!(fine.is_exclusive());
    assert!(fine.numeric_statistics().iter().all(|c| *c > 0));

    // 粗化形状与互斥性.
    let coarse = proc.coarse_masks();
    assert_eq!(coarse.shape(), (3, fov.height() / 10, fov.width() / 10));
    assert!(coarse.is_exclusive());
    assert!(coarse.count(Organ::Prostate) > 0);
    assert!(coarse.count(Organ::Urethra) > 0);
    assert!(coarse.count(Organ::Rectum) > 0);

    // 每个粗体素的分类都能由对应块的票数复现.
    let policy = &params.policy;
    let (z, ch, cw) = coarse.shape();
    for k in 0..z {
        let sli = fine.slice_at(k);
        for h in 0..ch {
            for w in 0..cw {
                let votes = block_votes(&sli, (h, w), 10);
                let label = policy.classify(&votes);
                let expected: Vec<_> = label.organ().into_iter().collect();
                assert_eq!(coarse.labels_at((k, h, w)), expected);
                if let Some(organ) = label.organ() {
                    assert!(votes.get(organ) > policy.threshold(organ));
                }
                for rule in policy.rules() {
                    if Some(rule.organ) == label.organ() {
                        break;
                    }
                    assert!(votes.get(rule.organ) <= rule.threshold);
                }
            }
        }
    }

    // 针模板.
    let t = proc.needle_template();
    assert_eq!(t.dim(), (ch, cw));
    for ((r, c), v) in t.indexed_iter() {
        assert_eq!(*v, r % 5 == 2 && c % 5 == 2);
    }
}

#[test]
fn pipeline_is_deterministic() {
    let mesh = MeshSpec::new(0.02, 0.015, 0.5).unwrap();
    let params = ProcessParams::default();
    let a = MaskProcessor::new(prostate_phantom((2, 40, 50)), mesh, params).unwrap();
    let b = MaskProcessor::new(prostate_phantom((2, 40, 50)), mesh, params).unwrap();
    assert_eq!(a.into_parts(), b.into_parts());
}

#[test]
fn fine_pixels_still_processed() {
    init_logger();
    // 0.005 cm 的像素比目标更精细, 仅输出一条失真警告.
    let mesh = MeshSpec::new(0.005, 0.005, 0.5).unwrap();
    let (proc, warnings) = capture_warnings(|| {
        MaskProcessor::new(prostate_phantom((1, 80, 80)), mesh, ProcessParams::default())
    });
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("失真"));

    let proc = proc.unwrap();
    assert_eq!(proc.fov_masks().len_z(), 1);
    assert!(proc.fov().height() <= 40);
    assert!(proc.coarse_masks().count(Organ::Prostate) > 0);
}

#[test]
fn distortion_warning_only_for_fine_pixels() {
    init_logger();
    let masks = validate(prostate_phantom((1, 40, 40))).unwrap();
    let target = TargetPitch::default();

    let fine = MeshSpec::new(0.005, 0.005, 0.5).unwrap();
    let (_, warnings) = capture_warnings(|| refine(&masks, &fine, &target));
    assert_eq!(warnings.len(), 1, "{warnings:?}");

    let coarse = MeshSpec::new(US_PITCH_CM, US_PITCH_CM, 0.5).unwrap();
    let (_, warnings) = capture_warnings(|| refine(&masks, &coarse, &target));
    assert!(warnings.is_empty(), "{warnings:?}");

    // 只有一个方向更精细时不算失真.
    let mixed = MeshSpec::new(0.005, US_PITCH_CM, 0.5).unwrap();
    let (_, warnings) = capture_warnings(|| refine(&masks, &mixed, &target));
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn structural_errors_abort() {
    let mesh = MeshSpec::new(0.01, 0.01, 0.5).unwrap();

    let mut raw = single_block_input();
    raw.margin = ArrayD::<u8>::zeros(IxDyn(&[1, 20, 20])).into();
    assert_eq!(
        MaskProcessor::new(raw, mesh, ProcessParams::default()).unwrap_err(),
        ArrayError::TypeMismatch {
            organ: Organ::Margin,
            dtype: DType::U8
        }
    );

    let mut raw = single_block_input();
    raw.urethra = Array3::from_elem((2, 20, 20), false).into();
    assert!(matches!(
        MaskProcessor::new(raw, mesh, ProcessParams::default()),
        Err(ArrayError::ShapeMismatch {
            organ: Organ::Urethra,
            ..
        })
    ));
}

#[test]
fn empty_masks_have_no_field_of_view() {
    let empty = Array3::from_elem((2, 30, 30), false);
    let raw = RawOrganGrids::from_bool(empty.clone(), empty.clone(), empty.clone(), empty);
    let mesh = MeshSpec::new(0.01, 0.01, 0.5).unwrap();
    assert_eq!(
        MaskProcessor::new(raw, mesh, ProcessParams::default()).unwrap_err(),
        ArrayError::NoContent
    );
}

#[test]
fn overhanging_fov_is_padded_with_background() {
    let mut rectum = Array3::from_elem((1, 25, 25), false);
    rectum.slice_mut(s![0, 18.., 18..]).fill(true);
    let empty = Array3::from_elem((1, 25, 25), false);
    let raw = RawOrganGrids::from_bool(empty.clone(), empty.clone(), empty, rectum);
    let mesh = MeshSpec::new(0.01, 0.01, 0.5).unwrap();

    let (fov, fine, coarse, needle) = MaskProcessor::new(raw, mesh, ProcessParams::default())
        .unwrap()
        .into_parts();
    assert_eq!(fov.rows, 18..28);
    assert_eq!(fine.shape(), (1, 10, 10));
    assert_eq!(fine.count(Organ::Rectum), 49);
    // 49 > 40.
    assert!(coarse[(Organ::Rectum, (0, 0, 0))]);
    assert_eq!(needle.dim(), (1, 1));
}
