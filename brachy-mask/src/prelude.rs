//! 🍑欢迎光临🍒
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{MeshSpec, Organ, OrganLabel, OrganMasks, OrganSlice};
pub use crate::data::{DType, RawGrid, RawOrganGrids};
pub use crate::error::ArrayError;

pub use crate::consts::label::{
    LABEL_BACKGROUND, LABEL_MARGIN, LABEL_PROSTATE, LABEL_RECTUM, LABEL_URETHRA,
};
pub use crate::consts::COARSEN_FACTOR;

pub use crate::proc::{
    FieldOfView, MaskProcessor, NeedleLattice, ProcessParams, TargetPitch, VoteCounts, VotePolicy,
    VoteRule,
};
