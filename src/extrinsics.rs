// extrinsics.rs — 外参矩阵 [R | t] 与缩放版本 s * [R | t]

use glam::{DMat3, DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};

/// Camera pose as produced by the external alignment process.
///
/// `rotation` is an axis-angle vector: its direction is the rotation axis and
/// its length the angle in radians. The pose maps world to camera space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    pub rotation: DVec3,
    pub translation: DVec3,
}

impl CameraPose {
    pub fn new(rotation: DVec3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Builds a pose from an explicit axis and angle.
    ///
    /// A zero axis is only accepted together with a zero angle.
    pub fn from_axis_angle(axis: DVec3, angle: f64, translation: DVec3) -> Result<Self> {
        let length = axis.length();
        if length == 0.0 {
            if angle != 0.0 {
                return Err(TransformError::InvalidPose(format!(
                    "zero length rotation axis with angle {angle}"
                )));
            }
            return Ok(Self::new(DVec3::ZERO, translation));
        }
        Ok(Self::new(axis / length * angle, translation))
    }

    /// World to camera matrix `[R | t]`.
    pub fn rt(&self) -> Result<DMat4> {
        if !self.rotation.is_finite() || !self.translation.is_finite() {
            return Err(TransformError::InvalidPose(format!(
                "non-finite pose: rotation {}, translation {}",
                self.rotation, self.translation
            )));
        }

        let angle = self.rotation.length();
        let rotation = if angle > 0.0 {
            DMat3::from_axis_angle(self.rotation / angle, angle)
        } else {
            DMat3::IDENTITY
        };

        let mut rt = DMat4::from_mat3(rotation);
        rt.w_axis = self.translation.extend(1.0);
        Ok(rt)
    }
}

/// Scales both the linear block and the translation of `rt` by `scale`.
pub fn scaled_rt(rt: &DMat4, scale: f64) -> DMat4 {
    DMat4::from_cols(
        rt.x_axis * scale,
        rt.y_axis * scale,
        rt.z_axis * scale,
        (rt.w_axis.truncate() * scale).extend(1.0),
    )
}
