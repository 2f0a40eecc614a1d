// error.rs — 错误类型

use thiserror::Error;

pub type Result<T, E = TransformError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TransformError {
    /// The supplied pose cannot produce a rigid transform.
    #[error("invalid camera pose: {0}")]
    InvalidPose(String),

    /// The extrinsic matrix is singular and cannot be used for unprojection.
    #[error("extrinsic matrix is not invertible (determinant {determinant})")]
    NonInvertibleTransform { determinant: f64 },

    #[error("failed to parse node metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}
