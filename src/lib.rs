// lib.rs — 街景/全景查看器的坐标变换核心
//
// world <-> camera (SfM) <-> basic image coordinates, for rectilinear images,
// full equirectangular panoramas and cropped panoramas.

mod error;
mod extrinsics;
mod mesh;
mod metadata;
mod orientation;
mod panorama;
mod projection;
mod transform;
mod uniform;

pub use error::{Result, TransformError};
pub use extrinsics::{scaled_rt, CameraPose};
pub use mesh::{build_preview_mesh, PreviewMesh};
pub use metadata::NodeMetadata;
pub use orientation::{ImageGeometry, Orientation, DEFAULT_IMAGE_SIZE};
pub use panorama::{PanoramaCrop, ProjectionRegime};
pub use projection::{bearing_to_pixel, pixel_to_bearing};
pub use transform::{Transform, DEFAULT_FOCAL, DEFAULT_SCALE};
pub use uniform::ProjectorUniform;

pub use glam;
