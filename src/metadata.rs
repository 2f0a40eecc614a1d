// metadata.rs — 节点元数据 (JSON)

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::panorama::PanoramaCrop;

/// Per image metadata as delivered by the image API.
///
/// Every field is optional; missing or non-positive values are replaced by
/// fallbacks when a [`crate::Transform`] is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub orientation: Option<i64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Focal length normalized by the larger image dimension.
    pub cfocal: Option<f64>,
    pub atomic_scale: Option<f64>,
    pub gpano: Option<PanoramaCrop>,
    /// Axis-angle rotation, world to camera.
    pub rotation: Option<DVec3>,
}

impl NodeMetadata {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
