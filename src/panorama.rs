// panorama.rs — 全景裁剪参数与投影模式

use serde::{Deserialize, Serialize};

/// GPano crop of an equirectangular panorama, in full panorama pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanoramaCrop {
    #[serde(rename = "CroppedAreaLeftPixels")]
    pub left: u32,
    #[serde(rename = "CroppedAreaTopPixels")]
    pub top: u32,
    #[serde(rename = "CroppedAreaImageWidthPixels")]
    pub width: u32,
    #[serde(rename = "CroppedAreaImageHeightPixels")]
    pub height: u32,
    #[serde(rename = "FullPanoWidthPixels")]
    pub full_width: u32,
    #[serde(rename = "FullPanoHeightPixels")]
    pub full_height: u32,
}

impl PanoramaCrop {
    /// True when the crop covers the whole 360 x 180 panorama.
    pub fn is_full(&self) -> bool {
        self.left == 0
            && self.top == 0
            && self.width == self.full_width
            && self.height == self.full_height
    }

    /// Larger crop dimension, the unit length of SfM coordinates inside the crop.
    pub fn size(&self) -> f64 {
        f64::from(self.width.max(self.height))
    }
}

/// Mapping between camera bearings and SfM pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionRegime {
    Rectilinear { focal: f64 }, // 标准透视
    FullPanorama,               // 完整 360 x 180 等距柱状
    CroppedPanorama(PanoramaCrop),
}

impl ProjectionRegime {
    pub fn classify(gpano: Option<&PanoramaCrop>, focal: f64) -> Self {
        match gpano {
            Some(crop) if crop.is_full() => ProjectionRegime::FullPanorama,
            Some(crop) => ProjectionRegime::CroppedPanorama(*crop),
            None => ProjectionRegime::Rectilinear { focal },
        }
    }

    pub fn is_full_panorama(&self) -> bool {
        matches!(self, ProjectionRegime::FullPanorama)
    }

    pub fn is_cropped_panorama(&self) -> bool {
        matches!(self, ProjectionRegime::CroppedPanorama(_))
    }

    pub fn is_panorama(&self) -> bool {
        !matches!(self, ProjectionRegime::Rectilinear { .. })
    }
}
