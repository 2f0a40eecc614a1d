// orientation.rs — EXIF 方向与 basic/SfM 坐标互换
//
// SfM coordinates: origin at the image center, the larger image dimension spans 1.
// Basic coordinates: [0, 1] x [0, 1] in the upright (orientation corrected) image.

use glam::DVec2;

/// Decoded image size used when neither metadata nor an image is available.
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (4, 3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Upright,      // 1
    Rotated180,   // 3
    Rotated90Cw,  // 6
    Rotated90Ccw, // 8
}

impl Orientation {
    /// Unknown, mirrored and missing codes all resolve to [`Orientation::Upright`].
    pub fn from_exif(code: Option<i64>) -> Self {
        match code {
            Some(3) => Orientation::Rotated180,
            Some(6) => Orientation::Rotated90Cw,
            Some(8) => Orientation::Rotated90Ccw,
            _ => Orientation::Upright,
        }
    }

    pub fn exif(self) -> u8 {
        match self {
            Orientation::Upright => 1,
            Orientation::Rotated180 => 3,
            Orientation::Rotated90Cw => 6,
            Orientation::Rotated90Ccw => 8,
        }
    }

    /// True when the sensor axes are swapped relative to the upright image.
    pub fn is_transposed(self) -> bool {
        matches!(self, Orientation::Rotated90Cw | Orientation::Rotated90Ccw)
    }

    /// Basic point to the sensor-aligned ("rotated") unit square.
    fn rotate(self, p: DVec2) -> DVec2 {
        match self {
            Orientation::Upright => p,
            Orientation::Rotated180 => DVec2::new(1.0 - p.x, 1.0 - p.y),
            Orientation::Rotated90Cw => DVec2::new(p.y, 1.0 - p.x),
            Orientation::Rotated90Ccw => DVec2::new(1.0 - p.y, p.x),
        }
    }

    fn unrotate(self, p: DVec2) -> DVec2 {
        match self {
            Orientation::Upright => p,
            Orientation::Rotated180 => DVec2::new(1.0 - p.x, 1.0 - p.y),
            // 6 和 8 互为逆变换
            Orientation::Rotated90Cw => Orientation::Rotated90Ccw.rotate(p),
            Orientation::Rotated90Ccw => Orientation::Rotated90Cw.rotate(p),
        }
    }
}

/// Resolved image dimensions of one node.
///
/// `sfm_width`/`sfm_height` are the sensor dimensions used by the
/// reconstruction. The basic (upright) dimensions swap them for transposed
/// orientations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGeometry {
    pub sfm_width: f64,
    pub sfm_height: f64,
    pub orientation: Orientation,
}

impl ImageGeometry {
    /// Resolves declared dimensions against the decoded image size.
    ///
    /// A declared value that is missing or not positive falls back to the
    /// decoded image dimension. The decoded dimensions are swapped first when
    /// the orientation is transposed.
    pub fn resolve(
        width: Option<f64>,
        height: Option<f64>,
        orientation: Orientation,
        image_size: Option<(u32, u32)>,
    ) -> Self {
        let (image_width, image_height) = image_size.unwrap_or(DEFAULT_IMAGE_SIZE);
        let (fallback_width, fallback_height) = if orientation.is_transposed() {
            (image_height, image_width)
        } else {
            (image_width, image_height)
        };

        let sfm_width = positive_or(width, f64::from(fallback_width));
        let sfm_height = positive_or(height, f64::from(fallback_height));
        if width != Some(sfm_width) || height != Some(sfm_height) {
            log::debug!(
                "image size {:?}x{:?} resolved to {}x{} (decoded {}x{})",
                width,
                height,
                sfm_width,
                sfm_height,
                image_width,
                image_height
            );
        }

        Self {
            sfm_width,
            sfm_height,
            orientation,
        }
    }

    pub fn basic_width(&self) -> f64 {
        if self.orientation.is_transposed() {
            self.sfm_height
        } else {
            self.sfm_width
        }
    }

    pub fn basic_height(&self) -> f64 {
        if self.orientation.is_transposed() {
            self.sfm_width
        } else {
            self.sfm_height
        }
    }

    pub fn basic_aspect(&self) -> f64 {
        self.basic_width() / self.basic_height()
    }

    /// Larger sensor dimension, the unit length of SfM coordinates.
    pub fn size(&self) -> f64 {
        self.sfm_width.max(self.sfm_height)
    }

    pub fn basic_to_sfm(&self, basic: DVec2) -> DVec2 {
        let rotated = self.orientation.rotate(basic);
        let extent = DVec2::new(self.sfm_width, self.sfm_height) / self.size();
        rotated * extent - extent / 2.0
    }

    pub fn sfm_to_basic(&self, sfm: DVec2) -> DVec2 {
        let extent = DVec2::new(self.sfm_width, self.sfm_height) / self.size();
        let rotated = (sfm + extent / 2.0) / extent;
        self.orientation.unrotate(rotated)
    }
}

/// Returns `value` when it is present and positive, `fallback` otherwise.
pub(crate) fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 => v,
        _ => fallback,
    }
}
