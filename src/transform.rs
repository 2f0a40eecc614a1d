// transform.rs — 单张图像的坐标变换 (world <-> SfM <-> basic)

use glam::{DMat4, DVec2, DVec3};

use crate::error::{Result, TransformError};
use crate::extrinsics::{scaled_rt, CameraPose};
use crate::metadata::NodeMetadata;
use crate::orientation::{positive_or, ImageGeometry, Orientation};
use crate::panorama::{PanoramaCrop, ProjectionRegime};
use crate::projection;

pub const DEFAULT_FOCAL: f64 = 1.0;
pub const DEFAULT_SCALE: f64 = 0.0;

/// Coordinate transformations and projections of one image node.
///
/// Built once from node metadata and immutable afterwards. All conversions are
/// pure functions of the constructed state, so a `Transform` can be shared
/// freely between threads.
///
/// Coordinate spaces:
/// * world: 3D reconstruction coordinates.
/// * camera: world transformed by `rt`, x right, y down, z forward.
/// * SfM: 2D image coordinates, origin at the center, larger sensor side spans 1.
/// * basic: [0, 1] x [0, 1] in the upright image, origin top left.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    geometry: ImageGeometry,
    focal: f64,
    scale: f64,
    gpano: Option<PanoramaCrop>,
    regime: ProjectionRegime,
    rt: DMat4,
    srt: DMat4,
    rt_inverse: Option<DMat4>,
}

impl Transform {
    /// Builds the transform of a node.
    ///
    /// `image_size` is the decoded image size, only used when the metadata
    /// lacks dimensions. `translation` comes from the external alignment.
    pub fn new(
        metadata: &NodeMetadata,
        image_size: Option<(u32, u32)>,
        translation: DVec3,
    ) -> Result<Self> {
        let orientation = Orientation::from_exif(metadata.orientation);
        if metadata.orientation.is_some_and(|code| i64::from(orientation.exif()) != code) {
            log::debug!(
                "orientation {:?} treated as {}",
                metadata.orientation,
                orientation.exif()
            );
        }

        let geometry =
            ImageGeometry::resolve(metadata.width, metadata.height, orientation, image_size);

        let focal = positive_or(metadata.cfocal, DEFAULT_FOCAL);
        let scale = positive_or(metadata.atomic_scale, DEFAULT_SCALE);
        if metadata.cfocal != Some(focal) {
            log::debug!("focal {:?} replaced by {focal}", metadata.cfocal);
        }

        let pose = CameraPose::new(metadata.rotation.unwrap_or(DVec3::ZERO), translation);
        let rt = pose.rt()?;
        let srt = scaled_rt(&rt, scale);

        let determinant = rt.determinant();
        let rt_inverse = (determinant.is_finite() && determinant.abs() > f64::EPSILON)
            .then(|| rt.inverse());

        let gpano = metadata.gpano;
        let regime = ProjectionRegime::classify(gpano.as_ref(), focal);
        log::trace!("transform regime {regime:?}, orientation {orientation:?}");

        Ok(Self {
            geometry,
            focal,
            scale,
            gpano,
            regime,
            rt,
            srt,
            rt_inverse,
        })
    }

    /// Like [`Transform::new`], taking the fallback size from a decoded image.
    pub fn from_image<I: image::GenericImageView>(
        metadata: &NodeMetadata,
        image: &I,
        translation: DVec3,
    ) -> Result<Self> {
        Self::new(metadata, Some(image.dimensions()), translation)
    }

    /// Upright image width.
    pub fn width(&self) -> f64 {
        self.geometry.basic_width()
    }

    /// Upright image height.
    pub fn height(&self) -> f64 {
        self.geometry.basic_height()
    }

    pub fn sfm_width(&self) -> f64 {
        self.geometry.sfm_width
    }

    pub fn sfm_height(&self) -> f64 {
        self.geometry.sfm_height
    }

    /// Aspect ratio of the upright image.
    pub fn basic_aspect(&self) -> f64 {
        self.geometry.basic_aspect()
    }

    pub fn focal(&self) -> f64 {
        self.focal
    }

    /// Atomic reconstruction scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn orientation(&self) -> Orientation {
        self.geometry.orientation
    }

    pub fn gpano(&self) -> Option<&PanoramaCrop> {
        self.gpano.as_ref()
    }

    pub fn regime(&self) -> &ProjectionRegime {
        &self.regime
    }

    pub fn is_full_panorama(&self) -> bool {
        self.regime.is_full_panorama()
    }

    pub fn is_cropped_panorama(&self) -> bool {
        self.regime.is_cropped_panorama()
    }

    /// Extrinsic camera matrix `[R | t]`, world to camera.
    pub fn rt(&self) -> &DMat4 {
        &self.rt
    }

    /// Scaled extrinsic camera matrix `scale * [R | t]`.
    pub fn srt(&self) -> &DMat4 {
        &self.srt
    }

    /// Projects a world point to SfM coordinates.
    pub fn project_sfm(&self, point: DVec3) -> DVec2 {
        let camera = self.rt.transform_point3(point);
        projection::bearing_to_pixel(&self.regime, camera)
    }

    /// Unprojects SfM coordinates to the world point `distance` away from the
    /// camera center along the pixel ray.
    pub fn unproject_sfm(&self, pixel: DVec2, distance: f64) -> Result<DVec3> {
        let bearing = projection::pixel_to_bearing(&self.regime, pixel);
        self.camera_to_world(bearing * distance)
    }

    /// Projects a world point to basic coordinates.
    pub fn project_basic(&self, point: DVec3) -> DVec2 {
        self.sfm_to_basic(self.project_sfm(point))
    }

    pub fn unproject_basic(&self, basic: DVec2, distance: f64) -> Result<DVec3> {
        self.unproject_sfm(self.basic_to_sfm(basic), distance)
    }

    /// Unprojects SfM coordinates to the world point at camera depth `depth`.
    ///
    /// Always uses pinhole math, also for panoramas. Callers building preview
    /// geometry for panoramas should go through [`Transform::unproject_sfm`].
    pub fn pixel_to_vertex(&self, x: f64, y: f64, depth: f64) -> Result<DVec3> {
        let camera = DVec3::new(x / self.focal * depth, y / self.focal * depth, depth);
        self.camera_to_world(camera)
    }

    pub fn basic_to_sfm(&self, basic: DVec2) -> DVec2 {
        self.geometry.basic_to_sfm(basic)
    }

    pub fn sfm_to_basic(&self, sfm: DVec2) -> DVec2 {
        self.geometry.sfm_to_basic(sfm)
    }

    pub fn pixel_to_bearing(&self, pixel: DVec2) -> DVec3 {
        projection::pixel_to_bearing(&self.regime, pixel)
    }

    pub fn bearing_to_pixel(&self, bearing: DVec3) -> DVec2 {
        projection::bearing_to_pixel(&self.regime, bearing)
    }

    /// Matrix projecting homogeneous world points to texture coordinates.
    ///
    /// After the perspective divide, x is the basic x coordinate and y is
    /// `1 - basic y` (texture origin bottom left). Pinhole model only.
    pub fn projector_matrix(&self) -> DMat4 {
        let f = self.focal;
        let projection = from_rows([
            [f, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ]);

        self.normalized_to_texture() * projection * self.rt
    }

    /// Normalized, orientation adjusted up vector of the camera in world space.
    pub fn up_vector(&self) -> DVec3 {
        let x_row = self.rt.row(0).truncate();
        let y_row = self.rt.row(1).truncate();

        match self.geometry.orientation {
            Orientation::Upright => -y_row,
            Orientation::Rotated180 => y_row,
            Orientation::Rotated90Cw => -x_row,
            Orientation::Rotated90Ccw => x_row,
        }
    }

    fn camera_to_world(&self, camera: DVec3) -> Result<DVec3> {
        let inverse = self
            .rt_inverse
            .as_ref()
            .ok_or(TransformError::NonInvertibleTransform {
                determinant: self.rt.determinant(),
            })?;
        Ok(inverse.project_point3(camera))
    }

    fn normalized_to_texture(&self) -> DMat4 {
        let size = self.geometry.size();
        let w = size / self.geometry.sfm_width;
        let h = size / self.geometry.sfm_height;

        let (x_row, y_row) = match self.geometry.orientation {
            Orientation::Upright => ([w, 0.0, 0.0, 0.5], [0.0, -h, 0.0, 0.5]),
            Orientation::Rotated180 => ([-w, 0.0, 0.0, 0.5], [0.0, h, 0.0, 0.5]),
            Orientation::Rotated90Cw => ([0.0, -h, 0.0, 0.5], [-w, 0.0, 0.0, 0.5]),
            Orientation::Rotated90Ccw => ([0.0, h, 0.0, 0.5], [w, 0.0, 0.0, 0.5]),
        };

        from_rows([x_row, y_row, [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]])
    }
}

/// glam matrices are column major.
fn from_rows(rows: [[f64; 4]; 4]) -> DMat4 {
    DMat4::from_cols_array_2d(&rows).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::DVec4;

    const EPS: f64 = 1e-9;

    const ORIENTATIONS: [i64; 4] = [1, 3, 6, 8];

    fn metadata(orientation: i64) -> NodeMetadata {
        NodeMetadata {
            orientation: Some(orientation),
            width: Some(1600.0),
            height: Some(1200.0),
            cfocal: Some(0.85),
            atomic_scale: Some(1.0),
            gpano: None,
            rotation: Some(DVec3::new(0.2, -0.4, 0.1)),
        }
    }

    #[test]
    fn defaults_for_empty_metadata() {
        let transform = Transform::new(&NodeMetadata::default(), None, DVec3::ZERO).unwrap();

        assert_eq!(transform.width(), 4.0);
        assert_eq!(transform.height(), 3.0);
        assert_eq!(transform.focal(), DEFAULT_FOCAL);
        assert_eq!(transform.scale(), DEFAULT_SCALE);
        assert_eq!(transform.orientation(), Orientation::Upright);
        assert_eq!(*transform.rt(), DMat4::IDENTITY);
        assert_eq!(*transform.srt(), from_rows([
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]));
    }

    #[test]
    fn rotated_node_scenario() {
        let meta = NodeMetadata {
            orientation: Some(6),
            width: Some(3000.0),
            height: Some(4000.0),
            atomic_scale: Some(2.0),
            rotation: Some(DVec3::ZERO),
            ..Default::default()
        };
        let transform = Transform::new(&meta, None, DVec3::new(1.0, 2.0, 3.0)).unwrap();

        assert_eq!(transform.width(), 4000.0);
        assert_eq!(transform.height(), 3000.0);
        assert_abs_diff_eq!(transform.basic_aspect(), 4000.0 / 3000.0, epsilon = 1e-12);

        assert_eq!(transform.rt().w_axis, DVec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(transform.rt().x_axis, DVec4::X);
        assert_eq!(transform.srt().w_axis, DVec4::new(2.0, 4.0, 6.0, 1.0));
    }

    #[test]
    fn rectilinear_world_round_trip() {
        let transform = Transform::new(&metadata(1), None, DVec3::new(0.5, -1.0, 2.0)).unwrap();
        let point = DVec3::new(0.3, 0.2, 4.0);

        let depth = transform.rt().transform_point3(point).z;
        assert!(depth > 0.0);

        let pixel = transform.project_sfm(point);
        let distance = transform.rt().transform_point3(point).length();
        let back = transform.unproject_sfm(pixel, distance).unwrap();
        assert!(back.abs_diff_eq(point, EPS), "{point} -> {back}");

        let vertex = transform.pixel_to_vertex(pixel.x, pixel.y, depth).unwrap();
        assert!(vertex.abs_diff_eq(point, EPS), "{point} -> {vertex}");
    }

    #[test]
    fn basic_round_trip_all_orientations() {
        for orientation in ORIENTATIONS {
            let transform = Transform::new(&metadata(orientation), None, DVec3::ONE).unwrap();
            let basic = DVec2::new(0.3, 0.7);

            let world = transform.unproject_basic(basic, 10.0).unwrap();
            let back = transform.project_basic(world);
            assert!(back.abs_diff_eq(basic, EPS), "{orientation}: {basic} -> {back}");
        }
    }

    #[test]
    fn projector_matches_basic_projection() {
        for orientation in ORIENTATIONS {
            let transform =
                Transform::new(&metadata(orientation), None, DVec3::new(0.1, 0.2, 0.3)).unwrap();
            let projector = transform.projector_matrix();

            for &(x, y) in &[(0.5, 0.5), (0.1, 0.2), (0.9, 0.6)] {
                let world = transform.unproject_basic(DVec2::new(x, y), 3.0).unwrap();
                let texture = projector.project_point3(world);
                assert_abs_diff_eq!(texture.x, x, epsilon = EPS);
                assert_abs_diff_eq!(texture.y, 1.0 - y, epsilon = EPS);
            }
        }
    }

    #[test]
    fn up_vector_reads_rt_rows() {
        let transform = Transform::new(&metadata(1), None, DVec3::ZERO).unwrap();
        let rte = transform.rt().to_cols_array();

        let up = transform.up_vector();
        assert_eq!(up, DVec3::new(-rte[1], -rte[5], -rte[9]));
        assert_abs_diff_eq!(up.length(), 1.0, epsilon = 1e-12);

        let flipped = Transform::new(&metadata(3), None, DVec3::ZERO).unwrap();
        assert_eq!(flipped.up_vector(), -up);

        let cw = Transform::new(&metadata(6), None, DVec3::ZERO).unwrap();
        assert_eq!(cw.up_vector(), DVec3::new(-rte[0], -rte[4], -rte[8]));

        let ccw = Transform::new(&metadata(8), None, DVec3::ZERO).unwrap();
        assert_eq!(ccw.up_vector(), -cw.up_vector());
    }

    #[test]
    fn identity_camera_looks_down_z_with_y_up_negative() {
        let meta = NodeMetadata::default();
        let transform = Transform::new(&meta, None, DVec3::ZERO).unwrap();
        assert_eq!(transform.up_vector(), DVec3::new(0.0, -1.0, 0.0));

        let center = transform.unproject_basic(DVec2::splat(0.5), 2.0).unwrap();
        assert!(center.abs_diff_eq(DVec3::new(0.0, 0.0, 2.0), EPS));
    }

    #[test]
    fn invalid_pose_is_reported() {
        let meta = NodeMetadata {
            rotation: Some(DVec3::new(f64::NAN, 0.0, 0.0)),
            ..Default::default()
        };
        let err = Transform::new(&meta, None, DVec3::ZERO).unwrap_err();
        assert!(matches!(err, TransformError::InvalidPose(_)));
    }

    #[test]
    fn singular_rt_is_reported_on_unproject() {
        let mut transform = Transform::new(&NodeMetadata::default(), None, DVec3::ZERO).unwrap();
        transform.rt = DMat4::ZERO;
        transform.rt_inverse = None;

        let err = transform.unproject_sfm(DVec2::ZERO, 1.0).unwrap_err();
        assert!(matches!(err, TransformError::NonInvertibleTransform { .. }));
        assert!(transform.pixel_to_vertex(0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn from_image_uses_decoded_dimensions() {
        let image = image::RgbaImage::new(640, 480);
        let meta = NodeMetadata {
            orientation: Some(8),
            ..Default::default()
        };
        let transform = Transform::from_image(&meta, &image, DVec3::ZERO).unwrap();

        assert_eq!(transform.sfm_width(), 480.0);
        assert_eq!(transform.sfm_height(), 640.0);
        assert_eq!(transform.width(), 640.0);
        assert_abs_diff_eq!(transform.basic_aspect(), 640.0 / 480.0, epsilon = 1e-12);
    }

    #[test]
    fn transform_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transform>();
    }
}
