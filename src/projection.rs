// projection.rs — 相机方向向量 (bearing) 与 SfM 像素坐标互换

use std::f64::consts::{PI, TAU};

use glam::{DVec2, DVec3};

use crate::panorama::{PanoramaCrop, ProjectionRegime};

/// Camera space ray through an SfM pixel.
///
/// Panorama regimes return unit vectors; the rectilinear regime returns the
/// normalized `(x, y, focal)` ray.
pub fn pixel_to_bearing(regime: &ProjectionRegime, pixel: DVec2) -> DVec3 {
    match regime {
        ProjectionRegime::FullPanorama => {
            let lon = pixel.x * TAU;
            let lat = -pixel.y * TAU;
            sphere_point(lon, lat)
        }
        ProjectionRegime::CroppedPanorama(crop) => {
            let full = crop_to_full(crop, pixel);
            let lon = TAU * (full.x / f64::from(crop.full_width) - 0.5);
            let lat = -PI * (full.y / f64::from(crop.full_height) - 0.5);
            sphere_point(lon, lat)
        }
        ProjectionRegime::Rectilinear { focal } => DVec3::new(pixel.x, pixel.y, *focal).normalize(),
    }
}

/// SfM pixel of a camera space bearing. Inverse of [`pixel_to_bearing`].
///
/// Panorama regimes accept bearings of any positive length. The rectilinear
/// regime divides by `z` and is only meaningful in front of the camera.
pub fn bearing_to_pixel(regime: &ProjectionRegime, bearing: DVec3) -> DVec2 {
    match regime {
        ProjectionRegime::FullPanorama => {
            let (lon, lat) = lon_lat(bearing);
            DVec2::new(lon / TAU, -lat / TAU)
        }
        ProjectionRegime::CroppedPanorama(crop) => {
            let (lon, lat) = lon_lat(bearing);
            let full = DVec2::new(
                (lon / TAU + 0.5) * f64::from(crop.full_width),
                (-lat / PI + 0.5) * f64::from(crop.full_height),
            );
            full_to_crop(crop, full)
        }
        ProjectionRegime::Rectilinear { focal } => {
            DVec2::new(bearing.x * focal / bearing.z, bearing.y * focal / bearing.z)
        }
    }
}

#[inline]
fn sphere_point(lon: f64, lat: f64) -> DVec3 {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    DVec3::new(cos_lat * sin_lon, -sin_lat, cos_lat * cos_lon)
}

#[inline]
fn lon_lat(bearing: DVec3) -> (f64, f64) {
    let lon = bearing.x.atan2(bearing.z);
    let lat = (-bearing.y).atan2(bearing.x.hypot(bearing.z));
    (lon, lat)
}

/// Crop-local SfM pixel to full panorama pixel.
fn crop_to_full(crop: &PanoramaCrop, pixel: DVec2) -> DVec2 {
    pixel * crop.size() + crop_center(crop)
}

fn full_to_crop(crop: &PanoramaCrop, full: DVec2) -> DVec2 {
    (full - crop_center(crop)) / crop.size()
}

#[inline]
fn crop_center(crop: &PanoramaCrop) -> DVec2 {
    DVec2::new(
        f64::from(crop.width) / 2.0 + f64::from(crop.left),
        f64::from(crop.height) / 2.0 + f64::from(crop.top),
    )
}
