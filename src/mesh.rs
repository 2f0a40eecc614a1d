// mesh.rs — 预览网格生成
// 以 basic 坐标网格为顶点，通过 Transform 反投影到世界坐标

use glam::DVec2;

use crate::error::Result;
use crate::transform::Transform;

#[derive(Debug, Clone)]
pub struct PreviewMesh {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Builds a `rows` x `cols` grid mesh of the image at `depth` in world space.
///
/// Rectilinear images become a plane at camera depth `depth`; panoramas
/// become a sphere (patch) of radius `depth` around the camera center. UVs use
/// the texture convention of [`Transform::projector_matrix`].
pub fn build_preview_mesh(
    transform: &Transform,
    depth: f64,
    rows: usize,
    cols: usize,
) -> Result<PreviewMesh> {
    let rows = rows.max(1);
    let cols = cols.max(1);
    let panorama = transform.regime().is_panorama();

    let mut positions = Vec::with_capacity((rows + 1) * (cols + 1));
    let mut uvs = Vec::with_capacity((rows + 1) * (cols + 1));
    let mut indices = Vec::with_capacity(rows * cols * 6);

    for i in 0..=rows {
        let v = i as f64 / rows as f64;

        for j in 0..=cols {
            let u = j as f64 / cols as f64;
            let basic = DVec2::new(u, v);

            let vertex = if panorama {
                transform.unproject_basic(basic, depth)?
            } else {
                let sfm = transform.basic_to_sfm(basic);
                transform.pixel_to_vertex(sfm.x, sfm.y, depth)?
            };

            positions.push(vertex.as_vec3().to_array());
            uvs.push([u as f32, 1.0 - v as f32]);
        }
    }

    for i in 0..rows {
        for j in 0..cols {
            let a = (i * (cols + 1) + j) as u32;
            let b = a + (cols + 1) as u32;

            indices.extend_from_slice(&[
                a, b, a + 1,
                b, b + 1, a + 1,
            ]);
        }
    }

    log::trace!(
        "preview mesh {}x{}: {} vertices, {} triangles",
        rows,
        cols,
        positions.len(),
        indices.len() / 3
    );

    Ok(PreviewMesh {
        positions,
        uvs,
        indices,
    })
}
