// uniform.rs — 投影矩阵 Uniform (GPU 端布局)

use crate::transform::Transform;

/// Projector data laid out for a uniform buffer.
///
/// `projector` is column major, as expected by WGSL/GLSL `mat4x4<f32>`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ProjectorUniform {
    pub projector: [[f32; 4]; 4],
    pub up: [f32; 3],
    pub pad: f32,
}

impl From<&Transform> for ProjectorUniform {
    fn from(transform: &Transform) -> Self {
        Self {
            projector: transform.projector_matrix().as_mat4().to_cols_array_2d(),
            up: transform.up_vector().as_vec3().to_array(),
            pad: 0.0,
        }
    }
}
