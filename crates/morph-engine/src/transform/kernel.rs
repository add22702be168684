//! CPU reference for the deformation kernel in `shaders/deform.wgsl`.
//!
//! Test oracle for the GPU output; nothing in the runtime path calls it.
//! Any change here must be mirrored in the shader.

use glam::{Mat3, Vec3};

use super::{Operation, OperationRequest};

/// Inflate leaves vertices this close to the origin untouched.
pub const INFLATE_MIN_RADIUS: f32 = 0.001;

/// Radius of the sphere Inflate pulls toward.
pub const INFLATE_RADIUS: f32 = 0.5;

/// Deforms a single vertex.
pub fn deform_vertex(request: OperationRequest, p: [f32; 3]) -> [f32; 3] {
    let v = Vec3::from_array(p);
    let param = request.param;

    let out = match request.operation {
        Operation::Scale => v * param,
        // x' = x cos + z sin, z' = -x sin + z cos
        Operation::Rotate => Mat3::from_rotation_y(param * std::f32::consts::PI) * v,
        Operation::Translate => v + Vec3::Y * ((param - 1.0) * 0.5),
        Operation::Inflate => {
            let len = v.length();
            if len <= INFLATE_MIN_RADIUS {
                return p;
            }
            // param 1 is neutral; 0 lands on the sphere, 2 overshoots past it.
            let t = 1.0 - param.clamp(0.0, 2.0);
            let on_sphere = v * (INFLATE_RADIUS / len);
            v + (on_sphere - v) * t
        }
    };
    out.to_array()
}

/// Deforms a flat position array, producing a new one.
pub fn deform(positions: &[f32], request: OperationRequest) -> Vec<f32> {
    let mut out = Vec::with_capacity(positions.len());
    for v in positions.chunks_exact(3) {
        out.extend_from_slice(&deform_vertex(request, [v[0], v[1], v[2]]));
    }
    out
}
