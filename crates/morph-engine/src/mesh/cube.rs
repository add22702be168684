use super::Mesh;

/// Unit cube corners, centred on the origin.
#[rustfmt::skip]
pub const CUBE_POSITIONS: [f32; 24] = [
    -0.5, -0.5, -0.5, // 0
     0.5, -0.5, -0.5, // 1
     0.5,  0.5, -0.5, // 2
    -0.5,  0.5, -0.5, // 3
    -0.5, -0.5,  0.5, // 4
     0.5, -0.5,  0.5, // 5
     0.5,  0.5,  0.5, // 6
    -0.5,  0.5,  0.5, // 7
];

/// Two counter-clockwise (outward-facing) triangles per face.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    4, 5, 6,  4, 6, 7, // front  (z+)
    1, 0, 3,  1, 3, 2, // back   (z-)
    0, 4, 7,  0, 7, 3, // left   (x-)
    5, 1, 2,  5, 2, 6, // right  (x+)
    7, 6, 2,  7, 2, 3, // top    (y+)
    0, 1, 5,  0, 5, 4, // bottom (y-)
];

/// The same literal geometry on every call.
pub(super) fn cube() -> Mesh {
    Mesh {
        positions: CUBE_POSITIONS.to_vec(),
        indices: CUBE_INDICES.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(i: u32) -> [f32; 3] {
        let i = i as usize * 3;
        [CUBE_POSITIONS[i], CUBE_POSITIONS[i + 1], CUBE_POSITIONS[i + 2]]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn cube_has_8_vertices_and_12_triangles() {
        let m = cube();
        assert_eq!(m.vertex_count(), 8);
        assert_eq!(m.triangle_count(), 12);
        assert_eq!(m.indices().len(), 36);
        assert!(m.indices().iter().all(|&i| i < 8));
    }

    #[test]
    fn every_triangle_faces_outward() {
        for tri in CUBE_INDICES.chunks(3) {
            let (a, b, c) = (corner(tri[0]), corner(tri[1]), corner(tri[2]));
            let normal = cross(sub(b, a), sub(c, a));
            let centroid = [
                (a[0] + b[0] + c[0]) / 3.0,
                (a[1] + b[1] + c[1]) / 3.0,
                (a[2] + b[2] + c[2]) / 3.0,
            ];
            assert!(dot(normal, centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(cube(), cube());
    }
}
