//! Procedural geometry generators
//!
//! Free functions producing plain vertex-data structs. A single
//! buffer-owning [`crate::render::Renderable`] consumes these; there is no
//! per-shape type hierarchy.

/// Plain vertex data for a renderable
///
/// Arrays that do not apply may be left empty. `positions` is always three
/// floats per vertex; `normals` three; `colors` four; `uvs` two.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions, xyz per vertex
    pub positions: Vec<f32>,
    /// Vertex normals, xyz per vertex
    pub normals: Vec<f32>,
    /// Vertex colors, rgba per vertex
    pub colors: Vec<f32>,
    /// Texture coordinates, uv per vertex
    pub uvs: Vec<f32>,
    /// Triangle indices; empty for non-indexed geometry
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Number of vertices described by the position array
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Axis-aligned cube centered on the origin with the given edge length
///
/// 24 vertices (4 per face, so normals and uvs stay flat per face) and 36
/// indices.
pub fn cube(size: f32) -> GeometryData {
    let h = size * 0.5;

    // Faces in +Z, -Z, +X, -X, +Y, -Y order
    let face_data: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut data = GeometryData::default();
    for (face, (normal, right, up)) in face_data.iter().enumerate() {
        let base = (face * 4) as u32;
        for (du, dv) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            for axis in 0..3 {
                data.positions
                    .push(h * (normal[axis] + du * right[axis] + dv * up[axis]));
                data.normals.push(normal[axis]);
            }
            data.uvs.push((du + 1.0) * 0.5);
            data.uvs.push((dv + 1.0) * 0.5);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

/// Quad in the XY plane centered on the origin
pub fn quad(width: f32, height: f32) -> GeometryData {
    let hw = width * 0.5;
    let hh = height * 0.5;

    GeometryData {
        positions: vec![
            -hw, -hh, 0.0, //
            hw, -hh, 0.0, //
            hw, hh, 0.0, //
            -hw, hh, 0.0,
        ],
        normals: vec![
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        colors: Vec::new(),
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Non-indexed triangle in the XY plane centered on the origin
pub fn triangle(size: f32) -> GeometryData {
    let h = size * 0.5;

    GeometryData {
        positions: vec![
            -h, -h, 0.0, //
            h, -h, 0.0, //
            0.0, h, 0.0,
        ],
        normals: vec![
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 0.5, 1.0],
        colors: Vec::new(),
        indices: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_shape() {
        let cube = cube(2.0);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.normals.len(), cube.positions.len());
        assert_eq!(cube.uvs.len(), 24 * 2);

        // Every coordinate sits on the half-extent boundary
        assert!(cube.positions.iter().all(|p| p.abs() == 1.0));
    }

    #[test]
    fn test_quad_is_indexed() {
        let quad = quad(1.0, 2.0);
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.indices.len(), 6);
    }

    #[test]
    fn test_triangle_is_non_indexed() {
        let tri = triangle(1.0);
        assert_eq!(tri.vertex_count(), 3);
        assert!(tri.indices.is_empty());
    }
}
