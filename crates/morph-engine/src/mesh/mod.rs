//! CPU-side mesh data.
//!
//! Positions are flat `f32` triples; indices are `u32` triangle-list references.
//! A `Mesh` is never mutated in place: deformations produce new position arrays
//! and reuse the index array, since topology never changes.

mod cube;
mod store;

pub use cube::{CUBE_INDICES, CUBE_POSITIONS};
pub use store::MeshStore;

/// Bytes per vertex in every position buffer (3 x f32).
pub const VERTEX_STRIDE: u64 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<f32>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Builds a mesh, checking the layout invariants.
    ///
    /// Returns `None` when `positions` is not a whole number of triples, the
    /// index count is not a multiple of 3, or an index is out of range.
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Option<Self> {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return None;
        }
        let vertex_count = (positions.len() / 3) as u32;
        if indices.iter().any(|&i| i >= vertex_count) {
            return None;
        }
        Some(Self { positions, indices })
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    /// Size in bytes of the position array.
    #[inline]
    pub fn positions_size(&self) -> u64 {
        self.vertex_count() as u64 * VERTEX_STRIDE
    }

    /// Returns a mesh with the same topology and new positions.
    ///
    /// `None` if `positions` does not match this mesh's vertex layout.
    pub fn with_positions(&self, positions: Vec<f32>) -> Option<Self> {
        if positions.len() != self.positions.len() {
            return None;
        }
        Some(Self {
            positions,
            indices: self.indices.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_index() {
        assert!(Mesh::new(vec![0.0; 9], vec![0, 1, 3]).is_none());
    }

    #[test]
    fn rejects_partial_triples() {
        assert!(Mesh::new(vec![0.0; 8], vec![]).is_none());
        assert!(Mesh::new(vec![0.0; 9], vec![0, 1]).is_none());
    }

    #[test]
    fn with_positions_keeps_topology() {
        let m = Mesh::new(vec![0.0; 9], vec![0, 1, 2]).unwrap();
        let moved = m.with_positions(vec![1.0; 9]).unwrap();
        assert_eq!(moved.indices(), m.indices());
        assert_eq!(moved.positions(), &[1.0; 9]);
        assert!(m.with_positions(vec![1.0; 6]).is_none());
    }
}
