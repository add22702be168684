use super::{cube, Mesh};

/// Owns the canonical mesh.
///
/// `reset` regenerates it; any GPU buffer sized against the previous mesh must
/// be rebuilt by its owner afterwards.
#[derive(Debug)]
pub struct MeshStore {
    mesh: Mesh,
    generation: u64,
}

impl MeshStore {
    pub fn new() -> Self {
        Self {
            mesh: Self::generate_cube(),
            generation: 0,
        }
    }

    /// Deterministic unit cube: 8 vertices, 12 outward-facing triangles.
    pub fn generate_cube() -> Mesh {
        cube::cube()
    }

    /// Replaces the canonical mesh with a fresh cube and returns it.
    pub fn reset(&mut self) -> &Mesh {
        self.mesh = Self::generate_cube();
        self.generation = self.generation.wrapping_add(1);
        log::debug!("mesh store reset (generation {})", self.generation);
        &self.mesh
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Bumped on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_the_same_cube() {
        let mut store = MeshStore::new();
        let before = store.mesh().clone();
        let after = store.reset().clone();
        assert_eq!(before, after);
        assert_eq!(store.generation(), 1);
    }
}
