use std::ops::Range;
use serde::{Deserialize, Serialize};
use crate::adjacency_list::{AdjacencyList, SparsityGraph};

/// The treatment of the two ends of a 1-D mesh.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// The last node couples to the first.
    Periodic,
    /// The end nodes have no outer neighbor; nothing enters or leaves
    /// through the missing coupling.
    Transmissive,
}

/// A uniform 1-D mesh of nodes at cell centers, with lumped mass equal to
/// the cell spacing.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub domain: Range<f64>,
    pub num_cells: usize,
    pub boundary: Boundary,
}

impl Mesh {
    pub fn new(domain: Range<f64>, num_cells: usize, boundary: Boundary) -> Self {
        Self { domain, num_cells, boundary }
    }

    pub fn cell_spacing(&self) -> f64 {
        (self.domain.end - self.domain.start) / self.num_cells as f64
    }

    pub fn cell_center(&self, index: usize) -> f64 {
        self.domain.start + self.cell_spacing() * (index as f64 + 0.5)
    }

    pub fn cell_centers(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_cells).map(move |i| self.cell_center(i))
    }

    pub fn lumped_mass(&self, _index: usize) -> f64 {
        self.cell_spacing()
    }

    /// The coupling coefficient `c_ij` between neighboring nodes: `+1/2`
    /// when `j` lies to the right of `i` and `-1/2` when it lies to the left,
    /// with the periodic wrap counted as adjacency.
    pub fn coupling(&self, i: usize, j: usize) -> f64 {
        if j == (i + 1) % self.num_cells {
            0.5
        } else {
            -0.5
        }
    }

    /// Return the coupling graph of the mesh nodes.
    pub fn connectivity(&self) -> SparsityGraph {
        let n = self.num_cells;
        let mut edges = AdjacencyList::new();

        for i in 0..n.saturating_sub(1) {
            edges.insert(i, i + 1)
        }
        if self.boundary == Boundary::Periodic && n > 2 {
            edges.insert(n - 1, 0)
        }
        edges.into_sparsity_graph(n)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Boundary, Mesh};

    #[test]
    fn mesh_geometry_is_uniform() {
        let mesh = Mesh::new(0.0..1.0, 4, Boundary::Transmissive);
        assert_eq!(mesh.cell_spacing(), 0.25);
        assert_eq!(mesh.cell_center(0), 0.125);
        assert_eq!(mesh.cell_centers().last(), Some(0.875));
    }

    #[test]
    fn periodic_mesh_couples_the_ends() {
        let periodic = Mesh::new(0.0..1.0, 5, Boundary::Periodic).connectivity();
        let transmissive = Mesh::new(0.0..1.0, 5, Boundary::Transmissive).connectivity();

        assert_eq!(periodic.num_edges(), 5);
        assert_eq!(transmissive.num_edges(), 4);
        assert!((0..5).all(|i| periodic.row_len(i) == 2));
        assert_eq!(transmissive.row_len(0), 1);
        assert_eq!(transmissive.row_len(4), 1);
    }

    #[test]
    fn couplings_are_antisymmetric() {
        let mesh = Mesh::new(0.0..1.0, 5, Boundary::Periodic);
        let graph = mesh.connectivity();

        for &(i, j) in graph.edges() {
            assert_eq!(mesh.coupling(i, j), -mesh.coupling(j, i));
        }
        assert_eq!(mesh.coupling(4, 0), 0.5);
        assert_eq!(mesh.coupling(0, 4), -0.5);
    }
}
