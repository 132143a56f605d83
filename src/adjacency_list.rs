/**
 * A minimal undirected graph over node indexes, used to collect the
 * couplings of a mesh before they are frozen into a `SparsityGraph`. Each
 * edge is stored once, with its smaller node first.
 */
#[derive(Clone, Debug, Default)]
pub struct AdjacencyList {
    edges: Vec<(usize, usize)>,
}

/**
 * A compressed sparse row view of an undirected graph. Row `i` lists the
 * neighbors `j` of node `i`, each paired with the index of the edge
 * `(min(i, j), max(i, j))` in `edges`. Every edge therefore appears in two
 * rows, and per-edge quantities (computed once per edge) can be gathered
 * from both of its endpoints.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct SparsityGraph {
    row_offsets: Vec<usize>,
    columns: Vec<usize>,
    edge_index: Vec<usize>,
    edges: Vec<(usize, usize)>,
}




// ============================================================================
impl AdjacencyList {

    pub fn new() -> Self {
        Self::default()
    }

    /**
     * Return the number of edges in the graph.
     */
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /**
     * Determine whether there are any edges in the graph.
     */
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /**
     * Insert an edge between a and b. Duplicate edges and self-loops are
     * ignored.
     */
    pub fn insert(&mut self, a: usize, b: usize) {
        if a != b && !self.contains(a, b) {
            self.edges.push((a.min(b), a.max(b)))
        }
    }

    /**
     * Determine whether the given edge exists, in either orientation.
     */
    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.edges.contains(&(a.min(b), a.max(b)))
    }

    /**
     * Remove an edge if it exists.
     */
    pub fn remove(&mut self, a: usize, b: usize) {
        let key = (a.min(b), a.max(b));
        self.edges.retain(|e| e != &key)
    }

    /**
     * Return an iterator over the nodes sharing an edge with the given node.
     */
    pub fn neighbors(&self, a: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().filter_map(move |&(i, j)| {
            if i == a {
                Some(j)
            } else if j == a {
                Some(i)
            } else {
                None
            }
        })
    }

    /**
     * Freeze the graph into compressed sparse row form over `num_nodes`
     * nodes. Edges are sorted, and each row is sorted by column.
     */
    pub fn into_sparsity_graph(mut self, num_nodes: usize) -> SparsityGraph {
        self.edges.sort_unstable();

        let mut rows: Vec<Vec<(usize, usize)>> = vec![Vec::new(); num_nodes];

        for (n, &(i, j)) in self.edges.iter().enumerate() {
            rows[i].push((j, n));
            rows[j].push((i, n));
        }

        let mut row_offsets = Vec::with_capacity(num_nodes + 1);
        let mut columns = Vec::with_capacity(2 * self.edges.len());
        let mut edge_index = Vec::with_capacity(2 * self.edges.len());

        row_offsets.push(0);

        for mut row in rows {
            row.sort_unstable();
            for (j, n) in row {
                columns.push(j);
                edge_index.push(n);
            }
            row_offsets.push(columns.len());
        }

        SparsityGraph { row_offsets, columns, edge_index, edges: self.edges }
    }
}




// ============================================================================
impl SparsityGraph {

    pub fn num_nodes(&self) -> usize {
        self.row_offsets.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// The edges `(i, j)` with `i < j`, in sorted order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// The neighbors of node `i`, each with the index of the shared edge.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let range = self.row_offsets[i]..self.row_offsets[i + 1];
        self.columns[range.clone()]
            .iter()
            .copied()
            .zip(self.edge_index[range].iter().copied())
    }

    pub fn row_len(&self, i: usize) -> usize {
        self.row_offsets[i + 1] - self.row_offsets[i]
    }
}
