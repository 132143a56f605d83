use rayon::prelude::*;
use crate::adjacency_list::SparsityGraph;
use crate::error::{Error, Result};
use crate::hydro::eos::EquationOfState;
use crate::hydro::euler::{Conserved, RiemannData};
use crate::hydro::riemann::RiemannSolver;
use crate::meshing::Mesh;
use crate::message::{Communicator, SelfCommunicator};
use crate::num_vec::NumVec;
use crate::reduction::{Extrema, WavespeedReduction};
use crate::time_integrator::{Advance, Operator};

/// The number of edges evaluated together by the Riemann solver.
pub const BATCH_WIDTH: usize = 4;

type Batch = NumVec<BATCH_WIDTH>;




/**
 * First-order, invariant domain preserving update for the 1-D Euler
 * equations, with graph viscosity from the guaranteed maximal wavespeed
 * estimate:
 *
 * ```text
 * U_i' = U_i + tau / m_i sum_j [-(F_j - F_i) c_ij + d_ij (U_j - U_i)]
 * d_ij = lambda_ij |c_ij|
 * ```
 *
 * The admissible step size is `cfl` times the smallest `m_i / (2 sum_j
 * d_ij)`. With `cfl <= 1` the new state is a convex combination of bar
 * states and lies in the invariant domain. The step size and the
 * violation flag are agreed on by every rank of the communicator; each
 * rank otherwise owns its state entirely.
 */
pub struct HyperbolicModule<C: Communicator = SelfCommunicator> {
    eos: EquationOfState,
    mesh: Mesh,
    graph: SparsityGraph,
    coupling: Vec<f64>,
    riemann_solver: RiemannSolver,
    comm: C,
}




// ============================================================================
impl HyperbolicModule<SelfCommunicator> {
    pub fn serial(eos: EquationOfState, mesh: Mesh) -> Result<Self> {
        Self::new(eos, mesh, SelfCommunicator)
    }
}

impl<C: Communicator> HyperbolicModule<C> {

    /// Build the module for a mesh of at least two cells. A single node has
    /// no coupling and hence no finite step size bound.
    pub fn new(eos: EquationOfState, mesh: Mesh, comm: C) -> Result<Self> {
        if mesh.num_cells < 2 {
            return Err(Error::DegenerateMesh(mesh.num_cells));
        }
        let graph = mesh.connectivity();
        let coupling = graph.edges().iter().map(|&(i, j)| mesh.coupling(i, j)).collect();
        let riemann_solver = RiemannSolver::for_equation_of_state(&eos);

        Ok(Self { eos, mesh, graph, coupling, riemann_solver, comm })
    }

    pub fn equation_of_state(&self) -> &EquationOfState {
        &self.eos
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn communicator(&self) -> &C {
        &self.comm
    }

    /// The global maximal wavespeed estimate over the edges of the mesh.
    /// This is a collective operation. The estimate is only defined for
    /// admissible states, so NaN is returned on every rank if any rank
    /// holds a state outside the invariant domain.
    pub fn max_wavespeed(&self, u: &[Conserved]) -> Result<f64> {
        self.check_len(u)?;

        if !self.is_admissible(u)? {
            return Ok(f64::NAN);
        }
        let (_, extrema) = self.edge_wavespeeds(u)?;
        Ok(extrema.max_wavespeed)
    }

    fn check_len(&self, u: &[Conserved]) -> Result<()> {
        if u.len() == self.mesh.num_cells {
            Ok(())
        } else {
            Err(Error::NotPrepared { expected: self.mesh.num_cells, found: u.len() })
        }
    }

    /// Evaluate the Riemann solver on every edge, in lane batches, and
    /// reduce the wavespeeds and the node step sizes. The edge `(i, j)` is
    /// seen along its normal `sign(c_ij)`, with `i` on the upstream side.
    fn edge_wavespeeds(&self, u: &[Conserved]) -> Result<(Vec<f64>, Extrema)> {
        let eos = &self.eos;
        let graph = &self.graph;
        let coupling = &self.coupling;
        let riemann_solver = &self.riemann_solver;

        let riemann_data: Vec<RiemannData<f64>> = u.par_iter().map(|u| u.riemann_data(eos, 1.0)).collect();
        let reduction = WavespeedReduction::new();
        let mut lambda = vec![0.0; graph.num_edges()];

        let batches = lambda
            .par_chunks_mut(BATCH_WIDTH)
            .zip(graph.edges().par_chunks(BATCH_WIDTH))
            .zip(coupling.par_chunks(BATCH_WIDTH))
            .map(|((lambda, edges), coupling)| {
                let oriented = |k: usize, side: fn(&(usize, usize)) -> usize| {
                    let k = k.min(edges.len() - 1);
                    let data = riemann_data[side(&edges[k])];
                    if coupling[k] < 0.0 { data.reflect() } else { data }
                };
                let left: [RiemannData<f64>; BATCH_WIDTH] = std::array::from_fn(|k| oriented(k, |e| e.0));
                let right: [RiemannData<f64>; BATCH_WIDTH] = std::array::from_fn(|k| oriented(k, |e| e.1));
                let speeds = riemann_solver.compute(
                    &RiemannData::<Batch>::gather(&left),
                    &RiemannData::<Batch>::gather(&right));

                lambda
                    .iter_mut()
                    .enumerate()
                    .fold(Extrema::identity(), |extrema, (k, l)| {
                        *l = speeds[k];
                        extrema.combine(Extrema::wavespeed(speeds[k]))
                    })
            });
        reduction.reduce_par_iter(batches);

        let lumped_mass = self.mesh.cell_spacing();
        let lambda_ref = &lambda;

        reduction.reduce_par_iter((0..u.len()).into_par_iter().map(|i| {
            let d_sum: f64 = graph.row(i).map(|(_, n)| lambda_ref[n] * coupling[n].abs()).sum();
            Extrema::tau(lumped_mass / (2.0 * d_sum))
        }));

        let extrema = reduction.global(&self.comm)?;
        Ok((lambda, extrema))
    }
}

/// The coupling coefficient of node `i` to its neighbor across edge `n`.
fn c_ij(graph: &SparsityGraph, coupling: &[f64], i: usize, n: usize) -> f64 {
    if graph.edges()[n].0 == i {
        coupling[n]
    } else {
        -coupling[n]
    }
}




// ============================================================================
impl<C: Communicator> Operator for HyperbolicModule<C> {
    type State = Conserved;

    fn advance(&self, u: &[Conserved], tau: Option<f64>, cfl: f64, out: &mut [Conserved]) -> Result<Advance> {
        self.check_len(u)?;
        self.check_len(out)?;

        let (lambda, extrema) = self.edge_wavespeeds(u)?;
        let tau_bound = cfl * extrema.min_tau;
        let tau_used = tau.unwrap_or(tau_bound);

        let eos = &self.eos;
        let graph = &self.graph;
        let coupling = &self.coupling;
        let flux: Vec<Conserved> = u.par_iter().map(|u| u.flux_vector(eos)).collect();
        let factor = tau_used / self.mesh.cell_spacing();

        out.par_iter_mut().enumerate().for_each(|(i, out)| {
            let (ui, fi) = (u[i], flux[i]);
            let du = graph.row(i).fold(Conserved::default(), |du, (j, n)| {
                let c = c_ij(graph, coupling, i, n);
                let d = lambda[n] * c.abs();
                du + (flux[j] - fi) * -c + (u[j] - ui) * d
            });
            *out = ui + du * factor;
        });

        Ok(Advance {
            tau: tau_used.min(tau_bound),
            violated: !self.is_admissible(out)?,
        })
    }

    fn is_admissible(&self, u: &[Conserved]) -> Result<bool> {
        let eos = &self.eos;
        let local = if u.par_iter().all(|u| u.is_admissible(eos)) { 0.0 } else { 1.0 };
        Ok(self.comm.all_reduce_max(local)? == 0.0)
    }
}
