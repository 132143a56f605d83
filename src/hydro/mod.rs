//! Gas dynamics: the material models closing the Euler equations, the 1-D
//! conserved and primitive states, and the guaranteed maximal wavespeed
//! estimate for the Riemann problem between two states.

pub mod eos;
pub mod euler;
pub mod riemann;

pub use eos::EquationOfState;
pub use euler::{Conserved, Primitive, RiemannData};
pub use riemann::RiemannSolver;
