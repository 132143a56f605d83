//! Hyperstep is the explicit time-advancement core of a solver for
//! hyperbolic conservation laws, like the Euler equations of gas dynamics
//! with general equations of state. It couples a guaranteed maximal
//! wavespeed estimate for the Riemann problem, which bounds the step size,
//! to explicit Runge-Kutta schemes built from a low-order invariant domain
//! preserving update. Steps that still leave the invariant domain are
//! detected and handled by a configurable CFL recovery strategy.
//!
//! The wavespeed estimate is generic over the number type, so that it can
//! be evaluated on one interface at a time or on lane batches. Step size
//! bounds are reduced lock-free across threads with rayon, and then across
//! the ranks of a `Communicator`.

pub mod adjacency_list;
pub mod config;
pub mod error;
pub mod hydro;
pub mod hyperbolic;
pub mod meshing;
pub mod message;
pub mod num_vec;
pub mod reduction;
pub mod time_integrator;

pub use config::{CFLRecoveryStrategy, StepContext, TimeSteppingScheme};
pub use error::{Error, Result};
pub use hyperbolic::HyperbolicModule;
pub use time_integrator::{Advance, Operator, Step, TimeIntegrator};
