use thiserror::Error;

/**
 * Error to represent invalid configuration, misuse of the time integrator,
 * a broken communicator, or invalid hydrodynamics data found by a checked
 * primitive variable recovery.
 *
 * Invariant domain violations are not errors: they are reported as data by
 * the advance operator and handled by the CFL recovery strategy.
 */
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid cfl numbers: need 0 < cfl_min ({cfl_min}) <= cfl_max ({cfl_max})")]
    InvalidCfl { cfl_min: f64, cfl_max: f64 },

    #[error("unknown time stepping scheme: {0}")]
    UnknownScheme(String),

    #[error("unknown cfl recovery strategy: {0}")]
    UnknownStrategy(String),

    #[error("time integrator is prepared for {expected} nodes but the state has {found}")]
    NotPrepared { expected: usize, found: usize },

    #[error("mesh has {0} cells, at least 2 are needed for a coupling")]
    DegenerateMesh(usize),

    #[error("communicator at rank {rank} lost its peers")]
    Disconnected { rank: usize },

    #[error("negative mass density: {0}")]
    NegativeMassDensity(f64),

    #[error("negative gas pressure: {0}")]
    NegativeGasPressure(f64),

    #[error("covolume constraint violated: 1 - b rho = {0}")]
    CovolumeExceeded(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
