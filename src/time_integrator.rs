use std::ops::{Add, Mul, Sub};
use log::{debug, warn};
use crate::config::{CFLRecoveryStrategy, StepContext};
use crate::error::{Error, Result};

/// The number of times one attempt at a step is repeated with a smaller
/// step size when a later stage reports a tighter bound than the first.
pub const MAX_STAGE_RECONCILIATIONS: usize = 2;




/**
 * The elementary explicit update the time integrator is built from: one
 * forward-Euler step of a low-order, invariant domain preserving scheme.
 *
 * `advance` must be pure in its inputs so that stages can be repeated. If
 * `tau` is `None` the operator picks the largest admissible step for the
 * given CFL number and reports it; if `tau` is `Some` it uses that step and
 * reports the smaller of it and its own admissible bound. A result with
 * `violated == false` must lie in the invariant domain.
 */
pub trait Operator {
    type State: Copy + Default + Add<Output = Self::State> + Sub<Output = Self::State> + Mul<f64, Output = Self::State>;

    fn advance(&self, u: &[Self::State], tau: Option<f64>, cfl: f64, out: &mut [Self::State]) -> Result<Advance>;

    /// Whether a state lies in the invariant domain. Used to check the
    /// final combination of stages, which need not be a convex combination
    /// of admissible states.
    fn is_admissible(&self, _u: &[Self::State]) -> Result<bool> {
        Ok(true)
    }
}

/// The outcome of one call to `Operator::advance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Advance {
    pub tau: f64,
    pub violated: bool,
}

/// The outcome of one call to `TimeIntegrator::step`. The state has moved
/// from `t` to `t + tau`; `cfl` is the CFL number of the accepted attempt,
/// and `restarted` says whether the step was redone with `cfl_min`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub tau: f64,
    pub cfl: f64,
    pub violated: bool,
    pub restarted: bool,
}

/// The state of one step with respect to the recovery strategy.
#[derive(Clone, Copy, Debug)]
enum Recovery {
    Trying(f64),
    Succeeded(Attempt, f64),
    Violated(Attempt, f64),
}

#[derive(Clone, Copy, Debug)]
struct Attempt {
    tau: f64,
    violated: bool,
}

enum Stages {
    Consistent(Attempt),
    Shrunk { attempt: Attempt, bound: f64 },
}




/**
 * An explicit Runge-Kutta time integrator with invariant domain recovery.
 *
 * Every scheme is written in terms of the increments
 * `D_k = E(U_k) - U_k` of the operator's forward-Euler step `E`, all taken
 * with the same step size `tau`. Stage `s` is `U + m sum_k a_sk D_k` and the
 * new state is `U + m sum_k b_k D_k`, where `m` is the number of sub-steps
 * of the scheme, so that one step advances the solution by `m tau`.
 *
 * The step size is fixed by the first stage. A later stage may report a
 * smaller admissible step; the attempt is then repeated from the original
 * state with the step fixed to the smallest reported bound, up to
 * `MAX_STAGE_RECONCILIATIONS` times. If the bound keeps shrinking, the
 * last attempt violates the CFL condition and is handed to the recovery
 * strategy like any other violation.
 */
pub struct TimeIntegrator<O: Operator> {
    context: StepContext,
    operator: O,
    stage_state: Vec<O::State>,
    increments: Vec<Vec<O::State>>,
    scratch: Vec<O::State>,
    result: Vec<O::State>,
    prepared: usize,
}




// ============================================================================
impl<O: Operator> TimeIntegrator<O> {

    /// Create a time integrator, after validating its context.
    pub fn new(context: StepContext, operator: O) -> Result<Self> {
        context.validate()?;

        Ok(Self {
            context,
            operator,
            stage_state: Vec::new(),
            increments: Vec::new(),
            scratch: Vec::new(),
            result: Vec::new(),
            prepared: 0,
        })
    }

    pub fn context(&self) -> &StepContext {
        &self.context
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    /// Allocate scratch storage for states of `n` nodes. This is required
    /// before the first call to `step`.
    pub fn prepare(&mut self, n: usize) {
        let stages = self.context.time_stepping_scheme.num_stages();

        self.stage_state = vec![O::State::default(); n];
        self.increments = vec![vec![O::State::default(); n]; stages];
        self.scratch = vec![O::State::default(); n];
        self.result = vec![O::State::default(); n];
        self.prepared = n;
    }

    /// Advance `u` from `t` to `t + tau` and report `tau`, applying the CFL
    /// recovery strategy if the step leaves the invariant domain.
    pub fn step(&mut self, u: &mut [O::State], t: f64) -> Result<Step> {
        if u.len() != self.prepared || self.increments.is_empty() {
            return Err(Error::NotPrepared { expected: self.prepared, found: u.len() });
        }

        let StepContext { cfl_min, cfl_max, cfl_recovery_strategy, .. } = self.context;
        let substeps = self.context.time_stepping_scheme.substeps() as f64;

        let mut state = Recovery::Trying(cfl_max);
        let mut restarted = false;

        let (attempt, cfl) = loop {
            state = match state {
                Recovery::Trying(cfl) => {
                    let attempt = self.attempt(u, cfl)?;

                    if !attempt.violated {
                        Recovery::Succeeded(attempt, cfl)
                    } else if cfl_recovery_strategy == CFLRecoveryStrategy::BangBangControl && !restarted {
                        debug!("t={:.6} invariant domain violated with cfl={}, restarting with cfl={}", t, cfl, cfl_min);
                        restarted = true;
                        Recovery::Trying(cfl_min)
                    } else {
                        Recovery::Violated(attempt, cfl)
                    }
                }
                Recovery::Succeeded(attempt, cfl) => break (attempt, cfl),
                Recovery::Violated(attempt, cfl) => {
                    warn!("t={:.6} accepting a step that leaves the invariant domain (cfl={}, strategy: {})", t, cfl, cfl_recovery_strategy);
                    break (attempt, cfl);
                }
            }
        };
        u.copy_from_slice(&self.result);

        let step = Step {
            tau: attempt.tau * substeps,
            cfl,
            violated: attempt.violated,
            restarted,
        };
        debug!("t={:.6} step {:?}", t, step);
        Ok(step)
    }

    /// Carry out one step from `u` with the given CFL number, leaving the
    /// result in `self.result`.
    fn attempt(&mut self, u: &[O::State], cfl: f64) -> Result<Attempt> {
        let mut tau = None;
        let mut reconciliations = 0;

        loop {
            match self.run_stages(u, tau, cfl)? {
                Stages::Consistent(attempt) => return Ok(attempt),
                Stages::Shrunk { attempt, bound } if reconciliations < MAX_STAGE_RECONCILIATIONS => {
                    debug!("later stage bounds the step size by {:e} < {:e}, repeating", bound, attempt.tau);
                    reconciliations += 1;
                    tau = Some(bound);
                }
                Stages::Shrunk { attempt, bound } => {
                    debug!("tau={:e} still exceeds the stage bound {:e} after {} reconciliations", attempt.tau, bound, reconciliations);
                    return Ok(Attempt { violated: true, ..attempt });
                }
            }
        }
    }

    fn run_stages(&mut self, u: &[O::State], fixed_tau: Option<f64>, cfl: f64) -> Result<Stages> {
        let scheme = self.context.time_stepping_scheme;
        let m = scheme.substeps() as f64;

        let mut tau = fixed_tau;
        let mut bound = f64::INFINITY;
        let mut violated = false;

        for s in 0..scheme.num_stages() {
            combine(u, scheme.stage_weights(s), m, &self.increments, &mut self.stage_state);

            let advance = self.operator.advance(&self.stage_state, tau, cfl, &mut self.scratch)?;
            let tau_s = *tau.get_or_insert(advance.tau);

            bound = bound.min(advance.tau);
            violated |= advance.violated;

            for ((d, &out), &v) in self.increments[s].iter_mut().zip(&self.scratch).zip(&self.stage_state) {
                *d = out - v;
            }
            debug!("stage {} tau={:e} admissible={:e} violated={}", s, tau_s, advance.tau, advance.violated);
        }

        let tau = tau.unwrap_or(0.0);
        combine(u, scheme.weights(), m, &self.increments, &mut self.result);
        violated |= !self.operator.is_admissible(&self.result)?;

        let attempt = Attempt { tau, violated };

        if bound < tau {
            Ok(Stages::Shrunk { attempt, bound })
        } else {
            Ok(Stages::Consistent(attempt))
        }
    }
}

/// `out = u + m sum_k weights[k] increments[k]`, skipping zero weights.
fn combine<S>(u: &[S], weights: &[f64], m: f64, increments: &[Vec<S>], out: &mut [S])
where
    S: Copy + Add<Output = S> + Mul<f64, Output = S>,
{
    out.copy_from_slice(u);

    for (w, d) in weights.iter().zip(increments) {
        if *w != 0.0 {
            for (o, &di) in out.iter_mut().zip(d) {
                *o = *o + di * (m * w);
            }
        }
    }
}
