//! Base error and step-result types for the integrators

use thiserror::Error;

/// Solver-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Tolerance must be positive and finite (got {0})")]
    InvalidTolerance(f64),

    #[error("Initial value {name} is not finite (got {value})")]
    NonFiniteInput { name: &'static str, value: f64 },

    #[error("Step size {0} is zero, not finite, or points away from the bound")]
    InvalidStepSize(f64),

    #[error("Right-hand side returned a non-finite value at {at}")]
    DerivativeNotFinite { at: f64 },

    #[error("Embedded error estimate vanished at {at}; step size proposal would diverge")]
    VanishingErrorEstimate { at: f64 },

    #[error("Step size {h} fell below the resolvable floor {floor}")]
    StepSizeTooSmall { h: f64, floor: f64 },

    #[error("Integration did not reach the bound within {0} step attempts")]
    ConvergenceFailure(usize),
}

/// Outcome of one adaptive step attempt.
///
/// A rejected attempt leaves the solution untouched; the integrator has
/// already committed the smaller step size for the retry. `h_used` is
/// the step size the six stages were evaluated with, which is also the
/// displacement applied on acceptance.
#[derive(Debug, Clone, Copy)]
pub struct StepResult {
    pub accepted: bool,
    pub error_estimate: f64,
    pub h_used: f64,
}
