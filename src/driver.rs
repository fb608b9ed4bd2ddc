//! Driving loop: repeated step attempts until the bound is reached

use crate::coupled::RKF45Pair;
use crate::error::SolverError;
use crate::scalar::RKF45;
use crate::trajectory::{PhaseTrajectory, Trajectory};

/// Driver configuration.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Revise the step size after every attempt from the embedded
    /// error estimate. When false, the step size stays frozen at its
    /// initial value and every attempt is accepted.
    pub adaptive: bool,
    /// Cap on step attempts, counting rejections. A pathological
    /// tolerance can shrink the step toward zero without ever reaching
    /// the bound; the cap turns that into an error instead of a hang.
    pub max_steps: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            adaptive: true,
            max_steps: 1_000_000,
        }
    }
}

/// Step magnitude below which the abscissa can no longer move.
fn step_floor(at: f64) -> f64 {
    4.0 * f64::EPSILON * at.abs().max(1.0)
}

/// Integrate a scalar problem to its bound.
///
/// Records the initial condition as the first sample, then one sample
/// per accepted step, in chronological order. The returned trajectory
/// is created fresh for this run and never shared.
pub fn integrate<F>(solver: &mut RKF45, mut f: F, opts: &Options) -> Result<Trajectory, SolverError>
where
    F: FnMut(f64, f64) -> f64,
{
    let mut sink = Trajectory::new();
    let (x, y, h) = solver.sample();
    sink.record(x, y, h);

    let mut attempts = 0usize;
    while !solver.done() {
        if attempts == opts.max_steps {
            return Err(SolverError::ConvergenceFailure(opts.max_steps));
        }
        attempts += 1;

        let floor = step_floor(solver.x());
        if solver.h().abs() < floor {
            return Err(SolverError::StepSizeTooSmall {
                h: solver.h(),
                floor,
            });
        }

        let result = solver.step(&mut f, opts.adaptive)?;
        if result.accepted {
            let (x, y, h) = solver.sample();
            sink.record(x, y, h);
        }
    }
    Ok(sink)
}

/// Integrate a coupled planar problem to its bound.
///
/// Same contract as [`integrate`], with `(t, x, y, h)` samples.
pub fn integrate_pair<G, F>(
    solver: &mut RKF45Pair,
    mut g: G,
    mut f: F,
    opts: &Options,
) -> Result<PhaseTrajectory, SolverError>
where
    G: FnMut(f64, f64, f64) -> f64,
    F: FnMut(f64, f64, f64) -> f64,
{
    let mut sink = PhaseTrajectory::new();
    let (t, x, y, h) = solver.sample();
    sink.record(t, x, y, h);

    let mut attempts = 0usize;
    while !solver.done() {
        if attempts == opts.max_steps {
            return Err(SolverError::ConvergenceFailure(opts.max_steps));
        }
        attempts += 1;

        let floor = step_floor(solver.t());
        if solver.h().abs() < floor {
            return Err(SolverError::StepSizeTooSmall {
                h: solver.h(),
                floor,
            });
        }

        let result = solver.step(&mut g, &mut f, opts.adaptive)?;
        if result.accepted {
            let (t, x, y, h) = solver.sample();
            sink.record(t, x, y, h);
        }
    }
    Ok(sink)
}
