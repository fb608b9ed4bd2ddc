//! Runge-Kutta-Fehlberg 4(5) integrator for a single scalar equation

use crate::error::{SolverError, StepResult};
use crate::tableau::{weighted_sum, A, B, C, E, SAFETY};

/// Adaptive Fehlberg 4(5) integrator for dy/dx = f(x, y).
///
/// Six stages per step. The 5th order combination advances the
/// solution; the embedded 4th order combination supplies the local
/// truncation error estimate that drives step-size control.
///
/// The right-hand side is not stored: it is passed to every [`step`]
/// call and must be a pure function of its arguments, since stages are
/// recomputed from partial state on every attempt.
///
/// # Characteristics
/// - Order: 5 (propagating) / 4 (error estimate)
/// - Stages: 6
/// - Explicit, adaptive step size
///
/// # References
/// - Fehlberg, E. (1969). "Low-order classical Runge-Kutta formulas
///   with stepsize control and their application to some heat transfer
///   problems". NASA Technical Report TR R-315.
///
/// [`step`]: RKF45::step
#[derive(Debug, Clone, PartialEq)]
pub struct RKF45 {
    x: f64,
    y: f64,
    xf: f64,
    h: f64,
    tol: f64,
}

impl RKF45 {
    /// Create an integrator for one problem instance.
    ///
    /// # Arguments
    /// * `x0` - Initial abscissa
    /// * `y0` - Initial solution value
    /// * `xf` - Integration bound
    /// * `h0` - Initial step size; its sign must match the direction
    ///   from `x0` toward `xf`
    /// * `tol` - Target local error tolerance, strictly positive
    pub fn new(x0: f64, y0: f64, xf: f64, h0: f64, tol: f64) -> Result<Self, SolverError> {
        if !tol.is_finite() || tol <= 0.0 {
            return Err(SolverError::InvalidTolerance(tol));
        }
        for (name, value) in [("x0", x0), ("y0", y0), ("xf", xf)] {
            if !value.is_finite() {
                return Err(SolverError::NonFiniteInput { name, value });
            }
        }
        if !h0.is_finite() || h0 == 0.0 || (xf - x0) * h0 < 0.0 {
            return Err(SolverError::InvalidStepSize(h0));
        }
        Ok(Self {
            x: x0,
            y: y0,
            xf,
            h: h0,
            tol,
        })
    }

    /// Current abscissa.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Current solution value.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Step size the next attempt will use.
    pub fn h(&self) -> f64 {
        self.h
    }

    /// Integration bound.
    pub fn bound(&self) -> f64 {
        self.xf
    }

    /// True once the abscissa has reached or passed the bound.
    pub fn done(&self) -> bool {
        if self.h > 0.0 {
            self.x >= self.xf
        } else {
            self.x <= self.xf
        }
    }

    /// Current `(x, y, h)` triple for the sample sink.
    pub fn sample(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.h)
    }

    /// Evaluate the six stage derivatives at the current state.
    ///
    /// Stage i is f(x + c_i h, y + h sum_j a_ij k_j) over the stages
    /// already computed. The results are scratch values; nothing is
    /// committed until the step is accepted.
    fn stages<F>(&self, f: &mut F) -> Result<[f64; 6], SolverError>
    where
        F: FnMut(f64, f64) -> f64,
    {
        let (x, y, h) = (self.x, self.y, self.h);
        let mut k = [0.0; 6];
        for i in 0..6 {
            let mut dy = 0.0;
            for j in 0..i {
                dy += A[i][j] * k[j];
            }
            let xi = x + C[i] * h;
            let ki = f(xi, y + h * dy);
            if !ki.is_finite() {
                return Err(SolverError::DerivativeNotFinite { at: xi });
            }
            k[i] = ki;
        }
        Ok(k)
    }

    /// Perform one step attempt with the given right-hand side.
    ///
    /// With `adaptive` set, the embedded error estimate produces a
    /// revised step size `0.9 h (|h| tol / |err|)^(1/4)`. A proposal
    /// smaller in magnitude than the current step rejects the attempt:
    /// the solution stays put and the retry runs from the same state
    /// with the smaller step. Otherwise the solution advances with the
    /// step size that produced the stages, and the revised step size
    /// applies from the next attempt onward.
    ///
    /// Without `adaptive`, every attempt is accepted at the frozen
    /// step size.
    pub fn step<F>(&mut self, mut f: F, adaptive: bool) -> Result<StepResult, SolverError>
    where
        F: FnMut(f64, f64) -> f64,
    {
        let k = self.stages(&mut f)?;
        let h = self.h;

        if !adaptive {
            self.advance(h, &k);
            return Ok(StepResult {
                accepted: true,
                error_estimate: 0.0,
                h_used: h,
            });
        }

        let err = h * weighted_sum(&E, &k);
        if err == 0.0 {
            return Err(SolverError::VanishingErrorEstimate { at: self.x });
        }
        let h_new = SAFETY * h * (h.abs() * self.tol / err.abs()).powf(0.25);

        if h_new.abs() < h.abs() {
            // Reject: keep the solution, retry with the smaller step.
            self.h = h_new;
            Ok(StepResult {
                accepted: false,
                error_estimate: err,
                h_used: h,
            })
        } else {
            self.advance(h, &k);
            self.h = h_new;
            Ok(StepResult {
                accepted: true,
                error_estimate: err,
                h_used: h,
            })
        }
    }

    fn advance(&mut self, h: f64, k: &[f64; 6]) {
        self.x += h;
        self.y += h * weighted_sum(&B, k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_construction_validation() {
        assert!(matches!(
            RKF45::new(0.0, 1.0, 1.0, 0.1, 0.0),
            Err(SolverError::InvalidTolerance(_))
        ));
        assert!(matches!(
            RKF45::new(0.0, 1.0, 1.0, 0.1, -1e-6),
            Err(SolverError::InvalidTolerance(_))
        ));
        assert!(matches!(
            RKF45::new(0.0, f64::NAN, 1.0, 0.1, 1e-6),
            Err(SolverError::NonFiniteInput { name: "y0", .. })
        ));
        // Step pointing away from the bound cannot terminate.
        assert!(matches!(
            RKF45::new(0.0, 1.0, 1.0, -0.1, 1e-6),
            Err(SolverError::InvalidStepSize(_))
        ));
        assert!(matches!(
            RKF45::new(0.0, 1.0, 1.0, 0.0, 1e-6),
            Err(SolverError::InvalidStepSize(_))
        ));
        assert!(RKF45::new(0.0, 1.0, 1.0, 0.1, 1e-6).is_ok());
        // Backward integration with a negative step is valid.
        assert!(RKF45::new(1.0, 1.0, 0.0, -0.1, 1e-6).is_ok());
    }

    #[test]
    fn test_exponential_decay_single_step() {
        // dy/dx = -y, y(0) = 1; one accepted fixed step of h = 0.1
        let mut solver = RKF45::new(0.0, 1.0, 1.0, 0.1, 1e-6).unwrap();
        let result = solver.step(|_x, y| -y, false).unwrap();

        assert!(result.accepted);
        assert_relative_eq!(solver.x(), 0.1, epsilon = 1e-15);
        assert_relative_eq!(solver.y(), (-0.1f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_rejected_step_leaves_state_untouched() {
        // A tight tolerance with a large initial step forces rejection.
        let mut solver = RKF45::new(0.0, 1.0, 10.0, 1.0, 1e-12).unwrap();
        let result = solver.step(|_x, y| -y, true).unwrap();

        assert!(!result.accepted);
        assert_eq!(solver.x(), 0.0);
        assert_eq!(solver.y(), 1.0);
        assert!(solver.h() < 1.0);
        assert_eq!(result.h_used, 1.0);
    }

    #[test]
    fn test_stage_determinism() {
        // Identical integrators stepping a pure right-hand side stay
        // bitwise identical.
        let mut a = RKF45::new(0.0, 1.0, 5.0, 0.01, 1e-8).unwrap();
        let mut b = a.clone();

        for _ in 0..20 {
            a.step(|x, y| -y * x.sin(), true).unwrap();
            b.step(|x, y| -y * x.sin(), true).unwrap();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_vanishing_error_estimate() {
        // An identically-zero right-hand side produces a zero error
        // estimate, which must surface instead of an unbounded step.
        let mut solver = RKF45::new(0.0, 1.0, 1.0, 0.1, 1e-6).unwrap();
        assert!(matches!(
            solver.step(|_x, _y| 0.0, true),
            Err(SolverError::VanishingErrorEstimate { .. })
        ));
    }

    #[test]
    fn test_non_finite_derivative_is_propagated() {
        let mut solver = RKF45::new(0.0, 1.0, 1.0, 0.1, 1e-6).unwrap();
        assert!(matches!(
            solver.step(|_x, _y| f64::NAN, true),
            Err(SolverError::DerivativeNotFinite { .. })
        ));
        // Aborted stage evaluation commits nothing.
        assert_eq!(solver.sample(), (0.0, 1.0, 0.1));
    }
}
