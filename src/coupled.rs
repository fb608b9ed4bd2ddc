//! Runge-Kutta-Fehlberg 4(5) integrator for a coupled planar system

use crate::error::{SolverError, StepResult};
use crate::tableau::{weighted_sum, A, B, C, E, SAFETY};

/// Adaptive Fehlberg 4(5) integrator for the coupled pair
/// dx/dt = g(t, x, y), dy/dt = f(t, x, y).
///
/// Same stage topology and coefficients as [`RKF45`], evaluated for
/// both equations at every stage: each pair of stage derivatives is
/// taken at the identical stage-advanced `(t, x, y)` point, with the
/// x offsets built from the g history and the y offsets from the f
/// history.
///
/// Step-size control computes one embedded error estimate per
/// equation, derives a candidate step from each, and adopts the
/// smaller of the two, since both equations must satisfy the
/// tolerance simultaneously. Acceptance then follows the same
/// reject-and-shrink rule as the scalar integrator.
///
/// [`RKF45`]: crate::scalar::RKF45
#[derive(Debug, Clone, PartialEq)]
pub struct RKF45Pair {
    t: f64,
    x: f64,
    y: f64,
    tf: f64,
    h: f64,
    tol: f64,
}

impl RKF45Pair {
    /// Create an integrator for one problem instance.
    ///
    /// # Arguments
    /// * `t0` - Initial time
    /// * `x0` - Initial position
    /// * `y0` - Initial velocity
    /// * `tf` - Integration bound
    /// * `h0` - Initial step size; its sign must match the direction
    ///   from `t0` toward `tf`
    /// * `tol` - Target local error tolerance, strictly positive
    pub fn new(
        t0: f64,
        x0: f64,
        y0: f64,
        tf: f64,
        h0: f64,
        tol: f64,
    ) -> Result<Self, SolverError> {
        if !tol.is_finite() || tol <= 0.0 {
            return Err(SolverError::InvalidTolerance(tol));
        }
        for (name, value) in [("t0", t0), ("x0", x0), ("y0", y0), ("tf", tf)] {
            if !value.is_finite() {
                return Err(SolverError::NonFiniteInput { name, value });
            }
        }
        if !h0.is_finite() || h0 == 0.0 || (tf - t0) * h0 < 0.0 {
            return Err(SolverError::InvalidStepSize(h0));
        }
        Ok(Self {
            t: t0,
            x: x0,
            y: y0,
            tf,
            h: h0,
            tol,
        })
    }

    /// Current time.
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Current position.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Current velocity.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Step size the next attempt will use.
    pub fn h(&self) -> f64 {
        self.h
    }

    /// Integration bound.
    pub fn bound(&self) -> f64 {
        self.tf
    }

    /// True once time has reached or passed the bound.
    pub fn done(&self) -> bool {
        if self.h > 0.0 {
            self.t >= self.tf
        } else {
            self.t <= self.tf
        }
    }

    /// Current `(t, x, y, h)` quadruple for the sample sink.
    pub fn sample(&self) -> (f64, f64, f64, f64) {
        (self.t, self.x, self.y, self.h)
    }

    /// Evaluate the six paired stage derivatives at the current state.
    ///
    /// Returns `(l, k)` with `l` driving x and `k` driving y. Scratch
    /// values only; nothing is committed until the step is accepted.
    fn stages<G, F>(&self, g: &mut G, f: &mut F) -> Result<([f64; 6], [f64; 6]), SolverError>
    where
        G: FnMut(f64, f64, f64) -> f64,
        F: FnMut(f64, f64, f64) -> f64,
    {
        let (t, x, y, h) = (self.t, self.x, self.y, self.h);
        let mut l = [0.0; 6];
        let mut k = [0.0; 6];
        for i in 0..6 {
            let mut dx = 0.0;
            let mut dy = 0.0;
            for j in 0..i {
                dx += A[i][j] * l[j];
                dy += A[i][j] * k[j];
            }
            let ti = t + C[i] * h;
            let xi = x + h * dx;
            let yi = y + h * dy;
            let li = g(ti, xi, yi);
            let ki = f(ti, xi, yi);
            if !li.is_finite() || !ki.is_finite() {
                return Err(SolverError::DerivativeNotFinite { at: ti });
            }
            l[i] = li;
            k[i] = ki;
        }
        Ok((l, k))
    }

    /// Perform one step attempt with the given right-hand sides.
    ///
    /// With `adaptive` set, each equation yields its own candidate
    /// step size from its embedded error estimate and the smaller
    /// candidate wins. Rejection and advance follow the scalar
    /// convention: a shrinking proposal rejects the attempt and the
    /// retry runs with the smaller step; an accepted attempt advances
    /// with the step size that produced the stages, then adopts the
    /// revised step for the next attempt.
    pub fn step<G, F>(
        &mut self,
        mut g: G,
        mut f: F,
        adaptive: bool,
    ) -> Result<StepResult, SolverError>
    where
        G: FnMut(f64, f64, f64) -> f64,
        F: FnMut(f64, f64, f64) -> f64,
    {
        let (l, k) = self.stages(&mut g, &mut f)?;
        let h = self.h;

        if !adaptive {
            self.advance(h, &l, &k);
            return Ok(StepResult {
                accepted: true,
                error_estimate: 0.0,
                h_used: h,
            });
        }

        let err_x = h * weighted_sum(&E, &l);
        let err_y = h * weighted_sum(&E, &k);
        if err_x == 0.0 || err_y == 0.0 {
            return Err(SolverError::VanishingErrorEstimate { at: self.t });
        }
        let h_x = SAFETY * h * (h.abs() * self.tol / err_x.abs()).powf(0.25);
        let h_y = SAFETY * h * (h.abs() * self.tol / err_y.abs()).powf(0.25);

        // The binding equation is the one demanding the smaller step.
        let (h_new, err) = if h_x.abs() < h_y.abs() {
            (h_x, err_x)
        } else {
            (h_y, err_y)
        };

        if h_new.abs() < h.abs() {
            self.h = h_new;
            Ok(StepResult {
                accepted: false,
                error_estimate: err,
                h_used: h,
            })
        } else {
            self.advance(h, &l, &k);
            self.h = h_new;
            Ok(StepResult {
                accepted: true,
                error_estimate: err,
                h_used: h,
            })
        }
    }

    fn advance(&mut self, h: f64, l: &[f64; 6], k: &[f64; 6]) {
        self.t += h;
        self.x += h * weighted_sum(&B, l);
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
            RKF45Pair::new(0.0, 2.0, 0.0, 50.0, 0.5, -1.0),
            Err(SolverError::InvalidTolerance(_))
        ));
        assert!(matches!(
            RKF45Pair::new(0.0, f64::INFINITY, 0.0, 50.0, 0.5, 1e-6),
            Err(SolverError::NonFiniteInput { name: "x0", .. })
        ));
        assert!(matches!(
            RKF45Pair::new(0.0, 2.0, 0.0, 50.0, -0.5, 1e-6),
            Err(SolverError::InvalidStepSize(_))
        ));
        assert!(RKF45Pair::new(0.0, 2.0, 0.0, 50.0, 0.5, 1e-6).is_ok());
    }

    #[test]
    fn test_harmonic_oscillator_single_step() {
        // x' = y, y' = -x from (1, 0); one fixed step of h = 0.1
        let mut solver = RKF45Pair::new(0.0, 1.0, 0.0, 1.0, 0.1, 1e-6).unwrap();
        let result = solver
            .step(|_t, _x, y| y, |_t, x, _y| -x, false)
            .unwrap();

        assert!(result.accepted);
        assert_relative_eq!(solver.t(), 0.1, epsilon = 1e-15);
        assert_relative_eq!(solver.x(), (0.1f64).cos(), epsilon = 1e-9);
        assert_relative_eq!(solver.y(), -(0.1f64).sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_rejected_step_leaves_state_untouched() {
        let mut solver = RKF45Pair::new(0.0, 1.0, 0.5, 10.0, 1.0, 1e-12).unwrap();
        let result = solver
            .step(|_t, _x, y| y, |_t, _x, y| -y, true)
            .unwrap();

        assert!(!result.accepted);
        assert_eq!(solver.sample().0, 0.0);
        assert_eq!(solver.x(), 1.0);
        assert_eq!(solver.y(), 0.5);
        assert!(solver.h() < 1.0);
    }

    #[test]
    fn test_combined_step_takes_conservative_candidate() {
        // Two decoupled equations: x' depends only on x, y' only on
        // (t, y). The combined step after one attempt must equal the
        // smaller of the steps each equation demands on its own.
        let g = |_t: f64, x: f64, _y: f64| -x;
        let f = |t: f64, _x: f64, y: f64| -y * (20.0 * t).cos();

        let mut pair = RKF45Pair::new(0.0, 1.0, 1.0, 10.0, 0.1, 1e-8).unwrap();
        let mut only_g = RKF45Pair::new(0.0, 1.0, 1.0, 10.0, 0.1, 1e-8).unwrap();
        let mut only_f = RKF45Pair::new(0.0, 1.0, 1.0, 10.0, 0.1, 1e-8).unwrap();

        pair.step(g, f, true).unwrap();
        only_g.step(g, g, true).unwrap();
        only_f.step(f, f, true).unwrap();

        let conservative = if only_g.h().abs() < only_f.h().abs() {
            only_g.h()
        } else {
            only_f.h()
        };
        assert_eq!(pair.h(), conservative);
    }

    #[test]
    fn test_stage_determinism() {
        let mut a = RKF45Pair::new(0.0, 2.0, 0.0, 5.0, 0.1, 1e-8).unwrap();
        let mut b = a.clone();

        for _ in 0..20 {
            a.step(|_t, _x, y| y, |_t, x, y| 4.0 * (1.0 - x * x) * y - x, true)
                .unwrap();
            b.step(|_t, _x, y| y, |_t, x, y| 4.0 * (1.0 - x * x) * y - x, true)
                .unwrap();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_vanishing_error_estimate() {
        let mut solver = RKF45Pair::new(0.0, 1.0, 1.0, 1.0, 0.1, 1e-6).unwrap();
        assert!(matches!(
            solver.step(|_t, _x, _y| 0.0, |_t, _x, y| -y, true),
            Err(SolverError::VanishingErrorEstimate { .. })
        ));
    }
}
