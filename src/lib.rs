//! Adaptive Runge-Kutta-Fehlberg 4(5) integration for scalar and
//! planar first-order ODE systems.
//!
//! Two integrators share one Fehlberg coefficient table:
//! - [`RKF45`] solves dy/dx = f(x, y),
//! - [`RKF45Pair`] solves the coupled pair dx/dt = g(t, x, y),
//!   dy/dt = f(t, x, y), combining two embedded error estimates into
//!   one step-size decision.
//!
//! The [`driver`] module runs either integrator to its bound and
//! returns an append-only trajectory of accepted samples, including
//! the initial condition.
//!
//! # Example
//!
//! ```rust,ignore
//! use fehlberg::prelude::*;
//!
//! // dy/dx = -y from y(0) = 1, integrated to x = 5
//! let mut solver = RKF45::new(0.0, 1.0, 5.0, 0.01, 1e-8)?;
//! let trajectory = integrate(&mut solver, |_x, y| -y, &Options::default())?;
//!
//! for sample in &trajectory {
//!     println!("x = {}, y = {}, h = {}", sample.x, sample.y, sample.h);
//! }
//! trajectory.save("decay.csv")?;
//! ```

pub mod coupled;
pub mod driver;
pub mod error;
pub mod scalar;
pub mod tableau;
pub mod trajectory;

pub use coupled::RKF45Pair;
pub use driver::{integrate, integrate_pair, Options};
pub use error::{SolverError, StepResult};
pub use scalar::RKF45;
pub use trajectory::{PhaseSample, PhaseTrajectory, Sample, Trajectory};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coupled::RKF45Pair;
    pub use crate::driver::{integrate, integrate_pair, Options};
    pub use crate::error::{SolverError, StepResult};
    pub use crate::scalar::RKF45;
    pub use crate::trajectory::{PhaseSample, PhaseTrajectory, Sample, Trajectory};
}
