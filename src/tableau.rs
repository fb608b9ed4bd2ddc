//! Fehlberg 4(5) Butcher tableau
//!
//! One shared coefficient table drives both the scalar and the planar
//! integrator. The pair propagates the 5th order solution while the
//! difference to the embedded 4th order solution provides the local
//! truncation error estimate.

/// Stage evaluation times c_i, relative to the step.
pub const C: [f64; 6] = [0.0, 1.0 / 4.0, 3.0 / 8.0, 12.0 / 13.0, 1.0, 1.0 / 2.0];

/// Stage coefficients a_ij (lower triangular, row i feeds stage i).
#[rustfmt::skip]
pub const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0/4.0, 0.0, 0.0, 0.0, 0.0],
    [3.0/32.0, 9.0/32.0, 0.0, 0.0, 0.0],
    [1932.0/2197.0, -7200.0/2197.0, 7296.0/2197.0, 0.0, 0.0],
    [439.0/216.0, -8.0, 3680.0/513.0, -845.0/4104.0, 0.0],
    [-8.0/27.0, 2.0, -3544.0/2565.0, 1859.0/4104.0, -11.0/40.0],
];

/// 5th order solution weights b_i. Stage 1 does not contribute.
pub const B: [f64; 6] = [
    25.0 / 216.0,
    0.0,
    1408.0 / 2565.0,
    2197.0 / 4104.0,
    -1.0 / 5.0,
    0.0,
];

/// Local truncation error weights (4th minus 5th order combination).
pub const E: [f64; 6] = [
    1.0 / 360.0,
    0.0,
    -128.0 / 4275.0,
    -2197.0 / 75240.0,
    1.0 / 50.0,
    2.0 / 55.0,
];

/// Safety factor applied to every step-size proposal.
pub const SAFETY: f64 = 0.9;

/// Weighted sum of the six stage derivatives.
pub(crate) fn weighted_sum(w: &[f64; 6], k: &[f64; 6]) -> f64 {
    let mut acc = 0.0;
    for i in 0..6 {
        acc += w[i] * k[i];
    }
    acc
}
