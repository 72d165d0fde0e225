use log::warn;
use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Conic state extrapolation (universal-variable Kepler propagation)
// ---------------------------------------------------------------------------

/// Carry-over state between extrapolation calls.
///
/// `dtcp`/`xcp` warm-start the universal-anomaly iteration on the next call;
/// `a`, `d`, `e` retain the converged Lagrange coefficients (f, g, ġ) of the
/// last call for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CserState {
    pub dtcp: f64,
    pub xcp: f64,
    pub a: f64,
    pub d: f64,
    pub e: f64,
}

/// Stumpff functions C2(z), C3(z) with series fallback near z = 0.
fn stumpff(z: f64) -> (f64, f64) {
    if z > 1e-6 {
        let s = z.sqrt();
        ((1.0 - s.cos()) / z, (s - s.sin()) / (z * s))
    } else if z < -1e-6 {
        let s = (-z).sqrt();
        ((1.0 - s.cosh()) / z, (s.sinh() - s) / (-z * s))
    } else {
        (
            0.5 - z / 24.0 + z * z / 720.0,
            1.0 / 6.0 - z / 120.0 + z * z / 5040.0,
        )
    }
}

/// Propagate (r0, v0) by `dt` seconds along the unperturbed conic.
///
/// Newton iteration on the universal Kepler time-of-flight equation,
/// warm-started from the previous converged anomaly when one is available,
/// then Lagrange f and g evaluation. Used by UPFG to predict the gravity
/// integrals over the remaining burn.
pub fn conic_state_extrapolation(
    mu: f64,
    r0: &Vector3<f64>,
    v0: &Vector3<f64>,
    dt: f64,
    prev: &CserState,
) -> (Vector3<f64>, Vector3<f64>, CserState) {
    if dt == 0.0 {
        return (*r0, *v0, CserState { dtcp: 0.0, xcp: 0.0, ..*prev });
    }

    let r0m = r0.norm();
    let sqrt_mu = mu.sqrt();
    let alpha = 2.0 / r0m - v0.norm_squared() / mu; // reciprocal semi-major axis
    let sigma0 = r0.dot(v0) / sqrt_mu;

    // Initial guess: scale the previously converged anomaly with the time
    // ratio when the previous call is comparable, otherwise the standard
    // elliptic (or near-parabolic) seed.
    let mut x = if prev.dtcp != 0.0 && prev.xcp != 0.0 && dt / prev.dtcp > 0.0 {
        prev.xcp * dt / prev.dtcp
    } else if alpha.abs() > 1e-12 {
        sqrt_mu * dt * alpha
    } else {
        sqrt_mu * dt / r0m
    };

    let tol = 1e-9 * dt.abs().max(1.0);
    let mut converged = false;
    for _ in 0..60 {
        let z = alpha * x * x;
        let (c2, c3) = stumpff(z);
        let x2 = x * x;
        let t = (x2 * x * c3 + sigma0 * x2 * c2 + r0m * x * (1.0 - z * c3)) / sqrt_mu;
        let rm = x2 * c2 + sigma0 * x * (1.0 - z * c3) + r0m * (1.0 - z * c2);
        let dterr = dt - t;
        if dterr.abs() < tol {
            converged = true;
            break;
        }
        x += sqrt_mu * dterr / rm.max(1.0);
    }
    if !converged {
        warn!("conic extrapolation did not converge for dt = {dt:.3} s");
    }

    let z = alpha * x * x;
    let (c2, c3) = stumpff(z);
    let f = 1.0 - x * x * c2 / r0m;
    let g = dt - x * x * x * c3 / sqrt_mu;
    let r = r0 * f + v0 * g;
    let rm = r.norm();
    let gdot = 1.0 - x * x * c2 / rm;
    let fdot = sqrt_mu * x * (z * c3 - 1.0) / (r0m * rm);
    let v = r0 * fdot + v0 * gdot;

    (r, v, CserState { dtcp: dt, xcp: x, a: f, d: g, e: gdot })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
