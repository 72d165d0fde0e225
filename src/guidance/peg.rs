use log::debug;

use crate::physics::body::Body;

// ---------------------------------------------------------------------------
// Powered Explicit Guidance (planar, circular-orbit insertion)
// ---------------------------------------------------------------------------

/// Guidance coefficients and time-to-go.
///
/// The commanded radial component of the thrust unit vector is
/// `f_r(τ) = A − B·τ + C(τ)` with τ the time since the last major cycle;
/// C is the gravity/centrifugal equilibrium term recomputed every minor
/// step, A and B are refined here at major-cycle cadence together with the
/// time-to-go T.
#[derive(Debug, Clone, Copy)]
pub struct PegState {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub t: f64,
}

impl PegState {
    /// Pre-flight seed: no steering coefficients yet, T guessed at the
    /// remaining burn time.
    pub fn seed(t_guess: f64) -> Self {
        Self { a: 0.0, b: 0.0, c: 0.0, t: t_guess }
    }
}

/// The gravity/centrifugal steering term at the current state.
pub fn steering_constant(body: &Body, r: f64, vt: f64, accel: f64) -> f64 {
    (body.mu / (r * r) - vt * vt / r) / accel
}

/// One major-cycle refinement of (A, B, T).
///
/// Solves the two-constraint thrust-integral system for (A, B), terminal
/// radial velocity zero and terminal radius on target, using the previous T,
/// then updates T from the angular-momentum deficit with the second-order
/// expansion of the tangential thrust component. `prev.t` must already be
/// decremented by the time elapsed since the last refinement.
pub fn powered_explicit_guidance(
    body: &Body,
    r: f64,
    vt: f64,
    vy: f64,
    target_radius: f64,
    accel: f64,
    ve: f64,
    prev: &PegState,
) -> PegState {
    let tau = ve / accel; // time to burn the entire vehicle mass
    let t_old = prev.t.clamp(1e-3, 0.999 * tau);

    // --- (A, B) from the terminal constraints at fixed T ---
    let b0 = -ve * (1.0 - t_old / tau).ln();
    let b1 = b0 * tau - ve * t_old;
    let c0 = b0 * t_old - b1;
    let c1 = c0 * tau - 0.5 * ve * t_old * t_old;

    let z0 = -vy;
    let z1 = target_radius - r - vy * t_old;

    let det = b1 * c0 - b0 * c1;
    let (a, b) = if det.abs() > 1e-12 {
        ((b1 * z1 - c1 * z0) / det, (b0 * z1 - c0 * z0) / det)
    } else {
        (prev.a, prev.b)
    };

    // --- T from the angular-momentum deficit ---
    let target_vt = (body.mu / target_radius).sqrt();
    let momentum = r * vt;
    let target_momentum = target_radius * target_vt;
    let mean_radius = 0.5 * (r + target_radius);

    let c_now = steering_constant(body, r, vt, accel);
    let fr = a + c_now;
    // Steering term at cutoff, using the burnout acceleration.
    let accel_t = accel / (1.0 - t_old / tau);
    let c_t = (body.mu / (target_radius * target_radius) - target_vt * target_vt / target_radius)
        / accel_t;
    let fr_t = a - b * t_old + c_t;
    let frdot = (fr_t - fr) / t_old;

    // Tangential component expanded to second order in the radial one.
    let ftheta = 1.0 - 0.5 * fr * fr;
    let fdottheta = -fr * frdot;
    let fddottheta = -0.5 * frdot * frdot;

    let mut dv = (target_momentum - momentum) / mean_radius
        + ve * t_old * (fdottheta + fddottheta * tau)
        + 0.5 * fddottheta * ve * t_old * t_old;
    dv /= ftheta + fdottheta * tau + fddottheta * tau * tau;
    if !dv.is_finite() || dv < 0.0 {
        dv = (target_momentum - momentum).max(0.0) / mean_radius;
    }

    let t_new = tau * (1.0 - (-dv / ve).exp());
    let t = if t_new.is_finite() {
        t_new.clamp(1e-3, 0.999 * tau)
    } else {
        t_old
    };

    debug!("peg cycle: A={a:.5} B={b:.6} C={c_now:.5} T={t:.2}");
    PegState { a, b, c: c_now, t }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn insertion_case() -> (Body, f64, f64, f64, f64, f64, f64) {
        let body = Body::earth();
        let r = body.radius + 195_000.0;
        let target = body.radius + 200_000.0;
        let vt = 7_200.0;
        let vy = 30.0;
        let accel = 6.67;
        let ve = 340.0 * body.g0;
        (body, r, vt, vy, target, accel, ve)
    }

    #[test]
    fn time_to_go_converges_to_fixed_point() {
        let (body, r, vt, vy, target, accel, ve) = insertion_case();
        let mut state = PegState::seed(400.0);
        let mut history = vec![];
        for _ in 0..8 {
            state = powered_explicit_guidance(&body, r, vt, vy, target, accel, ve, &state);
            history.push(state.t);
        }
        let last = history[history.len() - 1];
        let prev = history[history.len() - 2];
        assert!(
            (last - prev).abs() / last < 0.01,
            "T should settle to <1% per cycle, got {history:?}"
        );
        // Momentum deficit ~594 m/s at ~6.7 m/s^2 puts T near 90 s.
        assert!(last > 40.0 && last < 200.0, "T out of range: {last}");
    }

    #[test]
    fn terminal_constraints_satisfied_at_convergence() {
        let (body, r, vt, vy, target, accel, ve) = insertion_case();
        let mut state = PegState::seed(400.0);
        for _ in 0..8 {
            state = powered_explicit_guidance(&body, r, vt, vy, target, accel, ve, &state);
        }
        // Reconstruct the thrust integrals at the converged T and verify the
        // linear system the (A, B) solve encodes.
        let tau = ve / accel;
        let t = state.t;
        let b0 = -ve * (1.0 - t / tau).ln();
        let b1 = b0 * tau - ve * t;
        let c0 = b0 * t - b1;
        let c1 = c0 * tau - 0.5 * ve * t * t;
        let z0 = state.a * b0 - state.b * b1;
        let z1 = state.a * c0 - state.b * c1;
        assert!((z0 - (-vy)).abs() < 0.05 * vy.abs().max(1.0), "radial-velocity constraint: {z0}");
        let want = target - r - vy * t;
        assert!(
            (z1 - want).abs() < 0.05 * want.abs().max(1.0),
            "radius constraint: {z1} vs {want}"
        );
    }

    #[test]
    fn already_on_target_needs_level_thrust() {
        let body = Body::earth();
        let r = body.radius + 200_000.0;
        let target = r;
        let vt = 7_500.0;
        let accel = 8.0;
        let ve = 3_300.0;
        let mut state = PegState::seed(100.0);
        for _ in 0..6 {
            state = powered_explicit_guidance(&body, r, vt, 0.0, target, accel, ve, &state);
        }
        // No radius or radial-velocity error: steering reduces to the
        // equilibrium C term alone.
        assert!(state.a.abs() < 0.01, "A = {}", state.a);
        assert!(state.b.abs() < 1e-3, "B = {}", state.b);
        let c = steering_constant(&body, r, vt, accel);
        assert!(c > 0.0 && c < 1.0, "C = {c}");
    }

    #[test]
    fn steering_constant_vanishes_at_circular_speed() {
        let body = Body::earth();
        let r = body.radius + 200_000.0;
        let vt = (body.mu / r).sqrt();
        let c = steering_constant(&body, r, vt, 8.0);
        assert!(c.abs() < 1e-9, "C should vanish at circular velocity, got {c}");
    }
}
