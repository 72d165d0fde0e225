use log::debug;
use nalgebra::Vector3;

use crate::frames::{unit, NavballFrame, SteeringFrame};
use crate::guidance::cser::{conic_state_extrapolation, CserState};
use crate::physics::body::Body;

// ---------------------------------------------------------------------------
// Unified Powered Flight Guidance (3-D, single active stage)
// ---------------------------------------------------------------------------

/// Terminal state UPFG steers toward.
#[derive(Debug, Clone)]
pub struct UpfgTarget {
    /// Cutoff radius from the body center, m.
    pub radius: f64,
    /// Unit normal of the target orbital plane, pointing OPPOSITE the
    /// desired angular momentum, so that `unit(rd × normal)` is downrange.
    pub normal: Vector3<f64>,
    /// Cutoff speed, m/s.
    pub velocity: f64,
    /// Cutoff flight-path angle above the local horizon, degrees.
    pub flight_path_angle_deg: f64,
}

impl UpfgTarget {
    /// Target in the instantaneous orbital plane of (r, v).
    pub fn coplanar_with(
        radius: f64,
        velocity: f64,
        flight_path_angle_deg: f64,
        r: &Vector3<f64>,
        v: &Vector3<f64>,
    ) -> Self {
        Self {
            radius,
            normal: -unit(r.cross(v)),
            velocity,
            flight_path_angle_deg,
        }
    }

    /// Target plane from classical inclination and node angles (degrees).
    pub fn from_inclination(
        radius: f64,
        velocity: f64,
        flight_path_angle_deg: f64,
        inclination_deg: f64,
        lan_deg: f64,
    ) -> Self {
        let inc = inclination_deg.to_radians();
        let lan = lan_deg.to_radians();
        let h = Vector3::new(inc.sin() * lan.sin(), -inc.sin() * lan.cos(), inc.cos());
        Self {
            radius,
            normal: -h,
            velocity,
            flight_path_angle_deg,
        }
    }
}

/// Active-stage snapshot consumed by one guidance call.
#[derive(Debug, Clone, Copy)]
pub struct UpfgVehicle {
    pub thrust: f64, // N
    pub isp: f64,    // s
    pub mass: f64,   // kg
}

/// Guidance state persisting between major cycles. Owned by the
/// orchestrator and threaded through every call; nothing here is global.
#[derive(Debug, Clone)]
pub struct UpfgInternal {
    pub cser: CserState,
    pub rbias: Vector3<f64>,
    pub rd: Vector3<f64>,
    pub rgrav: Vector3<f64>,
    pub time: f64,
    pub tgo: f64,
    pub v: Vector3<f64>,
    pub vgo: Vector3<f64>,
}

/// Commands produced by one major cycle (degrees, seconds).
#[derive(Debug, Clone, Copy)]
pub struct UpfgGuidance {
    pub pitch: f64,
    pub yaw: f64,
    pub tgo: f64,
}

/// Internals of one major cycle, aggregated for post-flight analysis.
#[derive(Debug, Clone)]
pub struct UpfgDebug {
    pub time: f64,
    pub tgo: f64,
    pub l: f64,
    pub j: f64,
    pub s: f64,
    pub q: f64,
    pub p: f64,
    pub h: f64,
    pub lambda: Vector3<f64>,
    pub lambda_dot: Vector3<f64>,
    pub i_f: Vector3<f64>,
    pub phi: f64,
    pub phi_dot: f64,
    pub rthrust: Vector3<f64>,
    pub vthrust: Vector3<f64>,
    pub rbias: Vector3<f64>,
    pub vbias: Vector3<f64>,
    pub rgrav: Vector3<f64>,
    pub vgrav: Vector3<f64>,
    pub rgo: Vector3<f64>,
    pub rd: Vector3<f64>,
    pub vd: Vector3<f64>,
    pub vgo: Vector3<f64>,
    pub pitch: f64,
    pub yaw: f64,
}

impl UpfgInternal {
    /// Pre-flight state: desired cutoff position seeded 45° downrange in the
    /// target plane, velocity-to-go against the rotated flight-path-angle
    /// vector, and an inward gravity-displacement seed that the first conic
    /// extrapolation replaces.
    pub fn initialize(
        body: &Body,
        target: &UpfgTarget,
        time: f64,
        r: &Vector3<f64>,
        v: &Vector3<f64>,
    ) -> Self {
        let iy = unit(target.normal);
        let in_plane = r - r.dot(&iy) * iy;
        let ix = unit(in_plane);
        let iz = ix.cross(&iy);
        let rd = target.radius * unit(ix + iz);

        let gamma = target.flight_path_angle_deg.to_radians();
        let vd = target.velocity * (ix * gamma.sin() + iz * gamma.cos());

        let rm = r.norm();
        Self {
            cser: CserState::default(),
            rbias: Vector3::zeros(),
            rd,
            rgrav: -(body.mu / 2.0) * r / (rm * rm * rm),
            time,
            tgo: 0.0,
            v: *v,
            vgo: vd - v,
        }
    }
}

/// One UPFG major cycle.
///
/// Consumes the previous internal state and the current navigation state,
/// returns the refreshed internal state, the steering commands extracted
/// against the current navball frame, and the cycle debug record.
pub fn unified_powered_flight_guidance(
    body: &Body,
    target: &UpfgTarget,
    vehicle: &UpfgVehicle,
    time: f64,
    r: &Vector3<f64>,
    v: &Vector3<f64>,
    previous: &UpfgInternal,
) -> (UpfgInternal, UpfgGuidance, UpfgDebug) {
    let iy = unit(target.normal);
    let gamma = target.flight_path_angle_deg.to_radians();

    // --- Block 1: velocity-to-go update from sensed acceleration ---
    let dvsensed = v - previous.v;
    let mut vgo = previous.vgo - dvsensed;

    // --- Block 2: time-to-go for the single active stage ---
    let accel = vehicle.thrust / vehicle.mass;
    let ve = vehicle.isp * body.g0;
    let tau = ve / accel;
    let l = vgo.norm();
    let tgo = tau * (1.0 - (-l / ve).exp());

    // --- Block 3: thrust integrals ---
    let j = tau * l - ve * tgo;
    let s = l * tgo - j;
    let q = s * tau - 0.5 * ve * tgo * tgo;
    let p = q * tau - ve * tgo * tgo * tgo / 6.0;
    let h = j * tgo - q;

    // --- Block 4: turning-rate vectors ---
    let lambda = unit(vgo);
    let rgrav_scaled = if previous.tgo > 0.0 {
        (tgo / previous.tgo).powi(2) * previous.rgrav
    } else {
        previous.rgrav
    };
    let mut rgo = previous.rd - (r + v * tgo + rgrav_scaled);
    let iz = unit(previous.rd.cross(&iy));
    let rgoxy = rgo - iz.dot(&rgo) * iz;
    let lam_iz = lambda.dot(&iz);
    let rgoz = if lam_iz.abs() > 1e-9 {
        (s - lambda.dot(&rgoxy)) / lam_iz
    } else {
        0.0
    };
    rgo = rgoxy + rgoz * iz + previous.rbias;

    let lambda_de = q - s * j / l;
    let lambda_dot = if lambda_de.abs() > 1e-9 {
        (rgo - s * lambda) / lambda_de
    } else {
        Vector3::zeros()
    };
    let i_f = unit(lambda - lambda_dot * (j / l));
    let phi = i_f.dot(&lambda).clamp(-1.0, 1.0).acos();
    let phi_dot = if j > 0.0 { -phi * l / j } else { 0.0 };

    let vthrust = (l - 0.5 * l * phi * phi - j * phi * phi_dot - 0.5 * h * phi_dot * phi_dot) * lambda;
    let rthrust = (s - 0.5 * s * phi * phi - q * phi * phi_dot - 0.5 * p * phi_dot * phi_dot) * lambda
        - (s * phi + q * phi_dot) * unit(lambda_dot);
    let vbias = vgo - vthrust;
    let rbias = rgo - rthrust;

    // --- Block 5: steering commands against the current navball frame ---
    let nav = NavballFrame::from_state(r, v);
    let (pitch, yaw) = nav.angles_of(&i_f);

    // --- Block 6: gravity integrals over the biased coast ---
    let tgo_safe = tgo.max(1e-6);
    let rc1 = r - 0.1 * rthrust - (tgo / 30.0) * vthrust;
    let vc1 = v + 1.2 * rthrust / tgo_safe - 0.1 * vthrust;
    let (rc2, vc2, cser) = conic_state_extrapolation(body.mu, &rc1, &vc1, tgo, &previous.cser);
    let vgrav = vc2 - vc1;
    let rgrav = rc2 - rc1 - vc1 * tgo;

    // --- Block 7: desired cutoff state and velocity-to-go refresh ---
    let mut rp = r + v * tgo + rgrav + rthrust;
    rp -= rp.dot(&iy) * iy;
    let rd = target.radius * unit(rp);
    let ix = unit(rd);
    let iz2 = ix.cross(&iy);
    let vd = target.velocity * (ix * gamma.sin() + iz2 * gamma.cos());
    vgo = vd - v - vgrav + vbias;

    debug!("upfg cycle: tgo={tgo:.2} |vgo|={:.1} pitch={pitch:.2} yaw={yaw:.2}", vgo.norm());

    let internal = UpfgInternal {
        cser,
        rbias,
        rd,
        rgrav,
        time,
        tgo,
        v: *v,
        vgo,
    };
    let guidance = UpfgGuidance { pitch, yaw, tgo };
    let dbg = UpfgDebug {
        time,
        tgo,
        l,
        j,
        s,
        q,
        p,
        h,
        lambda,
        lambda_dot,
        i_f,
        phi,
        phi_dot,
        rthrust,
        vthrust,
        rbias,
        vbias,
        rgrav,
        vgrav,
        rgo,
        rd,
        vd,
        vgo,
        pitch,
        yaw,
    };
    (internal, guidance, dbg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
