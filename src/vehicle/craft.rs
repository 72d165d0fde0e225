use crate::curve::Curve;
use crate::errors::SimError;

// ---------------------------------------------------------------------------
// Vehicle definition (one powered stage, immutable during a run)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub name: String,
    pub mass: f64,           // launch mass incl. propellant, kg
    pub isp_vac: f64,        // vacuum specific impulse, s
    pub isp_sl: f64,         // sea-level specific impulse, s
    pub mass_flow: f64,      // propellant mass flow, kg/s
    pub max_burn_time: f64,  // propellant-limited burn duration, s
    pub hold_down_time: f64, // pre-release ground burn, s
    pub drag_area: f64,      // reference area, m^2
    pub drag_curve: Curve,   // (airspeed m/s, Cd)
}

impl Vehicle {
    /// Isp blended against the ambient pressure ratio (1.0 at sea level).
    pub fn isp_at(&self, pressure_ratio: f64) -> f64 {
        (self.isp_sl - self.isp_vac) * pressure_ratio + self.isp_vac
    }

    /// Thrust at the ambient pressure ratio, N.
    pub fn thrust_at(&self, g0: f64, pressure_ratio: f64) -> f64 {
        self.isp_at(pressure_ratio) * g0 * self.mass_flow
    }

    /// Mass at release, after the hold-down burn has been spent.
    pub fn release_mass(&self) -> f64 {
        self.mass - self.hold_down_time * self.mass_flow
    }

    /// Burn time remaining at release.
    pub fn release_burn_time(&self) -> f64 {
        self.max_burn_time - self.hold_down_time
    }

    /// Ideal vacuum delta-v of the full released burn.
    pub fn ideal_delta_v(&self, g0: f64) -> f64 {
        let m0 = self.release_mass();
        let mf = m0 - self.release_burn_time() * self.mass_flow;
        self.isp_vac * g0 * (m0 / mf).ln()
    }

    pub(crate) fn validate(&self) -> Result<(), SimError> {
        if self.mass_flow <= 0.0 {
            return Err(SimError::NonPositiveMassFlow(self.mass_flow));
        }
        if self.release_burn_time() <= 0.0 {
            return Err(SimError::NoBurnTime {
                hold_down: self.hold_down_time,
                max_burn: self.max_burn_time,
            });
        }
        if self.release_mass() <= 0.0 {
            return Err(SimError::NonPositiveMass(self.release_mass()));
        }
        if self.drag_area > 0.0 && self.drag_curve.is_empty() {
            return Err(SimError::EmptyCurve("drag coefficient"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Vehicle builder
// ---------------------------------------------------------------------------

pub struct VehicleBuilder {
    name: String,
    mass: f64,
    isp_vac: f64,
    isp_sl: f64,
    mass_flow: f64,
    max_burn_time: f64,
    hold_down_time: f64,
    drag_area: f64,
    drag_curve: Curve,
}

impl VehicleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mass: 10_000.0,
            isp_vac: 320.0,
            isp_sl: 280.0,
            mass_flow: 40.0,
            max_burn_time: 180.0,
            hold_down_time: 0.0,
            drag_area: 1.0,
            drag_curve: Curve::constant(0.3),
        }
    }

    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn isp_vac(mut self, v: f64) -> Self { self.isp_vac = v; self }
    pub fn isp_sl(mut self, v: f64) -> Self { self.isp_sl = v; self }
    pub fn mass_flow(mut self, v: f64) -> Self { self.mass_flow = v; self }
    pub fn max_burn_time(mut self, v: f64) -> Self { self.max_burn_time = v; self }
    pub fn hold_down_time(mut self, v: f64) -> Self { self.hold_down_time = v; self }
    pub fn drag_area(mut self, v: f64) -> Self { self.drag_area = v; self }
    pub fn drag_curve(mut self, v: Curve) -> Self { self.drag_curve = v; self }

    pub fn build(self) -> Vehicle {
        Vehicle {
            name: self.name,
            mass: self.mass,
            isp_vac: self.isp_vac,
            isp_sl: self.isp_sl,
            mass_flow: self.mass_flow,
            max_burn_time: self.max_burn_time,
            hold_down_time: self.hold_down_time,
            drag_area: self.drag_area,
            drag_curve: self.drag_curve,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
