use std::io::{self, Write};

use crate::sim::results::FlightResults;

/// Write the results record as JSON.
pub fn write_results<W: Write>(writer: &mut W, results: &FlightResults) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"terminal\": {{")?;
    writeln!(writer, "    \"altitude_km\": {:.3},", results.altitude_km)?;
    writeln!(writer, "    \"apoapsis_km\": {:.3},", results.apoapsis_km)?;
    writeln!(writer, "    \"periapsis_km\": {:.3},", results.periapsis_km)?;
    writeln!(writer, "    \"velocity_ms\": {:.2},", results.velocity)?;
    writeln!(writer, "    \"velocity_radial_ms\": {:.2},", results.velocity_radial)?;
    writeln!(writer, "    \"velocity_tangential_ms\": {:.2},", results.velocity_tangential)?;
    writeln!(writer, "    \"burn_time_left_s\": {:.2},", results.burn_time_left)?;
    writeln!(writer, "    \"engine_flag\": {}", results.engine.code())?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"orbit\": {{")?;
    writeln!(writer, "    \"sma_m\": {:.1},", results.orbit.sma)?;
    writeln!(writer, "    \"ecc\": {:.6},", results.orbit.ecc)?;
    writeln!(writer, "    \"inc_deg\": {:.4},", results.orbit.inc.to_degrees())?;
    writeln!(writer, "    \"lan_deg\": {:.4},", results.orbit.lan.to_degrees())?;
    writeln!(writer, "    \"aop_deg\": {:.4},", results.orbit.aop.to_degrees())?;
    writeln!(writer, "    \"true_anomaly_deg\": {:.4}", results.orbit.true_anomaly.to_degrees())?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"losses\": {{")?;
    writeln!(writer, "    \"gravity_ms\": {:.1},", results.loss_gravity)?;
    writeln!(writer, "    \"drag_ms\": {:.1},", results.loss_drag)?;
    writeln!(writer, "    \"total_ms\": {:.1}", results.loss_total)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"max_q\": {{")?;
    writeln!(writer, "    \"value_pa\": {:.1},", results.max_q)?;
    writeln!(writer, "    \"time_s\": {:.2}", results.max_q_time)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"steps\": {}", results.plots.len())?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write the results JSON to a file.
pub fn write_results_file(path: &str, results: &FlightResults) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_results(&mut file, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Context;
    use crate::sim::runner::simulate;
    use crate::vehicle::craft::VehicleBuilder;
    use crate::vehicle::mission::{Control, InitialState};

    #[test]
    fn json_output_is_well_formed() {
        let ctx = Context::earth();
        let vehicle = VehicleBuilder::new("Json test")
            .mass(1_000.0)
            .isp_sl(300.0)
            .isp_vac(300.0)
            .mass_flow(4.0)
            .max_burn_time(5.0)
            .drag_area(0.0)
            .build();
        let initial = InitialState::LaunchSite {
            longitude_deg: 0.0,
            latitude_deg: 0.0,
            altitude: 0.0,
        };
        let control = Control::PitchProgram {
            program: crate::curve::Curve::constant(0.0),
            azimuth_deg: 90.0,
        };
        let results = simulate(&ctx, &vehicle, &initial, &control, 0.1).unwrap();

        let mut buf = Vec::new();
        write_results(&mut buf, &results).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("\"terminal\""));
        assert!(json.contains("\"orbit\""));
        assert!(json.contains("\"engine_flag\": -1"));
        assert_eq!(json.matches('{').count(), json.matches('}').count());
    }
}
