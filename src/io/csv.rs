use std::io::{self, Write};

use crate::sim::results::Plots;

/// Write the trajectory series as CSV.
///
/// Columns: time, position, velocity, radial/tangential split, mass,
/// thrust, acceleration, dynamic pressure, commanded and derived angles.
pub fn write_trajectory<W: Write>(writer: &mut W, plots: &Plots) -> io::Result<()> {
    writeln!(
        writer,
        "time,pos_x,pos_y,pos_z,radius,vel_x,vel_y,vel_z,vel_radial,vel_tangential,speed,\
         mass,thrust,accel,dynamic_pressure,\
         pitch_cmd,yaw_cmd,pitch_srf,yaw_srf,pitch_obt,yaw_obt"
    )?;

    for i in 0..plots.len() {
        let r = plots.position[i];
        let v = plots.velocity[i];
        writeln!(
            writer,
            "{:.3},{:.3},{:.3},{:.3},{:.3},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},\
             {:.3},{:.1},{:.4},{:.2},\
             {:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
            plots.time[i],
            r.x, r.y, r.z,
            plots.radius[i],
            v.x, v.y, v.z,
            plots.velocity_radial[i],
            plots.velocity_tangential[i],
            plots.speed[i],
            plots.mass[i],
            plots.thrust[i],
            plots.accel[i],
            plots.dynamic_pressure[i],
            plots.pitch_cmd[i],
            plots.yaw_cmd[i],
            plots.pitch_srf[i],
            plots.yaw_srf[i],
            plots.pitch_obt[i],
            plots.yaw_obt[i],
        )?;
    }

    Ok(())
}

/// Write the trajectory CSV to a file at the given path.
pub fn write_trajectory_file(path: &str, plots: &Plots) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, plots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Context;
    use crate::sim::state::{StepState, SteeringCommand};
    use nalgebra::Vector3;

    #[test]
    fn csv_output_has_header_and_rows() {
        let ctx = Context::earth();
        let mut plots = Plots::with_capacity(2);
        let r = Vector3::new(ctx.body.radius, 0.0, 0.0);
        let v = Vector3::new(0.0, 465.0, 0.0);
        let s0 = StepState::derive(&ctx, 0.0, r, v, 1_000.0, 12_000.0, 0.0);
        let s1 = StepState::derive(&ctx, 0.1, r, v, 999.6, 12_000.0, 0.6);
        plots.push(&s0, SteeringCommand::default());
        plots.push(&s1, SteeringCommand { pitch: 1.0, yaw: 0.0 });

        let mut buf = Vec::new();
        write_trajectory(&mut buf, &plots).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].starts_with("0.000,"));
    }
}
