use ascent_sim::physics::body::Context;
use ascent_sim::sim::results::FlightResults;
use ascent_sim::sim::runner::simulate;
use ascent_sim::vehicle::mission::{presets, Control, InitialState};

fn main() {
    env_logger::init();

    let ctx = Context::earth();
    let export = std::env::args().any(|a| a == "--export");

    // -----------------------------------------------------------------------
    // Phase 1: booster under an open-loop gravity turn
    // -----------------------------------------------------------------------
    let booster = presets::booster();
    let pad = InitialState::LaunchSite {
        longitude_deg: 0.0,
        latitude_deg: 0.0,
        altitude: 0.0,
    };
    let gravity_turn = Control::GravityTurn {
        pitchover_angle_deg: 4.0,
        pitchover_velocity: 40.0,
    };
    let ascent = simulate(&ctx, &booster, &pad, &gravity_turn, 0.2)
        .expect("booster phase failed to start");

    // -----------------------------------------------------------------------
    // Phase 2: sustainer flies PEG into the target orbit from the hand-off
    // -----------------------------------------------------------------------
    let sustainer = presets::sustainer();
    let insertion_ctl = Control::Peg {
        target_altitude: 200_000.0,
        azimuth_deg: 90.0,
        major_cycle: 2.0,
    };
    let insertion = simulate(&ctx, &sustainer, &ascent.final_state(), &insertion_ctl, 0.2)
        .expect("insertion phase failed to start");

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  3-DOF ASCENT SIMULATION — {} + {}", booster.name, sustainer.name);
    println!("====================================================================");
    println!();

    for (vehicle, label) in [(&booster, "Phase 1"), (&sustainer, "Phase 2")] {
        println!("  {} — {}", label, vehicle.name);
        println!("  ──────────────────────────────────────────────────────────────────");
        println!(
            "  Mass: {:.0} kg  Flow: {:.0} kg/s  Isp: {:.0}/{:.0} s  Burn: {:.0} s  dv: {:.0} m/s",
            vehicle.mass,
            vehicle.mass_flow,
            vehicle.isp_sl,
            vehicle.isp_vac,
            vehicle.release_burn_time(),
            vehicle.ideal_delta_v(ctx.body.g0),
        );
        println!();
    }

    print_phase("BOOSTER BURNOUT", &ascent);
    print_phase("INSERTION", &insertion);

    println!("  Orbit at cutoff");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  SMA {:.1} km   ECC {:.5}   INC {:.2} deg",
        insertion.orbit.sma / 1000.0,
        insertion.orbit.ecc,
        insertion.orbit.inc.to_degrees()
    );
    println!(
        "  Apoapsis {:.1} km   Periapsis {:.1} km   ENG flag {}",
        insertion.apoapsis_km,
        insertion.periapsis_km,
        insertion.engine.code()
    );
    println!(
        "  Losses: gravity {:.0} m/s, drag {:.0} m/s, total {:.0} m/s",
        ascent.loss_gravity + insertion.loss_gravity,
        ascent.loss_drag + insertion.loss_drag,
        ascent.loss_total + insertion.loss_total
    );
    println!();

    // -----------------------------------------------------------------------
    // Sampled trajectory table
    // -----------------------------------------------------------------------
    println!("  Trajectory (insertion phase)");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>8}  {:>8}  {:>7}",
        "t(s)", "alt(km)", "vel(m/s)", "vy(m/s)", "q(Pa)", "pitch"
    );
    let plots = &insertion.plots;
    let sample = (plots.len() / 25).max(1);
    for i in (0..plots.len()).step_by(sample).chain([plots.len() - 1]) {
        println!(
            "  {:>7.1}  {:>9.1}  {:>9.1}  {:>8.1}  {:>8.1}  {:>6.1}\u{00b0}",
            plots.time[i],
            (plots.radius[i] - ctx.body.radius) / 1000.0,
            plots.speed[i],
            plots.velocity_radial[i],
            plots.dynamic_pressure[i],
            plots.pitch_cmd[i],
        );
    }
    println!();

    if export {
        ascent_sim::io::csv::write_trajectory_file("trajectory.csv", &insertion.plots)
            .expect("Failed to write CSV");
        ascent_sim::io::json::write_results_file("results.json", &insertion)
            .expect("Failed to write JSON");
        println!("  Exported: trajectory.csv and results.json");
    } else {
        println!("  Run with --export to save trajectory.csv and results.json");
    }
    println!("====================================================================");
    println!();
}

fn print_phase(label: &str, results: &FlightResults) {
    println!("  {label}");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  t={:>6.1}s  alt={:>7.1}km  vel={:>7.1}m/s  vy={:>6.1}m/s  maxQ={:.0}Pa @ {:.0}s",
        results.plots.time.last().unwrap(),
        results.altitude_km,
        results.velocity,
        results.velocity_radial,
        results.max_q,
        results.max_q_time
    );
    println!();
}
