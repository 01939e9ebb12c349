//! Full passes on the channel, serially and with thread-backed ranks.

mod common;

use nf_core::Real;
use nf_solver::{
    AllReduce, Couplings, PassReport, SerialReducer, SolverConfig, ThreadCommunicator,
    ViscousSolver,
};

fn monitored_config() -> SolverConfig {
    let mut config = common::adiabatic_config();
    for wall in &mut config.walls {
        wall.monitoring = true;
    }
    config.buffet.enabled = true;
    config.buffet.ref_area = 1.0;
    config.buffet.freestream_velocity = [common::LID_SPEED, 0.0, 0.0];
    config
}

fn pass(config: &SolverConfig, comm: &dyn AllReduce) -> PassReport {
    let mesh = common::channel();
    let mut field = common::shear_field(&mesh, config);
    let mut solver = ViscousSolver::new(&mesh, config.clone(), Couplings::default()).unwrap();
    let mut system = solver.new_system(&mesh);
    solver
        .run_pass(&mesh, &mut field, &mut system, Couplings::default(), comm)
        .unwrap()
}

fn marker(report: &PassReport, name: &str) -> Real {
    report
        .buffet
        .as_ref()
        .unwrap()
        .per_marker
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| *v)
        .unwrap()
}

#[test]
fn serial_pass_reports_walls_and_flow() {
    let report = pass(&monitored_config(), &SerialReducer);
    assert_eq!(report.preprocess.non_physical, 0);
    assert_eq!(report.wall_nodes, 12);
    assert_eq!(report.residual_rms.len(), 4);
    assert!(report.residual_rms.iter().all(|r| r.is_finite()));

    // Pure shear: |ω| = ∂u/∂y
    assert!((report.preprocess.flow.max_vorticity - common::LID_SPEED).abs() < 1e-9);
}

#[test]
fn shear_opposing_the_freestream_trips_the_sensor() {
    let report = pass(&monitored_config(), &SerialReducer);
    // Friction on the upper wall points upstream, on the lower wall downstream.
    assert!((marker(&report, "upper_wall") - 2.0).abs() < 1e-6);
    assert!(marker(&report, "lower_wall").abs() < 1e-6);
    let total = report.buffet.as_ref().unwrap().total;
    assert!((total - 2.0).abs() < 1e-6);
}

#[test]
fn unmonitored_walls_contribute_nothing() {
    let mut config = monitored_config();
    config.walls[1].monitoring = false;
    let report = pass(&config, &SerialReducer);
    assert_eq!(marker(&report, "upper_wall"), 0.0);
}

#[test]
fn disabled_buffet_is_omitted() {
    let report = pass(&common::adiabatic_config(), &SerialReducer);
    assert!(report.buffet.is_none());
}

#[test]
fn ranks_reduce_buffet_and_flow_monitors() {
    let config = monitored_config();
    let serial = pass(&config, &SerialReducer);

    let comms = ThreadCommunicator::group(2);
    let reports: Vec<PassReport> = std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .iter()
            .map(|c| {
                let config = &config;
                s.spawn(move || pass(config, c))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let serial_total = serial.buffet.as_ref().unwrap().total;
    for report in &reports {
        let total = report.buffet.as_ref().unwrap().total;
        assert!((total - 2.0 * serial_total).abs() < 1e-9);
        assert!((marker(report, "upper_wall") - 2.0 * marker(&serial, "upper_wall")).abs() < 1e-9);
        assert_eq!(
            report.preprocess.flow.max_vorticity,
            serial.preprocess.flow.max_vorticity
        );
        assert_eq!(report.residual_rms, serial.residual_rms);
    }
}

#[test]
fn pass_report_serializes() {
    let report = pass(&monitored_config(), &SerialReducer);
    let yaml = serde_yaml::to_string(&report).unwrap();
    assert!(yaml.contains("wall_nodes: 12"));
    assert!(yaml.contains("upper_wall"));
}
