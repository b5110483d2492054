use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use verlet_bins::config::SimConfig;
use verlet_bins::simulation::error::SimError;
use verlet_bins::simulation::frame_driver::{FrameDriver, SimulationBackend};
use verlet_bins::simulation::grid_params::GridParams;
use verlet_bins::simulation::particle::Particle;
use verlet_bins::simulation::sim_params::{Boundary, SimParams};

mod common;

/// Backend that only records what the driver asks of it.
struct RecordingBackend {
    grid: GridParams,
    calls: Vec<&'static str>,
    params: Vec<SimParams>,
    writes: Vec<usize>,
    slot: usize,
    /// Rebuild number (counted from 0) that reports an error.
    failing_rebuild: Option<usize>,
}

impl RecordingBackend {
    fn new() -> Self {
        Self { grid: common::small_grid(), calls: vec![], params: vec![], writes: vec![], slot: 0, failing_rebuild: None }
    }
}

impl SimulationBackend for RecordingBackend {
    fn capacity(&self) -> usize {
        4
    }

    fn grid(&self) -> &GridParams {
        &self.grid
    }

    fn begin_frame(&mut self) {
        self.calls.push("begin");
    }

    fn rebuild_index(&mut self) -> Result<(), SimError> {
        let rebuilds = self.calls.iter().filter(|call| **call == "rebuild").count();
        self.calls.push("rebuild");
        if self.failing_rebuild == Some(rebuilds) {
            return Err(SimError::CapacityExceeded { particles: 5, capacity: 4 });
        }
        Ok(())
    }

    fn integrate(&mut self, params: &SimParams) {
        self.calls.push("integrate");
        self.params.push(*params);
    }

    fn swap(&mut self) {
        self.calls.push("swap");
        self.slot ^= 1;
    }

    fn end_frame(&mut self) {
        self.calls.push("end");
    }

    fn write_particle(&mut self, index: usize, _particle: &Particle) {
        self.writes.push(index);
    }

    fn current_slot(&self) -> usize {
        self.slot
    }
}

#[test]
fn each_sub_step_rebuilds_integrates_and_swaps() {
    let config = common::quiet_config(4, 3);
    let mut driver = FrameDriver::new(RecordingBackend::new(), &config).unwrap();
    let slot = driver.advance(0.015, None).unwrap();

    assert_eq!(
        driver.backend().calls,
        vec![
            "begin", "rebuild", "integrate", "swap", "rebuild", "integrate", "swap", "rebuild", "integrate", "swap", "end"
        ]
    );
    // Three swaps from slot 0.
    assert_eq!(slot, 1);
}

#[test]
fn a_failed_rebuild_keeps_finished_sub_steps_but_not_the_frame_clock() {
    let config = common::quiet_config(4, 3);
    let backend = RecordingBackend { failing_rebuild: Some(1), ..RecordingBackend::new() };
    let mut driver = FrameDriver::new(backend, &config).unwrap();

    assert_eq!(
        driver.advance(0.015, None),
        Err(SimError::CapacityExceeded { particles: 5, capacity: 4 })
    );
    assert_eq!(driver.backend().calls, vec!["begin", "rebuild", "integrate", "swap", "rebuild", "end"]);
    assert_eq!(driver.backend().current_slot(), 1);
    assert_eq!(driver.total_time(), 0.0);
    assert_eq!(driver.frame_count(), 0);
}

#[test]
fn sub_steps_split_the_frame_evenly() {
    let config = common::quiet_config(4, 3);
    let mut driver = FrameDriver::new(RecordingBackend::new(), &config).unwrap();
    driver.advance(0.015, None).unwrap();
    driver.advance(0.015, None).unwrap();

    let params = &driver.backend().params;
    assert_eq!(params.len(), 6);
    for p in params {
        assert!((p.delta_time - 0.005).abs() < 1e-7);
    }
    let times: Vec<f32> = params.iter().map(|p| p.total_time).collect();
    let expected = [0.005, 0.010, 0.015, 0.020, 0.025, 0.030];
    for (time, expected) in times.iter().zip(expected) {
        assert!((time - expected).abs() < 1e-6, "{times:?}");
    }
    assert!((driver.total_time() - 0.030).abs() < 1e-6);
    assert_eq!(driver.frame_count(), 2);
}

#[test]
fn frame_delta_is_clamped() {
    let config = common::quiet_config(4, 2);
    let mut driver = FrameDriver::new(RecordingBackend::new(), &config).unwrap();

    driver.advance(5.0, None).unwrap();
    driver.advance(-1.0, None).unwrap();
    driver.advance(f32::NAN, None).unwrap();

    let deltas: Vec<f32> = driver.backend().params.iter().map(|p| p.delta_time).collect();
    assert_eq!(deltas, vec![1.0 / 120.0, 1.0 / 120.0, 0.0, 0.0, 0.0, 0.0]);
    assert!((driver.total_time() - 1.0 / 60.0).abs() < 1e-7);
}

#[test]
fn interaction_point_reaches_every_sub_step() {
    let config = SimConfig { interaction_strength: 300.0, ..common::quiet_config(4, 2) };
    let mut driver = FrameDriver::new(RecordingBackend::new(), &config).unwrap();
    driver.advance(0.01, Some(Vec2::new(3.0, 4.0))).unwrap();
    driver.advance(0.01, None).unwrap();

    let params = &driver.backend().params;
    for p in &params[..2] {
        let interaction = p.interaction.unwrap();
        assert_eq!(interaction.point, Vec2::new(3.0, 4.0));
        assert_eq!(interaction.strength, 300.0);
    }
    assert!(params[2..].iter().all(|p| p.interaction.is_none()));
}

#[test]
fn spawn_fills_the_first_free_slot_until_the_pool_is_full() {
    let config = common::quiet_config(4, 1);
    let mut driver = FrameDriver::new(RecordingBackend::new(), &config).unwrap();

    for expected in 0..4 {
        assert_eq!(driver.spawn(Vec2::ZERO, common::WHITE, 3.0), Ok(expected));
    }
    assert_eq!(driver.spawn(Vec2::ZERO, common::WHITE, 3.0), Err(SimError::PoolFull { capacity: 4 }));
    assert_eq!(driver.backend().writes, vec![0, 1, 2, 3]);
    assert_eq!(driver.live_count(), 4);
}

#[test]
fn spawn_rejects_particles_larger_than_a_cell_allows() {
    let config = common::quiet_config(4, 1);
    let mut driver = FrameDriver::new(RecordingBackend::new(), &config).unwrap();

    assert_eq!(
        driver.spawn(Vec2::ZERO, common::WHITE, 10.5),
        Err(SimError::RadiusExceedsCell { radius: 10.5, max_radius: 10.0 })
    );
    assert!(driver.backend().writes.is_empty());
    assert_eq!(driver.live_count(), 0);
}

#[test]
fn spawn_rejects_degenerate_radii_and_positions() {
    let config = common::quiet_config(4, 1);
    let mut driver = FrameDriver::new(RecordingBackend::new(), &config).unwrap();

    for radius in [0.0, -2.0, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            driver.spawn(Vec2::ZERO, common::WHITE, radius),
            Err(SimError::InvalidRadius { .. })
        ));
    }
    assert!(matches!(
        driver.spawn(Vec2::new(f32::NAN, 0.0), common::WHITE, 3.0),
        Err(SimError::InvalidPosition { .. })
    ));
    assert!(driver.backend().writes.is_empty());
    assert_eq!(driver.live_count(), 0);
}

#[test]
fn rejected_spawns_leave_neighbours_finite() {
    let mut driver = common::cpu_driver(&common::quiet_config(4, 1));
    driver.spawn(Vec2::ZERO, common::WHITE, 3.0).unwrap();
    assert!(driver.spawn(Vec2::new(1.0, 0.0), common::WHITE, f32::NAN).is_err());
    assert!(driver.spawn(Vec2::new(-5.0, 0.0), common::WHITE, -2.0).is_err());

    driver.advance(1.0 / 60.0, None).unwrap();

    let store = driver.backend().current();
    assert_eq!(store.live_count(), 1);
    assert_eq!(driver.live_count(), store.live_count());
    assert_eq!(store.particles()[0].position, Vec2::ZERO);
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimConfig { sub_steps: 0, ..common::quiet_config(4, 1) };
    assert!(matches!(
        FrameDriver::new(RecordingBackend::new(), &config),
        Err(SimError::InvalidConfig(_))
    ));
}

#[test]
fn spawned_particles_are_simulated_by_the_cpu_backend() {
    let config = SimConfig { gravity: Vec2::new(0.0, 600.0), ..common::quiet_config(8, 4) };
    let mut driver = common::cpu_driver(&config);
    driver.spawn(Vec2::new(0.0, -50.0), common::WHITE, 3.0).unwrap();

    for _ in 0..10 {
        driver.advance(1.0 / 60.0, None).unwrap();
    }
    let particles = driver.backend().current().particles();
    assert!(particles[0].position.y > -50.0);
    assert_eq!(particles[0].position.x, 0.0);
    assert!(particles[1..].iter().all(|p| !p.is_alive()));
}

#[test]
fn the_returned_slot_holds_the_latest_result() {
    let config = SimConfig { gravity: Vec2::new(0.0, 600.0), ..common::quiet_config(2, 3) };
    let mut driver = common::cpu_driver(&config);
    driver.spawn(Vec2::ZERO, common::WHITE, 3.0).unwrap();

    let slot = driver.advance(1.0 / 60.0, None).unwrap();
    let backend = driver.backend();
    assert_eq!(backend.buffer(slot), backend.current());
    assert_ne!(backend.buffer(slot ^ 1).particles()[0].position, backend.current().particles()[0].position);
}

#[test]
fn seeding_stays_inside_the_boundary() {
    let config = SimConfig {
        boundary: Boundary::Circle { center: Vec2::new(10.0, 0.0), radius: 60.0 },
        ..common::quiet_config(64, 1)
    };
    let mut driver = common::cpu_driver(&config);
    let placed = driver.seed(&mut StdRng::seed_from_u64(11), 50, 3.0);

    assert_eq!(placed, 50);
    assert_eq!(driver.live_count(), 50);
    for particle in driver.backend().current().particles().iter().filter(|p| p.is_alive()) {
        assert!(particle.position.distance(Vec2::new(10.0, 0.0)) <= 57.0 + 1e-4);
        assert_eq!(particle.radius, 3.0);
    }
}

#[test]
fn seeding_stops_at_capacity() {
    let mut driver = common::cpu_driver(&common::quiet_config(10, 1));
    assert_eq!(driver.seed(&mut StdRng::seed_from_u64(5), 20, 2.0), 10);
    assert_eq!(driver.live_count(), driver.capacity());
}
