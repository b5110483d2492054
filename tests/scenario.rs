use glam::Vec2;
use verlet_bins::simulation::frame_driver::SimulationBackend;
use verlet_bins::simulation::particle::Particle;
use verlet_bins::simulation::spatial_grid_index::SpatialGridIndex;

mod common;

// Cells of 20 on a 10x10 grid, two overlapping particles near the centre
// and one far outside the grid.
const POSITIONS: [(Vec2, f32); 3] = [
    (Vec2::new(5.0, 5.0), 3.0),
    (Vec2::new(6.0, 6.0), 3.0),
    (Vec2::new(500.0, 500.0), 3.0),
];

#[test]
fn overlapping_pair_shares_a_cell_and_the_outlier_is_clamped() {
    let grid = common::small_grid();
    let store = common::store_of(&POSITIONS, 3);
    let mut index = SpatialGridIndex::new(3, grid);
    index.build(&store).unwrap();

    let shared = index.bin_of(0);
    assert_eq!(shared, 55);
    assert_eq!(index.bin_of(1), shared);
    let mut in_shared: Vec<usize> = index.particles_in_bin(shared).collect();
    in_shared.sort_unstable();
    assert_eq!(in_shared, vec![0, 1]);

    // Clamped into the far corner cell.
    assert_eq!(index.bin_of(2), grid.cell_of(Vec2::new(100.0, 100.0)));
    assert_eq!(index.bin_of(2), 99);
    assert_eq!(index.particles_in_bin(99).collect::<Vec<_>>(), vec![2]);
}

#[test]
fn one_sub_step_separates_the_overlapping_pair() {
    let config = common::quiet_config(3, 1);
    let mut driver = common::cpu_driver(&config);
    for &(position, radius) in &POSITIONS {
        driver.spawn(position, common::WHITE, radius).unwrap();
    }

    driver.advance(1.0 / 60.0, None).unwrap();

    let backend = driver.backend();
    assert_eq!(backend.grid(), &common::small_grid());
    assert_eq!(backend.index().bin_of(0), backend.index().bin_of(1));

    let particles: &[Particle] = backend.current().particles();
    assert!(particles[0].position.distance(particles[1].position) >= 6.0);
    assert_eq!(particles[2].position, Vec2::new(500.0, 500.0));
}
