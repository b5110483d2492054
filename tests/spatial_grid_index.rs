use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use verlet_bins::simulation::error::SimError;
use verlet_bins::simulation::particle::Particle;
use verlet_bins::simulation::particle_store::ParticleStore;
use verlet_bins::simulation::spatial_grid_index::{SpatialGridIndex, UNUSED_BIN};

mod common;

fn random_store(count: usize, capacity: usize, seed: u64) -> ParticleStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let positions: Vec<(Vec2, f32)> = (0..count)
        .map(|_| (Vec2::new(rng.random_range(-120.0..120.0), rng.random_range(-120.0..120.0)), 2.0))
        .collect();
    common::store_of(&positions, capacity)
}

#[test]
fn every_live_particle_is_binned_exactly_once() {
    let store = random_store(300, 400, 1);
    let mut index = SpatialGridIndex::new(400, common::small_grid());
    index.build(&store).unwrap();

    assert_eq!(index.live_count(), 300);
    let mut reindexed = index.reindexed();
    reindexed.sort_unstable();
    assert_eq!(reindexed, (0..300).collect::<Vec<u32>>());
}

#[test]
fn particles_sit_in_the_range_of_their_own_cell() {
    let grid = common::small_grid();
    let store = random_store(250, 250, 2);
    let mut index = SpatialGridIndex::new(250, grid);
    index.build(&store).unwrap();

    // Positions span -120..120 on a grid covering -100..100, so some fall
    // outside and must land in the border cell on their side.
    let grid_min = grid.origin();
    let grid_max = grid.origin() + Vec2::new(grid.width() as f32, grid.height() as f32) * grid.cell_size();
    for cell in 0..grid.cell_count() as u32 {
        let (min, max) = grid.cell_bounds(cell);
        for particle in index.particles_in_bin(cell) {
            assert_eq!(index.bin_of(particle), cell);
            let position = store.particles()[particle].position;
            for axis in 0..2 {
                if position[axis] < grid_min[axis] {
                    assert_eq!(min[axis], grid_min[axis]);
                } else if position[axis] >= grid_max[axis] {
                    assert_eq!(max[axis], grid_max[axis]);
                } else {
                    assert!(min[axis] - 1e-4 <= position[axis] && position[axis] < max[axis] + 1e-4);
                }
            }
        }
    }
}

#[test]
fn prefix_sum_is_exclusive_over_counts() {
    let store = random_store(120, 128, 3);
    let mut index = SpatialGridIndex::new(128, common::small_grid());
    index.build(&store).unwrap();

    let counts = index.counts();
    let prefix_sum = index.prefix_sum();
    assert_eq!(prefix_sum.len(), counts.len() + 1);
    assert_eq!(prefix_sum[0], 0);
    for cell in 0..counts.len() {
        assert_eq!(prefix_sum[cell + 1] - prefix_sum[cell], counts[cell]);
    }
    assert_eq!(counts.iter().sum::<u32>(), 120);
}

#[test]
fn free_slots_are_never_binned() {
    let mut store = common::store_of(&[(Vec2::new(1.0, 1.0), 2.0), (Vec2::new(3.0, 3.0), 2.0)], 5);
    store.set(0, Particle::free());
    let mut index = SpatialGridIndex::new(5, common::small_grid());
    index.build(&store).unwrap();

    assert_eq!(index.live_count(), 1);
    assert_eq!(index.bin_of(0), UNUSED_BIN);
    assert_eq!(index.bin_of(4), UNUSED_BIN);
    assert_eq!(index.reindexed(), vec![1]);
}

#[test]
fn positions_outside_the_grid_are_clamped_to_the_border() {
    let store = common::store_of(
        &[
            (Vec2::new(-1000.0, -1000.0), 1.0),
            (Vec2::new(1000.0, 0.0), 1.0),
            (Vec2::new(f32::NAN, f32::NAN), 1.0),
        ],
        3,
    );
    let mut index = SpatialGridIndex::new(3, common::small_grid());
    index.build(&store).unwrap();

    assert_eq!(index.bin_of(0), 0);
    assert_eq!(index.bin_of(1), 5 * 10 + 9);
    assert_eq!(index.bin_of(2), 0);
    assert_eq!(index.live_count(), 3);
}

#[test]
fn rebuild_replaces_the_previous_index() {
    let mut store = common::store_of(&[(Vec2::new(-95.0, -95.0), 2.0)], 1);
    let mut index = SpatialGridIndex::new(1, common::small_grid());
    index.build(&store).unwrap();
    assert_eq!(index.count(0), 1);

    store.particles_mut()[0].position = Vec2::new(95.0, 95.0);
    index.build(&store).unwrap();
    assert_eq!(index.count(0), 0);
    assert_eq!(index.count(99), 1);
    assert_eq!(index.bin_range(99), 0..1);
}

#[test]
fn a_store_larger_than_the_index_is_rejected() {
    let store = ParticleStore::with_capacity(9);
    let mut index = SpatialGridIndex::new(8, common::small_grid());
    assert_eq!(
        index.build(&store),
        Err(SimError::CapacityExceeded { particles: 9, capacity: 8 })
    );
}
