mod util;

use num_complex::Complex;
use parallel_grid::prelude::*;
use util::{CountingComm, assert_halo_consistent, run_ranks, stamp_owned};

fn share_and_check(config: GridConfig, ranks: usize) {
    let active = run_ranks(ranks, |comm: ThreadComm| {
        let mut pg = ParallelGrid::<f64, _>::new(config.clone(), comm).unwrap();
        if !pg.is_active() {
            pg.share().unwrap();
            return false;
        }
        stamp_owned(&mut pg);
        pg.share().unwrap();
        assert_halo_consistent(&pg);
        true
    });
    assert!(active.iter().any(|a| *a));
}

#[test]
fn two_ranks_one_dimension() {
    let config = GridConfig::new(Coord::new1(10), Coord::new1(1), AxisSet::X)
        .with_mesh(Coord::new1(2))
        .with_time_levels(TimeLevels::One);
    let halos = run_ranks(2, |comm| {
        let mut pg = ParallelGrid::<f64, _>::new(config.clone(), comm).unwrap();
        let d = *pg.decomposition().unwrap();
        for x in 0..5 {
            let global = d.origin.x() + x;
            let v = FieldPointValue::from_levels(&[global as f64 * 10.0]).unwrap();
            pg.set(&Coord::new1(x + 1), v).unwrap();
        }
        pg.share().unwrap();
        let left = pg.get(&Coord::new1(0)).unwrap().current();
        let right = pg.get(&Coord::new1(6)).unwrap().current();
        (d.origin.x(), d.owned.x(), left, right)
    });
    // rank 0 owns [0, 5), its right halo mirrors global cell 5
    assert_eq!(halos[0], (0, 5, 0.0, 50.0));
    // rank 1 owns [5, 10), its left halo mirrors global cell 4
    assert_eq!(halos[1], (5, 5, 40.0, 0.0));
}

#[test]
fn one_dimension_uneven_split_three_levels() {
    let config = GridConfig::new(Coord::new1(11), Coord::new1(2), AxisSet::X).with_mesh(Coord::new1(3));
    share_and_check(config, 3);
}

#[test]
fn two_dimensions_3x2_with_corners() {
    let config = GridConfig::new(Coord::new2(13, 9), Coord::new2(1, 2), AxisSet::XY)
        .with_mesh(Coord::new2(3, 2))
        .with_time_levels(TimeLevels::Two);
    share_and_check(config, 6);
}

#[test]
fn two_dimensions_split_along_y_only() {
    let config = GridConfig::new(Coord::new2(5, 12), Coord::new2(1, 1), AxisSet::Y).with_mesh(Coord::new2(1, 3));
    share_and_check(config, 3);
}

#[test]
fn three_dimensions_2x2x2() {
    let config = GridConfig::new(Coord::new3(8, 7, 6), Coord::new3(1, 1, 1), AxisSet::XYZ)
        .with_mesh(Coord::new3(2, 2, 2));
    share_and_check(config, 8);
}

#[test]
fn three_dimensions_xz_plane() {
    let config = GridConfig::new(Coord::new3(9, 4, 8), Coord::new3(2, 1, 1), AxisSet::XZ)
        .with_mesh(Coord::new3(2, 1, 3))
        .with_time_levels(TimeLevels::Two);
    share_and_check(config, 6);
}

#[test]
fn automatic_mesh_leaves_spare_ranks_inactive() {
    // 6 cells with halo 2 fit at most 3 ranks along X.
    let config = GridConfig::new(Coord::new1(6), Coord::new1(2), AxisSet::X);
    let active = run_ranks(5, |comm| {
        let mut pg = ParallelGrid::<f64, _>::new(config.clone(), comm).unwrap();
        if pg.is_active() {
            stamp_owned(&mut pg);
        }
        pg.share().unwrap();
        if pg.is_active() {
            assert_halo_consistent(&pg);
        } else {
            assert!(matches!(pg.grid(), Err(GridError::InactiveRank { rank, volume: 3 }) if rank >= 3));
        }
        pg.is_active()
    });
    assert_eq!(active, vec![true, true, true, false, false]);
}

#[test]
fn repeated_rounds_track_time_shifts() {
    let config = GridConfig::new(Coord::new1(8), Coord::new1(1), AxisSet::X)
        .with_mesh(Coord::new1(2))
        .with_time_levels(TimeLevels::Two);
    let seen = run_ranks(2, |comm| {
        let mut pg = ParallelGrid::<f64, _>::new(config.clone(), comm).unwrap();
        let me = pg.comm().rank();
        let edge = if me == 0 { Coord::new1(4) } else { Coord::new1(1) };
        let halo = if me == 0 { Coord::new1(5) } else { Coord::new1(0) };
        let mut seen = Vec::new();
        for step in 0..3 {
            pg.shift_in_time().unwrap();
            let v = (10 * me + step) as f64;
            pg.grid_mut().unwrap().get_mut(&edge).unwrap().set_current(v);
            pg.share().unwrap();
            let cell = pg.get(&halo).unwrap();
            seen.push((cell.current(), cell.previous().unwrap()));
        }
        assert_eq!(pg.time_step(), 3);
        seen
    });
    // Previous level of the halo is whatever the neighbour's cell held one
    // step earlier (zero before the first shift).
    assert_eq!(seen[0], vec![(10.0, 0.0), (11.0, 10.0), (12.0, 11.0)]);
    assert_eq!(seen[1], vec![(0.0, 0.0), (1.0, 0.0), (2.0, 1.0)]);
}

#[test]
fn complex_samples_cross_the_wire() {
    let config = GridConfig::new(Coord::new2(4, 6), Coord::new2(1, 1), AxisSet::Y)
        .with_mesh(Coord::new2(1, 2))
        .with_time_levels(TimeLevels::One);
    let got = run_ranks(2, |comm| {
        let mut pg = ParallelGrid::<Complex<f32>, _>::new(config.clone(), comm).unwrap();
        let me = pg.comm().rank() as f32;
        for x in 1..5 {
            for y in 1..4 {
                let v = FieldPointValue::from_levels(&[Complex::new(me, x as f32)]).unwrap();
                pg.set(&Coord::new2(x, y), v).unwrap();
            }
        }
        pg.share().unwrap();
        let probe = if me == 0.0 { Coord::new2(2, 4) } else { Coord::new2(2, 0) };
        pg.get(&probe).unwrap().current()
    });
    assert_eq!(got[0], Complex::new(1.0, 2.0));
    assert_eq!(got[1], Complex::new(0.0, 2.0));
}

#[test]
fn single_rank_makes_no_transport_calls() {
    let config = GridConfig::new(Coord::new3(6, 6, 6), Coord::new3(1, 1, 1), AxisSet::XYZ);
    let mut pg = ParallelGrid::<f64, _>::new(config, CountingComm::new(NoComm)).unwrap();
    stamp_owned(&mut pg);
    pg.share().unwrap();
    pg.share().unwrap();
    assert_eq!(pg.comm().transport_calls(), 0);
    assert_eq!(pg.comm().barriers.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_halo_consistent(&pg);
}

#[test]
fn interior_rank_uses_combined_transfers() {
    let config = GridConfig::new(Coord::new1(9), Coord::new1(1), AxisSet::X).with_mesh(Coord::new1(3));
    let counts = run_ranks(3, |comm| {
        let mut pg = ParallelGrid::<f64, _>::new(config.clone(), CountingComm::new(comm)).unwrap();
        pg.share().unwrap();
        let c = pg.comm();
        use std::sync::atomic::Ordering::SeqCst;
        (c.sends.load(SeqCst), c.recvs.load(SeqCst), c.send_recvs.load(SeqCst))
    });
    // Left: ranks 1 and 2 send, ranks 0 and 1 receive; Right mirrors it.
    assert_eq!(counts[0], (1, 1, 0));
    assert_eq!(counts[1], (0, 0, 2));
    assert_eq!(counts[2], (1, 1, 0));
}

#[test]
fn config_from_json_drives_a_run() {
    let json = r#"{
        "global_size": [12, 10],
        "halo_left": [1, 1],
        "halo_right": [1, 1],
        "axes": "XY",
        "mesh": {"explicit": [2, 2]},
        "time_levels": 2
    }"#;
    let config: GridConfig = serde_json::from_str(json).unwrap();
    share_and_check(config, 4);
}

#[test]
fn asymmetric_halo_is_rejected() {
    let mut config = GridConfig::new(Coord::new1(10), Coord::new1(1), AxisSet::X);
    config.halo_right = Coord::new1(2);
    let err = ParallelGrid::<f64, _>::new(config, NoComm).unwrap_err();
    assert!(matches!(err, GridError::HaloMismatch { .. }));
}

#[test]
fn comm_rank_is_the_mesh_id() {
    let world = ThreadComm::world(1);
    let config = GridConfig::default();
    let pg = ParallelGrid::<f64, _>::new(config, world[0].clone()).unwrap();
    assert_eq!(pg.plan().unwrap().id(), pg.comm().rank());
}
