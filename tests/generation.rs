use hexmap::{
    GridSettings, GroundUnit, HexDirection, HexGrid, MapSnapshot, WorldGenerationParams,
    generate_world,
};

fn scenario_params() -> WorldGenerationParams {
    let mut params = WorldGenerationParams {
        seed: Some(42),
        width: 6,
        height: 6,
        wrapping: false,
        grid: GridSettings {
            chunk_size_x: 3,
            chunk_size_z: 3,
            ..GridSettings::default()
        },
        ..WorldGenerationParams::default()
    };
    params.terrain.land_percentage = 50;
    params.terrain.water_level = 1;
    params
}

fn elevations(grid: &HexGrid) -> Vec<i32> {
    grid.cells().iter().map(|c| c.elevation()).collect()
}

fn river_cells(grid: &HexGrid) -> Vec<usize> {
    grid.cells()
        .iter()
        .filter(|c| c.has_river())
        .map(|c| c.index())
        .collect()
}

fn assert_rivers_consistent(grid: &HexGrid) {
    for (i, cell) in grid.cells().iter().enumerate() {
        if let Some(d) = cell.outgoing_river() {
            let n = grid.neighbor(i, d).expect("river leaves the map");
            assert_eq!(grid.cells()[n].incoming_river(), Some(d.opposite()));
            assert!(grid.is_valid_river_destination(i, n));
            assert!(!cell.has_road_through_edge(d));
        }
        if let Some(d) = cell.incoming_river() {
            let n = grid.neighbor(i, d).expect("river enters from outside the map");
            assert_eq!(grid.cells()[n].outgoing_river(), Some(d.opposite()));
        }
    }
}

#[test]
fn small_scenario_is_deterministic() {
    let params = scenario_params();
    let first = generate_world(&params).unwrap();
    let second = generate_world(&params).unwrap();

    assert_eq!(elevations(&first.grid), elevations(&second.grid));
    assert_eq!(river_cells(&first.grid), river_cells(&second.grid));
    assert_eq!(first.report, second.report);
    assert_eq!(first.report.land_cells + first.report.land_shortfall, 18);
}

#[test]
fn larger_maps_are_deterministic_per_seed() {
    for wrapping in [false, true] {
        let params = WorldGenerationParams {
            seed: Some(7),
            width: 40,
            height: 30,
            wrapping,
            ..WorldGenerationParams::default()
        };
        let a = generate_world(&params).unwrap();
        let b = generate_world(&params).unwrap();
        assert_eq!(a.grid.snapshot(), b.grid.snapshot());

        let other = generate_world(&WorldGenerationParams {
            seed: Some(8),
            ..params
        })
        .unwrap();
        assert_ne!(elevations(&a.grid), elevations(&other.grid));
    }
}

#[test]
fn generated_rivers_are_consistent() {
    for seed in 0..6 {
        let mut params = WorldGenerationParams {
            seed: Some(seed),
            width: 40,
            height: 30,
            ..WorldGenerationParams::default()
        };
        params.terrain.region_count = (seed % 4 + 1) as u32;
        params.rivers.river_percentage = 20;
        let world = generate_world(&params).unwrap();
        assert_rivers_consistent(&world.grid);
    }
}

#[test]
fn land_budget_is_never_negative_and_reported() {
    let mut params = WorldGenerationParams {
        seed: Some(99),
        width: 20,
        height: 15,
        ..WorldGenerationParams::default()
    };
    params.terrain.land_percentage = 95;
    params.terrain.sink_probability = 0.4;
    let world = generate_world(&params).unwrap();
    let report = &world.report;
    // 95% от 300 клеток
    assert_eq!(report.land_cells + report.land_shortfall, 285);
    assert!(report.land_cells <= 285);
}

#[test]
fn land_budget_rounded_to_zero_raises_nothing() {
    let mut params = WorldGenerationParams {
        seed: Some(42),
        width: 3,
        height: 3,
        grid: GridSettings {
            chunk_size_x: 1,
            chunk_size_z: 1,
            ..GridSettings::default()
        },
        ..WorldGenerationParams::default()
    };
    // 9 клеток × 5% = 0.45, округляется до нуля
    params.terrain.land_percentage = 5;
    params.terrain.water_level = 1;
    params.terrain.map_border_x = 0;
    params.terrain.map_border_z = 0;
    params.terrain.erosion_percentage = 0;
    let world = generate_world(&params).unwrap();

    assert_eq!(world.report.land_cells, 0);
    assert_eq!(world.report.land_shortfall, 0);
    assert!(world.grid.cells().iter().all(|c| c.is_underwater()));
}

#[test]
fn elevations_stay_within_terrain_bounds() {
    let params = WorldGenerationParams {
        seed: Some(5),
        width: 40,
        height: 30,
        ..WorldGenerationParams::default()
    };
    let world = generate_world(&params).unwrap();
    let min = params.terrain.elevation_minimum;
    let max = params.terrain.elevation_maximum;
    for cell in world.grid.cells() {
        assert!((min..=max).contains(&cell.elevation()));
        assert!(cell.plant_level() <= 3);
    }
}

#[test]
fn snapshot_restores_generated_world() {
    let params = WorldGenerationParams {
        seed: Some(2024),
        width: 20,
        height: 15,
        ..WorldGenerationParams::default()
    };
    let world = generate_world(&params).unwrap();
    let snapshot = world.grid.snapshot();
    let json = snapshot.to_json().unwrap();

    let restored =
        HexGrid::from_snapshot(&MapSnapshot::from_json(&json).unwrap(), world.grid.settings())
            .unwrap();
    assert_eq!(restored.snapshot(), snapshot);
    assert_rivers_consistent(&restored);
}

#[test]
fn paths_on_generated_world_avoid_water() {
    let params = WorldGenerationParams {
        seed: Some(31),
        width: 40,
        height: 30,
        ..WorldGenerationParams::default()
    };
    let mut grid = generate_world(&params).unwrap().grid;
    for i in 0..grid.cell_count() {
        grid.set_explored(i, true);
    }

    let land: Vec<usize> = grid
        .cells()
        .iter()
        .filter(|c| c.is_explorable() && !c.is_underwater())
        .map(|c| c.index())
        .collect();
    let unit = GroundUnit::default();
    let mut found = 0;
    for &from in land.iter().step_by(13) {
        for &to in land.iter().skip(1).step_by(17) {
            let Some(path) = grid.find_path(from, to, &unit).unwrap() else {
                continue;
            };
            found += 1;
            assert_eq!(path.cells().first(), Some(&from));
            assert_eq!(path.cells().last(), Some(&to));
            for window in path.cells().windows(2) {
                assert!(!grid.cells()[window[1]].is_underwater());
                assert!(
                    HexDirection::ALL
                        .into_iter()
                        .any(|d| grid.neighbor(window[0], d) == Some(window[1]))
                );
            }
            assert!(path.distances().windows(2).all(|w| w[0] < w[1]));
        }
    }
    assert!(found > 0);
}
