// src/generator.rs
//! Генерация мира целиком
//!
//! Этапы идут строго по порядку и используют один генератор случайных чисел,
//! поэтому одинаковые параметры и сид всегда дают одинаковую карту:
//! 1. Регионы зарождения суши
//! 2. Подъём и опускание суши до нужной доли
//! 3. Эрозия обрывов
//! 4. Климат (облака и влажность)
//! 5. Реки и озёра
//! 6. Температура, тип поверхности и растительность

use petgraph::unionfind::UnionFind;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::biome::set_terrain_type;
use crate::climate::create_climate;
use crate::config::{GridSettings, WorldGenerationParams};
use crate::error::HexMapError;
use crate::grid::HexGrid;
use crate::heightmap::{create_land, erode_land};
use crate::region::create_regions;
use crate::rivers::create_rivers;

/// Итоги генерации: что получилось и чего не хватило
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Сид, с которым на самом деле шла генерация
    pub seed: u64,
    /// Клеток суши после подъёма (до эрозии и озёр)
    pub land_cells: usize,
    /// Сколько клеток суши не удалось поднять
    pub land_shortfall: usize,
    /// Недорасходованный бюджет рек
    pub river_shortfall: usize,
    /// Клеток, через которые течёт река
    pub river_cells: usize,
    /// Число отдельных участков суши
    pub landmasses: usize,
}

#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    pub grid: HexGrid,
    pub report: GenerationReport,
}

/// Генерирует мир по параметрам.
///
/// Параметры проверяются до создания сетки; при ошибке ничего не генерируется.
pub fn generate_world(params: &WorldGenerationParams) -> Result<GeneratedWorld, HexMapError> {
    params.validate()?;
    let terrain = &params.terrain;

    let grid_settings = GridSettings {
        elevation_minimum: terrain.elevation_minimum,
        elevation_maximum: terrain.elevation_maximum,
        ..params.grid.clone()
    };
    let mut grid =
        HexGrid::with_settings(params.width, params.height, params.wrapping, &grid_settings)?;

    let seed = params.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    log::info!(
        "Генерация мира {}×{} (сид {seed}, перенос: {})",
        params.width,
        params.height,
        params.wrapping
    );

    for i in 0..grid.cell_count() {
        grid.set_water_level(i, terrain.water_level);
    }

    let regions = create_regions(
        params.width as i32,
        params.height as i32,
        params.wrapping,
        terrain,
        &mut rng,
    );
    log::debug!("Регионы: {regions:?}");

    let land = create_land(&mut grid, &regions, terrain, &mut rng);
    log::debug!("Суша: {} клеток", land.land_cells);

    erode_land(&mut grid, terrain.erosion_percentage, &mut rng);

    let climate = create_climate(&grid, &params.climate, terrain.elevation_maximum);
    log::debug!("Климат рассчитан");

    let river_shortfall = create_rivers(
        &mut grid,
        &climate,
        land.land_cells,
        &params.rivers,
        terrain.water_level,
        terrain.elevation_maximum,
        &mut rng,
    );

    set_terrain_type(
        &mut grid,
        &climate,
        &params.temperature,
        terrain.water_level,
        terrain.elevation_maximum,
        &mut rng,
    );

    grid.reset_search_phases();
    grid.take_dirty_cells();

    let report = GenerationReport {
        seed,
        land_cells: land.land_cells,
        land_shortfall: land.shortfall,
        river_shortfall,
        river_cells: grid.cells().iter().filter(|c| c.has_river()).count(),
        landmasses: count_landmasses(&grid),
    };
    log::info!(
        "Готово: {} клеток суши, {} участков, {} клеток с реками",
        report.land_cells,
        report.landmasses,
        report.river_cells
    );
    Ok(GeneratedWorld { grid, report })
}

/// Число связных участков суши (соседние незатопленные клетки)
#[must_use]
pub fn count_landmasses(grid: &HexGrid) -> usize {
    let cells = grid.cells();
    let mut sets = UnionFind::<usize>::new(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        if cell.is_underwater() {
            continue;
        }
        for (_, n) in grid.neighbors(i) {
            if !cells[n].is_underwater() {
                sets.union(i, n);
            }
        }
    }

    let mut roots: Vec<usize> = (0..cells.len())
        .filter(|&i| !cells[i].is_underwater())
        .map(|i| sets.find(i))
        .collect();
    roots.sort_unstable();
    roots.dedup();
    roots.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::small_grid;

    fn small_params(seed: u64) -> WorldGenerationParams {
        let mut params = WorldGenerationParams {
            seed: Some(seed),
            width: 20,
            height: 15,
            ..WorldGenerationParams::default()
        };
        params.terrain.map_border_x = 2;
        params.terrain.map_border_z = 2;
        params
    }

    #[test]
    fn test_generation_resets_search_state() {
        let world = generate_world(&small_params(3)).unwrap();
        assert!(world.grid.cells().iter().all(|c| c.search_phase == 0));
        assert_eq!(world.grid.search_frontier_phase, 0);
        let mut grid = world.grid;
        assert!(grid.take_dirty_cells().is_empty());
    }

    #[test]
    fn test_report_matches_grid() {
        let world = generate_world(&small_params(12)).unwrap();
        let report = &world.report;
        assert_eq!(report.seed, 12);
        assert_eq!(report.land_cells + report.land_shortfall, 150);
        assert_eq!(
            report.river_cells,
            world.grid.cells().iter().filter(|c| c.has_river()).count()
        );
        assert!(report.landmasses >= 1);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let mut params = small_params(1);
        params.terrain.region_count = 7;
        assert!(matches!(
            generate_world(&params),
            Err(HexMapError::InvalidParameter { .. })
        ));

        let mut params = small_params(1);
        params.width = 21;
        assert!(matches!(
            generate_world(&params),
            Err(HexMapError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_random_seed_is_reported() {
        let mut params = small_params(0);
        params.seed = None;
        let world = generate_world(&params).unwrap();

        params.seed = Some(world.report.seed);
        let again = generate_world(&params).unwrap();
        assert_eq!(world.report, again.report);
    }

    #[test]
    fn test_count_landmasses() {
        let mut grid = small_grid(7, 1, false);
        for i in 0..7 {
            grid.set_water_level(i, 1);
        }
        assert_eq!(count_landmasses(&grid), 0);

        for i in [0, 1, 3, 5, 6] {
            grid.set_elevation(i, 2);
        }
        assert_eq!(count_landmasses(&grid), 3);
    }
}
