//! Реки и озёра
//!
//! Истоки выбираются случайно с весом по влажности и высоте, река течёт вниз
//! (или по ровному) до воды, сливается с уже существующей рекой или упирается
//! в низину и образует озеро.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::climate::ClimateData;
use crate::config::RiverSettings;
use crate::coordinates::HexDirection;
use crate::grid::HexGrid;

/// Дополнительный вес направления вниз по склону
const DOWNHILL_WEIGHT: usize = 3;
/// Дополнительный вес плавного поворота (не круче 60°)
const GENTLE_TURN_WEIGHT: usize = 1;
/// Базовый вес любого допустимого направления
const BASE_WEIGHT: usize = 1;

/// Прокладывает реки, пока не израсходован бюджет (процент от клеток суши).
///
/// Возвращает недорасходованный остаток бюджета.
pub fn create_rivers(
    grid: &mut HexGrid,
    climate: &[ClimateData],
    land_cells: usize,
    settings: &RiverSettings,
    water_level: i32,
    elevation_maximum: i32,
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut origins = Vec::new();
    for (i, cell) in grid.cells().iter().enumerate() {
        if cell.is_underwater() {
            continue;
        }
        let weight = climate[i].moisture * (cell.elevation() - water_level) as f32
            / (elevation_maximum - water_level) as f32;
        if weight > 0.75 {
            origins.push(i);
            origins.push(i);
        }
        if weight > 0.5 {
            origins.push(i);
        }
        if weight > 0.25 {
            origins.push(i);
        }
    }

    let budget = (land_cells as f32 * settings.river_percentage as f32 * 0.01).round() as usize;
    let mut remaining = budget;
    while remaining > 0 && !origins.is_empty() {
        let origin = origins.swap_remove(rng.gen_range(0..origins.len()));
        if grid.cells()[origin].has_river() {
            continue;
        }
        let is_valid_origin = grid.neighbors(origin).all(|(_, n)| {
            let neighbor = &grid.cells()[n];
            !neighbor.has_river() && !neighbor.is_underwater()
        });
        if is_valid_origin {
            let length = create_river(grid, origin, settings.extra_lake_probability, rng);
            remaining = remaining.saturating_sub(length);
        }
    }

    if remaining > 0 {
        log::warn!("Бюджет рек израсходован не полностью: осталось {remaining} из {budget}");
    }
    remaining
}

/// Ведёт реку из `origin` и возвращает её длину в клетках (0, если течь некуда)
pub fn create_river(
    grid: &mut HexGrid,
    origin: usize,
    extra_lake_probability: f32,
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut length = 1;
    let mut cell = origin;
    let mut direction = HexDirection::NE;
    let mut flow_directions = Vec::with_capacity(6 * (DOWNHILL_WEIGHT + GENTLE_TURN_WEIGHT + BASE_WEIGHT));

    while !grid.cells()[cell].is_underwater() {
        let elevation = grid.cells()[cell].elevation();
        let mut min_neighbor_elevation = i32::MAX;
        flow_directions.clear();

        for d in HexDirection::ALL {
            let Some(neighbor) = grid.neighbor(cell, d) else {
                continue;
            };
            let neighbor_cell = &grid.cells()[neighbor];
            min_neighbor_elevation = min_neighbor_elevation.min(neighbor_cell.elevation());
            if neighbor == origin || neighbor_cell.has_incoming_river() {
                continue;
            }

            let delta = neighbor_cell.elevation() - elevation;
            if delta > 0 {
                continue;
            }
            if neighbor_cell.has_outgoing_river() {
                // слияние с другой рекой
                grid.set_outgoing_river(cell, d);
                return length;
            }

            if delta < 0 {
                flow_directions.extend(std::iter::repeat_n(d, DOWNHILL_WEIGHT));
            }
            if length == 1 || (d != direction.next2() && d != direction.previous2()) {
                flow_directions.extend(std::iter::repeat_n(d, GENTLE_TURN_WEIGHT));
            }
            flow_directions.extend(std::iter::repeat_n(d, BASE_WEIGHT));
        }

        if flow_directions.is_empty() {
            if length == 1 {
                return 0;
            }
            // тупик: вода собирается в озеро
            if min_neighbor_elevation >= elevation {
                grid.set_water_level(cell, min_neighbor_elevation);
                if min_neighbor_elevation == elevation {
                    grid.set_elevation(cell, min_neighbor_elevation - 1);
                }
            }
            break;
        }

        direction = flow_directions[rng.gen_range(0..flow_directions.len())];
        grid.set_outgoing_river(cell, direction);
        length += 1;

        if min_neighbor_elevation >= elevation && rng.r#gen::<f32>() < extra_lake_probability {
            grid.set_water_level(cell, elevation);
            grid.set_elevation(cell, elevation - 1);
        }

        let Some(next) = grid.neighbor(cell, direction) else {
            break;
        };
        cell = next;
    }
    length
}
