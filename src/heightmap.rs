// src/heightmap.rs
//! Рельеф: подъём и опускание участков суши с бюджетом, затем эрозия обрывов
//!
//! Участок растёт от случайной клетки региона волной по очереди с приоритетами:
//! приоритет равен расстоянию до центра, а случайная добавка к эвристике делает
//! берега неровными.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::TerrainSettings;
use crate::grid::HexGrid;
use crate::region::MapRegion;

/// Защита от бесконечного цикла, если бюджет суши недостижим
const LAND_GUARD_ITERATIONS: usize = 10_000;

/// Итог создания суши
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandBudget {
    /// Сколько клеток суши получилось
    pub land_cells: usize,
    /// Сколько клеток суши не удалось поднять
    pub shortfall: usize,
}

/// Поднимает и опускает участки, пока над водой не окажется заданная доля клеток.
///
/// Предполагается, что все клетки стоят на высоте 0 с уровнем воды `settings.water_level`.
pub fn create_land(
    grid: &mut HexGrid,
    regions: &[MapRegion],
    settings: &TerrainSettings,
    rng: &mut ChaCha8Rng,
) -> LandBudget {
    let target = (grid.cell_count() as f32 * settings.land_percentage as f32 * 0.01).round() as i32;
    let mut budget = target;

    'guard: for _ in 0..LAND_GUARD_ITERATIONS {
        if budget <= 0 {
            break;
        }
        let sink = rng.r#gen::<f32>() < settings.sink_probability;
        for region in regions {
            let chunk_size = random_chunk_size(settings, rng);
            if sink {
                budget = sink_terrain(grid, chunk_size, budget, region, settings, rng);
            } else {
                budget = raise_terrain(grid, chunk_size, budget, region, settings, rng);
                if budget <= 0 {
                    break 'guard;
                }
            }
        }
    }

    let shortfall = budget.max(0) as usize;
    if shortfall > 0 {
        log::warn!(
            "Не удалось поднять всю сушу: не хватило {shortfall} из {target} клеток"
        );
    }
    LandBudget {
        land_cells: (target - budget).max(0) as usize,
        shortfall,
    }
}

/// Размер участка из `[chunk_size_min, chunk_size_max - 2]`; если этот
/// промежуток пуст, берётся `chunk_size_min`
fn random_chunk_size(settings: &TerrainSettings, rng: &mut ChaCha8Rng) -> usize {
    let min = settings.chunk_size_min;
    let max = settings.chunk_size_max.saturating_sub(1).max(min + 1);
    rng.gen_range(min..max) as usize
}

fn random_cell(grid: &HexGrid, region: &MapRegion, rng: &mut ChaCha8Rng) -> usize {
    let x = rng.gen_range(region.x_min..region.x_max);
    let z = rng.gen_range(region.z_min..region.z_max);
    let index = grid.offset_index(x, z);
    debug_assert!(index.is_some(), "регион {region:?} выходит за пределы сетки");
    // регионы нормализованы по размерам сетки, x переносится на замкнутой карте
    index.unwrap_or_else(|| {
        let width = grid.cell_count_x() as i32;
        let height = grid.cell_count_z() as i32;
        (z.clamp(0, height - 1) * width + x.clamp(0, width - 1)) as usize
    })
}

/// Кладёт в очередь затравочную клетку участка и возвращает её индекс
fn seed_chunk(grid: &mut HexGrid, region: &MapRegion, rng: &mut ChaCha8Rng) -> (usize, u32) {
    let phase = grid.advance_search_phase(1);
    let first = random_cell(grid, region, rng);
    let cell = &mut grid.cells[first];
    cell.search_phase = phase;
    cell.distance = 0;
    cell.search_heuristic = 0;
    grid.search_frontier.enqueue(&mut grid.cells, first);
    (first, phase)
}

/// Ставит в очередь ещё не затронутых соседей клетки участка
fn spread_chunk(
    grid: &mut HexGrid,
    current: usize,
    center: usize,
    phase: u32,
    jitter_probability: f32,
    rng: &mut ChaCha8Rng,
) {
    for direction in crate::coordinates::HexDirection::ALL {
        let Some(neighbor) = grid.neighbor(current, direction) else {
            continue;
        };
        if grid.cells[neighbor].search_phase >= phase {
            continue;
        }
        let distance = grid.distance(center, neighbor);
        let heuristic = i32::from(rng.r#gen::<f32>() < jitter_probability);
        let cell = &mut grid.cells[neighbor];
        cell.search_phase = phase;
        cell.distance = distance;
        cell.search_heuristic = heuristic;
        grid.search_frontier.enqueue(&mut grid.cells, neighbor);
    }
}

/// Поднимает участок до `chunk_size` клеток; возвращает остаток бюджета суши
pub fn raise_terrain(
    grid: &mut HexGrid,
    chunk_size: usize,
    mut budget: i32,
    region: &MapRegion,
    settings: &TerrainSettings,
    rng: &mut ChaCha8Rng,
) -> i32 {
    if budget <= 0 {
        return budget;
    }
    let (center, phase) = seed_chunk(grid, region, rng);
    let rise = if rng.r#gen::<f32>() < settings.high_rise_probability {
        2
    } else {
        1
    };
    let water_level = settings.water_level;

    let mut size = 0;
    while size < chunk_size {
        let Some(current) = grid.search_frontier.dequeue(&grid.cells) else {
            break;
        };
        let original = grid.cells[current].elevation();
        let elevation = original + rise;
        if elevation > settings.elevation_maximum {
            continue;
        }
        grid.set_elevation(current, elevation);
        if original < water_level && elevation >= water_level {
            budget -= 1;
            if budget <= 0 {
                break;
            }
        }
        size += 1;
        spread_chunk(grid, current, center, phase, settings.jitter_probability, rng);
    }
    grid.search_frontier.clear();
    budget
}

/// Опускает участок; каждая ушедшая под воду клетка возвращается в бюджет
pub fn sink_terrain(
    grid: &mut HexGrid,
    chunk_size: usize,
    mut budget: i32,
    region: &MapRegion,
    settings: &TerrainSettings,
    rng: &mut ChaCha8Rng,
) -> i32 {
    let (center, phase) = seed_chunk(grid, region, rng);
    let sink = if rng.r#gen::<f32>() < settings.high_rise_probability {
        2
    } else {
        1
    };
    let water_level = settings.water_level;

    let mut size = 0;
    while size < chunk_size {
        let Some(current) = grid.search_frontier.dequeue(&grid.cells) else {
            break;
        };
        let original = grid.cells[current].elevation();
        let elevation = original - sink;
        if elevation < settings.elevation_minimum {
            continue;
        }
        grid.set_elevation(current, elevation);
        if original >= water_level && elevation < water_level {
            budget += 1;
        }
        size += 1;
        spread_chunk(grid, current, center, phase, settings.jitter_probability, rng);
    }
    grid.search_frontier.clear();
    budget
}

/// Множество индексов клеток с O(1) вставкой, удалением, проверкой и случайным выбором
#[derive(Debug, Clone)]
pub struct ErodibleSet {
    items: Vec<usize>,
    positions: Vec<Option<usize>>,
}

impl ErodibleSet {
    #[must_use]
    pub fn new(cell_count: usize) -> Self {
        Self {
            items: Vec::new(),
            positions: vec![None; cell_count],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, cell: usize) -> bool {
        self.positions[cell].is_some()
    }

    pub fn insert(&mut self, cell: usize) -> bool {
        if self.contains(cell) {
            return false;
        }
        self.positions[cell] = Some(self.items.len());
        self.items.push(cell);
        true
    }

    pub fn remove(&mut self, cell: usize) -> bool {
        let Some(position) = self.positions[cell].take() else {
            return false;
        };
        self.items.swap_remove(position);
        if let Some(&moved) = self.items.get(position) {
            self.positions[moved] = Some(position);
        }
        true
    }

    #[must_use]
    pub fn get(&self, position: usize) -> usize {
        self.items[position]
    }
}

/// Клетку можно размыть, если рядом есть обрыв вниз хотя бы на два уровня
#[must_use]
pub fn is_erodible(grid: &HexGrid, index: usize) -> bool {
    let erodible_elevation = grid.cells[index].elevation() - 2;
    grid.neighbors(index)
        .any(|(_, n)| grid.cells[n].elevation() <= erodible_elevation)
}

fn erosion_target(grid: &HexGrid, index: usize, rng: &mut ChaCha8Rng) -> Option<usize> {
    let erodible_elevation = grid.cells[index].elevation() - 2;
    let candidates: Vec<usize> = grid
        .neighbors(index)
        .map(|(_, n)| n)
        .filter(|&n| grid.cells[n].elevation() <= erodible_elevation)
        .collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

/// Сглаживает `erosion_percentage` процентов обрывов, перенося по одному уровню
/// с размываемой клетки на более низкого соседа.
pub fn erode_land(grid: &mut HexGrid, erosion_percentage: u32, rng: &mut ChaCha8Rng) {
    let mut erodible = ErodibleSet::new(grid.cell_count());
    for i in 0..grid.cell_count() {
        if is_erodible(grid, i) {
            erodible.insert(i);
        }
    }
    let target_count = erodible.len() * (100 - erosion_percentage.min(100)) as usize / 100;
    log::debug!(
        "Эрозия: {} размываемых клеток, останется {target_count}",
        erodible.len()
    );

    while erodible.len() > target_count {
        let cell = erodible.get(rng.gen_range(0..erodible.len()));
        let Some(target) = erosion_target(grid, cell, rng) else {
            erodible.remove(cell);
            continue;
        };

        let elevation = grid.cells[cell].elevation() - 1;
        grid.set_elevation(cell, elevation);
        let target_elevation = grid.cells[target].elevation() + 1;
        grid.set_elevation(target, target_elevation);

        if !is_erodible(grid, cell) {
            erodible.remove(cell);
        }
        let neighbors: Vec<usize> = grid.neighbors(cell).map(|(_, n)| n).collect();
        for n in neighbors {
            if grid.cells[n].elevation() == elevation + 2 {
                erodible.insert(n);
            }
        }

        if is_erodible(grid, target) {
            erodible.insert(target);
        }
        let neighbors: Vec<usize> = grid.neighbors(target).map(|(_, n)| n).collect();
        for n in neighbors {
            if n != cell
                && grid.cells[n].elevation() == target_elevation + 1
                && !is_erodible(grid, n)
            {
                erodible.remove(n);
            }
        }
    }
}
