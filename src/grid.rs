// src/grid.rs
//! Гекс-сетка: арена ячеек и все операции, затрагивающие соседей
//!
//! Ячейки лежат в плоском массиве по строкам смещённых координат, соседи хранятся
//! как индексы. Каждый мутатор сам восстанавливает зависящие от него инварианты
//! (реки и дороги) и помечает ячейки, которые нужно перерисовать.

use std::collections::BTreeSet;

use crate::biome::TerrainType;
use crate::cell::{HexCell, MAX_FEATURE_LEVEL};
use crate::config::GridSettings;
use crate::coordinates::{HexCoordinates, HexDirection, HexEdgeType};
use crate::error::HexMapError;
use crate::queue::PriorityBucketQueue;

#[derive(Debug, Clone)]
pub struct HexGrid {
    cell_count_x: u32,
    cell_count_z: u32,
    wrapping: bool,
    settings: GridSettings,
    pub(crate) cells: Vec<HexCell>,
    pub(crate) search_frontier: PriorityBucketQueue,
    pub(crate) search_frontier_phase: u32,
    dirty: BTreeSet<usize>,
}

impl HexGrid {
    /// Создаёт плоскую сетку с чанками по умолчанию (5×5)
    pub fn new(width: u32, height: u32, wrapping: bool) -> Result<Self, HexMapError> {
        Self::with_settings(width, height, wrapping, &GridSettings::default())
    }

    /// Создаёт сетку `width × height` ячеек.
    ///
    /// Размеры должны быть положительными и кратными размеру чанка.
    pub fn with_settings(
        width: u32,
        height: u32,
        wrapping: bool,
        settings: &GridSettings,
    ) -> Result<Self, HexMapError> {
        let chunk_x = settings.chunk_size_x;
        let chunk_z = settings.chunk_size_z;
        if width == 0
            || height == 0
            || chunk_x == 0
            || chunk_z == 0
            || width % chunk_x != 0
            || height % chunk_z != 0
        {
            return Err(HexMapError::InvalidDimensions {
                width,
                height,
                chunk_x,
                chunk_z,
            });
        }
        if settings.elevation_minimum > settings.elevation_maximum {
            return Err(HexMapError::parameter(
                "grid.elevation_minimum",
                settings.elevation_minimum,
                "[.., grid.elevation_maximum]",
            ));
        }

        let mut grid = Self {
            cell_count_x: width,
            cell_count_z: height,
            wrapping,
            settings: settings.clone(),
            cells: Vec::with_capacity((width * height) as usize),
            search_frontier: PriorityBucketQueue::new(),
            search_frontier_phase: 0,
            dirty: BTreeSet::new(),
        };

        for z in 0..height as i32 {
            for x in 0..width as i32 {
                grid.create_cell(x, z);
            }
        }
        log::debug!("Создана сетка {width}×{height} (перенос по X: {wrapping})");
        Ok(grid)
    }

    fn create_cell(&mut self, x: i32, z: i32) {
        let i = self.cells.len();
        let width = self.cell_count_x as i32;
        let height = self.cell_count_z as i32;

        let mut cell = HexCell::new(i, HexCoordinates::from_offset_coordinates(x, z));
        cell.explorable = if self.wrapping {
            z > 0 && z < height - 1
        } else {
            x > 0 && z > 0 && x < width - 1 && z < height - 1
        };
        self.cells.push(cell);

        let w = width as usize;
        if x > 0 {
            self.link(i, HexDirection::W, i - 1);
            if self.wrapping && x == width - 1 {
                self.link(i, HexDirection::E, i - x as usize);
            }
        }
        if z > 0 {
            if z & 1 == 0 {
                self.link(i, HexDirection::SE, i - w);
                if x > 0 {
                    self.link(i, HexDirection::SW, i - w - 1);
                } else if self.wrapping {
                    self.link(i, HexDirection::SW, i - 1);
                }
            } else {
                self.link(i, HexDirection::SW, i - w);
                if x < width - 1 {
                    self.link(i, HexDirection::SE, i - w + 1);
                } else if self.wrapping {
                    self.link(i, HexDirection::SE, i + 1 - 2 * w);
                }
            }
        }
    }

    /// Связывает две ячейки в обе стороны
    fn link(&mut self, cell: usize, direction: HexDirection, neighbor: usize) {
        self.cells[cell].neighbors[direction.index()] = Some(neighbor);
        self.cells[neighbor].neighbors[direction.opposite().index()] = Some(cell);
    }

    #[must_use]
    pub fn cell_count_x(&self) -> u32 {
        self.cell_count_x
    }

    #[must_use]
    pub fn cell_count_z(&self) -> u32 {
        self.cell_count_z
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn wrapping(&self) -> bool {
        self.wrapping
    }

    #[must_use]
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Ширина мира для расчёта расстояний с переносом
    #[must_use]
    pub fn wrap_size(&self) -> Option<i32> {
        self.wrapping.then_some(self.cell_count_x as i32)
    }

    #[must_use]
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&HexCell> {
        self.cells.get(index)
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), HexMapError> {
        if index < self.cells.len() {
            Ok(())
        } else {
            Err(HexMapError::CellOutOfBounds(index))
        }
    }

    /// Индекс ячейки по смещённым координатам (столбец, строка)
    #[must_use]
    pub fn offset_index(&self, x: i32, z: i32) -> Option<usize> {
        if z < 0 || z >= self.cell_count_z as i32 {
            return None;
        }
        let width = self.cell_count_x as i32;
        let x = if self.wrapping { x.rem_euclid(width) } else { x };
        if x < 0 || x >= width {
            return None;
        }
        Some((z * width + x) as usize)
    }

    /// Индекс ячейки по кубическим координатам
    #[must_use]
    pub fn cell_index(&self, coordinates: HexCoordinates) -> Option<usize> {
        self.offset_index(coordinates.offset_x(), coordinates.z())
    }

    #[must_use]
    pub fn neighbor(&self, index: usize, direction: HexDirection) -> Option<usize> {
        self.cells[index].neighbor(direction)
    }

    /// Соседи ячейки вместе с направлением на них
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (HexDirection, usize)> + '_ {
        HexDirection::ALL
            .into_iter()
            .filter_map(move |d| self.cells[index].neighbor(d).map(|n| (d, n)))
    }

    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> i32 {
        self.cells[from]
            .coordinates
            .distance_to(self.cells[to].coordinates, self.wrap_size())
    }

    #[must_use]
    pub fn edge_type(&self, index: usize, direction: HexDirection) -> Option<HexEdgeType> {
        let neighbor = self.neighbor(index, direction)?;
        Some(HexEdgeType::between(
            self.cells[index].elevation,
            self.cells[neighbor].elevation,
        ))
    }

    #[must_use]
    pub fn edge_type_between(&self, from: usize, to: usize) -> HexEdgeType {
        HexEdgeType::between(self.cells[from].elevation, self.cells[to].elevation)
    }

    #[must_use]
    pub fn elevation_difference(&self, index: usize, direction: HexDirection) -> Option<i32> {
        let neighbor = self.neighbor(index, direction)?;
        Some((self.cells[index].elevation - self.cells[neighbor].elevation).abs())
    }

    // === Уведомления о перерисовке ===

    fn refresh(&mut self, index: usize) {
        self.dirty.insert(index);
        for n in self.cells[index].neighbors.into_iter().flatten() {
            self.dirty.insert(n);
        }
    }

    pub(crate) fn mark_dirty(&mut self, index: usize) {
        self.dirty.insert(index);
    }

    /// Забирает накопленные индексы ячеек, которые нужно перерисовать
    pub fn take_dirty_cells(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    // === Высота и вода ===

    /// Меняет высоту (с ограничением границами сетки), затем удаляет реки и дороги,
    /// ставшие невозможными.
    pub fn set_elevation(&mut self, index: usize, elevation: i32) {
        let elevation =
            elevation.clamp(self.settings.elevation_minimum, self.settings.elevation_maximum);
        if self.cells[index].elevation == elevation {
            return;
        }
        self.cells[index].elevation = elevation;
        self.validate_rivers(index);

        for d in HexDirection::ALL {
            if self.cells[index].roads[d.index()]
                && self.elevation_difference(index, d).is_some_and(|diff| diff > 1)
            {
                self.set_road(index, d, false);
            }
        }
        self.refresh(index);
    }

    pub fn set_water_level(&mut self, index: usize, water_level: i32) {
        let water_level =
            water_level.clamp(self.settings.elevation_minimum, self.settings.elevation_maximum);
        if self.cells[index].water_level == water_level {
            return;
        }
        self.cells[index].water_level = water_level;
        self.validate_rivers(index);
        self.refresh(index);
    }

    pub fn set_terrain_type(&mut self, index: usize, terrain_type: TerrainType) {
        if self.cells[index].terrain_type != terrain_type {
            self.cells[index].terrain_type = terrain_type;
            self.refresh(index);
        }
    }

    pub fn set_urban_level(&mut self, index: usize, level: u8) {
        let level = level.min(MAX_FEATURE_LEVEL);
        if self.cells[index].urban_level != level {
            self.cells[index].urban_level = level;
            self.mark_dirty(index);
        }
    }

    pub fn set_farm_level(&mut self, index: usize, level: u8) {
        let level = level.min(MAX_FEATURE_LEVEL);
        if self.cells[index].farm_level != level {
            self.cells[index].farm_level = level;
            self.mark_dirty(index);
        }
    }

    pub fn set_plant_level(&mut self, index: usize, level: u8) {
        let level = level.min(MAX_FEATURE_LEVEL);
        if self.cells[index].plant_level != level {
            self.cells[index].plant_level = level;
            self.mark_dirty(index);
        }
    }

    pub fn set_walled(&mut self, index: usize, walled: bool) {
        if self.cells[index].walled != walled {
            self.cells[index].walled = walled;
            self.refresh(index);
        }
    }

    // === Реки ===

    /// Может ли река течь из `from` в соседнюю `to`: вниз, по ровному
    /// или в озеро на уровне воды `from`.
    #[must_use]
    pub fn is_valid_river_destination(&self, from: usize, to: usize) -> bool {
        let from = &self.cells[from];
        let to = &self.cells[to];
        from.elevation >= to.elevation || from.water_level == to.elevation
    }

    fn validate_rivers(&mut self, index: usize) {
        if let Some(d) = self.cells[index].outgoing_river {
            let valid = self
                .neighbor(index, d)
                .is_some_and(|n| self.is_valid_river_destination(index, n));
            if !valid {
                self.remove_outgoing_river(index);
            }
        }
        if let Some(d) = self.cells[index].incoming_river {
            let valid = self
                .neighbor(index, d)
                .is_some_and(|n| self.is_valid_river_destination(n, index));
            if !valid {
                self.remove_incoming_river(index);
            }
        }
    }

    /// Пускает реку из ячейки в направлении `direction`.
    ///
    /// Возвращает `false`, если соседа нет или вода туда не потечёт. Прежняя исходящая
    /// река ячейки и прежняя входящая река соседа удаляются; дорога через это ребро
    /// тоже исчезает.
    pub fn set_outgoing_river(&mut self, index: usize, direction: HexDirection) -> bool {
        if self.cells[index].outgoing_river == Some(direction) {
            return true;
        }
        let Some(neighbor) = self.neighbor(index, direction) else {
            return false;
        };
        if !self.is_valid_river_destination(index, neighbor) {
            return false;
        }

        self.remove_outgoing_river(index);
        if self.cells[index].incoming_river == Some(direction) {
            self.remove_incoming_river(index);
        }
        self.cells[index].outgoing_river = Some(direction);

        self.remove_incoming_river(neighbor);
        self.cells[neighbor].incoming_river = Some(direction.opposite());

        self.set_road(index, direction, false);
        self.mark_dirty(index);
        self.mark_dirty(neighbor);
        true
    }

    pub fn remove_outgoing_river(&mut self, index: usize) {
        let Some(d) = self.cells[index].outgoing_river.take() else {
            return;
        };
        self.mark_dirty(index);
        if let Some(neighbor) = self.neighbor(index, d) {
            self.cells[neighbor].incoming_river = None;
            self.mark_dirty(neighbor);
        }
    }

    pub fn remove_incoming_river(&mut self, index: usize) {
        let Some(d) = self.cells[index].incoming_river.take() else {
            return;
        };
        self.mark_dirty(index);
        if let Some(neighbor) = self.neighbor(index, d) {
            self.cells[neighbor].outgoing_river = None;
            self.mark_dirty(neighbor);
        }
    }

    pub fn remove_river(&mut self, index: usize) {
        self.remove_outgoing_river(index);
        self.remove_incoming_river(index);
    }

    // === Дороги ===

    /// Прокладывает дорогу через ребро, если там нет реки, сосед существует
    /// и перепад высот не больше одного уровня.
    pub fn add_road(&mut self, index: usize, direction: HexDirection) -> bool {
        let cell = &self.cells[index];
        if cell.roads[direction.index()] {
            return true;
        }
        if cell.has_river_through_edge(direction) {
            return false;
        }
        if !self
            .elevation_difference(index, direction)
            .is_some_and(|diff| diff <= 1)
        {
            return false;
        }
        self.set_road(index, direction, true);
        true
    }

    pub fn remove_roads(&mut self, index: usize) {
        for d in HexDirection::ALL {
            if self.cells[index].roads[d.index()] {
                self.set_road(index, d, false);
            }
        }
    }

    fn set_road(&mut self, index: usize, direction: HexDirection, state: bool) {
        let Some(neighbor) = self.neighbor(index, direction) else {
            return;
        };
        self.cells[index].roads[direction.index()] = state;
        self.cells[neighbor].roads[direction.opposite().index()] = state;
        self.mark_dirty(index);
        self.mark_dirty(neighbor);
    }

    // === Разведка ===

    pub fn set_explorable(&mut self, index: usize, explorable: bool) {
        if self.cells[index].explorable != explorable {
            self.cells[index].explorable = explorable;
            self.mark_dirty(index);
        }
    }

    pub fn set_explored(&mut self, index: usize, explored: bool) {
        if self.cells[index].explored != explored {
            self.cells[index].explored = explored;
            self.mark_dirty(index);
        }
    }

    // === Фазы поиска ===

    /// Сдвигает общий счётчик фаз и возвращает новое значение
    pub(crate) fn advance_search_phase(&mut self, step: u32) -> u32 {
        self.search_frontier_phase += step;
        self.search_frontier_phase
    }

    /// Обнуляет фазы всех ячеек, например после генерации
    pub(crate) fn reset_search_phases(&mut self) {
        for cell in &mut self.cells {
            cell.search_phase = 0;
        }
        self.search_frontier_phase = 0;
        self.search_frontier.clear();
    }
}
