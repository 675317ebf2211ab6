// src/search.rs
//! Поиск по сетке: кратчайший путь с учётом ходов и область видимости
//!
//! Оба поиска используют общую очередь сетки и рабочие поля ячеек. Вместо очистки
//! полей перед каждым поиском сетка увеличивает счётчик фаз на 2: ячейка с меньшей
//! фазой ещё не встречалась, с фазой поиска лежит в очереди, с фазой + 1 закрыта.

use crate::cell::HexCell;
use crate::coordinates::{HexDirection, HexEdgeType};
use crate::error::HexMapError;
use crate::grid::HexGrid;

/// Стоимость шага по ровному ребру
pub const FLAT_MOVE_COST: i32 = 5;
/// Стоимость шага по склону
pub const SLOPE_MOVE_COST: i32 = 10;
/// Стоимость шага по дороге
pub const ROAD_MOVE_COST: i32 = 1;

/// Тот, кто перемещается по карте: задаёт скорость, допустимые клетки и цену шага
pub trait Mover {
    /// Очки движения за один ход
    fn speed(&self) -> i32;

    fn is_valid_destination(&self, cell: &HexCell) -> bool {
        cell.is_explored() && !cell.is_underwater()
    }

    /// Цена шага из `from` в соседнюю `to`; `None`, если пройти нельзя
    fn move_cost(&self, grid: &HexGrid, from: usize, to: usize, direction: HexDirection) -> Option<i32> {
        default_move_cost(grid, from, to, direction)
    }
}

/// Обычная сухопутная единица
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundUnit {
    pub speed: i32,
}

impl Default for GroundUnit {
    fn default() -> Self {
        Self { speed: 24 }
    }
}

impl Mover for GroundUnit {
    fn speed(&self) -> i32 {
        self.speed
    }
}

/// Обрывы непроходимы, дорога стоит 1, стены пропускают только по дороге,
/// иначе 5 по ровному или 10 по склону плюс застройка, поля и растительность цели.
#[must_use]
pub fn default_move_cost(grid: &HexGrid, from: usize, to: usize, direction: HexDirection) -> Option<i32> {
    let edge = grid.edge_type_between(from, to);
    if edge == HexEdgeType::Cliff {
        return None;
    }

    let from_cell = &grid.cells()[from];
    let to_cell = &grid.cells()[to];
    if from_cell.has_road_through_edge(direction) {
        return Some(ROAD_MOVE_COST);
    }
    if from_cell.walled() != to_cell.walled() {
        return None;
    }

    let base = if edge == HexEdgeType::Flat {
        FLAT_MOVE_COST
    } else {
        SLOPE_MOVE_COST
    };
    Some(
        base + i32::from(to_cell.urban_level())
            + i32::from(to_cell.farm_level())
            + i32::from(to_cell.plant_level()),
    )
}

/// Найденный путь: ячейки от начала до цели и накопленная стоимость прихода в каждую
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexPath {
    cells: Vec<usize>,
    distances: Vec<i32>,
    speed: i32,
}

impl HexPath {
    #[must_use]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    #[must_use]
    pub fn distances(&self) -> &[i32] {
        &self.distances
    }

    /// Полная стоимость с учётом очков, сгоревших на границах ходов
    #[must_use]
    pub fn cost(&self) -> i32 {
        self.distances.last().copied().unwrap_or(0)
    }

    /// Номер хода (с нуля), в который единица приходит на шаг `step`;
    /// `None`, если шага с таким номером в пути нет
    #[must_use]
    pub fn turn_at(&self, step: usize) -> Option<i32> {
        self.distances
            .get(step)
            .map(|&distance| turn_for(distance, self.speed))
    }

    /// Номер хода прихода в цель
    #[must_use]
    pub fn turns(&self) -> i32 {
        turn_for(self.cost(), self.speed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn turn_for(distance: i32, speed: i32) -> i32 {
    (distance - 1).max(0) / speed
}

impl HexGrid {
    /// Ищет кратчайший путь для `mover` из `from` в `to`.
    ///
    /// Единица не может начать шаг, на который не хватает оставшихся очков хода:
    /// остаток сгорает, и шаг оплачивается из следующего хода.
    pub fn find_path<M: Mover + ?Sized>(
        &mut self,
        from: usize,
        to: usize,
        mover: &M,
    ) -> Result<Option<HexPath>, HexMapError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let speed = mover.speed();
        if speed <= 0 {
            return Err(HexMapError::InvalidSpeed(speed));
        }

        if !self.search(from, to, mover, speed) {
            log::debug!("Путь {from} -> {to} не найден");
            return Ok(None);
        }

        let mut cells = vec![to];
        let mut current = to;
        while let Some(previous) = self.cells[current].path_from {
            cells.push(previous);
            current = previous;
        }
        cells.reverse();
        let distances = cells.iter().map(|&i| self.cells[i].distance).collect();
        Ok(Some(HexPath {
            cells,
            distances,
            speed,
        }))
    }

    fn search<M: Mover + ?Sized>(&mut self, from: usize, to: usize, mover: &M, speed: i32) -> bool {
        let phase = self.advance_search_phase(2);
        self.search_frontier.clear();

        let origin = &mut self.cells[from];
        origin.search_phase = phase;
        origin.distance = 0;
        origin.search_heuristic = 0;
        origin.path_from = None;
        self.search_frontier.enqueue(&mut self.cells, from);

        while let Some(current) = self.search_frontier.dequeue(&self.cells) {
            self.cells[current].search_phase += 1;
            if current == to {
                return true;
            }

            let current_distance = self.cells[current].distance;
            let current_turn = (current_distance - 1) / speed;

            for direction in HexDirection::ALL {
                let Some(neighbor) = self.cells[current].neighbor(direction) else {
                    continue;
                };
                if self.cells[neighbor].search_phase > phase
                    || !mover.is_valid_destination(&self.cells[neighbor])
                {
                    continue;
                }
                let Some(move_cost) = mover.move_cost(self, current, neighbor, direction) else {
                    continue;
                };

                let mut distance = current_distance + move_cost;
                let turn = (distance - 1) / speed;
                if turn > current_turn {
                    distance = turn * speed + move_cost;
                }

                if self.cells[neighbor].search_phase < phase {
                    let heuristic = self.distance(neighbor, to);
                    let cell = &mut self.cells[neighbor];
                    cell.search_phase = phase;
                    cell.distance = distance;
                    cell.path_from = Some(current);
                    cell.search_heuristic = heuristic;
                    self.search_frontier.enqueue(&mut self.cells, neighbor);
                } else if distance < self.cells[neighbor].distance {
                    let cell = &mut self.cells[neighbor];
                    let old_priority = cell.search_priority_value() as usize;
                    cell.distance = distance;
                    cell.path_from = Some(current);
                    self.search_frontier
                        .change_priority(&mut self.cells, neighbor, old_priority);
                }
            }
        }
        false
    }

    /// Ячейки, видимые из `from` на дальность `range`.
    ///
    /// К дальности добавляется высота обзора наблюдателя; высокие ячейки на пути
    /// закрывают обзор, а обход препятствий не даёт увидеть больше прямой дальности.
    pub fn visible_cells(&mut self, from: usize, range: i32) -> Result<Vec<usize>, HexMapError> {
        self.check_index(from)?;
        if range < 0 {
            return Err(HexMapError::InvalidRange(range));
        }

        let range = range + self.cells[from].view_elevation();
        let phase = self.advance_search_phase(2);
        self.search_frontier.clear();

        let origin = &mut self.cells[from];
        origin.search_phase = phase;
        origin.distance = 0;
        origin.search_heuristic = 0;
        origin.path_from = None;
        self.search_frontier.enqueue(&mut self.cells, from);

        let mut visible = Vec::new();
        while let Some(current) = self.search_frontier.dequeue(&self.cells) {
            self.cells[current].search_phase += 1;
            visible.push(current);

            let current_distance = self.cells[current].distance;
            for direction in HexDirection::ALL {
                let Some(neighbor) = self.cells[current].neighbor(direction) else {
                    continue;
                };
                let cell = &self.cells[neighbor];
                if cell.search_phase > phase || !cell.is_explorable() {
                    continue;
                }

                let distance = current_distance + 1;
                if distance + cell.view_elevation() > range
                    || distance > self.distance(from, neighbor)
                {
                    continue;
                }

                if cell.search_phase < phase {
                    let cell = &mut self.cells[neighbor];
                    cell.search_phase = phase;
                    cell.distance = distance;
                    cell.search_heuristic = 0;
                    cell.path_from = Some(current);
                    self.search_frontier.enqueue(&mut self.cells, neighbor);
                } else if distance < cell.distance {
                    let cell = &mut self.cells[neighbor];
                    let old_priority = cell.search_priority_value() as usize;
                    cell.distance = distance;
                    cell.path_from = Some(current);
                    self.search_frontier
                        .change_priority(&mut self.cells, neighbor, old_priority);
                }
            }
        }
        Ok(visible)
    }

    /// Добавляет наблюдателя в `from`: каждая видимая ячейка получает +1 к видимости,
    /// увиденная впервые становится разведанной.
    pub fn increase_visibility(&mut self, from: usize, range: i32) -> Result<(), HexMapError> {
        for index in self.visible_cells(from, range)? {
            let cell = &mut self.cells[index];
            cell.visibility += 1;
            if cell.visibility == 1 {
                cell.explored = true;
                self.mark_dirty(index);
            }
        }
        Ok(())
    }

    /// Убирает наблюдателя из `from`; разведанность сохраняется
    pub fn decrease_visibility(&mut self, from: usize, range: i32) -> Result<(), HexMapError> {
        for index in self.visible_cells(from, range)? {
            let cell = &mut self.cells[index];
            if cell.visibility == 0 {
                continue;
            }
            cell.visibility -= 1;
            if cell.visibility == 0 {
                self.mark_dirty(index);
            }
        }
        Ok(())
    }

    /// Обнуляет счётчики видимости всех ячеек
    pub fn reset_visibility(&mut self) {
        for index in 0..self.cells.len() {
            if self.cells[index].visibility > 0 {
                self.cells[index].visibility = 0;
                self.mark_dirty(index);
            }
        }
    }
}
