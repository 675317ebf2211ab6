use crate::biome::TerrainType;
use crate::coordinates::{HexCoordinates, HexDirection};
use crate::queue::BucketNode;

/// Максимальный уровень застройки, полей и растительности
pub const MAX_FEATURE_LEVEL: u8 = 3;

/// Ячейка гекс-сетки.
///
/// Ячейка хранит только собственное состояние; всё, что затрагивает соседей
/// (реки, дороги, высота), меняется через методы [`crate::grid::HexGrid`], чтобы
/// сохранять инварианты с обеих сторон ребра.
#[derive(Debug, Clone)]
pub struct HexCell {
    pub(crate) index: usize,
    pub(crate) coordinates: HexCoordinates,
    pub(crate) elevation: i32,
    pub(crate) water_level: i32,
    pub(crate) terrain_type: TerrainType,
    pub(crate) urban_level: u8,
    pub(crate) farm_level: u8,
    pub(crate) plant_level: u8,
    pub(crate) walled: bool,
    pub(crate) roads: [bool; 6],
    pub(crate) incoming_river: Option<HexDirection>,
    pub(crate) outgoing_river: Option<HexDirection>,
    pub(crate) neighbors: [Option<usize>; 6],

    pub(crate) visibility: u32,
    pub(crate) explored: bool,
    pub(crate) explorable: bool,

    // Рабочие поля поиска, действительны только при search_phase == фазе сетки
    pub(crate) distance: i32,
    pub(crate) search_heuristic: i32,
    pub(crate) search_phase: u32,
    pub(crate) path_from: Option<usize>,
    pub(crate) next_with_same_priority: Option<usize>,
}

impl HexCell {
    pub(crate) fn new(index: usize, coordinates: HexCoordinates) -> Self {
        Self {
            index,
            coordinates,
            elevation: 0,
            water_level: 0,
            terrain_type: TerrainType::default(),
            urban_level: 0,
            farm_level: 0,
            plant_level: 0,
            walled: false,
            roads: [false; 6],
            incoming_river: None,
            outgoing_river: None,
            neighbors: [None; 6],
            visibility: 0,
            explored: false,
            explorable: false,
            distance: 0,
            search_heuristic: 0,
            search_phase: 0,
            path_from: None,
            next_with_same_priority: None,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    #[must_use]
    pub fn neighbor(&self, direction: HexDirection) -> Option<usize> {
        self.neighbors[direction.index()]
    }

    #[must_use]
    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    #[must_use]
    pub fn water_level(&self) -> i32 {
        self.water_level
    }

    #[must_use]
    pub fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    /// Высота для обзора и климата: поверхность воды, если ячейка затоплена
    #[must_use]
    pub fn view_elevation(&self) -> i32 {
        self.elevation.max(self.water_level)
    }

    #[must_use]
    pub fn terrain_type(&self) -> TerrainType {
        self.terrain_type
    }

    #[must_use]
    pub fn urban_level(&self) -> u8 {
        self.urban_level
    }

    #[must_use]
    pub fn farm_level(&self) -> u8 {
        self.farm_level
    }

    #[must_use]
    pub fn plant_level(&self) -> u8 {
        self.plant_level
    }

    #[must_use]
    pub fn walled(&self) -> bool {
        self.walled
    }

    #[must_use]
    pub fn has_road_through_edge(&self, direction: HexDirection) -> bool {
        self.roads[direction.index()]
    }

    #[must_use]
    pub fn has_roads(&self) -> bool {
        self.roads.iter().any(|&road| road)
    }

    /// Битовая маска дорог, бит `i` соответствует `HexDirection::from_index(i)`
    #[must_use]
    pub fn road_mask(&self) -> u8 {
        self.roads
            .iter()
            .enumerate()
            .filter(|&(_, &road)| road)
            .fold(0u8, |mask, (i, _)| mask | (1u8 << i))
    }

    #[must_use]
    pub fn incoming_river(&self) -> Option<HexDirection> {
        self.incoming_river
    }

    #[must_use]
    pub fn outgoing_river(&self) -> Option<HexDirection> {
        self.outgoing_river
    }

    #[must_use]
    pub fn has_incoming_river(&self) -> bool {
        self.incoming_river.is_some()
    }

    #[must_use]
    pub fn has_outgoing_river(&self) -> bool {
        self.outgoing_river.is_some()
    }

    #[must_use]
    pub fn has_river(&self) -> bool {
        self.has_incoming_river() || self.has_outgoing_river()
    }

    /// Исток или устье: река только входит или только выходит
    #[must_use]
    pub fn has_river_begin_or_end(&self) -> bool {
        self.has_incoming_river() != self.has_outgoing_river()
    }

    #[must_use]
    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }

    /// Сколько наблюдателей сейчас видят ячейку
    #[must_use]
    pub fn visibility(&self) -> u32 {
        self.visibility
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility > 0 && self.explorable
    }

    #[must_use]
    pub fn is_explored(&self) -> bool {
        self.explored && self.explorable
    }

    #[must_use]
    pub fn is_explorable(&self) -> bool {
        self.explorable
    }

    pub(crate) fn search_priority_value(&self) -> i32 {
        self.distance + self.search_heuristic
    }
}

impl BucketNode for HexCell {
    fn search_priority(&self) -> usize {
        debug_assert!(self.search_priority_value() >= 0);
        self.search_priority_value() as usize
    }

    fn next_with_same_priority(&self) -> Option<usize> {
        self.next_with_same_priority
    }

    fn set_next_with_same_priority(&mut self, next: Option<usize>) {
        self.next_with_same_priority = next;
    }
}
