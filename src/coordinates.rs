//! Кубические координаты гексов и направления
//!
//! Хранятся только `x` и `z`, `y` всегда вычисляется как `-x - z`, поэтому инвариант
//! `x + y + z = 0` выполняется по построению.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Шесть направлений гекса, по часовой стрелке начиная с северо-востока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    NE,
    E,
    SE,
    SW,
    W,
    #[default]
    NW,
}

impl HexDirection {
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NE,
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    #[must_use]
    pub fn previous(self) -> Self {
        Self::from_index(self.index() + 5)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub fn previous2(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    #[must_use]
    pub fn next2(self) -> Self {
        Self::from_index(self.index() + 2)
    }
}

/// Тип ребра между соседними ячейками по разнице высот
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexEdgeType {
    /// Одинаковая высота
    Flat,
    /// Разница ровно в один уровень
    Slope,
    /// Разница в два уровня и больше
    Cliff,
}

impl HexEdgeType {
    #[must_use]
    pub fn between(elevation1: i32, elevation2: i32) -> Self {
        match (elevation2 - elevation1).abs() {
            0 => HexEdgeType::Flat,
            1 => HexEdgeType::Slope,
            _ => HexEdgeType::Cliff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoordinates {
    x: i32,
    z: i32,
}

impl HexCoordinates {
    #[must_use]
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Перевод из смещённых координат (столбец, строка) в кубические
    #[must_use]
    pub fn from_offset_coordinates(x: i32, z: i32) -> Self {
        Self::new(x - z / 2, z)
    }

    #[must_use]
    pub fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(self) -> i32 {
        -self.x - self.z
    }

    #[must_use]
    pub fn z(self) -> i32 {
        self.z
    }

    /// Столбец в смещённых координатах (без учёта переноса)
    #[must_use]
    pub fn offset_x(self) -> i32 {
        self.x + self.z / 2
    }

    /// Расстояние в гексах.
    ///
    /// При `wrap_size = Some(w)` мир замкнут по X, и берётся минимум из трёх кандидатов:
    /// исходного и сдвинутых на `±w`.
    #[must_use]
    pub fn distance_to(self, other: HexCoordinates, wrap_size: Option<i32>) -> i32 {
        let xy = |other_x: i32| {
            let other_y = -other_x - other.z;
            (self.x - other_x).abs() + (self.y() - other_y).abs()
        };

        let mut best = xy(other.x);
        if let Some(wrap) = wrap_size {
            best = best.min(xy(other.x + wrap)).min(xy(other.x - wrap));
        }

        (best + (self.z - other.z).abs()) / 2
    }
}

impl fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_invariant_holds_for_offset_coordinates() {
        for z in 0..12 {
            for x in 0..12 {
                let c = HexCoordinates::from_offset_coordinates(x, z);
                assert_eq!(c.x() + c.y() + c.z(), 0);
                assert_eq!(c.offset_x(), x);
            }
        }
    }

    #[test]
    fn test_distance_symmetry_with_and_without_wrap() {
        let coords: Vec<_> = (0..6)
            .flat_map(|z| (0..8).map(move |x| HexCoordinates::from_offset_coordinates(x, z)))
            .collect();

        for &a in &coords {
            for &b in &coords {
                assert_eq!(a.distance_to(b, None), b.distance_to(a, None));
                assert_eq!(a.distance_to(b, Some(8)), b.distance_to(a, Some(8)));
                assert!(a.distance_to(b, Some(8)) <= a.distance_to(b, None));
            }
        }
    }

    #[test]
    fn test_distance_known_values() {
        let origin = HexCoordinates::from_offset_coordinates(0, 0);
        assert_eq!(origin.distance_to(origin, None), 0);
        assert_eq!(
            origin.distance_to(HexCoordinates::from_offset_coordinates(2, 2), None),
            3
        );
        assert_eq!(
            origin.distance_to(HexCoordinates::from_offset_coordinates(5, 0), None),
            5
        );
    }

    #[test]
    fn test_wrap_shortens_distance_across_seam() {
        let west = HexCoordinates::from_offset_coordinates(0, 0);
        let east = HexCoordinates::from_offset_coordinates(9, 0);
        assert_eq!(west.distance_to(east, None), 9);
        assert_eq!(west.distance_to(east, Some(10)), 1);
    }

    #[test]
    fn test_direction_arithmetic() {
        assert_eq!(HexDirection::NE.opposite(), HexDirection::SW);
        assert_eq!(HexDirection::W.opposite(), HexDirection::E);
        assert_eq!(HexDirection::NE.previous(), HexDirection::NW);
        assert_eq!(HexDirection::NW.next(), HexDirection::NE);
        assert_eq!(HexDirection::NE.previous2(), HexDirection::W);
        assert_eq!(HexDirection::W.next2(), HexDirection::NE);
    }

    #[test]
    fn test_edge_type_between() {
        assert_eq!(HexEdgeType::between(3, 3), HexEdgeType::Flat);
        assert_eq!(HexEdgeType::between(3, 2), HexEdgeType::Slope);
        assert_eq!(HexEdgeType::between(1, 3), HexEdgeType::Cliff);
    }
}
