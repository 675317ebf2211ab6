// src/snapshot.rs
//! Логический снимок карты
//!
//! Снимок хранит только редактируемые атрибуты ячеек, без рабочих полей поиска
//! и видимости. При восстановлении все значения проходят через обычные мутаторы
//! сетки, поэтому испорченный снимок чинится, а не принимается на веру.

use serde::{Deserialize, Serialize};

use crate::biome::TerrainType;
use crate::config::GridSettings;
use crate::coordinates::HexDirection;
use crate::error::HexMapError;
use crate::grid::HexGrid;

/// Текущая версия формата
pub const SNAPSHOT_VERSION: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub elevation: i32,
    pub water_level: i32,
    pub terrain_type: TerrainType,
    #[serde(default)]
    pub urban_level: u8,
    #[serde(default)]
    pub farm_level: u8,
    #[serde(default)]
    pub plant_level: u8,
    #[serde(default)]
    pub walled: bool,
    /// Битовая маска дорог, как в [`crate::cell::HexCell::road_mask`]
    #[serde(default)]
    pub roads: u8,
    #[serde(default)]
    pub incoming_river: Option<HexDirection>,
    #[serde(default)]
    pub outgoing_river: Option<HexDirection>,
    #[serde(default)]
    pub explored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub wrapping: bool,
    pub cells: Vec<CellRecord>,
}

impl MapSnapshot {
    pub fn to_json(&self) -> Result<String, HexMapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, HexMapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &str) -> Result<(), HexMapError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self, HexMapError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    fn check(&self) -> Result<(), HexMapError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(HexMapError::UnsupportedSnapshotVersion(self.version));
        }
        let expected = self.width as usize * self.height as usize;
        if self.cells.len() != expected {
            return Err(HexMapError::SnapshotMismatch {
                expected,
                actual: self.cells.len(),
            });
        }
        Ok(())
    }
}

impl HexGrid {
    #[must_use]
    pub fn snapshot(&self) -> MapSnapshot {
        let cells = self
            .cells()
            .iter()
            .map(|cell| CellRecord {
                elevation: cell.elevation(),
                water_level: cell.water_level(),
                terrain_type: cell.terrain_type(),
                urban_level: cell.urban_level(),
                farm_level: cell.farm_level(),
                plant_level: cell.plant_level(),
                walled: cell.walled(),
                roads: cell.road_mask(),
                incoming_river: cell.incoming_river(),
                outgoing_river: cell.outgoing_river(),
                explored: cell.explored,
            })
            .collect();

        MapSnapshot {
            version: SNAPSHOT_VERSION,
            width: self.cell_count_x(),
            height: self.cell_count_z(),
            wrapping: self.wrapping(),
            cells,
        }
    }

    /// Создаёт сетку по снимку
    pub fn from_snapshot(snapshot: &MapSnapshot, settings: &GridSettings) -> Result<Self, HexMapError> {
        snapshot.check()?;
        let mut grid = Self::with_settings(snapshot.width, snapshot.height, snapshot.wrapping, settings)?;
        grid.restore(snapshot)?;
        Ok(grid)
    }

    /// Переносит снимок в сетку тех же размеров.
    ///
    /// Сначала выставляются высоты и уровни воды всех ячеек, затем реки, затем дороги:
    /// так проверка рек и дорог видит уже окончательный рельеф. Реки и дороги,
    /// которые на этом рельефе невозможны, отбрасываются. Входящие реки берутся
    /// из исходящих рек соседей.
    pub fn restore(&mut self, snapshot: &MapSnapshot) -> Result<(), HexMapError> {
        snapshot.check()?;
        if snapshot.width != self.cell_count_x() || snapshot.height != self.cell_count_z() {
            return Err(HexMapError::SnapshotMismatch {
                expected: self.cell_count(),
                actual: snapshot.cells.len(),
            });
        }

        for i in 0..self.cell_count() {
            self.remove_river(i);
            self.remove_roads(i);
        }
        self.reset_visibility();

        for (i, record) in snapshot.cells.iter().enumerate() {
            self.set_terrain_type(i, record.terrain_type);
            self.set_elevation(i, record.elevation);
            self.set_water_level(i, record.water_level);
            self.set_urban_level(i, record.urban_level);
            self.set_farm_level(i, record.farm_level);
            self.set_plant_level(i, record.plant_level);
            self.set_walled(i, record.walled);
            self.set_explored(i, record.explored);
        }

        let mut dropped = 0;
        for (i, record) in snapshot.cells.iter().enumerate() {
            if let Some(direction) = record.outgoing_river {
                if !self.set_outgoing_river(i, direction) {
                    dropped += 1;
                }
            }
        }
        for (i, record) in snapshot.cells.iter().enumerate() {
            for direction in HexDirection::ALL {
                if record.roads & (1 << direction.index()) != 0 && !self.add_road(i, direction) {
                    dropped += 1;
                }
            }
        }
        if dropped > 0 {
            log::warn!("При восстановлении снимка отброшено {dropped} невозможных рек и дорог");
        }

        self.reset_search_phases();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::small_grid;

    fn edited_grid() -> HexGrid {
        let mut grid = small_grid(4, 3, false);
        for i in 0..grid.cell_count() {
            grid.set_water_level(i, 1);
            grid.set_elevation(i, 2);
        }
        grid.set_elevation(5, 3);
        grid.set_terrain_type(5, TerrainType::Stone);
        grid.set_urban_level(6, 2);
        grid.set_walled(6, true);
        assert!(grid.set_outgoing_river(5, HexDirection::E));
        assert!(grid.add_road(6, HexDirection::E));
        grid.set_explored(7, true);
        grid
    }

    #[test]
    fn test_restore_reproduces_grid() {
        let grid = edited_grid();
        let snapshot = grid.snapshot();
        let json = snapshot.to_json().unwrap();

        let restored =
            HexGrid::from_snapshot(&MapSnapshot::from_json(&json).unwrap(), grid.settings()).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.cells()[6].incoming_river(), Some(HexDirection::W));
    }

    #[test]
    fn test_restore_drops_impossible_rivers_and_roads() {
        let grid = edited_grid();
        let mut snapshot = grid.snapshot();
        // река вверх по склону и дорога через обрыв
        snapshot.cells[4].outgoing_river = Some(HexDirection::E);
        snapshot.cells[0].elevation = 5;
        snapshot.cells[0].roads = 1 << HexDirection::E.index();

        let mut target = small_grid(4, 3, false);
        target.restore(&snapshot).unwrap();
        assert!(!target.cells()[4].has_outgoing_river());
        assert!(!target.cells()[0].has_roads());
        assert!(!target.cells()[1].has_roads());
        assert_eq!(target.cells()[5].outgoing_river(), Some(HexDirection::E));
    }

    #[test]
    fn test_restore_replaces_previous_state() {
        let mut target = edited_grid();
        let blank = small_grid(4, 3, false).snapshot();
        target.restore(&blank).unwrap();
        assert!(target.cells().iter().all(|c| !c.has_river() && !c.has_roads()));
        assert_eq!(target.snapshot(), blank);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let mut snapshot = edited_grid().snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let mut grid = small_grid(4, 3, false);
        assert!(matches!(
            grid.restore(&snapshot),
            Err(HexMapError::UnsupportedSnapshotVersion(4))
        ));
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let mut snapshot = edited_grid().snapshot();
        snapshot.cells.pop();
        let mut grid = small_grid(4, 3, false);
        assert!(matches!(
            grid.restore(&snapshot),
            Err(HexMapError::SnapshotMismatch { .. })
        ));

        let other = small_grid(3, 4, false).snapshot();
        assert!(grid.restore(&other).is_err());
    }
}
