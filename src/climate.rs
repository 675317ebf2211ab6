//! Круговорот воды: испарение, облака, осадки, сток и просачивание
//!
//! Симуляция идёт фиксированное число циклов с двойной буферизацией: каждая ячейка
//! читает текущее состояние и пишет вклад себе и соседям в следующий буфер.

use crate::config::ClimateSettings;
use crate::coordinates::HexDirection;
use crate::grid::HexGrid;

/// Число циклов симуляции
pub const CLIMATE_CYCLES: usize = 40;

/// Облачность и влажность ячейки
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClimateData {
    pub clouds: f32,
    pub moisture: f32,
}

/// Просчитывает климат и возвращает влажность и облачность для каждой ячейки
#[must_use]
pub fn create_climate(
    grid: &HexGrid,
    settings: &ClimateSettings,
    elevation_maximum: i32,
) -> Vec<ClimateData> {
    let initial = ClimateData {
        clouds: 0.0,
        moisture: settings.starting_moisture,
    };
    let mut climate = vec![initial; grid.cell_count()];
    let mut next = vec![ClimateData::default(); grid.cell_count()];

    for _ in 0..CLIMATE_CYCLES {
        for index in 0..grid.cell_count() {
            evolve_climate(grid, settings, elevation_maximum, index, &mut climate, &mut next);
        }
        std::mem::swap(&mut climate, &mut next);
    }
    climate
}

fn evolve_climate(
    grid: &HexGrid,
    settings: &ClimateSettings,
    elevation_maximum: i32,
    index: usize,
    climate: &mut [ClimateData],
    next: &mut [ClimateData],
) {
    let cell = &grid.cells()[index];
    let mut data = climate[index];

    if cell.is_underwater() {
        data.moisture = 1.0;
        data.clouds += settings.evaporation_factor;
    } else {
        let evaporation = data.moisture * settings.evaporation_factor;
        data.moisture -= evaporation;
        data.clouds += evaporation;
    }

    let precipitation = data.clouds * settings.precipitation_factor;
    data.clouds -= precipitation;
    data.moisture += precipitation;

    // над высокими ячейками облака удерживают меньше воды
    let cloud_maximum = 1.0 - cell.view_elevation() as f32 / (elevation_maximum + 1) as f32;
    if data.clouds > cloud_maximum {
        data.moisture += data.clouds - cloud_maximum;
        data.clouds = cloud_maximum;
    }

    let main_dispersal = settings.wind_direction.opposite();
    let cloud_dispersal = data.clouds * (1.0 / (5.0 + settings.wind_strength));
    let runoff = data.moisture * settings.runoff_factor * (1.0 / 6.0);
    let seepage = data.moisture * settings.seepage_factor * (1.0 / 6.0);

    for direction in HexDirection::ALL {
        let Some(neighbor) = cell.neighbor(direction) else {
            continue;
        };
        let neighbor_climate = &mut next[neighbor];
        if direction == main_dispersal {
            neighbor_climate.clouds += cloud_dispersal * settings.wind_strength;
        } else {
            neighbor_climate.clouds += cloud_dispersal;
        }

        let elevation_delta = grid.cells()[neighbor].view_elevation() - cell.view_elevation();
        if elevation_delta < 0 {
            data.moisture -= runoff;
            neighbor_climate.moisture += runoff;
        } else if elevation_delta == 0 {
            data.moisture -= seepage;
            neighbor_climate.moisture += seepage;
        }
    }

    let next_data = &mut next[index];
    next_data.moisture += data.moisture;
    next_data.moisture = next_data.moisture.clamp(0.0, 1.0);
    climate[index] = ClimateData::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::small_grid;

    #[test]
    fn test_moisture_stays_in_unit_range() {
        let mut grid = small_grid(8, 6, false);
        for i in 0..grid.cell_count() {
            grid.set_water_level(i, 2);
            grid.set_elevation(i, (i % 7) as i32);
        }
        let climate = create_climate(&grid, &ClimateSettings::default(), 8);
        assert_eq!(climate.len(), grid.cell_count());
        for data in &climate {
            assert!((0.0..=1.0).contains(&data.moisture), "{data:?}");
            assert!(data.clouds >= 0.0);
        }
    }

    #[test]
    fn test_water_moistens_nearby_land() {
        let mut grid = small_grid(12, 3, false);
        for i in 0..grid.cell_count() {
            grid.set_water_level(i, 1);
            grid.set_elevation(i, 1);
        }
        // океан на западе
        for z in 0..3 {
            let i = grid.offset_index(0, z).unwrap();
            grid.set_elevation(i, 0);
        }

        let settings = ClimateSettings {
            wind_direction: HexDirection::W,
            starting_moisture: 0.0,
            ..ClimateSettings::default()
        };
        let climate = create_climate(&grid, &settings, 8);
        let coast = climate[grid.offset_index(1, 1).unwrap()].moisture;
        let inland = climate[grid.offset_index(11, 1).unwrap()].moisture;
        assert!(coast > inland, "coast {coast} inland {inland}");
        assert!(coast > 0.0);
    }

    #[test]
    fn test_dry_map_stays_dry() {
        let grid = small_grid(4, 4, false);
        let settings = ClimateSettings {
            starting_moisture: 0.0,
            ..ClimateSettings::default()
        };
        let climate = create_climate(&grid, &settings, 8);
        assert!(
            climate
                .iter()
                .all(|c| c.moisture.abs() < f32::EPSILON && c.clouds.abs() < f32::EPSILON)
        );
    }
}
