// src/biome.rs
//! Температура и биомы
//!
//! Последний этап генерации: по широте, высоте и шуму вычисляется температура,
//! затем пара (температура, влажность) даёт тип поверхности и уровень растительности.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::climate::ClimateData;
use crate::config::{HemisphereMode, TemperatureSettings};
use crate::grid::HexGrid;

/// Тип поверхности ячейки, индексы совпадают с порядком текстур
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainType {
    #[default]
    Sand,
    Grass,
    Mud,
    Stone,
    Snow,
}

impl TerrainType {
    pub const ALL: [TerrainType; 5] = [
        TerrainType::Sand,
        TerrainType::Grass,
        TerrainType::Mud,
        TerrainType::Stone,
        TerrainType::Snow,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Тип поверхности и растительность для пары температура/влажность
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Biome {
    pub terrain: TerrainType,
    pub plant: u8,
}

impl Biome {
    const fn new(terrain: TerrainType, plant: u8) -> Self {
        Self { terrain, plant }
    }
}

pub const TEMPERATURE_BANDS: [f32; 3] = [0.1, 0.3, 0.6];
pub const MOISTURE_BANDS: [f32; 3] = [0.12, 0.28, 0.85];

// Строки: температурные полосы (от холодной), столбцы: полосы влажности (от сухой)
const BIOMES: [Biome; 16] = {
    use TerrainType::{Grass, Mud, Sand, Snow};
    [
        Biome::new(Sand, 0),
        Biome::new(Snow, 0),
        Biome::new(Snow, 0),
        Biome::new(Snow, 0),
        Biome::new(Sand, 0),
        Biome::new(Mud, 0),
        Biome::new(Mud, 1),
        Biome::new(Mud, 2),
        Biome::new(Sand, 0),
        Biome::new(Grass, 0),
        Biome::new(Grass, 1),
        Biome::new(Grass, 2),
        Biome::new(Sand, 0),
        Biome::new(Grass, 1),
        Biome::new(Grass, 2),
        Biome::new(Grass, 3),
    ]
};

/// Частота шума температуры в координатах гексов
const TEMPERATURE_NOISE_FREQUENCY: f32 = 0.1;

fn band(value: f32, bands: &[f32]) -> usize {
    bands.iter().take_while(|&&limit| value >= limit).count()
}

/// Биом суши без поправок на высоту и реки
#[must_use]
pub fn biome_for(temperature: f32, moisture: f32) -> Biome {
    let t = band(temperature, &TEMPERATURE_BANDS);
    let m = band(moisture, &MOISTURE_BANDS);
    BIOMES[t * 4 + m]
}

/// Поле температуры одной генерации: настройки плюс собственный шум
pub struct TemperatureField<'a> {
    settings: &'a TemperatureSettings,
    noise: FastNoiseLite,
    water_level: i32,
    elevation_maximum: i32,
}

impl<'a> TemperatureField<'a> {
    pub fn new(
        settings: &'a TemperatureSettings,
        water_level: i32,
        elevation_maximum: i32,
        noise_seed: i32,
    ) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(noise_seed));
        noise.set_noise_type(Some(NoiseType::Value));
        noise.set_frequency(Some(TEMPERATURE_NOISE_FREQUENCY));
        Self {
            settings,
            noise,
            water_level,
            elevation_maximum,
        }
    }

    /// Температура ячейки в диапазоне примерно [0, 1]
    #[must_use]
    pub fn temperature(&self, grid: &HexGrid, index: usize) -> f32 {
        let cell = &grid.cells()[index];
        let mut latitude = cell.coordinates().z() as f32 / grid.cell_count_z() as f32;
        match self.settings.hemisphere {
            HemisphereMode::Both => {
                latitude *= 2.0;
                if latitude > 1.0 {
                    latitude = 2.0 - latitude;
                }
            }
            HemisphereMode::North => latitude = 1.0 - latitude,
            HemisphereMode::South => {}
        }

        let low = self.settings.low_temperature;
        let high = self.settings.high_temperature;
        let mut temperature = low + (high - low) * latitude;

        // холоднее в горах
        temperature *= 1.0
            - (cell.view_elevation() - self.water_level) as f32
                / (self.elevation_maximum - self.water_level + 1) as f32;

        temperature + self.sample_noise(grid, index) * self.settings.temperature_jitter
    }

    /// Шум в [-1, 1]; на замкнутой карте берётся с цилиндра, чтобы шов по X не был виден
    fn sample_noise(&self, grid: &HexGrid, index: usize) -> f32 {
        let coordinates = grid.cells()[index].coordinates();
        let z = coordinates.z();
        let x = coordinates.offset_x() as f32 + if z & 1 == 1 { 0.5 } else { 0.0 };
        let y = z as f32 * 0.866;

        if grid.wrapping() {
            let width = grid.cell_count_x() as f32;
            let radius = width / (2.0 * std::f32::consts::PI);
            let angle = (x / width) * 2.0 * std::f32::consts::PI;
            self.noise
                .get_noise_3d(radius * angle.cos(), y, radius * angle.sin())
        } else {
            self.noise.get_noise_2d(x, y)
        }
    }
}

/// Назначает тип поверхности и растительность всем ячейкам
pub fn set_terrain_type(
    grid: &mut HexGrid,
    climate: &[ClimateData],
    settings: &TemperatureSettings,
    water_level: i32,
    elevation_maximum: i32,
    rng: &mut ChaCha8Rng,
) {
    let field = TemperatureField::new(settings, water_level, elevation_maximum, rng.r#gen());
    let rock_desert_elevation = elevation_maximum - (elevation_maximum - water_level) / 2;

    for i in 0..grid.cell_count() {
        let temperature = field.temperature(grid, i);
        let cell = &grid.cells()[i];

        if cell.is_underwater() {
            let terrain = underwater_terrain(grid, i, water_level, temperature);
            grid.set_terrain_type(i, terrain);
            continue;
        }

        let mut biome = biome_for(temperature, climate[i].moisture);
        if biome.terrain == TerrainType::Sand {
            if cell.elevation() >= rock_desert_elevation {
                biome.terrain = TerrainType::Stone;
            }
        } else if cell.elevation() == elevation_maximum {
            biome.terrain = TerrainType::Snow;
        }

        if biome.terrain == TerrainType::Snow {
            biome.plant = 0;
        } else if biome.plant < 3 && cell.has_river() {
            biome.plant += 1;
        }

        grid.set_terrain_type(i, biome.terrain);
        grid.set_plant_level(i, biome.plant);
    }
}

/// Дно: пляж или скалы у берега, трава на мелководье озёр, ил и камень на глубине
fn underwater_terrain(grid: &HexGrid, index: usize, water_level: i32, temperature: f32) -> TerrainType {
    let cell = &grid.cells()[index];
    let terrain = if cell.elevation() == water_level - 1 {
        let mut cliffs = 0;
        let mut slopes = 0;
        for (_, n) in grid.neighbors(index) {
            let delta = grid.cells()[n].elevation() - cell.water_level();
            if delta == 0 {
                slopes += 1;
            } else if delta > 0 {
                cliffs += 1;
            }
        }

        if cliffs + slopes > 3 {
            TerrainType::Grass
        } else if cliffs > 0 {
            TerrainType::Stone
        } else if slopes > 0 {
            TerrainType::Sand
        } else {
            TerrainType::Grass
        }
    } else if cell.elevation() >= water_level {
        TerrainType::Grass
    } else if cell.elevation() < 0 {
        TerrainType::Stone
    } else {
        TerrainType::Mud
    };

    if terrain == TerrainType::Grass && temperature < TEMPERATURE_BANDS[0] {
        TerrainType::Mud
    } else {
        terrain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::small_grid;
    use rand::SeedableRng;

    fn flat_settings(temperature: f32) -> TemperatureSettings {
        TemperatureSettings {
            low_temperature: temperature,
            high_temperature: temperature,
            temperature_jitter: 0.0,
            hemisphere: HemisphereMode::Both,
        }
    }

    #[test]
    fn test_biome_table_lookup() {
        assert_eq!(biome_for(0.05, 0.05), Biome::new(TerrainType::Sand, 0));
        assert_eq!(biome_for(0.05, 0.9), Biome::new(TerrainType::Snow, 0));
        assert_eq!(biome_for(0.2, 0.5), Biome::new(TerrainType::Mud, 1));
        assert_eq!(biome_for(0.5, 0.5), Biome::new(TerrainType::Grass, 1));
        assert_eq!(biome_for(0.9, 0.9), Biome::new(TerrainType::Grass, 3));
        // граница полосы относится к верхней полосе
        assert_eq!(biome_for(0.6, 0.12), Biome::new(TerrainType::Grass, 1));
    }

    #[test]
    fn test_temperature_falls_toward_poles_and_with_height() {
        let settings = TemperatureSettings {
            temperature_jitter: 0.0,
            ..TemperatureSettings::default()
        };
        let mut grid = small_grid(4, 10, false);
        for i in 0..grid.cell_count() {
            grid.set_water_level(i, 1);
            grid.set_elevation(i, 1);
        }
        let field = TemperatureField::new(&settings, 1, 8, 7);

        let pole = grid.offset_index(1, 0).unwrap();
        let equator = grid.offset_index(1, 5).unwrap();
        assert!(field.temperature(&grid, pole) < 0.01);
        assert!((field.temperature(&grid, equator) - 1.0).abs() < 1e-5);

        grid.set_elevation(equator, 8);
        assert!(field.temperature(&grid, equator) < 0.2);
    }

    #[test]
    fn test_northern_hemisphere_is_hot_at_bottom_row() {
        let settings = TemperatureSettings {
            temperature_jitter: 0.0,
            hemisphere: HemisphereMode::North,
            ..TemperatureSettings::default()
        };
        let grid = small_grid(2, 4, false);
        let field = TemperatureField::new(&settings, 0, 8, 1);
        assert!((field.temperature(&grid, 0) - 1.0).abs() < 1e-5);
        assert!(field.temperature(&grid, grid.offset_index(0, 3).unwrap()) < 0.5);
    }

    #[test]
    fn test_noise_stays_in_unit_range() {
        let settings = TemperatureSettings::default();
        let grid = small_grid(16, 8, true);
        let field = TemperatureField::new(&settings, 1, 8, 99);
        for i in 0..grid.cell_count() {
            let n = field.sample_noise(&grid, i);
            assert!((-1.0..=1.0).contains(&n), "noise {n} at {i}");
        }
    }

    #[test]
    fn test_terrain_classification() {
        let mut grid = small_grid(3, 3, false);
        for i in 0..grid.cell_count() {
            grid.set_water_level(i, 1);
            grid.set_elevation(i, 1);
        }
        // вершина, мелководье у пологого берега и сухая клетка
        let peak = grid.offset_index(1, 1).unwrap();
        grid.set_elevation(peak, 8);
        grid.set_elevation(0, 0);

        let climate = vec![
            ClimateData {
                clouds: 0.0,
                moisture: 0.5,
            };
            grid.cell_count()
        ];
        let settings = flat_settings(0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        set_terrain_type(&mut grid, &climate, &settings, 1, 8, &mut rng);

        let cells = grid.cells();
        assert_eq!(cells[peak].terrain_type(), TerrainType::Snow);
        assert_eq!(cells[peak].plant_level(), 0);
        assert_eq!(cells[0].terrain_type(), TerrainType::Sand);
        assert_eq!(cells[2].terrain_type(), TerrainType::Grass);
        assert_eq!(cells[2].plant_level(), 1);
    }

    #[test]
    fn test_river_boosts_plants() {
        let mut grid = small_grid(3, 1, false);
        for i in 0..3 {
            grid.set_water_level(i, 1);
            grid.set_elevation(i, 1);
        }
        assert!(grid.set_outgoing_river(0, crate::coordinates::HexDirection::E));

        let climate = vec![
            ClimateData {
                clouds: 0.0,
                moisture: 0.5,
            };
            3
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        set_terrain_type(&mut grid, &climate, &flat_settings(0.5), 1, 8, &mut rng);
        assert_eq!(grid.cells()[0].plant_level(), 2);
        assert_eq!(grid.cells()[2].plant_level(), 1);
    }

    #[test]
    fn test_cold_shallows_turn_to_mud() {
        let mut grid = small_grid(2, 1, false);
        grid.set_water_level(0, 3);
        grid.set_water_level(1, 3);
        grid.set_elevation(0, 4);
        grid.set_elevation(1, 3);
        // озеро на высоте уровня воды: трава, но в холоде ил
        grid.set_water_level(1, 4);

        let climate = vec![ClimateData::default(); 2];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        set_terrain_type(&mut grid, &climate, &flat_settings(0.0), 3, 8, &mut rng);
        assert_eq!(grid.cells()[1].terrain_type(), TerrainType::Mud);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        set_terrain_type(&mut grid, &climate, &flat_settings(0.9), 3, 8, &mut rng);
        assert_eq!(grid.cells()[1].terrain_type(), TerrainType::Grass);
    }
}
