// src/config.rs
//! Конфигурация сетки и генерации мира
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размеры сетки и чанков
//! - Подъём и опускание суши, эрозия
//! - Климатическая симуляция
//! - Реки и озёра
//! - Температура и полушария
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.
//! Диапазоны значений проверяются в [`WorldGenerationParams::validate`].

use serde::{Deserialize, Serialize};
use std::fs;

use crate::coordinates::HexDirection;
use crate::error::HexMapError;

/// Какое полушарие изображает карта
///
/// Определяет, где на карте находится экватор при расчёте температуры.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HemisphereMode {
    /// Экватор посередине карты, полюса сверху и снизу
    #[default]
    Both,
    /// Экватор снизу (z = 0), полюс сверху
    North,
    /// Экватор сверху, полюс снизу
    South,
}

/// Настройки сетки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Ширина чанка в ячейках: ширина карты должна быть ей кратна
    #[serde(default = "default_chunk_size")]
    pub chunk_size_x: u32,

    /// Высота чанка в ячейках: высота карты должна быть ей кратна
    #[serde(default = "default_chunk_size")]
    pub chunk_size_z: u32,

    /// Нижняя граница высоты ячейки
    #[serde(default = "default_grid_elevation_minimum")]
    pub elevation_minimum: i32,

    /// Верхняя граница высоты ячейки
    #[serde(default = "default_grid_elevation_maximum")]
    pub elevation_maximum: i32,
}

fn default_chunk_size() -> u32 {
    5
}
fn default_grid_elevation_minimum() -> i32 {
    -4
}
fn default_grid_elevation_maximum() -> i32 {
    10
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            chunk_size_x: 5,
            chunk_size_z: 5,
            elevation_minimum: -4,
            elevation_maximum: 10,
        }
    }
}

/// Настройки рельефа
///
/// Управляет тем, как суша поднимается из океана и как потом выветривается.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSettings {
    /// Вероятность сдвинуть клетку в очереди подъёма (0.0–0.5): чем выше, тем изрезаннее берег
    #[serde(default = "default_jitter_probability")]
    pub jitter_probability: f32,

    /// Минимальный размер поднимаемого участка (20–200)
    #[serde(default = "default_chunk_size_min")]
    pub chunk_size_min: u32,

    /// Максимальный размер поднимаемого участка (20–200)
    #[serde(default = "default_chunk_size_max")]
    pub chunk_size_max: u32,

    /// Доля суши в процентах (5–95)
    #[serde(default = "default_land_percentage")]
    pub land_percentage: u32,

    /// Уровень воды (1–5)
    #[serde(default = "default_water_level")]
    pub water_level: i32,

    /// Вероятность подъёма сразу на два уровня (0.0–1.0)
    #[serde(default = "default_high_rise_probability")]
    pub high_rise_probability: f32,

    /// Вероятность того, что участок будет опущен, а не поднят (0.0–0.4)
    #[serde(default = "default_sink_probability")]
    pub sink_probability: f32,

    /// Минимальная высота (-4–0)
    #[serde(default = "default_elevation_minimum")]
    pub elevation_minimum: i32,

    /// Максимальная высота (6–10)
    #[serde(default = "default_elevation_maximum")]
    pub elevation_maximum: i32,

    /// Отступ от краёв карты по X, в котором суша не зарождается (0–10)
    #[serde(default = "default_border")]
    pub map_border_x: i32,

    /// Отступ от краёв карты по Z (0–10)
    #[serde(default = "default_border")]
    pub map_border_z: i32,

    /// Ширина пролива между регионами (0–10)
    #[serde(default = "default_border")]
    pub region_border: i32,

    /// Количество регионов (1–4): больше регионов — больше отдельных материков
    #[serde(default = "default_region_count")]
    pub region_count: u32,

    /// Какой процент обрывов сгладить эрозией (0–100)
    #[serde(default = "default_erosion_percentage")]
    pub erosion_percentage: u32,
}

fn default_jitter_probability() -> f32 {
    0.25
}
fn default_chunk_size_min() -> u32 {
    30
}
fn default_chunk_size_max() -> u32 {
    100
}
fn default_land_percentage() -> u32 {
    50
}
fn default_water_level() -> i32 {
    3
}
fn default_high_rise_probability() -> f32 {
    0.25
}
fn default_sink_probability() -> f32 {
    0.2
}
fn default_elevation_minimum() -> i32 {
    -2
}
fn default_elevation_maximum() -> i32 {
    8
}
fn default_border() -> i32 {
    5
}
fn default_region_count() -> u32 {
    1
}
fn default_erosion_percentage() -> u32 {
    50
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            jitter_probability: 0.25,
            chunk_size_min: 30,
            chunk_size_max: 100,
            land_percentage: 50,
            water_level: 3,
            high_rise_probability: 0.25,
            sink_probability: 0.2,
            elevation_minimum: -2,
            elevation_maximum: 8,
            map_border_x: 5,
            map_border_z: 5,
            region_border: 5,
            region_count: 1,
            erosion_percentage: 50,
        }
    }
}

/// Параметры симуляции круговорота воды
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateSettings {
    /// Доля влаги, испаряемой за цикл (0.0–1.0)
    pub evaporation_factor: f32,
    /// Доля облаков, выпадающих осадками (0.0–1.0)
    pub precipitation_factor: f32,
    /// Сток влаги в более низкие ячейки (0.0–1.0)
    pub runoff_factor: f32,
    /// Просачивание влаги в ячейки той же высоты (0.0–1.0)
    pub seepage_factor: f32,
    /// Начальная влажность суши (0.0–1.0)
    pub starting_moisture: f32,
    /// Откуда дует ветер
    pub wind_direction: HexDirection,
    /// Во сколько раз облака сильнее уносятся по ветру (1.0–10.0)
    pub wind_strength: f32,
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            evaporation_factor: 0.5,
            precipitation_factor: 0.25,
            runoff_factor: 0.25,
            seepage_factor: 0.125,
            starting_moisture: 0.1,
            wind_direction: HexDirection::NW,
            wind_strength: 4.0,
        }
    }
}

/// Настройки рек
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverSettings {
    /// Какой процент суши занят реками (0–20)
    pub river_percentage: u32,
    /// Вероятность образования озера по ходу реки (0.0–1.0)
    pub extra_lake_probability: f32,
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            river_percentage: 10,
            extra_lake_probability: 0.25,
        }
    }
}

/// Температурные настройки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureSettings {
    /// Температура на полюсе (0.0–1.0)
    pub low_temperature: f32,
    /// Температура на экваторе (0.0–1.0)
    pub high_temperature: f32,
    /// Амплитуда шумового отклонения температуры (0.0–1.0)
    pub temperature_jitter: f32,
    pub hemisphere: HemisphereMode,
}

impl Default for TemperatureSettings {
    fn default() -> Self {
        Self {
            low_temperature: 0.0,
            high_temperature: 1.0,
            temperature_jitter: 0.1,
            hemisphere: HemisphereMode::Both,
        }
    }
}

/// Основные параметры генерации мира
///
/// Полная конфигурация для генерации одного мира. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGenerationParams {
    /// Сид генератора случайных чисел; без него выбирается случайный
    #[serde(default)]
    pub seed: Option<u64>,

    /// Ширина карты в ячейках (по умолчанию 40)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в ячейках (по умолчанию 30)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Замкнутость карты по долготе
    #[serde(default)]
    pub wrapping: bool,

    #[serde(default)]
    pub grid: GridSettings,

    #[serde(default)]
    pub terrain: TerrainSettings,

    #[serde(default)]
    pub climate: ClimateSettings,

    #[serde(default)]
    pub rivers: RiverSettings,

    #[serde(default)]
    pub temperature: TemperatureSettings,
}

fn default_width() -> u32 {
    40
}
fn default_height() -> u32 {
    30
}

impl Default for WorldGenerationParams {
    fn default() -> Self {
        Self {
            seed: None,
            width: 40,
            height: 30,
            wrapping: false,
            grid: GridSettings::default(),
            terrain: TerrainSettings::default(),
            climate: ClimateSettings::default(),
            rivers: RiverSettings::default(),
            temperature: TemperatureSettings::default(),
        }
    }
}

impl WorldGenerationParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 80
    /// height = 60
    /// wrapping = true
    ///
    /// [terrain]
    /// land_percentage = 40
    /// region_count = 2
    /// ```
    pub fn from_toml_file(path: &str) -> Result<Self, HexMapError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, HexMapError> {
        let params: Self = toml::from_str(contents)?;
        Ok(params)
    }

    /// Проверяет, что все параметры лежат в документированных диапазонах.
    ///
    /// Размеры сетки здесь не проверяются: это делает [`crate::grid::HexGrid`] при создании.
    pub fn validate(&self) -> Result<(), HexMapError> {
        let t = &self.terrain;
        check_f32("terrain.jitter_probability", t.jitter_probability, 0.0, 0.5, "[0, 0.5]")?;
        check_int("terrain.chunk_size_min", t.chunk_size_min, 20, 200, "[20, 200]")?;
        check_int("terrain.chunk_size_max", t.chunk_size_max, 20, 200, "[20, 200]")?;
        if t.chunk_size_min > t.chunk_size_max {
            return Err(HexMapError::parameter(
                "terrain.chunk_size_min",
                t.chunk_size_min,
                "[20, terrain.chunk_size_max]",
            ));
        }
        check_int("terrain.land_percentage", t.land_percentage, 5, 95, "[5, 95]")?;
        check_int("terrain.water_level", t.water_level, 1, 5, "[1, 5]")?;
        check_f32("terrain.high_rise_probability", t.high_rise_probability, 0.0, 1.0, "[0, 1]")?;
        check_f32("terrain.sink_probability", t.sink_probability, 0.0, 0.4, "[0, 0.4]")?;
        check_int("terrain.elevation_minimum", t.elevation_minimum, -4, 0, "[-4, 0]")?;
        check_int("terrain.elevation_maximum", t.elevation_maximum, 6, 10, "[6, 10]")?;
        check_int("terrain.map_border_x", t.map_border_x, 0, 10, "[0, 10]")?;
        check_int("terrain.map_border_z", t.map_border_z, 0, 10, "[0, 10]")?;
        check_int("terrain.region_border", t.region_border, 0, 10, "[0, 10]")?;
        check_int("terrain.region_count", t.region_count, 1, 4, "[1, 4]")?;
        check_int("terrain.erosion_percentage", t.erosion_percentage, 0, 100, "[0, 100]")?;

        let c = &self.climate;
        check_f32("climate.evaporation_factor", c.evaporation_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("climate.precipitation_factor", c.precipitation_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("climate.runoff_factor", c.runoff_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("climate.seepage_factor", c.seepage_factor, 0.0, 1.0, "[0, 1]")?;
        check_f32("climate.starting_moisture", c.starting_moisture, 0.0, 1.0, "[0, 1]")?;
        check_f32("climate.wind_strength", c.wind_strength, 1.0, 10.0, "[1, 10]")?;

        let r = &self.rivers;
        check_int("rivers.river_percentage", r.river_percentage, 0, 20, "[0, 20]")?;
        check_f32("rivers.extra_lake_probability", r.extra_lake_probability, 0.0, 1.0, "[0, 1]")?;

        let temp = &self.temperature;
        check_f32("temperature.low_temperature", temp.low_temperature, 0.0, 1.0, "[0, 1]")?;
        check_f32("temperature.high_temperature", temp.high_temperature, 0.0, 1.0, "[0, 1]")?;
        check_f32("temperature.temperature_jitter", temp.temperature_jitter, 0.0, 1.0, "[0, 1]")?;

        Ok(())
    }
}

fn check_f32(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    range: &'static str,
) -> Result<(), HexMapError> {
    // NaN тоже отклоняется: contains для него ложно
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(HexMapError::parameter(name, value, range))
    }
}

fn check_int<T>(name: &'static str, value: T, min: T, max: T, range: &'static str) -> Result<(), HexMapError>
where
    T: PartialOrd + ToString,
{
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(HexMapError::parameter(name, value, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WorldGenerationParams::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_parameter_is_rejected() {
        let mut params = WorldGenerationParams::default();
        params.terrain.land_percentage = 99;
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            HexMapError::InvalidParameter {
                name: "terrain.land_percentage",
                ..
            }
        ));

        let mut params = WorldGenerationParams::default();
        params.climate.runoff_factor = f32::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_chunk_size_min_must_not_exceed_max() {
        let mut params = WorldGenerationParams::default();
        params.terrain.chunk_size_min = 150;
        params.terrain.chunk_size_max = 40;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let params = WorldGenerationParams::from_toml_str(
            r#"
            seed = 42
            width = 10
            height = 10

            [terrain]
            land_percentage = 35
            region_count = 2

            [climate]
            wind_direction = "SE"
            "#,
        )
        .unwrap();

        assert_eq!(params.seed, Some(42));
        assert_eq!(params.terrain.land_percentage, 35);
        assert_eq!(params.terrain.region_count, 2);
        assert_eq!(params.terrain.water_level, 3);
        assert_eq!(params.climate.wind_direction, HexDirection::SE);
        assert!((params.climate.evaporation_factor - 0.5).abs() < f32::EPSILON);
        assert_eq!(params.grid, GridSettings::default());
    }
}
