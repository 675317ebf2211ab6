//! Регионы зарождения суши
//!
//! Карта делится на 1–4 прямоугольника, разделённых проливами; участки суши
//! поднимаются только из клеток внутри регионов, поэтому регионы становятся
//! отдельными материками.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::TerrainSettings;

/// Прямоугольник в смещённых координатах, верхние границы не включаются
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub z_min: i32,
    pub z_max: i32,
}

impl MapRegion {
    #[must_use]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        (self.x_min..self.x_max).contains(&x) && (self.z_min..self.z_max).contains(&z)
    }

    /// Сжимает вырожденный диапазон (на маленькой карте отступы могут перекрыться)
    /// в один столбец или строку посередине
    fn normalized(mut self, width: i32, height: i32) -> Self {
        (self.x_min, self.x_max) = collapse(self.x_min, self.x_max, width);
        (self.z_min, self.z_max) = collapse(self.z_min, self.z_max, height);
        self
    }
}

fn collapse(min: i32, max: i32, size: i32) -> (i32, i32) {
    let min = min.max(0);
    let max = max.min(size);
    if min < max {
        return (min, max);
    }
    let middle = ((min + max) / 2).clamp(0, size - 1);
    (middle, middle + 1)
}

/// Делит карту `width × height` на регионы согласно `settings.region_count`.
///
/// При двух регионах разрез вертикальный или горизонтальный с равной вероятностью.
/// На замкнутой карте внешний отступ по X заменяется шириной пролива, а если
/// разрезов по X нет, отступ не нужен вовсе.
pub fn create_regions(
    width: i32,
    height: i32,
    wrapping: bool,
    settings: &TerrainSettings,
    rng: &mut ChaCha8Rng,
) -> Vec<MapRegion> {
    let region_border = settings.region_border;
    let border_z = settings.map_border_z;
    let mut border_x = if wrapping {
        region_border
    } else {
        settings.map_border_x
    };

    let region = |x_min, x_max, z_min, z_max| MapRegion {
        x_min,
        x_max,
        z_min,
        z_max,
    };

    let regions = match settings.region_count {
        2 => {
            if rng.r#gen::<f32>() < 0.5 {
                vec![
                    region(border_x, width / 2 - region_border, border_z, height - border_z),
                    region(width / 2 + region_border, width - border_x, border_z, height - border_z),
                ]
            } else {
                if wrapping {
                    border_x = 0;
                }
                vec![
                    region(border_x, width - border_x, border_z, height / 2 - region_border),
                    region(border_x, width - border_x, height / 2 + region_border, height - border_z),
                ]
            }
        }
        3 => vec![
            region(border_x, width / 3 - region_border, border_z, height - border_z),
            region(
                width / 3 + region_border,
                width * 2 / 3 - region_border,
                border_z,
                height - border_z,
            ),
            region(width * 2 / 3 + region_border, width - border_x, border_z, height - border_z),
        ],
        4 => vec![
            region(border_x, width / 2 - region_border, border_z, height / 2 - region_border),
            region(width / 2 + region_border, width - border_x, border_z, height / 2 - region_border),
            region(
                width / 2 + region_border,
                width - border_x,
                height / 2 + region_border,
                height - border_z,
            ),
            region(border_x, width / 2 - region_border, height / 2 + region_border, height - border_z),
        ],
        _ => {
            if wrapping {
                border_x = 0;
            }
            vec![region(border_x, width - border_x, border_z, height - border_z)]
        }
    };

    regions
        .into_iter()
        .map(|r| {
            let normalized = r.normalized(width, height);
            if normalized != r {
                log::warn!("Регион {r:?} пуст на карте {width}×{height}, сжат до {normalized:?}");
            }
            normalized
        })
        .collect()
}
