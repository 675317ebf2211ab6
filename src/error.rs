//! Ошибки библиотеки
//!
//! Все публичные операции, которые могут отклонить входные данные, возвращают [`HexMapError`].
//! Нехватка бюджета суши или рек ошибкой не считается: она попадает в отчёт генерации.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HexMapError {
    /// Размеры сетки не кратны размеру чанка (или равны нулю)
    #[error(
        "grid size {width}x{height} must be a positive multiple of the chunk size {chunk_x}x{chunk_z}"
    )]
    InvalidDimensions {
        width: u32,
        height: u32,
        chunk_x: u32,
        chunk_z: u32,
    },

    /// Параметр генерации вне допустимого диапазона
    #[error("parameter `{name}` = {value} is outside of {range}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        range: &'static str,
    },

    #[error("cell index {0} is outside of the grid")]
    CellOutOfBounds(usize),

    #[error("movement speed must be positive, got {0}")]
    InvalidSpeed(i32),

    #[error("view range must not be negative, got {0}")]
    InvalidRange(i32),

    /// Снимок карты не соответствует своим же размерам
    #[error("snapshot describes {expected} cells but contains {actual}")]
    SnapshotMismatch { expected: usize, actual: usize },

    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HexMapError {
    pub(crate) fn parameter(
        name: &'static str,
        value: impl ToString,
        range: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            range,
        }
    }
}
