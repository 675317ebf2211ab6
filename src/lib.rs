pub mod biome;
pub mod cell;
pub mod climate;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod generator;
pub mod grid;
pub mod heightmap;
pub mod queue;
pub mod region;
pub mod rivers;
pub mod search;
pub mod snapshot;

pub use biome::TerrainType;
pub use cell::HexCell;
pub use config::{
    ClimateSettings, GridSettings, HemisphereMode, RiverSettings, TemperatureSettings,
    TerrainSettings, WorldGenerationParams,
};
pub use coordinates::{HexCoordinates, HexDirection, HexEdgeType};
pub use error::HexMapError;
pub use generator::{GeneratedWorld, GenerationReport, generate_world};
pub use grid::HexGrid;
pub use queue::{BucketNode, PriorityBucketQueue};
pub use search::{GroundUnit, HexPath, Mover};
pub use snapshot::{CellRecord, MapSnapshot};
