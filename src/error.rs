use std::path::PathBuf;

/// Errors raised while building terrain geometry or loading its inputs.
#[derive(thiserror::Error, Debug)]
pub enum TerrainError {
    #[error("terrain needs at least 2x2 segments, got {x}x{z}")]
    InvalidDimensions { x: u32, z: u32 },

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("{vertices} vertices but {tex_coords} texture coordinates")]
    TexCoordMismatch { vertices: usize, tex_coords: usize },

    #[error("failed to load height map {path:?}: {source}")]
    HeightMap {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("height data has {actual} samples, expected {expected}")]
    HeightDataSize { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
