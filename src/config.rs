use std::path::PathBuf;

use clap::Parser;

use crate::error::{Result, TerrainError};
use crate::post::PostEffect;
use crate::wave::{PlaneMode, WaveParams};

/// Real-time sine-wave terrain visualizer.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct VisualizerConfig {
    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Grid vertices along X
    #[arg(long = "x-segments", default_value_t = 64)]
    pub x_segments: u32,

    /// Grid vertices along Z
    #[arg(long = "z-segments", default_value_t = 64)]
    pub z_segments: u32,

    /// Height map image (png or ppm); a flat plane is built without one
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Diffuse texture for the terrain surface
    #[arg(long)]
    pub texture: Option<PathBuf>,

    #[arg(long, default_value_t = WaveParams::default().amplitude)]
    pub amplitude: f32,

    #[arg(long = "wave-number", default_value_t = WaveParams::default().wave_number)]
    pub wave_number: f32,

    #[arg(long = "wave-period", default_value_t = WaveParams::default().wave_period)]
    pub wave_period: f32,

    #[arg(long = "plane-mode", value_enum, default_value_t = PlaneMode::YAxis)]
    pub plane_mode: PlaneMode,

    #[arg(long, value_enum, default_value_t = PostEffect::Standard)]
    pub effect: PostEffect,

    /// Delay between frames in milliseconds
    #[arg(long = "frame-delay-ms", default_value_t = 25)]
    pub frame_delay_ms: u64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self::parse_from(["sine-terrain"])
    }
}

impl VisualizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.x_segments < 2 || self.z_segments < 2 {
            return Err(TerrainError::InvalidDimensions {
                x: self.x_segments,
                z: self.z_segments,
            });
        }
        Ok(())
    }

    /// Grid dimensions with the larger extent along X.
    pub fn grid(&self) -> (u32, u32) {
        (
            self.x_segments.max(self.z_segments),
            self.x_segments.min(self.z_segments),
        )
    }

    pub fn wave_params(&self) -> WaveParams {
        WaveParams {
            amplitude: self.amplitude,
            wave_number: self.wave_number,
            wave_period: self.wave_period,
        }
    }

    pub fn frame_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.frame_delay_ms)
    }
}
