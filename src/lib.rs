pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod lighting;
pub mod mesh;
pub mod post;
pub mod renderer;
pub mod scene;
pub mod terrain;
pub mod transform;
pub mod wave;

#[cfg(feature = "winit")]
mod winit_integration;
