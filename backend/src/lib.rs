//! Minimal 2D runtime: an SDL2 window with an OpenGL context, a frame loop,
//! and interchangeable scenes that own their shader programs and buffers.

pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod glutils;
pub mod logging;
pub mod math;
pub mod scene;
pub mod shaders;
pub mod system;
pub mod time;

#[cfg(test)]
mod mock_gl;
