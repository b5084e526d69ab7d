//! Shorebreak library - procedural shoreline waves

pub mod canvas;
pub mod cli;
pub mod compositor;
pub mod error;
pub mod export;
pub mod frame;
pub mod noise;
pub mod params;
pub mod rendering;
pub mod waves;
